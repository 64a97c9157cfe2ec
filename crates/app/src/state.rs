use std::{fs, path::Path};

use engine::{CachedRates, Currency};
use serde::{Deserialize, Serialize};

use crate::error::Result;

/// What the CLI remembers between runs.
#[derive(Debug, Clone, Serialize, Deserialize, Default, PartialEq)]
pub struct LocalState {
    /// Last rate table fetched, reused until it expires.
    #[serde(default)]
    pub rates: Option<CachedRates>,
    /// Currency of the last expense added, default for the next one.
    #[serde(default)]
    pub last_input_currency: Option<Currency>,
}

impl LocalState {
    pub fn load(path: &str) -> Result<Self> {
        let content = match fs::read_to_string(path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Ok(Self::default());
            }
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_str(&content)?)
    }

    pub fn save(&self, path: &str) -> Result<()> {
        if let Some(parent) = Path::new(path).parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(self)?;
        fs::write(path, payload)?;
        Ok(())
    }
}
