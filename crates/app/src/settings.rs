use chrono::{NaiveDate, Utc};
use chrono_tz::Tz;
use clap::Args;
use engine::{Currency, ReportPeriod};
use serde::Deserialize;

use crate::error::{AppError, Result};

const DEFAULT_CONFIG_PATH: &str = "config/financier.toml";

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub app: App,
    pub report: Report,
    pub storage: Storage,
    pub rates: Rates,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct App {
    /// `tracing` level for the financier crates.
    pub level: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Report {
    pub base_currency: String,
    pub period_days: u32,
    /// IANA name used to decide which calendar day is "today".
    pub timezone: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Storage {
    pub expenses_path: String,
    pub state_path: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct Rates {
    /// Currency every cached rate is expressed against.
    pub anchor_currency: String,
    pub url: String,
    pub max_age_hours: i64,
}

impl Default for App {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

impl Default for Report {
    fn default() -> Self {
        Self {
            base_currency: "USD".to_string(),
            period_days: ReportPeriod::default().days(),
            timezone: "UTC".to_string(),
        }
    }
}

impl Default for Storage {
    fn default() -> Self {
        Self {
            expenses_path: "data/expenses.json".to_string(),
            state_path: "config/financier_state.json".to_string(),
        }
    }
}

impl Default for Rates {
    fn default() -> Self {
        Self {
            anchor_currency: "EUR".to_string(),
            url: "https://api.frankfurter.app/".to_string(),
            max_age_hours: 24,
        }
    }
}

/// Global flags overriding file and environment settings.
#[derive(Debug, Clone, Default, Args)]
pub struct Overrides {
    /// Optional config file path (TOML).
    #[arg(long, global = true)]
    pub config: Option<String>,
    /// Override the reporting currency (e.g. EUR).
    #[arg(long, global = true)]
    pub base: Option<String>,
    /// Override the trend period: 7, 30 or 90 days.
    #[arg(long, global = true)]
    pub period: Option<ReportPeriod>,
    /// Override the expenses file.
    #[arg(long, global = true)]
    pub expenses: Option<String>,
    /// Override the timezone (IANA name).
    #[arg(long, global = true)]
    pub timezone: Option<String>,
}

impl Settings {
    pub fn load(overrides: &Overrides) -> Result<Self> {
        let config_path = overrides.config.as_deref().unwrap_or(DEFAULT_CONFIG_PATH);
        let mut builder = config::Config::builder();
        builder = builder.add_source(config::File::with_name(config_path).required(false));
        builder = builder.add_source(
            config::Environment::with_prefix("FINANCIER")
                .prefix_separator("_")
                .separator("__"),
        );
        let mut settings: Settings = builder.build()?.try_deserialize()?;
        settings.apply(overrides);
        Ok(settings)
    }

    fn apply(&mut self, overrides: &Overrides) {
        if let Some(base) = &overrides.base {
            self.report.base_currency = base.clone();
        }
        if let Some(period) = overrides.period {
            self.report.period_days = period.days();
        }
        if let Some(expenses) = &overrides.expenses {
            self.storage.expenses_path = expenses.clone();
        }
        if let Some(timezone) = &overrides.timezone {
            self.report.timezone = timezone.clone();
        }
    }

    pub fn base_currency(&self) -> Result<Currency> {
        Ok(self.report.base_currency.parse()?)
    }

    pub fn anchor_currency(&self) -> Result<Currency> {
        Ok(self.rates.anchor_currency.parse()?)
    }

    pub fn period(&self) -> Result<ReportPeriod> {
        Ok(ReportPeriod::try_from(self.report.period_days)?)
    }

    pub fn timezone(&self) -> Result<Tz> {
        self.report
            .timezone
            .parse::<Tz>()
            .map_err(|err| AppError::Setting(format!("invalid timezone: {err}")))
    }

    /// Current calendar day in the configured timezone.
    pub fn today(&self) -> Result<NaiveDate> {
        Ok(Utc::now().with_timezone(&self.timezone()?).date_naive())
    }

    pub fn max_rate_age(&self) -> Result<chrono::TimeDelta> {
        chrono::TimeDelta::try_hours(self.rates.max_age_hours)
            .filter(|age| *age > chrono::TimeDelta::zero())
            .ok_or_else(|| {
                AppError::Setting(format!(
                    "invalid rates.max_age_hours: {}",
                    self.rates.max_age_hours
                ))
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        let settings = Settings::default();
        assert_eq!(settings.base_currency().unwrap(), Currency::USD);
        assert_eq!(settings.anchor_currency().unwrap(), Currency::EUR);
        assert_eq!(settings.period().unwrap(), ReportPeriod::Month);
        assert_eq!(settings.timezone().unwrap(), Tz::UTC);
        assert_eq!(settings.max_rate_age().unwrap(), chrono::TimeDelta::hours(24));
    }

    #[test]
    fn flags_override_file_values() {
        let mut settings = Settings::default();
        settings.apply(&Overrides {
            base: Some("jpy".to_string()),
            period: Some(ReportPeriod::Quarter),
            timezone: Some("Asia/Tokyo".to_string()),
            ..Overrides::default()
        });
        assert_eq!(settings.base_currency().unwrap(), Currency::JPY);
        assert_eq!(settings.report.period_days, 90);
        assert!(settings.today().is_ok());
    }

    #[test]
    fn invalid_values_are_reported() {
        let mut settings = Settings::default();
        settings.report.timezone = "Mars/Olympus".to_string();
        settings.report.period_days = 14;
        settings.rates.max_age_hours = 0;
        assert!(matches!(settings.timezone(), Err(AppError::Setting(_))));
        assert!(matches!(settings.period(), Err(AppError::Engine(_))));
        assert!(settings.max_rate_age().is_err());
    }
}
