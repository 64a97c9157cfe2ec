use std::{fs, future::Future, path::PathBuf};

use engine::{EngineError, Expense, ExpenseStore, ResultEngine};
use uuid::Uuid;

/// Expense store backed by a single JSON array on disk.
///
/// A missing file is an empty store; it is created on the first write.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    fn read(&self) -> ResultEngine<Vec<Expense>> {
        let content = match fs::read_to_string(&self.path) {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(err.into()),
        };
        if content.trim().is_empty() {
            return Ok(Vec::new());
        }
        serde_json::from_str(&content).map_err(|err| {
            EngineError::Store(format!("{}: {err}", self.path.display()))
        })
    }

    fn write(&self, expenses: &[Expense]) -> ResultEngine<()> {
        if let Some(parent) = self.path.parent() {
            fs::create_dir_all(parent)?;
        }
        let payload = serde_json::to_string_pretty(expenses)
            .map_err(|err| EngineError::Store(err.to_string()))?;
        fs::write(&self.path, payload)?;
        Ok(())
    }

    fn modify<T>(&self, f: impl FnOnce(&mut Vec<Expense>) -> ResultEngine<T>) -> ResultEngine<T> {
        let mut expenses = self.read()?;
        let out = f(&mut expenses)?;
        self.write(&expenses)?;
        Ok(out)
    }
}

impl ExpenseStore for JsonFileStore {
    fn list(&self) -> impl Future<Output = ResultEngine<Vec<Expense>>> + Send {
        std::future::ready(self.read())
    }

    fn insert(&self, expense: Expense) -> impl Future<Output = ResultEngine<Expense>> + Send {
        let saved = Expense {
            id: Uuid::new_v4(),
            ..expense
        };
        std::future::ready(self.modify(|expenses| {
            expenses.push(saved.clone());
            Ok(saved)
        }))
    }

    fn update(&self, id: Uuid, expense: Expense) -> impl Future<Output = ResultEngine<()>> + Send {
        std::future::ready(self.modify(|expenses| {
            let slot = expenses
                .iter_mut()
                .find(|existing| existing.id == id)
                .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
            *slot = Expense { id, ..expense };
            Ok(())
        }))
    }

    fn delete(&self, id: Uuid) -> impl Future<Output = ResultEngine<()>> + Send {
        std::future::ready(self.modify(|expenses| {
            let before = expenses.len();
            expenses.retain(|existing| existing.id != id);
            if expenses.len() == before {
                return Err(EngineError::KeyNotFound(id.to_string()));
            }
            Ok(())
        }))
    }
}
