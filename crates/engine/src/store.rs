//! Record store abstraction and the optimistic local copy kept in front of it.
//!
//! The reporting core only ever reads a snapshot of expenses. Writes go
//! through [`OptimisticExpenses`]: the change is applied to the local snapshot
//! first, then sent to the store, and reverted if the store rejects it.

use std::{future::Future, sync::Mutex};

use uuid::Uuid;

use crate::{EngineError, Expense, ResultEngine};

/// Persistent storage of one user's expenses.
pub trait ExpenseStore {
    fn list(&self) -> impl Future<Output = ResultEngine<Vec<Expense>>> + Send;

    /// Persists a new expense and returns it with its canonical id.
    fn insert(&self, expense: Expense) -> impl Future<Output = ResultEngine<Expense>> + Send;

    /// Replaces the record `id` wholesale.
    fn update(&self, id: Uuid, expense: Expense) -> impl Future<Output = ResultEngine<()>> + Send;

    fn delete(&self, id: Uuid) -> impl Future<Output = ResultEngine<()>> + Send;
}

/// Store kept entirely in memory. Inserted records get a fresh id.
#[derive(Debug, Default)]
pub struct MemoryStore {
    expenses: Mutex<Vec<Expense>>,
}

impl MemoryStore {
    pub fn new(expenses: Vec<Expense>) -> Self {
        Self {
            expenses: Mutex::new(expenses),
        }
    }

    fn with_expenses<T>(
        &self,
        f: impl FnOnce(&mut Vec<Expense>) -> ResultEngine<T>,
    ) -> ResultEngine<T> {
        let mut expenses = self
            .expenses
            .lock()
            .map_err(|_| EngineError::Store("memory store lock poisoned".to_string()))?;
        f(&mut expenses)
    }
}

impl ExpenseStore for MemoryStore {
    fn list(&self) -> impl Future<Output = ResultEngine<Vec<Expense>>> + Send {
        std::future::ready(self.with_expenses(|expenses| Ok(expenses.clone())))
    }

    fn insert(&self, expense: Expense) -> impl Future<Output = ResultEngine<Expense>> + Send {
        let saved = Expense {
            id: Uuid::new_v4(),
            ..expense
        };
        std::future::ready(self.with_expenses(|expenses| {
            expenses.push(saved.clone());
            Ok(saved)
        }))
    }

    fn update(&self, id: Uuid, expense: Expense) -> impl Future<Output = ResultEngine<()>> + Send {
        std::future::ready(self.with_expenses(|expenses| {
            let slot = expenses
                .iter_mut()
                .find(|existing| existing.id == id)
                .ok_or_else(|| EngineError::KeyNotFound(id.to_string()))?;
            *slot = Expense { id, ..expense };
            Ok(())
        }))
    }

    fn delete(&self, id: Uuid) -> impl Future<Output = ResultEngine<()>> + Send {
        std::future::ready(self.with_expenses(|expenses| {
            let before = expenses.len();
            expenses.retain(|existing| existing.id != id);
            if expenses.len() == before {
                return Err(EngineError::KeyNotFound(id.to_string()));
            }
            Ok(())
        }))
    }
}

/// Local snapshot of a store with optimistic writes.
///
/// Every write mutates the snapshot before the store answers. On failure the
/// snapshot is restored to what it was before the write and the store error
/// is returned.
#[derive(Debug)]
pub struct OptimisticExpenses<S> {
    store: S,
    expenses: Vec<Expense>,
}

impl<S: ExpenseStore> OptimisticExpenses<S> {
    pub fn new(store: S) -> Self {
        Self {
            store,
            expenses: Vec::new(),
        }
    }

    /// Current snapshot, newest first after a [`load`](Self::load).
    pub fn expenses(&self) -> &[Expense] {
        &self.expenses
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Replaces the snapshot with the store content, newest date first.
    pub async fn load(&mut self) -> ResultEngine<&[Expense]> {
        let mut expenses = self.store.list().await.inspect_err(|err| {
            tracing::error!("failed to load expenses: {err}");
        })?;
        expenses.sort_by(|a, b| b.date.cmp(&a.date));
        self.expenses = expenses;
        Ok(&self.expenses)
    }

    /// Adds `expense` and returns the id assigned by the store.
    pub async fn add(&mut self, expense: Expense) -> ResultEngine<Uuid> {
        let temp_id = Uuid::new_v4();
        let pending = Expense {
            id: temp_id,
            ..expense
        };
        self.expenses.insert(0, pending.clone());

        match self.store.insert(pending).await {
            Ok(saved) => {
                if let Some(local) = self.expenses.iter_mut().find(|e| e.id == temp_id) {
                    local.id = saved.id;
                }
                Ok(saved.id)
            }
            Err(err) => {
                tracing::error!("failed to add expense, rolling back: {err}");
                self.expenses.retain(|e| e.id != temp_id);
                Err(err)
            }
        }
    }

    /// Replaces the expense `id` with `expense`.
    pub async fn update(&mut self, id: Uuid, expense: Expense) -> ResultEngine<()> {
        let original = self.expenses.clone();
        let replacement = Expense { id, ..expense };
        for local in self.expenses.iter_mut().filter(|e| e.id == id) {
            *local = replacement.clone();
        }

        if let Err(err) = self.store.update(id, replacement).await {
            tracing::error!("failed to update expense {id}, rolling back: {err}");
            self.expenses = original;
            return Err(err);
        }
        Ok(())
    }

    pub async fn delete(&mut self, id: Uuid) -> ResultEngine<()> {
        let original = self.expenses.clone();
        self.expenses.retain(|e| e.id != id);

        if let Err(err) = self.store.delete(id).await {
            tracing::error!("failed to delete expense {id}, rolling back: {err}");
            self.expenses = original;
            return Err(err);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 10, d).unwrap()
    }

    #[tokio::test]
    async fn memory_store_assigns_ids_and_rejects_unknown_keys() {
        let store = MemoryStore::default();
        let draft = Expense::new(day(1), "bus", 2.5);
        let saved = store.insert(draft.clone()).await.unwrap();
        assert_ne!(saved.id, draft.id);
        assert_eq!(saved.description, "bus");

        let missing = Uuid::new_v4();
        assert_eq!(
            store.delete(missing).await,
            Err(EngineError::KeyNotFound(missing.to_string()))
        );
        assert!(store.update(missing, draft).await.is_err());

        store.delete(saved.id).await.unwrap();
        assert!(store.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn load_orders_newest_first() {
        let store = MemoryStore::new(vec![
            Expense::new(day(2), "b", 1.0),
            Expense::new(day(9), "c", 1.0),
            Expense::new(day(1), "a", 1.0),
        ]);
        let mut local = OptimisticExpenses::new(store);
        let loaded: Vec<_> = local
            .load()
            .await
            .unwrap()
            .iter()
            .map(|e| e.description.clone())
            .collect();
        assert_eq!(loaded, vec!["c", "b", "a"]);
    }
}
