//! The module contains the error the engine can throw.
//!
//! Reporting itself never fails: missing rates and corrupt date ranges degrade
//! silently. Errors only come from parsing user input and from the
//! collaborators around the reporting core:
//!
//! - [`InvalidCurrency`], [`InvalidPeriod`] and [`InvalidValue`] when parsing
//!   input.
//! - [`KeyNotFound`] when a record store has no expense with the given id.
//! - [`Store`] and [`RateFetch`] when a collaborator fails.
//!
//!  [`InvalidCurrency`]: EngineError::InvalidCurrency
//!  [`InvalidPeriod`]: EngineError::InvalidPeriod
//!  [`InvalidValue`]: EngineError::InvalidValue
//!  [`KeyNotFound`]: EngineError::KeyNotFound
//!  [`Store`]: EngineError::Store
//!  [`RateFetch`]: EngineError::RateFetch
use thiserror::Error;

/// Engine custom errors.
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("Invalid currency: {0}")]
    InvalidCurrency(String),
    #[error("Invalid period: {0}")]
    InvalidPeriod(String),
    #[error("Invalid value: {0}")]
    InvalidValue(String),
    #[error("\"{0}\" key not found!")]
    KeyNotFound(String),
    #[error("Store error: {0}")]
    Store(String),
    #[error("Rate fetch failed: {0}")]
    RateFetch(String),
    #[error(transparent)]
    Csv(#[from] csv::Error),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl PartialEq for EngineError {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Self::InvalidCurrency(a), Self::InvalidCurrency(b)) => a == b,
            (Self::InvalidPeriod(a), Self::InvalidPeriod(b)) => a == b,
            (Self::InvalidValue(a), Self::InvalidValue(b)) => a == b,
            (Self::KeyNotFound(a), Self::KeyNotFound(b)) => a == b,
            (Self::Store(a), Self::Store(b)) => a == b,
            (Self::RateFetch(a), Self::RateFetch(b)) => a == b,
            (Self::Csv(a), Self::Csv(b)) => a.to_string() == b.to_string(),
            (Self::Io(a), Self::Io(b)) => a.kind() == b.kind(),
            _ => false,
        }
    }
}
