//! Reporting engine for personal and shared expenses.
//!
//! The engine turns a snapshot of expense records, possibly in many
//! currencies and spanning several days, into figures denominated in a single
//! base currency:
//!
//! - [`convert`] normalizes amounts through a [`RateTable`].
//! - [`DailyLedger`] prorates every expense over the days it covers.
//! - [`aggregate`] and [`Report`] derive the dashboard statistics.
//! - [`summarize`] computes who owes whom.
//!
//! Everything above is pure and holds no state: callers decide when to
//! recompute. The collaborators around it live in [`rates`] (time-boxed rate
//! cache), [`store`] (record store with optimistic writes) and [`export`].

pub use allocator::{Contribution, CountryTotal, DailyLedger, DateWindow, DayBucket};
pub use currency::{Currency, RateTable, convert};
pub use error::EngineError;
pub use expense::{Category, Expense, Location, PaidBy, UNKNOWN_COUNTRY};
pub use rates::{CachedRates, RateCache, RateLookup, RateOrigin, RateProvider};
pub use reporting::{
    CountryStat, PeriodTotals, Report, ReportPeriod, ReportingStats, TOP_COUNTRIES, TrendPoint,
    aggregate, round_cents,
};
pub use store::{ExpenseStore, MemoryStore, OptimisticExpenses};
pub use summary::{ExpenseSummary, summarize};

mod allocator;
mod currency;
mod error;
pub mod export;
mod expense;
pub mod rates;
mod reporting;
pub mod store;
mod summary;

pub type ResultEngine<T> = Result<T, EngineError>;
