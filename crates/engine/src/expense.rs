//! The module contains `Expense`, the read-only record the reporting core works on.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::{Currency, EngineError};

/// Who fronted the money for an expense.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaidBy {
    #[default]
    Me,
    Other,
}

impl PaidBy {
    /// Label used in exports.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            PaidBy::Me => "Me",
            PaidBy::Other => "Other",
        }
    }
}

impl FromStr for PaidBy {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "me" => Ok(PaidBy::Me),
            "other" => Ok(PaidBy::Other),
            other => Err(EngineError::InvalidValue(format!("unknown payer: {other}"))),
        }
    }
}

/// Fixed set of expense categories.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Category {
    #[serde(rename = "Food & Dining")]
    FoodAndDining,
    #[serde(rename = "Transport")]
    Transport,
    #[serde(rename = "Entertainment")]
    Entertainment,
    #[serde(rename = "Shopping")]
    Shopping,
    #[serde(rename = "Groceries")]
    Groceries,
    #[serde(rename = "Bills & Utilities")]
    BillsAndUtilities,
    #[serde(rename = "Travel")]
    Travel,
    #[default]
    #[serde(rename = "Other")]
    Other,
}

impl Category {
    pub const ALL: [Category; 8] = [
        Category::FoodAndDining,
        Category::Transport,
        Category::Entertainment,
        Category::Shopping,
        Category::Groceries,
        Category::BillsAndUtilities,
        Category::Travel,
        Category::Other,
    ];

    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Category::FoodAndDining => "Food & Dining",
            Category::Transport => "Transport",
            Category::Entertainment => "Entertainment",
            Category::Shopping => "Shopping",
            Category::Groceries => "Groceries",
            Category::BillsAndUtilities => "Bills & Utilities",
            Category::Travel => "Travel",
            Category::Other => "Other",
        }
    }
}

impl core::fmt::Display for Category {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.write_str(self.label())
    }
}

impl FromStr for Category {
    type Err = EngineError;

    /// Accepts the display label or a loose spelling of it (`food`, `bills`).
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim().to_ascii_lowercase();
        if let Some(category) = Self::ALL
            .into_iter()
            .find(|category| category.label().to_ascii_lowercase() == wanted)
        {
            return Ok(category);
        }
        match wanted.as_str() {
            "food" | "dining" | "food-and-dining" => Ok(Category::FoodAndDining),
            "bills" | "utilities" | "bills-and-utilities" => Ok(Category::BillsAndUtilities),
            other => Err(EngineError::InvalidValue(format!("unknown category: {other}"))),
        }
    }
}

/// Where an expense happened, as captured by the device.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct Location {
    pub lat: f64,
    pub lng: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub city: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub country_code: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// A single expense as handed over by the record store.
///
/// Records are immutable snapshots: an edit replaces the whole record. Amounts
/// are expressed in `currency`; when the currency is missing the caller's base
/// currency applies (see [`Expense::currency_or`]).
///
/// `my_share` is not validated against `total_amount`; the debt summary simply
/// ignores a negative "owed" amount.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Expense {
    pub id: Uuid,
    pub date: NaiveDate,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub end_date: Option<NaiveDate>,
    pub description: String,
    #[serde(default)]
    pub category: Category,
    pub total_amount: f64,
    #[serde(default)]
    pub paid_by: PaidBy,
    pub my_share: f64,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currency: Option<Currency>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub notes: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub location: Option<Location>,
}

impl Expense {
    /// Single-day expense paid by the user and fully theirs.
    pub fn new(date: NaiveDate, description: impl Into<String>, amount: f64) -> Self {
        Self {
            id: Uuid::new_v4(),
            date,
            end_date: None,
            description: description.into(),
            category: Category::default(),
            total_amount: amount,
            paid_by: PaidBy::Me,
            my_share: amount,
            currency: None,
            notes: None,
            location: None,
        }
    }

    #[must_use]
    pub fn until(mut self, end_date: NaiveDate) -> Self {
        self.end_date = Some(end_date);
        self
    }

    #[must_use]
    pub fn in_currency(mut self, currency: Currency) -> Self {
        self.currency = Some(currency);
        self
    }

    #[must_use]
    pub fn shared(mut self, total_amount: f64, my_share: f64, paid_by: PaidBy) -> Self {
        self.total_amount = total_amount;
        self.my_share = my_share;
        self.paid_by = paid_by;
        self
    }

    #[must_use]
    pub fn categorized(mut self, category: Category) -> Self {
        self.category = category;
        self
    }

    #[must_use]
    pub fn located(mut self, location: Location) -> Self {
        self.location = Some(location);
        self
    }

    /// Expense currency, falling back to `base` when the record has none.
    #[must_use]
    pub fn currency_or(&self, base: Currency) -> Currency {
        self.currency.unwrap_or(base)
    }

    /// Inclusive day range the expense covers.
    ///
    /// An `end_date` earlier than `date` is corrupt data: the expense collapses
    /// onto its start day.
    #[must_use]
    pub fn day_span(&self) -> (NaiveDate, NaiveDate) {
        match self.end_date {
            Some(end) if end >= self.date => (self.date, end),
            _ => (self.date, self.date),
        }
    }

    /// `true` when `end_date` is set but earlier than `date`.
    #[must_use]
    pub fn has_invalid_range(&self) -> bool {
        self.end_date.is_some_and(|end| end < self.date)
    }

    /// Country code used for geographic breakdowns, `??` when unknown.
    #[must_use]
    pub fn country_code(&self) -> &str {
        self.location
            .as_ref()
            .and_then(|location| location.country_code.as_deref())
            .filter(|code| !code.is_empty())
            .unwrap_or(UNKNOWN_COUNTRY)
    }
}

/// Country bucket key for expenses without a known location.
pub const UNKNOWN_COUNTRY: &str = "??";
