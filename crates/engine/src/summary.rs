//! Payer/debt summary over the whole expense list.
//!
//! Unlike the daily ledger this view is not prorated: a multi-day expense
//! counts in full. It only tracks the user against a generic "other" party.

use serde::Serialize;

use crate::{Currency, Expense, PaidBy, RateTable, convert};

/// What the user consumed and who owes whom, in the base currency.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct ExpenseSummary {
    /// Sum of every converted `my_share`.
    pub total_spent: f64,
    /// Part of receipts the user fronted that belongs to someone else.
    pub total_owed_to_me: f64,
    /// Shares the user consumed on receipts somebody else paid.
    pub total_i_owe: f64,
    /// `total_owed_to_me - total_i_owe`.
    pub net_balance: f64,
}

/// Recomputes the summary from scratch for `expenses`.
#[must_use]
pub fn summarize(expenses: &[Expense], base: Currency, rates: &RateTable) -> ExpenseSummary {
    let mut summary = ExpenseSummary::default();

    for expense in expenses {
        let currency = expense.currency_or(base);
        let share = convert(expense.my_share, currency, base, rates);
        let total = convert(expense.total_amount, currency, base, rates);

        summary.total_spent += share;
        match expense.paid_by {
            PaidBy::Me => {
                let owed = total - share;
                if owed > 0.0 {
                    summary.total_owed_to_me += owed;
                }
            }
            PaidBy::Other => summary.total_i_owe += share,
        }
    }

    summary.net_balance = summary.total_owed_to_me - summary.total_i_owe;
    summary
}
