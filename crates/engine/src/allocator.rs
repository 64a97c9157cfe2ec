//! Spreads every expense over the days it covers.
//!
//! A multi-day expense is prorated evenly: a 3-day stay costing 300 reads as
//! 100 on each of its days. This keeps every day-based figure additive and
//! consistent with the lifetime total.

use std::collections::BTreeMap;

use chrono::{Days, NaiveDate};
use serde::Serialize;
use uuid::Uuid;

use crate::{Currency, Expense, RateTable, convert};

/// Inclusive run of `len` consecutive days ending at `end`.
///
/// A zero-length window is valid and contains no day.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct DateWindow {
    start: NaiveDate,
    end: NaiveDate,
    len: u32,
}

impl DateWindow {
    /// The `len` days ending at (and including) `end`.
    #[must_use]
    pub fn trailing(end: NaiveDate, len: u32) -> Self {
        let back = u64::from(len.saturating_sub(1));
        let start = end.checked_sub_days(Days::new(back)).unwrap_or(NaiveDate::MIN);
        Self { start, end, len }
    }

    #[must_use]
    pub fn start(&self) -> NaiveDate {
        self.start
    }

    #[must_use]
    pub fn end(&self) -> NaiveDate {
        self.end
    }

    #[must_use]
    pub fn len(&self) -> u32 {
        self.len
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    #[must_use]
    pub fn contains(&self, day: NaiveDate) -> bool {
        !self.is_empty() && self.start <= day && day <= self.end
    }

    /// Every day of the window in ascending order.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        self.start
            .iter_days()
            .take(self.len as usize)
            .take_while(move |day| *day <= end)
    }
}

/// The slice of one expense attributed to one day.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Contribution {
    pub expense_id: Uuid,
    pub description: String,
    pub amount: f64,
}

/// Accumulated base-currency spend of a single day.
#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct DayBucket {
    pub amount: f64,
    pub contributions: Vec<Contribution>,
}

/// Spend attributed to one country code inside the country window.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CountryTotal {
    pub code: String,
    pub amount: f64,
}

/// Per-day ledger of prorated spend, rebuilt from scratch on every report.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct DailyLedger {
    days: BTreeMap<NaiveDate, DayBucket>,
    /// Ordered by first in-window contribution.
    countries: Vec<CountryTotal>,
    lifetime_total: f64,
}

impl DailyLedger {
    /// Builds the ledger for `expenses`, all amounts converted into `base`.
    ///
    /// Country totals only accumulate for days inside `country_window`. The
    /// lifetime total counts every expense regardless of its dates.
    #[must_use]
    pub fn build(
        expenses: &[Expense],
        base: Currency,
        rates: &RateTable,
        country_window: DateWindow,
    ) -> Self {
        let mut ledger = Self::default();

        for expense in expenses {
            let share = convert(expense.my_share, expense.currency_or(base), base, rates);
            ledger.lifetime_total += share;

            if expense.has_invalid_range() {
                tracing::debug!(
                    "expense {} ends before it starts, attributing it to {}",
                    expense.id,
                    expense.date
                );
            }

            let (start, end) = expense.day_span();
            let day_count = (end - start).num_days() + 1;
            let daily_cost = share / day_count as f64;

            for day in start.iter_days().take_while(|day| *day <= end) {
                ledger.add(day, expense, daily_cost, &country_window);
            }
        }

        ledger
    }

    fn add(&mut self, day: NaiveDate, expense: &Expense, amount: f64, country_window: &DateWindow) {
        let bucket = self.days.entry(day).or_default();
        bucket.amount += amount;
        bucket.contributions.push(Contribution {
            expense_id: expense.id,
            description: expense.description.clone(),
            amount,
        });

        if !country_window.contains(day) {
            return;
        }
        let code = expense.country_code();
        match self.countries.iter_mut().find(|total| total.code == code) {
            Some(total) => total.amount += amount,
            None => self.countries.push(CountryTotal {
                code: code.to_string(),
                amount,
            }),
        }
    }

    #[must_use]
    pub fn day(&self, day: NaiveDate) -> Option<&DayBucket> {
        self.days.get(&day)
    }

    /// Spend on `day`, 0 when nothing was attributed to it.
    #[must_use]
    pub fn amount_on(&self, day: NaiveDate) -> f64 {
        self.days.get(&day).map_or(0.0, |bucket| bucket.amount)
    }

    /// Sum of all converted shares, including expenses outside any window.
    #[must_use]
    pub fn lifetime_total(&self) -> f64 {
        self.lifetime_total
    }

    #[must_use]
    pub fn countries(&self) -> &[CountryTotal] {
        &self.countries
    }

    /// Sum of the daily buckets falling inside `window`.
    #[must_use]
    pub fn total_between(&self, window: DateWindow) -> f64 {
        if window.is_empty() {
            return 0.0;
        }
        self.days
            .range(window.start()..=window.end())
            .map(|(_, bucket)| bucket.amount)
            .sum()
    }

    /// Days with at least one contribution, ascending.
    pub fn iter(&self) -> impl Iterator<Item = (NaiveDate, &DayBucket)> {
        self.days.iter().map(|(day, bucket)| (*day, bucket))
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.days.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Location;

    fn day(d: u32) -> NaiveDate {
        NaiveDate::from_ymd_opt(2025, 5, d).unwrap()
    }

    fn located(expense: Expense, code: &str) -> Expense {
        expense.located(Location {
            country_code: Some(code.to_string()),
            ..Location::default()
        })
    }

    #[test]
    fn trailing_window_bounds() {
        let window = DateWindow::trailing(day(10), 3);
        assert_eq!(window.start(), day(8));
        assert_eq!(window.days().collect::<Vec<_>>(), vec![day(8), day(9), day(10)]);
        assert!(window.contains(day(8)));
        assert!(!window.contains(day(11)));
        assert!(!window.contains(day(7)));

        let empty = DateWindow::trailing(day(10), 0);
        assert!(empty.is_empty());
        assert!(!empty.contains(day(10)));
        assert_eq!(empty.days().count(), 0);
    }

    #[test]
    fn multi_day_expense_is_prorated_evenly() {
        let hotel = Expense::new(day(3), "hotel", 300.0).until(day(5));
        let ledger = DailyLedger::build(
            std::slice::from_ref(&hotel),
            Currency::USD,
            &RateTable::default(),
            DateWindow::trailing(day(5), 30),
        );

        assert_eq!(ledger.amount_on(day(2)), 0.0);
        for d in 3..=5 {
            assert_eq!(ledger.amount_on(day(d)), 100.0);
            let bucket = ledger.day(day(d)).unwrap();
            assert_eq!(bucket.contributions.len(), 1);
            assert_eq!(bucket.contributions[0].expense_id, hotel.id);
            assert_eq!(bucket.contributions[0].description, "hotel");
            assert_eq!(bucket.contributions[0].amount, 100.0);
        }
        assert_eq!(ledger.amount_on(day(6)), 0.0);
        assert_eq!(ledger.lifetime_total(), 300.0);
    }

    #[test]
    fn invalid_range_collapses_to_start_day() {
        let broken = Expense::new(day(9), "ferry", 45.0).until(day(2));
        let ledger = DailyLedger::build(
            &[broken],
            Currency::USD,
            &RateTable::default(),
            DateWindow::trailing(day(9), 7),
        );

        assert_eq!(ledger.amount_on(day(9)), 45.0);
        assert_eq!(ledger.iter().count(), 1);
        assert_eq!(ledger.lifetime_total(), 45.0);
    }

    #[test]
    fn lifetime_total_ignores_windows_and_converts() {
        let rates = RateTable::new(Currency::USD).rate_for(Currency::EUR, 0.5);
        let expenses = [
            Expense::new(day(1), "old", 10.0).in_currency(Currency::EUR),
            Expense::new(day(20), "new", 5.0),
        ];
        let ledger = DailyLedger::build(
            &expenses,
            Currency::USD,
            &rates,
            DateWindow::trailing(day(20), 1),
        );

        assert_eq!(ledger.amount_on(day(1)), 20.0);
        assert_eq!(ledger.lifetime_total(), 25.0);
        let summed: f64 = ledger.iter().map(|(_, bucket)| bucket.amount).sum();
        assert_eq!(summed, ledger.lifetime_total());
    }

    #[test]
    fn countries_only_count_days_inside_window() {
        let expenses = [
            located(Expense::new(day(1), "sushi", 40.0).until(day(4)), "JP"),
            Expense::new(day(4), "unknown", 5.0),
            located(Expense::new(day(4), "kimchi", 8.0), "KR"),
        ];
        let ledger = DailyLedger::build(
            &expenses,
            Currency::USD,
            &RateTable::default(),
            DateWindow::trailing(day(4), 2),
        );

        let countries = ledger.countries();
        assert_eq!(countries.len(), 3);
        assert_eq!(countries[0].code, "JP");
        assert_eq!(countries[0].amount, 20.0);
        assert_eq!(countries[1].code, "??");
        assert_eq!(countries[1].amount, 5.0);
        assert_eq!(countries[2].code, "KR");
        assert_eq!(ledger.total_between(DateWindow::trailing(day(4), 2)), 33.0);
        assert_eq!(ledger.total_between(DateWindow::trailing(day(4), 0)), 0.0);
    }
}
