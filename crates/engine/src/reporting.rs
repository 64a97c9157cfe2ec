//! Dashboard figures derived from the daily ledger.
//!
//! Every function here is a pure recomputation over a snapshot of expenses
//! and rates: calling it twice with the same inputs yields the same output.

use std::str::FromStr;

use chrono::NaiveDate;
use serde::Serialize;

use crate::{
    Contribution, Currency, DailyLedger, DateWindow, EngineError, Expense, ExpenseSummary,
    RateTable, summarize,
};

/// How many countries the geographic breakdown keeps.
pub const TOP_COUNTRIES: usize = 5;

/// Trend window lengths offered to the user.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize)]
pub enum ReportPeriod {
    Week,
    #[default]
    Month,
    Quarter,
}

impl ReportPeriod {
    pub const ALL: [ReportPeriod; 3] = [
        ReportPeriod::Week,
        ReportPeriod::Month,
        ReportPeriod::Quarter,
    ];

    #[must_use]
    pub const fn days(self) -> u32 {
        match self {
            ReportPeriod::Week => 7,
            ReportPeriod::Month => 30,
            ReportPeriod::Quarter => 90,
        }
    }
}

impl TryFrom<u32> for ReportPeriod {
    type Error = EngineError;

    fn try_from(value: u32) -> Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|period| period.days() == value)
            .ok_or_else(|| EngineError::InvalidPeriod(format!("unsupported period: {value} days")))
    }
}

impl FromStr for ReportPeriod {
    type Err = EngineError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "week" | "7" | "7d" => Ok(ReportPeriod::Week),
            "month" | "30" | "30d" => Ok(ReportPeriod::Month),
            "quarter" | "90" | "90d" => Ok(ReportPeriod::Quarter),
            other => Err(EngineError::InvalidPeriod(format!(
                "unsupported period: {other}"
            ))),
        }
    }
}

/// One day of the trend series.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct TrendPoint {
    pub date: NaiveDate,
    /// Day total rounded to 2 decimals for display.
    pub amount: f64,
    /// Short label, e.g. `Feb 09`.
    pub label: String,
    /// Expense slices attributed to this day, possibly empty.
    pub expenses: Vec<Contribution>,
}

/// Share of the period spend attributed to one country.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct CountryStat {
    pub code: String,
    pub amount: f64,
    pub percentage: f64,
}

#[derive(Clone, Debug, Default, PartialEq, Serialize)]
pub struct ReportingStats {
    pub today_spend: f64,
    pub total_ever_spend: f64,
    /// Exactly `period_days` points, contiguous and ascending, ending today.
    pub trend_data: Vec<TrendPoint>,
    pub average_daily_spend: f64,
    pub country_stats: Vec<CountryStat>,
}

/// Computes the dashboard statistics for the `period_days` ending at `today`.
#[must_use]
pub fn aggregate(
    expenses: &[Expense],
    period_days: u32,
    base: Currency,
    rates: &RateTable,
    today: NaiveDate,
) -> ReportingStats {
    let window = DateWindow::trailing(today, period_days);
    let ledger = DailyLedger::build(expenses, base, rates, window);
    stats_from_ledger(&ledger, window, today)
}

fn stats_from_ledger(ledger: &DailyLedger, window: DateWindow, today: NaiveDate) -> ReportingStats {
    let mut trend_data = Vec::with_capacity(window.len() as usize);
    let mut period_total = 0.0;
    for day in window.days() {
        let bucket = ledger.day(day);
        let amount = bucket.map_or(0.0, |bucket| bucket.amount);
        period_total += amount;
        trend_data.push(TrendPoint {
            date: day,
            amount: round_cents(amount),
            label: day.format("%b %d").to_string(),
            expenses: bucket
                .map(|bucket| bucket.contributions.clone())
                .unwrap_or_default(),
        });
    }

    let average_daily_spend = if window.is_empty() {
        0.0
    } else {
        period_total / f64::from(window.len())
    };

    ReportingStats {
        today_spend: ledger.amount_on(today),
        total_ever_spend: ledger.lifetime_total(),
        trend_data,
        average_daily_spend,
        country_stats: top_countries(ledger),
    }
}

fn top_countries(ledger: &DailyLedger) -> Vec<CountryStat> {
    let period_total: f64 = ledger.countries().iter().map(|total| total.amount).sum();

    let mut countries = ledger.countries().to_vec();
    // Stable: equal amounts keep first-seen order.
    countries.sort_by(|a, b| b.amount.total_cmp(&a.amount));

    countries
        .into_iter()
        .take(TOP_COUNTRIES)
        .map(|total| CountryStat {
            percentage: if period_total == 0.0 {
                0.0
            } else {
                100.0 * total.amount / period_total
            },
            code: total.code,
            amount: total.amount,
        })
        .collect()
}

/// Rounds to 2 decimals.
#[must_use]
pub fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Rolling totals shown next to the trend chart.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize)]
pub struct PeriodTotals {
    pub rolling_7_days: f64,
    pub last_month: f64,
    pub last_quarter: f64,
    pub lifetime: f64,
}

impl PeriodTotals {
    /// Trailing 7/30/90-day sums of the prorated ledger ending at `today`.
    #[must_use]
    pub fn from_ledger(ledger: &DailyLedger, today: NaiveDate, lifetime: f64) -> Self {
        let trailing = |period: ReportPeriod| {
            ledger.total_between(DateWindow::trailing(today, period.days()))
        };
        Self {
            rolling_7_days: trailing(ReportPeriod::Week),
            last_month: trailing(ReportPeriod::Month),
            last_quarter: trailing(ReportPeriod::Quarter),
            lifetime,
        }
    }
}

/// Everything the dashboard shows for one snapshot.
#[derive(Clone, Debug, PartialEq, Serialize)]
pub struct Report {
    pub base_currency: Currency,
    pub today: NaiveDate,
    pub period_days: u32,
    pub stats: ReportingStats,
    pub summary: ExpenseSummary,
    pub periods: PeriodTotals,
}

impl Report {
    /// Builds stats, summary and rolling totals from the same inputs.
    #[must_use]
    pub fn build(
        expenses: &[Expense],
        period_days: u32,
        base: Currency,
        rates: &RateTable,
        today: NaiveDate,
    ) -> Self {
        let window = DateWindow::trailing(today, period_days);
        let ledger = DailyLedger::build(expenses, base, rates, window);
        let stats = stats_from_ledger(&ledger, window, today);
        let summary = summarize(expenses, base, rates);
        let periods = PeriodTotals::from_ledger(&ledger, today, summary.total_spent);

        tracing::debug!(
            "built report for {} expenses over {period_days} days in {base}",
            expenses.len()
        );

        Self {
            base_currency: base,
            today,
            period_days,
            stats,
            summary,
            periods,
        }
    }
}
