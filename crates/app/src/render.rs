use std::fmt::Write;

use engine::{Currency, ExpenseSummary, RateLookup, RateOrigin, Report};

const BAR_WIDTH: usize = 40;

pub fn report(report: &Report) -> String {
    let base = report.base_currency;
    let stats = &report.stats;
    let mut out = String::new();

    let _ = writeln!(
        out,
        "Report for {} ({} days, {base})",
        report.today, report.period_days
    );
    let _ = writeln!(out, "  Today:          {}", money(stats.today_spend, base));
    let _ = writeln!(out, "  Daily average:  {}", money(stats.average_daily_spend, base));
    let _ = writeln!(out, "  Total ever:     {}", money(stats.total_ever_spend, base));

    out.push_str("\nTrend\n");
    let peak = stats
        .trend_data
        .iter()
        .map(|point| point.amount)
        .fold(0.0_f64, f64::max);
    for point in &stats.trend_data {
        let _ = writeln!(
            out,
            "  {:<6} {:>12} {}",
            point.label,
            format!("{:.2}", point.amount),
            bar(point.amount, peak)
        );
    }

    if !stats.country_stats.is_empty() {
        out.push_str("\nCountries\n");
        for country in &stats.country_stats {
            let _ = writeln!(
                out,
                "  {:<3} {:>12} {:>5.1}%",
                country.code,
                format!("{:.2}", country.amount),
                country.percentage
            );
        }
    }

    let periods = &report.periods;
    out.push_str("\nRolling totals\n");
    let _ = writeln!(out, "  7 days:   {}", money(periods.rolling_7_days, base));
    let _ = writeln!(out, "  30 days:  {}", money(periods.last_month, base));
    let _ = writeln!(out, "  90 days:  {}", money(periods.last_quarter, base));
    let _ = writeln!(out, "  Lifetime: {}", money(periods.lifetime, base));

    out.push('\n');
    out.push_str(&summary(&report.summary, base));
    out
}

pub fn summary(summary: &ExpenseSummary, base: Currency) -> String {
    let mut out = String::from("Balance\n");
    let _ = writeln!(out, "  Spent:          {}", money(summary.total_spent, base));
    let _ = writeln!(out, "  Owed to me:     {}", money(summary.total_owed_to_me, base));
    let _ = writeln!(out, "  I owe:          {}", money(summary.total_i_owe, base));
    let _ = writeln!(out, "  Net:            {}", money(summary.net_balance, base));
    out
}

pub fn rates(lookup: &RateLookup, base: Currency) -> String {
    let anchor = lookup.rates.anchor();
    let origin = match lookup.origin {
        RateOrigin::Cached => "cached",
        RateOrigin::Fetched => "fetched",
        RateOrigin::Stale => "stale",
        RateOrigin::Unavailable => "unavailable",
    };
    let mut out = format!("Rates per 1 {anchor} ({origin})\n");
    for currency in Currency::SUPPORTED {
        if currency == anchor {
            continue;
        }
        let name = currency.name().unwrap_or_default();
        let marker = if currency == base { "*" } else { " " };
        match lookup.rates.rate(currency) {
            Some(rate) => {
                let _ = writeln!(out, " {marker}{currency} {rate:>14.4}  {name}");
            }
            None => {
                let _ = writeln!(out, " {marker}{currency} {:>14}  {name}", "-");
            }
        }
    }
    out
}

fn money(amount: f64, currency: Currency) -> String {
    format!("{amount:.2} {currency}")
}

fn bar(amount: f64, peak: f64) -> String {
    if peak <= 0.0 || amount <= 0.0 {
        return String::new();
    }
    let width = ((amount / peak) * BAR_WIDTH as f64).round() as usize;
    "#".repeat(width.clamp(1, BAR_WIDTH))
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;
    use engine::{Expense, RateTable};

    use super::*;

    #[test]
    fn bars_scale_to_the_peak() {
        assert_eq!(bar(0.0, 10.0), "");
        assert_eq!(bar(10.0, 10.0).len(), BAR_WIDTH);
        assert_eq!(bar(5.0, 10.0).len(), BAR_WIDTH / 2);
        assert_eq!(bar(0.001, 10.0).len(), 1);
        assert_eq!(bar(3.0, 0.0), "");
    }

    #[test]
    fn report_lists_trend_and_balance() {
        let today = NaiveDate::from_ymd_opt(2025, 3, 10).unwrap();
        let expenses = vec![Expense::new(today, "Lunch", 12.5)];
        let rates = RateTable::new(Currency::EUR);
        let report = Report::build(&expenses, 7, Currency::USD, &rates, today);

        let text = super::report(&report);
        assert!(text.starts_with("Report for 2025-03-10 (7 days, USD)"));
        assert!(text.contains("Mar 10"));
        assert!(text.contains("Mar 04"));
        assert!(text.contains("12.50 USD"));
        assert!(text.contains("??"));
        assert!(text.contains("Net:"));
    }

    #[test]
    fn rates_mark_base_and_missing_entries() {
        let lookup = RateLookup {
            rates: RateTable::new(Currency::EUR).rate_for(Currency::USD, 1.08),
            origin: RateOrigin::Stale,
        };
        let text = rates(&lookup, Currency::USD);
        assert!(text.starts_with("Rates per 1 EUR (stale)"));
        assert!(text.contains("*USD         1.0800"));
        assert!(text.contains("  JPY              -"));
        assert!(!text.contains("  EUR "));
    }
}
