use chrono::NaiveDate;

use engine::{
    Currency, DailyLedger, DateWindow, Expense, Location, PaidBy, RateTable, Report, aggregate,
    convert, summarize,
};

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn rates() -> RateTable {
    RateTable::new(Currency::EUR)
        .rate_for(Currency::USD, 1.1)
        .rate_for(Currency::JPY, 162.5)
        .rate_for(Currency::THB, 38.2)
}

fn in_country(expense: Expense, code: &str) -> Expense {
    expense.located(Location {
        lat: 0.0,
        lng: 0.0,
        country_code: Some(code.to_string()),
        ..Location::default()
    })
}

/// A trip mixing currencies, countries, shared bills and multi-day stays.
fn trip() -> Vec<Expense> {
    vec![
        in_country(
            Expense::new(date(2025, 4, 1), "Hotel Bangkok", 0.0)
                .until(date(2025, 4, 4))
                .in_currency(Currency::THB)
                .shared(8_000.0, 4_000.0, PaidBy::Me),
            "TH",
        ),
        in_country(
            Expense::new(date(2025, 4, 5), "Shinkansen", 14_000.0).in_currency(Currency::JPY),
            "JP",
        ),
        Expense::new(date(2025, 4, 5), "eSIM", 9.0).in_currency(Currency::EUR),
        in_country(
            Expense::new(date(2025, 4, 6), "Ramen", 0.0)
                .in_currency(Currency::JPY)
                .shared(3_000.0, 1_500.0, PaidBy::Other),
            "JP",
        ),
        Expense::new(date(2024, 12, 24), "Gift", 40.0).in_currency(Currency::EUR),
    ]
}

#[test]
fn identity_conversion_for_any_table() {
    for table in [RateTable::default(), rates()] {
        for currency in Currency::SUPPORTED {
            for amount in [0.0, 1.0, 19.99, 1e9] {
                assert_eq!(convert(amount, currency, currency, &table), amount);
            }
        }
    }
}

#[test]
fn missing_rate_returns_amount() {
    let xyz: Currency = "XYZ".parse().unwrap();
    assert_eq!(convert(10.0, xyz, Currency::USD, &RateTable::default()), 10.0);
}

#[test]
fn lifetime_equals_sum_of_daily_buckets() {
    let expenses = trip();
    let ledger = DailyLedger::build(
        &expenses,
        Currency::USD,
        &rates(),
        DateWindow::trailing(date(2025, 4, 6), 30),
    );
    let days: f64 = ledger.iter().map(|(_, bucket)| bucket.amount).sum();
    assert!((ledger.lifetime_total() - days).abs() < 1e-9);

    let stats = aggregate(&expenses, 30, Currency::USD, &rates(), date(2025, 4, 6));
    assert!((stats.total_ever_spend - days).abs() < 1e-9);
}

#[test]
fn trend_series_is_complete_for_every_period() {
    let today = date(2025, 3, 1);
    for period in [1, 7, 30, 90] {
        let stats = aggregate(&[], period, Currency::USD, &RateTable::default(), today);
        assert_eq!(stats.trend_data.len(), period as usize);
        assert_eq!(stats.trend_data.last().unwrap().date, today);
        for pair in stats.trend_data.windows(2) {
            assert_eq!(pair[0].date.succ_opt().unwrap(), pair[1].date);
        }
        assert!(stats.trend_data.iter().all(|point| point.amount == 0.0));
    }
}

#[test]
fn three_day_stay_is_one_hundred_per_day() {
    let today = date(2025, 6, 10);
    let stay = Expense::new(date(2025, 6, 4), "Cabin", 300.0).until(date(2025, 6, 6));
    let stats = aggregate(&[stay], 10, Currency::USD, &RateTable::default(), today);

    for point in &stats.trend_data {
        let expected = if (date(2025, 6, 4)..=date(2025, 6, 6)).contains(&point.date) {
            100.0
        } else {
            0.0
        };
        assert_eq!(point.amount, expected, "unexpected amount on {}", point.date);
    }
    assert_eq!(stats.average_daily_spend, 30.0);
}

#[test]
fn reversed_range_lands_on_start_date() {
    let today = date(2025, 6, 10);
    let broken = Expense::new(date(2025, 6, 8), "Typo", 75.0).until(date(2025, 6, 1));
    let stats = aggregate(&[broken], 10, Currency::USD, &RateTable::default(), today);

    let hit: Vec<_> = stats
        .trend_data
        .iter()
        .filter(|point| point.amount != 0.0)
        .map(|point| (point.date, point.amount))
        .collect();
    assert_eq!(hit, vec![(date(2025, 6, 8), 75.0)]);
}

#[test]
fn country_percentages_follow_amounts() {
    let today = date(2025, 8, 15);
    let expenses = [
        in_country(Expense::new(today, "a", 60.0), "FR"),
        in_country(Expense::new(today, "b", 30.0), "DE"),
        in_country(Expense::new(today, "c", 10.0), "IT"),
    ];
    let stats = aggregate(&expenses, 7, Currency::USD, &RateTable::default(), today);

    let got: Vec<_> = stats
        .country_stats
        .iter()
        .map(|stat| (stat.code.as_str(), stat.amount, stat.percentage))
        .collect();
    assert_eq!(got, vec![("FR", 60.0, 60.0), ("DE", 30.0, 30.0), ("IT", 10.0, 10.0)]);
}

#[test]
fn debt_summary_example() {
    let day = date(2025, 1, 1);
    let expenses = [
        Expense::new(day, "a", 0.0).shared(100.0, 40.0, PaidBy::Me),
        Expense::new(day, "b", 0.0).shared(50.0, 50.0, PaidBy::Other),
    ];
    let summary = summarize(&expenses, Currency::USD, &RateTable::default());

    assert_eq!(summary.total_spent, 90.0);
    assert_eq!(summary.total_owed_to_me, 60.0);
    assert_eq!(summary.total_i_owe, 50.0);
    assert_eq!(summary.net_balance, 10.0);
}

#[test]
fn changing_base_currency_needs_no_refetch() {
    let expenses = trip();
    let today = date(2025, 4, 6);
    let in_usd = Report::build(&expenses, 30, Currency::USD, &rates(), today);
    let in_eur = Report::build(&expenses, 30, Currency::EUR, &rates(), today);

    let ratio = in_usd.stats.total_ever_spend / in_eur.stats.total_ever_spend;
    assert!((ratio - 1.1).abs() < 1e-9);
    assert!((in_usd.summary.total_spent / in_eur.summary.total_spent - 1.1).abs() < 1e-9);
}

#[test]
fn trip_report_figures() {
    let today = date(2025, 4, 6);
    let report = Report::build(&trip(), 7, Currency::EUR, &rates(), today);

    // Ramen: 1500 JPY at 162.5 per EUR.
    assert!((report.stats.today_spend - 1_500.0 / 162.5).abs() < 1e-9);
    assert!((report.stats.total_ever_spend - report.summary.total_spent).abs() < 1e-9);

    let codes: Vec<_> = report
        .stats
        .country_stats
        .iter()
        .map(|stat| stat.code.as_str())
        .collect();
    assert_eq!(codes, vec!["TH", "JP", "??"]);

    // Hotel: 4000 THB paid by me out of 8000.
    assert!((report.summary.total_owed_to_me - 4_000.0 / 38.2).abs() < 1e-9);
    assert!((report.summary.total_i_owe - 1_500.0 / 162.5).abs() < 1e-9);
    assert_eq!(report.stats.trend_data.len(), 7);
}

#[test]
fn aggregation_is_idempotent() {
    let expenses = trip();
    let today = date(2025, 4, 6);
    let first = Report::build(&expenses, 30, Currency::USD, &rates(), today);
    let second = Report::build(&expenses, 30, Currency::USD, &rates(), today);

    assert_eq!(first, second);
    assert_eq!(
        serde_json_bytes(&first.stats),
        serde_json_bytes(&second.stats)
    );
}

fn serde_json_bytes(value: &impl serde::Serialize) -> Vec<u8> {
    serde_json::to_vec(value).unwrap()
}
