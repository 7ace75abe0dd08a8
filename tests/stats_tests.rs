// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::{NaiveDate, TimeZone, Utc};
use rust_decimal::Decimal;
use treasury::models::{Category, Period, Transaction, TransactionType, Trend};
use treasury::stats::{
    TransactionFilter, balance, category_breakdown, comparison, inflow, investment_portion,
    monthly_comparisons, monthly_series, monthly_stats, outflow, period_balance,
    transactions_in_period, weekly_breakdown,
};
use treasury::utils::Month;

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn tx(id: &str, kind: TransactionType, amount: &str, date: &str) -> Transaction {
    let ts = Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap();
    Transaction {
        id: id.into(),
        r#type: kind,
        amount: dec(amount),
        date: d(date),
        category_id: format!("cat-{}", kind),
        description: String::new(),
        tags: None,
        payment_method: None,
        receipt: None,
        investment_amount: None,
        created_at: ts,
        updated_at: ts,
    }
}

fn jan_sample() -> Vec<Transaction> {
    vec![
        tx("a", TransactionType::Income, "1000", "2024-01-05"),
        tx("b", TransactionType::Expense, "300", "2024-01-20"),
    ]
}

#[test]
fn balance_and_month_for_simple_january() {
    let txs = jan_sample();
    let fund = dec("500");
    assert_eq!(balance(&txs, fund), dec("1200"));

    let jan = Month::new(2024, 1).unwrap();
    let s = monthly_stats(&txs, jan, fund, &txs);
    assert_eq!(s.income, dec("1000"));
    assert_eq!(s.donations, Decimal::ZERO);
    assert_eq!(s.investments, Decimal::ZERO);
    assert_eq!(s.expenses, dec("300"));
    assert_eq!(s.net, dec("700"));
    assert_eq!(s.balance, dec("1200"));
}

#[test]
fn balance_ignores_order() {
    let mut txs = vec![
        tx("a", TransactionType::Income, "10.25", "2024-03-01"),
        tx("b", TransactionType::Donation, "4", "2024-03-02"),
        tx("c", TransactionType::Investment, "7.5", "2024-03-03"),
        tx("d", TransactionType::Expense, "12.10", "2024-03-04"),
    ];
    let forward = balance(&txs, dec("1"));
    txs.reverse();
    assert_eq!(balance(&txs, dec("1")), forward);
    assert_eq!(forward, dec("10.65"));
    assert_eq!(balance(&[], dec("42")), dec("42"));
}

#[test]
fn flow_primitives_classify_by_type() {
    let inv = tx("i", TransactionType::Investment, "80", "2024-01-01");
    let exp = tx("e", TransactionType::Expense, "30", "2024-01-01");
    assert_eq!(inflow(&inv), dec("80"));
    assert_eq!(outflow(&inv), Decimal::ZERO);
    assert_eq!(investment_portion(&inv), dec("80"));
    assert_eq!(inflow(&exp), Decimal::ZERO);
    assert_eq!(outflow(&exp), dec("30"));
    assert_eq!(investment_portion(&exp), Decimal::ZERO);
}

#[test]
fn income_investment_amount_is_not_an_investment() {
    let mut income = tx("a", TransactionType::Income, "500", "2024-02-10");
    income.investment_amount = Some(dec("200"));
    let txs = vec![income];
    let s = monthly_stats(&txs, Month::new(2024, 2).unwrap(), Decimal::ZERO, &txs);
    assert_eq!(s.investments, Decimal::ZERO);
    assert_eq!(s.income, dec("500"));
    assert_eq!(s.balance, dec("500"));
}

#[test]
fn month_balance_uses_all_transactions_up_to_month_end() {
    let all = vec![
        tx("a", TransactionType::Income, "100", "2023-12-31"),
        tx("b", TransactionType::Expense, "40", "2024-01-15"),
        tx("c", TransactionType::Income, "999", "2024-02-01"),
    ];
    // Flows restricted to expenses, balance still global.
    let only_expenses: Vec<_> = all
        .iter()
        .filter(|t| t.r#type == TransactionType::Expense)
        .cloned()
        .collect();
    let s = monthly_stats(&only_expenses, Month::new(2024, 1).unwrap(), dec("10"), &all);
    assert_eq!(s.income, Decimal::ZERO);
    assert_eq!(s.expenses, dec("40"));
    assert_eq!(s.net, dec("-40"));
    assert_eq!(s.balance, dec("70"));
}

#[test]
fn monthly_net_matches_components() {
    let txs = vec![
        tx("a", TransactionType::Income, "120", "2024-05-02"),
        tx("b", TransactionType::Donation, "35", "2024-05-09"),
        tx("c", TransactionType::Investment, "60", "2024-05-31"),
        tx("d", TransactionType::Expense, "90.5", "2024-05-15"),
        tx("e", TransactionType::Expense, "1000", "2024-06-01"),
    ];
    let s = monthly_stats(&txs, Month::new(2024, 5).unwrap(), Decimal::ZERO, &txs);
    assert_eq!(s.net, s.income + s.donations + s.investments - s.expenses);
    assert_eq!(s.net, dec("124.5"));
}

#[test]
fn weeks_start_on_monday_and_clip_to_month() {
    // March 2024 starts on a Friday.
    let weeks = weekly_breakdown(&[], Month::new(2024, 3).unwrap(), d("2025-01-01"));
    let ranges: Vec<_> = weeks.iter().map(|w| (w.week_start, w.week_end)).collect();
    assert_eq!(
        ranges,
        vec![
            (d("2024-03-01"), d("2024-03-03")),
            (d("2024-03-04"), d("2024-03-10")),
            (d("2024-03-11"), d("2024-03-17")),
            (d("2024-03-18"), d("2024-03-24")),
            (d("2024-03-25"), d("2024-03-31")),
        ]
    );
    let numbers: Vec<_> = weeks.iter().map(|w| w.week_number).collect();
    assert_eq!(numbers, vec![1, 2, 3, 4, 5]);
}

#[test]
fn weeks_reconcile_with_month_totals() {
    let txs = vec![
        tx("a", TransactionType::Income, "100", "2024-03-01"),
        tx("b", TransactionType::Donation, "20", "2024-03-03"),
        tx("c", TransactionType::Expense, "15", "2024-03-04"),
        tx("d", TransactionType::Investment, "50", "2024-03-17"),
        tx("e", TransactionType::Expense, "5", "2024-03-18"),
        tx("f", TransactionType::Income, "7", "2024-03-31"),
        tx("g", TransactionType::Income, "1000", "2024-04-01"),
    ];
    let march = Month::new(2024, 3).unwrap();
    let weeks = weekly_breakdown(&txs, march, d("2024-06-30"));
    let s = monthly_stats(&txs, march, Decimal::ZERO, &txs);

    let sum = |f: fn(&treasury::models::WeeklyBreakdown) -> Decimal| -> Decimal {
        weeks.iter().map(f).sum()
    };
    assert_eq!(sum(|w| w.income), s.income);
    assert_eq!(sum(|w| w.donations), s.donations);
    assert_eq!(sum(|w| w.investments), s.investments);
    assert_eq!(sum(|w| w.expenses), s.expenses);
    assert_eq!(sum(|w| w.net), s.net);
    assert_eq!(weeks[0].income, dec("100"));
    assert_eq!(weeks[0].donations, dec("20"));
    assert_eq!(weeks[2].investments, dec("50"));
}

#[test]
fn current_month_weeks_stop_at_today() {
    let txs = vec![
        tx("a", TransactionType::Income, "10", "2024-03-12"),
        tx("b", TransactionType::Income, "99", "2024-03-20"),
    ];
    let weeks = weekly_breakdown(&txs, Month::new(2024, 3).unwrap(), d("2024-03-12"));
    assert_eq!(weeks.len(), 3);
    let last = weeks.last().unwrap();
    assert_eq!(last.week_start, d("2024-03-11"));
    assert_eq!(last.week_end, d("2024-03-12"));
    let total: Decimal = weeks.iter().map(|w| w.income).sum();
    assert_eq!(total, dec("10"));
}

#[test]
fn first_day_of_current_month_yields_one_week() {
    let weeks = weekly_breakdown(&[], Month::new(2024, 1).unwrap(), d("2024-01-01"));
    assert_eq!(weeks.len(), 1);
    assert_eq!(weeks[0].week_start, weeks[0].week_end);
}

#[test]
fn comparison_with_zero_previous() {
    let c = comparison(dec("5"), Decimal::ZERO);
    assert_eq!(c.percentage_change, None);
    assert_eq!(c.trend, Trend::Up);
    assert_eq!(c.difference, dec("5"));

    assert_eq!(comparison(dec("-3"), Decimal::ZERO).trend, Trend::Down);

    let z = comparison(Decimal::ZERO, Decimal::ZERO);
    assert_eq!(z.difference, Decimal::ZERO);
    assert_eq!(z.percentage_change, None);
    assert_eq!(z.trend, Trend::Same);
}

#[test]
fn comparison_net_drop_of_a_quarter() {
    let c = comparison(dec("150"), dec("200"));
    assert_eq!(c.difference, dec("-50"));
    assert_eq!(c.percentage_change, Some(dec("-25")));
    assert_eq!(c.trend, Trend::Down);
}

#[test]
fn comparison_dead_zone_and_negative_base() {
    assert_eq!(comparison(dec("100.5"), dec("100")).trend, Trend::Same);
    assert_eq!(comparison(dec("99.5"), dec("100")).trend, Trend::Same);
    assert_eq!(comparison(dec("99"), dec("100")).trend, Trend::Down);
    assert_eq!(comparison(dec("101"), dec("100")).trend, Trend::Up);

    let c = comparison(dec("50"), dec("-100"));
    assert_eq!(c.percentage_change, Some(dec("150")));
    assert_eq!(c.trend, Trend::Up);
}

#[test]
fn monthly_comparisons_against_previous_month() {
    let mut txs = jan_sample();
    txs.push(tx("c", TransactionType::Expense, "100", "2024-02-03"));
    let cmp = monthly_comparisons(&txs, Month::new(2024, 2).unwrap(), dec("500"));
    assert_eq!(cmp.income.current, Decimal::ZERO);
    assert_eq!(cmp.income.previous, dec("1000"));
    assert_eq!(cmp.income.percentage_change, Some(dec("-100")));
    assert_eq!(cmp.income.trend, Trend::Down);
    assert_eq!(cmp.expenses.difference, dec("-200"));
    assert_eq!(cmp.net.current, dec("-100"));
    assert_eq!(cmp.net.previous, dec("700"));
    assert_eq!(cmp.net.trend, Trend::Down);
}

#[test]
fn monthly_comparisons_across_year_boundary() {
    let txs = vec![
        tx("a", TransactionType::Income, "200", "2023-12-10"),
        tx("b", TransactionType::Income, "150", "2024-01-10"),
    ];
    let cmp = monthly_comparisons(&txs, Month::new(2024, 1).unwrap(), Decimal::ZERO);
    assert_eq!(cmp.net.previous, dec("200"));
    assert_eq!(cmp.net.percentage_change, Some(dec("-25")));
}

#[test]
fn monthly_comparisons_without_movements_report_no_data() {
    let txs = vec![tx("a", TransactionType::Income, "10", "2020-01-01")];
    let cmp = monthly_comparisons(&txs, Month::new(2024, 2).unwrap(), dec("500"));
    assert_eq!(cmp.income.trend, Trend::NoData);
    assert_eq!(cmp.expenses.trend, Trend::NoData);
    assert_eq!(cmp.net.trend, Trend::NoData);
    assert_eq!(cmp.net.percentage_change, None);
}

#[test]
fn series_runs_oldest_first_with_running_balance() {
    let txs = jan_sample();
    let series = monthly_series(&txs, Month::new(2024, 2).unwrap(), 3, dec("500"));
    let months: Vec<String> = series.iter().map(|(m, _)| m.to_string()).collect();
    assert_eq!(months, vec!["2023-12", "2024-01", "2024-02"]);
    assert_eq!(series[0].1.balance, dec("500"));
    assert_eq!(series[1].1.balance, dec("1200"));
    assert_eq!(series[2].1.balance, dec("1200"));
    assert_eq!(series[2].1.net, Decimal::ZERO);
}

#[test]
fn category_breakdown_sorted_by_total() {
    let mut a = tx("a", TransactionType::Expense, "10", "2024-01-02");
    a.category_id = "food".into();
    let mut b = tx("b", TransactionType::Expense, "50", "2024-01-03");
    b.category_id = "rent".into();
    let mut c = tx("c", TransactionType::Expense, "15", "2024-01-04");
    c.category_id = "food".into();
    let mut other_month = tx("d", TransactionType::Expense, "500", "2024-02-01");
    other_month.category_id = "food".into();
    let income = tx("e", TransactionType::Income, "900", "2024-01-05");
    let cats = vec![
        Category {
            id: "food".into(),
            name: "Food".into(),
            r#type: TransactionType::Expense,
            is_default: false,
        },
        Category {
            id: "rent".into(),
            name: "Rent".into(),
            r#type: TransactionType::Expense,
            is_default: false,
        },
    ];
    let totals = category_breakdown(
        &[a, b, c, other_month, income],
        &cats,
        Month::new(2024, 1).unwrap(),
        TransactionType::Expense,
    );
    assert_eq!(totals.len(), 2);
    assert_eq!(totals[0].name, "Rent");
    assert_eq!(totals[0].total, dec("50"));
    assert_eq!(totals[1].name, "Food");
    assert_eq!(totals[1].total, dec("25"));
    assert_eq!(totals[1].count, 2);
}

fn period_2024() -> Period {
    Period {
        id: "p".into(),
        name: "2024".into(),
        start_date: "2024-01-01".into(),
        end_date: "2024-12-31".into(),
        initial_fund: dec("300"),
        created_at: Utc.with_ymd_and_hms(2024, 1, 1, 0, 0, 0).unwrap(),
    }
}

#[test]
fn period_balance_counts_only_its_window() {
    let txs = vec![
        tx("a", TransactionType::Income, "1000", "2023-12-31"),
        tx("b", TransactionType::Income, "100", "2024-02-01"),
        tx("c", TransactionType::Expense, "40", "2024-06-01"),
        tx("d", TransactionType::Expense, "5", "2025-01-01"),
    ];
    let p = period_2024();
    assert_eq!(transactions_in_period(&txs, &p).len(), 2);
    assert_eq!(period_balance(&txs, &p, None), dec("360"));
    assert_eq!(period_balance(&txs, &p, Some(d("2024-03-01"))), dec("400"));
}

#[test]
fn filter_combines_criteria_newest_first() {
    let mut a = tx("a", TransactionType::Expense, "10", "2024-01-02");
    a.description = "Electricity bill".into();
    a.tags = Some(vec!["home".into()]);
    let mut b = tx("b", TransactionType::Expense, "20", "2024-01-09");
    b.description = "Water bill".into();
    b.tags = Some(vec!["home".into()]);
    let c = tx("c", TransactionType::Income, "30", "2024-01-10");
    let txs = vec![a, b, c];

    let filter = TransactionFilter {
        kind: Some(TransactionType::Expense),
        tag: Some("home".into()),
        text: Some("BILL".into()),
        month: Some(Month::new(2024, 1).unwrap()),
        ..TransactionFilter::default()
    };
    let ids: Vec<_> = filter.apply(&txs).into_iter().map(|t| t.id).collect();
    assert_eq!(ids, vec!["b", "a"]);

    let window = TransactionFilter::for_period(&period_2024());
    assert_eq!(window.apply(&txs).len(), 3);
}

#[test]
fn month_parsing_and_navigation() {
    let m: Month = "2024-03".parse().unwrap();
    assert_eq!(m.first_day(), d("2024-03-01"));
    assert_eq!(m.last_day(), d("2024-03-31"));
    assert_eq!(Month::new(2024, 2).unwrap().last_day(), d("2024-02-29"));
    assert_eq!(Month::new(2024, 1).unwrap().previous().to_string(), "2023-12");
    assert!("2024-13".parse::<Month>().is_err());
}

#[test]
fn huge_amounts_saturate_instead_of_overflowing() {
    let big = "50000000000000000000000000000";
    let txs = vec![
        tx("a", TransactionType::Income, big, "2024-01-02"),
        tx("b", TransactionType::Income, big, "2024-01-03"),
        tx("c", TransactionType::Expense, big, "2024-01-04"),
        tx("d", TransactionType::Expense, big, "2024-01-05"),
    ];
    let jan = Month::new(2024, 1).unwrap();
    let s = monthly_stats(&txs, jan, Decimal::ZERO, &txs);
    assert_eq!(s.income, Decimal::MAX);
    assert_eq!(s.expenses, Decimal::MAX);
    assert_eq!(s.net, Decimal::ZERO);
    assert_eq!(balance(&txs[..2], Decimal::MAX), Decimal::MAX);

    let c = comparison(Decimal::MAX, Decimal::MIN);
    assert_eq!(c.difference, Decimal::MAX);

    let cats = vec![Category {
        id: "cat-income".into(),
        name: "Gifts".into(),
        r#type: TransactionType::Income,
        is_default: false,
    }];
    let breakdown = category_breakdown(&txs, &cats, jan, TransactionType::Income);
    assert_eq!(breakdown[0].name, "Gifts");
    assert_eq!(breakdown[0].total, Decimal::MAX);
}
