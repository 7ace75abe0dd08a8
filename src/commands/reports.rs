// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::{initial_fund, month_or_current, resolve_category, selected_period, today};
use crate::models::{Comparison, MonthlyStats, Transaction, TransactionType};
use crate::repository::Repository;
use crate::stats::{
    balance, category_breakdown, monthly_comparisons, monthly_series, monthly_stats,
    period_balance, weekly_breakdown,
};
use crate::utils::{fmt_money, maybe_print_json, parse_date, pretty_table};
use anyhow::Result;
use serde_json::json;

pub fn handle(repo: &mut dyn Repository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("balance", sub)) => balance_report(repo, sub)?,
        Some(("month", sub)) => month(repo, sub)?,
        Some(("weeks", sub)) => weeks(repo, sub)?,
        Some(("compare", sub)) => compare(repo, sub)?,
        Some(("series", sub)) => series(repo, sub)?,
        Some(("by-category", sub)) => by_category(repo, sub)?,
        _ => {}
    }
    Ok(())
}

fn stats_rows(s: &MonthlyStats) -> Vec<Vec<String>> {
    vec![
        vec!["Income".into(), fmt_money(&s.income)],
        vec!["Donations".into(), fmt_money(&s.donations)],
        vec!["Investments".into(), fmt_money(&s.investments)],
        vec!["Expenses".into(), fmt_money(&s.expenses)],
        vec!["Net".into(), fmt_money(&s.net)],
        vec!["Balance".into(), fmt_money(&s.balance)],
    ]
}

fn balance_report(repo: &mut dyn Repository, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = repo.get_snapshot()?;
    let period = selected_period(&snapshot, sub)?;
    let as_of = match sub.get_one::<String>("as-of") {
        Some(d) => parse_date(d)?,
        None => today(),
    };
    let upto: Vec<Transaction> = snapshot
        .transactions
        .iter()
        .filter(|t| t.date <= as_of)
        .cloned()
        .collect();
    let total = balance(&upto, initial_fund(period));
    let in_period = period.map(|p| period_balance(&snapshot.transactions, p, Some(as_of)));

    let out = json!({
        "asOf": as_of,
        "period": period.map(|p| p.name.clone()),
        "balance": total,
        "periodBalance": in_period,
    });
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        let mut rows = vec![vec!["Balance".to_string(), fmt_money(&total)]];
        if let (Some(p), Some(b)) = (period, in_period) {
            rows.push(vec![format!("Period '{}'", p.name), fmt_money(&b)]);
        }
        println!("{}", pretty_table(&[format!("As of {}", as_of).as_str(), "Amount"], rows));
    }
    Ok(())
}

fn month(repo: &mut dyn Repository, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = repo.get_snapshot()?;
    let month = month_or_current(sub)?;
    let fund = initial_fund(selected_period(&snapshot, sub)?);
    let flows: Vec<Transaction> = match sub.get_one::<String>("category") {
        Some(c) => {
            let id = resolve_category(&snapshot, None, c);
            snapshot
                .transactions
                .iter()
                .filter(|t| t.category_id == id)
                .cloned()
                .collect()
        }
        None => snapshot.transactions.clone(),
    };
    let stats = monthly_stats(&flows, month, fund, &snapshot.transactions);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &stats)? {
        println!("{}", pretty_table(&[month.to_string().as_str(), "Amount"], stats_rows(&stats)));
    }
    Ok(())
}

fn weeks(repo: &mut dyn Repository, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = repo.get_snapshot()?;
    let month = month_or_current(sub)?;
    let weeks = weekly_breakdown(&snapshot.transactions, month, today());
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &weeks)? {
        let rows = weeks
            .iter()
            .map(|w| {
                vec![
                    w.week_number.to_string(),
                    format!("{}..{}", w.week_start, w.week_end),
                    fmt_money(&w.income),
                    fmt_money(&w.donations),
                    fmt_money(&w.investments),
                    fmt_money(&w.expenses),
                    fmt_money(&w.net),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Week", "Range", "Income", "Donations", "Investments", "Expenses", "Net"],
                rows
            )
        );
    }
    Ok(())
}

fn comparison_row(label: &str, c: &Comparison) -> Vec<String> {
    vec![
        label.to_string(),
        fmt_money(&c.current),
        fmt_money(&c.previous),
        fmt_money(&c.difference),
        c.percentage_change
            .map(|p| format!("{:.1}%", p.round_dp(1)))
            .unwrap_or_else(|| "-".into()),
        serde_json::to_value(c.trend)
            .ok()
            .and_then(|v| v.as_str().map(str::to_string))
            .unwrap_or_default(),
    ]
}

fn compare(repo: &mut dyn Repository, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = repo.get_snapshot()?;
    let month = month_or_current(sub)?;
    let fund = initial_fund(selected_period(&snapshot, sub)?);
    let cmp = monthly_comparisons(&snapshot.transactions, month, fund);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cmp)? {
        let rows = vec![
            comparison_row("Income", &cmp.income),
            comparison_row("Expenses", &cmp.expenses),
            comparison_row("Net", &cmp.net),
        ];
        println!(
            "{}",
            pretty_table(
                &[
                    format!("{} vs {}", month, month.previous()).as_str(),
                    "Current",
                    "Previous",
                    "Difference",
                    "Change",
                    "Trend"
                ],
                rows
            )
        );
    }
    Ok(())
}

fn series(repo: &mut dyn Repository, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = repo.get_snapshot()?;
    let through = month_or_current(sub)?;
    let count = sub.get_one::<usize>("months").copied().unwrap_or(12);
    let fund = initial_fund(selected_period(&snapshot, sub)?);
    let data = monthly_series(&snapshot.transactions, through, count, fund);
    let out: Vec<_> = data
        .iter()
        .map(|(m, s)| json!({ "month": m.to_string(), "stats": s }))
        .collect();
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &out)? {
        let rows = data
            .iter()
            .map(|(m, s)| {
                vec![
                    m.to_string(),
                    fmt_money(&s.income),
                    fmt_money(&s.donations),
                    fmt_money(&s.investments),
                    fmt_money(&s.expenses),
                    fmt_money(&s.net),
                    fmt_money(&s.balance),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Month", "Income", "Donations", "Investments", "Expenses", "Net", "Balance"],
                rows
            )
        );
    }
    Ok(())
}

fn by_category(repo: &mut dyn Repository, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = repo.get_snapshot()?;
    let month = month_or_current(sub)?;
    let kind: TransactionType = sub
        .get_one::<String>("type")
        .map_or("expense", String::as_str)
        .parse()?;
    let totals = category_breakdown(&snapshot.transactions, &snapshot.categories, month, kind);
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
        let rows = totals
            .iter()
            .map(|t| vec![t.name.clone(), t.count.to_string(), fmt_money(&t.total)])
            .collect();
        println!(
            "{}",
            pretty_table(&["Category", "Movements", format!("{} {}", kind, month).as_str()], rows)
        );
    }
    Ok(())
}
