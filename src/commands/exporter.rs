// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::commands::transactions::query_rows;
use crate::commands::{initial_fund, month_or_current, selected_period, today};
use crate::models::TransactionType;
use crate::repository::Repository;
use crate::snapshot::TreasurySnapshot;
use crate::stats::{category_breakdown, monthly_comparisons, monthly_stats, weekly_breakdown};
use anyhow::{Context, Result, bail};
use serde_json::json;

pub fn handle(repo: &mut dyn Repository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let snapshot = repo.get_snapshot()?;
            export_transactions(&snapshot, sub)
        }
        Some(("report", sub)) => {
            let snapshot = repo.get_snapshot()?;
            export_report(&snapshot, sub)
        }
        _ => Ok(()),
    }
}

pub fn export_transactions(snapshot: &TreasurySnapshot, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub
        .get_one::<String>("format")
        .map(|f| f.to_lowercase())
        .unwrap_or_default();
    let out = sub.get_one::<String>("out").context("--out is required")?;
    if fmt != "csv" && fmt != "json" {
        bail!("Unknown format: {} (use csv|json)", fmt);
    }

    let mut rows = query_rows(snapshot, sub)?;
    // Files read oldest first.
    rows.reverse();

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date", "type", "amount", "category", "description", "tags", "id",
            ])?;
            for r in rows {
                wtr.write_record([
                    r.date,
                    r.r#type,
                    r.amount,
                    r.category,
                    r.description,
                    r.tags,
                    r.id,
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            std::fs::write(out, serde_json::to_string_pretty(&rows)?)?;
        }
    }
    println!("Exported transactions to {}", out);
    Ok(())
}

pub fn export_report(snapshot: &TreasurySnapshot, sub: &clap::ArgMatches) -> Result<()> {
    let out = sub.get_one::<String>("out").context("--out is required")?;
    let month = month_or_current(sub)?;
    let period = selected_period(snapshot, sub)?;
    let fund = initial_fund(period);
    let txs = &snapshot.transactions;

    let by_category: serde_json::Map<String, serde_json::Value> = TransactionType::ALL
        .iter()
        .map(|k| -> Result<(String, serde_json::Value)> {
            let totals = category_breakdown(txs, &snapshot.categories, month, *k);
            Ok((k.to_string(), serde_json::to_value(totals)?))
        })
        .collect::<Result<_>>()?;

    let report = json!({
        "month": month.to_string(),
        "period": period.map(|p| p.name.clone()),
        "stats": monthly_stats(txs, month, fund, txs),
        "weeks": weekly_breakdown(txs, month, today()),
        "comparison": monthly_comparisons(txs, month, fund),
        "byCategory": by_category,
    });
    std::fs::write(out, serde_json::to_string_pretty(&report)?)
        .with_context(|| format!("Write report to {}", out))?;
    println!("Exported {} report to {}", month, out);
    Ok(())
}
