// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::Result;
use serde::Serialize;

use crate::commands::{resolve_category, selected_period, today};
use crate::models::{NewTransaction, TransactionType};
use crate::repository::{Repository, TransactionPatch};
use crate::snapshot::TreasurySnapshot;
use crate::stats::TransactionFilter;
use crate::utils::{fmt_money, format_date, maybe_print_json, parse_decimal, pretty_table};

pub fn handle(repo: &mut dyn Repository, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(repo, sub)?,
        Some(("list", sub)) => list(repo, sub)?,
        Some(("update", sub)) => update(repo, sub)?,
        Some(("rm", sub)) => {
            let id = sub.get_one::<String>("id").map(String::as_str).unwrap_or_default();
            repo.delete_transaction(id)?;
            println!("Removed transaction {}", id);
        }
        _ => {}
    }
    Ok(())
}

fn opt_string(sub: &clap::ArgMatches, name: &str) -> Option<String> {
    sub.get_one::<String>(name).cloned()
}

fn add(repo: &mut dyn Repository, sub: &clap::ArgMatches) -> Result<()> {
    let snapshot = repo.get_snapshot()?;
    let kind = opt_string(sub, "type").unwrap_or_default();
    let amount = parse_decimal(sub.get_one::<String>("amount").map(String::as_str).unwrap_or("0"))?;
    let category = opt_string(sub, "category").unwrap_or_default();
    let input = NewTransaction {
        category_id: resolve_category(&snapshot, TransactionType::parse(kind.trim()), &category),
        r#type: kind,
        amount,
        date: opt_string(sub, "date").unwrap_or_else(|| format_date(today())),
        description: opt_string(sub, "description").unwrap_or_default(),
        tags: sub
            .get_many::<String>("tag")
            .map(|v| v.cloned().collect())
            .unwrap_or_default(),
        payment_method: opt_string(sub, "payment-method"),
        receipt: opt_string(sub, "receipt"),
        investment_amount: opt_string(sub, "investment-amount")
            .map(|s| parse_decimal(&s))
            .transpose()?,
    };
    let t = repo.add_transaction(input)?;
    println!(
        "Recorded {} {} on {} ({})",
        t.r#type,
        fmt_money(&t.amount),
        t.date,
        t.id
    );
    Ok(())
}

fn update(repo: &mut dyn Repository, sub: &clap::ArgMatches) -> Result<()> {
    let id = opt_string(sub, "id").unwrap_or_default();
    let snapshot = repo.get_snapshot()?;
    let kind = opt_string(sub, "type")
        .as_deref()
        .and_then(|k| TransactionType::parse(k.trim()))
        .or_else(|| snapshot.transaction(&id).map(|t| t.r#type));
    let patch = TransactionPatch {
        r#type: opt_string(sub, "type"),
        amount: opt_string(sub, "amount")
            .map(|s| parse_decimal(&s))
            .transpose()?,
        date: opt_string(sub, "date"),
        category_id: opt_string(sub, "category").map(|c| resolve_category(&snapshot, kind, &c)),
        description: opt_string(sub, "description"),
        tags: sub.get_many::<String>("tag").map(|v| v.cloned().collect()),
        payment_method: opt_string(sub, "payment-method"),
        receipt: opt_string(sub, "receipt"),
        investment_amount: opt_string(sub, "investment-amount")
            .map(|s| parse_decimal(&s))
            .transpose()?,
    };
    repo.update_transaction(&id, patch)?;
    println!("Updated transaction {}", id);
    Ok(())
}

fn list(repo: &mut dyn Repository, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let snapshot = repo.get_snapshot()?;
    let data = query_rows(&snapshot, sub)?;
    if !maybe_print_json(json_flag, jsonl_flag, &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|r| {
                vec![
                    r.date.clone(),
                    r.r#type.clone(),
                    r.amount.clone(),
                    r.category.clone(),
                    r.description.clone(),
                    r.tags.clone(),
                    r.id.clone(),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["Date", "Type", "Amount", "Category", "Description", "Tags", "Id"],
                rows,
            )
        );
    }
    Ok(())
}

#[derive(Debug, Serialize)]
pub struct TransactionRow {
    pub id: String,
    pub date: String,
    pub r#type: String,
    pub amount: String,
    pub category: String,
    pub description: String,
    pub tags: String,
}

pub fn build_filter(snapshot: &TreasurySnapshot, sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    let mut filter = match selected_period(snapshot, sub)? {
        Some(p) if sub.get_one::<String>("period").is_some() => TransactionFilter::for_period(p),
        _ => TransactionFilter::default(),
    };
    filter.kind = sub
        .try_get_one::<String>("type")
        .ok()
        .flatten()
        .and_then(|k| TransactionType::parse(k));
    filter.category_id = sub
        .try_get_one::<String>("category")
        .ok()
        .flatten()
        .map(|c| resolve_category(snapshot, filter.kind, c));
    filter.tag = sub.try_get_one::<String>("tag").ok().flatten().cloned();
    filter.month = match sub.get_one::<String>("month") {
        Some(m) => Some(m.parse()?),
        None => None,
    };
    filter.text = sub.try_get_one::<String>("search").ok().flatten().cloned();
    Ok(filter)
}

pub fn query_rows(snapshot: &TreasurySnapshot, sub: &clap::ArgMatches) -> Result<Vec<TransactionRow>> {
    let filter = build_filter(snapshot, sub)?;
    let limit = sub
        .try_get_one::<usize>("limit")
        .ok()
        .flatten()
        .copied()
        .unwrap_or(usize::MAX);
    Ok(filter
        .apply(&snapshot.transactions)
        .into_iter()
        .take(limit)
        .map(|t| TransactionRow {
            category: snapshot
                .category(&t.category_id)
                .map(|c| c.name.clone())
                .unwrap_or_default(),
            tags: t.tags.as_deref().unwrap_or_default().join(","),
            id: t.id,
            date: format_date(t.date),
            r#type: t.r#type.to_string(),
            amount: t.amount.to_string(),
            description: t.description,
        })
        .collect())
}
