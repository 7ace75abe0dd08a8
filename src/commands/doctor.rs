// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::normalize::{SanitizedSnapshot, normalize};
use crate::repository::Repository;
use crate::snapshot::RawSnapshot;
use crate::utils::{now, pretty_table};
use anyhow::Result;

/// What a normalization pass would do to the stored data.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Diagnosis {
    pub dropped_transactions: usize,
    pub dropped_categories: usize,
    pub dropped_periods: usize,
    pub created_categories: usize,
    pub redirected_transactions: usize,
    pub current_period_reset: bool,
    pub changed: bool,
}

pub fn diagnose(raw: &RawSnapshot, sanitized: &SanitizedSnapshot) -> Diagnosis {
    let s = &sanitized.snapshot;
    let kept_raw_categories = s
        .categories
        .iter()
        .filter(|c| raw.categories.iter().any(|r| r.id.as_deref() == Some(c.id.as_str())))
        .count();
    let redirected = s
        .transactions
        .iter()
        .filter(|t| {
            raw.transactions
                .iter()
                .find(|r| r.id.as_deref() == Some(t.id.as_str()))
                .is_some_and(|r| r.category_id.as_deref() != Some(t.category_id.as_str()))
        })
        .count();
    Diagnosis {
        dropped_transactions: raw.transactions.len() - s.transactions.len(),
        dropped_categories: raw.categories.len().saturating_sub(kept_raw_categories),
        dropped_periods: raw.periods.len() - s.periods.len(),
        created_categories: s.categories.len() - kept_raw_categories,
        redirected_transactions: redirected,
        current_period_reset: raw.settings.current_period_id != s.settings.current_period_id,
        changed: sanitized.changed,
    }
}

pub fn handle(repo: &mut dyn Repository, m: &clap::ArgMatches) -> Result<()> {
    let raw = repo.raw_snapshot()?;
    let sanitized = normalize(&raw, now());
    let d = diagnose(&raw, &sanitized);

    if !d.changed {
        println!("doctor: no issues found");
        return Ok(());
    }
    let rows = vec![
        vec!["dropped_transactions".into(), d.dropped_transactions.to_string()],
        vec!["dropped_categories".into(), d.dropped_categories.to_string()],
        vec!["dropped_periods".into(), d.dropped_periods.to_string()],
        vec!["created_categories".into(), d.created_categories.to_string()],
        vec!["redirected_transactions".into(), d.redirected_transactions.to_string()],
        vec!["current_period_reset".into(), d.current_period_reset.to_string()],
    ];
    println!("{}", pretty_table(&["Issue", "Count"], rows));
    if m.get_flag("fix") {
        repo.get_snapshot()?;
        println!("Repaired snapshot written back");
    } else {
        println!("Run with --fix to write the repaired snapshot back");
    }
    Ok(())
}
