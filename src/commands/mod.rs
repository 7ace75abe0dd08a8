// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

pub mod categories;
pub mod doctor;
pub mod exporter;
pub mod periods;
pub mod reports;
pub mod settings;
pub mod transactions;

use anyhow::{Result, anyhow};
use chrono::{Local, NaiveDate};
use rust_decimal::Decimal;

use crate::models::{Period, TransactionType};
use crate::snapshot::TreasurySnapshot;
use crate::utils::Month;

pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

pub fn month_or_current(sub: &clap::ArgMatches) -> Result<Month> {
    match sub.get_one::<String>("month") {
        Some(m) => m.parse(),
        None => Ok(Month::of(today())),
    }
}

/// The period named by `--period`, or the current one.
pub fn selected_period<'a>(
    snapshot: &'a TreasurySnapshot,
    sub: &clap::ArgMatches,
) -> Result<Option<&'a Period>> {
    match sub.get_one::<String>("period") {
        Some(id) => snapshot
            .period(id)
            .map(Some)
            .ok_or_else(|| anyhow!("Period '{}' not found", id)),
        None => Ok(snapshot.current_period()),
    }
}

pub fn initial_fund(period: Option<&Period>) -> Decimal {
    period.map_or(Decimal::ZERO, |p| p.initial_fund)
}

/// Accepts a category id or a case-insensitive name within `kind`. Unknown
/// keys pass through and are redirected by normalization.
pub fn resolve_category(snapshot: &TreasurySnapshot, kind: Option<TransactionType>, key: &str) -> String {
    if snapshot.category(key).is_some() {
        return key.to_string();
    }
    snapshot
        .categories
        .iter()
        .find(|c| kind.is_none_or(|k| c.r#type == k) && c.name.eq_ignore_ascii_case(key.trim()))
        .map(|c| c.id.clone())
        .unwrap_or_else(|| key.to_string())
}
