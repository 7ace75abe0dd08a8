// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Storage contract shared by the local and SQLite backends.
//!
//! Backends only move records in and out of storage. Validation and the
//! assembly of new records live here so both backends apply the same rules.

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::{Result, TreasuryError, ValidationError};
use crate::models::{
    AppSettings, Category, NewTransaction, Period, Theme, Transaction, TransactionType,
};
use crate::normalize::normalize_transaction_input;
use crate::snapshot::{RawSnapshot, TreasurySnapshot};
use crate::utils::{format_date, stored_precision};

pub trait Repository {
    /// Stored records exactly as held, before any repair.
    fn raw_snapshot(&mut self) -> Result<RawSnapshot>;

    /// The normalized snapshot. A repaired snapshot is written back first.
    fn get_snapshot(&mut self) -> Result<TreasurySnapshot>;

    fn add_transaction(&mut self, input: NewTransaction) -> Result<Transaction>;
    fn update_transaction(&mut self, id: &str, patch: TransactionPatch) -> Result<()>;
    fn delete_transaction(&mut self, id: &str) -> Result<()>;

    fn add_category(&mut self, input: NewCategory) -> Result<Category>;
    fn update_category(&mut self, id: &str, patch: CategoryPatch) -> Result<()>;
    fn delete_category(&mut self, id: &str) -> Result<()>;

    fn add_period(&mut self, input: NewPeriod) -> Result<Period>;
    fn update_period(&mut self, id: &str, patch: PeriodPatch) -> Result<()>;

    fn update_settings(&mut self, patch: SettingsPatch) -> Result<AppSettings>;

    /// Wipes transactions, categories, periods and settings.
    fn reset_all(&mut self) -> Result<()>;
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TransactionPatch {
    pub r#type: Option<String>,
    pub amount: Option<Decimal>,
    pub date: Option<String>,
    pub category_id: Option<String>,
    pub description: Option<String>,
    pub tags: Option<Vec<String>>,
    /// `Some("")` clears the field.
    pub payment_method: Option<String>,
    pub receipt: Option<String>,
    pub investment_amount: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewCategory {
    pub name: String,
    pub r#type: TransactionType,
    #[serde(default)]
    pub is_default: bool,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryPatch {
    pub name: Option<String>,
    pub r#type: Option<TransactionType>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewPeriod {
    pub name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub initial_fund: Decimal,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PeriodPatch {
    pub name: Option<String>,
    pub start_date: Option<NaiveDate>,
    pub end_date: Option<NaiveDate>,
    pub initial_fund: Option<Decimal>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SettingsPatch {
    /// `Some(None)` clears the current period.
    pub current_period_id: Option<Option<String>>,
    pub has_completed_onboarding: Option<bool>,
    pub theme: Option<Theme>,
}

pub fn new_id() -> String {
    uuid::Uuid::new_v4().to_string()
}

/// A validated transaction plus the categories that must be persisted
/// before it.
#[derive(Debug, Clone, PartialEq)]
pub struct PreparedTransaction {
    pub transaction: Transaction,
    pub new_categories: Vec<Category>,
}

pub fn prepare_new_transaction(
    input: &NewTransaction,
    categories: &[Category],
    now: DateTime<Utc>,
) -> Result<PreparedTransaction> {
    let normalized = normalize_transaction_input(input, categories)?;
    let new_categories = if normalized.categories_changed {
        normalized.categories[categories.len()..].to_vec()
    } else {
        Vec::new()
    };
    Ok(PreparedTransaction {
        transaction: normalized.transaction.into_transaction(new_id(), now, now),
        new_categories,
    })
}

/// Merges `patch` over `existing` and validates the result with the
/// creation rules. Identity and `created_at` are preserved.
pub fn prepare_updated_transaction(
    existing: &Transaction,
    patch: TransactionPatch,
    categories: &[Category],
    now: DateTime<Utc>,
) -> Result<PreparedTransaction> {
    let merged = NewTransaction {
        r#type: patch
            .r#type
            .unwrap_or_else(|| existing.r#type.as_str().to_string()),
        amount: patch.amount.unwrap_or(existing.amount),
        date: patch.date.unwrap_or_else(|| format_date(existing.date)),
        category_id: patch
            .category_id
            .unwrap_or_else(|| existing.category_id.clone()),
        description: patch
            .description
            .unwrap_or_else(|| existing.description.clone()),
        tags: patch
            .tags
            .unwrap_or_else(|| existing.tags.clone().unwrap_or_default()),
        payment_method: patch.payment_method.or_else(|| existing.payment_method.clone()),
        receipt: patch.receipt.or_else(|| existing.receipt.clone()),
        investment_amount: patch.investment_amount.or(existing.investment_amount),
    };
    let normalized = normalize_transaction_input(&merged, categories)?;
    let new_categories = if normalized.categories_changed {
        normalized.categories[categories.len()..].to_vec()
    } else {
        Vec::new()
    };
    let updated_at = now.max(existing.created_at);
    Ok(PreparedTransaction {
        transaction: normalized.transaction.into_transaction(
            existing.id.clone(),
            existing.created_at,
            updated_at,
        ),
        new_categories,
    })
}

pub fn build_category(input: NewCategory) -> Result<Category> {
    let name = input.name.trim();
    if name.is_empty() {
        return Err(ValidationError::InvalidCategory("name cannot be empty".into()).into());
    }
    Ok(Category {
        id: new_id(),
        name: name.to_string(),
        r#type: input.r#type,
        is_default: input.is_default,
    })
}

pub fn apply_category_patch(category: &mut Category, patch: CategoryPatch) -> Result<()> {
    if let Some(name) = patch.name {
        let name = name.trim();
        if name.is_empty() {
            return Err(ValidationError::InvalidCategory("name cannot be empty".into()).into());
        }
        category.name = name.to_string();
    }
    if let Some(kind) = patch.r#type {
        category.r#type = kind;
    }
    Ok(())
}

fn validate_period(name: &str, start: NaiveDate, end: NaiveDate, fund: Decimal) -> Result<()> {
    if name.trim().is_empty() {
        return Err(ValidationError::InvalidPeriod("name cannot be empty".into()).into());
    }
    if end < start {
        return Err(ValidationError::InvalidPeriod(format!(
            "end {} is before start {}",
            end, start
        ))
        .into());
    }
    if fund < Decimal::ZERO {
        return Err(ValidationError::InvalidPeriod("initial fund cannot be negative".into()).into());
    }
    Ok(())
}

pub fn build_period(input: NewPeriod, now: DateTime<Utc>) -> Result<Period> {
    validate_period(&input.name, input.start_date, input.end_date, input.initial_fund)?;
    Ok(Period {
        id: new_id(),
        name: input.name.trim().to_string(),
        start_date: format_date(input.start_date),
        end_date: format_date(input.end_date),
        initial_fund: stored_precision(input.initial_fund),
        created_at: now,
    })
}

pub fn apply_period_patch(period: &mut Period, patch: PeriodPatch) -> Result<()> {
    let name = patch.name.unwrap_or_else(|| period.name.clone());
    let fund = patch.initial_fund.unwrap_or(period.initial_fund);
    let start = patch.start_date.or_else(|| period.start());
    let end = patch.end_date.or_else(|| period.end());
    match (start, end) {
        (Some(s), Some(e)) => validate_period(&name, s, e, fund)?,
        // A stored bound that never parsed can only be fixed, not checked.
        _ => validate_period(&name, NaiveDate::MIN, NaiveDate::MAX, fund)?,
    }
    period.name = name.trim().to_string();
    period.initial_fund = stored_precision(fund);
    if let Some(s) = patch.start_date {
        period.start_date = format_date(s);
    }
    if let Some(e) = patch.end_date {
        period.end_date = format_date(e);
    }
    Ok(())
}

pub fn apply_settings_patch(
    settings: &mut AppSettings,
    patch: SettingsPatch,
    periods: &[Period],
) -> Result<()> {
    if let Some(current) = patch.current_period_id {
        if let Some(id) = current.as_deref() {
            if !periods.iter().any(|p| p.id == id) {
                return Err(TreasuryError::not_found("period", id));
            }
        }
        settings.current_period_id = current;
    }
    if let Some(done) = patch.has_completed_onboarding {
        settings.has_completed_onboarding = done;
    }
    if let Some(theme) = patch.theme {
        settings.theme = theme;
    }
    Ok(())
}

/// Seed categories installed on a fresh account.
pub fn default_categories() -> Vec<NewCategory> {
    let seed: [(TransactionType, &str); 10] = [
        (TransactionType::Income, "Salary"),
        (TransactionType::Income, "Other income"),
        (TransactionType::Donation, "Offerings"),
        (TransactionType::Donation, "Tithes"),
        (TransactionType::Investment, "Savings"),
        (TransactionType::Investment, "Securities"),
        (TransactionType::Expense, "Utilities"),
        (TransactionType::Expense, "Supplies"),
        (TransactionType::Expense, "Maintenance"),
        (TransactionType::Expense, "Other expenses"),
    ];
    seed.into_iter()
        .map(|(kind, name)| NewCategory {
            name: name.to_string(),
            r#type: kind,
            is_default: true,
        })
        .collect()
}

/// Installs the default categories when the account has none. Returns how
/// many were added.
pub fn seed_default_categories(repo: &mut dyn Repository) -> Result<usize> {
    if !repo.get_snapshot()?.categories.is_empty() {
        return Ok(0);
    }
    let seed = default_categories();
    let n = seed.len();
    for c in seed {
        repo.add_category(c)?;
    }
    Ok(n)
}
