// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Read-time repair of stored snapshots and write-time validation of new
//! movements.
//!
//! [`normalize`] never fails: malformed records are fixed up or dropped and
//! the caller learns through [`SanitizedSnapshot::changed`] whether the
//! repaired form has to be written back. [`normalize_transaction_input`]
//! rejects bad input instead, because it runs on an interactive write.

use std::collections::{HashMap, HashSet};

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;

use crate::error::ValidationError;
use crate::models::{
    AppSettings, Category, NewTransaction, Period, Theme, Transaction, TransactionDraft,
    TransactionType, UNCATEGORIZED_NAME, UNNAMED_CATEGORY,
};
use crate::snapshot::{
    RawCategory, RawPeriod, RawSettings, RawSnapshot, RawTransaction, TreasurySnapshot, truthy,
};
use crate::utils::{
    amount_from_f64, format_date, parse_loose_date, parse_timestamp, stored_precision,
};

#[derive(Debug, Clone, PartialEq)]
pub struct SanitizedSnapshot {
    pub snapshot: TreasurySnapshot,
    /// True when the repaired snapshot differs from the stored one.
    pub changed: bool,
}

#[derive(Debug, Clone, PartialEq)]
pub struct NormalizedInput {
    pub transaction: TransactionDraft,
    /// The category list after resolution, including any synthesized bucket.
    pub categories: Vec<Category>,
    pub categories_changed: bool,
}

pub fn normalize(raw: &RawSnapshot, now: DateTime<Utc>) -> SanitizedSnapshot {
    let mut categories = normalize_categories(&raw.categories);
    let transactions = normalize_transactions(&raw.transactions, &mut categories, now);
    let periods = normalize_periods(&raw.periods, now);
    let mut settings = normalize_settings(&raw.settings);
    repair_current_period(&mut settings, &periods);

    let snapshot = TreasurySnapshot {
        transactions,
        categories,
        periods,
        settings,
    };
    let changed = raw.lossy || snapshot.to_raw() != *raw;
    SanitizedSnapshot { snapshot, changed }
}

/// Validates a single movement against `categories`, synthesizing the
/// fallback category when the reference does not resolve.
pub fn normalize_transaction_input(
    input: &NewTransaction,
    categories: &[Category],
) -> Result<NormalizedInput, ValidationError> {
    let kind: TransactionType = input.r#type.parse()?;
    if input.amount <= Decimal::ZERO {
        return Err(ValidationError::InvalidMovement(format!(
            "amount must be positive, got {}",
            input.amount
        )));
    }
    let date = parse_loose_date(&input.date).ok_or_else(|| {
        ValidationError::InvalidMovement(format!("unparseable date '{}'", input.date))
    })?;
    let investment_amount = match (kind, input.investment_amount) {
        (TransactionType::Income, Some(v)) if v < Decimal::ZERO => {
            return Err(ValidationError::InvalidMovement(
                "investment amount cannot be negative".into(),
            ));
        }
        (TransactionType::Income, v) => v.map(stored_precision),
        _ => None,
    };

    let mut list = categories.to_vec();
    let mut resolver = CategoryResolver::new(&mut list);
    let category_id = resolver.resolve(Some(input.category_id.trim()), kind);
    let categories_changed = resolver.created;

    let mut tags: Vec<String> = Vec::new();
    for tag in input.tags.iter().map(|t| t.trim()).filter(|t| !t.is_empty()) {
        if !tags.iter().any(|t| t == tag) {
            tags.push(tag.to_string());
        }
    }

    Ok(NormalizedInput {
        transaction: TransactionDraft {
            r#type: kind,
            amount: stored_precision(input.amount),
            date,
            category_id,
            description: input.description.trim().to_string(),
            tags: (!tags.is_empty()).then_some(tags),
            payment_method: trimmed(input.payment_method.as_deref()),
            receipt: trimmed(input.receipt.as_deref()),
            investment_amount,
        },
        categories: list,
        categories_changed,
    })
}

fn normalize_categories(raw: &[RawCategory]) -> Vec<Category> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(raw.len());
    for c in raw {
        let (Some(id), Some(name)) = (present(c.id.as_deref()), present(c.name.as_deref())) else {
            continue;
        };
        let Some(kind) = c.r#type.as_deref().and_then(TransactionType::parse) else {
            continue;
        };
        if !seen.insert(id.to_string()) {
            continue;
        }
        let name = name.trim();
        out.push(Category {
            id: id.to_string(),
            name: if name.is_empty() {
                UNNAMED_CATEGORY.to_string()
            } else {
                name.to_string()
            },
            r#type: kind,
            is_default: c.is_default.unwrap_or(false),
        });
    }
    out
}

fn normalize_transactions(
    raw: &[RawTransaction],
    categories: &mut Vec<Category>,
    now: DateTime<Utc>,
) -> Vec<Transaction> {
    let mut resolver = CategoryResolver::new(categories);
    raw.iter()
        .filter_map(|t| normalize_transaction(t, &mut resolver, now))
        .collect()
}

fn normalize_transaction(
    t: &RawTransaction,
    resolver: &mut CategoryResolver<'_>,
    now: DateTime<Utc>,
) -> Option<Transaction> {
    let kind = t.r#type.as_deref().and_then(TransactionType::parse)?;
    let id = present(t.id.as_deref())?;
    let amount = t
        .amount
        .filter(|a| a.is_finite() && *a > 0.0)
        .and_then(amount_from_f64)
        .filter(|a| *a > Decimal::ZERO)?;
    let date = t.date.as_deref().and_then(parse_loose_date)?;

    let category_id = resolver.resolve(t.category_id.as_deref(), kind);
    let created_at = t
        .created_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(now);
    let updated_at = t
        .updated_at
        .as_deref()
        .and_then(parse_timestamp)
        .unwrap_or(created_at)
        .max(created_at);
    let investment_amount = if kind == TransactionType::Income {
        t.investment_amount
            .filter(|v| v.is_finite() && *v >= 0.0)
            .and_then(amount_from_f64)
    } else {
        None
    };

    Some(Transaction {
        id: id.to_string(),
        r#type: kind,
        amount,
        date,
        category_id,
        description: t.description.as_deref().unwrap_or("").trim().to_string(),
        tags: t.tags.as_ref().map(|tags| {
            tags.iter()
                .filter_map(|tag| present(tag.as_deref()).map(str::to_string))
                .collect()
        }),
        payment_method: trimmed(t.payment_method.as_deref()),
        receipt: trimmed(t.receipt.as_deref()),
        investment_amount,
        created_at,
        updated_at,
    })
}

fn normalize_periods(raw: &[RawPeriod], now: DateTime<Utc>) -> Vec<Period> {
    raw.iter()
        .filter_map(|p| {
            let id = present(p.id.as_deref())?;
            let name = present(p.name.as_deref())?;
            Some(Period {
                id: id.to_string(),
                name: name.to_string(),
                start_date: canonical_date(p.start_date.as_deref()),
                end_date: canonical_date(p.end_date.as_deref()),
                initial_fund: p
                    .initial_fund
                    .filter(|f| f.is_finite())
                    .and_then(amount_from_f64)
                    .unwrap_or(Decimal::ZERO),
                created_at: p
                    .created_at
                    .as_deref()
                    .and_then(parse_timestamp)
                    .unwrap_or(now),
            })
        })
        .collect()
}

fn normalize_settings(raw: &RawSettings) -> AppSettings {
    AppSettings {
        current_period_id: raw.current_period_id.clone(),
        has_completed_onboarding: truthy(raw.has_completed_onboarding.as_ref()),
        theme: Theme::coerce(raw.theme.as_deref()),
    }
}

fn repair_current_period(settings: &mut AppSettings, periods: &[Period]) {
    let valid = settings
        .current_period_id
        .as_deref()
        .is_some_and(|id| periods.iter().any(|p| p.id == id));
    if !valid {
        settings.current_period_id = periods.first().map(|p| p.id.clone());
    }
}

/// Resolves category references against a mutable category list, appending
/// at most one fallback category per type.
struct CategoryResolver<'a> {
    categories: &'a mut Vec<Category>,
    types: HashMap<String, TransactionType>,
    placeholders: HashSet<String>,
    fallback: HashMap<TransactionType, String>,
    created: bool,
}

impl<'a> CategoryResolver<'a> {
    fn new(categories: &'a mut Vec<Category>) -> Self {
        let types = categories
            .iter()
            .map(|c| (c.id.clone(), c.r#type))
            .collect();
        let placeholders = categories
            .iter()
            .filter(|c| c.name == UNCATEGORIZED_NAME)
            .map(|c| c.id.clone())
            .collect();
        Self {
            categories,
            types,
            placeholders,
            fallback: HashMap::new(),
            created: false,
        }
    }

    fn resolve(&mut self, id: Option<&str>, kind: TransactionType) -> String {
        if let Some(id) = id.filter(|id| self.types.get(*id) == Some(&kind)) {
            return id.to_string();
        }
        if let Some(id) = self.fallback.get(&kind) {
            return id.clone();
        }

        let base = Category::uncategorized_id(kind);
        let mut candidate = base.clone();
        let mut n = 2;
        // A taken id is reused only when it is already an "Uncategorized"
        // category of the same type.
        while let Some(existing) = self.types.get(&candidate) {
            if *existing == kind && self.placeholders.contains(&candidate) {
                break;
            }
            candidate = format!("{}-{}", base, n);
            n += 1;
        }
        if !self.types.contains_key(&candidate) {
            let mut category = Category::uncategorized(kind);
            category.id = candidate.clone();
            self.types.insert(candidate.clone(), kind);
            self.placeholders.insert(candidate.clone());
            self.categories.push(category);
            self.created = true;
        }
        self.fallback.insert(kind, candidate.clone());
        candidate
    }
}

fn present(s: Option<&str>) -> Option<&str> {
    s.filter(|s| !s.is_empty())
}

fn trimmed(s: Option<&str>) -> Option<String> {
    s.map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

fn canonical_date(s: Option<&str>) -> String {
    let s = s.unwrap_or("");
    parse_loose_date(s).map(format_date).unwrap_or_else(|| s.to_string())
}
