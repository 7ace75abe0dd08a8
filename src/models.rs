// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, NaiveDate, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::utils::parse_loose_date;

pub const UNCATEGORIZED_NAME: &str = "Uncategorized";
pub const UNNAMED_CATEGORY: &str = "Unnamed category";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Donation,
    Investment,
    Expense,
}

impl TransactionType {
    pub const ALL: [TransactionType; 4] = [
        TransactionType::Income,
        TransactionType::Donation,
        TransactionType::Investment,
        TransactionType::Expense,
    ];

    /// Exact match on the stored spelling; anything else is unrecognized.
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "income" => Some(Self::Income),
            "donation" => Some(Self::Donation),
            "investment" => Some(Self::Investment),
            "expense" => Some(Self::Expense),
            _ => None,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Donation => "donation",
            Self::Investment => "investment",
            Self::Expense => "expense",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s.trim())
            .ok_or_else(|| ValidationError::InvalidMovement(format!("unknown type '{}'", s)))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Light,
    Dark,
}

impl Theme {
    /// Only the exact string `dark` selects the dark theme.
    pub fn coerce(s: Option<&str>) -> Self {
        match s {
            Some("dark") => Self::Dark,
            _ => Self::Light,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category_id: String,
    pub description: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    /// Capital spent to produce an income. Informational only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub investment_amount: Option<Decimal>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Transaction {
    pub fn has_tag(&self, tag: &str) -> bool {
        self.tags
            .as_ref()
            .is_some_and(|tags| tags.iter().any(|t| t == tag))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Category {
    pub id: String,
    pub name: String,
    pub r#type: TransactionType,
    pub is_default: bool,
}

impl Category {
    pub fn uncategorized_id(kind: TransactionType) -> String {
        format!("uncategorized-{}", kind)
    }

    /// The synthetic fallback bucket for transactions of `kind` whose
    /// category reference cannot be resolved.
    pub fn uncategorized(kind: TransactionType) -> Self {
        Self {
            id: Self::uncategorized_id(kind),
            name: UNCATEGORIZED_NAME.to_string(),
            r#type: kind,
            is_default: true,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Period {
    pub id: String,
    pub name: String,
    /// Canonical `YYYY-MM-DD` when the stored value parses, otherwise kept verbatim.
    pub start_date: String,
    pub end_date: String,
    pub initial_fund: Decimal,
    pub created_at: DateTime<Utc>,
}

impl Period {
    pub fn start(&self) -> Option<NaiveDate> {
        parse_loose_date(&self.start_date)
    }

    pub fn end(&self) -> Option<NaiveDate> {
        parse_loose_date(&self.end_date)
    }

    /// Unparseable bounds are treated as open.
    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start().is_none_or(|s| date >= s) && self.end().is_none_or(|e| date <= e)
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct AppSettings {
    pub current_period_id: Option<String>,
    pub has_completed_onboarding: bool,
    pub theme: Theme,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct MonthlyStats {
    pub income: Decimal,
    pub donations: Decimal,
    pub investments: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WeeklyBreakdown {
    pub week_number: u32,
    pub week_start: NaiveDate,
    pub week_end: NaiveDate,
    pub income: Decimal,
    pub donations: Decimal,
    pub investments: Decimal,
    pub expenses: Decimal,
    pub net: Decimal,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Trend {
    Up,
    Down,
    Same,
    NoData,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Comparison {
    pub current: Decimal,
    pub previous: Decimal,
    pub difference: Decimal,
    pub percentage_change: Option<Decimal>,
    pub trend: Trend,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MonthlyComparisons {
    pub income: Comparison,
    pub expenses: Comparison,
    pub net: Comparison,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CategoryTotal {
    pub category_id: String,
    pub name: String,
    pub total: Decimal,
    pub count: usize,
}

/// An interactive creation request, not yet validated.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub r#type: String,
    pub amount: Decimal,
    pub date: String,
    pub category_id: String,
    #[serde(default)]
    pub description: String,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub payment_method: Option<String>,
    #[serde(default)]
    pub receipt: Option<String>,
    #[serde(default)]
    pub investment_amount: Option<Decimal>,
}

/// The validated content of a transaction, before the store assigns
/// identity and timestamps.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDraft {
    pub r#type: TransactionType,
    pub amount: Decimal,
    pub date: NaiveDate,
    pub category_id: String,
    pub description: String,
    pub tags: Option<Vec<String>>,
    pub payment_method: Option<String>,
    pub receipt: Option<String>,
    pub investment_amount: Option<Decimal>,
}

impl TransactionDraft {
    pub fn into_transaction(
        self,
        id: String,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
    ) -> Transaction {
        Transaction {
            id,
            r#type: self.r#type,
            amount: self.amount,
            date: self.date,
            category_id: self.category_id,
            description: self.description,
            tags: self.tags,
            payment_method: self.payment_method,
            receipt: self.receipt,
            investment_amount: self.investment_amount,
            created_at,
            updated_at,
        }
    }
}
