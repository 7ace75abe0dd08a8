// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Stored and canonical forms of an account snapshot.
//!
//! [`RawSnapshot`] mirrors what a backend actually holds: every field is
//! optional and numbers or strings of the wrong shape deserialize to `None`
//! instead of failing the whole document. [`TreasurySnapshot`] is the typed
//! form produced by the normalizer and consumed by the statistics layer.

use serde::de::DeserializeOwned;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;

use crate::models::{AppSettings, Category, Period, Transaction};
use crate::utils::{amount_to_f64, format_date, format_timestamp};

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawTransaction {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub category_id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, deserialize_with = "lenient_tags", skip_serializing_if = "Option::is_none")]
    pub tags: Option<Vec<Option<String>>>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub payment_method: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub receipt: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub investment_amount: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawCategory {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub r#type: Option<String>,
    #[serde(default, deserialize_with = "lenient_bool", skip_serializing_if = "Option::is_none")]
    pub is_default: Option<bool>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawPeriod {
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub id: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub start_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub end_date: Option<String>,
    #[serde(default, deserialize_with = "lenient_number", skip_serializing_if = "Option::is_none")]
    pub initial_fund: Option<f64>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub created_at: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RawSettings {
    #[serde(default, deserialize_with = "lenient_string")]
    pub current_period_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub has_completed_onboarding: Option<Value>,
    #[serde(default, deserialize_with = "lenient_string", skip_serializing_if = "Option::is_none")]
    pub theme: Option<String>,
}

/// A whole stored document. Deserializing never fails on an individual
/// record: entries that are not objects or do not fit their record shape
/// are left out, and `lossy` records that the document read back differs
/// from what was stored.
#[derive(Debug, Clone, PartialEq, Default, Serialize)]
pub struct RawSnapshot {
    pub transactions: Vec<RawTransaction>,
    pub categories: Vec<RawCategory>,
    pub periods: Vec<RawPeriod>,
    pub settings: RawSettings,
    /// Set when reading dropped an entry or coerced a value.
    #[serde(skip)]
    pub lossy: bool,
}

impl<'de> Deserialize<'de> for RawSnapshot {
    fn deserialize<D>(d: D) -> Result<Self, D::Error>
    where
        D: Deserializer<'de>,
    {
        let Value::Object(doc) = Value::deserialize(d)? else {
            return Err(serde::de::Error::custom("snapshot must be a JSON object"));
        };
        let mut lossy = false;
        let transactions = records(doc.get("transactions"), &mut lossy);
        let categories = records(doc.get("categories"), &mut lossy);
        let periods = records(doc.get("periods"), &mut lossy);
        let settings = match doc.get("settings") {
            None => RawSettings::default(),
            Some(v) => record(v, &mut lossy).unwrap_or_else(|| {
                lossy = true;
                RawSettings::default()
            }),
        };
        lossy |= doc
            .keys()
            .any(|k| !matches!(k.as_str(), "transactions" | "categories" | "periods" | "settings"));
        Ok(Self {
            transactions,
            categories,
            periods,
            settings,
            lossy,
        })
    }
}

fn records<T>(v: Option<&Value>, lossy: &mut bool) -> Vec<T>
where
    T: DeserializeOwned + Serialize,
{
    match v {
        None => Vec::new(),
        Some(Value::Array(items)) => items
            .iter()
            .filter_map(|item| {
                let r = record(item, lossy);
                *lossy |= r.is_none();
                r
            })
            .collect(),
        Some(_) => {
            *lossy = true;
            Vec::new()
        }
    }
}

/// One object-shaped record, flagging `lossy` when the typed form would
/// serialize differently from the stored value.
fn record<T>(v: &Value, lossy: &mut bool) -> Option<T>
where
    T: DeserializeOwned + Serialize,
{
    if !v.is_object() {
        return None;
    }
    let r: T = serde_json::from_value(v.clone()).ok()?;
    let same = serde_json::to_value(&r).is_ok_and(|back| same_json(&back, v));
    *lossy |= !same;
    Some(r)
}

/// Structural equality where numbers compare by value, so `1000` and
/// `1000.0` match.
fn same_json(a: &Value, b: &Value) -> bool {
    match (a, b) {
        (Value::Number(x), Value::Number(y)) => x.as_f64() == y.as_f64(),
        (Value::Array(x), Value::Array(y)) => {
            x.len() == y.len() && x.iter().zip(y).all(|(a, b)| same_json(a, b))
        }
        (Value::Object(x), Value::Object(y)) => {
            x.len() == y.len()
                && x.iter()
                    .all(|(k, a)| y.get(k).is_some_and(|b| same_json(a, b)))
        }
        _ => a == b,
    }
}

/// A snapshot whose records satisfy every field and reference invariant.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
pub struct TreasurySnapshot {
    pub transactions: Vec<Transaction>,
    pub categories: Vec<Category>,
    pub periods: Vec<Period>,
    pub settings: AppSettings,
}

impl TreasurySnapshot {
    pub fn category(&self, id: &str) -> Option<&Category> {
        self.categories.iter().find(|c| c.id == id)
    }

    pub fn transaction(&self, id: &str) -> Option<&Transaction> {
        self.transactions.iter().find(|t| t.id == id)
    }

    pub fn period(&self, id: &str) -> Option<&Period> {
        self.periods.iter().find(|p| p.id == id)
    }

    pub fn current_period(&self) -> Option<&Period> {
        self.settings
            .current_period_id
            .as_deref()
            .and_then(|id| self.period(id))
    }

    pub fn to_raw(&self) -> RawSnapshot {
        RawSnapshot::from(self)
    }
}

impl From<&Transaction> for RawTransaction {
    fn from(t: &Transaction) -> Self {
        Self {
            id: Some(t.id.clone()),
            r#type: Some(t.r#type.as_str().to_string()),
            amount: amount_to_f64(t.amount),
            date: Some(format_date(t.date)),
            category_id: Some(t.category_id.clone()),
            description: Some(t.description.clone()),
            tags: t
                .tags
                .as_ref()
                .map(|tags| tags.iter().cloned().map(Some).collect()),
            payment_method: t.payment_method.clone(),
            receipt: t.receipt.clone(),
            investment_amount: t.investment_amount.and_then(amount_to_f64),
            created_at: Some(format_timestamp(&t.created_at)),
            updated_at: Some(format_timestamp(&t.updated_at)),
        }
    }
}

impl From<&Category> for RawCategory {
    fn from(c: &Category) -> Self {
        Self {
            id: Some(c.id.clone()),
            name: Some(c.name.clone()),
            r#type: Some(c.r#type.as_str().to_string()),
            is_default: Some(c.is_default),
        }
    }
}

impl From<&Period> for RawPeriod {
    fn from(p: &Period) -> Self {
        Self {
            id: Some(p.id.clone()),
            name: Some(p.name.clone()),
            start_date: Some(p.start_date.clone()),
            end_date: Some(p.end_date.clone()),
            initial_fund: amount_to_f64(p.initial_fund),
            created_at: Some(format_timestamp(&p.created_at)),
        }
    }
}

impl From<&AppSettings> for RawSettings {
    fn from(s: &AppSettings) -> Self {
        Self {
            current_period_id: s.current_period_id.clone(),
            has_completed_onboarding: Some(Value::Bool(s.has_completed_onboarding)),
            theme: Some(s.theme.as_str().to_string()),
        }
    }
}

impl From<&TreasurySnapshot> for RawSnapshot {
    fn from(s: &TreasurySnapshot) -> Self {
        Self {
            transactions: s.transactions.iter().map(RawTransaction::from).collect(),
            categories: s.categories.iter().map(RawCategory::from).collect(),
            periods: s.periods.iter().map(RawPeriod::from).collect(),
            settings: RawSettings::from(&s.settings),
            lossy: false,
        }
    }
}

/// Loose truthiness for stored flags: `null`, `false`, `0`, `""` are false.
pub fn truthy(v: Option<&Value>) -> bool {
    match v {
        None | Some(Value::Null) => false,
        Some(Value::Bool(b)) => *b,
        Some(Value::Number(n)) => n.as_f64().is_some_and(|f| f != 0.0 && !f.is_nan()),
        Some(Value::String(s)) => !s.is_empty(),
        Some(Value::Array(_)) | Some(Value::Object(_)) => true,
    }
}

fn lenient_string<'de, D>(d: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::String(s)) => Some(s),
        Some(Value::Number(n)) => Some(n.to_string()),
        _ => None,
    })
}

fn lenient_number<'de, D>(d: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Number(n)) => n.as_f64(),
        Some(Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn lenient_bool<'de, D>(d: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Bool(b)) => Some(b),
        _ => None,
    })
}

fn lenient_tags<'de, D>(d: D) -> Result<Option<Vec<Option<String>>>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Option::<Value>::deserialize(d)? {
        Some(Value::Array(items)) => Some(
            items
                .into_iter()
                .map(|v| match v {
                    Value::String(s) => Some(s),
                    _ => None,
                })
                .collect(),
        ),
        _ => None,
    })
}
