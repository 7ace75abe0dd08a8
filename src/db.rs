// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::collections::HashMap;
use std::path::Path;

use rusqlite::types::Value as SqlValue;
use rusqlite::{Connection, Row, params};
use serde_json::Value;
use tracing::{debug, info, warn};

use crate::error::{Result, TreasuryError};
use crate::models::{AppSettings, Category, NewTransaction, Period, Transaction};
use crate::normalize::normalize;
use crate::repository::{
    CategoryPatch, NewCategory, NewPeriod, PeriodPatch, Repository, SettingsPatch,
    TransactionPatch, apply_category_patch, apply_period_patch, apply_settings_patch,
    build_category, build_period, prepare_new_transaction, prepare_updated_transaction,
};
use crate::snapshot::{
    RawCategory, RawPeriod, RawSettings, RawSnapshot, RawTransaction, TreasurySnapshot,
};
use crate::utils::{format_date, format_timestamp, now};

/// SQLite backend. Columns are loosely typed so that hand-edited rows
/// survive loading and reach the normalizer; `seq` keeps insertion order.
pub struct SqliteStore {
    conn: Connection,
}

impl SqliteStore {
    pub fn open(path: &Path) -> Result<Self> {
        if let Some(dir) = path.parent() {
            std::fs::create_dir_all(dir)?;
        }
        Self::from_connection(Connection::open(path)?)
    }

    pub fn open_in_memory() -> Result<Self> {
        Self::from_connection(Connection::open_in_memory()?)
    }

    pub fn from_connection(conn: Connection) -> Result<Self> {
        init_schema(&conn)?;
        Ok(Self { conn })
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    fn replace_all(&mut self, snapshot: &TreasurySnapshot) -> Result<()> {
        let tx = self.conn.transaction()?;
        tx.execute_batch(
            "DELETE FROM transactions; DELETE FROM categories; DELETE FROM periods; DELETE FROM settings;",
        )?;
        for c in &snapshot.categories {
            insert_category(&tx, c)?;
        }
        for t in &snapshot.transactions {
            insert_transaction(&tx, t)?;
        }
        for p in &snapshot.periods {
            insert_period(&tx, p)?;
        }
        write_settings(&tx, &snapshot.settings)?;
        tx.commit()?;
        Ok(())
    }

    fn write_prepared(&mut self, categories: &[Category], t: &Transaction, update: bool) -> Result<()> {
        let tx = self.conn.transaction()?;
        for c in categories {
            insert_category(&tx, c)?;
        }
        if update {
            update_transaction_row(&tx, t)?;
        } else {
            insert_transaction(&tx, t)?;
        }
        tx.commit()?;
        Ok(())
    }
}

fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS categories(
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT,
        name TEXT,
        type TEXT,
        is_default INTEGER
    );

    CREATE TABLE IF NOT EXISTS transactions(
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT,
        type TEXT,
        amount TEXT,
        date TEXT,
        category_id TEXT,
        description TEXT,
        tags TEXT,
        payment_method TEXT,
        receipt TEXT,
        investment_amount TEXT,
        created_at TEXT,
        updated_at TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_date ON transactions(date);

    CREATE TABLE IF NOT EXISTS periods(
        seq INTEGER PRIMARY KEY AUTOINCREMENT,
        id TEXT,
        name TEXT,
        start_date TEXT,
        end_date TEXT,
        initial_fund TEXT,
        created_at TEXT
    );
    "#,
    )?;
    Ok(())
}

fn opt_text(r: &Row, idx: usize) -> rusqlite::Result<Option<String>> {
    Ok(match r.get::<_, SqlValue>(idx)? {
        SqlValue::Text(s) => Some(s),
        SqlValue::Integer(i) => Some(i.to_string()),
        SqlValue::Real(f) => Some(f.to_string()),
        SqlValue::Null | SqlValue::Blob(_) => None,
    })
}

fn opt_number(r: &Row, idx: usize) -> rusqlite::Result<Option<f64>> {
    Ok(match r.get::<_, SqlValue>(idx)? {
        SqlValue::Real(f) => Some(f),
        SqlValue::Integer(i) => Some(i as f64),
        SqlValue::Text(s) => s.trim().parse::<f64>().ok(),
        SqlValue::Null | SqlValue::Blob(_) => None,
    })
}

fn opt_bool(r: &Row, idx: usize) -> rusqlite::Result<Option<bool>> {
    Ok(match r.get::<_, SqlValue>(idx)? {
        SqlValue::Integer(i) => Some(i != 0),
        _ => None,
    })
}

fn opt_tags(r: &Row, idx: usize) -> rusqlite::Result<Option<Vec<Option<String>>>> {
    let Some(body) = opt_text(r, idx)? else {
        return Ok(None);
    };
    Ok(match serde_json::from_str::<Value>(&body) {
        Ok(Value::Array(items)) => Some(
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

fn read_transactions(conn: &Connection) -> Result<Vec<RawTransaction>> {
    let mut stmt = conn.prepare(
        "SELECT id, type, amount, date, category_id, description, tags, payment_method,
                receipt, investment_amount, created_at, updated_at
         FROM transactions ORDER BY seq",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(RawTransaction {
            id: opt_text(r, 0)?,
            r#type: opt_text(r, 1)?,
            amount: opt_number(r, 2)?,
            date: opt_text(r, 3)?,
            category_id: opt_text(r, 4)?,
            description: opt_text(r, 5)?,
            tags: opt_tags(r, 6)?,
            payment_method: opt_text(r, 7)?,
            receipt: opt_text(r, 8)?,
            investment_amount: opt_number(r, 9)?,
            created_at: opt_text(r, 10)?,
            updated_at: opt_text(r, 11)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn read_categories(conn: &Connection) -> Result<Vec<RawCategory>> {
    let mut stmt = conn.prepare("SELECT id, name, type, is_default FROM categories ORDER BY seq")?;
    let rows = stmt.query_map([], |r| {
        Ok(RawCategory {
            id: opt_text(r, 0)?,
            name: opt_text(r, 1)?,
            r#type: opt_text(r, 2)?,
            is_default: opt_bool(r, 3)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn read_periods(conn: &Connection) -> Result<Vec<RawPeriod>> {
    let mut stmt = conn.prepare(
        "SELECT id, name, start_date, end_date, initial_fund, created_at FROM periods ORDER BY seq",
    )?;
    let rows = stmt.query_map([], |r| {
        Ok(RawPeriod {
            id: opt_text(r, 0)?,
            name: opt_text(r, 1)?,
            start_date: opt_text(r, 2)?,
            end_date: opt_text(r, 3)?,
            initial_fund: opt_number(r, 4)?,
            created_at: opt_text(r, 5)?,
        })
    })?;
    Ok(rows.collect::<rusqlite::Result<Vec<_>>>()?)
}

fn read_settings(conn: &Connection) -> Result<RawSettings> {
    let mut stmt = conn.prepare("SELECT key, value FROM settings")?;
    let map: HashMap<String, String> = stmt
        .query_map([], |r| Ok((r.get::<_, String>(0)?, r.get::<_, String>(1)?)))?
        .collect::<rusqlite::Result<_>>()?;
    Ok(RawSettings {
        current_period_id: map.get("currentPeriodId").cloned(),
        has_completed_onboarding: map.get("hasCompletedOnboarding").map(|v| match v.as_str() {
            "true" => Value::Bool(true),
            "false" => Value::Bool(false),
            other => Value::String(other.to_string()),
        }),
        theme: map.get("theme").cloned(),
    })
}

fn insert_category(conn: &Connection, c: &Category) -> Result<()> {
    conn.execute(
        "INSERT INTO categories(id, name, type, is_default) VALUES (?1, ?2, ?3, ?4)",
        params![c.id, c.name, c.r#type.as_str(), c.is_default],
    )?;
    Ok(())
}

fn tags_json(t: &Transaction) -> Result<Option<String>> {
    Ok(match &t.tags {
        Some(tags) => Some(serde_json::to_string(tags)?),
        None => None,
    })
}

fn insert_transaction(conn: &Connection, t: &Transaction) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions(id, type, amount, date, category_id, description, tags,
                                  payment_method, receipt, investment_amount, created_at, updated_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            t.id,
            t.r#type.as_str(),
            t.amount.to_string(),
            format_date(t.date),
            t.category_id,
            t.description,
            tags_json(t)?,
            t.payment_method,
            t.receipt,
            t.investment_amount.map(|d| d.to_string()),
            format_timestamp(&t.created_at),
            format_timestamp(&t.updated_at),
        ],
    )?;
    Ok(())
}

fn update_transaction_row(conn: &Connection, t: &Transaction) -> Result<()> {
    conn.execute(
        "UPDATE transactions SET type=?2, amount=?3, date=?4, category_id=?5, description=?6,
                tags=?7, payment_method=?8, receipt=?9, investment_amount=?10, updated_at=?11
         WHERE id=?1",
        params![
            t.id,
            t.r#type.as_str(),
            t.amount.to_string(),
            format_date(t.date),
            t.category_id,
            t.description,
            tags_json(t)?,
            t.payment_method,
            t.receipt,
            t.investment_amount.map(|d| d.to_string()),
            format_timestamp(&t.updated_at),
        ],
    )?;
    Ok(())
}

fn insert_period(conn: &Connection, p: &Period) -> Result<()> {
    conn.execute(
        "INSERT INTO periods(id, name, start_date, end_date, initial_fund, created_at)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
        params![
            p.id,
            p.name,
            p.start_date,
            p.end_date,
            p.initial_fund.to_string(),
            format_timestamp(&p.created_at),
        ],
    )?;
    Ok(())
}

fn write_settings(conn: &Connection, s: &AppSettings) -> Result<()> {
    conn.execute("DELETE FROM settings", [])?;
    let mut upsert = conn.prepare("INSERT INTO settings(key, value) VALUES (?1, ?2)")?;
    if let Some(id) = &s.current_period_id {
        upsert.execute(params!["currentPeriodId", id])?;
    }
    upsert.execute(params![
        "hasCompletedOnboarding",
        if s.has_completed_onboarding { "true" } else { "false" }
    ])?;
    upsert.execute(params!["theme", s.theme.as_str()])?;
    Ok(())
}

impl Repository for SqliteStore {
    fn raw_snapshot(&mut self) -> Result<RawSnapshot> {
        Ok(RawSnapshot {
            transactions: read_transactions(&self.conn)?,
            categories: read_categories(&self.conn)?,
            periods: read_periods(&self.conn)?,
            settings: read_settings(&self.conn)?,
            lossy: false,
        })
    }

    fn get_snapshot(&mut self) -> Result<TreasurySnapshot> {
        let raw = self.raw_snapshot()?;
        let sanitized = normalize(&raw, now());
        if sanitized.changed {
            warn!("stored snapshot repaired, writing back");
            self.replace_all(&sanitized.snapshot)?;
        }
        Ok(sanitized.snapshot)
    }

    fn add_transaction(&mut self, input: NewTransaction) -> Result<Transaction> {
        let snapshot = self.get_snapshot()?;
        let prepared = prepare_new_transaction(&input, &snapshot.categories, now())?;
        self.write_prepared(&prepared.new_categories, &prepared.transaction, false)?;
        debug!(id = %prepared.transaction.id, "transaction added");
        Ok(prepared.transaction)
    }

    fn update_transaction(&mut self, id: &str, patch: TransactionPatch) -> Result<()> {
        let snapshot = self.get_snapshot()?;
        let existing = snapshot
            .transaction(id)
            .ok_or_else(|| TreasuryError::not_found("transaction", id))?;
        let prepared =
            prepare_updated_transaction(existing, patch, &snapshot.categories, now())?;
        self.write_prepared(&prepared.new_categories, &prepared.transaction, true)?;
        debug!(id, "transaction updated");
        Ok(())
    }

    fn delete_transaction(&mut self, id: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM transactions WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(TreasuryError::not_found("transaction", id));
        }
        Ok(())
    }

    fn add_category(&mut self, input: NewCategory) -> Result<Category> {
        let category = build_category(input)?;
        insert_category(&self.conn, &category)?;
        Ok(category)
    }

    fn update_category(&mut self, id: &str, patch: CategoryPatch) -> Result<()> {
        let snapshot = self.get_snapshot()?;
        let mut category = snapshot
            .category(id)
            .cloned()
            .ok_or_else(|| TreasuryError::not_found("category", id))?;
        apply_category_patch(&mut category, patch)?;
        self.conn.execute(
            "UPDATE categories SET name=?2, type=?3 WHERE id=?1",
            params![category.id, category.name, category.r#type.as_str()],
        )?;
        Ok(())
    }

    fn delete_category(&mut self, id: &str) -> Result<()> {
        let n = self
            .conn
            .execute("DELETE FROM categories WHERE id=?1", params![id])?;
        if n == 0 {
            return Err(TreasuryError::not_found("category", id));
        }
        Ok(())
    }

    fn add_period(&mut self, input: NewPeriod) -> Result<Period> {
        let mut snapshot = self.get_snapshot()?;
        let period = build_period(input, now())?;
        let tx = self.conn.transaction()?;
        insert_period(&tx, &period)?;
        if snapshot.settings.current_period_id.is_none() {
            snapshot.settings.current_period_id = Some(period.id.clone());
            write_settings(&tx, &snapshot.settings)?;
        }
        tx.commit()?;
        info!(id = %period.id, name = %period.name, "period added");
        Ok(period)
    }

    fn update_period(&mut self, id: &str, patch: PeriodPatch) -> Result<()> {
        let snapshot = self.get_snapshot()?;
        let mut period = snapshot
            .period(id)
            .cloned()
            .ok_or_else(|| TreasuryError::not_found("period", id))?;
        apply_period_patch(&mut period, patch)?;
        self.conn.execute(
            "UPDATE periods SET name=?2, start_date=?3, end_date=?4, initial_fund=?5 WHERE id=?1",
            params![
                period.id,
                period.name,
                period.start_date,
                period.end_date,
                period.initial_fund.to_string(),
            ],
        )?;
        Ok(())
    }

    fn update_settings(&mut self, patch: SettingsPatch) -> Result<AppSettings> {
        let mut snapshot = self.get_snapshot()?;
        apply_settings_patch(&mut snapshot.settings, patch, &snapshot.periods)?;
        let tx = self.conn.transaction()?;
        write_settings(&tx, &snapshot.settings)?;
        tx.commit()?;
        Ok(snapshot.settings)
    }

    fn reset_all(&mut self) -> Result<()> {
        info!("resetting all data");
        self.conn.execute_batch(
            "DELETE FROM transactions; DELETE FROM categories; DELETE FROM periods; DELETE FROM settings;",
        )?;
        Ok(())
    }
}
