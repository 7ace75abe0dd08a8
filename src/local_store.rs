// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Single-document JSON backend. The whole snapshot is read, changed and
//! written back on every mutation.

use std::fs;
use std::path::{Path, PathBuf};

use tracing::{debug, info, warn};

use crate::error::{Result, TreasuryError};
use crate::models::{AppSettings, Category, NewTransaction, Period, Transaction};
use crate::normalize::normalize;
use crate::repository::{
    CategoryPatch, NewCategory, NewPeriod, PeriodPatch, Repository, SettingsPatch,
    TransactionPatch, apply_category_patch, apply_period_patch, apply_settings_patch,
    build_category, build_period, prepare_new_transaction, prepare_updated_transaction,
};
use crate::snapshot::{RawSnapshot, TreasurySnapshot};
use crate::utils::now;

pub struct LocalStore {
    path: PathBuf,
}

impl LocalStore {
    pub fn open(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn save(&self, snapshot: &TreasurySnapshot) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            fs::create_dir_all(dir)?;
        }
        let body = serde_json::to_string_pretty(&snapshot.to_raw())?;
        let tmp = self.path.with_extension("json.tmp");
        fs::write(&tmp, body)?;
        fs::rename(&tmp, &self.path)?;
        Ok(())
    }

    fn mutate<T>(&mut self, f: impl FnOnce(&mut TreasurySnapshot) -> Result<T>) -> Result<T> {
        let mut snapshot = self.get_snapshot()?;
        let out = f(&mut snapshot)?;
        self.save(&snapshot)?;
        Ok(out)
    }
}

impl Repository for LocalStore {
    fn raw_snapshot(&mut self) -> Result<RawSnapshot> {
        match fs::read_to_string(&self.path) {
            Ok(body) if body.trim().is_empty() => Ok(RawSnapshot::default()),
            Ok(body) => Ok(serde_json::from_str(&body)?),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(RawSnapshot::default()),
            Err(e) => Err(e.into()),
        }
    }

    fn get_snapshot(&mut self) -> Result<TreasurySnapshot> {
        let raw = self.raw_snapshot()?;
        let sanitized = normalize(&raw, now());
        if sanitized.changed {
            warn!(path = %self.path.display(), "stored snapshot repaired, writing back");
            self.save(&sanitized.snapshot)?;
        }
        Ok(sanitized.snapshot)
    }

    fn add_transaction(&mut self, input: NewTransaction) -> Result<Transaction> {
        self.mutate(|s| {
            let prepared = prepare_new_transaction(&input, &s.categories, now())?;
            s.categories.extend(prepared.new_categories);
            s.transactions.push(prepared.transaction.clone());
            debug!(id = %prepared.transaction.id, "transaction added");
            Ok(prepared.transaction)
        })
    }

    fn update_transaction(&mut self, id: &str, patch: TransactionPatch) -> Result<()> {
        self.mutate(|s| {
            let idx = s
                .transactions
                .iter()
                .position(|t| t.id == id)
                .ok_or_else(|| TreasuryError::not_found("transaction", id))?;
            let prepared =
                prepare_updated_transaction(&s.transactions[idx], patch, &s.categories, now())?;
            s.categories.extend(prepared.new_categories);
            s.transactions[idx] = prepared.transaction;
            debug!(id, "transaction updated");
            Ok(())
        })
    }

    fn delete_transaction(&mut self, id: &str) -> Result<()> {
        self.mutate(|s| {
            let before = s.transactions.len();
            s.transactions.retain(|t| t.id != id);
            if s.transactions.len() == before {
                return Err(TreasuryError::not_found("transaction", id));
            }
            Ok(())
        })
    }

    fn add_category(&mut self, input: NewCategory) -> Result<Category> {
        self.mutate(|s| {
            let category = build_category(input)?;
            s.categories.push(category.clone());
            Ok(category)
        })
    }

    fn update_category(&mut self, id: &str, patch: CategoryPatch) -> Result<()> {
        self.mutate(|s| {
            let category = s
                .categories
                .iter_mut()
                .find(|c| c.id == id)
                .ok_or_else(|| TreasuryError::not_found("category", id))?;
            apply_category_patch(category, patch)
        })
    }

    fn delete_category(&mut self, id: &str) -> Result<()> {
        self.mutate(|s| {
            let before = s.categories.len();
            s.categories.retain(|c| c.id != id);
            if s.categories.len() == before {
                return Err(TreasuryError::not_found("category", id));
            }
            Ok(())
        })
    }

    fn add_period(&mut self, input: NewPeriod) -> Result<Period> {
        self.mutate(|s| {
            let period = build_period(input, now())?;
            s.periods.push(period.clone());
            if s.settings.current_period_id.is_none() {
                s.settings.current_period_id = Some(period.id.clone());
            }
            info!(id = %period.id, name = %period.name, "period added");
            Ok(period)
        })
    }

    fn update_period(&mut self, id: &str, patch: PeriodPatch) -> Result<()> {
        self.mutate(|s| {
            let period = s
                .periods
                .iter_mut()
                .find(|p| p.id == id)
                .ok_or_else(|| TreasuryError::not_found("period", id))?;
            apply_period_patch(period, patch)
        })
    }

    fn update_settings(&mut self, patch: SettingsPatch) -> Result<AppSettings> {
        self.mutate(|s| {
            apply_settings_patch(&mut s.settings, patch, &s.periods)?;
            Ok(s.settings.clone())
        })
    }

    fn reset_all(&mut self) -> Result<()> {
        info!(path = %self.path.display(), "resetting all data");
        self.save(&TreasurySnapshot::default())
    }
}
