// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use directories::ProjectDirs;
use once_cell::sync::Lazy;

use crate::db::SqliteStore;
use crate::error::{Result, TreasuryError};
use crate::local_store::LocalStore;
use crate::repository::Repository;

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Treasury", "treasury"));

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Backend {
    #[default]
    Local,
    Sqlite,
}

impl FromStr for Backend {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "local" | "json" => Ok(Self::Local),
            "sqlite" => Ok(Self::Sqlite),
            other => Err(format!("unknown backend '{}' (use local|sqlite)", other)),
        }
    }
}

impl fmt::Display for Backend {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Local => "local",
            Self::Sqlite => "sqlite",
        })
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StoreConfig {
    pub backend: Backend,
    /// Falls back to the platform data dir when unset.
    pub data_dir: Option<PathBuf>,
}

impl StoreConfig {
    pub fn from_matches(m: &clap::ArgMatches) -> Self {
        Self {
            backend: m.get_one::<Backend>("backend").copied().unwrap_or_default(),
            data_dir: m.get_one::<PathBuf>("data-dir").cloned(),
        }
    }

    pub fn data_dir(&self) -> Result<PathBuf> {
        if let Some(dir) = &self.data_dir {
            return Ok(dir.clone());
        }
        let proj = ProjectDirs::from(APP.0, APP.1, APP.2).ok_or(TreasuryError::DataDir)?;
        Ok(proj.data_dir().to_path_buf())
    }

    pub fn store_path(&self) -> Result<PathBuf> {
        let file = match self.backend {
            Backend::Local => "treasury.json",
            Backend::Sqlite => "treasury.sqlite",
        };
        Ok(self.data_dir()?.join(file))
    }

    pub fn open(&self) -> Result<Box<dyn Repository>> {
        let path = self.store_path()?;
        tracing::debug!(backend = %self.backend, path = %path.display(), "opening store");
        Ok(match self.backend {
            Backend::Local => Box::new(LocalStore::open(path)),
            Backend::Sqlite => Box::new(SqliteStore::open(&path)?),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cli::build_cli;

    #[test]
    fn backend_names() {
        assert_eq!(Backend::from_str("SQLite").unwrap(), Backend::Sqlite);
        assert_eq!(Backend::from_str("json").unwrap(), Backend::Local);
        assert!(Backend::from_str("postgres").is_err());
    }

    #[test]
    fn store_path_follows_backend_and_dir() {
        let m = build_cli().get_matches_from([
            "treasury",
            "--backend",
            "sqlite",
            "--data-dir",
            "/tmp/treasury-data",
            "doctor",
        ]);
        let config = StoreConfig::from_matches(&m);
        assert_eq!(config.backend, Backend::Sqlite);
        assert_eq!(
            config.store_path().unwrap(),
            PathBuf::from("/tmp/treasury-data/treasury.sqlite")
        );
    }
}
