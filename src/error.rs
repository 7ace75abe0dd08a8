// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use thiserror::Error;

/// Rejection of an interactive write. Stored records are never rejected,
/// they are repaired or dropped by the normalizer instead.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid movement: {0}")]
    InvalidMovement(String),

    #[error("invalid category: {0}")]
    InvalidCategory(String),

    #[error("invalid period: {0}")]
    InvalidPeriod(String),
}

#[derive(Debug, Error)]
pub enum TreasuryError {
    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error("{kind} '{id}' not found")]
    NotFound { kind: &'static str, id: String },

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("SQLite error: {0}")]
    Sqlite(#[from] rusqlite::Error),

    #[error("Could not determine platform-specific data dir")]
    DataDir,
}

impl TreasuryError {
    pub fn not_found(kind: &'static str, id: &str) -> Self {
        Self::NotFound {
            kind,
            id: id.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, TreasuryError>;
