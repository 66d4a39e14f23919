// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Errors returned by the ledger and the record store.
//!
//! - [`Validation`] is raised before anything is written.
//! - [`NotFound`] may be raised mid-batch; the batch is then rolled back.
//! - [`Store`] wraps any SQLite failure and always rolls the batch back.
//!
//! [`Validation`]: LedgerError::Validation
//! [`NotFound`]: LedgerError::NotFound
//! [`Store`]: LedgerError::Store

use thiserror::Error;

#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid input: {0}")]
    Validation(String),
    #[error("{0} not found")]
    NotFound(String),
    #[error(transparent)]
    Store(#[from] rusqlite::Error),
    #[error(transparent)]
    Serde(#[from] serde_json::Error),
}

impl LedgerError {
    pub fn validation(msg: impl Into<String>) -> Self {
        Self::Validation(msg.into())
    }

    pub fn account_not_found(id: &str) -> Self {
        Self::NotFound(format!("Account '{}'", id))
    }

    pub fn transaction_not_found(id: &str) -> Self {
        Self::NotFound(format!("Transaction '{}'", id))
    }

    pub fn is_validation(&self) -> bool {
        matches!(self, Self::Validation(_))
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::NotFound(_))
    }
}

pub type Result<T> = std::result::Result<T, LedgerError>;
