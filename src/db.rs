// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Result;
use anyhow::Context;
use directories::ProjectDirs;
use once_cell::sync::Lazy;
use rusqlite::{Connection, Transaction};
use std::fs;
use std::path::{Path, PathBuf};

static APP: Lazy<(&str, &str, &str)> =
    Lazy::new(|| ("com.alphavelocity", "Pocketbook", "pocketbook"));

pub const DB_FILE_NAME: &str = "pocketbook.sqlite";

pub fn db_path() -> anyhow::Result<PathBuf> {
    let proj = ProjectDirs::from(APP.0, APP.1, APP.2)
        .context("Could not determine platform-specific data dir")?;
    let data_dir = proj.data_dir();
    fs::create_dir_all(data_dir).context("Failed to create data dir")?;
    Ok(data_dir.join(DB_FILE_NAME))
}

pub fn open_or_init(path: &Path) -> anyhow::Result<Connection> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent)
            .with_context(|| format!("Create directory {}", parent.display()))?;
    }
    let conn =
        Connection::open(path).with_context(|| format!("Open DB at {}", path.display()))?;
    init_schema(&conn).with_context(|| format!("Initialize schema in {}", path.display()))?;
    tracing::debug!(path = %path.display(), "database ready");
    Ok(conn)
}

pub fn open_in_memory() -> Result<Connection> {
    let conn = Connection::open_in_memory()?;
    init_schema(&conn)?;
    Ok(conn)
}

pub fn init_schema(conn: &Connection) -> Result<()> {
    conn.execute_batch(
        r#"
    CREATE TABLE IF NOT EXISTS settings(
        key TEXT PRIMARY KEY,
        value TEXT NOT NULL
    );

    CREATE TABLE IF NOT EXISTS accounts(
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        balance INTEGER NOT NULL DEFAULT 0,
        type TEXT NOT NULL,
        is_liability INTEGER NOT NULL DEFAULT 0,
        hidden INTEGER NOT NULL DEFAULT 0,
        icon TEXT,
        icon_color TEXT,
        description TEXT
    );

    CREATE TABLE IF NOT EXISTS categories(
        id TEXT PRIMARY KEY NOT NULL,
        name TEXT NOT NULL,
        icon TEXT NOT NULL,
        color TEXT NOT NULL,
        type TEXT NOT NULL CHECK(type IN ('income','expense','transfer','none'))
    );

    -- account references are checked by the ledger, not by foreign keys
    CREATE TABLE IF NOT EXISTS transactions(
        id TEXT PRIMARY KEY NOT NULL,
        title TEXT NOT NULL,
        description TEXT,
        amount INTEGER NOT NULL CHECK(amount >= 0),
        type TEXT NOT NULL CHECK(type IN ('income','expense','transfer')),
        account_id TEXT NOT NULL,
        target_account_id TEXT,
        created_at INTEGER NOT NULL,
        category TEXT,
        fee INTEGER NOT NULL DEFAULT 0 CHECK(fee >= 0),
        img TEXT,
        linked_transaction_id TEXT
    );
    CREATE INDEX IF NOT EXISTS idx_transactions_created_at ON transactions(created_at);
    CREATE INDEX IF NOT EXISTS idx_transactions_account ON transactions(account_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_target ON transactions(target_account_id);
    CREATE INDEX IF NOT EXISTS idx_transactions_linked ON transactions(linked_transaction_id);
    "#,
    )?;
    crate::categories::seed_defaults(conn)?;
    Ok(())
}

/// Runs `f` inside one SQLite transaction. Commits when `f` returns `Ok`;
/// any error drops the transaction, which rolls every write back.
pub fn run_atomic<T, F>(conn: &mut Connection, f: F) -> Result<T>
where
    F: FnOnce(&Transaction<'_>) -> Result<T>,
{
    let tx = conn.transaction()?;
    match f(&tx) {
        Ok(out) => {
            tx.commit()?;
            Ok(out)
        }
        Err(err) => {
            if let Err(rb) = tx.rollback() {
                tracing::error!(error = %rb, "rollback failed");
            }
            tracing::warn!(error = %err, "atomic batch rolled back");
            Err(err)
        }
    }
}

/// True when `conn` holds the tables a pocketbook database must have.
pub fn has_ledger_tables(conn: &Connection) -> Result<bool> {
    let n: i64 = conn.query_row(
        "SELECT COUNT(*) FROM sqlite_master WHERE type='table' AND name IN ('accounts','transactions')",
        [],
        |r| r.get(0),
    )?;
    Ok(n == 2)
}
