// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::{optional, required};
use crate::db;
use anyhow::{Context, Result, anyhow};
use rusqlite::{Connection, OpenFlags, params};
use std::fs;
use std::path::{Path, PathBuf};

pub const BACKUP_EXTENSION: &str = "smbak";

pub fn handle_create(conn: &Connection, sub: &clap::ArgMatches, db_path: &Path) -> Result<()> {
    let out = match optional(sub, "out") {
        Some(o) => PathBuf::from(o.trim()),
        None => db_path
            .parent()
            .map(Path::to_path_buf)
            .unwrap_or_else(|| PathBuf::from(".")),
    };
    let written = backup_to(conn, &out)?;
    println!("Backup written to {}", written.display());
    Ok(())
}

/// Runs before any connection is opened, since the file is replaced.
pub fn handle_restore(sub: &clap::ArgMatches, db_path: &Path) -> Result<()> {
    let src = PathBuf::from(required(sub, "path")?.trim());
    restore_from(&src, db_path)?;
    println!("Restored {} from {}", db_path.display(), src.display());
    Ok(())
}

pub fn default_backup_name() -> String {
    let now = chrono::Local::now();
    format!(
        "pocketbook_backup_{}.{}",
        now.format("%Y%m%d_%H%M%S"),
        BACKUP_EXTENSION
    )
}

/// Writes a consistent copy of the open database. `out` may be a directory,
/// in which case a timestamped file name is chosen. Existing files are never
/// overwritten.
pub fn backup_to(conn: &Connection, out: &Path) -> Result<PathBuf> {
    let target = if out.is_dir() {
        out.join(default_backup_name())
    } else {
        out.to_path_buf()
    };
    if target.exists() {
        return Err(anyhow!("Refusing to overwrite {}", target.display()));
    }
    let target_str = target
        .to_str()
        .with_context(|| format!("Backup path {} is not valid UTF-8", target.display()))?;
    conn.execute("VACUUM INTO ?1", params![target_str])
        .with_context(|| format!("Write backup to {}", target.display()))?;
    tracing::info!(path = %target.display(), "backup written");
    Ok(target)
}

/// Replaces the database at `db_path` with the backup file byte for byte,
/// after checking that the backup really is a pocketbook database.
pub fn restore_from(src: &Path, db_path: &Path) -> Result<()> {
    {
        let probe = Connection::open_with_flags(src, OpenFlags::SQLITE_OPEN_READ_ONLY)
            .with_context(|| format!("Open backup {}", src.display()))?;
        let check: String = probe
            .query_row("PRAGMA quick_check", [], |r| r.get(0))
            .with_context(|| format!("{} is not a readable database", src.display()))?;
        if check != "ok" {
            return Err(anyhow!("Backup {} is corrupt: {}", src.display(), check));
        }
        if !db::has_ledger_tables(&probe)? {
            return Err(anyhow!(
                "{} does not contain pocketbook data",
                src.display()
            ));
        }
    }

    let staging = db_path.with_extension("restoring");
    fs::copy(src, &staging)
        .with_context(|| format!("Copy {} to {}", src.display(), staging.display()))?;
    fs::rename(&staging, db_path)
        .with_context(|| format!("Replace {}", db_path.display()))?;
    tracing::info!(from = %src.display(), to = %db_path.display(), "database restored");

    // Older backups may predate newer tables or indices.
    db::open_or_init(db_path)?;
    Ok(())
}
