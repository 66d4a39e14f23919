// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::{LedgerError, Result};
use crate::ids::generate_id;
use crate::models::{Category, CategoryType, NewCategory};
use rusqlite::{Connection, OptionalExtension, params};

const COLUMNS: &str = "id, name, icon, color, type";

// (name, icon, color, type)
const DEFAULTS: &[(&str, &str, &str, CategoryType)] = &[
    ("Salary", "cash", "#4caf50", CategoryType::Income),
    ("Allowance", "wallet", "#8bc34a", CategoryType::Income),
    ("Bonus", "gift", "#cddc39", CategoryType::Income),
    ("Cash Withdrawal", "bank", "#009688", CategoryType::Income),
    ("Other Income", "dots-horizontal", "#607d8b", CategoryType::Income),
    ("Food", "food", "#ff9800", CategoryType::Expense),
    ("Drinks", "coffee", "#795548", CategoryType::Expense),
    ("Transport", "bus", "#2196f3", CategoryType::Expense),
    ("Shopping", "cart", "#e91e63", CategoryType::Expense),
    ("Health", "hospital", "#f44336", CategoryType::Expense),
    ("Education", "school", "#3f51b5", CategoryType::Expense),
    ("Bills", "receipt", "#9c27b0", CategoryType::Expense),
    ("Entertainment", "movie", "#673ab7", CategoryType::Expense),
    ("Donation", "hand-heart", "#00bcd4", CategoryType::Expense),
    ("Other Expense", "dots-horizontal", "#9e9e9e", CategoryType::Expense),
    ("Transfer", "swap-horizontal", "#03a9f4", CategoryType::Transfer),
];

/// Populates the built-in categories, but only into an empty table.
pub fn seed_defaults(conn: &Connection) -> Result<usize> {
    let existing: i64 = conn.query_row("SELECT COUNT(*) FROM categories", [], |r| r.get(0))?;
    if existing > 0 {
        return Ok(0);
    }
    let mut stmt = conn.prepare(
        "INSERT INTO categories(id, name, icon, color, type) VALUES (?1, ?2, ?3, ?4, ?5)",
    )?;
    for (name, icon, color, kind) in DEFAULTS {
        stmt.execute(params![generate_id(), name, icon, color, kind])?;
    }
    tracing::info!(count = DEFAULTS.len(), "default categories seeded");
    Ok(DEFAULTS.len())
}

pub fn add_category(conn: &Connection, input: &NewCategory) -> Result<Category> {
    if input.name.trim().is_empty() {
        return Err(LedgerError::validation("category name is required"));
    }
    let id = input
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_id);
    conn.execute(
        "INSERT INTO categories(id, name, icon, color, type) VALUES (?1, ?2, ?3, ?4, ?5)",
        params![id, input.name.trim(), input.icon, input.color, input.r#type],
    )?;
    load(conn, &id)
}

pub fn get_category(conn: &Connection, id: &str) -> Result<Option<Category>> {
    let sql = format!("SELECT {} FROM categories WHERE id=?1", COLUMNS);
    Ok(conn
        .query_row(&sql, params![id], Category::from_row)
        .optional()?)
}

pub fn find_category_by_name(conn: &Connection, name: &str) -> Result<Option<Category>> {
    let sql = format!(
        "SELECT {} FROM categories WHERE name=?1 COLLATE NOCASE ORDER BY id LIMIT 1",
        COLUMNS
    );
    Ok(conn
        .query_row(&sql, params![name.trim()], Category::from_row)
        .optional()?)
}

pub fn list_categories(conn: &Connection, kind: Option<CategoryType>) -> Result<Vec<Category>> {
    let mut out = Vec::new();
    match kind {
        Some(k) => {
            let sql = format!(
                "SELECT {} FROM categories WHERE type=?1 ORDER BY name COLLATE NOCASE",
                COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            for row in stmt.query_map(params![k], Category::from_row)? {
                out.push(row?);
            }
        }
        None => {
            let sql = format!(
                "SELECT {} FROM categories ORDER BY type, name COLLATE NOCASE",
                COLUMNS
            );
            let mut stmt = conn.prepare(&sql)?;
            for row in stmt.query_map([], Category::from_row)? {
                out.push(row?);
            }
        }
    }
    Ok(out)
}

pub fn edit_category(conn: &Connection, id: &str, input: &NewCategory) -> Result<Category> {
    if input.name.trim().is_empty() {
        return Err(LedgerError::validation("category name is required"));
    }
    let changed = conn.execute(
        "UPDATE categories SET name=?1, icon=?2, color=?3, type=?4 WHERE id=?5",
        params![input.name.trim(), input.icon, input.color, input.r#type, id],
    )?;
    if changed == 0 {
        return Err(LedgerError::NotFound(format!("Category '{}'", id)));
    }
    load(conn, id)
}

/// Transactions keep their category string; only the reference row goes.
pub fn delete_category(conn: &Connection, id: &str) -> Result<()> {
    let changed = conn.execute("DELETE FROM categories WHERE id=?1", params![id])?;
    if changed == 0 {
        return Err(LedgerError::NotFound(format!("Category '{}'", id)));
    }
    Ok(())
}

fn load(conn: &Connection, id: &str) -> Result<Category> {
    get_category(conn, id)?.ok_or_else(|| LedgerError::NotFound(format!("Category '{}'", id)))
}
