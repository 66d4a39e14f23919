// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::INITIAL_BALANCE_CATEGORY;
use super::transactions;
use crate::db::run_atomic;
use crate::error::{LedgerError, Result};
use crate::ids::generate_id;
use crate::models::{
    Account, AccountPatch, DEFAULT_ACCOUNT_COLOR, DEFAULT_ACCOUNT_ICON, DeletePolicy, NewAccount,
    NewTransaction, TransactionType,
};
use crate::settings;
use crate::utils::now_millis;
use rusqlite::{Connection, OptionalExtension, params};

pub const ACCOUNT_ORDER_KEY: &str = "account_order";

/// Inserts the account with a zero balance and, when a starting balance is
/// requested, records it as an initial-balance transaction in the same batch.
pub fn create_account(conn: &mut Connection, input: &NewAccount) -> Result<Account> {
    validate_name(&input.name)?;
    let account = run_atomic(conn, |db| create_in(db, input, now_millis()))?;
    tracing::info!(id = %account.id, name = %account.name, balance = account.balance(), "account created");
    Ok(account)
}

pub(crate) fn create_in(conn: &Connection, input: &NewAccount, created_at: i64) -> Result<Account> {
    let id = input
        .id
        .as_deref()
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
        .unwrap_or_else(generate_id);
    let name = input.name.trim();

    conn.execute(
        "INSERT INTO accounts(id, name, balance, type, is_liability, hidden, icon, icon_color, description)
         VALUES (?1, ?2, 0, ?3, ?4, ?5, ?6, ?7, ?8)",
        params![
            id,
            name,
            input.r#type.trim(),
            input.is_liability,
            input.hidden,
            input.icon.as_deref().unwrap_or(DEFAULT_ACCOUNT_ICON),
            input.icon_color.as_deref().unwrap_or(DEFAULT_ACCOUNT_COLOR),
            input.description.as_deref().unwrap_or_default()
        ],
    )?;

    if input.balance != 0 {
        let amount = input.balance.checked_abs().ok_or_else(|| {
            LedgerError::validation(format!("opening balance {} is out of range", input.balance))
        })?;
        let kind = if input.is_liability || input.balance < 0 {
            TransactionType::Expense
        } else {
            TransactionType::Income
        };
        let mut opening = NewTransaction::income(&id, amount, created_at);
        opening.r#type = kind;
        opening.title = format!("Initial balance for {}", name);
        opening.description = Some(format!("Initial balance setup for account {}", name));
        opening.category = Some(INITIAL_BALANCE_CATEGORY.to_string());
        transactions::validate(&opening)?;
        transactions::insert_in(conn, &opening)?;
    }

    load(conn, &id)
}

pub fn get_account(conn: &Connection, id: &str) -> Result<Option<Account>> {
    let sql = format!("SELECT {} FROM accounts WHERE id = ?1", Account::COLUMNS);
    let account = conn
        .query_row(&sql, params![id], Account::from_row)
        .optional()?;
    Ok(account)
}

pub fn find_account_by_name(conn: &Connection, name: &str) -> Result<Option<Account>> {
    let sql = format!(
        "SELECT {} FROM accounts WHERE name = ?1 COLLATE NOCASE ORDER BY id LIMIT 1",
        Account::COLUMNS
    );
    let account = conn
        .query_row(&sql, params![name.trim()], Account::from_row)
        .optional()?;
    Ok(account)
}

/// Resolves an account by id first, then by case-insensitive name.
pub fn resolve_account(conn: &Connection, id_or_name: &str) -> Result<Account> {
    if let Some(a) = get_account(conn, id_or_name.trim())? {
        return Ok(a);
    }
    find_account_by_name(conn, id_or_name)?
        .ok_or_else(|| LedgerError::account_not_found(id_or_name.trim()))
}

/// All accounts, hidden ones included, by name.
pub fn list_accounts(conn: &Connection) -> Result<Vec<Account>> {
    let sql = format!(
        "SELECT {} FROM accounts ORDER BY name COLLATE NOCASE, id",
        Account::COLUMNS
    );
    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map([], Account::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

/// Accounts in the user's saved display order; accounts missing from the
/// saved order follow by name.
pub fn list_accounts_ordered(conn: &Connection) -> Result<Vec<Account>> {
    let mut accounts = list_accounts(conn)?;
    let order: Vec<String> = match settings::get_setting(conn, ACCOUNT_ORDER_KEY)? {
        Some(serde_json::Value::Array(items)) => items
            .into_iter()
            .filter_map(|v| v.as_str().map(str::to_string))
            .collect(),
        _ => return Ok(accounts),
    };
    accounts.sort_by_key(|a| order.iter().position(|id| *id == a.id).unwrap_or(usize::MAX));
    Ok(accounts)
}

pub fn edit_account(conn: &mut Connection, id: &str, patch: &AccountPatch) -> Result<Account> {
    if let Some(name) = &patch.name {
        validate_name(name)?;
    }
    let account = run_atomic(conn, |db| {
        let changed = db.execute(
            "UPDATE accounts SET
                name = COALESCE(?1, name),
                type = COALESCE(?2, type),
                is_liability = COALESCE(?3, is_liability),
                hidden = COALESCE(?4, hidden),
                icon = COALESCE(?5, icon),
                icon_color = COALESCE(?6, icon_color),
                description = COALESCE(?7, description)
             WHERE id = ?8",
            params![
                patch.name.as_deref().map(str::trim),
                patch.r#type.as_deref().map(str::trim),
                patch.is_liability,
                patch.hidden,
                patch.icon,
                patch.icon_color,
                patch.description,
                id
            ],
        )?;
        if changed == 0 {
            return Err(LedgerError::account_not_found(id));
        }
        load(db, id)
    })?;
    tracing::info!(id, "account edited");
    Ok(account)
}

/// Removes the account. Returns how many transactions were deleted along
/// with it, which is always zero under [`DeletePolicy::Reject`].
pub fn delete_account(conn: &mut Connection, id: &str, policy: DeletePolicy) -> Result<usize> {
    let removed = run_atomic(conn, |db| {
        load(db, id)?;
        let referencing = referencing_transactions(db, id)?;
        if policy == DeletePolicy::Reject && !referencing.is_empty() {
            return Err(LedgerError::validation(format!(
                "account '{}' is still referenced by {} transaction(s)",
                id,
                referencing.len()
            )));
        }
        for tx_id in &referencing {
            transactions::delete_in(db, tx_id)?;
        }
        db.execute("DELETE FROM accounts WHERE id = ?1", params![id])?;
        Ok(referencing.len())
    })?;
    tracing::info!(id, removed, ?policy, "account deleted");
    Ok(removed)
}

/// Top-level transactions that use `account_id` as source or target.
fn referencing_transactions(conn: &Connection, account_id: &str) -> Result<Vec<String>> {
    let mut stmt = conn.prepare(
        "SELECT id FROM transactions
         WHERE (account_id = ?1 OR target_account_id = ?1) AND linked_transaction_id IS NULL
         ORDER BY created_at, rowid",
    )?;
    let rows = stmt.query_map(params![account_id], |r| r.get::<_, String>(0))?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

pub(crate) fn require_name(conn: &Connection, id: &str) -> Result<String> {
    conn.query_row("SELECT name FROM accounts WHERE id = ?1", params![id], |r| {
        r.get(0)
    })
    .optional()?
    .ok_or_else(|| LedgerError::account_not_found(id))
}

fn load(conn: &Connection, id: &str) -> Result<Account> {
    get_account(conn, id)?.ok_or_else(|| LedgerError::account_not_found(id))
}

fn validate_name(name: &str) -> Result<()> {
    if name.trim().is_empty() {
        return Err(LedgerError::validation("account name is required"));
    }
    Ok(())
}
