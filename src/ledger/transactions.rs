// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::balance::{self, Posting};
use super::{FEE_CATEGORY, FEE_TITLE};
use crate::db::run_atomic;
use crate::error::{LedgerError, Result};
use crate::ids::generate_id;
use crate::models::{NewTransaction, Transaction, TransactionType};
use rusqlite::{Connection, OptionalExtension, params};

pub fn add_transaction(conn: &mut Connection, input: &NewTransaction) -> Result<Transaction> {
    validate(input)?;
    let tx = run_atomic(conn, |db| insert_in(db, input))?;
    tracing::info!(id = %tx.id, kind = %tx.r#type, amount = tx.amount, fee = tx.fee, "transaction added");
    Ok(tx)
}

/// Replaces every field of `id` with `input`. The old balance effect is
/// reversed and the new one applied, so account, amount and type may all
/// change in one call.
pub fn edit_transaction(
    conn: &mut Connection,
    id: &str,
    input: &NewTransaction,
) -> Result<Transaction> {
    validate(input)?;
    let tx = run_atomic(conn, |db| edit_in(db, id, input))?;
    tracing::info!(id = %tx.id, kind = %tx.r#type, amount = tx.amount, fee = tx.fee, "transaction edited");
    Ok(tx)
}

pub fn delete_transaction(conn: &mut Connection, id: &str) -> Result<()> {
    run_atomic(conn, |db| delete_in(db, id))?;
    tracing::info!(id, "transaction deleted");
    Ok(())
}

pub fn get_transaction(conn: &Connection, id: &str) -> Result<Option<Transaction>> {
    let sql = format!("SELECT {} FROM transactions WHERE id = ?1", Transaction::COLUMNS);
    let tx = conn
        .query_row(&sql, params![id], Transaction::from_row)
        .optional()?;
    Ok(tx)
}

/// Every stored transaction, newest first.
pub fn list_transactions(conn: &Connection) -> Result<Vec<Transaction>> {
    super::query::filter_transactions(conn, &Default::default())
}

pub(crate) fn validate(input: &NewTransaction) -> Result<()> {
    if input.title.trim().is_empty() {
        return Err(LedgerError::validation("title is required"));
    }
    if input.account_id.trim().is_empty() {
        return Err(LedgerError::validation("account is required"));
    }
    if input.amount < 0 {
        return Err(LedgerError::validation(format!(
            "amount must not be negative (got {})",
            input.amount
        )));
    }
    if input.fee < 0 {
        return Err(LedgerError::validation(format!(
            "fee must not be negative (got {})",
            input.fee
        )));
    }
    if input.amount.checked_add(input.fee).is_none() {
        return Err(LedgerError::validation(format!(
            "amount plus fee is out of range ({} + {})",
            input.amount, input.fee
        )));
    }
    // The fee leg is stamped one millisecond after its transfer.
    if input.fee > 0 && input.created_at == i64::MAX {
        return Err(LedgerError::validation(
            "timestamp leaves no room for the transfer fee entry",
        ));
    }
    match (input.r#type, input.target_account_id.as_deref()) {
        (TransactionType::Transfer, None) => {
            Err(LedgerError::validation("transfer requires a target account"))
        }
        (TransactionType::Transfer, Some(target)) if target == input.account_id => Err(
            LedgerError::validation("transfer target must differ from the source account"),
        ),
        (TransactionType::Transfer, Some(_)) => Ok(()),
        (kind, Some(_)) => Err(LedgerError::validation(format!(
            "{} transactions cannot have a target account",
            kind
        ))),
        (kind, None) if input.fee != 0 => Err(LedgerError::validation(format!(
            "{} transactions cannot carry a fee",
            kind
        ))),
        (_, None) => Ok(()),
    }
}

/// Insert plus balance effects, inside a batch the caller already opened.
pub(crate) fn insert_in(conn: &Connection, input: &NewTransaction) -> Result<Transaction> {
    let source = super::accounts::require_name(conn, &input.account_id)?;
    let target = match input.target_account_id.as_deref() {
        Some(t) => Some(super::accounts::require_name(conn, t)?),
        None => None,
    };
    tracing::debug!(source = %source, target = ?target, "recording transaction");

    let id = generate_id();
    write_row(conn, &id, input, None)?;
    balance::apply(conn, &Posting::from(input))?;

    let tx = load(conn, &id)?;
    if let Some(target_name) = target.filter(|_| tx.fee > 0) {
        insert_fee_leg(conn, &tx, &target_name)?;
    }
    Ok(tx)
}

pub(crate) fn edit_in(conn: &Connection, id: &str, input: &NewTransaction) -> Result<Transaction> {
    let old = load(conn, id)?;
    if old.is_fee_leg() {
        return Err(LedgerError::validation(
            "transfer fee entries change only through their transfer",
        ));
    }

    balance::reverse(conn, &Posting::from(&old))?;

    super::accounts::require_name(conn, &input.account_id)?;
    let target = match input.target_account_id.as_deref() {
        Some(t) => Some(super::accounts::require_name(conn, t)?),
        None => None,
    };

    conn.execute(
        "UPDATE transactions SET title = ?1, description = ?2, amount = ?3, type = ?4,
            account_id = ?5, target_account_id = ?6, created_at = ?7, category = ?8,
            fee = ?9, img = ?10
         WHERE id = ?11",
        params![
            input.title.trim(),
            input.description,
            input.amount,
            input.r#type,
            input.account_id,
            input.target_account_id,
            input.created_at,
            input.category,
            input.fee,
            input.img,
            id
        ],
    )?;
    balance::apply(conn, &Posting::from(input))?;

    let updated = load(conn, id)?;
    reconcile_fee_leg(conn, &updated, target.as_deref())?;
    Ok(updated)
}

pub(crate) fn delete_in(conn: &Connection, id: &str) -> Result<()> {
    let tx = load(conn, id)?;
    if tx.is_fee_leg() {
        return Err(LedgerError::validation(
            "transfer fee entries are removed together with their transfer",
        ));
    }
    balance::reverse(conn, &Posting::from(&tx))?;
    let legs = conn.execute(
        "DELETE FROM transactions WHERE linked_transaction_id = ?1",
        params![id],
    )?;
    conn.execute("DELETE FROM transactions WHERE id = ?1", params![id])?;
    tracing::debug!(id, fee_legs = legs, "transaction rows removed");
    Ok(())
}

fn load(conn: &Connection, id: &str) -> Result<Transaction> {
    get_transaction(conn, id)?.ok_or_else(|| LedgerError::transaction_not_found(id))
}

fn write_row(
    conn: &Connection,
    id: &str,
    input: &NewTransaction,
    linked: Option<&str>,
) -> Result<()> {
    conn.execute(
        "INSERT INTO transactions(id, title, description, amount, type, account_id,
            target_account_id, created_at, category, fee, img, linked_transaction_id)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9, ?10, ?11, ?12)",
        params![
            id,
            input.title.trim(),
            input.description,
            input.amount,
            input.r#type,
            input.account_id,
            input.target_account_id,
            input.created_at,
            input.category,
            input.fee,
            input.img,
            linked
        ],
    )?;
    Ok(())
}

fn fee_leg_for(parent: &Transaction, target_name: &str) -> NewTransaction {
    NewTransaction {
        title: FEE_TITLE.to_string(),
        description: Some(format!("{} to {}", FEE_TITLE, target_name)),
        amount: parent.fee,
        r#type: TransactionType::Expense,
        account_id: parent.account_id.clone(),
        target_account_id: None,
        created_at: parent.created_at + 1,
        category: Some(FEE_CATEGORY.to_string()),
        fee: 0,
        img: None,
    }
}

fn insert_fee_leg(conn: &Connection, parent: &Transaction, target_name: &str) -> Result<()> {
    let leg = fee_leg_for(parent, target_name);
    let id = generate_id();
    write_row(conn, &id, &leg, Some(&parent.id))?;
    tracing::debug!(parent = %parent.id, leg = %id, fee = leg.amount, "fee leg recorded");
    Ok(())
}

fn find_fee_leg(conn: &Connection, parent_id: &str) -> Result<Option<Transaction>> {
    let sql = format!(
        "SELECT {} FROM transactions WHERE linked_transaction_id = ?1 LIMIT 1",
        Transaction::COLUMNS
    );
    let leg = conn
        .query_row(&sql, params![parent_id], Transaction::from_row)
        .optional()?;
    Ok(leg)
}

/// Brings the fee leg in line with an edited transfer: updated when the
/// fee persists, created when a fee appears, removed when it goes away.
fn reconcile_fee_leg(conn: &Connection, parent: &Transaction, target_name: Option<&str>) -> Result<()> {
    let existing = find_fee_leg(conn, &parent.id)?;
    let wanted = match target_name {
        Some(name) if parent.fee > 0 => Some(fee_leg_for(parent, name)),
        _ => None,
    };
    match (wanted, existing) {
        (Some(leg), Some(old)) => {
            conn.execute(
                "UPDATE transactions SET amount = ?1, account_id = ?2, created_at = ?3,
                    description = ?4
                 WHERE id = ?5",
                params![leg.amount, leg.account_id, leg.created_at, leg.description, old.id],
            )?;
            tracing::debug!(parent = %parent.id, leg = %old.id, fee = leg.amount, "fee leg updated");
        }
        (Some(_), None) => {
            if let Some(name) = target_name {
                insert_fee_leg(conn, parent, name)?;
            }
        }
        (None, Some(old)) => {
            conn.execute("DELETE FROM transactions WHERE id = ?1", params![old.id])?;
            tracing::debug!(parent = %parent.id, leg = %old.id, "fee leg removed");
        }
        (None, None) => {}
    }
    Ok(())
}
