// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Signed balance effects of a transaction, and the single place that
//! writes `accounts.balance`.

use crate::error::{LedgerError, Result};
use crate::models::{NewTransaction, Transaction, TransactionType};
use rusqlite::{Connection, OptionalExtension, params};

/// The monetary shape of a row, independent of whether it is stored yet.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct Posting<'a> {
    pub kind: TransactionType,
    pub account_id: &'a str,
    pub target_account_id: Option<&'a str>,
    pub amount: i64,
    pub fee: i64,
    pub fee_leg: bool,
}

impl<'a> From<&'a Transaction> for Posting<'a> {
    fn from(t: &'a Transaction) -> Self {
        Self {
            kind: t.r#type,
            account_id: &t.account_id,
            target_account_id: t.target_account_id.as_deref(),
            amount: t.amount,
            fee: t.fee,
            fee_leg: t.is_fee_leg(),
        }
    }
}

impl<'a> From<&'a NewTransaction> for Posting<'a> {
    fn from(t: &'a NewTransaction) -> Self {
        Self {
            kind: t.r#type,
            account_id: &t.account_id,
            target_account_id: t.target_account_id.as_deref(),
            amount: t.amount,
            fee: t.fee,
            fee_leg: false,
        }
    }
}

/// `(account, delta)` pairs. Fee legs carry no effect of their own: the
/// parent transfer already deducted the fee from the source.
pub(crate) fn effects<'a>(p: &Posting<'a>) -> Vec<(&'a str, i64)> {
    if p.fee_leg {
        return Vec::new();
    }
    match p.kind {
        TransactionType::Income => vec![(p.account_id, p.amount)],
        TransactionType::Expense => vec![(p.account_id, -p.amount)],
        TransactionType::Transfer => {
            // amount + fee is checked in validation.
            let mut out = vec![(p.account_id, -(p.amount + p.fee))];
            if let Some(target) = p.target_account_id {
                out.push((target, p.amount));
            }
            out
        }
    }
}

pub(crate) fn apply(conn: &Connection, p: &Posting<'_>) -> Result<()> {
    for (account_id, delta) in effects(p) {
        adjust(conn, account_id, delta)?;
    }
    Ok(())
}

pub(crate) fn reverse(conn: &Connection, p: &Posting<'_>) -> Result<()> {
    for (account_id, delta) in effects(p) {
        adjust(conn, account_id, -delta)?;
    }
    Ok(())
}

fn adjust(conn: &Connection, account_id: &str, delta: i64) -> Result<()> {
    let current: i64 = conn
        .query_row(
            "SELECT balance FROM accounts WHERE id = ?1",
            params![account_id],
            |r| r.get(0),
        )
        .optional()?
        .ok_or_else(|| LedgerError::account_not_found(account_id))?;
    // SQLite would silently widen an overflowing sum to REAL.
    let next = current.checked_add(delta).ok_or_else(|| {
        LedgerError::validation(format!(
            "balance of account '{}' would overflow ({} {:+})",
            account_id, current, delta
        ))
    })?;
    conn.execute(
        "UPDATE accounts SET balance = ?1 WHERE id = ?2",
        params![next, account_id],
    )?;
    tracing::debug!(account = account_id, delta, balance = next, "balance adjusted");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn posting(kind: TransactionType, amount: i64, fee: i64) -> Posting<'static> {
        Posting {
            kind,
            account_id: "a",
            target_account_id: (kind == TransactionType::Transfer).then_some("b"),
            amount,
            fee,
            fee_leg: false,
        }
    }

    #[test]
    fn income_and_expense_touch_source_only() {
        assert_eq!(effects(&posting(TransactionType::Income, 500, 0)), vec![("a", 500)]);
        assert_eq!(effects(&posting(TransactionType::Expense, 500, 0)), vec![("a", -500)]);
    }

    #[test]
    fn transfer_folds_fee_into_source() {
        assert_eq!(
            effects(&posting(TransactionType::Transfer, 20_000, 1_000)),
            vec![("a", -21_000), ("b", 20_000)]
        );
    }

    #[test]
    fn fee_leg_has_no_effect() {
        let mut p = posting(TransactionType::Expense, 1_000, 0);
        p.fee_leg = true;
        assert!(effects(&p).is_empty());
    }
}
