// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::balance::{Posting, effects};
use super::{accounts, transactions};
use crate::error::Result;
use rusqlite::Connection;
use serde::Serialize;
use std::collections::{HashMap, HashSet};

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BalanceDrift {
    pub account_id: String,
    pub name: String,
    pub stored: i64,
    pub expected: i64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub enum DanglingReference {
    MissingSource { transaction_id: String, account_id: String },
    MissingTarget { transaction_id: String, account_id: String },
    OrphanFeeLeg { transaction_id: String, parent_id: String },
}

/// Accounts whose stored balance differs from the sum of the effects of
/// the transactions that reference them.
pub fn verify_balances(conn: &Connection) -> Result<Vec<BalanceDrift>> {
    let txs = transactions::list_transactions(conn)?;
    // Widened so a tampered history cannot overflow the running sum.
    let mut expected: HashMap<&str, i128> = HashMap::new();
    for tx in &txs {
        for (account, delta) in effects(&Posting::from(tx)) {
            *expected.entry(account).or_default() += i128::from(delta);
        }
    }

    let mut out = Vec::new();
    for account in accounts::list_accounts(conn)? {
        let want = expected.get(account.id.as_str()).copied().unwrap_or(0);
        if want != i128::from(account.balance()) {
            out.push(BalanceDrift {
                account_id: account.id.clone(),
                name: account.name.clone(),
                stored: account.balance(),
                expected: want.clamp(i128::from(i64::MIN), i128::from(i64::MAX)) as i64,
            });
        }
    }
    Ok(out)
}

pub fn dangling_references(conn: &Connection) -> Result<Vec<DanglingReference>> {
    let known: HashSet<String> = accounts::list_accounts(conn)?
        .into_iter()
        .map(|a| a.id)
        .collect();
    let txs = transactions::list_transactions(conn)?;
    let tx_ids: HashSet<&str> = txs.iter().map(|t| t.id.as_str()).collect();

    let mut out = Vec::new();
    for tx in &txs {
        if !known.contains(&tx.account_id) {
            out.push(DanglingReference::MissingSource {
                transaction_id: tx.id.clone(),
                account_id: tx.account_id.clone(),
            });
        }
        if let Some(target) = tx.target_account_id.as_ref().filter(|t| !known.contains(*t)) {
            out.push(DanglingReference::MissingTarget {
                transaction_id: tx.id.clone(),
                account_id: target.clone(),
            });
        }
        if let Some(parent) = tx
            .linked_transaction_id
            .as_ref()
            .filter(|p| !tx_ids.contains(p.as_str()))
        {
            out.push(DanglingReference::OrphanFeeLeg {
                transaction_id: tx.id.clone(),
                parent_id: parent.clone(),
            });
        }
    }
    Ok(out)
}
