// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::ledger::{self, DanglingReference};
use crate::utils::{MoneyFormat, fmt_money, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = issues(conn)?;
    if rows.is_empty() {
        println!("doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}

/// One `[issue, detail]` row per problem found.
pub fn issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let fmt = MoneyFormat::load(conn)?;
    let mut rows = Vec::new();

    // 1) Stored balances that no longer match their transactions
    for d in ledger::verify_balances(conn)? {
        rows.push(vec![
            "balance_drift".into(),
            format!(
                "{} [{}]: stored {}, expected {}",
                d.name,
                d.account_id,
                fmt_money(d.stored, &fmt),
                fmt_money(d.expected, &fmt)
            ),
        ]);
    }

    // 2) References to rows that are gone
    for r in ledger::dangling_references(conn)? {
        let row = match r {
            DanglingReference::MissingSource {
                transaction_id,
                account_id,
            } => vec![
                "missing_source_account".into(),
                format!("{} -> {}", transaction_id, account_id),
            ],
            DanglingReference::MissingTarget {
                transaction_id,
                account_id,
            } => vec![
                "missing_target_account".into(),
                format!("{} -> {}", transaction_id, account_id),
            ],
            DanglingReference::OrphanFeeLeg {
                transaction_id,
                parent_id,
            } => vec![
                "orphan_fee_entry".into(),
                format!("{} (transfer {})", transaction_id, parent_id),
            ],
        };
        rows.push(row);
    }
    Ok(rows)
}
