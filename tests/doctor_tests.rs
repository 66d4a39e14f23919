// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketbook::commands::{doctor, reports};
use pocketbook::ledger::{self, DanglingReference};
use pocketbook::models::{NewAccount, NewTransaction};
use pocketbook::db;
use rusqlite::{Connection, params};

fn setup() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    for (id, balance, liability) in [("cash", 40_000, false), ("card", 15_000, true)] {
        ledger::create_account(
            &mut conn,
            &NewAccount {
                id: Some(id.into()),
                name: id.into(),
                r#type: "cash".into(),
                balance,
                is_liability: liability,
                ..Default::default()
            },
        )
        .unwrap();
    }
    ledger::add_transaction(
        &mut conn,
        &NewTransaction::transfer("cash", "card", 5_000, 100, 1_000),
    )
    .unwrap();
    conn
}

#[test]
fn healthy_ledger_has_no_issues() {
    let conn = setup();
    assert!(doctor::issues(&conn).unwrap().is_empty());
}

#[test]
fn direct_balance_write_is_reported_as_drift() {
    let conn = setup();
    conn.execute("UPDATE accounts SET balance = 1 WHERE id = 'cash'", [])
        .unwrap();

    let drift = ledger::verify_balances(&conn).unwrap();
    assert_eq!(drift.len(), 1);
    assert_eq!(drift[0].account_id, "cash");
    assert_eq!(drift[0].stored, 1);
    assert_eq!(drift[0].expected, 40_000 - 5_100);

    let rows = doctor::issues(&conn).unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0][0], "balance_drift");
}

#[test]
fn missing_accounts_and_orphan_fees_are_reported() {
    let conn = setup();
    conn.execute("DELETE FROM accounts WHERE id = 'card'", []).unwrap();
    let transfer_id: String = conn
        .query_row(
            "SELECT id FROM transactions WHERE type = 'transfer'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    conn.execute(
        "UPDATE transactions SET linked_transaction_id = ?1 WHERE linked_transaction_id = ?2",
        params!["gone", transfer_id],
    )
    .unwrap();

    let refs = ledger::dangling_references(&conn).unwrap();
    assert!(refs.iter().any(|r| matches!(
        r,
        DanglingReference::MissingTarget { transaction_id, account_id }
            if *transaction_id == transfer_id && account_id == "card"
    )));
    assert!(refs.iter().any(|r| matches!(
        r,
        DanglingReference::MissingSource { account_id, .. } if account_id == "card"
    )));
    assert!(refs.iter().any(|r| matches!(
        r,
        DanglingReference::OrphanFeeLeg { parent_id, .. } if parent_id == "gone"
    )));

    let kinds: Vec<String> = doctor::issues(&conn)
        .unwrap()
        .into_iter()
        .map(|row| row[0].clone())
        .collect();
    assert!(kinds.contains(&"missing_target_account".to_string()));
    assert!(kinds.contains(&"orphan_fee_entry".to_string()));
}

#[test]
fn net_worth_splits_assets_and_liabilities() {
    let conn = setup();
    let nw = reports::net_worth(&conn).unwrap();
    assert_eq!(nw.assets, 40_000 - 5_100);
    assert_eq!(nw.liabilities, -15_000 + 5_000);
    assert_eq!(nw.total, nw.assets + nw.liabilities);
}

#[test]
fn category_totals_skip_transfers() {
    let conn = setup();
    let totals = reports::category_totals(&conn, None, None).unwrap();
    assert!(totals.iter().all(|t| t.kind != "transfer"));
    let fee = totals.iter().find(|t| t.category == "admin fee").unwrap();
    assert_eq!(fee.total, 100);
    let opening = totals
        .iter()
        .find(|t| t.kind == "income" && t.category == "initial-balance")
        .unwrap();
    assert_eq!(opening.total, 40_000);

    let none = reports::category_totals(&conn, Some(2_000), None).unwrap();
    assert!(none.iter().all(|t| t.category != "admin fee"));
}

#[test]
fn tampered_history_beyond_i64_reports_drift_without_panicking() {
    let conn = setup();
    conn.execute(
        "UPDATE transactions SET amount = ?1 WHERE type = 'income'",
        params![i64::MAX],
    )
    .unwrap();
    conn.execute(
        "INSERT INTO transactions(id, created_at, title, amount, type, account_id, fee)
         VALUES ('forged', 5, 'forged', ?1, 'income', 'cash', 0)",
        params![i64::MAX],
    )
    .unwrap();

    let drift = ledger::verify_balances(&conn).unwrap();
    let cash = drift.iter().find(|d| d.account_id == "cash").unwrap();
    assert_eq!(cash.expected, i64::MAX);

    let nw = reports::net_worth(&conn).unwrap();
    assert_eq!(nw.total, nw.assets + nw.liabilities);
}
