// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketbook::commands::{exporter, importer};
use pocketbook::ledger::{self, FEE_CATEGORY};
use pocketbook::models::{NewAccount, NewTransaction};
use pocketbook::{cli, db};
use rusqlite::Connection;
use std::io::Write;
use tempfile::{NamedTempFile, tempdir};

fn base_conn() -> Connection {
    db::open_in_memory().unwrap()
}

fn balance_of(conn: &Connection, id_or_name: &str) -> i64 {
    ledger::resolve_account(conn, id_or_name).unwrap().balance()
}

const LEGACY: &str = r#"{
  "accounts": [
    {"id": "acc-a", "name": "Wallet", "balance": 999999, "type": "cash"},
    {"id": "acc-b", "name": "Bank", "type": "bank"}
  ],
  "transactions": [
    {"title": "Lunch", "amount": 4000, "type": "expense", "accountId": "acc-a", "createdAt": 3000},
    {"title": "transfer fee", "amount": 500, "type": "expense", "accountId": "acc-b",
     "category": "admin fee", "createdAt": 2001},
    {"title": "Top up", "amount": 20000, "type": "transfer", "accountId": "acc-b",
     "targetAccountId": "acc-a", "fee": 500, "createdAt": 2000},
    {"title": "Salary", "amount": 100000, "type": "income", "accountId": "acc-b", "createdAt": 1000}
  ]
}"#;

#[test]
fn legacy_import_replays_history_into_balances() {
    let mut conn = base_conn();
    let mut f = NamedTempFile::new().unwrap();
    write!(f, "{}", LEGACY).unwrap();

    let summary = importer::import_legacy(&mut conn, f.path()).unwrap();
    assert_eq!(summary.accounts, 2);
    assert_eq!(summary.transactions, 3);
    assert_eq!(summary.skipped_fee_legs, 1);

    // Stored balances are ignored in favour of the replayed history.
    assert_eq!(balance_of(&conn, "acc-a"), 20_000 - 4_000);
    assert_eq!(balance_of(&conn, "acc-b"), 100_000 - 20_500);

    let txs = ledger::list_transactions(&conn).unwrap();
    assert_eq!(txs.len(), 4);
    let fee = txs.iter().find(|t| t.is_fee_leg()).unwrap();
    assert_eq!(fee.category.as_deref(), Some(FEE_CATEGORY));
    assert_eq!(fee.created_at, 2001);
    assert!(ledger::verify_balances(&conn).unwrap().is_empty());
}

#[test]
fn legacy_import_is_all_or_nothing() {
    let mut conn = base_conn();
    let mut f = NamedTempFile::new().unwrap();
    write!(
        f,
        r#"{{
          "accounts": [{{"id": "acc-a", "name": "Wallet", "type": "cash"}}],
          "transactions": [
            {{"title": "ok", "amount": 10, "type": "income", "accountId": "acc-a", "createdAt": 1}},
            {{"title": "bad", "amount": 10, "type": "expense", "accountId": "ghost", "createdAt": 2}}
          ]
        }}"#
    )
    .unwrap();

    let err = importer::import_legacy(&mut conn, f.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("bad"));
    assert!(ledger::list_accounts(&conn).unwrap().is_empty());
    assert!(ledger::list_transactions(&conn).unwrap().is_empty());
}

#[test]
fn csv_import_resolves_accounts_by_name() {
    let mut conn = base_conn();
    for name in ["Wallet", "Bank"] {
        ledger::create_account(
            &mut conn,
            &NewAccount {
                name: name.into(),
                r#type: "cash".into(),
                ..Default::default()
            },
        )
        .unwrap();
    }
    let mut f = NamedTempFile::new().unwrap();
    writeln!(f, "date,title,amount,type,account,target,category,fee,description").unwrap();
    writeln!(f, "2025-01-01,Salary,5000,income,Bank,,Salary,,").unwrap();
    writeln!(f, "2025-01-02,Cash out,1000,transfer,bank,Wallet,,50,ATM").unwrap();
    writeln!(f, "2025-01-03 12:30,,200,expense,Wallet,,Food,,").unwrap();

    let cli = cli::build_cli();
    let path = f.path().to_string_lossy().to_string();
    let matches = cli.get_matches_from(["pocketbook", "import", "csv", "--path", path.as_str()]);
    if let Some(("import", import_m)) = matches.subcommand() {
        importer::handle(&mut conn, import_m).unwrap();
    } else {
        panic!("import subcommand not parsed");
    }

    assert_eq!(balance_of(&conn, "Bank"), 5_000 - 1_050);
    assert_eq!(balance_of(&conn, "Wallet"), 800);
    let txs = ledger::list_transactions(&conn).unwrap();
    assert_eq!(txs.len(), 4);
    assert_eq!(txs[0].title, "expense");
    assert_eq!(txs[0].created_at, pocketbook::utils::parse_timestamp("2025-01-03 12:30").unwrap());
}

#[test]
fn csv_import_with_unknown_account_writes_nothing() {
    let mut conn = base_conn();
    ledger::create_account(
        &mut conn,
        &NewAccount {
            name: "Wallet".into(),
            r#type: "cash".into(),
            ..Default::default()
        },
    )
    .unwrap();
    let mut f = NamedTempFile::new().unwrap();
    writeln!(f, "date,title,amount,type,account").unwrap();
    writeln!(f, "2025-01-01,ok,10,income,Wallet").unwrap();
    writeln!(f, "2025-01-02,bad,10,expense,Nowhere").unwrap();

    let err = importer::import_csv(&mut conn, f.path()).unwrap_err();
    assert!(format!("{:#}", err).contains("line 3"));
    assert_eq!(balance_of(&conn, "Wallet"), 0);
    assert!(ledger::list_transactions(&conn).unwrap().is_empty());
}

#[test]
fn csv_import_rejects_bad_amount_before_writing() {
    let mut conn = base_conn();
    let mut f = NamedTempFile::new().unwrap();
    writeln!(f, "date,title,amount,type,account").unwrap();
    writeln!(f, "2025-01-01,x,ten,income,Wallet").unwrap();
    assert!(importer::import_csv(&mut conn, f.path()).is_err());
    assert!(ledger::list_transactions(&conn).unwrap().is_empty());
}

#[test]
fn exported_csv_reimports_to_same_balances() {
    let mut source = base_conn();
    let a = ledger::create_account(
        &mut source,
        &NewAccount {
            name: "Wallet".into(),
            r#type: "cash".into(),
            balance: 50_000,
            ..Default::default()
        },
    )
    .unwrap();
    let b = ledger::create_account(
        &mut source,
        &NewAccount {
            name: "Bank".into(),
            r#type: "bank".into(),
            ..Default::default()
        },
    )
    .unwrap();
    ledger::add_transaction(
        &mut source,
        &NewTransaction::transfer(&a.id, &b.id, 10_000, 1_000, 1_735_689_600_000),
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out = dir.path().join("tx.csv");
    assert_eq!(exporter::export_transactions(&source, "csv", &out).unwrap(), 3);

    let mut target = base_conn();
    for name in ["Wallet", "Bank"] {
        ledger::create_account(
            &mut target,
            &NewAccount {
                name: name.into(),
                r#type: "cash".into(),
                ..Default::default()
            },
        )
        .unwrap();
    }
    assert_eq!(importer::import_csv(&mut target, &out).unwrap(), 2);

    assert_eq!(balance_of(&target, "Wallet"), 39_000);
    assert_eq!(balance_of(&target, "Bank"), 10_000);
    assert_eq!(
        ledger::list_transactions(&target).unwrap().len(),
        ledger::list_transactions(&source).unwrap().len()
    );
}
