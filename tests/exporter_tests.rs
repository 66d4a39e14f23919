// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketbook::models::{NewAccount, NewTransaction};
use pocketbook::{cli, commands::exporter, db, ledger, settings};
use rusqlite::Connection;
use serde_json::json;
use tempfile::tempdir;

const JAN_2: i64 = 1_735_776_000_000;

fn base_conn() -> Connection {
    let mut conn = db::open_in_memory().unwrap();
    settings::save_setting(&conn, "currency", &json!({"symbol": "$", "decimals": 2})).unwrap();
    for (id, name) in [("chk", "Checking"), ("sav", "Savings")] {
        ledger::create_account(
            &mut conn,
            &NewAccount {
                id: Some(id.into()),
                name: name.into(),
                r#type: "bank".into(),
                ..Default::default()
            },
        )
        .unwrap();
    }
    let mut shop = NewTransaction::expense("chk", 1_234, JAN_2);
    shop.title = "Corner Shop".into();
    shop.category = Some("Groceries".into());
    shop.description = Some("Weekly run".into());
    ledger::add_transaction(&mut conn, &shop).unwrap();
    conn
}

#[test]
fn export_transactions_writes_json() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.json");
    let out_str = out_path.to_string_lossy().to_string();

    let cli = cli::build_cli();
    let matches = cli.get_matches_from([
        "pocketbook",
        "export",
        "transactions",
        "--format",
        "json",
        "--out",
        out_str.as_str(),
    ]);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(&conn, export_m).unwrap();
    } else {
        panic!("no export subcommand");
    }

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let mut parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let id = parsed[0]["id"].take();
    assert_eq!(id.as_str().map(str::len), Some(32));
    assert_eq!(
        parsed,
        json!([
            {
                "id": null,
                "createdAt": JAN_2,
                "title": "Corner Shop",
                "description": "Weekly run",
                "amount": 1234,
                "type": "expense",
                "account": "Checking",
                "accountId": "chk",
                "targetAccount": null,
                "targetAccountId": null,
                "category": "Groceries",
                "fee": 0,
                "img": null,
                "linkedTransactionId": null
            }
        ])
    );
}

#[test]
fn csv_export_uses_major_units_and_marks_fee_legs() {
    let mut conn = base_conn();
    let transfer = ledger::add_transaction(
        &mut conn,
        &NewTransaction::transfer("chk", "sav", 50_000, 250, JAN_2 + 60_000),
    )
    .unwrap();

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.csv");
    let n = exporter::export_transactions(&conn, "csv", &out_path).unwrap();
    assert_eq!(n, 3);

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let rows: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(rows.len(), 3);

    assert_eq!(&rows[0][0], "2025-01-02 00:00");
    assert_eq!(&rows[0][2], "12.34");
    assert_eq!(&rows[0][4], "Checking");

    assert_eq!(&rows[1][1], "Transfer");
    assert_eq!(&rows[1][2], "500.00");
    assert_eq!(&rows[1][5], "Savings");
    assert_eq!(&rows[1][7], "2.50");
    assert_eq!(&rows[1][10], "");

    assert_eq!(&rows[2][2], "2.50");
    assert_eq!(&rows[2][3], "expense");
    assert_eq!(&rows[2][10], transfer.id.as_str());
}

#[test]
fn export_transactions_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");

    assert!(exporter::export_transactions(&conn, "xml", &out_path).is_err());
    assert!(!out_path.exists());
}
