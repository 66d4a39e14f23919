// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketbook::commands::backup::{self, BACKUP_EXTENSION};
use pocketbook::models::{NewAccount, NewTransaction};
use pocketbook::{db, ledger};
use std::path::Path;
use tempfile::tempdir;

fn seeded_db(path: &Path) {
    let mut conn = db::open_or_init(path).unwrap();
    let acct = ledger::create_account(
        &mut conn,
        &NewAccount {
            id: Some("wallet".into()),
            name: "Wallet".into(),
            r#type: "cash".into(),
            balance: 10_000,
            ..Default::default()
        },
    )
    .unwrap();
    ledger::add_transaction(&mut conn, &NewTransaction::expense(&acct.id, 2_500, 1_000)).unwrap();
}

#[test]
fn backup_then_restore_brings_back_old_state() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("ledger.sqlite");
    seeded_db(&db_path);

    let written = {
        let conn = db::open_or_init(&db_path).unwrap();
        backup::backup_to(&conn, dir.path()).unwrap()
    };
    assert_eq!(
        written.extension().and_then(|e| e.to_str()),
        Some(BACKUP_EXTENSION)
    );

    {
        let mut conn = db::open_or_init(&db_path).unwrap();
        ledger::add_transaction(&mut conn, &NewTransaction::expense("wallet", 7_500, 2_000))
            .unwrap();
        assert_eq!(ledger::list_transactions(&conn).unwrap().len(), 3);
    }

    backup::restore_from(&written, &db_path).unwrap();

    let conn = db::open_or_init(&db_path).unwrap();
    let wallet = ledger::get_account(&conn, "wallet").unwrap().unwrap();
    assert_eq!(wallet.balance(), 7_500);
    assert_eq!(ledger::list_transactions(&conn).unwrap().len(), 2);
    assert!(!db_path.with_extension("restoring").exists());
}

#[test]
fn backup_refuses_to_overwrite() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("ledger.sqlite");
    seeded_db(&db_path);
    let out = dir.path().join("copy.smbak");
    std::fs::write(&out, b"keep me").unwrap();

    let conn = db::open_or_init(&db_path).unwrap();
    assert!(backup::backup_to(&conn, &out).is_err());
    assert_eq!(std::fs::read(&out).unwrap(), b"keep me");
}

#[test]
fn restore_rejects_files_that_are_not_ledgers() {
    let dir = tempdir().unwrap();
    let db_path = dir.path().join("ledger.sqlite");
    seeded_db(&db_path);

    let junk = dir.path().join("junk.smbak");
    std::fs::write(&junk, b"definitely not sqlite").unwrap();
    assert!(backup::restore_from(&junk, &db_path).is_err());

    let foreign = dir.path().join("foreign.smbak");
    {
        let other = rusqlite::Connection::open(&foreign).unwrap();
        other
            .execute_batch("CREATE TABLE notes(id INTEGER PRIMARY KEY, body TEXT);")
            .unwrap();
    }
    assert!(backup::restore_from(&foreign, &db_path).is_err());

    let conn = db::open_or_init(&db_path).unwrap();
    assert_eq!(
        ledger::get_account(&conn, "wallet").unwrap().unwrap().balance(),
        7_500
    );
}
