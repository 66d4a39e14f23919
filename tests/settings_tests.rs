// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use pocketbook::categories::{
    add_category, delete_category, edit_category, find_category_by_name, list_categories,
    seed_defaults,
};
use pocketbook::models::{CategoryType, NewCategory};
use pocketbook::utils::{MoneyFormat, fmt_money};
use pocketbook::{cli, commands, db, settings};
use rusqlite::Connection;
use serde_json::{Value, json};

fn setup() -> Connection {
    db::open_in_memory().unwrap()
}

#[test]
fn json_values_round_trip() {
    let conn = setup();
    let value = json!({"theme": "dark", "reminders": [8, 20]});
    settings::save_setting(&conn, "prefs", &value).unwrap();
    assert_eq!(settings::get_setting(&conn, "prefs").unwrap(), Some(value));

    settings::save_setting(&conn, "prefs", &json!(false)).unwrap();
    assert_eq!(settings::get_setting(&conn, "prefs").unwrap(), Some(json!(false)));
    assert_eq!(settings::list_settings(&conn).unwrap().len(), 1);
}

#[test]
fn strings_are_stored_as_json_text() {
    let conn = setup();
    settings::save_setting(&conn, "language", &json!("id")).unwrap();
    assert_eq!(
        settings::get_setting_raw(&conn, "language").unwrap().as_deref(),
        Some("\"id\"")
    );
    assert_eq!(
        settings::get_setting(&conn, "language").unwrap(),
        Some(Value::String("id".into()))
    );
}

#[test]
fn json_looking_strings_stay_strings() {
    let conn = setup();
    for text in ["123", "null", "true", "[1]"] {
        settings::save_setting(&conn, "k", &json!(text)).unwrap();
        assert_eq!(
            settings::get_setting(&conn, "k").unwrap(),
            Some(Value::String(text.into()))
        );
    }

    settings::save_setting(&conn, "currency", &json!("null")).unwrap();
    assert_eq!(MoneyFormat::load(&conn).unwrap().symbol, "null");
}

#[test]
fn hand_written_bare_text_reads_as_string() {
    let conn = setup();
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('language', 'en')",
        [],
    )
    .unwrap();
    assert_eq!(
        settings::get_setting(&conn, "language").unwrap(),
        Some(Value::String("en".into()))
    );
}

#[test]
fn missing_and_deleted_settings() {
    let conn = setup();
    assert_eq!(settings::get_setting(&conn, "nope").unwrap(), None);
    settings::save_setting(&conn, "k", &json!(1)).unwrap();
    assert!(settings::delete_setting(&conn, "k").unwrap());
    assert!(!settings::delete_setting(&conn, "k").unwrap());
    assert_eq!(settings::get_setting(&conn, "k").unwrap(), None);
}

#[test]
fn currency_setting_drives_money_format() {
    let conn = setup();
    assert_eq!(MoneyFormat::load(&conn).unwrap(), MoneyFormat::default());
    assert_eq!(fmt_money(100_000, &MoneyFormat::load(&conn).unwrap()), "Rp 100000");

    settings::save_setting(&conn, "currency", &json!("IDR")).unwrap();
    assert_eq!(MoneyFormat::load(&conn).unwrap().symbol, "IDR");

    settings::save_setting(&conn, "currency", &json!({"symbol": "€", "decimals": 2})).unwrap();
    assert_eq!(fmt_money(1_999, &MoneyFormat::load(&conn).unwrap()), "€ 19.99");

    settings::save_setting(&conn, "currency", &json!({"symbol": "x", "decimals": 12})).unwrap();
    assert!(MoneyFormat::load(&conn).is_err());
}

#[test]
fn cli_set_accepts_json_or_plain_text() {
    let conn = setup();
    for (value, expected) in [("[\"a\",\"b\"]", json!(["a", "b"])), ("hello", json!("hello"))] {
        let matches = cli::build_cli().get_matches_from([
            "pocketbook",
            "settings",
            "set",
            "--key",
            "k",
            "--value",
            value,
        ]);
        if let Some(("settings", settings_m)) = matches.subcommand() {
            commands::settings::handle(&conn, settings_m).unwrap();
        } else {
            panic!("settings subcommand not parsed");
        }
        assert_eq!(settings::get_setting(&conn, "k").unwrap(), Some(expected));
    }
}

#[test]
fn default_categories_are_seeded_once() {
    let conn = setup();
    let seeded = list_categories(&conn, None).unwrap();
    assert_eq!(seeded.len(), 16);
    assert_eq!(seed_defaults(&conn).unwrap(), 0);
    db::init_schema(&conn).unwrap();
    assert_eq!(list_categories(&conn, None).unwrap().len(), 16);

    let income = list_categories(&conn, Some(CategoryType::Income)).unwrap();
    assert!(income.iter().all(|c| c.r#type == CategoryType::Income));
    assert!(income.iter().any(|c| c.name == "Salary"));
}

#[test]
fn category_crud() {
    let conn = setup();
    let added = add_category(
        &conn,
        &NewCategory {
            id: Some("pets".into()),
            name: "Pets".into(),
            icon: "paw".into(),
            color: "#123456".into(),
            r#type: CategoryType::Expense,
        },
    )
    .unwrap();
    assert_eq!(find_category_by_name(&conn, "pets").unwrap(), Some(added.clone()));

    let edited = edit_category(
        &conn,
        "pets",
        &NewCategory {
            id: None,
            name: "Pet care".into(),
            icon: added.icon.clone(),
            color: added.color.clone(),
            r#type: added.r#type,
        },
    )
    .unwrap();
    assert_eq!(edited.name, "Pet care");
    assert_eq!(edited.icon, "paw");

    delete_category(&conn, "pets").unwrap();
    assert!(delete_category(&conn, "pets").unwrap_err().is_not_found());
}
