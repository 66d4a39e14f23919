// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::required;
use crate::settings::{delete_setting, get_setting, list_settings, save_setting};
use crate::utils::pretty_table;
use anyhow::Result;
use rusqlite::Connection;
use serde_json::Value;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("get", sub)) => {
            let key = required(sub, "key")?;
            match get_setting(conn, key)? {
                Some(Value::String(s)) => println!("{}", s),
                Some(v) => println!("{}", serde_json::to_string_pretty(&v)?),
                None => println!("'{}' is not set", key),
            }
        }
        Some(("set", sub)) => {
            let key = required(sub, "key")?;
            let raw = required(sub, "value")?;
            let value = serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()));
            save_setting(conn, key, &value)?;
            println!("Saved '{}'", key);
        }
        Some(("rm", sub)) => {
            let key = required(sub, "key")?;
            if delete_setting(conn, key)? {
                println!("Removed '{}'", key);
            } else {
                println!("'{}' is not set", key);
            }
        }
        Some(("list", _)) => {
            let rows = list_settings(conn)?
                .into_iter()
                .map(|(k, v)| vec![k, v])
                .collect();
            println!("{}", pretty_table(&["Key", "Value"], rows));
        }
        _ => {}
    }
    Ok(())
}
