// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::required;
use crate::ledger;
use crate::utils::{MoneyFormat, fmt_timestamp};
use anyhow::{Result, anyhow};
use rust_decimal::Decimal;
use rusqlite::Connection;
use serde_json::json;
use std::collections::HashMap;
use std::path::Path;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("transactions", sub)) => {
            let fmt = required(sub, "format")?.to_lowercase();
            let out = required(sub, "out")?;
            let n = export_transactions(conn, &fmt, Path::new(out))?;
            println!("Exported {} transaction(s) to {}", n, out);
            Ok(())
        }
        _ => Ok(()),
    }
}

/// Writes every transaction, oldest first, with account names resolved.
/// Amounts are written in major units of the configured currency.
pub fn export_transactions(conn: &Connection, fmt: &str, out: &Path) -> Result<usize> {
    let money = MoneyFormat::load(conn)?;
    let names: HashMap<String, String> = ledger::list_accounts(conn)?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let name_of = |id: &str| names.get(id).cloned().unwrap_or_else(|| id.to_string());
    let major = |minor: i64| Decimal::new(minor, money.decimals).to_string();

    let mut txs = ledger::list_transactions(conn)?;
    txs.reverse();

    match fmt {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "date", "title", "amount", "type", "account", "target", "category", "fee",
                "description", "id", "linked",
            ])?;
            for t in &txs {
                wtr.write_record([
                    fmt_timestamp(t.created_at),
                    t.title.clone(),
                    major(t.amount),
                    t.r#type.to_string(),
                    name_of(&t.account_id),
                    t.target_account_id.as_deref().map(name_of).unwrap_or_default(),
                    t.category.clone().unwrap_or_default(),
                    major(t.fee),
                    t.description.clone().unwrap_or_default(),
                    t.id.clone(),
                    t.linked_transaction_id.clone().unwrap_or_default(),
                ])?;
            }
            wtr.flush()?;
        }
        "json" => {
            let items: Vec<_> = txs
                .iter()
                .map(|t| {
                    json!({
                        "id": t.id,
                        "createdAt": t.created_at,
                        "title": t.title,
                        "description": t.description,
                        "amount": t.amount,
                        "type": t.r#type,
                        "account": name_of(&t.account_id),
                        "accountId": t.account_id,
                        "targetAccount": t.target_account_id.as_deref().map(name_of),
                        "targetAccountId": t.target_account_id,
                        "category": t.category,
                        "fee": t.fee,
                        "img": t.img,
                        "linkedTransactionId": t.linked_transaction_id,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
        other => return Err(anyhow!("Unknown format: {} (use csv|json)", other)),
    }
    tracing::info!(count = txs.len(), path = %out.display(), "transactions exported");
    Ok(txs.len())
}
