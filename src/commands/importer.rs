// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::required;
use crate::db::run_atomic;
use crate::ledger::{self, FEE_CATEGORY, FEE_TITLE, accounts, transactions};
use crate::models::{NewAccount, NewTransaction, TransactionType};
use crate::utils::{MoneyFormat, parse_amount, parse_timestamp};
use anyhow::{Context, Result, anyhow};
use csv::ReaderBuilder;
use rusqlite::Connection;
use serde::Deserialize;
use std::collections::{HashMap, hash_map::Entry};
use std::path::Path;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("legacy", sub)) => {
            let path = required(sub, "path")?.trim();
            let s = import_legacy(conn, Path::new(path))?;
            println!(
                "Imported {} account(s) and {} transaction(s) from {} ({} fee entries regenerated)",
                s.accounts, s.transactions, path, s.skipped_fee_legs
            );
        }
        Some(("csv", sub)) => {
            let path = required(sub, "path")?.trim();
            let n = import_csv(conn, Path::new(path))?;
            println!("Imported {} transaction(s) from {}", n, path);
        }
        _ => {}
    }
    Ok(())
}

/// Accounts plus balance-less transaction history, already mapped to this
/// ledger's field names.
#[derive(Debug, Deserialize)]
pub struct LegacyExport {
    #[serde(default)]
    pub accounts: Vec<NewAccount>,
    #[serde(default)]
    pub transactions: Vec<NewTransaction>,
}

#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ImportSummary {
    pub accounts: usize,
    pub transactions: usize,
    pub skipped_fee_legs: usize,
}

/// Rebuilds balances by replaying every legacy transaction through the
/// ledger, oldest first. One bad row aborts the whole import.
pub fn import_legacy(conn: &mut Connection, path: &Path) -> Result<ImportSummary> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("Read legacy export {}", path.display()))?;
    let mut export: LegacyExport = serde_json::from_str(&raw)
        .with_context(|| format!("Parse legacy export {}", path.display()))?;
    export.transactions.sort_by_key(|t| t.created_at);

    let mut failed_row: Option<String> = None;
    let result = run_atomic(conn, |db| {
        let mut summary = ImportSummary::default();
        for acct in &export.accounts {
            if acct.balance != 0 {
                tracing::warn!(name = %acct.name, balance = acct.balance, "legacy account balance ignored; replaying history instead");
            }
            let opening = NewAccount {
                balance: 0,
                ..acct.clone()
            };
            failed_row = Some(format!("account '{}'", acct.name));
            accounts::create_in(db, &opening, 0)?;
            summary.accounts += 1;
        }
        for tx in &export.transactions {
            // Fee rows are regenerated from their transfer's fee.
            if tx.title == FEE_TITLE && tx.category.as_deref() == Some(FEE_CATEGORY) {
                summary.skipped_fee_legs += 1;
                continue;
            }
            failed_row = Some(format!("transaction '{}' at {}", tx.title, tx.created_at));
            transactions::validate(tx)?;
            transactions::insert_in(db, tx)?;
            summary.transactions += 1;
        }
        Ok(summary)
    });
    let summary = result.with_context(|| match &failed_row {
        Some(row) => format!("Import aborted at {}", row),
        None => "Import aborted".to_string(),
    })?;
    tracing::info!(
        accounts = summary.accounts,
        transactions = summary.transactions,
        "legacy import committed"
    );
    Ok(summary)
}

struct CsvRow {
    line: usize,
    account: String,
    target: Option<String>,
    tx: NewTransaction,
}

/// CSV columns: `date,title,amount,type,account,target,category,fee,description`.
/// Accounts may be given by id or name. Files written by the CSV exporter
/// carry two extra columns (`id`, `linked`) and import as-is.
pub fn import_csv(conn: &mut Connection, path: &Path) -> Result<usize> {
    let fmt = MoneyFormat::load(conn)?;
    let mut rdr = ReaderBuilder::new()
        .has_headers(true)
        .flexible(true)
        .from_path(path)
        .with_context(|| format!("Open CSV {}", path.display()))?;

    let mut rows = Vec::new();
    for (i, result) in rdr.records().enumerate() {
        let line = i + 2;
        let rec = result.with_context(|| format!("Read CSV line {}", line))?;
        let field = |n: usize| rec.get(n).map(str::trim).unwrap_or("");
        let non_empty = |n: usize| Some(field(n)).filter(|s| !s.is_empty()).map(str::to_string);
        // Fee legs from our own export; the transfer row recreates them.
        if non_empty(10).is_some() {
            continue;
        }

        let kind = field(3)
            .parse::<TransactionType>()
            .map_err(|e| anyhow!("line {}: {}", line, e))?;
        let amount = parse_amount(field(2), &fmt).with_context(|| format!("line {}", line))?;
        let fee = match non_empty(7) {
            Some(f) => parse_amount(&f, &fmt).with_context(|| format!("line {}", line))?,
            None => 0,
        };
        let created_at = parse_timestamp(field(0)).with_context(|| format!("line {}", line))?;
        let account = non_empty(4).ok_or_else(|| anyhow!("line {}: account missing", line))?;
        let title = non_empty(1).unwrap_or_else(|| kind.as_str().to_string());

        rows.push(CsvRow {
            line,
            account,
            target: non_empty(5),
            tx: NewTransaction {
                title,
                description: non_empty(8),
                amount,
                r#type: kind,
                account_id: String::new(),
                target_account_id: None,
                created_at,
                category: non_empty(6),
                fee,
                img: None,
            },
        });
    }

    let mut failed_line = None;
    let result = run_atomic(conn, |db| {
        let mut cache: HashMap<String, String> = HashMap::new();
        let mut resolve = |key: &str| -> crate::error::Result<String> {
            match cache.entry(key.to_string()) {
                Entry::Occupied(e) => Ok(e.get().clone()),
                Entry::Vacant(e) => {
                    let id = ledger::resolve_account(db, key)?.id;
                    Ok(e.insert(id).clone())
                }
            }
        };
        let mut count = 0;
        for mut row in rows {
            failed_line = Some(row.line);
            row.tx.account_id = resolve(&row.account)?;
            row.tx.target_account_id = match row.target.as_deref() {
                Some(t) => Some(resolve(t)?),
                None => None,
            };
            transactions::validate(&row.tx)?;
            transactions::insert_in(db, &row.tx)?;
            count += 1;
        }
        Ok(count)
    });
    let count = result.with_context(|| match failed_line {
        Some(line) => format!("Import aborted at CSV line {}", line),
        None => "Import aborted".to_string(),
    })?;
    tracing::info!(count, path = %path.display(), "csv import committed");
    Ok(count)
}
