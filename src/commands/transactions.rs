// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::{optional, required};
use crate::ledger;
use crate::models::{NewTransaction, Transaction, TransactionFilter, TransactionType};
use crate::utils::{
    MoneyFormat, fmt_money, fmt_timestamp, maybe_print_json, now_millis, parse_amount,
    parse_range_end, parse_timestamp, pretty_table,
};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;
use std::collections::HashMap;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn parse_type(s: &str) -> Result<TransactionType> {
    s.parse::<TransactionType>().map_err(|e| anyhow!(e))
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = MoneyFormat::load(conn)?;
    let kind = parse_type(required(sub, "type")?)?;
    let account = ledger::resolve_account(conn, required(sub, "account")?)?;
    let target = match optional(sub, "target") {
        Some(t) => Some(ledger::resolve_account(conn, t)?.id),
        None => None,
    };
    let input = NewTransaction {
        title: optional(sub, "title")
            .map(str::to_string)
            .unwrap_or_else(|| default_title(kind)),
        description: optional(sub, "description").map(str::to_string),
        amount: parse_amount(required(sub, "amount")?, &fmt)?,
        r#type: kind,
        account_id: account.id,
        target_account_id: target,
        created_at: match optional(sub, "date") {
            Some(d) => parse_timestamp(d)?,
            None => now_millis(),
        },
        category: optional(sub, "category").map(str::to_string),
        fee: match optional(sub, "fee") {
            Some(f) => parse_amount(f, &fmt)?,
            None => 0,
        },
        img: optional(sub, "img").map(str::to_string),
    };
    let tx = ledger::add_transaction(conn, &input)?;
    println!(
        "Recorded {} {} on {} [{}]",
        tx.r#type,
        fmt_money(tx.amount, &fmt),
        fmt_timestamp(tx.created_at),
        tx.id
    );
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = MoneyFormat::load(conn)?;
    let id = required(sub, "id")?;
    let current = ledger::get_transaction(conn, id)?
        .with_context(|| format!("Transaction '{}' not found", id))?;
    let mut input = NewTransaction::from(&current);

    if let Some(t) = optional(sub, "type") {
        input.r#type = parse_type(t)?;
    }
    if let Some(a) = optional(sub, "account") {
        input.account_id = ledger::resolve_account(conn, a)?.id;
    }
    if let Some(t) = optional(sub, "target") {
        input.target_account_id = Some(ledger::resolve_account(conn, t)?.id);
    }
    if sub.get_flag("no-target") || input.r#type != TransactionType::Transfer {
        input.target_account_id = None;
        input.fee = 0;
    }
    if let Some(a) = optional(sub, "amount") {
        input.amount = parse_amount(a, &fmt)?;
    }
    if let Some(f) = optional(sub, "fee") {
        input.fee = parse_amount(f, &fmt)?;
    }
    if let Some(t) = optional(sub, "title") {
        input.title = t.to_string();
    }
    if let Some(d) = optional(sub, "description") {
        input.description = Some(d.to_string());
    }
    if let Some(d) = optional(sub, "date") {
        input.created_at = parse_timestamp(d)?;
    }
    if let Some(c) = optional(sub, "category") {
        input.category = Some(c.to_string());
    }
    if let Some(i) = optional(sub, "img") {
        input.img = Some(i.to_string());
    }

    let tx = ledger::edit_transaction(conn, id, &input)?;
    println!("Updated transaction [{}]", tx.id);
    Ok(())
}

fn remove(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    ledger::delete_transaction(conn, id)?;
    println!("Removed transaction [{}]", id);
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = required(sub, "id")?;
    let tx = ledger::get_transaction(conn, id)?
        .with_context(|| format!("Transaction '{}' not found", id))?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &tx)? {
        return Ok(());
    }
    let rows = display_rows(conn, std::slice::from_ref(&tx))?;
    println!("{}", pretty_table(HEADERS, rows));
    if let Some(d) = tx.description.as_deref().filter(|d| !d.is_empty()) {
        println!("{}", d);
    }
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let data = query_rows(conn, sub)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows = display_rows(conn, &data)?;
        println!("{}", pretty_table(HEADERS, rows));
    }
    Ok(())
}

const HEADERS: &[&str] = &[
    "Id", "Date", "Type", "Title", "Account", "Target", "Amount", "Fee", "Category",
];

fn display_rows(conn: &Connection, txs: &[Transaction]) -> Result<Vec<Vec<String>>> {
    let fmt = MoneyFormat::load(conn)?;
    let names: HashMap<String, String> = ledger::list_accounts(conn)?
        .into_iter()
        .map(|a| (a.id, a.name))
        .collect();
    let name_of = |id: &str| names.get(id).cloned().unwrap_or_else(|| id.to_string());
    Ok(txs
        .iter()
        .map(|t| {
            vec![
                t.id.clone(),
                fmt_timestamp(t.created_at),
                t.r#type.to_string(),
                t.title.clone(),
                name_of(&t.account_id),
                t.target_account_id.as_deref().map(name_of).unwrap_or_default(),
                fmt_money(t.amount, &fmt),
                if t.fee > 0 { fmt_money(t.fee, &fmt) } else { String::new() },
                t.category.clone().unwrap_or_default(),
            ]
        })
        .collect())
}

/// Turns `tx list` arguments into a filter. Amounts are in major units and
/// accounts may be given by id or name.
pub fn filter_from_args(conn: &Connection, sub: &clap::ArgMatches) -> Result<TransactionFilter> {
    let fmt = MoneyFormat::load(conn)?;
    let mut q = TransactionFilter {
        search: optional(sub, "search").map(str::to_string),
        category: optional(sub, "category").map(str::to_string),
        limit: sub.get_one::<usize>("limit").copied(),
        offset: sub.get_one::<usize>("offset").copied(),
        ..Default::default()
    };
    if let Some(t) = optional(sub, "type") {
        q.kind = Some(parse_type(t)?);
    }
    if let Some(a) = optional(sub, "account") {
        q.account_id = Some(ledger::resolve_account(conn, a)?.id);
    }
    if let Some(v) = optional(sub, "min") {
        q.min_amount = Some(parse_amount(v, &fmt)?);
    }
    if let Some(v) = optional(sub, "max") {
        q.max_amount = Some(parse_amount(v, &fmt)?);
    }
    if let Some(v) = optional(sub, "from") {
        q.start = Some(parse_timestamp(v)?);
    }
    if let Some(v) = optional(sub, "to") {
        q.end = Some(parse_range_end(v)?);
    }
    if sub.get_flag("has-image") {
        q.has_image = Some(true);
    } else if sub.get_flag("no-image") {
        q.has_image = Some(false);
    }
    Ok(q)
}

pub fn query_rows(conn: &Connection, sub: &clap::ArgMatches) -> Result<Vec<Transaction>> {
    let q = filter_from_args(conn, sub)?;
    Ok(ledger::filter_transactions(conn, &q)?)
}

fn default_title(kind: TransactionType) -> String {
    match kind {
        TransactionType::Income => "Income",
        TransactionType::Expense => "Expense",
        TransactionType::Transfer => "Transfer",
    }
    .to_string()
}
