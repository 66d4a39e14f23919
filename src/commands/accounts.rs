// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::{optional, required};
use crate::ledger;
use crate::models::{Account, AccountPatch, DeletePolicy, NewAccount};
use crate::utils::{MoneyFormat, fmt_money, maybe_print_json, parse_amount, pretty_table};
use anyhow::Result;
use rusqlite::Connection;

pub fn handle(conn: &mut Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, sub)?,
        Some(("list", sub)) => list(conn, sub)?,
        Some(("show", sub)) => show(conn, sub)?,
        Some(("edit", sub)) => edit(conn, sub)?,
        Some(("rm", sub)) => remove(conn, sub)?,
        _ => {}
    }
    Ok(())
}

fn add(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = MoneyFormat::load(conn)?;
    let balance = match optional(sub, "balance") {
        Some(b) => parse_amount(b, &fmt)?,
        None => 0,
    };
    let input = NewAccount {
        id: optional(sub, "id").map(str::to_string),
        name: required(sub, "name")?.to_string(),
        balance,
        r#type: required(sub, "type")?.to_string(),
        is_liability: sub.get_flag("liability"),
        hidden: sub.get_flag("hidden"),
        icon: optional(sub, "icon").map(str::to_string),
        icon_color: optional(sub, "color").map(str::to_string),
        description: optional(sub, "description").map(str::to_string),
    };
    let account = ledger::create_account(conn, &input)?;
    println!(
        "Added account '{}' [{}] with balance {}",
        account.name,
        account.id,
        fmt_money(account.balance(), &fmt)
    );
    Ok(())
}

fn list(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let accounts = ledger::list_accounts_ordered(conn)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &accounts)? {
        return Ok(());
    }
    let fmt = MoneyFormat::load(conn)?;
    let rows = accounts.iter().map(|a| row(a, &fmt)).collect();
    println!(
        "{}",
        pretty_table(&["Id", "Name", "Type", "Balance", "Liability", "Hidden"], rows)
    );
    Ok(())
}

fn show(conn: &Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account = ledger::resolve_account(conn, required(sub, "account")?)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &account)? {
        return Ok(());
    }
    let fmt = MoneyFormat::load(conn)?;
    println!(
        "{}",
        pretty_table(
            &["Id", "Name", "Type", "Balance", "Liability", "Hidden"],
            vec![row(&account, &fmt)]
        )
    );
    if !account.description.is_empty() {
        println!("{}", account.description);
    }
    Ok(())
}

fn edit(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let id = ledger::resolve_account(conn, required(sub, "account")?)?.id;
    let patch = AccountPatch {
        name: optional(sub, "name").map(str::to_string),
        r#type: optional(sub, "type").map(str::to_string),
        is_liability: sub.get_one::<bool>("liability").copied(),
        hidden: sub.get_one::<bool>("hidden").copied(),
        icon: optional(sub, "icon").map(str::to_string),
        icon_color: optional(sub, "color").map(str::to_string),
        description: optional(sub, "description").map(str::to_string),
    };
    if patch.is_empty() {
        println!("Nothing to change");
        return Ok(());
    }
    let account = ledger::edit_account(conn, &id, &patch)?;
    println!("Updated account '{}'", account.name);
    Ok(())
}

fn remove(conn: &mut Connection, sub: &clap::ArgMatches) -> Result<()> {
    let account = ledger::resolve_account(conn, required(sub, "account")?)?;
    let policy = if sub.get_flag("cascade") {
        DeletePolicy::Cascade
    } else {
        DeletePolicy::Reject
    };
    let removed = ledger::delete_account(conn, &account.id, policy)?;
    if removed > 0 {
        println!(
            "Removed account '{}' and {} transaction(s)",
            account.name, removed
        );
    } else {
        println!("Removed account '{}'", account.name);
    }
    Ok(())
}

fn row(a: &Account, fmt: &MoneyFormat) -> Vec<String> {
    vec![
        a.id.clone(),
        a.name.clone(),
        a.r#type.clone(),
        fmt_money(a.balance(), fmt),
        if a.is_liability { "yes" } else { "" }.to_string(),
        if a.hidden { "yes" } else { "" }.to_string(),
    ]
}
