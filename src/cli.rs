// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use anyhow::{Result, anyhow};
use clap::{Arg, ArgAction, ArgMatches, Command, crate_version};

pub fn build_cli() -> Command {
    Command::new("pocketbook")
        .version(crate_version!())
        .about("Pocketbook: accounts, transactions and balances that always add up")
        .arg(
            Arg::new("db")
                .long("db")
                .value_name("PATH")
                .env("POCKETBOOK_DB")
                .global(true)
                .help("Database file (defaults to the platform data dir)"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .action(ArgAction::Count)
                .global(true)
                .help("Log more (-v info, -vv debug); RUST_LOG overrides"),
        )
        .subcommand(Command::new("init").about("Create the database and seed categories"))
        .subcommand(account_cmd())
        .subcommand(category_cmd())
        .subcommand(tx_cmd())
        .subcommand(settings_cmd())
        .subcommand(backup_cmd())
        .subcommand(import_cmd())
        .subcommand(export_cmd())
        .subcommand(report_cmd())
        .subcommand(Command::new("doctor").about("Check balances against stored transactions"))
}

/// Value of an argument clap has already marked as required.
pub fn required<'a>(m: &'a ArgMatches, id: &str) -> Result<&'a str> {
    m.get_one::<String>(id)
        .map(|s| s.as_str())
        .ok_or_else(|| anyhow!("missing --{}", id))
}

pub fn optional<'a>(m: &'a ArgMatches, id: &str) -> Option<&'a str> {
    m.get_one::<String>(id).map(|s| s.as_str())
}

fn json_flags(cmd: Command) -> Command {
    cmd.arg(
        Arg::new("json")
            .long("json")
            .action(ArgAction::SetTrue)
            .help("Print as pretty JSON"),
    )
    .arg(
        Arg::new("jsonl")
            .long("jsonl")
            .action(ArgAction::SetTrue)
            .conflicts_with("json")
            .help("Print one JSON object per line"),
    )
}

fn bool_arg(id: &'static str) -> Arg {
    Arg::new(id)
        .long(id)
        .value_parser(clap::value_parser!(bool))
        .value_name("true|false")
}

fn account_cmd() -> Command {
    Command::new("account")
        .about("Manage accounts")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .about("Create an account; a starting balance is booked as a transaction")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("type").long("type").default_value("cash"))
                .arg(
                    Arg::new("balance")
                        .long("balance")
                        .allow_hyphen_values(true)
                        .help("Starting balance in major units"),
                )
                .arg(Arg::new("id").long("id"))
                .arg(Arg::new("liability").long("liability").action(ArgAction::SetTrue))
                .arg(Arg::new("hidden").long("hidden").action(ArgAction::SetTrue))
                .arg(Arg::new("icon").long("icon"))
                .arg(Arg::new("color").long("color"))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(json_flags(Command::new("list").about("List accounts")))
        .subcommand(
            json_flags(Command::new("show").about("Show one account"))
                .arg(Arg::new("account").long("account").required(true)),
        )
        .subcommand(
            Command::new("edit")
                .about("Edit descriptive fields (balances change only through transactions)")
                .arg(Arg::new("account").long("account").required(true))
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("type").long("type"))
                .arg(bool_arg("liability"))
                .arg(bool_arg("hidden"))
                .arg(Arg::new("icon").long("icon"))
                .arg(Arg::new("color").long("color"))
                .arg(Arg::new("description").long("description")),
        )
        .subcommand(
            Command::new("rm")
                .about("Delete an account")
                .arg(Arg::new("account").long("account").required(true))
                .arg(
                    Arg::new("cascade")
                        .long("cascade")
                        .action(ArgAction::SetTrue)
                        .help("Also delete every transaction that references it"),
                ),
        )
}

fn category_cmd() -> Command {
    Command::new("category")
        .about("Manage categories")
        .subcommand_required(true)
        .subcommand(
            Command::new("add")
                .arg(Arg::new("name").long("name").required(true))
                .arg(Arg::new("type").long("type").default_value("expense"))
                .arg(Arg::new("icon").long("icon").default_value("tag"))
                .arg(Arg::new("color").long("color").default_value("#9e9e9e"))
                .arg(Arg::new("id").long("id")),
        )
        .subcommand(json_flags(Command::new("list")).arg(Arg::new("type").long("type")))
        .subcommand(
            Command::new("edit")
                .arg(Arg::new("category").long("category").required(true))
                .arg(Arg::new("name").long("name"))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("icon").long("icon"))
                .arg(Arg::new("color").long("color")),
        )
        .subcommand(Command::new("rm").arg(Arg::new("category").long("category").required(true)))
}

fn tx_fields(cmd: Command, required: bool) -> Command {
    cmd.arg(Arg::new("type").long("type").required(required))
        .arg(Arg::new("account").long("account").required(required))
        .arg(Arg::new("target").long("target").help("Target account for transfers"))
        .arg(Arg::new("amount").long("amount").required(required))
        .arg(Arg::new("fee").long("fee").help("Transfer fee in major units"))
        .arg(Arg::new("title").long("title"))
        .arg(Arg::new("description").long("description"))
        .arg(Arg::new("date").long("date").help("YYYY-MM-DD[ HH:MM], defaults to now"))
        .arg(Arg::new("category").long("category"))
        .arg(Arg::new("img").long("img"))
}

fn tx_cmd() -> Command {
    Command::new("tx")
        .about("Record and browse transactions")
        .subcommand_required(true)
        .subcommand(tx_fields(Command::new("add").about("Record a transaction"), true))
        .subcommand(
            tx_fields(
                Command::new("edit").about("Edit a transaction; unset fields keep their value"),
                false,
            )
            .arg(Arg::new("id").long("id").required(true))
            .arg(
                Arg::new("no-target")
                    .long("no-target")
                    .action(ArgAction::SetTrue)
                    .conflicts_with("target"),
            ),
        )
        .subcommand(Command::new("rm").arg(Arg::new("id").long("id").required(true)))
        .subcommand(json_flags(Command::new("show")).arg(Arg::new("id").long("id").required(true)))
        .subcommand(
            json_flags(Command::new("list").about("Filter transactions, newest first"))
                .arg(Arg::new("search").long("search"))
                .arg(Arg::new("type").long("type"))
                .arg(Arg::new("category").long("category"))
                .arg(Arg::new("account").long("account"))
                .arg(Arg::new("min").long("min"))
                .arg(Arg::new("max").long("max"))
                .arg(Arg::new("from").long("from"))
                .arg(Arg::new("to").long("to"))
                .arg(
                    Arg::new("has-image")
                        .long("has-image")
                        .action(ArgAction::SetTrue),
                )
                .arg(
                    Arg::new("no-image")
                        .long("no-image")
                        .action(ArgAction::SetTrue)
                        .conflicts_with("has-image"),
                )
                .arg(
                    Arg::new("limit")
                        .long("limit")
                        .value_parser(clap::value_parser!(usize)),
                )
                .arg(
                    Arg::new("offset")
                        .long("offset")
                        .value_parser(clap::value_parser!(usize)),
                ),
        )
}

fn settings_cmd() -> Command {
    Command::new("settings")
        .about("Key/value preferences")
        .subcommand_required(true)
        .subcommand(Command::new("get").arg(Arg::new("key").long("key").required(true)))
        .subcommand(
            Command::new("set")
                .arg(Arg::new("key").long("key").required(true))
                .arg(
                    Arg::new("value")
                        .long("value")
                        .required(true)
                        .allow_hyphen_values(true)
                        .help("JSON, or a plain string"),
                ),
        )
        .subcommand(Command::new("rm").arg(Arg::new("key").long("key").required(true)))
        .subcommand(Command::new("list"))
}

fn backup_cmd() -> Command {
    Command::new("backup")
        .about("Whole-database backup and restore (.smbak)")
        .subcommand_required(true)
        .subcommand(
            Command::new("create")
                .arg(Arg::new("out").long("out").help("File or directory to write to")),
        )
        .subcommand(Command::new("restore").arg(Arg::new("path").long("path").required(true)))
}

fn import_cmd() -> Command {
    Command::new("import")
        .about("Replay external records through the ledger")
        .subcommand_required(true)
        .subcommand(
            Command::new("legacy")
                .about("JSON with accounts and balance-less transactions")
                .arg(Arg::new("path").long("path").required(true)),
        )
        .subcommand(
            Command::new("csv")
                .about("CSV: date,title,amount,type,account,target,category,fee,description")
                .arg(Arg::new("path").long("path").required(true)),
        )
}

fn export_cmd() -> Command {
    Command::new("export").subcommand_required(true).subcommand(
        Command::new("transactions")
            .arg(
                Arg::new("format")
                    .long("format")
                    .value_parser(["csv", "json"])
                    .default_value("csv"),
            )
            .arg(Arg::new("out").long("out").required(true)),
    )
}

fn report_cmd() -> Command {
    Command::new("report")
        .subcommand_required(true)
        .subcommand(json_flags(
            Command::new("net-worth").about("Totals over visible accounts"),
        ))
        .subcommand(
            json_flags(Command::new("categories").about("Income and expense per category"))
                .arg(Arg::new("from").long("from"))
                .arg(Arg::new("to").long("to")),
        )
}
