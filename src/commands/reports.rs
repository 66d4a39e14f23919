// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::cli::optional;
use crate::ledger;
use crate::utils::{
    MoneyFormat, fmt_money, maybe_print_json, parse_range_end, parse_timestamp, pretty_table,
};
use anyhow::Result;
use rusqlite::{Connection, params};
use serde::Serialize;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("net-worth", sub)) => {
            let nw = net_worth(conn)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &nw)? {
                let fmt = MoneyFormat::load(conn)?;
                let rows = vec![
                    vec!["Assets".to_string(), fmt_money(nw.assets, &fmt)],
                    vec!["Liabilities".to_string(), fmt_money(nw.liabilities, &fmt)],
                    vec!["Net worth".to_string(), fmt_money(nw.total, &fmt)],
                ];
                println!("{}", pretty_table(&["", "Amount"], rows));
            }
        }
        Some(("categories", sub)) => {
            let start = optional(sub, "from").map(parse_timestamp).transpose()?;
            let end = optional(sub, "to").map(parse_range_end).transpose()?;
            let totals = category_totals(conn, start, end)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &totals)? {
                let fmt = MoneyFormat::load(conn)?;
                let rows = totals
                    .into_iter()
                    .map(|t| {
                        vec![
                            t.kind,
                            t.category,
                            t.count.to_string(),
                            fmt_money(t.total, &fmt),
                        ]
                    })
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Type", "Category", "Count", "Total"], rows)
                );
            }
        }
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct NetWorth {
    pub assets: i64,
    pub liabilities: i64,
    pub total: i64,
}

/// Sum of balances over accounts that are not hidden.
pub fn net_worth(conn: &Connection) -> Result<NetWorth> {
    let mut nw = NetWorth {
        assets: 0,
        liabilities: 0,
        total: 0,
    };
    for a in ledger::list_accounts(conn)?.iter().filter(|a| !a.hidden) {
        if a.is_liability {
            nw.liabilities = nw.liabilities.saturating_add(a.balance());
        } else {
            nw.assets = nw.assets.saturating_add(a.balance());
        }
        nw.total = nw.total.saturating_add(a.balance());
    }
    Ok(nw)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct CategoryTotal {
    pub kind: String,
    pub category: String,
    pub count: i64,
    pub total: i64,
}

/// Income and expense totals per category; transfers are movements, not
/// spending, and are left out. Fee legs count as expenses.
pub fn category_totals(
    conn: &Connection,
    start: Option<i64>,
    end: Option<i64>,
) -> Result<Vec<CategoryTotal>> {
    let mut stmt = conn.prepare(
        "SELECT type, IFNULL(category, ''), COUNT(*), SUM(amount)
         FROM transactions
         WHERE type IN ('income', 'expense')
           AND (?1 IS NULL OR created_at >= ?1)
           AND (?2 IS NULL OR created_at <= ?2)
         GROUP BY type, IFNULL(category, '')
         ORDER BY type, SUM(amount) DESC",
    )?;
    let rows = stmt.query_map(params![start, end], |r| {
        Ok(CategoryTotal {
            kind: r.get(0)?,
            category: r.get(1)?,
            count: r.get(2)?,
            total: r.get(3)?,
        })
    })?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}
