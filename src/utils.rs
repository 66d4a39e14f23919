// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::settings;
use anyhow::{Context, Result, anyhow};
use chrono::{DateTime, NaiveDate, NaiveDateTime, TimeZone, Utc};
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::Connection;
use rust_decimal::Decimal;
use rust_decimal::prelude::ToPrimitive;
use serde::{Deserialize, Serialize};

pub const CURRENCY_KEY: &str = "currency";

/// How minor-unit amounts are shown and parsed. Passed explicitly to every
/// formatting call; the ledger itself only ever sees integers.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MoneyFormat {
    pub symbol: String,
    pub decimals: u32,
}

impl Default for MoneyFormat {
    fn default() -> Self {
        Self {
            symbol: "Rp".to_string(),
            decimals: 0,
        }
    }
}

impl MoneyFormat {
    /// Reads the `currency` setting. A bare string is taken as the symbol.
    pub fn load(conn: &Connection) -> Result<Self> {
        let fmt = match settings::get_setting(conn, CURRENCY_KEY)? {
            Some(serde_json::Value::String(symbol)) => Self {
                symbol,
                ..Self::default()
            },
            Some(v) => serde_json::from_value(v).context("Invalid 'currency' setting")?,
            None => Self::default(),
        };
        if fmt.decimals > 8 {
            return Err(anyhow!("Invalid 'currency' setting: too many decimals ({})", fmt.decimals));
        }
        Ok(fmt)
    }
}

pub fn fmt_money(amount: i64, fmt: &MoneyFormat) -> String {
    let value = Decimal::new(amount, fmt.decimals);
    format!("{} {:.*}", fmt.symbol, fmt.decimals as usize, value)
}

/// Decimal text in major units ("12.50") to minor units (1250).
pub fn parse_amount(s: &str, fmt: &MoneyFormat) -> Result<i64> {
    let s = s.trim();
    let d = s
        .parse::<Decimal>()
        .with_context(|| format!("Invalid amount '{}'", s))?;
    if d.normalize().scale() > fmt.decimals {
        return Err(anyhow!(
            "Invalid amount '{}': at most {} decimal place(s) allowed",
            s,
            fmt.decimals
        ));
    }
    let factor = Decimal::from(10i64.pow(fmt.decimals));
    d.checked_mul(factor)
        .and_then(|m| m.to_i64())
        .ok_or_else(|| anyhow!("Amount '{}' is out of range", s))
}

/// Accepts `YYYY-MM-DD`, `YYYY-MM-DD HH:MM[:SS]` (UTC), RFC 3339, or raw
/// epoch milliseconds.
pub fn parse_timestamp(s: &str) -> Result<i64> {
    let s = s.trim();
    if !s.is_empty() && s.chars().all(|c| c.is_ascii_digit()) {
        return s
            .parse::<i64>()
            .with_context(|| format!("Invalid timestamp '{}'", s));
    }
    if let Ok(d) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(midnight_utc(d));
    }
    for pattern in ["%Y-%m-%d %H:%M:%S", "%Y-%m-%d %H:%M", "%Y-%m-%dT%H:%M:%S"] {
        if let Ok(dt) = NaiveDateTime::parse_from_str(s, pattern) {
            return Ok(Utc.from_utc_datetime(&dt).timestamp_millis());
        }
    }
    DateTime::parse_from_rfc3339(s)
        .map(|dt| dt.timestamp_millis())
        .with_context(|| {
            format!(
                "Invalid date '{}', expected YYYY-MM-DD, YYYY-MM-DD HH:MM or epoch millis",
                s
            )
        })
}

/// Like [`parse_timestamp`], but a bare date covers the whole day.
pub fn parse_range_end(s: &str) -> Result<i64> {
    match NaiveDate::parse_from_str(s.trim(), "%Y-%m-%d") {
        Ok(d) => Ok(midnight_utc(d) + 86_400_000 - 1),
        Err(_) => parse_timestamp(s),
    }
}

fn midnight_utc(d: NaiveDate) -> i64 {
    Utc.from_utc_datetime(&d.and_hms_opt(0, 0, 0).unwrap_or_default())
        .timestamp_millis()
}

pub fn fmt_timestamp(ms: i64) -> String {
    match DateTime::<Utc>::from_timestamp_millis(ms) {
        Some(dt) => dt.format("%Y-%m-%d %H:%M").to_string(),
        None => ms.to_string(),
    }
}

pub fn now_millis() -> i64 {
    Utc::now().timestamp_millis()
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}
