// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::Result;
use crate::models::{Transaction, TransactionFilter};
use rusqlite::Connection;
use rusqlite::types::Value;

/// Transactions matching every supplied criterion, newest `created_at`
/// first (later inserts first on ties).
pub fn filter_transactions(conn: &Connection, q: &TransactionFilter) -> Result<Vec<Transaction>> {
    let mut sql = format!("SELECT {} FROM transactions WHERE 1=1", Transaction::COLUMNS);
    let mut args: Vec<Value> = Vec::new();

    if let Some(search) = q.search.as_deref().map(str::trim).filter(|s| !s.is_empty()) {
        sql.push_str(
            " AND (title LIKE ? ESCAPE '\\' OR IFNULL(description, '') LIKE ? ESCAPE '\\')",
        );
        let pattern = format!("%{}%", escape_like(search));
        args.push(Value::Text(pattern.clone()));
        args.push(Value::Text(pattern));
    }
    if let Some(kind) = q.kind {
        sql.push_str(" AND type = ?");
        args.push(Value::Text(kind.as_str().to_string()));
    }
    if let Some(category) = &q.category {
        sql.push_str(" AND category = ?");
        args.push(Value::Text(category.clone()));
    }
    if let Some(account) = &q.account_id {
        sql.push_str(" AND (account_id = ? OR target_account_id = ?)");
        args.push(Value::Text(account.clone()));
        args.push(Value::Text(account.clone()));
    }
    if let Some(min) = q.min_amount {
        sql.push_str(" AND amount >= ?");
        args.push(Value::Integer(min));
    }
    if let Some(max) = q.max_amount {
        sql.push_str(" AND amount <= ?");
        args.push(Value::Integer(max));
    }
    if let Some(start) = q.start {
        sql.push_str(" AND created_at >= ?");
        args.push(Value::Integer(start));
    }
    if let Some(end) = q.end {
        sql.push_str(" AND created_at <= ?");
        args.push(Value::Integer(end));
    }
    match q.has_image {
        Some(true) => sql.push_str(" AND img IS NOT NULL AND img != ''"),
        Some(false) => sql.push_str(" AND (img IS NULL OR img = '')"),
        None => {}
    }

    sql.push_str(" ORDER BY created_at DESC, rowid DESC");
    if q.limit.is_some() || q.offset.is_some() {
        // SQLite needs a LIMIT before OFFSET; -1 means unbounded.
        sql.push_str(" LIMIT ? OFFSET ?");
        args.push(Value::Integer(q.limit.map_or(-1, |l| l as i64)));
        args.push(Value::Integer(q.offset.unwrap_or(0) as i64));
    }

    let mut stmt = conn.prepare(&sql)?;
    let rows = stmt.query_map(rusqlite::params_from_iter(args), Transaction::from_row)?;
    let mut out = Vec::new();
    for row in rows {
        out.push(row?);
    }
    Ok(out)
}

fn escape_like(s: &str) -> String {
    let mut out = String::with_capacity(s.len());
    for c in s.chars() {
        if matches!(c, '%' | '_' | '\\') {
            out.push('\\');
        }
        out.push(c);
    }
    out
}

#[cfg(test)]
mod tests {
    use super::escape_like;

    #[test]
    fn like_wildcards_are_escaped() {
        assert_eq!(escape_like("50%_off\\"), "50\\%\\_off\\\\");
        assert_eq!(escape_like("coffee"), "coffee");
    }
}
