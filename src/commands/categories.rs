// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::categories::{
    add_category, delete_category, edit_category, find_category_by_name, get_category,
    list_categories,
};
use crate::cli::{optional, required};
use crate::models::{Category, CategoryType, NewCategory};
use crate::utils::{maybe_print_json, pretty_table};
use anyhow::{Context, Result, anyhow};
use rusqlite::Connection;

pub fn handle(conn: &Connection, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => {
            let input = NewCategory {
                id: optional(sub, "id").map(str::to_string),
                name: required(sub, "name")?.to_string(),
                icon: required(sub, "icon")?.to_string(),
                color: required(sub, "color")?.to_string(),
                r#type: parse_kind(required(sub, "type")?)?,
            };
            let c = add_category(conn, &input)?;
            println!("Added category '{}' [{}]", c.name, c.id);
        }
        Some(("list", sub)) => {
            let kind = optional(sub, "type").map(parse_kind).transpose()?;
            let cats = list_categories(conn, kind)?;
            if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &cats)? {
                let rows = cats
                    .into_iter()
                    .map(|c| vec![c.id, c.name, c.r#type.as_str().to_string(), c.icon, c.color])
                    .collect();
                println!(
                    "{}",
                    pretty_table(&["Id", "Category", "Type", "Icon", "Color"], rows)
                );
            }
        }
        Some(("edit", sub)) => {
            let current = resolve(conn, required(sub, "category")?)?;
            let input = NewCategory {
                id: None,
                name: optional(sub, "name").unwrap_or(current.name.as_str()).to_string(),
                icon: optional(sub, "icon").unwrap_or(current.icon.as_str()).to_string(),
                color: optional(sub, "color").unwrap_or(current.color.as_str()).to_string(),
                r#type: match optional(sub, "type") {
                    Some(t) => parse_kind(t)?,
                    None => current.r#type,
                },
            };
            let c = edit_category(conn, &current.id, &input)?;
            println!("Updated category '{}'", c.name);
        }
        Some(("rm", sub)) => {
            let c = resolve(conn, required(sub, "category")?)?;
            delete_category(conn, &c.id)?;
            println!("Removed category '{}'", c.name);
        }
        _ => {}
    }
    Ok(())
}

fn parse_kind(s: &str) -> Result<CategoryType> {
    s.parse::<CategoryType>().map_err(|e| anyhow!(e))
}

fn resolve(conn: &Connection, id_or_name: &str) -> Result<Category> {
    if let Some(c) = get_category(conn, id_or_name.trim())? {
        return Ok(c);
    }
    find_category_by_name(conn, id_or_name)?
        .with_context(|| format!("Category '{}' not found", id_or_name.trim()))
}
