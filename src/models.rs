// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Row;
use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Stored account snapshot. The balance can only be read here; it is
/// written exclusively by the ledger's balance module.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Account {
    pub id: String,
    pub name: String,
    balance: i64,
    #[serde(rename = "type")]
    pub r#type: String,
    pub is_liability: bool,
    pub hidden: bool,
    pub icon: String,
    pub icon_color: String,
    pub description: String,
}

impl Account {
    pub const COLUMNS: &'static str =
        "id, name, balance, type, is_liability, hidden, icon, icon_color, description";

    pub fn balance(&self) -> i64 {
        self.balance
    }

    pub(crate) fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            name: r.get(1)?,
            balance: r.get(2)?,
            r#type: r.get(3)?,
            is_liability: r.get(4)?,
            hidden: r.get(5)?,
            icon: r.get::<_, Option<String>>(6)?.unwrap_or_default(),
            icon_color: r.get::<_, Option<String>>(7)?.unwrap_or_default(),
            description: r.get::<_, Option<String>>(8)?.unwrap_or_default(),
        })
    }
}

pub const DEFAULT_ACCOUNT_ICON: &str = "wallet";
pub const DEFAULT_ACCOUNT_COLOR: &str = "#4caf50";

/// Input for account creation. A non-zero `balance` becomes an
/// initial-balance transaction rather than a direct write.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NewAccount {
    pub id: Option<String>,
    pub name: String,
    pub balance: i64,
    #[serde(rename = "type")]
    pub r#type: String,
    pub is_liability: bool,
    pub hidden: bool,
    pub icon: Option<String>,
    pub icon_color: Option<String>,
    pub description: Option<String>,
}

/// Partial update of an account's descriptive fields. Balances are not
/// editable.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AccountPatch {
    pub name: Option<String>,
    pub r#type: Option<String>,
    pub is_liability: Option<bool>,
    pub hidden: Option<bool>,
    pub icon: Option<String>,
    pub icon_color: Option<String>,
    pub description: Option<String>,
}

impl AccountPatch {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DeletePolicy {
    /// Refuse while any transaction references the account.
    #[default]
    Reject,
    /// Delete referencing transactions first, restoring counterpart balances.
    Cascade,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TransactionType {
    Income,
    Expense,
    Transfer,
}

impl TransactionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
        }
    }
}

impl fmt::Display for TransactionType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for TransactionType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            other => Err(format!(
                "Unknown transaction type '{}' (use income|expense|transfer)",
                other
            )),
        }
    }
}

impl ToSql for TransactionType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for TransactionType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        let s = value.as_str()?;
        s.parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Transaction {
    pub id: String,
    pub title: String,
    pub description: Option<String>,
    pub amount: i64,
    #[serde(rename = "type")]
    pub r#type: TransactionType,
    pub account_id: String,
    pub target_account_id: Option<String>,
    pub created_at: i64,
    pub category: Option<String>,
    pub fee: i64,
    pub img: Option<String>,
    pub linked_transaction_id: Option<String>,
}

impl Transaction {
    pub const COLUMNS: &'static str = "id, title, description, amount, type, account_id, \
         target_account_id, created_at, category, fee, img, linked_transaction_id";

    pub(crate) fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            title: r.get(1)?,
            description: r.get(2)?,
            amount: r.get(3)?,
            r#type: r.get(4)?,
            account_id: r.get(5)?,
            target_account_id: r.get(6)?,
            created_at: r.get(7)?,
            category: r.get(8)?,
            fee: r.get(9)?,
            img: r.get(10)?,
            linked_transaction_id: r.get(11)?,
        })
    }

    /// True for the expense row synthesized alongside a fee-bearing transfer.
    pub fn is_fee_leg(&self) -> bool {
        self.linked_transaction_id.is_some()
    }

    pub fn has_image(&self) -> bool {
        self.img.as_deref().is_some_and(|s| !s.is_empty())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewTransaction {
    pub title: String,
    #[serde(default)]
    pub description: Option<String>,
    pub amount: i64,
    #[serde(rename = "type")]
    pub r#type: TransactionType,
    pub account_id: String,
    #[serde(default)]
    pub target_account_id: Option<String>,
    pub created_at: i64,
    #[serde(default)]
    pub category: Option<String>,
    #[serde(default)]
    pub fee: i64,
    #[serde(default)]
    pub img: Option<String>,
}

impl NewTransaction {
    pub fn income(account_id: &str, amount: i64, created_at: i64) -> Self {
        Self::simple(TransactionType::Income, "Income", account_id, amount, created_at)
    }

    pub fn expense(account_id: &str, amount: i64, created_at: i64) -> Self {
        Self::simple(TransactionType::Expense, "Expense", account_id, amount, created_at)
    }

    pub fn transfer(
        account_id: &str,
        target_account_id: &str,
        amount: i64,
        fee: i64,
        created_at: i64,
    ) -> Self {
        Self {
            target_account_id: Some(target_account_id.to_string()),
            fee,
            ..Self::simple(TransactionType::Transfer, "Transfer", account_id, amount, created_at)
        }
    }

    fn simple(
        r#type: TransactionType,
        title: &str,
        account_id: &str,
        amount: i64,
        created_at: i64,
    ) -> Self {
        Self {
            title: title.to_string(),
            description: None,
            amount,
            r#type,
            account_id: account_id.to_string(),
            target_account_id: None,
            created_at,
            category: None,
            fee: 0,
            img: None,
        }
    }
}

impl From<&Transaction> for NewTransaction {
    fn from(t: &Transaction) -> Self {
        Self {
            title: t.title.clone(),
            description: t.description.clone(),
            amount: t.amount,
            r#type: t.r#type,
            account_id: t.account_id.clone(),
            target_account_id: t.target_account_id.clone(),
            created_at: t.created_at,
            category: t.category.clone(),
            fee: t.fee,
            img: t.img.clone(),
        }
    }
}

/// Conjunctive filter over stored transactions. Unset fields match everything.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TransactionFilter {
    pub search: Option<String>,
    pub kind: Option<TransactionType>,
    pub category: Option<String>,
    pub account_id: Option<String>,
    pub min_amount: Option<i64>,
    pub max_amount: Option<i64>,
    pub start: Option<i64>,
    pub end: Option<i64>,
    pub has_image: Option<bool>,
    pub limit: Option<usize>,
    pub offset: Option<usize>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CategoryType {
    Income,
    Expense,
    Transfer,
    None,
}

impl CategoryType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Income => "income",
            Self::Expense => "expense",
            Self::Transfer => "transfer",
            Self::None => "none",
        }
    }
}

impl FromStr for CategoryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "income" => Ok(Self::Income),
            "expense" => Ok(Self::Expense),
            "transfer" => Ok(Self::Transfer),
            "none" | "" => Ok(Self::None),
            other => Err(format!(
                "Unknown category type '{}' (use income|expense|transfer|none)",
                other
            )),
        }
    }
}

impl ToSql for CategoryType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(ToSqlOutput::from(self.as_str()))
    }
}

impl FromSql for CategoryType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|e: String| FromSqlError::Other(e.into()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Category {
    pub id: String,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub r#type: CategoryType,
}

impl Category {
    pub(crate) fn from_row(r: &Row<'_>) -> rusqlite::Result<Self> {
        Ok(Self {
            id: r.get(0)?,
            name: r.get(1)?,
            icon: r.get(2)?,
            color: r.get(3)?,
            r#type: r.get(4)?,
        })
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NewCategory {
    #[serde(default)]
    pub id: Option<String>,
    pub name: String,
    pub icon: String,
    pub color: String,
    #[serde(rename = "type")]
    pub r#type: CategoryType,
}
