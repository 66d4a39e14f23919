// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Account and transaction bookkeeping.
//!
//! Every mutation runs as one atomic batch and keeps each account's cached
//! balance equal to the sum of the effects of the transactions referencing
//! it. Balances are written only by the private `balance` module.

pub mod accounts;
pub mod audit;
mod balance;
pub mod query;
pub mod transactions;

pub use accounts::{
    create_account, delete_account, edit_account, find_account_by_name, get_account,
    list_accounts, list_accounts_ordered, resolve_account,
};
pub use audit::{BalanceDrift, DanglingReference, dangling_references, verify_balances};
pub use query::filter_transactions;
pub use transactions::{
    add_transaction, delete_transaction, edit_transaction, get_transaction, list_transactions,
};

/// Category of the synthetic transaction that carries an opening balance.
pub const INITIAL_BALANCE_CATEGORY: &str = "initial-balance";
/// Category of a transfer's fee leg.
pub const FEE_CATEGORY: &str = "admin fee";
/// Title of a transfer's fee leg.
pub const FEE_TITLE: &str = "transfer fee";
