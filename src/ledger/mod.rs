// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Storage seam. Commands talk to a `Ledger`; whether rows live in the
//! local SQLite file or on the hosted backend is decided once, in `connect`.

pub mod remote;
pub mod sqlite;

use crate::auth::SessionStore;
use crate::calendar::DateRange;
use crate::config::{BackendKind, Config};
use crate::error::LedgerError;
use crate::models::{
    CardTransaction, DueInstallment, Income, NewExpense, NewFixedExpense, NewIncome,
    NewInstallment, ParentRef, ParentUpdate, PaymentMethod,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub use remote::RemoteLedger;
pub use sqlite::SqliteLedger;

pub trait Ledger {
    fn add_income(&self, income: &NewIncome) -> Result<Income>;
    /// Newest first.
    fn incomes(&self, range: DateRange) -> Result<Vec<Income>>;
    fn delete_income(&self, id: i64) -> Result<()>;

    /// Stores the expense together with its schedule; returns the new id.
    /// Either both land or neither does.
    fn add_expense(&self, expense: &NewExpense, schedule: &[NewInstallment]) -> Result<i64>;
    fn add_fixed_expense(
        &self,
        expense: &NewFixedExpense,
        schedule: &[NewInstallment],
    ) -> Result<i64>;

    fn due_installments(&self, range: DateRange) -> Result<Vec<DueInstallment>>;
    fn card_transactions(
        &self,
        method: PaymentMethod,
        range: DateRange,
    ) -> Result<Vec<CardTransaction>>;
    fn card_transaction(&self, installment_id: i64) -> Result<Option<CardTransaction>>;

    /// Rewrites the parent's descriptive fields and one installment's
    /// amount and due date as a single change.
    fn update_transaction(
        &self,
        installment_id: i64,
        parent: ParentRef,
        update: &ParentUpdate,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Result<()>;
    /// Removes the parent together with all of its installments.
    fn delete_parent(&self, parent: ParentRef) -> Result<()>;
    fn delete_installment(&self, id: i64) -> Result<()>;
}

pub fn connect<'a>(config: &Config, conn: &'a Connection) -> Result<Box<dyn Ledger + 'a>> {
    match config.backend.kind {
        BackendKind::Local => Ok(Box::new(SqliteLedger::new(conn))),
        BackendKind::Remote => {
            let session = SessionStore::open_default()?
                .load()?
                .ok_or(LedgerError::NotSignedIn)?;
            Ok(Box::new(RemoteLedger::new(&config.backend, &session)?))
        }
    }
}
