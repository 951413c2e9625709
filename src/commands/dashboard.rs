// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::Month;
use crate::config::Config;
use crate::ledger::Ledger;
use crate::models::PaymentMethod;
use crate::utils::{fmt_money, maybe_print_json, month_arg, pretty_table};
use anyhow::Result;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;
use std::collections::BTreeMap;

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MonthSummary {
    pub month: Month,
    pub income: Decimal,
    pub expenses: Decimal,
    pub balance: Decimal,
}

#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct MethodBalance {
    pub method: PaymentMethod,
    pub total: Decimal,
}

/// Expenses are the installments due in the month, not the purchases made in it.
pub fn month_summary(ledger: &dyn Ledger, month: Month) -> Result<MonthSummary> {
    let range = month.range();
    let income: Decimal = ledger.incomes(range)?.iter().map(|i| i.amount).sum();
    let expenses: Decimal = ledger
        .due_installments(range)?
        .iter()
        .map(|d| d.amount)
        .sum();
    Ok(MonthSummary {
        month,
        income,
        expenses,
        balance: income - expenses,
    })
}

/// One entry per payment method, in `PaymentMethod::ALL` order.
pub fn method_balances(ledger: &dyn Ledger, month: Month) -> Result<Vec<MethodBalance>> {
    let mut totals: BTreeMap<PaymentMethod, Decimal> =
        PaymentMethod::ALL.iter().map(|m| (*m, Decimal::ZERO)).collect();
    for due in ledger.due_installments(month.range())? {
        match due.method {
            Some(method) => *totals.entry(method).or_insert(Decimal::ZERO) += due.amount,
            None => tracing::debug!(amount = %due.amount, "installment without payment method"),
        }
    }
    Ok(PaymentMethod::ALL
        .iter()
        .map(|m| MethodBalance {
            method: *m,
            total: totals.get(m).copied().unwrap_or(Decimal::ZERO),
        })
        .collect())
}

pub fn summary(conn: &Connection, ledger: &dyn Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_arg(conn, sub)?;
    let s = month_summary(ledger, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &s)? {
        println!("Overview of {}", month.label());
        println!(
            "{}",
            pretty_table(
                &["Monthly income", "Monthly expenses", "Balance"],
                vec![vec![
                    fmt_money(&s.income),
                    fmt_money(&s.expenses),
                    fmt_money(&s.balance),
                ]],
            )
        );
    }
    Ok(())
}

pub fn balances(
    conn: &Connection,
    ledger: &dyn Ledger,
    config: &Config,
    sub: &clap::ArgMatches,
) -> Result<()> {
    let month = month_arg(conn, sub)?;
    let data = method_balances(ledger, month)?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|b| {
                let card = config.card(b.method);
                vec![
                    b.method.to_string(),
                    card.display_name(),
                    card.holder.unwrap_or_default(),
                    fmt_money(&b.total),
                ]
            })
            .collect();
        println!("Balances for {}", month.label());
        println!("{}", pretty_table(&["Method", "Card", "Holder", "Due"], rows));
    }
    Ok(())
}
