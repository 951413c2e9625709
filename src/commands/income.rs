// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::Month;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::models::{Income, NewIncome};
use crate::utils::{
    fmt_money, get_selected_month, maybe_print_json, month_arg, parse_amount, parse_date,
    pretty_table, require_text, today,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;

pub fn handle(conn: &Connection, ledger: &dyn Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(conn, ledger, sub)?,
        Some(("list", sub)) => list(conn, ledger, sub)?,
        Some(("rm", sub)) => {
            let raw = sub.get_one::<String>("id").unwrap().trim();
            let id = raw
                .parse::<i64>()
                .map_err(|_| LedgerError::invalid(format!("Invalid id '{}'", raw)))?;
            ledger.delete_income(id)?;
            println!("Removed income {}", id);
        }
        _ => {}
    }
    Ok(())
}

/// New income lands on today when today is inside the selected month,
/// otherwise on the month's first day.
pub fn default_income_date(selected: Month, today: NaiveDate) -> NaiveDate {
    if selected.range().contains(today) {
        today
    } else {
        selected.first_day()
    }
}

pub fn record_income(ledger: &dyn Ledger, description: &str, amount: Decimal, date: NaiveDate) -> Result<Income> {
    let description = require_text("Description", description)?;
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid("Amount must be greater than zero").into());
    }
    ledger.add_income(&NewIncome {
        description,
        amount,
        date,
    })
}

fn add(conn: &Connection, ledger: &dyn Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let description = sub.get_one::<String>("description").unwrap();
    let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
    let date = match sub.get_one::<String>("date") {
        Some(s) => parse_date(s)?,
        None => default_income_date(get_selected_month(conn)?, today()),
    };
    let income = record_income(ledger, description, amount, date)?;
    println!(
        "Recorded income '{}' of {} on {}",
        income.description,
        fmt_money(&income.amount),
        income.date
    );
    Ok(())
}

fn list(conn: &Connection, ledger: &dyn Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let month = month_arg(conn, sub)?;
    let data = ledger.incomes(month.range())?;
    if !maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &data)? {
        let total: Decimal = data.iter().map(|i| i.amount).sum();
        let rows: Vec<Vec<String>> = data
            .iter()
            .map(|i| {
                vec![
                    i.id.to_string(),
                    i.date.to_string(),
                    i.description.clone(),
                    fmt_money(&i.amount),
                ]
            })
            .collect();
        println!("{}", pretty_table(&["ID", "Date", "Description", "Amount"], rows));
        println!("{} · total {}", month.label(), fmt_money(&total));
    }
    Ok(())
}
