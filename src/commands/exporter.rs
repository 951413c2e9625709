// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::Month;
use crate::error::LedgerError;
use crate::ledger::Ledger;
use crate::models::{CardTransaction, PaymentMethod};
use crate::utils::month_arg;
use anyhow::Result;
use rusqlite::Connection;
use serde_json::json;

pub fn handle(conn: &Connection, ledger: &dyn Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("installments", sub)) => export_installments(conn, ledger, sub),
        _ => Ok(()),
    }
}

/// Every card transaction due in the month, across all payment methods,
/// oldest first.
pub fn month_transactions(ledger: &dyn Ledger, month: Month) -> Result<Vec<CardTransaction>> {
    let mut all = Vec::new();
    for method in PaymentMethod::ALL {
        all.extend(ledger.card_transactions(method, month.range())?);
    }
    all.sort_by(|a, b| a.due_date.cmp(&b.due_date).then(a.id.cmp(&b.id)));
    Ok(all)
}

fn export_installments(conn: &Connection, ledger: &dyn Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let fmt = sub.get_one::<String>("format").unwrap().trim().to_lowercase();
    let out = sub.get_one::<String>("out").unwrap().trim();
    if fmt != "csv" && fmt != "json" {
        return Err(LedgerError::invalid(format!("Unknown format: {} (use csv|json)", fmt)).into());
    }
    let month = month_arg(conn, sub)?;
    let rows = month_transactions(ledger, month)?;

    match fmt.as_str() {
        "csv" => {
            let mut wtr = csv::Writer::from_path(out)?;
            wtr.write_record([
                "id",
                "due_date",
                "method",
                "description",
                "category",
                "installment",
                "count",
                "amount",
                "paid",
            ])?;
            for tx in &rows {
                wtr.write_record([
                    tx.id.to_string(),
                    tx.due_date.to_string(),
                    tx.method.to_string(),
                    tx.description.clone(),
                    tx.category.clone().unwrap_or_default(),
                    tx.sequence.to_string(),
                    tx.installment_count.to_string(),
                    tx.amount.to_string(),
                    tx.paid.to_string(),
                ])?;
            }
            wtr.flush()?;
        }
        _ => {
            let items: Vec<_> = rows
                .iter()
                .map(|tx| {
                    json!({
                        "id": tx.id,
                        "due_date": tx.due_date,
                        "method": tx.method,
                        "description": tx.description,
                        "category": tx.category,
                        "installment": tx.sequence,
                        "count": tx.installment_count,
                        "amount": tx.amount.to_string(),
                        "paid": tx.paid,
                    })
                })
                .collect();
            std::fs::write(out, serde_json::to_string_pretty(&items)?)?;
        }
    }
    tracing::info!(count = rows.len(), %month, out, "installments exported");
    println!("Exported {} installment(s) for {} to {}", rows.len(), month, out);
    Ok(())
}
