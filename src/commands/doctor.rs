// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::utils::pretty_table;
use anyhow::{Context, Result};
use rusqlite::Connection;
use rust_decimal::Decimal;

/// (issue, detail) pairs found in the local database.
pub fn find_issues(conn: &Connection) -> Result<Vec<Vec<String>>> {
    let mut rows = Vec::new();

    // 1) Parents whose installments are all gone
    for (table, column, label) in [
        ("expenses", "expense_id", "expense_without_installments"),
        ("fixed_expenses", "fixed_expense_id", "fixed_expense_without_installments"),
    ] {
        let sql = format!(
            "SELECT p.id, p.description FROM {table} p
             WHERE NOT EXISTS (SELECT 1 FROM installments i WHERE i.{column} = p.id)
             ORDER BY p.id"
        );
        let mut stmt = conn.prepare(&sql)?;
        let mut cur = stmt.query([])?;
        while let Some(r) = cur.next()? {
            let id: i64 = r.get(0)?;
            let desc: String = r.get(1)?;
            rows.push(vec![label.into(), format!("#{} {}", id, desc)]);
        }
    }

    // 2) Variable expenses whose installments drifted from the total
    let cent = Decimal::new(1, 2);
    let mut stmt = conn.prepare(
        "SELECT e.id, e.description, e.total_amount, i.amount
         FROM expenses e JOIN installments i ON i.expense_id = e.id
         ORDER BY e.id",
    )?;
    let mut cur = stmt.query([])?;
    let mut current: Option<(i64, String, Decimal, Decimal)> = None;
    let flush = |entry: Option<(i64, String, Decimal, Decimal)>, rows: &mut Vec<Vec<String>>| {
        if let Some((id, desc, total, sum)) = entry {
            if (total - sum).abs() > cent {
                rows.push(vec![
                    "installments_do_not_match_total".into(),
                    format!("#{} {}: total {} vs installments {}", id, desc, total, sum),
                ]);
            }
        }
    };
    while let Some(r) = cur.next()? {
        let id: i64 = r.get(0)?;
        let desc: String = r.get(1)?;
        let total_s: String = r.get(2)?;
        let amount_s: String = r.get(3)?;
        let amount = amount_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid installment amount '{}' for expense {}", amount_s, id))?;
        if let Some(entry) = current.as_mut().filter(|e| e.0 == id) {
            entry.3 += amount;
            continue;
        }
        let total = total_s
            .parse::<Decimal>()
            .with_context(|| format!("Invalid total '{}' for expense {}", total_s, id))?;
        flush(current.take(), &mut rows);
        current = Some((id, desc, total, amount));
    }
    flush(current.take(), &mut rows);

    Ok(rows)
}

pub fn handle(conn: &Connection) -> Result<()> {
    let rows = find_issues(conn)?;
    if rows.is_empty() {
        println!("✅ doctor: no issues found");
    } else {
        println!("{}", pretty_table(&["Issue", "Detail"], rows));
    }
    Ok(())
}
