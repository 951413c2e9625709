// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use super::Ledger;
use crate::calendar::DateRange;
use crate::error::LedgerError;
use crate::models::{
    CardTransaction, DueInstallment, Income, NewExpense, NewFixedExpense, NewIncome,
    NewInstallment, ParentRef, ParentUpdate, PaymentMethod,
};
use anyhow::Result;
use chrono::NaiveDate;
use rusqlite::types::Type;
use rusqlite::{Connection, OptionalExtension, Row, params};
use rust_decimal::Decimal;

pub struct SqliteLedger<'a> {
    conn: &'a Connection,
}

impl<'a> SqliteLedger<'a> {
    pub fn new(conn: &'a Connection) -> Self {
        SqliteLedger { conn }
    }
}

fn decimal_at(r: &Row, idx: usize) -> rusqlite::Result<Decimal> {
    let s: String = r.get(idx)?;
    s.parse::<Decimal>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

fn method_at(r: &Row, idx: usize) -> rusqlite::Result<PaymentMethod> {
    let s: String = r.get(idx)?;
    s.parse::<PaymentMethod>()
        .map_err(|e| rusqlite::Error::FromSqlConversionFailure(idx, Type::Text, Box::new(e)))
}

const CARD_TRANSACTION_SELECT: &str = "
    SELECT i.id, i.expense_id, i.fixed_expense_id,
           COALESCE(e.description, f.description),
           COALESCE(e.category, f.category),
           COALESCE(e.payment_method, f.payment_method),
           e.purchase_date, e.total_amount, COALESCE(f.recurring, 0),
           i.sequence, i.amount, i.due_date, i.paid,
           CASE WHEN i.expense_id IS NOT NULL
                THEN (SELECT COUNT(*) FROM installments x WHERE x.expense_id = i.expense_id)
                ELSE (SELECT COUNT(*) FROM installments x WHERE x.fixed_expense_id = i.fixed_expense_id)
           END
    FROM installments i
    LEFT JOIN expenses e ON i.expense_id = e.id
    LEFT JOIN fixed_expenses f ON i.fixed_expense_id = f.id";

fn card_transaction_from_row(r: &Row) -> rusqlite::Result<CardTransaction> {
    let expense_id: Option<i64> = r.get(1)?;
    let fixed_id: Option<i64> = r.get(2)?;
    let parent = match (expense_id, fixed_id) {
        (Some(id), _) => ParentRef::Expense(id),
        (None, Some(id)) => ParentRef::Fixed(id),
        (None, None) => return Err(rusqlite::Error::InvalidColumnType(1, "expense_id".into(), Type::Null)),
    };
    let total = match r.get::<_, Option<String>>(7)? {
        Some(_) => Some(decimal_at(r, 7)?),
        None => None,
    };
    Ok(CardTransaction {
        id: r.get(0)?,
        parent,
        description: r.get(3)?,
        category: r.get(4)?,
        method: method_at(r, 5)?,
        purchase_date: r.get(6)?,
        total,
        recurring: r.get(8)?,
        sequence: r.get(9)?,
        amount: decimal_at(r, 10)?,
        due_date: r.get(11)?,
        paid: r.get(12)?,
        installment_count: r.get(13)?,
    })
}

fn insert_schedule(conn: &Connection, parent: ParentRef, schedule: &[NewInstallment]) -> Result<()> {
    let mut stmt = conn.prepare(
        "INSERT INTO installments(expense_id, fixed_expense_id, sequence, amount, due_date, paid)
         VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
    )?;
    for row in schedule {
        stmt.execute(params![
            parent.expense_id(),
            parent.fixed_expense_id(),
            row.sequence,
            row.amount.to_string(),
            row.due_date,
            row.paid
        ])?;
    }
    tracing::debug!(?parent, count = schedule.len(), "installments inserted");
    Ok(())
}

impl Ledger for SqliteLedger<'_> {
    fn add_income(&self, income: &NewIncome) -> Result<Income> {
        self.conn.execute(
            "INSERT INTO incomes(description, amount, date) VALUES (?1, ?2, ?3)",
            params![income.description, income.amount.to_string(), income.date],
        )?;
        let id = self.conn.last_insert_rowid();
        tracing::info!(id, amount = %income.amount, date = %income.date, "income recorded");
        Ok(Income {
            id,
            description: income.description.clone(),
            amount: income.amount,
            date: income.date,
        })
    }

    fn incomes(&self, range: DateRange) -> Result<Vec<Income>> {
        let mut stmt = self.conn.prepare(
            "SELECT id, description, amount, date FROM incomes
             WHERE date >= ?1 AND date <= ?2
             ORDER BY date DESC, id DESC",
        )?;
        let rows = stmt.query_map(params![range.start, range.end], |r| {
            Ok(Income {
                id: r.get(0)?,
                description: r.get(1)?,
                amount: decimal_at(r, 2)?,
                date: r.get(3)?,
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn delete_income(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM incomes WHERE id=?1", params![id])?;
        tracing::info!(id, "income deleted");
        Ok(())
    }

    fn add_expense(&self, expense: &NewExpense, schedule: &[NewInstallment]) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO expenses(description, total_amount, purchase_date, category, payment_method)
             VALUES (?1, ?2, ?3, ?4, ?5)",
            params![
                expense.description,
                expense.total.to_string(),
                expense.purchase_date,
                expense.category,
                expense.method.as_str()
            ],
        )?;
        let id = tx.last_insert_rowid();
        insert_schedule(&tx, ParentRef::Expense(id), schedule)?;
        tx.commit()?;
        tracing::info!(id, method = %expense.method, total = %expense.total, installments = schedule.len(), "expense recorded");
        Ok(id)
    }

    fn add_fixed_expense(
        &self,
        expense: &NewFixedExpense,
        schedule: &[NewInstallment],
    ) -> Result<i64> {
        let tx = self.conn.unchecked_transaction()?;
        tx.execute(
            "INSERT INTO fixed_expenses(description, monthly_amount, category, payment_method, due_day, recurring)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6)",
            params![
                expense.description,
                expense.monthly_amount.to_string(),
                expense.category,
                expense.method.as_str(),
                expense.due_day,
                expense.recurring
            ],
        )?;
        let id = tx.last_insert_rowid();
        insert_schedule(&tx, ParentRef::Fixed(id), schedule)?;
        tx.commit()?;
        tracing::info!(id, method = %expense.method, recurring = expense.recurring, "fixed expense recorded");
        Ok(id)
    }

    fn due_installments(&self, range: DateRange) -> Result<Vec<DueInstallment>> {
        let mut stmt = self.conn.prepare(
            "SELECT i.amount, COALESCE(e.payment_method, f.payment_method)
             FROM installments i
             LEFT JOIN expenses e ON i.expense_id = e.id
             LEFT JOIN fixed_expenses f ON i.fixed_expense_id = f.id
             WHERE i.due_date >= ?1 AND i.due_date <= ?2",
        )?;
        let rows = stmt.query_map(params![range.start, range.end], |r| {
            let method: Option<String> = r.get(1)?;
            Ok(DueInstallment {
                amount: decimal_at(r, 0)?,
                method: method.and_then(|m| m.parse().ok()),
            })
        })?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        Ok(out)
    }

    fn card_transactions(
        &self,
        method: PaymentMethod,
        range: DateRange,
    ) -> Result<Vec<CardTransaction>> {
        let sql = format!(
            "{} WHERE COALESCE(e.payment_method, f.payment_method) = ?1
                 AND i.due_date >= ?2 AND i.due_date <= ?3
               ORDER BY i.due_date DESC, i.id DESC",
            CARD_TRANSACTION_SELECT
        );
        let mut stmt = self.conn.prepare(&sql)?;
        let rows = stmt.query_map(
            params![method.as_str(), range.start, range.end],
            card_transaction_from_row,
        )?;
        let mut out = Vec::new();
        for row in rows {
            out.push(row?);
        }
        tracing::debug!(%method, count = out.len(), "card transactions loaded");
        Ok(out)
    }

    fn card_transaction(&self, installment_id: i64) -> Result<Option<CardTransaction>> {
        let sql = format!("{} WHERE i.id = ?1", CARD_TRANSACTION_SELECT);
        let tx = self
            .conn
            .query_row(&sql, params![installment_id], card_transaction_from_row)
            .optional()?;
        Ok(tx)
    }

    fn update_transaction(
        &self,
        installment_id: i64,
        parent: ParentRef,
        update: &ParentUpdate,
        amount: Decimal,
        due_date: NaiveDate,
    ) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        let changed = match parent {
            ParentRef::Expense(id) => tx.execute(
                "UPDATE expenses SET description=?1, category=?2,
                        purchase_date=COALESCE(?3, purchase_date)
                 WHERE id=?4",
                params![update.description, update.category, update.purchase_date, id],
            )?,
            ParentRef::Fixed(id) => tx.execute(
                "UPDATE fixed_expenses SET description=?1, category=?2 WHERE id=?3",
                params![update.description, update.category, id],
            )?,
        };
        if changed == 0 {
            return Err(LedgerError::invalid(format!("Parent expense {:?} not found", parent)).into());
        }
        let changed = tx.execute(
            "UPDATE installments SET amount=?1, due_date=?2 WHERE id=?3",
            params![amount.to_string(), due_date, installment_id],
        )?;
        if changed == 0 {
            return Err(LedgerError::InstallmentNotFound(installment_id).into());
        }
        tx.commit()?;
        tracing::info!(id = installment_id, %amount, %due_date, "installment updated");
        Ok(())
    }

    fn delete_parent(&self, parent: ParentRef) -> Result<()> {
        // foreign_keys is per-connection; cascade needs it on
        self.conn.execute_batch("PRAGMA foreign_keys = ON;")?;
        match parent {
            ParentRef::Expense(id) => {
                self.conn
                    .execute("DELETE FROM expenses WHERE id=?1", params![id])?;
            }
            ParentRef::Fixed(id) => {
                self.conn
                    .execute("DELETE FROM fixed_expenses WHERE id=?1", params![id])?;
            }
        }
        tracing::info!(?parent, "expense deleted");
        Ok(())
    }

    fn delete_installment(&self, id: i64) -> Result<()> {
        self.conn
            .execute("DELETE FROM installments WHERE id=?1", params![id])?;
        tracing::info!(id, "installment deleted");
        Ok(())
    }
}
