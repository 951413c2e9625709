// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use walletboard::calendar::Month;
use walletboard::commands::dashboard::{MethodBalance, method_balances, month_summary};
use walletboard::commands::expenses::{ExpenseForm, record_expense};
use walletboard::commands::income::{default_income_date, record_income};
use walletboard::db;
use walletboard::ledger::{Ledger, SqliteLedger};
use walletboard::models::PaymentMethod;

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn dec(s: &str) -> Decimal {
    s.parse().unwrap()
}

fn march() -> Month {
    "2025-03".parse().unwrap()
}

fn expense(
    method: PaymentMethod,
    amount: &str,
    due: &str,
    installments: u32,
    fixed: bool,
    recurring: bool,
) -> ExpenseForm {
    ExpenseForm {
        method,
        description: format!("{} {}", method, amount),
        amount: dec(amount),
        category: None,
        purchase_date: d(due),
        due_date: d(due),
        installments,
        fixed,
        recurring,
    }
}

fn seed(ledger: &dyn Ledger) {
    record_income(ledger, "Salário", dec("5000"), d("2025-03-05")).unwrap();
    record_income(ledger, "Freela", dec("1000"), d("2025-03-31")).unwrap();
    record_income(ledger, "Fevereiro", dec("700"), d("2025-02-28")).unwrap();
    record_income(ledger, "Abril", dec("800"), d("2025-04-01")).unwrap();

    record_expense(ledger, &expense(PaymentMethod::Nubank, "300", "2025-03-05", 3, false, false))
        .unwrap();
    record_expense(ledger, &expense(PaymentMethod::Inter, "50", "2025-02-10", 1, true, true))
        .unwrap();
    record_expense(ledger, &expense(PaymentMethod::Pix, "20", "2025-03-31", 1, false, false))
        .unwrap();
    record_expense(ledger, &expense(PaymentMethod::Pix, "999", "2025-04-01", 1, false, false))
        .unwrap();
}

#[test]
fn summary_counts_installments_due_in_the_month() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    seed(&ledger);

    let s = month_summary(&ledger, march()).unwrap();
    assert_eq!(s.income, dec("6000"));
    assert_eq!(s.expenses, dec("170"));
    assert_eq!(s.balance, dec("5830"));
}

#[test]
fn balances_cover_every_method() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    seed(&ledger);

    let balances = method_balances(&ledger, march()).unwrap();
    assert_eq!(
        balances,
        vec![
            MethodBalance { method: PaymentMethod::Nubank, total: dec("100") },
            MethodBalance { method: PaymentMethod::Inter, total: dec("50") },
            MethodBalance { method: PaymentMethod::Pix, total: dec("20") },
        ]
    );
}

#[test]
fn empty_month_has_zero_everywhere() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    seed(&ledger);

    let month: Month = "2024-12".parse().unwrap();
    let s = month_summary(&ledger, month).unwrap();
    assert_eq!(s.income, Decimal::ZERO);
    assert_eq!(s.expenses, Decimal::ZERO);
    assert!(method_balances(&ledger, month)
        .unwrap()
        .iter()
        .all(|b| b.total.is_zero()));
}

#[test]
fn recurring_fixed_expense_keeps_paying_later_months() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    seed(&ledger);

    let jan: Month = "2026-01".parse().unwrap();
    let balances = method_balances(&ledger, jan).unwrap();
    assert_eq!(balances[1].total, dec("50"));
    let feb: Month = "2026-02".parse().unwrap();
    assert!(method_balances(&ledger, feb).unwrap()[1].total.is_zero());
}

#[test]
fn month_boundaries_are_inclusive() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    seed(&ledger);

    let incomes = ledger.incomes(march().range()).unwrap();
    let dates: Vec<NaiveDate> = incomes.iter().map(|i| i.date).collect();
    assert!(dates.contains(&d("2025-03-31")));
    assert!(!dates.contains(&d("2025-02-28")));
    assert!(!dates.contains(&d("2025-04-01")));

    let pix = ledger
        .card_transactions(PaymentMethod::Pix, march().range())
        .unwrap();
    assert_eq!(pix.len(), 1);
    assert_eq!(pix[0].due_date, d("2025-03-31"));
}

#[test]
fn income_defaults_to_today_only_inside_selected_month() {
    assert_eq!(default_income_date(march(), d("2025-03-17")), d("2025-03-17"));
    assert_eq!(default_income_date(march(), d("2025-05-02")), d("2025-03-01"));
}

#[test]
fn income_rejects_blank_description_and_zero_amount() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    assert!(record_income(&ledger, " ", dec("10"), d("2025-03-01")).is_err());
    assert!(record_income(&ledger, "Bônus", Decimal::ZERO, d("2025-03-01")).is_err());
    assert!(ledger.incomes(march().range()).unwrap().is_empty());
}

#[test]
fn deleting_income_removes_it_from_the_summary() {
    let conn = setup();
    let ledger = SqliteLedger::new(&conn);
    let income = record_income(&ledger, "Reembolso", dec("250.5"), d("2025-03-12")).unwrap();
    assert_eq!(month_summary(&ledger, march()).unwrap().income, dec("250.5"));
    ledger.delete_income(income.id).unwrap();
    assert_eq!(month_summary(&ledger, march()).unwrap().income, Decimal::ZERO);
}
