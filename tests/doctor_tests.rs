// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use walletboard::commands::doctor::find_issues;
use walletboard::commands::expenses::{ExpenseForm, record_expense};
use walletboard::commands::month;
use walletboard::ledger::SqliteLedger;
use walletboard::models::PaymentMethod;
use walletboard::utils::{get_selected_month, set_selected_month};
use walletboard::{cli, db};

fn setup() -> Connection {
    let mut conn = Connection::open_in_memory().unwrap();
    db::init_schema(&mut conn).unwrap();
    conn
}

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn purchase(conn: &Connection, description: &str, amount: &str, installments: u32) {
    let ledger = SqliteLedger::new(conn);
    record_expense(
        &ledger,
        &ExpenseForm {
            method: PaymentMethod::Nubank,
            description: description.into(),
            amount: amount.parse().unwrap(),
            category: None,
            purchase_date: d("2025-05-01"),
            due_date: d("2025-05-10"),
            installments,
            fixed: false,
            recurring: false,
        },
    )
    .unwrap();
}

#[test]
fn clean_database_has_no_issues() {
    let conn = setup();
    purchase(&conn, "Tênis", "499.99", 3);
    assert!(find_issues(&conn).unwrap().is_empty());
}

#[test]
fn doctor_flags_orphans_and_drift() {
    let conn = setup();
    purchase(&conn, "Tênis", "499.99", 3);
    purchase(&conn, "Cadeira", "800", 2);
    conn.execute(
        "INSERT INTO fixed_expenses(description, monthly_amount, category, payment_method, due_day, recurring)
         VALUES ('Academia', '89.90', NULL, 'pix', 5, 0)",
        [],
    )
    .unwrap();
    conn.execute(
        "UPDATE installments SET amount = '150' WHERE expense_id = 1 AND sequence = 1",
        [],
    )
    .unwrap();
    conn.execute("DELETE FROM installments WHERE expense_id = 2", [])
        .unwrap();

    let issues = find_issues(&conn).unwrap();
    let kinds: Vec<&str> = issues.iter().map(|r| r[0].as_str()).collect();
    assert_eq!(
        kinds,
        vec![
            "expense_without_installments",
            "fixed_expense_without_installments",
            "installments_do_not_match_total",
        ]
    );
    assert!(issues[0][1].contains("Cadeira"));
    assert!(issues[2][1].contains("Tênis"));
}

fn run_month(conn: &Connection, args: &[&str]) {
    let mut argv = vec!["walletboard", "month"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("month", m)) = matches.subcommand() {
        month::handle(conn, m).unwrap();
    } else {
        panic!("no month subcommand");
    }
}

#[test]
fn selected_month_persists_and_wraps_years() {
    let conn = setup();
    run_month(&conn, &["set", "2025-12"]);
    assert_eq!(get_selected_month(&conn).unwrap().to_string(), "2025-12");

    run_month(&conn, &["next"]);
    assert_eq!(get_selected_month(&conn).unwrap().to_string(), "2026-01");

    run_month(&conn, &["prev"]);
    run_month(&conn, &["prev"]);
    assert_eq!(get_selected_month(&conn).unwrap().to_string(), "2025-11");
}

#[test]
fn corrupt_selected_month_is_reported() {
    let conn = setup();
    set_selected_month(&conn, "2025-01".parse().unwrap()).unwrap();
    conn.execute(
        "UPDATE settings SET value = '2025-13' WHERE key = 'selected_month'",
        [],
    )
    .unwrap();
    assert!(get_selected_month(&conn).is_err());
}
