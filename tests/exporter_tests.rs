// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde_json::json;
use tempfile::tempdir;
use walletboard::commands::expenses::{ExpenseForm, record_expense};
use walletboard::commands::exporter;
use walletboard::ledger::SqliteLedger;
use walletboard::models::PaymentMethod;
use walletboard::{cli, db};

fn base_conn() -> Connection {
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

fn seed(conn: &Connection) {
    let ledger = SqliteLedger::new(conn);
    record_expense(
        &ledger,
        &ExpenseForm {
            method: PaymentMethod::Nubank,
            description: "Notebook".into(),
            amount: dec("3000"),
            category: Some("Trabalho".into()),
            purchase_date: d("2025-01-20"),
            due_date: d("2025-02-10"),
            installments: 3,
            fixed: false,
            recurring: false,
        },
    )
    .unwrap();
    record_expense(
        &ledger,
        &ExpenseForm {
            method: PaymentMethod::Pix,
            description: "Internet".into(),
            amount: dec("99.9"),
            category: None,
            purchase_date: d("2025-03-01"),
            due_date: d("2025-03-05"),
            installments: 1,
            fixed: true,
            recurring: false,
        },
    )
    .unwrap();
}

fn export(conn: &Connection, args: &[&str]) -> anyhow::Result<()> {
    let ledger = SqliteLedger::new(conn);
    let mut argv = vec!["walletboard", "export", "installments"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    if let Some(("export", export_m)) = matches.subcommand() {
        exporter::handle(conn, &ledger, export_m)
    } else {
        panic!("no export subcommand");
    }
}

#[test]
fn export_installments_writes_month_as_json() {
    let conn = base_conn();
    seed(&conn);

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("march.json");
    let out_str = out_path.to_string_lossy().to_string();
    export(&conn, &["--format", "json", "--out", &out_str, "--month", "2025-03"]).unwrap();

    let contents = std::fs::read_to_string(&out_path).unwrap();
    let mut parsed: serde_json::Value = serde_json::from_str(&contents).unwrap();
    let mut amounts = Vec::new();
    for item in parsed.as_array_mut().unwrap() {
        let obj = item.as_object_mut().unwrap();
        obj.remove("id");
        let amount = obj.remove("amount").unwrap();
        amounts.push(amount.as_str().unwrap().parse::<Decimal>().unwrap());
    }
    assert_eq!(amounts, vec![dec("99.9"), dec("1000")]);
    assert_eq!(
        parsed,
        json!([
            {
                "due_date": "2025-03-05",
                "method": "pix",
                "description": "Internet",
                "category": null,
                "installment": 1,
                "count": 1,
                "paid": false
            },
            {
                "due_date": "2025-03-10",
                "method": "nubank",
                "description": "Notebook",
                "category": "Trabalho",
                "installment": 2,
                "count": 3,
                "paid": false
            }
        ])
    );
}

#[test]
fn export_installments_writes_csv_header() {
    let conn = base_conn();
    seed(&conn);

    let dir = tempdir().unwrap();
    let out_path = dir.path().join("feb.csv");
    let out_str = out_path.to_string_lossy().to_string();
    export(&conn, &["--format", "CSV", "--out", &out_str, "--month", "2025-02"]).unwrap();

    let mut rdr = csv::Reader::from_path(&out_path).unwrap();
    let headers = rdr.headers().unwrap().clone();
    assert_eq!(
        headers.iter().collect::<Vec<_>>(),
        vec!["id", "due_date", "method", "description", "category", "installment", "count", "amount", "paid"]
    );
    let records: Vec<csv::StringRecord> = rdr.records().map(|r| r.unwrap()).collect();
    assert_eq!(records.len(), 1);
    assert_eq!(&records[0][1], "2025-02-10");
    assert_eq!(records[0][7].parse::<Decimal>().unwrap(), dec("1000"));
}

#[test]
fn export_installments_rejects_unknown_format() {
    let conn = base_conn();
    let dir = tempdir().unwrap();
    let out_path = dir.path().join("export.unknown");
    let out_str = out_path.to_string_lossy().to_string();

    assert!(export(&conn, &["--format", "xml", "--out", &out_str]).is_err());
    assert!(!out_path.exists());
}
