// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::Month;
use crate::error::LedgerError;
use crate::installments::{MAX_INSTALLMENTS, Progress, plan_expense, plan_fixed};
use crate::ledger::Ledger;
use crate::listing::{ListingFilter, Page, filter_and_sort, paginate, visible_total};
use crate::models::{
    CardTransaction, NewExpense, NewFixedExpense, NewInstallment, ParentRef, ParentUpdate,
    PaymentMethod,
};
use crate::utils::{
    fmt_money, maybe_print_json, month_arg, parse_amount, parse_date, pretty_table, require_text,
    today,
};
use anyhow::Result;
use chrono::{Datelike, NaiveDate};
use rusqlite::Connection;
use rust_decimal::Decimal;
use serde::Serialize;

pub fn handle(conn: &Connection, ledger: &dyn Ledger, m: &clap::ArgMatches) -> Result<()> {
    match m.subcommand() {
        Some(("add", sub)) => add(ledger, sub)?,
        Some(("list", sub)) => list(conn, ledger, sub)?,
        Some(("show", sub)) => show(ledger, sub)?,
        Some(("edit", sub)) => edit(ledger, sub)?,
        Some(("rm", sub)) => rm(ledger, sub)?,
        _ => {}
    }
    Ok(())
}

#[derive(Debug, Clone)]
pub struct ExpenseForm {
    pub method: PaymentMethod,
    pub description: String,
    pub amount: Decimal,
    pub category: Option<String>,
    pub purchase_date: NaiveDate,
    pub due_date: NaiveDate,
    pub installments: u32,
    pub fixed: bool,
    pub recurring: bool,
}

impl ExpenseForm {
    pub fn from_matches(sub: &clap::ArgMatches) -> Result<Self> {
        let method = sub.get_one::<String>("method").unwrap().parse()?;
        let description = require_text("Description", sub.get_one::<String>("description").unwrap())?;
        let amount = parse_amount(sub.get_one::<String>("amount").unwrap())?;
        let category = optional_text(sub.get_one::<String>("category"));
        let purchase_date = match sub.get_one::<String>("purchase_date") {
            Some(s) => parse_date(s)?,
            None => today(),
        };
        let due_date = match sub.get_one::<String>("due_date") {
            Some(s) => parse_date(s)?,
            None => today(),
        };
        Ok(ExpenseForm {
            method,
            description,
            amount,
            category,
            purchase_date,
            due_date,
            installments: sub.get_one::<u32>("installments").copied().unwrap_or(1),
            fixed: sub.get_flag("fixed"),
            recurring: sub.get_flag("recurring"),
        })
    }
}

fn optional_text(v: Option<&String>) -> Option<String> {
    v.map(|s| s.trim())
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
}

#[derive(Debug, Clone)]
pub struct Recorded {
    pub parent: ParentRef,
    pub installments: Vec<NewInstallment>,
}

/// Plan the installment schedule, then store it together with its parent.
pub fn record_expense(ledger: &dyn Ledger, form: &ExpenseForm) -> Result<Recorded> {
    let description = require_text("Description", &form.description)?;
    if form.amount <= Decimal::ZERO {
        return Err(LedgerError::invalid("Amount must be greater than zero").into());
    }
    if form.installments == 0 {
        return Err(LedgerError::invalid("Installment count must be at least 1").into());
    }
    if form.installments > MAX_INSTALLMENTS {
        return Err(LedgerError::invalid(format!(
            "At most {} installments are allowed",
            MAX_INSTALLMENTS
        ))
        .into());
    }
    if form.recurring && !form.fixed {
        return Err(LedgerError::invalid("--recurring only applies to fixed expenses").into());
    }
    if form.fixed && form.installments > 1 {
        return Err(LedgerError::invalid("Fixed expenses cannot be split into installments").into());
    }

    if form.fixed {
        let rows = plan_fixed(form.amount, form.recurring, form.due_date)?;
        let id = ledger.add_fixed_expense(
            &NewFixedExpense {
                description,
                monthly_amount: form.amount,
                category: form.category.clone(),
                method: form.method,
                due_day: form.due_date.day(),
                recurring: form.recurring,
            },
            &rows,
        )?;
        Ok(Recorded {
            parent: ParentRef::Fixed(id),
            installments: rows,
        })
    } else {
        let rows = plan_expense(form.amount, form.installments, form.due_date)?;
        let id = ledger.add_expense(
            &NewExpense {
                description,
                total: form.amount,
                purchase_date: form.purchase_date,
                category: form.category.clone(),
                method: form.method,
            },
            &rows,
        )?;
        Ok(Recorded {
            parent: ParentRef::Expense(id),
            installments: rows,
        })
    }
}

fn add(ledger: &dyn Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let form = ExpenseForm::from_matches(sub)?;
    let recorded = record_expense(ledger, &form)?;
    let n = recorded.installments.len();
    let first = recorded
        .installments
        .first()
        .map(|i| fmt_money(&i.amount))
        .unwrap_or_default();
    println!(
        "Recorded '{}' on {}: {} installment(s) of {} from {}",
        form.description.trim(),
        form.method,
        n,
        first,
        form.due_date
    );
    Ok(())
}

pub fn list_page(
    ledger: &dyn Ledger,
    method: PaymentMethod,
    month: Month,
    filter: &ListingFilter,
    page: usize,
) -> Result<Page<CardTransaction>> {
    let txs = ledger.card_transactions(method, month.range())?;
    Ok(paginate(filter_and_sort(&txs, filter), page))
}

fn list(conn: &Connection, ledger: &dyn Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let json_flag = sub.get_flag("json");
    let jsonl_flag = sub.get_flag("jsonl");
    let method: PaymentMethod = sub.get_one::<String>("method").unwrap().parse()?;
    let month = month_arg(conn, sub)?;
    let filter = ListingFilter {
        search: sub.get_one::<String>("search").cloned(),
        sort: sub.get_one::<String>("sort").unwrap().parse()?,
        start: sub.get_one::<String>("from").map(|s| parse_date(s)).transpose()?,
        end: sub.get_one::<String>("to").map(|s| parse_date(s)).transpose()?,
    };
    let page = *sub.get_one::<usize>("page").unwrap_or(&1);
    let data = list_page(ledger, method, month, &filter, page)?;

    if jsonl_flag {
        maybe_print_json(false, true, &data.items)?;
        return Ok(());
    }
    if !maybe_print_json(json_flag, false, &data)? {
        let rows: Vec<Vec<String>> = data
            .items
            .iter()
            .map(|tx| {
                vec![
                    tx.id.to_string(),
                    tx.due_date.to_string(),
                    tx.description.clone(),
                    tx.category.clone().unwrap_or_default(),
                    if tx.is_installment() {
                        format!("{}/{}", tx.sequence, tx.installment_count)
                    } else if tx.parent.is_fixed() {
                        "fixed".to_string()
                    } else {
                        String::new()
                    },
                    tx.purchase_date.map(|d| d.to_string()).unwrap_or_default(),
                    fmt_money(&tx.amount),
                ]
            })
            .collect();
        println!(
            "{}",
            pretty_table(
                &["ID", "Due", "Description", "Category", "Installment", "Purchased", "Amount"],
                rows,
            )
        );
        println!(
            "{} · page {} of {} · {} item(s) · visible total {}",
            month.label(),
            data.page,
            data.page_count.max(1),
            data.total_items,
            fmt_money(&visible_total(&data.items))
        );
    }
    Ok(())
}

fn find(ledger: &dyn Ledger, id: i64) -> Result<CardTransaction> {
    Ok(ledger
        .card_transaction(id)?
        .ok_or(LedgerError::InstallmentNotFound(id))?)
}

fn id_from(sub: &clap::ArgMatches) -> Result<i64> {
    let raw = sub.get_one::<String>("id").unwrap();
    raw.trim()
        .parse::<i64>()
        .map_err(|_| LedgerError::invalid(format!("Invalid id '{}'", raw.trim())).into())
}

#[derive(Debug, Serialize)]
pub struct InstallmentDetail {
    pub transaction: CardTransaction,
    pub progress: Progress,
}

pub fn installment_detail(ledger: &dyn Ledger, id: i64) -> Result<InstallmentDetail> {
    let transaction = find(ledger, id)?;
    let progress = Progress::of(&transaction)?;
    Ok(InstallmentDetail {
        transaction,
        progress,
    })
}

fn show(ledger: &dyn Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let detail = installment_detail(ledger, id_from(sub)?)?;
    if maybe_print_json(sub.get_flag("json"), sub.get_flag("jsonl"), &detail)? {
        return Ok(());
    }
    let tx = &detail.transaction;
    let p = &detail.progress;
    let rows = vec![
        vec!["Description".into(), tx.description.clone()],
        vec!["Method".into(), tx.method.to_string()],
        vec!["Total".into(), fmt_money(&p.total_value)],
        vec!["Installment".into(), fmt_money(&tx.amount)],
        vec!["Progress".into(), format!("{} of {} ({}%)", p.current, p.count, p.percent)],
        vec!["Remaining".into(), p.remaining.to_string()],
        vec!["Ends".into(), p.last_month.label()],
    ];
    println!("{}", pretty_table(&["Field", "Value"], rows));
    Ok(())
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct InstallmentEdit {
    pub description: Option<String>,
    pub amount: Option<Decimal>,
    pub category: Option<String>,
    pub purchase_date: Option<NaiveDate>,
    pub due_date: Option<NaiveDate>,
}

/// Update the parent's descriptive fields and this one installment.
pub fn edit_installment(
    ledger: &dyn Ledger,
    id: i64,
    edit: &InstallmentEdit,
) -> Result<CardTransaction> {
    let current = find(ledger, id)?;
    let description = match &edit.description {
        Some(d) => require_text("Description", d)?,
        None => current.description.clone(),
    };
    let amount = edit.amount.unwrap_or(current.amount);
    if amount <= Decimal::ZERO {
        return Err(LedgerError::invalid("Amount must be greater than zero").into());
    }
    let category = match &edit.category {
        Some(c) => optional_text(Some(c)),
        None => current.category.clone(),
    };
    let purchase_date = if current.parent.is_fixed() {
        None
    } else {
        edit.purchase_date.or(current.purchase_date)
    };
    ledger.update_transaction(
        id,
        current.parent,
        &ParentUpdate {
            description,
            category,
            purchase_date,
        },
        amount,
        edit.due_date.unwrap_or(current.due_date),
    )?;
    find(ledger, id)
}

fn edit(ledger: &dyn Ledger, sub: &clap::ArgMatches) -> Result<()> {
    let id = id_from(sub)?;
    let edit = InstallmentEdit {
        description: sub.get_one::<String>("description").cloned(),
        amount: sub
            .get_one::<String>("amount")
            .map(|s| parse_amount(s))
            .transpose()?,
        category: sub.get_one::<String>("category").cloned(),
        purchase_date: sub
            .get_one::<String>("purchase_date")
            .map(|s| parse_date(s))
            .transpose()?,
        due_date: sub
            .get_one::<String>("due_date")
            .map(|s| parse_date(s))
            .transpose()?,
    };
    let tx = edit_installment(ledger, id, &edit)?;
    println!(
        "Updated installment {}: '{}' {} due {}",
        tx.id,
        tx.description,
        fmt_money(&tx.amount),
        tx.due_date
    );
    Ok(())
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Removal {
    Installment(i64),
    Parent(ParentRef),
}

/// The last installment standing takes its parent with it; otherwise only
/// the installment goes.
pub fn remove_installment(ledger: &dyn Ledger, id: i64) -> Result<Removal> {
    let tx = find(ledger, id)?;
    if tx.installment_count <= 1 {
        ledger.delete_parent(tx.parent)?;
        Ok(Removal::Parent(tx.parent))
    } else {
        ledger.delete_installment(id)?;
        Ok(Removal::Installment(id))
    }
}

fn rm(ledger: &dyn Ledger, sub: &clap::ArgMatches) -> Result<()> {
    match remove_installment(ledger, id_from(sub)?)? {
        Removal::Installment(id) => println!("Removed installment {}", id),
        Removal::Parent(ParentRef::Expense(id)) => println!("Removed expense {}", id),
        Removal::Parent(ParentRef::Fixed(id)) => println!("Removed fixed expense {}", id),
    }
    Ok(())
}
