// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::calendar::Month;
use crate::error::LedgerError;
use anyhow::{Context, Result};
use chrono::NaiveDate;
use comfy_table::{Cell, Table, presets::UTF8_FULL};
use rusqlite::{Connection, OptionalExtension, params};
use rust_decimal::{Decimal, RoundingStrategy};

const UA: &str = concat!("walletboard/", env!("CARGO_PKG_VERSION"));

pub fn http_client(timeout_secs: u64) -> Result<reqwest::blocking::Client> {
    let c = reqwest::blocking::Client::builder()
        .timeout(std::time::Duration::from_secs(timeout_secs))
        .user_agent(UA)
        .build()?;
    Ok(c)
}

/// Turn a non-2xx response into `LedgerError::Backend`, pulling the most
/// useful message out of the JSON body when there is one.
pub fn check_response(resp: reqwest::blocking::Response) -> Result<reqwest::blocking::Response> {
    let status = resp.status();
    if status.is_success() {
        return Ok(resp);
    }
    let body = resp.text().unwrap_or_default();
    let message = serde_json::from_str::<serde_json::Value>(&body)
        .ok()
        .and_then(|v| {
            ["message", "msg", "error_description", "error"]
                .iter()
                .find_map(|k| v.get(*k).and_then(|m| m.as_str()).map(str::to_string))
        })
        .unwrap_or(body);
    tracing::warn!(status = status.as_u16(), %message, "backend request failed");
    Err(LedgerError::Backend {
        status: status.as_u16(),
        message,
    }
    .into())
}

pub fn parse_date(s: &str) -> Result<NaiveDate> {
    let s = s.trim();
    NaiveDate::parse_from_str(s, "%Y-%m-%d")
        .with_context(|| format!("Invalid date '{}', expected YYYY-MM-DD", s))
}

pub fn parse_month(s: &str) -> Result<Month> {
    s.parse()
}

pub fn parse_decimal(s: &str) -> Result<Decimal> {
    let s = s.trim();
    s.parse::<Decimal>()
        .with_context(|| format!("Invalid decimal '{}'", s))
}

/// Amount entered by the user: a number strictly greater than zero.
pub fn parse_amount(s: &str) -> Result<Decimal> {
    let d = parse_decimal(s)?;
    if d <= Decimal::ZERO {
        return Err(LedgerError::invalid(format!("Amount must be greater than zero, got {}", d)).into());
    }
    Ok(d)
}

pub fn require_text(field: &str, value: &str) -> Result<String> {
    let v = value.trim();
    if v.is_empty() {
        return Err(LedgerError::invalid(format!("{} must not be empty", field)).into());
    }
    Ok(v.to_string())
}

/// Brazilian-real formatting: `R$ 1.234,56`, `-R$ 10,00`.
pub fn fmt_money(d: &Decimal) -> String {
    let r = d.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    let sign = if r.is_sign_negative() && !r.is_zero() { "-" } else { "" };
    let plain = format!("{:.2}", r.abs());
    let (int_part, frac) = plain.split_once('.').unwrap_or((plain.as_str(), "00"));
    let mut grouped = String::with_capacity(int_part.len() + int_part.len() / 3);
    for (i, ch) in int_part.chars().enumerate() {
        if i > 0 && (int_part.len() - i) % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(ch);
    }
    format!("{}R$ {},{}", sign, grouped, frac)
}

pub fn pretty_table(headers: &[&str], rows: Vec<Vec<String>>) -> Table {
    let mut t = Table::new();
    t.load_preset(UTF8_FULL);
    t.set_header(headers.iter().map(|h| Cell::new(*h)));
    for r in rows {
        t.add_row(r.into_iter().map(Cell::new));
    }
    t
}

pub fn maybe_print_json<T: serde::Serialize>(
    json_flag: bool,
    jsonl_flag: bool,
    v: &T,
) -> Result<bool> {
    if json_flag {
        println!("{}", serde_json::to_string_pretty(v)?);
        return Ok(true);
    }
    if jsonl_flag {
        // If v is an array, stream each element; else stream single line
        let val = serde_json::to_value(v)?;
        if let Some(arr) = val.as_array() {
            for item in arr {
                println!("{}", serde_json::to_string(item)?);
            }
        } else {
            println!("{}", serde_json::to_string(&val)?);
        }
        return Ok(true);
    }
    Ok(false)
}

pub fn today() -> NaiveDate {
    chrono::Local::now().date_naive()
}

// Selected month settings
pub fn get_selected_month(conn: &Connection) -> Result<Month> {
    let v: Option<String> = conn
        .query_row(
            "SELECT value FROM settings WHERE key='selected_month'",
            [],
            |r| r.get(0),
        )
        .optional()?;
    match v {
        Some(s) => s
            .parse()
            .with_context(|| format!("Stored selected month '{}' is corrupt", s)),
        None => Ok(Month::containing(today())),
    }
}

pub fn set_selected_month(conn: &Connection, month: Month) -> Result<()> {
    conn.execute(
        "INSERT INTO settings(key, value) VALUES('selected_month', ?1)
         ON CONFLICT(key) DO UPDATE SET value=excluded.value",
        params![month.to_string()],
    )?;
    Ok(())
}

/// `--month` when given, otherwise the stored selected month.
pub fn month_arg(conn: &Connection, sub: &clap::ArgMatches) -> Result<Month> {
    match sub.get_one::<String>("month") {
        Some(m) => parse_month(m),
        None => get_selected_month(conn),
    }
}
