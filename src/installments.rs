// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

//! Installment schedules: how a purchase total is spread over monthly
//! due dates, and how far along an installment plan is.

use crate::calendar::Month;
use crate::error::LedgerError;
use crate::models::{CardTransaction, NewInstallment};
use anyhow::{Result, anyhow};
use chrono::{Months, NaiveDate};
use rust_decimal::prelude::ToPrimitive;
use rust_decimal::{Decimal, RoundingStrategy};
use serde::Serialize;

/// Rows generated for a recurring fixed expense.
pub const RECURRING_MONTHS: u32 = 12;

/// Upper bound on `--installments`.
pub const MAX_INSTALLMENTS: u32 = 120;

/// Split `total` into `count` two-decimal installments that add back up to
/// the total. Each share is `total / count` truncated to the cent; the
/// leftover cents go one each to the last shares, so no two shares differ by
/// more than one cent.
pub fn split_total(total: Decimal, count: u32) -> Result<Vec<Decimal>> {
    if count == 0 {
        return Err(LedgerError::invalid("Installment count must be at least 1").into());
    }
    if count > MAX_INSTALLMENTS {
        return Err(LedgerError::invalid(format!(
            "At most {} installments are allowed",
            MAX_INSTALLMENTS
        ))
        .into());
    }
    let total = total.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
    if total <= Decimal::ZERO {
        return Err(LedgerError::invalid("Amount must be greater than zero").into());
    }
    let cent = Decimal::new(1, 2);
    let n = Decimal::from(count);
    let cents = total / cent;
    let base = (cents / n).floor();
    let extra = (cents - base * n)
        .to_u32()
        .ok_or_else(|| anyhow!("Cannot split {} into {} installments", total, count))?;
    let share = base * cent;
    Ok((0..count)
        .map(|i| if i >= count - extra { share + cent } else { share })
        .collect())
}

/// `first_due` plus 0..count months. Each date is computed from the first
/// one, so Jan 31 yields Feb 28 and then Mar 31.
pub fn due_dates(first_due: NaiveDate, count: u32) -> Result<Vec<NaiveDate>> {
    (0..count)
        .map(|i| {
            first_due
                .checked_add_months(Months::new(i))
                .ok_or_else(|| anyhow!("Due date out of range: {} + {} months", first_due, i))
        })
        .collect()
}

pub fn plan_expense(total: Decimal, count: u32, first_due: NaiveDate) -> Result<Vec<NewInstallment>> {
    let shares = split_total(total, count)?;
    let dates = due_dates(first_due, count)?;
    Ok(shares
        .into_iter()
        .zip(dates)
        .enumerate()
        .map(|(i, (amount, due_date))| NewInstallment {
            sequence: i as u32 + 1,
            amount,
            due_date,
            paid: false,
        })
        .collect())
}

pub fn plan_fixed(monthly: Decimal, recurring: bool, first_due: NaiveDate) -> Result<Vec<NewInstallment>> {
    let count = if recurring { RECURRING_MONTHS } else { 1 };
    let dates = due_dates(first_due, count)?;
    Ok(dates
        .into_iter()
        .enumerate()
        .map(|(i, due_date)| NewInstallment {
            sequence: i as u32 + 1,
            amount: monthly,
            due_date,
            paid: false,
        })
        .collect())
}

/// Where an installment sits within its plan.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct Progress {
    pub total_value: Decimal,
    pub current: u32,
    pub count: u32,
    pub remaining: u32,
    pub percent: Decimal,
    pub first_month: Month,
    pub last_month: Month,
}

impl Progress {
    pub fn of(tx: &CardTransaction) -> Result<Self> {
        let count = tx.installment_count.max(1);
        let current = tx.sequence.clamp(1, count);
        let total_value = tx
            .total
            .filter(|t| !t.is_zero())
            .unwrap_or(tx.amount * Decimal::from(count));
        let percent = (Decimal::from(current) * Decimal::ONE_HUNDRED / Decimal::from(count))
            .round_dp(1);
        let first_due = tx
            .due_date
            .checked_sub_months(Months::new(current - 1))
            .ok_or_else(|| anyhow!("Due date out of range for installment {}", tx.id))?;
        let last_due = first_due
            .checked_add_months(Months::new(count - 1))
            .ok_or_else(|| anyhow!("Due date out of range for installment {}", tx.id))?;
        Ok(Progress {
            total_value,
            current,
            count,
            remaining: count - current,
            percent,
            first_month: Month::containing(first_due),
            last_month: Month::containing(last_due),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn d(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    #[test]
    fn even_split_has_no_remainder() {
        let shares = split_total("300".parse().unwrap(), 3).unwrap();
        assert!(shares.iter().all(|s| *s == "100".parse::<Decimal>().unwrap()));
    }

    #[test]
    fn zero_count_is_rejected() {
        assert!(split_total(Decimal::ONE, 0).is_err());
    }

    #[test]
    fn oversized_count_is_rejected() {
        assert!(split_total(Decimal::ONE, MAX_INSTALLMENTS + 1).is_err());
        assert!(split_total(Decimal::ONE, u32::MAX).is_err());
    }

    #[test]
    fn month_end_due_dates_clamp_without_drifting() {
        let dates = due_dates(d("2025-01-31"), 3).unwrap();
        assert_eq!(dates, vec![d("2025-01-31"), d("2025-02-28"), d("2025-03-31")]);
    }
}
