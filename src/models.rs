// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PaymentMethod {
    Nubank,
    Inter,
    Pix,
}

impl PaymentMethod {
    pub const ALL: [PaymentMethod; 3] = [PaymentMethod::Nubank, PaymentMethod::Inter, PaymentMethod::Pix];

    pub fn as_str(&self) -> &'static str {
        match self {
            PaymentMethod::Nubank => "nubank",
            PaymentMethod::Inter => "inter",
            PaymentMethod::Pix => "pix",
        }
    }
}

impl fmt::Display for PaymentMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for PaymentMethod {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "nubank" => Ok(PaymentMethod::Nubank),
            "inter" => Ok(PaymentMethod::Inter),
            "pix" => Ok(PaymentMethod::Pix),
            other => Err(LedgerError::invalid(format!(
                "Unknown payment method '{}' (use nubank|inter|pix)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Income {
    pub id: i64,
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewIncome {
    pub description: String,
    pub amount: Decimal,
    pub date: NaiveDate,
}

#[derive(Debug, Clone)]
pub struct NewExpense {
    pub description: String,
    pub total: Decimal,
    pub purchase_date: NaiveDate,
    pub category: Option<String>,
    pub method: PaymentMethod,
}

#[derive(Debug, Clone)]
pub struct NewFixedExpense {
    pub description: String,
    pub monthly_amount: Decimal,
    pub category: Option<String>,
    pub method: PaymentMethod,
    pub due_day: u32,
    pub recurring: bool,
}

/// Which parent row an installment belongs to. Exactly one of the two.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "id", rename_all = "snake_case")]
pub enum ParentRef {
    Expense(i64),
    Fixed(i64),
}

impl ParentRef {
    pub fn expense_id(&self) -> Option<i64> {
        match self {
            ParentRef::Expense(id) => Some(*id),
            ParentRef::Fixed(_) => None,
        }
    }

    pub fn fixed_expense_id(&self) -> Option<i64> {
        match self {
            ParentRef::Fixed(id) => Some(*id),
            ParentRef::Expense(_) => None,
        }
    }

    pub fn is_fixed(&self) -> bool {
        matches!(self, ParentRef::Fixed(_))
    }
}

/// One scheduled row, before its parent exists.
#[derive(Debug, Clone, PartialEq)]
pub struct NewInstallment {
    pub sequence: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid: bool,
}

/// Amount and payment method of one installment due in a period.
#[derive(Debug, Clone, PartialEq)]
pub struct DueInstallment {
    pub amount: Decimal,
    pub method: Option<PaymentMethod>,
}

/// One installment joined with its parent expense, as listed per card.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct CardTransaction {
    pub id: i64,
    pub parent: ParentRef,
    pub description: String,
    pub category: Option<String>,
    pub method: PaymentMethod,
    pub purchase_date: Option<NaiveDate>,
    pub total: Option<Decimal>,
    pub recurring: bool,
    pub sequence: u32,
    pub amount: Decimal,
    pub due_date: NaiveDate,
    pub paid: bool,
    pub installment_count: u32,
}

impl CardTransaction {
    pub fn is_installment(&self) -> bool {
        self.installment_count > 1
    }
}

/// Fields of a parent expense that can be edited after creation.
#[derive(Debug, Clone)]
pub struct ParentUpdate {
    pub description: String,
    pub category: Option<String>,
    /// Ignored for fixed expenses.
    pub purchase_date: Option<NaiveDate>,
}
