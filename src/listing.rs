// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use crate::error::LedgerError;
use crate::models::CardTransaction;
use chrono::NaiveDate;
use rust_decimal::Decimal;
use serde::Serialize;
use std::cmp::Ordering;
use std::str::FromStr;

pub const ITEMS_PER_PAGE: usize = 8;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum SortOrder {
    #[default]
    DateDesc,
    DateAsc,
    AlphaAsc,
    AlphaDesc,
}

impl FromStr for SortOrder {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "date-desc" => Ok(SortOrder::DateDesc),
            "date-asc" => Ok(SortOrder::DateAsc),
            "alpha-asc" => Ok(SortOrder::AlphaAsc),
            "alpha-desc" => Ok(SortOrder::AlphaDesc),
            other => Err(LedgerError::invalid(format!(
                "Unknown sort order '{}' (use date-desc|date-asc|alpha-asc|alpha-desc)",
                other
            ))),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct ListingFilter {
    pub search: Option<String>,
    pub sort: SortOrder,
    pub start: Option<NaiveDate>,
    pub end: Option<NaiveDate>,
}

impl ListingFilter {
    fn matches(&self, tx: &CardTransaction) -> bool {
        if let Some(start) = self.start {
            if tx.due_date < start {
                return false;
            }
        }
        if let Some(end) = self.end {
            if tx.due_date > end {
                return false;
            }
        }
        match self.search.as_deref().map(str::trim) {
            Some(term) if !term.is_empty() => {
                let needle = term.to_lowercase();
                tx.description.to_lowercase().contains(&needle)
                    || tx.amount.normalize().to_string().contains(term)
            }
            _ => true,
        }
    }
}

fn by_description(a: &CardTransaction, b: &CardTransaction) -> Ordering {
    a.description
        .to_lowercase()
        .cmp(&b.description.to_lowercase())
        .then_with(|| a.description.cmp(&b.description))
}

/// Filter, then stable-sort, a month's card transactions.
pub fn filter_and_sort(txs: &[CardTransaction], filter: &ListingFilter) -> Vec<CardTransaction> {
    let mut out: Vec<CardTransaction> = txs.iter().filter(|tx| filter.matches(tx)).cloned().collect();
    match filter.sort {
        SortOrder::DateDesc => out.sort_by(|a, b| b.due_date.cmp(&a.due_date)),
        SortOrder::DateAsc => out.sort_by(|a, b| a.due_date.cmp(&b.due_date)),
        SortOrder::AlphaAsc => out.sort_by(by_description),
        SortOrder::AlphaDesc => out.sort_by(|a, b| by_description(b, a)),
    }
    out
}

#[derive(Debug, Clone, Serialize)]
pub struct Page<T> {
    pub items: Vec<T>,
    pub page: usize,
    pub page_count: usize,
    pub total_items: usize,
}

/// One-based; page 0 is treated as page 1 and pages past the end are empty.
pub fn paginate<T>(items: Vec<T>, page: usize) -> Page<T> {
    let page = page.max(1);
    let total_items = items.len();
    let page_count = total_items.div_ceil(ITEMS_PER_PAGE);
    let items = items
        .into_iter()
        .skip((page - 1) * ITEMS_PER_PAGE)
        .take(ITEMS_PER_PAGE)
        .collect();
    Page {
        items,
        page,
        page_count,
        total_items,
    }
}

pub fn visible_total(items: &[CardTransaction]) -> Decimal {
    items.iter().map(|tx| tx.amount).sum()
}
