// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use chrono::NaiveDate;
use rust_decimal::Decimal;
use walletboard::listing::{
    ITEMS_PER_PAGE, ListingFilter, SortOrder, filter_and_sort, paginate, visible_total,
};
use walletboard::models::{CardTransaction, ParentRef, PaymentMethod};

fn d(s: &str) -> NaiveDate {
    NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
}

fn tx(id: i64, description: &str, amount: &str, due: &str) -> CardTransaction {
    CardTransaction {
        id,
        parent: ParentRef::Expense(id),
        description: description.into(),
        category: None,
        method: PaymentMethod::Inter,
        purchase_date: None,
        total: None,
        recurring: false,
        sequence: 1,
        amount: amount.parse().unwrap(),
        due_date: d(due),
        paid: false,
        installment_count: 1,
    }
}

fn month() -> Vec<CardTransaction> {
    vec![
        tx(1, "Uber", "23.90", "2025-03-02"),
        tx(2, "mercado Extra", "412.35", "2025-03-15"),
        tx(3, "Farmácia", "57.00", "2025-03-09"),
        tx(4, "Assinatura streaming", "39.90", "2025-03-28"),
    ]
}

fn ids(items: &[CardTransaction]) -> Vec<i64> {
    items.iter().map(|t| t.id).collect()
}

#[test]
fn sort_orders() {
    let txs = month();
    let sorted = |sort| filter_and_sort(&txs, &ListingFilter { sort, ..Default::default() });
    assert_eq!(ids(&sorted(SortOrder::DateDesc)), vec![4, 2, 3, 1]);
    assert_eq!(ids(&sorted(SortOrder::DateAsc)), vec![1, 3, 2, 4]);
    assert_eq!(ids(&sorted(SortOrder::AlphaAsc)), vec![4, 3, 2, 1]);
    assert_eq!(ids(&sorted(SortOrder::AlphaDesc)), vec![1, 2, 3, 4]);
}

#[test]
fn sort_order_parses_cli_names() {
    assert_eq!("alpha-desc".parse::<SortOrder>().unwrap(), SortOrder::AlphaDesc);
    assert!("newest".parse::<SortOrder>().is_err());
}

#[test]
fn search_matches_description_case_insensitively_or_amount() {
    let txs = month();
    let search = |term: &str| {
        ids(&filter_and_sort(
            &txs,
            &ListingFilter {
                search: Some(term.into()),
                sort: SortOrder::DateAsc,
                ..Default::default()
            },
        ))
    };
    assert_eq!(search("MERCADO"), vec![2]);
    assert_eq!(search("39.9"), vec![4]);
    assert_eq!(search("57"), vec![3]);
    assert_eq!(search("   "), vec![1, 3, 2, 4]);
    assert!(search("aluguel").is_empty());
}

#[test]
fn date_window_is_inclusive() {
    let txs = month();
    let filter = ListingFilter {
        sort: SortOrder::DateAsc,
        start: Some(d("2025-03-09")),
        end: Some(d("2025-03-15")),
        ..Default::default()
    };
    assert_eq!(ids(&filter_and_sort(&txs, &filter)), vec![3, 2]);
}

#[test]
fn pages_hold_eight_items() {
    let items: Vec<u32> = (1..=19).collect();
    let first = paginate(items.clone(), 1);
    assert_eq!(first.items.len(), ITEMS_PER_PAGE);
    assert_eq!(first.page_count, 3);
    assert_eq!(first.total_items, 19);

    let last = paginate(items.clone(), 3);
    assert_eq!(last.items, vec![17, 18, 19]);

    assert!(paginate(items.clone(), 4).items.is_empty());
    assert_eq!(paginate(items, 0).page, 1);
    assert_eq!(paginate(Vec::<u32>::new(), 1).page_count, 0);
}

#[test]
fn visible_total_sums_only_the_page() {
    let txs = month();
    let page = paginate(filter_and_sort(&txs, &ListingFilter::default()), 1);
    let total: Decimal = "533.15".parse().unwrap();
    assert_eq!(visible_total(&page.items), total);
}
