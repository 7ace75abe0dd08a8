// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use treasury::db::SqliteStore;
use treasury::models::{NewTransaction, TransactionType};
use treasury::repository::{NewCategory, NewPeriod, Repository};
use treasury::{cli, commands::transactions};

fn setup() -> SqliteStore {
    let mut store = SqliteStore::open_in_memory().unwrap();
    let cat = store
        .add_category(NewCategory {
            name: "Utilities".into(),
            r#type: TransactionType::Expense,
            is_default: true,
        })
        .unwrap();
    for i in 1..=3 {
        store
            .add_transaction(NewTransaction {
                r#type: "expense".into(),
                amount: Decimal::from(10),
                date: format!("2025-01-0{}", i),
                category_id: cat.id.clone(),
                description: format!("Bill {}", i),
                ..NewTransaction::default()
            })
            .unwrap();
    }
    store
        .add_transaction(NewTransaction {
            r#type: "income".into(),
            amount: Decimal::from(500),
            date: "2025-02-01".into(),
            category_id: "none".into(),
            tags: vec!["payroll".into()],
            ..NewTransaction::default()
        })
        .unwrap();
    store
}

fn list_rows(store: &mut SqliteStore, args: &[&str]) -> Vec<transactions::TransactionRow> {
    let mut argv = vec!["treasury", "tx", "list"];
    argv.extend_from_slice(args);
    let matches = cli::build_cli().get_matches_from(argv);
    let snapshot = store.get_snapshot().unwrap();
    if let Some(("tx", tx_m)) = matches.subcommand() {
        if let Some(("list", list_m)) = tx_m.subcommand() {
            return transactions::query_rows(&snapshot, list_m).unwrap();
        }
    }
    panic!("no tx list subcommand");
}

#[test]
fn list_limit_respected() {
    let mut store = setup();
    let rows = list_rows(&mut store, &["--type", "expense", "--limit", "2"]);
    assert_eq!(rows.len(), 2);
    assert_eq!(rows[0].date, "2025-01-03");
    assert_eq!(rows[0].category, "Utilities");
    assert_eq!(rows[0].amount.parse::<Decimal>().unwrap(), Decimal::from(10));
}

#[test]
fn list_filters_by_month_tag_and_name() {
    let mut store = setup();
    assert_eq!(list_rows(&mut store, &["--month", "2025-01"]).len(), 3);

    let tagged = list_rows(&mut store, &["--tag", "payroll"]);
    assert_eq!(tagged.len(), 1);
    assert_eq!(tagged[0].r#type, "income");
    assert_eq!(tagged[0].category, "Uncategorized");
    assert_eq!(tagged[0].tags, "payroll");

    let by_name = list_rows(&mut store, &["--category", "utilities", "--type", "expense"]);
    assert_eq!(by_name.len(), 3);

    let search = list_rows(&mut store, &["--search", "bill 2"]);
    assert_eq!(search.len(), 1);
    assert_eq!(search[0].description, "Bill 2");
}

#[test]
fn list_restricted_to_period() {
    let mut store = setup();
    let p = store
        .add_period(NewPeriod {
            name: "February".into(),
            start_date: "2025-02-01".parse().unwrap(),
            end_date: "2025-02-28".parse().unwrap(),
            initial_fund: Decimal::ZERO,
        })
        .unwrap();
    let rows = list_rows(&mut store, &["--period", p.id.as_str()]);
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0].date, "2025-02-01");

    // The current period alone does not narrow the listing.
    assert_eq!(list_rows(&mut store, &[]).len(), 4);
}
