// Copyright (c) AlphaVelocity.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rusqlite::Connection;
use rust_decimal::Decimal;
use tempfile::tempdir;
use treasury::db::SqliteStore;
use treasury::models::{NewTransaction, Theme};
use treasury::normalize::normalize;
use treasury::repository::Repository;
use treasury::utils::now;

fn seeded_store() -> SqliteStore {
    let store = SqliteStore::from_connection(Connection::open_in_memory().unwrap()).unwrap();
    store
        .connection()
        .execute_batch(
            r#"
        INSERT INTO categories(id, name, type, is_default) VALUES
            ('food', ' Food ', 'expense', 0),
            ('food', 'Duplicate', 'expense', 0),
            ('odd', 'Odd', 'loan', 0);
        INSERT INTO transactions(id, type, amount, date, category_id, tags) VALUES
            ('t1', 'expense', '20.00', '2024-01-10', 'food', '["x", 3]'),
            ('t2', 'expense', 'NaN', '2024-01-10', 'food', NULL),
            ('t3', 'income', 150, '2024/01/12', 'food', 'not json'),
            ('t4', 'expense', '5', NULL, 'food', NULL);
        INSERT INTO periods(id, name, start_date, end_date, initial_fund) VALUES
            ('p1', 'Q1', '2024-01-01', '2024-03-31', '100');
        INSERT INTO settings(key, value) VALUES
            ('currentPeriodId', 'missing'),
            ('theme', 'dark');
        "#,
        )
        .unwrap();
    store
}

#[test]
fn loosely_typed_rows_are_repaired() {
    let mut store = seeded_store();
    let s = store.get_snapshot().unwrap();

    let ids: Vec<_> = s.transactions.iter().map(|t| t.id.as_str()).collect();
    assert_eq!(ids, vec!["t1", "t3"]);
    let t1 = s.transaction("t1").unwrap();
    assert_eq!(t1.amount, Decimal::from(20));
    assert_eq!(t1.tags, Some(vec!["x".to_string()]));
    let t3 = s.transaction("t3").unwrap();
    assert_eq!(t3.category_id, "uncategorized-income");
    assert_eq!(t3.tags, None);

    let cats: Vec<_> = s.categories.iter().map(|c| (c.id.as_str(), c.name.as_str())).collect();
    assert_eq!(cats, vec![("food", "Food"), ("uncategorized-income", "Uncategorized")]);

    assert_eq!(s.settings.current_period_id.as_deref(), Some("p1"));
    assert_eq!(s.settings.theme, Theme::Dark);
    assert_eq!(s.current_period().unwrap().initial_fund, Decimal::from(100));
}

#[test]
fn repair_is_persisted() {
    let mut store = seeded_store();
    let first = store.get_snapshot().unwrap();

    let rows: i64 = store
        .connection()
        .query_row("SELECT COUNT(*) FROM transactions", [], |r| r.get(0))
        .unwrap();
    assert_eq!(rows, 2);
    let current: String = store
        .connection()
        .query_row(
            "SELECT value FROM settings WHERE key='currentPeriodId'",
            [],
            |r| r.get(0),
        )
        .unwrap();
    assert_eq!(current, "p1");

    let raw = store.raw_snapshot().unwrap();
    assert!(!normalize(&raw, now()).changed);
    assert_eq!(store.get_snapshot().unwrap(), first);
}

#[test]
fn file_backed_store_reopens() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("data").join("treasury.sqlite");
    let id = {
        let mut store = SqliteStore::open(&path).unwrap();
        store
            .add_transaction(NewTransaction {
                r#type: "donation".into(),
                amount: "42.10".parse().unwrap(),
                date: "2024-04-07".into(),
                category_id: "x".into(),
                receipt: Some(" RC-9 ".into()),
                ..NewTransaction::default()
            })
            .unwrap()
            .id
    };
    let mut store = SqliteStore::open(&path).unwrap();
    let s = store.get_snapshot().unwrap();
    let t = s.transaction(&id).unwrap();
    assert_eq!(t.amount, "42.1".parse::<Decimal>().unwrap());
    assert_eq!(t.receipt.as_deref(), Some("RC-9"));
    assert_eq!(s.category(&t.category_id).unwrap().name, "Uncategorized");
}
