// Copyright (c) 2025 Soumyadip Sarkar.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use rust_decimal::Decimal;
use serde_json::{Value, json};
use tempfile::tempdir;
use treasury::local_store::LocalStore;
use treasury::models::NewTransaction;
use treasury::normalize::normalize;
use treasury::repository::Repository;
use treasury::utils::now;

#[test]
fn missing_file_reads_as_empty() {
    let dir = tempdir().unwrap();
    let mut store = LocalStore::open(dir.path().join("nested").join("treasury.json"));
    let s = store.get_snapshot().unwrap();
    assert!(s.transactions.is_empty());
    assert!(s.periods.is_empty());
}

#[test]
fn repaired_snapshot_is_written_back() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("treasury.json");
    std::fs::write(
        &path,
        json!({
            "transactions": [
                {"id": "t1", "type": "expense", "amount": "12.5", "date": "2024-01-03",
                 "categoryId": "gone"},
                {"id": "t2", "type": "expense", "amount": -1, "date": "2024-01-03"}
            ],
            "categories": [],
            "settings": {"currentPeriodId": "x", "hasCompletedOnboarding": "yes"}
        })
        .to_string(),
    )
    .unwrap();

    let mut store = LocalStore::open(&path);
    let s = store.get_snapshot().unwrap();
    assert_eq!(s.transactions.len(), 1);
    assert_eq!(s.transactions[0].category_id, "uncategorized-expense");

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(on_disk["transactions"][0]["amount"], json!(12.5));
    assert_eq!(on_disk["categories"][0]["id"], "uncategorized-expense");
    assert_eq!(on_disk["settings"]["currentPeriodId"], Value::Null);
    assert_eq!(on_disk["settings"]["hasCompletedOnboarding"], json!(true));

    // The written form is already canonical.
    let raw = store.raw_snapshot().unwrap();
    assert!(!normalize(&raw, now()).changed);
    assert_eq!(store.get_snapshot().unwrap(), s);
}

#[test]
fn malformed_json_is_an_error_not_data_loss() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("treasury.json");
    std::fs::write(&path, "{ not json").unwrap();
    let mut store = LocalStore::open(&path);
    assert!(store.get_snapshot().is_err());
    assert_eq!(std::fs::read_to_string(&path).unwrap(), "{ not json");
}

#[test]
fn writes_persist_across_instances() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("treasury.json");
    let id = {
        let mut store = LocalStore::open(&path);
        store
            .add_transaction(NewTransaction {
                r#type: "income".into(),
                amount: "99.95".parse().unwrap(),
                date: "2024-02-29".into(),
                category_id: "none".into(),
                tags: vec!["gala".into()],
                ..NewTransaction::default()
            })
            .unwrap()
            .id
    };
    let mut reopened = LocalStore::open(&path);
    let s = reopened.get_snapshot().unwrap();
    let t = s.transaction(&id).unwrap();
    assert_eq!(t.amount, "99.95".parse::<Decimal>().unwrap());
    assert!(t.has_tag("gala"));
    assert!(!path.with_extension("json.tmp").exists());
}

#[test]
fn bad_records_and_null_sections_are_dropped_individually() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("treasury.json");
    std::fs::write(
        &path,
        json!({
            "transactions": [
                null,
                42,
                {"id": "t1", "type": "income", "amount": 10, "date": "2024-01-03",
                 "categoryId": "none"}
            ],
            "categories": [null],
            "periods": null,
            "settings": null
        })
        .to_string(),
    )
    .unwrap();

    let mut store = LocalStore::open(&path);
    let s = store.get_snapshot().unwrap();
    assert_eq!(s.transactions.len(), 1);
    assert_eq!(s.transactions[0].id, "t1");
    assert!(s.periods.is_empty());
    assert_eq!(s.settings.current_period_id, None);

    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["transactions"].as_array().unwrap().len(), 1);
    assert_eq!(on_disk["periods"], json!([]));
    assert!(on_disk["settings"].is_object());
}

#[test]
fn coerced_amount_is_rewritten_as_number() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("treasury.json");
    let mut store = LocalStore::open(&path);
    store
        .add_transaction(NewTransaction {
            r#type: "expense".into(),
            amount: "25.5".parse().unwrap(),
            date: "2024-03-01".into(),
            category_id: "none".into(),
            ..NewTransaction::default()
        })
        .unwrap();

    let mut doc: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    doc["transactions"][0]["amount"] = json!("25.5");
    std::fs::write(&path, doc.to_string()).unwrap();

    let raw = store.raw_snapshot().unwrap();
    assert!(normalize(&raw, now()).changed);

    let s = store.get_snapshot().unwrap();
    assert_eq!(s.transactions[0].amount, "25.5".parse::<Decimal>().unwrap());
    let on_disk: Value = serde_json::from_str(&std::fs::read_to_string(&path).unwrap()).unwrap();
    assert_eq!(on_disk["transactions"][0]["amount"], json!(25.5));
}

#[test]
fn amounts_are_stored_at_persisted_precision() {
    let dir = tempdir().unwrap();
    let path = dir.path().join("treasury.json");
    let mut store = LocalStore::open(&path);
    let added = store
        .add_transaction(NewTransaction {
            r#type: "income".into(),
            amount: "1234567.123456789123456789".parse().unwrap(),
            date: "2024-03-01".into(),
            category_id: "none".into(),
            ..NewTransaction::default()
        })
        .unwrap();

    let s = LocalStore::open(&path).get_snapshot().unwrap();
    assert_eq!(s.transaction(&added.id).unwrap().amount, added.amount);
}
