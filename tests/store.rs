mod common;

use common::memory_store;
use std::time::Duration;
use verimail::{
    models::verification::{
        extracted::{Verification, VerificationKind},
        record::VerificationRecord,
    },
    store::{
        EphemeralStore, VERIFICATION_PREFIX,
        records::{list_records, record_key, save_record},
    },
};

fn record(verification: &Verification, sender: &str) -> VerificationRecord {
    VerificationRecord::new(
        verification,
        sender.split('@').next().unwrap(),
        sender,
        "2026/10/18 09:30:00",
    )
}

#[tokio::test]
async fn put_then_list_strips_prefix() {
    let store = memory_store().await;
    let rec = record(&Verification::number("482913"), "a@example.test");
    let value = serde_json::to_string(&rec).unwrap();
    store.put("verification:482913", &value, 3600).await.unwrap();

    let records = list_records(&store, "verification:").await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key.as_deref(), Some("482913"));
    assert_eq!(records[0].code, "482913");
    assert_eq!(records[0].kind, VerificationKind::Number);
}

#[tokio::test]
async fn stored_json_has_no_key_field() {
    let store = memory_store().await;
    let rec = record(&Verification::link("https://x.test/verify?token=abc"), "a@example.test");
    save_record(&store, &rec, 3600).await.unwrap();

    let raw = store
        .get(&record_key("https://x.test/verify?token=abc"))
        .await
        .unwrap()
        .expect("value present");
    let v: serde_json::Value = serde_json::from_str(&raw).unwrap();
    assert!(v.get("key").is_none());
    assert_eq!(v["type"], "link");
}

#[tokio::test]
async fn expired_keys_disappear() {
    let store = memory_store().await;
    store.put("verification:111111", "{}", 1).await.unwrap();
    store.put("verification:222222", "{}", 3600).await.unwrap();

    tokio::time::sleep(Duration::from_millis(1100)).await;

    let names: Vec<String> = store
        .list(VERIFICATION_PREFIX)
        .await
        .unwrap()
        .into_iter()
        .map(|k| k.name)
        .collect();
    assert_eq!(names, vec!["verification:222222".to_string()]);
    assert!(store.get("verification:111111").await.unwrap().is_none());

    assert_eq!(store.purge_expired().await.unwrap(), 1);
}

#[tokio::test]
async fn list_only_returns_matching_prefix() {
    let store = memory_store().await;
    store.put("verification:1234", "{}", 60).await.unwrap();
    store.put("session:abcd", "{}", 60).await.unwrap();
    store.put("xverification:9999", "{}", 60).await.unwrap();

    let names: Vec<String> = store
        .list("verification:")
        .await
        .unwrap()
        .into_iter()
        .map(|k| k.name)
        .collect();
    assert_eq!(names, vec!["verification:1234".to_string()]);
}

#[tokio::test]
async fn later_write_overwrites_earlier() {
    let store = memory_store().await;
    let v = Verification::number("555666");
    save_record(&store, &record(&v, "first@example.test"), 3600)
        .await
        .unwrap();
    save_record(&store, &record(&v, "second@example.test"), 3600)
        .await
        .unwrap();

    let records = list_records(&store, VERIFICATION_PREFIX).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].sender_email, "second@example.test");
}

#[tokio::test]
async fn corrupt_record_is_skipped() {
    let store = memory_store().await;
    store.put("verification:aaaa", "not json", 3600).await.unwrap();
    save_record(
        &store,
        &record(&Verification::number("bbbb"), "b@example.test"),
        3600,
    )
    .await
    .unwrap();

    let records = list_records(&store, VERIFICATION_PREFIX).await.unwrap();
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].key.as_deref(), Some("bbbb"));
}

#[tokio::test]
async fn missing_key_reads_as_none() {
    let store = memory_store().await;
    assert!(store.get("verification:nope").await.unwrap().is_none());
}

#[tokio::test]
async fn sweeper_survives_a_zero_interval() {
    let store = memory_store().await;
    store.put("verification:gone", "{}", 1).await.unwrap();
    tokio::time::sleep(Duration::from_millis(1100)).await;

    let sweeper = store.spawn_sweeper(Duration::ZERO);
    tokio::time::sleep(Duration::from_millis(300)).await;

    assert!(!sweeper.is_finished());
    let left: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM kv")
        .fetch_one(store.pool())
        .await
        .unwrap();
    assert_eq!(left, 0);
    sweeper.abort();
}
