mod common;

use common::{API_KEY, ORIGIN, memory_store, start_api, test_config};
use verimail::{
    models::verification::{extracted::Verification, record::VerificationRecord},
    store::records::save_record,
};

fn record(code: &str) -> VerificationRecord {
    VerificationRecord::new(
        &Verification::number(code),
        "noreply",
        "noreply@example.test",
        "2026/10/18 09:30:00",
    )
}

#[tokio::test]
async fn codes_without_token_is_unauthorized() {
    let (base, _srv) = start_api(memory_store().await, test_config()).await;

    let res = reqwest::get(format!("{}/codes", base)).await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);
    assert_eq!(
        res.headers()["www-authenticate"],
        r#"Bearer realm="Access to codes""#
    );
    assert_eq!(res.text().await.unwrap(), "Unauthorized");
}

#[tokio::test]
async fn codes_with_wrong_token_is_unauthorized() {
    let (base, _srv) = start_api(memory_store().await, test_config()).await;
    let client = reqwest::Client::new();

    for auth in ["Bearer nope", "Basic dGVzdA==", API_KEY] {
        let res = client
            .get(format!("{}/codes", base))
            .header("Authorization", auth)
            .send()
            .await
            .unwrap();
        assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED, "auth {auth}");
    }
}

#[tokio::test]
async fn codes_locked_when_no_key_configured() {
    let mut config = test_config();
    config.api_key = None;
    let (base, _srv) = start_api(memory_store().await, config).await;

    let res = reqwest::Client::new()
        .get(format!("{}/codes", base))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn codes_lists_live_records() {
    let store = memory_store().await;
    save_record(&store, &record("482913"), 3600).await.unwrap();
    save_record(&store, &record("771204"), 3600).await.unwrap();
    let (base, _srv) = start_api(store, test_config()).await;

    let res = reqwest::Client::new()
        .get(format!("{}/codes", base))
        .bearer_auth(API_KEY)
        .header("Origin", ORIGIN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert_eq!(res.headers()["access-control-allow-origin"], ORIGIN);
    assert_eq!(res.headers()["x-frame-options"], "DENY");

    let arr: serde_json::Value = res.json().await.unwrap();
    let arr = arr.as_array().unwrap();
    assert_eq!(arr.len(), 2);
    let first = &arr[0];
    assert_eq!(first["key"], "482913");
    assert_eq!(first["code"], "482913");
    assert_eq!(first["type"], "number");
    assert_eq!(first["sender_email"], "noreply@example.test");
}

#[tokio::test]
async fn empty_store_lists_empty_array() {
    let (base, _srv) = start_api(memory_store().await, test_config()).await;

    let res = reqwest::Client::new()
        .get(format!("{}/codes", base))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    let arr: serde_json::Value = res.json().await.unwrap();
    assert_eq!(arr, serde_json::json!([]));
}

#[tokio::test]
async fn preflight_skips_auth() {
    let (base, _srv) = start_api(memory_store().await, test_config()).await;

    let res = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/codes", base))
        .header("Origin", ORIGIN)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);
    assert_eq!(res.headers()["access-control-allow-origin"], ORIGIN);
    assert_eq!(res.headers()["access-control-allow-methods"], "GET, OPTIONS");
    assert_eq!(res.headers()["access-control-max-age"], "86400");
    assert!(res.text().await.unwrap().is_empty());
}

#[tokio::test]
async fn unknown_origin_gets_no_allow_origin() {
    let (base, _srv) = start_api(memory_store().await, test_config()).await;

    let res = reqwest::Client::new()
        .request(reqwest::Method::OPTIONS, format!("{}/anything", base))
        .header("Origin", "https://evil.example.test")
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NO_CONTENT);
    assert!(res.headers().get("access-control-allow-origin").is_none());
    assert_eq!(res.headers()["x-content-type-options"], "nosniff");
}

#[tokio::test]
async fn other_routes_report_liveness() {
    let (base, _srv) = start_api(memory_store().await, test_config()).await;
    let client = reqwest::Client::new();

    let res = client.get(format!("{}/", base)).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert!(
        res.headers()["content-type"]
            .to_str()
            .unwrap()
            .starts_with("text/plain")
    );
    assert_eq!(res.text().await.unwrap(), "Email Worker is running");

    let res = client.post(format!("{}/codes", base)).send().await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::OK);
    assert_eq!(res.text().await.unwrap(), "Email Worker is running");
}

#[tokio::test]
async fn listing_failure_returns_json_error() {
    let store = memory_store().await;
    sqlx::query("DROP TABLE kv")
        .execute(store.pool())
        .await
        .unwrap();
    let (base, _srv) = start_api(store, test_config()).await;

    let res = reqwest::Client::new()
        .get(format!("{}/codes", base))
        .bearer_auth(API_KEY)
        .send()
        .await
        .unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::INTERNAL_SERVER_ERROR);
    let body: serde_json::Value = res.json().await.unwrap();
    assert!(body["error"].as_str().unwrap().contains("store read failed"));
}
