//! If-Match handling on updates.

use std::sync::Arc;

use coffeehouse::{CoffeeStore, InMemoryCoffeeStore};
use reqwest::header::IF_MATCH;
use serde_json::{json, Value};

use super::start_server;

async fn server_with_one_coffee() -> (String, Arc<InMemoryCoffeeStore>) {
    let store = Arc::new(InMemoryCoffeeStore::new());
    store.create("Coffee 1").unwrap();
    let base = start_server(store.clone()).await;
    (base, store)
}

#[tokio::test]
async fn missing_if_match_is_rejected() {
    let (base, store) = server_with_one_coffee().await;

    let resp = reqwest::Client::new()
        .put(format!("{base}/coffee/1"))
        .json(&json!({ "name": "Unconditional" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "If-Match header is required");

    assert_eq!(store.get(1).unwrap().version, 1);
}

#[tokio::test]
async fn malformed_if_match_is_rejected() {
    let (base, store) = server_with_one_coffee().await;
    let client = reqwest::Client::new();

    for token in ["one", "1.0", "-1", "0", "*"] {
        let resp = client
            .put(format!("{base}/coffee/1"))
            .header(IF_MATCH, token)
            .json(&json!({ "name": "Bad token" }))
            .send()
            .await
            .unwrap();
        assert_eq!(resp.status(), 400, "token {}", token);
    }

    assert_eq!(store.get(1).unwrap().name, "Coffee 1");
}

#[tokio::test]
async fn precondition_is_checked_before_the_body() {
    let (base, _store) = server_with_one_coffee().await;

    let resp = reqwest::Client::new()
        .put(format!("{base}/coffee/1"))
        .json(&json!({}))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "If-Match header is required");
}

#[tokio::test]
async fn update_without_name_is_rejected() {
    let (base, store) = server_with_one_coffee().await;

    let resp = reqwest::Client::new()
        .put(format!("{base}/coffee/1"))
        .header(IF_MATCH, "1")
        .json(&json!({ "name": "" }))
        .send()
        .await
        .unwrap();
    assert_eq!(resp.status(), 400);
    let body: Value = resp.json().await.unwrap();
    assert_eq!(body["error"], "Missing name");

    assert_eq!(store.get(1).unwrap().version, 1);
}

#[tokio::test]
async fn concurrent_requests_with_same_token_have_one_winner() {
    let (base, store) = server_with_one_coffee().await;
    let client = reqwest::Client::new();

    let requests = (0..6).map(|n| {
        let client = client.clone();
        let url = format!("{base}/coffee/1");
        tokio::spawn(async move {
            client
                .put(url)
                .header(IF_MATCH, "1")
                .json(&json!({ "name": format!("writer {}", n) }))
                .send()
                .await
                .unwrap()
                .status()
                .as_u16()
        })
    });

    let mut statuses = Vec::new();
    for request in requests.collect::<Vec<_>>() {
        statuses.push(request.await.unwrap());
    }
    statuses.sort_unstable();

    assert_eq!(statuses, vec![200, 409, 409, 409, 409, 409]);
    assert_eq!(store.get(1).unwrap().version, 2);
}
