use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{Request, StatusCode},
    Router,
};
use chrono::Utc;
use coldchain_api::{app, demo, AppState};
use coldchain_order::{ContractRegistry, InMemoryContractRegistry, InMemoryOrderRegistry, Order, OrderRegistry};
use coldchain_shared::models::events::ShipmentNotification;
use futures_util::StreamExt;
use serde_json::{json, Value};
use std::time::Duration;
use tower::ServiceExt;

async fn seeded_state() -> AppState {
    let orders = Arc::new(InMemoryOrderRegistry::new());
    let contracts = Arc::new(InMemoryContractRegistry::new());
    demo::seed_demo(orders.as_ref(), contracts.as_ref(), Utc::now())
        .await
        .unwrap();
    AppState::new(orders, contracts, 16)
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let request = Request::builder()
        .method(method)
        .uri(uri)
        .header("content-type", "application/json")
        .body(match body {
            Some(v) => Body::from(v.to_string()),
            None => Body::empty(),
        })
        .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

async fn post_reading(app: &Router, celsius: f64) {
    let (status, _) = send(
        app,
        "POST",
        "/v1/orders/ORDER_001/readings",
        Some(json!({ "celsius": celsius })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
}

#[tokio::test]
async fn test_full_chain_with_clean_readings() {
    let app = app(seeded_state().await);

    for celsius in [5.0, 8.0, 3.0] {
        post_reading(&app, celsius).await;
    }

    for (stage, expected) in [
        ("logistics", "ACCEPTED_BY_LOGISTICS_COMPANY"),
        ("retailer", "ACCEPTED_BY_RETAILER"),
        ("store", "ACCEPTED_BY_STORE"),
    ] {
        let (status, body) = send(
            &app,
            "POST",
            &format!("/v1/orders/ORDER_001/handoffs/{}", stage),
            Some(json!({})),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["order"]["status"], expected);
        assert_eq!(body["decision"]["verdict"]["compliant"], true);
    }

    let (status, body) = send(&app, "POST", "/v1/orders/ORDER_001/scan", Some(json!({}))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "ACCEPTED_BY_CUSTOMER");
    assert_eq!(body["order"]["edibility_status"], "YES");
    assert_eq!(body["order"]["payout_cents"], 10_000);
}

#[tokio::test]
async fn test_cold_excursion_spoils_order_for_good() {
    let app = app(seeded_state().await);

    for celsius in [5.0, 1.0, 8.0] {
        post_reading(&app, celsius).await;
    }

    let (_, body) = send(
        &app,
        "POST",
        "/v1/orders/ORDER_001/handoffs/logistics",
        Some(json!({})),
    )
    .await;
    assert_eq!(body["order"]["status"], "REJECTED_BY_LOGISTICS_COMPANY");
    assert_eq!(body["order"]["edibility_status"], "NO");
    assert_eq!(body["decision"]["verdict"]["lowest"]["celsius"], 1.0);

    let (_, body) = send(&app, "POST", "/v1/orders/ORDER_001/scan", Some(json!({}))).await;
    assert_eq!(body["order"]["status"], "REJECTED_BY_CUSTOMER");
    assert_eq!(body["order"]["edibility_status"], "NO");

    let (status, body) = send(&app, "GET", "/v1/orders/ORDER_001", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["readings"].as_array().unwrap().len(), 3);
    assert_eq!(body["readings"][1]["celsius"], 1.0); // insertion order kept
}

#[tokio::test]
async fn test_handoff_without_readings_is_accepted() {
    let app = app(seeded_state().await);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/orders/ORDER_001/handoffs/retailer",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "ACCEPTED_BY_RETAILER");
    assert!(body["decision"]["verdict"].is_null());
}

#[tokio::test]
async fn test_scan_without_readings_is_unprocessable() {
    let app = app(seeded_state().await);

    let (status, body) = send(&app, "POST", "/v1/orders/ORDER_001/scan", Some(json!({}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("ORDER_001"));

    let (_, body) = send(&app, "GET", "/v1/orders/ORDER_001", None).await;
    assert_eq!(body["status"], "AT_COMPANY");
}

#[tokio::test]
async fn test_unknown_order_and_stage() {
    let app = app(seeded_state().await);

    let (status, _) = send(&app, "GET", "/v1/orders/ORDER_404", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, _) = send(
        &app,
        "POST",
        "/v1/orders/ORDER_404/handoffs/store",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/orders/ORDER_001/handoffs/warehouse",
        Some(json!({})),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["error"], "Unknown handoff stage: warehouse");
}

#[tokio::test]
async fn test_generic_event_endpoint() {
    let app = app(seeded_state().await);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/events",
        Some(json!({
            "type": "TEMPERATURE_READING",
            "order_id": "ORDER_001",
            "celsius": 12.0,
            "timestamp": "2024-03-01T10:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["readings"].as_array().unwrap().len(), 1);

    let (status, body) = send(
        &app,
        "POST",
        "/v1/events",
        Some(json!({
            "type": "HANDOFF",
            "order_id": "ORDER_001",
            "stage": "STORE",
            "timestamp": "2024-03-01T11:00:00Z",
        })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["order"]["status"], "REJECTED_BY_STORE");
    assert_eq!(body["decision"]["checkpoint"], "STORE");
}

#[tokio::test]
async fn test_decisions_are_broadcast() {
    let state = seeded_state().await;
    let mut rx = state.notifications.subscribe();
    let app = app(state);

    post_reading(&app, 4.0).await;
    send(
        &app,
        "POST",
        "/v1/orders/ORDER_001/handoffs/logistics",
        Some(json!({})),
    )
    .await;

    match rx.recv().await.unwrap() {
        ShipmentNotification::ReadingRecorded(e) => {
            assert_eq!(e.order_id, "ORDER_001");
            assert_eq!(e.reading_count, 1);
        }
        other => panic!("unexpected notification: {:?}", other),
    }
    match rx.recv().await.unwrap() {
        ShipmentNotification::OrderEvaluated(e) => {
            assert_eq!(e.status, "ACCEPTED_BY_LOGISTICS_COMPANY");
            assert_eq!(e.lowest_celsius, Some(4.0));
        }
        other => panic!("unexpected notification: {:?}", other),
    }
}

#[tokio::test]
async fn test_demo_setup_conflicts_when_already_seeded() {
    let app = app(seeded_state().await);

    let (status, _) = send(&app, "POST", "/v1/demo/setup", None).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let fresh = coldchain_api::app(AppState::new(
        Arc::new(InMemoryOrderRegistry::new()),
        Arc::new(InMemoryContractRegistry::new()),
        16,
    ));
    let (status, body) = send(&fresh, "POST", "/v1/demo/setup", None).await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["order_id"], "ORDER_001");
}

#[tokio::test]
async fn test_failed_demo_seed_leaves_no_contract_behind() {
    let orders = InMemoryOrderRegistry::new();
    let contracts = InMemoryContractRegistry::new();
    orders
        .add_order(&Order::new(
            demo::DEMO_ORDER_ID.to_string(),
            "CHICKEN".to_string(),
            1,
            "CON_OTHER".to_string(),
        ))
        .await
        .unwrap();

    let result = demo::seed_demo(&orders, &contracts, Utc::now()).await;
    assert!(result.is_err());
    assert!(contracts
        .get_contract(demo::DEMO_CONTRACT_ID)
        .await
        .unwrap()
        .is_none());
}

#[tokio::test]
async fn test_stream_requires_known_order() {
    let app = app(seeded_state().await);

    let (status, _) = send(&app, "GET", "/v1/orders/ORDER_404/stream", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_stream_only_carries_its_own_order() {
    let state = seeded_state().await;
    state
        .orders
        .add_order(&Order::new(
            "ORDER_002".to_string(),
            "CHICKEN".to_string(),
            50,
            "CON_001".to_string(),
        ))
        .await
        .unwrap();
    let app = app(state);

    let request = Request::builder()
        .uri("/v1/orders/ORDER_001/stream")
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let mut frames = response.into_body().into_data_stream();

    let (status, _) = send(
        &app,
        "POST",
        "/v1/orders/ORDER_002/readings",
        Some(json!({ "celsius": 6.0 })),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    post_reading(&app, 4.0).await;

    let frame = tokio::time::timeout(Duration::from_secs(5), frames.next())
        .await
        .expect("no event within timeout")
        .unwrap()
        .unwrap();
    let text = String::from_utf8(frame.to_vec()).unwrap();
    assert!(text.contains("event: reading_recorded"));
    assert!(text.contains("ORDER_001"));
    assert!(!text.contains("ORDER_002"));
}
