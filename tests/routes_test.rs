mod common;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use common::{body_bytes, body_json, event_payload, TestApp, ALLOWED_ORIGIN};
use serde_json::json;

#[tokio::test]
async fn round_trip_from_intent_to_confirmation() {
    let app = TestApp::new();

    let response = app
        .create_intent(r#"{"email":"a@b.com","amount":1000,"currency":"usd"}"#)
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_json(response).await["client_secret"].is_string());

    let intent_id = app.processor.last_intent_id().unwrap();
    let records = app.records().await;
    assert_eq!(records.len(), 1);
    assert_eq!(records[0].record.payment_id, intent_id);
    assert!(!records[0].record.is_confirmed);

    let response = app
        .deliver(&event_payload("payment_intent.succeeded", &intent_id))
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        body_json(response).await,
        json!({ "message": "Payment confirmed successfully" })
    );

    assert!(app.records().await[0].record.is_confirmed);
    assert_eq!(app.notifier.sent(), vec!["a@b.com".to_string()]);
}

#[tokio::test]
async fn non_post_methods_are_not_allowed() {
    let app = TestApp::new();

    for uri in ["/api/create-payment-intent", "/api/webhook"] {
        for method in [Method::GET, Method::PUT, Method::DELETE, Method::PATCH] {
            let response = app
                .send(
                    Request::builder()
                        .method(method.clone())
                        .uri(uri)
                        .body(Body::empty())
                        .unwrap(),
                )
                .await;

            assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED, "{method} {uri}");
            assert_eq!(response.headers()[header::ALLOW], "POST");
            assert_eq!(
                body_json(response).await,
                json!({ "error": format!("Method {method} Not Allowed") })
            );
        }
    }
}

#[tokio::test]
async fn preflight_returns_empty_ok_with_cors_headers() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::builder()
                .method(Method::OPTIONS)
                .uri("/api/create-payment-intent")
                .header(header::ORIGIN, ALLOWED_ORIGIN)
                .header(header::ACCESS_CONTROL_REQUEST_METHOD, "POST")
                .header(header::ACCESS_CONTROL_REQUEST_HEADERS, "content-type")
                .body(Body::empty())
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    let headers = response.headers().clone();
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_ORIGIN], ALLOWED_ORIGIN);
    assert_eq!(headers[header::ACCESS_CONTROL_ALLOW_CREDENTIALS], "true");
    let methods = headers[header::ACCESS_CONTROL_ALLOW_METHODS].to_str().unwrap();
    assert!(methods.contains("POST") && methods.contains("OPTIONS"));
    assert!(body_bytes(response).await.is_empty());
}

#[tokio::test]
async fn intent_response_carries_allowed_origin() {
    let app = TestApp::new();

    let response = app
        .send(
            Request::builder()
                .method(Method::POST)
                .uri("/api/create-payment-intent")
                .header(header::ORIGIN, ALLOWED_ORIGIN)
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(r#"{"email":"a@b.com","amount":1000,"currency":"usd"}"#))
                .unwrap(),
        )
        .await;

    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(
        response.headers()[header::ACCESS_CONTROL_ALLOW_ORIGIN],
        ALLOWED_ORIGIN
    );
}

#[tokio::test]
async fn health_check() {
    let app = TestApp::new();
    let response = app
        .send(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_bytes(response).await, b"OK");
}
