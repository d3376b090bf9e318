//! HTTP-level tests driving the router with in-memory templates and transport

use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use mail_composer::config::Settings;
use mail_composer::mailer::MemoryTransport;
use mail_composer::server::{create_app, AppState};
use mail_composer::template::{InjectionKind, InjectionSpec, MemoryTemplateStore, Template};

const WELCOME: &str = r#"<mjml>
  <mj-body>
    <mj-section>
      <mj-column>
        <mj-text>Hello {{name}}, welcome to {{team}}</mj-text>
        <mj-text>{{subjectLine}}</mj-text>
      </mj-column>
    </mj-section>
  </mj-body>
</mjml>"#;

fn create_test_app() -> (Router, Arc<MemoryTransport>) {
    let store = MemoryTemplateStore::new();
    store
        .insert(
            Template {
                id: "welcome".to_string(),
                name: "Welcome".to_string(),
                source: "welcome.mjml".to_string(),
                description: Some("Greets new team members".to_string()),
                injections: vec![InjectionSpec {
                    name: "team".to_string(),
                    display_name: "Team".to_string(),
                    kind: InjectionKind::Text,
                    options: Vec::new(),
                }],
            },
            WELCOME,
        )
        .unwrap();

    let transport = Arc::new(MemoryTransport::new());
    let state = AppState::from_parts(Settings::default(), Arc::new(store), transport.clone());
    (create_app(state), transport)
}

fn compose_body(extra: Value) -> Value {
    let mut body = json!({
        "form": {
            "templateId": "welcome",
            "injections": [{ "name": "team", "type": "text", "data": "Platform" }],
            "subjectLine": "Your first week"
        },
        "currentUser": { "name": "Ada", "email": "ada@example.com" },
        "recipients": ["grace@example.com", { "email": "alan@example.com", "name": "Alan" }]
    });
    if let (Some(target), Value::Object(extra)) = (body.as_object_mut(), extra) {
        target.extend(extra);
    }
    body
}

fn post_json(uri: &str, body: &Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn json_of(response: axum::response::Response) -> Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

#[tokio::test]
async fn test_preview_returns_rendered_html() {
    let (app, transport) = create_test_app();

    let response = app
        .oneshot(post_json("/api/preview", &compose_body(json!({}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_of(response).await;
    let html = body["html"].as_str().unwrap();
    assert!(html.starts_with("<!doctype html>"));
    assert!(html.contains("Hello Ada, welcome to Platform"));
    assert!(html.contains("Your first week"));
    assert!(transport.sent().await.is_empty());
}

#[tokio::test]
async fn test_send_requires_confirmation() {
    let (app, transport) = create_test_app();

    let response = app
        .oneshot(post_json("/api/send", &compose_body(json!({}))))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    let body = json_of(response).await;
    assert_eq!(body["err"]["code"], "CONFIRMATION_REQUIRED");
    assert!(transport.sent().await.is_empty());
}

#[tokio::test]
async fn test_send_with_stale_count_is_rejected() {
    let (app, transport) = create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/send",
            &compose_body(json!({ "confirmedRecipientCount": 1 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_of(response).await["err"]["code"], "CONFIRMATION_REQUIRED");
    assert!(transport.sent().await.is_empty());
}

#[tokio::test]
async fn test_send_delivers_once() {
    let (app, transport) = create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/send",
            &compose_body(json!({ "confirmedRecipientCount": 2 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = json_of(response).await;
    assert_eq!(body["data"]["accepted"], 2);
    assert!(body["data"]["messageId"].is_string());

    let sent = transport.sent().await;
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].subject, "Your first week");
    assert_eq!(sent[0].to.len(), 2);
    assert_eq!(sent[0].to[1].name.as_deref(), Some("Alan"));
}

#[tokio::test]
async fn test_send_without_recipients() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(post_json(
            "/api/send",
            &compose_body(json!({ "recipients": [], "confirmedRecipientCount": 0 })),
        ))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_of(response).await["err"]["code"], "NO_RECIPIENTS");
}

#[tokio::test]
async fn test_unknown_template_is_not_found() {
    let (app, _) = create_test_app();
    let mut body = compose_body(json!({}));
    body["form"]["templateId"] = json!("does-not-exist");

    let response = app.oneshot(post_json("/api/preview", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    assert_eq!(json_of(response).await["err"]["code"], "TEMPLATE_NOT_FOUND");
}

#[tokio::test]
async fn test_missing_injection_is_unprocessable() {
    let (app, _) = create_test_app();
    let mut body = compose_body(json!({}));
    body["form"]["injections"] = json!([]);

    let response = app.oneshot(post_json("/api/preview", &body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::UNPROCESSABLE_ENTITY);
    let body = json_of(response).await;
    assert_eq!(body["err"]["code"], "INJECTION_ERROR");
    assert_eq!(body["data"]["injection"], "team");
}

#[tokio::test]
async fn test_malformed_body_is_bad_request() {
    let (app, _) = create_test_app();

    let response = app
        .oneshot(post_json("/api/preview", &json!({ "form": {} })))
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(json_of(response).await["err"]["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn test_template_catalog_endpoints() {
    let (app, _) = create_test_app();

    let response = app.clone().oneshot(get("/api/templates")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_of(response).await;
    assert_eq!(body["total"], 1);
    assert_eq!(body["templates"][0]["id"], "welcome");
    assert_eq!(body["templates"][0]["injections"][0]["displayName"], "Team");

    let response = app.clone().oneshot(get("/api/templates/welcome")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(json_of(response).await["name"], "Welcome");

    let response = app.oneshot(get("/api/templates/nope")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_health_and_metrics() {
    let (app, _) = create_test_app();

    let response = app.clone().oneshot(get("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = json_of(response).await;
    assert_eq!(body["status"], "healthy");
    assert_eq!(body["templates"]["backend"], "memory");
    assert_eq!(body["templates"]["count"], 1);
    assert_eq!(body["transport"], "memory");

    let response = app
        .clone()
        .oneshot(post_json("/api/preview", &compose_body(json!({}))))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let response = app.oneshot(get("/metrics")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    assert!(String::from_utf8_lossy(&bytes).contains("mailer_renders_total"));
}
