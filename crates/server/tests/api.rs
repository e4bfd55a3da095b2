use std::sync::Arc;

use axum::{
    Router,
    body::Body,
    http::{Method, Request, StatusCode, header},
};
use base64::Engine as _;
use http_body_util::BodyExt;
use migration::MigratorTrait;
use sea_orm::{ConnectionTrait, Database};
use serde_json::{Value, json};
use tower::ServiceExt;

use engine::Engine;
use server::{ServerState, router};

async fn app() -> Router {
    let db = Database::connect("sqlite::memory:").await.unwrap();
    migration::Migrator::up(&db, None).await.unwrap();
    db.execute_unprepared(
        "INSERT INTO users (username, password, role) VALUES \
         ('admin', 'secret', 'ADMIN'), ('clerk', 'secret', 'USER')",
    )
    .await
    .unwrap();
    let engine = Engine::builder()
        .database(db.clone())
        .build()
        .await
        .unwrap();
    router(ServerState {
        engine: Arc::new(engine),
        db,
    })
}

fn basic(username: &str, password: &str) -> String {
    let secret = format!("{username}:{password}");
    format!(
        "Basic {}",
        base64::prelude::BASE64_STANDARD.encode(secret)
    )
}

async fn send(
    app: &Router,
    method: Method,
    uri: &str,
    user: Option<&str>,
    body: Option<Value>,
) -> (StatusCode, Value) {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(user) = user {
        builder = builder.header(header::AUTHORIZATION, basic(user, "secret"));
    }
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string())),
        None => builder.body(Body::empty()),
    }
    .unwrap();

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let value = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, value)
}

fn transaction(vouchar_no: i64, sr_no: &str) -> Value {
    json!({
        "date": "2024-01-15T09:00:00Z",
        "vouchar_no": vouchar_no,
        "sr_no": sr_no,
        "name": "potato",
        "year": 2024,
        "quantity": 40,
        "customer": {
            "name": "customer1",
            "father": "customerFather",
            "phone": "01912239655"
        },
        "agent": ""
    })
}

#[tokio::test]
async fn missing_or_wrong_credentials_are_unauthorized() {
    let app = app().await;

    let (status, _) = send(&app, Method::GET, "/api/inventory", None, None).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);

    let request = Request::builder()
        .uri("/api/inventory")
        .header(header::AUTHORIZATION, basic("clerk", "wrong"))
        .body(Body::empty())
        .unwrap();
    let response = app.clone().oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn create_transaction_embeds_resolved_customer() {
    let app = app().await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some("clerk"),
        Some(transaction(2, "2/30")),
    )
    .await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["inventoryType"], "RECEIVE");
    assert_eq!(body["version"], 1);
    assert_eq!(body["customer"]["slug"], "customer1");
    assert!(body["agent"].is_null());

    let (status, customers) = send(&app, Method::GET, "/api/customers", Some("clerk"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(customers["totalDocs"], 1);
    assert_eq!(customers["docs"][0]["_id"], body["customer"]["_id"]);
}

#[tokio::test]
async fn duplicate_vouchar_conflicts() {
    let app = app().await;
    send(
        &app,
        Method::POST,
        "/api/inventory",
        Some("clerk"),
        Some(transaction(2, "2/30")),
    )
    .await;

    let (status, body) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some("clerk"),
        Some(transaction(2, "2/31")),
    )
    .await;
    assert_eq!(status, StatusCode::CONFLICT);
    assert!(body["error"].as_str().unwrap().contains("vouchar_no"));
}

#[tokio::test]
async fn invalid_bodies_are_bad_requests() {
    let app = app().await;

    let mut bad_phone = transaction(2, "2/30");
    bad_phone["customer"]["phone"] = json!("12345");
    let (status, body) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some("clerk"),
        Some(bad_phone),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["error"].as_str().unwrap().contains("phone"));

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/agents",
        Some("clerk"),
        Some(json!({ "name": "agent1", "father": "agentFather" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some("clerk"),
        Some(json!({ "sr_no": "2/30" })),
    )
    .await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_agent_is_not_found() {
    let app = app().await;
    let mut body = transaction(2, "2/30");
    body["agent"] = json!({ "name": "agent1", "father": "agentFather", "phone": "01712345678" });

    let (status, _) = send(&app, Method::POST, "/api/inventory", Some("clerk"), Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);

    let (_, customers) = send(&app, Method::GET, "/api/customers", Some("clerk"), None).await;
    assert_eq!(customers["totalDocs"], 0);
}

#[tokio::test]
async fn mutations_require_admin() {
    let app = app().await;
    let (_, created) = send(
        &app,
        Method::POST,
        "/api/inventory",
        Some("clerk"),
        Some(transaction(2, "2/30")),
    )
    .await;
    let uri = format!("/api/inventory/{}", created["_id"].as_str().unwrap());

    let mut changed = transaction(99, "2/30");
    changed["quantity"] = json!(55);

    let (status, _) = send(&app, Method::PUT, &uri, Some("clerk"), Some(changed.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    let (status, _) = send(&app, Method::DELETE, &uri, Some("clerk"), None).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    let (status, updated) = send(&app, Method::PUT, &uri, Some("admin"), Some(changed)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(updated["quantity"], 55.0);
    assert_eq!(updated["vouchar_no"], 2);
    assert_eq!(updated["version"], 2);

    let (status, _) = send(&app, Method::DELETE, &uri, Some("admin"), None).await;
    assert_eq!(status, StatusCode::OK);
    let (status, _) = send(&app, Method::GET, &uri, Some("clerk"), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn ledger_amounts_are_derived_server_side() {
    let app = app().await;
    send(
        &app,
        Method::POST,
        "/api/inventory",
        Some("clerk"),
        Some(transaction(2, "2/30")),
    )
    .await;

    let ledger = json!({
        "sr_no": "2/30",
        "year": 2024,
        "customer": "",
        "loan_amount": 20000,
        "loan_rate": 12,
        "quantity": 40,
        "rate": 250,
        "emptyBag_quantity": 70,
        "emptyBag_rate": 78,
        "total_amount": 1
    });
    let (status, entry) = send(
        &app,
        Method::POST,
        "/api/ledger",
        Some("clerk"),
        Some(ledger.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(entry["loan_profit"], 2400.0);
    assert_eq!(entry["loan_payable"], 22400.0);
    assert_eq!(entry["service_amount"], 10000.0);
    assert_eq!(entry["emptyBag_amount"], 5460.0);
    assert_eq!(entry["total_amount"], 37860.0);
    assert_eq!(entry["customer"]["name"], "customer1");

    let (status, _) = send(&app, Method::POST, "/api/ledger", Some("clerk"), Some(ledger)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let mut other = json!({
        "sr_no": "2/31",
        "year": 2024,
        "loan_amount": 0,
        "loan_rate": 0,
        "quantity": 0,
        "rate": 0
    });
    let uri = format!("/api/ledger/{}", entry["_id"].as_str().unwrap());
    let (status, _) = send(&app, Method::PUT, &uri, Some("admin"), Some(other.clone())).await;
    assert_eq!(status, StatusCode::FORBIDDEN);

    other["sr_no"] = json!("9/99");
    let (status, _) = send(&app, Method::POST, "/api/ledger", Some("clerk"), Some(other)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn listing_reports_page_links_and_rejects_unknown_sort() {
    let app = app().await;
    for n in 1..=3 {
        send(
            &app,
            Method::POST,
            "/api/inventory",
            Some("clerk"),
            Some(transaction(n, &format!("{n}/10"))),
        )
        .await;
    }

    let (status, page) = send(
        &app,
        Method::GET,
        "/api/inventory?page=2&limit=2&sort=-vouchar_no",
        Some("clerk"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(page["totalDocs"], 3);
    assert_eq!(page["totalPages"], 2);
    assert_eq!(page["hasPrevPage"], true);
    assert_eq!(page["hasNextPage"], false);
    assert_eq!(page["docs"][0]["vouchar_no"], 1);

    let (status, _) = send(
        &app,
        Method::GET,
        "/api/inventory?sort=password",
        Some("clerk"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);

    let (status, range) = send(
        &app,
        Method::GET,
        "/api/inventory/daterange?start=2024-01-01T00:00:00Z&end=2024-01-31T23:59:59Z",
        Some("clerk"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(range["totalDocs"], 3);
    assert_eq!(range["limit"], 2000);
}

#[tokio::test]
async fn agents_and_chambers_registry() {
    let app = app().await;
    let agent = json!({ "name": "agent1", "father": "agentFather", "phone": "01712345678" });

    let (status, created) = send(
        &app,
        Method::POST,
        "/api/agents",
        Some("clerk"),
        Some(agent.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["version"], 1);
    let (status, _) = send(&app, Method::POST, "/api/agents", Some("clerk"), Some(agent)).await;
    assert_eq!(status, StatusCode::CONFLICT);

    let chamber = json!({ "name": "Chamber One", "capacity": 5000 });
    let (status, created) = send(
        &app,
        Method::POST,
        "/api/chamber",
        Some("clerk"),
        Some(chamber.clone()),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(created["slug"], "chamber-one");
    let (status, _) = send(&app, Method::POST, "/api/chamber", Some("clerk"), Some(chamber)).await;
    assert_eq!(status, StatusCode::CONFLICT);
}

#[tokio::test]
async fn ledger_amounts_out_of_range_are_unprocessable() {
    let app = app().await;
    send(
        &app,
        Method::POST,
        "/api/inventory",
        Some("clerk"),
        Some(transaction(2, "2/30")),
    )
    .await;

    let ledger = json!({
        "sr_no": "2/30",
        "year": 2024,
        "loan_amount": 1e200,
        "loan_rate": 1e200,
        "quantity": 0,
        "rate": 0
    });
    let (status, body) = send(&app, Method::POST, "/api/ledger", Some("clerk"), Some(ledger)).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["error"].as_str().unwrap().contains("loan_profit"));
}

#[tokio::test]
async fn date_range_accepts_bare_days_and_rejects_garbage_as_json() {
    let app = app().await;
    send(
        &app,
        Method::POST,
        "/api/inventory",
        Some("clerk"),
        Some(transaction(2, "2/30")),
    )
    .await;

    let (status, range) = send(
        &app,
        Method::GET,
        "/api/inventory/daterange?start=2024-01-15&end=2024-01-15",
        Some("clerk"),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(range["totalDocs"], 1);

    for uri in [
        "/api/inventory/daterange?start=yesterday&end=2024-01-15",
        "/api/ledger/daterange?start=2024-01-15",
        "/api/inventory?page=first",
    ] {
        let (status, body) = send(&app, Method::GET, uri, Some("clerk"), None).await;
        assert_eq!(status, StatusCode::BAD_REQUEST, "{uri}");
        assert!(body["error"].is_string(), "{uri}");
    }
}
