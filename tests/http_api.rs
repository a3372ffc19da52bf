#[path = "common/mod.rs"]
mod common;

use std::sync::Arc;

use axum::{
    Router,
    body::{Body, to_bytes},
    http::{Request, StatusCode, header},
    response::Response,
};
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde_json::{Value, json};
use tower::ServiceExt; // for oneshot

use finfusion::{routes::build_router, session::SESSION_COOKIE_NAME};

async fn body_json(response: Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

/// Decimals travel as JSON strings.
fn decimal(value: &Value) -> Decimal {
    value.as_str().unwrap().parse().unwrap()
}

async fn body_text(response: Response) -> String {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    String::from_utf8(bytes.to_vec()).unwrap()
}

fn post_json(uri: &str, cookie: Option<&str>, body: Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

/// Registers `ana`, logs in and returns the cookie header value.
async fn sign_in(app: &Router) -> String {
    let creds = json!({ "username": "ana", "password": "s3cret" });
    let response = app
        .clone()
        .oneshot(post_json("/register", None, creds.clone()))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json("/login", None, creds))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let set_cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .unwrap()
        .to_str()
        .unwrap()
        .to_string();
    assert!(set_cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
    set_cookie.split(';').next().unwrap().to_string()
}

#[tokio::test]
async fn protected_routes_require_a_session() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let app = build_router(Arc::new(ctx.state.clone()));

    for uri in ["/api/entries", "/api/summary", "/api/charts/monthly", "/api/schedule?amount=10"] {
        let response = app.clone().oneshot(get(uri, None)).await.unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED, "{uri}");
    }
    let response = app
        .clone()
        .oneshot(get("/api/entries", Some("session=forged")))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let response = app.clone().oneshot(get("/", None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn bad_login_is_unauthorized() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let app = build_router(Arc::new(ctx.state.clone()));
    sign_in(&app).await;

    for creds in [
        json!({ "username": "ana", "password": "wrong" }),
        json!({ "username": "ghost", "password": "s3cret" }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/login", None, creds))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
        assert!(response.headers().get(header::SET_COOKIE).is_none());
        assert_eq!(body_json(response).await, json!({ "ok": false }));
    }

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn ledger_flow_over_http() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let app = build_router(Arc::new(ctx.state.clone()));
    let cookie = sign_in(&app).await;
    let cookie = Some(cookie.as_str());

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/entries",
            cookie,
            json!({
                "date": "2024-01-05",
                "description": "Salary",
                "amount": 3000,
                "kind": "income",
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/entries",
            cookie,
            json!({
                "date": "2024-01-10",
                "description": "TV",
                "amount": "1200.00",
                "kind": "expense",
                "payment_method": "credit_card",
                "necessity": "non_essential",
                "installments": 3,
            }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    assert_eq!(created["ids"].as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(get("/api/entries?kind=expense", cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let expenses = body_json(response).await;
    let expenses = expenses.as_array().unwrap();
    assert_eq!(expenses.len(), 3);
    assert_eq!(decimal(&expenses[0]["amount"]), dec!(400));
    assert_eq!(expenses[0]["description"], "TV (installment 1/3)");

    let response = app
        .clone()
        .oneshot(get("/api/summary?as_of=2024-01-31", cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let summary = body_json(response).await;
    assert_eq!(decimal(&summary["balance"]), dec!(1800));
    assert_eq!(summary["balance_display"], "R$1.800,00");
    assert_eq!(decimal(&summary["total_expense"]), dec!(1200));
    assert_eq!(summary["top_expenses"].as_array().unwrap().len(), 3);
    // 1200 on credit card exceeds the default limit of 1000.
    assert!(
        summary["alerts"]
            .as_array()
            .unwrap()
            .iter()
            .any(|a| a["kind"] == "credit_limit")
    );

    let response = app
        .clone()
        .oneshot(get("/api/charts/monthly", cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 3);

    let response = app
        .clone()
        .oneshot(get("/api/entries/export", cookie))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let csv = body_text(response).await;
    assert_eq!(csv.lines().count(), 5);

    // Everything exported can be imported back into the same ledger.
    let import = Request::builder()
        .method("POST")
        .uri("/api/entries/import")
        .header(header::COOKIE, cookie.unwrap())
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv))
        .unwrap();
    let response = app.clone().oneshot(import).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    assert_eq!(body_json(response).await["imported"], 4);

    let response = app
        .clone()
        .oneshot(post_json(
            "/api/entries/delete",
            cookie,
            json!({ "ids": created["ids"] }),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["deleted"], 3);

    let response = app
        .clone()
        .oneshot(get("/api/entries", cookie))
        .await
        .unwrap();
    assert_eq!(body_json(response).await.as_array().unwrap().len(), 5);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn invalid_entries_are_rejected() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let app = build_router(Arc::new(ctx.state.clone()));
    let cookie = sign_in(&app).await;
    let cookie = Some(cookie.as_str());

    for body in [
        json!({ "date": "2024-01-05", "amount": 10, "kind": "refund" }),
        json!({ "date": "05/01/2024", "amount": 10, "kind": "income" }),
        json!({ "date": "2024-01-05", "amount": "ten", "kind": "income" }),
        json!({ "date": "2024-01-05", "amount": 10, "kind": "expense", "installments": 0 }),
        json!({ "date": "2024-01-05", "amount": 10, "kind": "expense", "payment_method": "pix" }),
        json!({ "date": "2024-01-05", "amount": "1000000000000000.01", "kind": "income" }),
        json!({ "date": "2024-01-05", "amount": "79228162514264337593543950335", "kind": "income" }),
        json!({ "date": "2024-01-05", "amount": 100, "kind": "expense", "installments": 2, "monthly_rate": "79228162514264337593543950335" }),
    ] {
        let response = app
            .clone()
            .oneshot(post_json("/api/entries", cookie, body.clone()))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::BAD_REQUEST, "{body}");
    }

    let response = app
        .clone()
        .oneshot(get("/api/entries", cookie))
        .await
        .unwrap();
    assert!(body_json(response).await.as_array().unwrap().is_empty());

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn schedule_preview_requires_a_session() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let app = build_router(Arc::new(ctx.state.clone()));
    let uri = "/api/schedule?amount=1000&monthly_rate=0.02&installments=12";

    let response = app.clone().oneshot(get(uri, None)).await.unwrap();
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);

    let cookie = sign_in(&app).await;
    let response = app
        .clone()
        .oneshot(get(uri, Some(cookie.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let rows = body["installments"].as_array().unwrap();
    assert_eq!(rows.len(), 12);
    assert_eq!(decimal(&rows[0]["payment"]), dec!(94.56));
    assert!(decimal(&rows[11]["balance"]).is_zero());

    let response = app
        .clone()
        .oneshot(get(
            "/api/schedule?amount=1&monthly_rate=79228162514264337593543950335&installments=2",
            Some(cookie.as_str()),
        ))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    common::teardown(Some(ctx)).await;
}

#[tokio::test]
async fn summary_with_vanishing_income_is_a_client_error() {
    let ctx = match common::setup_state().await {
        Some(s) => s,
        None => return,
    };
    let app = build_router(Arc::new(ctx.state.clone()));
    let cookie = sign_in(&app).await;

    let csv = "date,description,amount,kind,payment_method,installment_index,installment_count,necessity\n\
2024-01-05,Dust,0.0000000000000000000000000001,income,,,,\n\
2024-01-06,Rent,1000,expense,,,,\n";
    let import = Request::builder()
        .method("POST")
        .uri("/api/entries/import")
        .header(header::COOKIE, cookie.as_str())
        .header(header::CONTENT_TYPE, "text/csv")
        .body(Body::from(csv))
        .unwrap();
    let response = app.clone().oneshot(import).await.unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);

    let response = app
        .clone()
        .oneshot(get("/api/summary?as_of=2024-01-31", Some(cookie.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());

    // Charts only add amounts and keep working.
    let response = app
        .clone()
        .oneshot(get("/api/charts/balance", Some(cookie.as_str())))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    common::teardown(Some(ctx)).await;
}
