mod common;

use std::sync::Arc;
use std::time::Duration;

use anyhow::Result;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::{middleware::from_fn_with_state, routing::get, Extension, Router};
use serde_json::Value;
use tower::ServiceExt;
use uuid::Uuid;

use student_portal_api::middleware::auth::AuthStudent;
use student_portal_api::middleware::rate_limit::{rate_limit, RateLimiter};

async fn ping() -> &'static str {
    "pong"
}

/// Router with the limiter layered the way the protected API layers it,
/// with an identity already attached (as if the gate had run).
fn router_with_identity(limiter: Arc<RateLimiter>, student_id: Uuid) -> Router {
    let auth = AuthStudent {
        user_id: Uuid::new_v4(),
        student_id,
        school_id: Uuid::new_v4(),
        email: "student@school.example".to_string(),
    };

    Router::new()
        .route("/ping", get(ping))
        .layer(from_fn_with_state(limiter, rate_limit))
        .layer(Extension(auth))
}

fn router_anonymous(limiter: Arc<RateLimiter>) -> Router {
    Router::new()
        .route("/ping", get(ping))
        .layer(from_fn_with_state(limiter, rate_limit))
}

fn get_request(forwarded_for: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().uri("/ping");
    if let Some(origin) = forwarded_for {
        builder = builder.header("x-forwarded-for", origin);
    }
    builder.body(Body::empty()).expect("request")
}

#[tokio::test]
async fn quota_exhaustion_returns_429_with_retry_hint() -> Result<()> {
    common::init_env();
    let limiter = Arc::new(RateLimiter::new(3, Duration::from_secs(60)));
    let app = router_with_identity(limiter, Uuid::new_v4());

    for _ in 0..3 {
        let response = app.clone().oneshot(get_request(None)).await?;
        assert_eq!(response.status(), StatusCode::OK);
    }

    let response = app.clone().oneshot(get_request(None)).await?;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);

    let retry_after = response
        .headers()
        .get(header::RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse::<u64>().ok())
        .expect("Retry-After must be a number of seconds");
    assert!(retry_after >= 1 && retry_after <= 60);

    let bytes = to_bytes(response.into_body(), usize::MAX).await?;
    let body: Value = serde_json::from_slice(&bytes)?;
    assert_eq!(body["success"], Value::Bool(false));
    assert_eq!(body["code"], "TOO_MANY_REQUESTS");
    assert_eq!(body["retry_after_secs"], Value::from(retry_after));
    Ok(())
}

#[tokio::test]
async fn authenticated_students_do_not_share_quota() -> Result<()> {
    common::init_env();
    let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(60)));

    let app_a = router_with_identity(Arc::clone(&limiter), Uuid::new_v4());
    let app_b = router_with_identity(Arc::clone(&limiter), Uuid::new_v4());

    assert_eq!(app_a.clone().oneshot(get_request(None)).await?.status(), StatusCode::OK);
    assert_eq!(app_b.clone().oneshot(get_request(None)).await?.status(), StatusCode::OK);

    // Each is now individually exhausted
    assert_eq!(
        app_a.oneshot(get_request(None)).await?.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    assert_eq!(
        app_b.oneshot(get_request(None)).await?.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    Ok(())
}

#[tokio::test]
async fn anonymous_requests_key_on_forwarded_origin() -> Result<()> {
    common::init_env();
    let limiter = Arc::new(RateLimiter::new(1, Duration::from_secs(60)));
    let app = router_anonymous(limiter);

    assert_eq!(
        app.clone().oneshot(get_request(Some("10.0.0.1"))).await?.status(),
        StatusCode::OK
    );
    assert_eq!(
        app.clone().oneshot(get_request(Some("10.0.0.2"))).await?.status(),
        StatusCode::OK
    );
    assert_eq!(
        app.clone().oneshot(get_request(Some("10.0.0.1"))).await?.status(),
        StatusCode::TOO_MANY_REQUESTS
    );

    // No origin at all falls into one shared anonymous bucket
    assert_eq!(app.clone().oneshot(get_request(None)).await?.status(), StatusCode::OK);
    assert_eq!(
        app.oneshot(get_request(None)).await?.status(),
        StatusCode::TOO_MANY_REQUESTS
    );
    Ok(())
}
