pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod handlers;
pub mod middleware;
pub mod services;
pub mod types;

use std::sync::Arc;

use axum::{
    http::{header, Method, Uri},
    routing::{get, patch, post},
    Json, Router,
};
use serde_json::{json, Value};
use tower_http::cors::{AllowOrigin, CorsLayer};
use tower_http::trace::TraceLayer;

use middleware::rate_limit::{rate_limit, RateLimiter};

/// Build the full application router.
///
/// The rate limiter is injected rather than created here so `main` can
/// drive its sweep task and tests can supply a fresh one per case.
pub fn app(limiter: Arc<RateLimiter>) -> Router {
    Router::new()
        // Public
        .route("/", get(root))
        .route("/health", get(health))
        .nest("/api/v1/auth", public_auth_routes())
        // Protected API
        .nest("/api/v1", protected_routes(limiter))
        .fallback(not_found)
        // Global middleware
        .layer(cors_layer())
        .layer(TraceLayer::new_for_http())
}

fn public_auth_routes() -> Router {
    use handlers::public::auth;

    Router::new()
        .route("/login", post(auth::login))
        .route("/register", post(auth::register))
        .route("/forgot-password", post(auth::forgot_password))
        .route("/reset-password", post(auth::reset_password))
        .route("/refresh", post(auth::refresh))
        .route("/logout", post(auth::logout))
}

fn protected_routes(limiter: Arc<RateLimiter>) -> Router {
    use handlers::protected as h;
    use middleware::auth::auth_gate;

    let mut router = Router::new()
        .route("/me", get(h::me_get))
        .route("/me/attendance", get(h::me_attendance_get))
        .route("/me/details", patch(h::me_details_patch))
        .route("/attendance", get(h::attendance_get))
        .route("/attendance/absences", get(h::attendance_absences_get))
        .route("/attendance/summary/:year/:month", get(h::attendance_summary_get))
        .route("/grades", get(h::grades_get))
        .route("/grades/:semester", get(h::grades_semester_get))
        .route("/benefits", get(h::benefits_get))
        .route("/certificates", get(h::certificates_get).post(h::certificates_post))
        .route("/justifications", get(h::justifications_get).post(h::justifications_post))
        .route("/school", get(h::school_get));

    // Limiter keys on the resolved student id, so it sits inside the gate
    if config::config().api.enable_rate_limiting {
        router = router.layer(axum::middleware::from_fn_with_state(limiter, rate_limit));
    }

    router.layer(axum::middleware::from_fn(auth_gate))
}

fn cors_layer() -> CorsLayer {
    let origins: Vec<_> = config::config()
        .security
        .cors_origins
        .iter()
        .filter_map(|origin| origin.parse().ok())
        .collect();

    CorsLayer::new()
        .allow_origin(AllowOrigin::list(origins))
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PATCH,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([header::CONTENT_TYPE, header::AUTHORIZATION])
        .allow_credentials(true)
}

async fn root() -> Json<Value> {
    let version = env!("CARGO_PKG_VERSION");

    Json(json!({
        "success": true,
        "data": {
            "name": "Student Portal API",
            "version": version,
            "status": "online",
            "timestamp": chrono::Utc::now(),
            "endpoints": {
                "auth": "/api/v1/auth/* (public - login, register, password recovery)",
                "me": "/api/v1/me (protected - profile and contact details)",
                "attendance": "/api/v1/attendance (protected)",
                "grades": "/api/v1/grades[/:semester] (protected)",
                "benefits": "/api/v1/benefits (protected)",
                "certificates": "/api/v1/certificates (protected)",
                "justifications": "/api/v1/justifications (protected)",
                "school": "/api/v1/school (protected)",
            }
        }
    }))
}

async fn health() -> impl axum::response::IntoResponse {
    let now = chrono::Utc::now();

    match database::manager::DatabaseManager::health_check().await {
        Ok(_) => (
            axum::http::StatusCode::OK,
            Json(json!({
                "success": true,
                "data": {
                    "status": "ok",
                    "timestamp": now,
                    "database": "ok"
                }
            })),
        ),
        Err(e) => (
            axum::http::StatusCode::SERVICE_UNAVAILABLE,
            Json(json!({
                "success": false,
                "error": "database unavailable",
                "data": {
                    "status": "degraded",
                    "timestamp": now,
                    "database_error": e.to_string()
                }
            })),
        ),
    }
}

async fn not_found(uri: Uri) -> (axum::http::StatusCode, Json<Value>) {
    (
        axum::http::StatusCode::NOT_FOUND,
        Json(json!({
            "success": false,
            "error": "Endpoint not found",
            "path": uri.path(),
        })),
    )
}
