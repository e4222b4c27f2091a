use std::sync::Arc;
use std::time::Duration;

use student_portal_api::middleware::rate_limit::RateLimiter;
use student_portal_api::{app, config};

#[tokio::main]
async fn main() {
    // Load .env if present so cargo run picks up DATABASE_URL, SUPABASE_* etc.
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt::init();

    let config = config::config();
    if let Err(e) = config.validate() {
        eprintln!("configuration error: {}", e);
        std::process::exit(1);
    }
    if config.provider.service_role_key.is_empty() {
        tracing::warn!("SUPABASE_SERVICE_ROLE_KEY is not set; auth endpoints will fail");
    }

    tracing::info!("Starting student portal API in {:?} mode", config.environment);

    let limiter = Arc::new(RateLimiter::from_config());
    if config.api.enable_rate_limiting {
        limiter.start_sweeper(Duration::from_secs(
            config.api.rate_limit_sweep_interval_secs,
        ));
    }

    let app = app(limiter);

    // Allow tests or deployments to override port via env
    let port = std::env::var("PORT")
        .ok()
        .and_then(|s| s.parse::<u16>().ok())
        .unwrap_or(3000);

    let bind_addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&bind_addr)
        .await
        .unwrap_or_else(|e| panic!("failed to bind {}: {}", bind_addr, e));

    tracing::info!("Student portal API listening on http://{}", bind_addr);

    axum::serve(listener, app).await.expect("server");
}
