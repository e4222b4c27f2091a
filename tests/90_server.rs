mod common;

use anyhow::Result;
use reqwest::StatusCode;
use uuid::Uuid;

#[tokio::test]
async fn health_endpoint_responds() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client
        .get(format!("{}/health", server.base_url))
        .send()
        .await?;

    // The test database is unreachable on purpose, so degraded is expected;
    // OK would mean something answered on the closed port
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["success"], serde_json::Value::Bool(false));
    assert_eq!(body["data"]["status"], "degraded");
    Ok(())
}

#[tokio::test]
async fn root_reports_service_metadata() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let res = client.get(&server.base_url).send().await?;
    assert_eq!(res.status(), StatusCode::OK);

    let body = res.json::<serde_json::Value>().await?;
    assert_eq!(body["data"]["name"], "Student Portal API");
    assert!(body["data"]["endpoints"].is_object());
    Ok(())
}

#[tokio::test]
async fn protected_endpoints_reject_unauthenticated_requests() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    for path in ["/api/v1/me", "/api/v1/grades", "/api/v1/school"] {
        let res = client
            .get(format!("{}{}", server.base_url, path))
            .send()
            .await?;
        assert_eq!(res.status(), StatusCode::UNAUTHORIZED, "path {}", path);
    }
    Ok(())
}

#[tokio::test]
async fn valid_token_passes_the_gate_over_the_wire() -> Result<()> {
    let server = common::ensure_server().await?;
    let client = reqwest::Client::new();

    let token = common::mint_token(common::TEST_JWT_SECRET, Uuid::new_v4(), 3600);
    let res = client
        .get(format!("{}/api/v1/me", server.base_url))
        .bearer_auth(token)
        .send()
        .await?;

    // Credential accepted; the identity lookup then fails on the closed
    // database port
    assert_eq!(res.status(), StatusCode::SERVICE_UNAVAILABLE);
    Ok(())
}
