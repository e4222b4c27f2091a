use axum::http::{header, HeaderMap};
use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};

use crate::auth;
use crate::auth::provider::AuthProvider;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    #[serde(default)]
    pub refresh_token: String,
}

/// POST /api/v1/auth/refresh - Exchange a refresh token for a new session
pub async fn refresh(Json(payload): Json<RefreshRequest>) -> ApiResult<Value> {
    if payload.refresh_token.is_empty() {
        return Err(ApiError::bad_request("Refresh token is required"));
    }

    let session = AuthProvider::global()
        .refresh_session(&payload.refresh_token)
        .await
        .map_err(|e| {
            tracing::debug!("Session refresh rejected: {}", e);
            ApiError::unauthorized("Invalid or expired token")
        })?;

    Ok(ApiResponse::success(json!({
        "access_token": session.access_token,
        "refresh_token": session.refresh_token,
        "expires_at": session.expires_at,
    })))
}

/// POST /api/v1/auth/logout - Revoke the presented session, if any.
/// Succeeds regardless; an already-dead session is not an error.
pub async fn logout(headers: HeaderMap) -> ApiResult<Value> {
    let token = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok())
        .and_then(|value| auth::extract_bearer_token(Some(value)));

    if let Some(token) = token {
        if let Err(e) = AuthProvider::global().sign_out(token).await {
            tracing::debug!("Sign-out call failed: {}", e);
        }
    }

    Ok(ApiResponse::success(Value::Null).with_message("Logged out"))
}
