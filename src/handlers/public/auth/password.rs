use axum::Json;
use serde::Deserialize;
use serde_json::Value;

use crate::auth::provider::AuthProvider;
use crate::config;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct ForgotPasswordRequest {
    #[serde(default)]
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetPasswordRequest {
    #[serde(default)]
    pub access_token: String,
    #[serde(default)]
    pub new_password: String,
}

/// POST /api/v1/auth/forgot-password - Send a password reset email.
///
/// Always reports success so the endpoint cannot be used to probe which
/// emails have accounts. Provider failures are logged and swallowed.
pub async fn forgot_password(Json(payload): Json<ForgotPasswordRequest>) -> ApiResult<Value> {
    if payload.email.trim().is_empty() {
        return Err(ApiError::bad_request("Email is required"));
    }

    let redirect_to = format!("{}/reset-password", config::config().provider.frontend_url);
    let email = payload.email.trim().to_lowercase();

    if let Err(e) = AuthProvider::global()
        .send_recovery_email(&email, &redirect_to)
        .await
    {
        tracing::warn!("Password recovery request failed: {}", e);
    }

    Ok(ApiResponse::success(Value::Null).with_message(
        "If this email is registered, you will receive a link to reset your password.",
    ))
}

/// POST /api/v1/auth/reset-password - Set a new password using the
/// recovery token from the reset email
pub async fn reset_password(Json(payload): Json<ResetPasswordRequest>) -> ApiResult<Value> {
    if payload.access_token.is_empty() || payload.new_password.is_empty() {
        return Err(ApiError::bad_request("Token and new password are required"));
    }
    if payload.new_password.len() < 6 {
        return Err(ApiError::bad_request(
            "The new password must be at least 6 characters",
        ));
    }

    AuthProvider::global()
        .update_password(&payload.access_token, &payload.new_password)
        .await
        .map_err(|e| {
            tracing::warn!("Password reset rejected: {}", e);
            ApiError::bad_request("Invalid or expired token. Request a new reset link.")
        })?;

    Ok(ApiResponse::success(Value::Null)
        .with_message("Password changed. You can log in now."))
}
