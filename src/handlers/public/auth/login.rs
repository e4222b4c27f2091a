use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use sqlx::Row;
use uuid::Uuid;

use crate::auth::provider::AuthProvider;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/v1/auth/login - Authenticate and receive session tokens.
///
/// The provider validates the credentials; this handler then enforces
/// that the account is an enrolled student before handing out the
/// session. Accounts with a valid password but no student role get a
/// 403 and no tokens.
pub async fn login(Json(payload): Json<LoginRequest>) -> ApiResult<Value> {
    if payload.email.trim().is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request("Email and password are required"));
    }

    let provider = AuthProvider::global();
    let session = provider
        .sign_in_with_password(payload.email.trim(), &payload.password)
        .await?;

    let pool = DatabaseManager::pool()?;

    // Role gate: only student accounts may use this portal
    let has_role: Option<i32> = sqlx::query_scalar(
        "SELECT 1 FROM user_roles WHERE user_id = $1 AND role = 'student' LIMIT 1",
    )
    .bind(session.user.id)
    .fetch_optional(&pool)
    .await?;

    if has_role.is_none() {
        revoke_session(provider, &session.access_token).await;
        return Err(ApiError::forbidden(
            "Access denied - only students can use this portal",
        ));
    }

    let student = sqlx::query(
        "SELECT s.id, s.name, s.enrollment_number, s.school_id, c.name AS class_name
         FROM students s
         LEFT JOIN classes c ON c.id = s.class_id
         WHERE s.user_id = $1",
    )
    .bind(session.user.id)
    .fetch_optional(&pool)
    .await?;

    let Some(student) = student else {
        revoke_session(provider, &session.access_token).await;
        return Err(ApiError::forbidden("Student record not found"));
    };

    let school_id: Uuid = student.try_get("school_id")?;
    let school_name: Option<String> =
        sqlx::query_scalar("SELECT name FROM school_settings WHERE id = $1")
            .bind(school_id)
            .fetch_optional(&pool)
            .await?;

    Ok(ApiResponse::success(json!({
        "access_token": session.access_token,
        "refresh_token": session.refresh_token,
        "expires_at": session.expires_at,
        "user": {
            "id": session.user.id,
            "email": session.user.email,
        },
        "student": {
            "id": student.try_get::<Uuid, _>("id")?,
            "name": student.try_get::<String, _>("name")?,
            "enrollment_number": student.try_get::<String, _>("enrollment_number")?,
            "class_name": student
                .try_get::<Option<String>, _>("class_name")?
                .unwrap_or_else(|| "Unassigned".to_string()),
            "school_name": school_name.unwrap_or_else(|| "School".to_string()),
        },
    })))
}

/// Best-effort revocation when the account fails the student gate;
/// the 403 goes out regardless
async fn revoke_session(provider: &AuthProvider, access_token: &str) {
    if let Err(e) = provider.sign_out(access_token).await {
        tracing::warn!("Failed to revoke session after login rejection: {}", e);
    }
}
