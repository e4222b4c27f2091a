use axum::Json;
use serde::Deserialize;
use serde_json::{json, Value};
use uuid::Uuid;

use crate::auth::provider::{AuthProvider, ProviderError};
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::middleware::response::{ApiResponse, ApiResult};

const MIN_PASSWORD_LEN: usize = 6;

#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    #[serde(default)]
    pub enrollment_number: String,
    #[serde(default)]
    pub email: String,
    #[serde(default)]
    pub password: String,
}

/// POST /api/v1/auth/register - Create an account for an enrolled student.
///
/// The enrollment number must already exist in the student registry and
/// not be linked to an account yet. The provider account is rolled back
/// if linking fails.
pub async fn register(Json(payload): Json<RegisterRequest>) -> ApiResult<Value> {
    let enrollment_number = payload.enrollment_number.trim();
    let email = payload.email.trim().to_lowercase();

    if enrollment_number.is_empty() || email.is_empty() || payload.password.is_empty() {
        return Err(ApiError::bad_request(
            "Enrollment number, email and password are required",
        ));
    }
    if payload.password.len() < MIN_PASSWORD_LEN {
        return Err(ApiError::bad_request(
            "Password must be at least 6 characters",
        ));
    }

    let pool = DatabaseManager::pool()?;

    // 1. The enrollment number must match a registered student
    let student: Option<(Uuid, String, Uuid, Option<Uuid>)> = sqlx::query_as(
        "SELECT id, name, school_id, user_id FROM students WHERE enrollment_number = $1",
    )
    .bind(enrollment_number)
    .fetch_optional(&pool)
    .await?;

    let Some((student_id, student_name, school_id, linked_user)) = student else {
        return Err(ApiError::not_found(
            "Enrollment number not found. Check that it was entered correctly.",
        ));
    };

    // 2. One account per student
    if linked_user.is_some() {
        return Err(ApiError::conflict(
            "This enrollment number already has an account",
        ));
    }

    // 3. Create the provider account (auto-confirmed)
    let provider = AuthProvider::global();
    let user = provider
        .admin_create_user(
            &email,
            &payload.password,
            json!({ "name": student_name, "enrollment_number": enrollment_number }),
        )
        .await
        .map_err(|err| match &err {
            ProviderError::Rejected { message, .. }
                if message.contains("already registered") || message.contains("already exists") =>
            {
                ApiError::conflict("This email is already registered")
            }
            _ => err.into(),
        })?;

    // 4. Link the account to the student row
    let linked = sqlx::query("UPDATE students SET user_id = $1 WHERE id = $2")
        .bind(user.id)
        .bind(student_id)
        .execute(&pool)
        .await;

    if let Err(e) = linked {
        tracing::error!("Failed to link account to student: {}", e);
        // Rollback - don't leave an orphaned provider account
        if let Err(rollback) = provider.admin_delete_user(user.id).await {
            tracing::error!("Rollback of provider account failed: {}", rollback);
        }
        return Err(ApiError::internal_server_error(
            "Failed to link account to student",
        ));
    }

    // 5. Grant the student role; non-critical, login re-checks it anyway
    let role_insert = sqlx::query(
        "INSERT INTO user_roles (user_id, school_id, role) VALUES ($1, $2, 'student')",
    )
    .bind(user.id)
    .bind(school_id)
    .execute(&pool)
    .await;

    if let Err(e) = role_insert {
        tracing::error!("Failed to grant student role: {}", e);
    }

    Ok(ApiResponse::created(json!({
        "email": user.email,
        "name": student_name,
    }))
    .with_message("Account created. You can log in now."))
}
