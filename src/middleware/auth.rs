//! Auth gate: credential verification plus student identity resolution.
//!
//! Runs before every protected handler. Either attaches an [`AuthStudent`]
//! context to the request or short-circuits with 401/403 - handlers are
//! never reachable without a resolved identity.

use axum::{
    extract::Request,
    http::{header, HeaderMap},
    middleware::Next,
    response::Response,
};
use sqlx::PgPool;
use uuid::Uuid;

use crate::auth;
use crate::config;
use crate::database::manager::DatabaseManager;
use crate::error::ApiError;

/// Resolved identity context, created fresh per request.
///
/// `school_id` comes from the resolved student row, never from a token
/// claim - tenant scoping is enforced purely by lookup.
#[derive(Clone, Debug)]
pub struct AuthStudent {
    pub user_id: Uuid,
    pub student_id: Uuid,
    pub school_id: Uuid,
    pub email: String,
}

/// Middleware that validates the bearer token and loads student info
pub async fn auth_gate(
    headers: HeaderMap,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let auth_header = headers
        .get(header::AUTHORIZATION)
        .and_then(|value| value.to_str().ok());

    let token = auth::extract_bearer_token(auth_header)
        .ok_or_else(|| ApiError::unauthorized("Authentication required"))?;

    let security = &config::config().security;
    let claims = auth::verify_token(token, &security.jwt_secret, &security.jwt_audience)
        .map_err(|_| ApiError::unauthorized("Invalid or expired token"))?;

    let pool = DatabaseManager::pool()?;
    let student = resolve_student(&pool, claims.sub)
        .await?
        .ok_or_else(student_access_denied)?;

    request.extensions_mut().insert(AuthStudent {
        user_id: claims.sub,
        student_id: student.id,
        school_id: student.school_id,
        email: claims.email,
    });

    Ok(next.run(request).await)
}

/// The one 403 every resolution failure collapses into. "Unknown subject"
/// and "wrong role" must stay indistinguishable to the caller.
fn student_access_denied() -> ApiError {
    ApiError::forbidden("Access restricted to enrolled students")
}

#[derive(Debug)]
struct ResolvedStudent {
    id: Uuid,
    school_id: Uuid,
}

/// Map a verified subject to a student record and school scope.
///
/// Role membership is checked first; the entity fetch is skipped when the
/// subject has no student role.
async fn resolve_student(
    pool: &PgPool,
    user_id: Uuid,
) -> Result<Option<ResolvedStudent>, ApiError> {
    let has_role: Option<i32> = sqlx::query_scalar(
        "SELECT 1 FROM user_roles WHERE user_id = $1 AND role = 'student' LIMIT 1",
    )
    .bind(user_id)
    .fetch_optional(pool)
    .await?;

    if has_role.is_none() {
        return Ok(None);
    }

    let row: Option<(Uuid, Uuid)> =
        sqlx::query_as("SELECT id, school_id FROM students WHERE user_id = $1")
            .bind(user_id)
            .fetch_optional(pool)
            .await?;

    Ok(row.map(|(id, school_id)| ResolvedStudent { id, school_id }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use sqlx::postgres::PgPoolOptions;

    #[test]
    fn resolution_failure_is_opaque() {
        let denied = student_access_denied();
        assert_eq!(denied.status_code(), 403);

        let body = denied.to_json();
        assert_eq!(body["success"], serde_json::json!(false));
        assert_eq!(body["error"], serde_json::json!("Access restricted to enrolled students"));
        assert_eq!(body["code"], serde_json::json!("FORBIDDEN"));
    }

    /// Runs the two-read resolution against a real database. Opt-in: set
    /// TEST_DATABASE_URL to a scratch Postgres to enable it.
    #[tokio::test]
    async fn role_miss_and_missing_row_are_indistinguishable() {
        let Ok(url) = std::env::var("TEST_DATABASE_URL") else {
            return;
        };

        // Single connection so the temp tables stay visible to every query
        let pool = PgPoolOptions::new()
            .max_connections(1)
            .connect(&url)
            .await
            .expect("test database");

        sqlx::query("CREATE TEMP TABLE user_roles (user_id uuid, school_id uuid, role text)")
            .execute(&pool)
            .await
            .unwrap();
        sqlx::query("CREATE TEMP TABLE students (id uuid, user_id uuid, school_id uuid)")
            .execute(&pool)
            .await
            .unwrap();

        let school_id = Uuid::new_v4();
        let student_id = Uuid::new_v4();
        let enrolled = Uuid::new_v4();
        let role_only = Uuid::new_v4();
        let unknown = Uuid::new_v4();

        for user in [enrolled, role_only] {
            sqlx::query("INSERT INTO user_roles (user_id, school_id, role) VALUES ($1, $2, 'student')")
                .bind(user)
                .bind(school_id)
                .execute(&pool)
                .await
                .unwrap();
        }
        sqlx::query("INSERT INTO students (id, user_id, school_id) VALUES ($1, $2, $3)")
            .bind(student_id)
            .bind(enrolled)
            .bind(school_id)
            .execute(&pool)
            .await
            .unwrap();

        let resolved = resolve_student(&pool, enrolled)
            .await
            .unwrap()
            .expect("enrolled student resolves");
        assert_eq!(resolved.id, student_id);
        assert_eq!(resolved.school_id, school_id);

        // A subject with the role but no student row, and a subject the
        // store has never seen, must produce identical rejections
        let err_role_only = resolve_student(&pool, role_only)
            .await
            .unwrap()
            .ok_or_else(student_access_denied)
            .unwrap_err();
        let err_unknown = resolve_student(&pool, unknown)
            .await
            .unwrap()
            .ok_or_else(student_access_denied)
            .unwrap_err();

        assert_eq!(err_role_only.status_code(), 403);
        assert_eq!(err_role_only.status_code(), err_unknown.status_code());
        assert_eq!(err_role_only.to_json(), err_unknown.to_json());
    }
}
