use axum::{Extension, Json};
use serde_json::Value;

use crate::error::ApiError;
use crate::middleware::auth::AuthStudent;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::student::{self, UpdateDetails};
use crate::types::{AttendanceStats, StudentProfile};

/// GET /api/v1/me - Current student profile
pub async fn me_get(Extension(auth): Extension<AuthStudent>) -> ApiResult<StudentProfile> {
    let profile = student::get_profile(auth.student_id).await?;
    Ok(ApiResponse::success(profile))
}

/// GET /api/v1/me/attendance - Attendance statistics for the dashboard
pub async fn me_attendance_get(
    Extension(auth): Extension<AuthStudent>,
) -> ApiResult<AttendanceStats> {
    let stats = student::get_attendance_stats(auth.student_id).await?;
    Ok(ApiResponse::success(stats))
}

/// PATCH /api/v1/me/details - Update contact details.
/// Only the allow-listed fields are ever written; anything else in the
/// body is ignored.
pub async fn me_details_patch(
    Extension(auth): Extension<AuthStudent>,
    Json(body): Json<Value>,
) -> ApiResult<Value> {
    let field = |key: &str| {
        body.get(key)
            .and_then(Value::as_str)
            .map(|value| value.trim().to_string())
    };

    let details = UpdateDetails {
        guardian_name: field("guardian_name"),
        guardian_phone: field("guardian_phone"),
        address: field("address"),
    };

    if details.is_empty() {
        return Err(ApiError::bad_request("No fields to update"));
    }

    student::update_details(auth.student_id, details).await?;
    Ok(ApiResponse::success(Value::Null).with_message("Details updated"))
}
