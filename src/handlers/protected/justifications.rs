use axum::{Extension, Json};

use crate::error::ApiError;
use crate::middleware::auth::AuthStudent;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::justifications;
use crate::types::{CreateJustification, Justification};

const MIN_REASON_LEN: usize = 10;

/// GET /api/v1/justifications - The student's absence justifications
pub async fn justifications_get(
    Extension(auth): Extension<AuthStudent>,
) -> ApiResult<Vec<Justification>> {
    let justifications =
        justifications::get_justifications(auth.student_id, auth.school_id).await?;
    Ok(ApiResponse::success(justifications))
}

/// POST /api/v1/justifications - Submit a justification for an absence
pub async fn justifications_post(
    Extension(auth): Extension<AuthStudent>,
    Json(mut input): Json<CreateJustification>,
) -> ApiResult<Justification> {
    input.reason = input.reason.trim().to_string();

    if input.reason.chars().count() < MIN_REASON_LEN {
        return Err(ApiError::bad_request(
            "The reason must be at least 10 characters",
        ));
    }

    let justification =
        justifications::create_justification(auth.student_id, auth.school_id, input).await?;
    Ok(ApiResponse::created(justification).with_message("Justification submitted"))
}
