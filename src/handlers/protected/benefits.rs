use axum::Extension;

use crate::middleware::auth::AuthStudent;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::benefits;
use crate::types::Benefit;

/// GET /api/v1/benefits - Social benefit enrollments for the student
pub async fn benefits_get(Extension(auth): Extension<AuthStudent>) -> ApiResult<Vec<Benefit>> {
    let benefits = benefits::get_benefits(auth.student_id).await?;
    Ok(ApiResponse::success(benefits))
}
