use axum::Extension;

use crate::middleware::auth::AuthStudent;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::school;
use crate::types::SchoolInfo;

/// GET /api/v1/school - Information about the student's school
pub async fn school_get(Extension(auth): Extension<AuthStudent>) -> ApiResult<SchoolInfo> {
    let info = school::get_school_info(auth.school_id).await?;
    Ok(ApiResponse::success(info))
}
