use axum::extract::Path;
use axum::Extension;

use crate::error::ApiError;
use crate::middleware::auth::AuthStudent;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::grades;
use crate::types::{Grade, ReportCard};

/// GET /api/v1/grades - Complete report card grouped by subject
pub async fn grades_get(Extension(auth): Extension<AuthStudent>) -> ApiResult<ReportCard> {
    let card = grades::get_report_card(auth.student_id, auth.school_id).await?;
    Ok(ApiResponse::success(card))
}

/// GET /api/v1/grades/:semester - Grades for one semester
pub async fn grades_semester_get(
    Extension(auth): Extension<AuthStudent>,
    Path(semester): Path<i32>,
) -> ApiResult<Vec<Grade>> {
    if !(1..=3).contains(&semester) {
        return Err(ApiError::bad_request("Invalid semester (1-3)"));
    }

    let grades = grades::get_semester_grades(auth.student_id, auth.school_id, semester).await?;
    Ok(ApiResponse::success(grades))
}
