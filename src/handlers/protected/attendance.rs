use axum::extract::{Path, Query};
use axum::Extension;
use serde::Deserialize;

use crate::config;
use crate::error::ApiError;
use crate::middleware::auth::AuthStudent;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::attendance;
use crate::types::{AttendanceRecord, MonthlySummary, Paginated};

#[derive(Debug, Deserialize)]
pub struct HistoryQuery {
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}

/// GET /api/v1/attendance - Paginated attendance history
pub async fn attendance_get(
    Extension(auth): Extension<AuthStudent>,
    Query(query): Query<HistoryQuery>,
) -> ApiResult<Paginated<AttendanceRecord>> {
    let api = &config::config().api;
    let page = query.page.unwrap_or(1).max(1);
    let page_size = query
        .page_size
        .unwrap_or(api.page_size_default)
        .clamp(1, api.page_size_max);

    let history = attendance::get_history(auth.student_id, page, page_size).await?;
    Ok(ApiResponse::success(history))
}

/// GET /api/v1/attendance/absences - Absences only
pub async fn attendance_absences_get(
    Extension(auth): Extension<AuthStudent>,
) -> ApiResult<Vec<AttendanceRecord>> {
    let absences = attendance::get_absences(auth.student_id).await?;
    Ok(ApiResponse::success(absences))
}

/// GET /api/v1/attendance/summary/:year/:month - Monthly summary
pub async fn attendance_summary_get(
    Extension(auth): Extension<AuthStudent>,
    Path((year, month)): Path<(i32, u32)>,
) -> ApiResult<MonthlySummary> {
    if !(1..=12).contains(&month) || !(1..=9999).contains(&year) {
        return Err(ApiError::bad_request("Invalid year or month"));
    }

    let summary = attendance::get_monthly_summary(auth.student_id, year, month).await?;
    Ok(ApiResponse::success(summary))
}
