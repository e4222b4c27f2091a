use axum::{Extension, Json};

use crate::error::ApiError;
use crate::middleware::auth::AuthStudent;
use crate::middleware::response::{ApiResponse, ApiResult};
use crate::services::certificates;
use crate::types::{Certificate, CreateCertificate};

/// GET /api/v1/certificates - The student's medical certificates
pub async fn certificates_get(
    Extension(auth): Extension<AuthStudent>,
) -> ApiResult<Vec<Certificate>> {
    let certificates = certificates::get_certificates(auth.student_id).await?;
    Ok(ApiResponse::success(certificates))
}

/// POST /api/v1/certificates - Submit a new medical certificate
pub async fn certificates_post(
    Extension(auth): Extension<AuthStudent>,
    Json(mut input): Json<CreateCertificate>,
) -> ApiResult<Certificate> {
    input.description = input.description.trim().to_string();

    if input.description.is_empty() {
        return Err(ApiError::bad_request("Description is required"));
    }
    if input.ends_on < input.starts_on {
        return Err(ApiError::bad_request(
            "End date cannot be before the start date",
        ));
    }

    let certificate =
        certificates::create_certificate(auth.student_id, auth.school_id, input).await?;
    Ok(ApiResponse::created(certificate).with_message("Certificate submitted"))
}
