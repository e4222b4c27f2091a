use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::types::{Certificate, CreateCertificate};

/// Get the student's medical certificates, newest first
pub async fn get_certificates(student_id: Uuid) -> Result<Vec<Certificate>, ApiError> {
    let pool = DatabaseManager::pool()?;

    let certificates = sqlx::query_as(
        "SELECT id, student_id, starts_on, ends_on, description, status, created_at
         FROM medical_certificates
         WHERE student_id = $1
         ORDER BY created_at DESC",
    )
    .bind(student_id)
    .fetch_all(&pool)
    .await?;

    Ok(certificates)
}

/// Submit a new medical certificate; review starts in `pending`
pub async fn create_certificate(
    student_id: Uuid,
    school_id: Uuid,
    input: CreateCertificate,
) -> Result<Certificate, ApiError> {
    let pool = DatabaseManager::pool()?;

    let certificate = sqlx::query_as(
        "INSERT INTO medical_certificates
            (student_id, school_id, starts_on, ends_on, description, status)
         VALUES ($1, $2, $3, $4, $5, 'pending')
         RETURNING id, student_id, starts_on, ends_on, description, status, created_at",
    )
    .bind(student_id)
    .bind(school_id)
    .bind(input.starts_on)
    .bind(input.ends_on)
    .bind(input.description)
    .fetch_one(&pool)
    .await?;

    Ok(certificate)
}
