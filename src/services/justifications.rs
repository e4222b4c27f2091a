use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::types::{CreateJustification, Justification};

/// Get the student's absence justifications, newest first
pub async fn get_justifications(
    student_id: Uuid,
    school_id: Uuid,
) -> Result<Vec<Justification>, ApiError> {
    let pool = DatabaseManager::pool()?;

    let justifications = sqlx::query_as(
        "SELECT id, attendance_id, reason, created_at
         FROM absence_justifications
         WHERE student_id = $1 AND school_id = $2
         ORDER BY created_at DESC",
    )
    .bind(student_id)
    .bind(school_id)
    .fetch_all(&pool)
    .await?;

    Ok(justifications)
}

/// Submit a justification for one of the student's own attendance records
pub async fn create_justification(
    student_id: Uuid,
    school_id: Uuid,
    input: CreateJustification,
) -> Result<Justification, ApiError> {
    let pool = DatabaseManager::pool()?;

    // The referenced record must belong to this student
    let owned: Option<Uuid> = sqlx::query_scalar(
        "SELECT id FROM attendance_records WHERE id = $1 AND student_id = $2",
    )
    .bind(input.attendance_id)
    .bind(student_id)
    .fetch_optional(&pool)
    .await?;

    if owned.is_none() {
        return Err(ApiError::not_found(
            "Attendance record not found for this student",
        ));
    }

    let justification = sqlx::query_as(
        "INSERT INTO absence_justifications (attendance_id, student_id, school_id, reason)
         VALUES ($1, $2, $3, $4)
         RETURNING id, attendance_id, reason, created_at",
    )
    .bind(input.attendance_id)
    .bind(student_id)
    .bind(school_id)
    .bind(input.reason)
    .fetch_one(&pool)
    .await?;

    Ok(justification)
}
