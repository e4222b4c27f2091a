use serde_json::Value;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::types::Benefit;

/// Get the student's social benefit enrollments.
///
/// Enrollments are keyed by the student's enrollment number rather than the
/// student id - the benefit registry is imported from an external system.
pub async fn get_benefits(student_id: Uuid) -> Result<Vec<Benefit>, ApiError> {
    let pool = DatabaseManager::pool()?;

    let enrollment_number: Option<String> =
        sqlx::query_scalar("SELECT enrollment_number FROM students WHERE id = $1")
            .bind(student_id)
            .fetch_optional(&pool)
            .await?;

    let Some(enrollment_number) = enrollment_number else {
        return Ok(Vec::new());
    };

    let rows: Vec<(Uuid, Option<Value>, Option<String>)> = sqlx::query_as(
        "SELECT e.id, e.payment_details, p.name
         FROM benefit_enrollments e
         LEFT JOIN benefit_programs p ON p.id = e.program_id
         WHERE e.beneficiary_enrollment = $1",
    )
    .bind(enrollment_number)
    .fetch_all(&pool)
    .await?;

    Ok(rows
        .into_iter()
        .map(|(id, payment_details, program_name)| benefit_from_row(id, payment_details, program_name))
        .collect())
}

/// Unpack the free-form payment details blob into the benefit DTO
fn benefit_from_row(id: Uuid, payment_details: Option<Value>, program_name: Option<String>) -> Benefit {
    let details = payment_details.unwrap_or(Value::Null);
    let text = |key: &str| details.get(key).and_then(Value::as_str).map(str::to_string);

    Benefit {
        id,
        program_name: program_name.unwrap_or_else(|| "Program".to_string()),
        status: text("status").unwrap_or_else(|| "Active".to_string()),
        amount: details.get("amount").and_then(Value::as_f64),
        paid_on: text("paid_on"),
        guardian_name: text("guardian_name"),
        guardian_tax_id: text("guardian_tax_id"),
        bank: text("bank"),
        branch: text("branch"),
        account: text("account"),
    }
}
