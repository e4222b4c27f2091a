use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::services::student::attendance_rate;
use crate::types::{AttendanceRecord, MonthlySummary, Paginated};

/// Get paginated attendance history, newest first
pub async fn get_history(
    student_id: Uuid,
    page: i64,
    page_size: i64,
) -> Result<Paginated<AttendanceRecord>, ApiError> {
    let pool = DatabaseManager::pool()?;
    let offset = (page - 1) * page_size;

    let total: i64 =
        sqlx::query_scalar("SELECT COUNT(*) FROM attendance_records WHERE student_id = $1")
            .bind(student_id)
            .fetch_one(&pool)
            .await?;

    let records: Vec<AttendanceRecord> = sqlx::query_as(
        "SELECT a.id, a.record_date, a.present, a.justified,
                COALESCE(c.name, 'Unassigned') AS class_name
         FROM attendance_records a
         LEFT JOIN classes c ON c.id = a.class_id
         WHERE a.student_id = $1
         ORDER BY a.record_date DESC
         LIMIT $2 OFFSET $3",
    )
    .bind(student_id)
    .bind(page_size)
    .bind(offset)
    .fetch_all(&pool)
    .await?;

    let has_more = has_more(offset, records.len(), total);
    Ok(Paginated {
        data: records,
        page,
        page_size,
        total,
        has_more,
    })
}

/// Get only absences, newest first
pub async fn get_absences(student_id: Uuid) -> Result<Vec<AttendanceRecord>, ApiError> {
    let pool = DatabaseManager::pool()?;

    let records = sqlx::query_as(
        "SELECT a.id, a.record_date, a.present, a.justified,
                COALESCE(c.name, 'Unassigned') AS class_name
         FROM attendance_records a
         LEFT JOIN classes c ON c.id = a.class_id
         WHERE a.student_id = $1 AND NOT a.present
         ORDER BY a.record_date DESC",
    )
    .bind(student_id)
    .fetch_all(&pool)
    .await?;

    Ok(records)
}

/// Whether rows remain past the current page
fn has_more(offset: i64, returned: usize, total: i64) -> bool {
    offset + (returned as i64) < total
}

/// Aggregate one calendar month of attendance
pub async fn get_monthly_summary(
    student_id: Uuid,
    year: i32,
    month: u32,
) -> Result<MonthlySummary, ApiError> {
    let pool = DatabaseManager::pool()?;

    let (total_classes, attended, justified_absences): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*),
                COUNT(*) FILTER (WHERE present),
                COUNT(*) FILTER (WHERE NOT present AND justified)
         FROM attendance_records
         WHERE student_id = $1
           AND record_date >= make_date($2, $3, 1)
           AND record_date < make_date($2, $3, 1) + INTERVAL '1 month'",
    )
    .bind(student_id)
    .bind(year)
    .bind(month as i32)
    .fetch_one(&pool)
    .await?;

    let absences = total_classes - attended;
    Ok(MonthlySummary {
        year,
        month,
        total_classes,
        attended,
        absences,
        justified_absences,
        attendance_rate: attendance_rate(total_classes, absences),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn has_more_tracks_remaining_rows() {
        // page 1 of 3 (page_size 20, 50 rows total)
        assert!(has_more(0, 20, 50));
        // page 3 returns the last 10 rows
        assert!(!has_more(40, 10, 50));
        // short page with rows still remaining
        assert!(has_more(40, 5, 50));
        // past the end: empty page
        assert!(!has_more(60, 0, 50));
        // empty table
        assert!(!has_more(0, 0, 0));
    }
}
