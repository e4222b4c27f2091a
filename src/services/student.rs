use sqlx::Row;
use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::types::{AttendanceBand, AttendanceStats, StudentProfile};

/// Get student basic data with class name
pub async fn get_profile(student_id: Uuid) -> Result<StudentProfile, ApiError> {
    let pool = DatabaseManager::pool()?;

    let row = sqlx::query(
        "SELECT s.id, s.name, s.enrollment_number, s.class_id, s.school_id,
                s.guardian_name, s.guardian_phone, s.address, c.name AS class_name
         FROM students s
         LEFT JOIN classes c ON c.id = s.class_id
         WHERE s.id = $1",
    )
    .bind(student_id)
    .fetch_one(&pool)
    .await?;

    Ok(StudentProfile {
        id: row.try_get("id")?,
        name: row.try_get("name")?,
        enrollment_number: row.try_get("enrollment_number")?,
        class_name: row
            .try_get::<Option<String>, _>("class_name")?
            .unwrap_or_else(|| "Unassigned".to_string()),
        class_id: row.try_get("class_id")?,
        school_id: row.try_get("school_id")?,
        guardian_name: row.try_get("guardian_name")?,
        guardian_phone: row.try_get("guardian_phone")?,
        address: row.try_get("address")?,
    })
}

/// Get student attendance statistics across all recorded classes
pub async fn get_attendance_stats(student_id: Uuid) -> Result<AttendanceStats, ApiError> {
    let pool = DatabaseManager::pool()?;

    let (total_classes, total_absences, justified_absences): (i64, i64, i64) = sqlx::query_as(
        "SELECT COUNT(*),
                COUNT(*) FILTER (WHERE NOT present),
                COUNT(*) FILTER (WHERE NOT present AND justified)
         FROM attendance_records
         WHERE student_id = $1",
    )
    .bind(student_id)
    .fetch_one(&pool)
    .await?;

    let rate = attendance_rate(total_classes, total_absences);

    Ok(AttendanceStats {
        attendance_rate: rate,
        total_classes,
        total_absences,
        justified_absences,
        status: band_for(rate),
    })
}

#[derive(Debug, Default)]
pub struct UpdateDetails {
    pub guardian_name: Option<String>,
    pub guardian_phone: Option<String>,
    pub address: Option<String>,
}

impl UpdateDetails {
    pub fn is_empty(&self) -> bool {
        self.guardian_name.is_none() && self.guardian_phone.is_none() && self.address.is_none()
    }
}

/// Update the allow-listed contact fields of a student record
pub async fn update_details(student_id: Uuid, details: UpdateDetails) -> Result<(), ApiError> {
    let pool = DatabaseManager::pool()?;

    let result = sqlx::query(
        "UPDATE students
         SET guardian_name = COALESCE($2, guardian_name),
             guardian_phone = COALESCE($3, guardian_phone),
             address = COALESCE($4, address),
             details_updated_at = NOW()
         WHERE id = $1",
    )
    .bind(student_id)
    .bind(details.guardian_name)
    .bind(details.guardian_phone)
    .bind(details.address)
    .execute(&pool)
    .await?;

    if result.rows_affected() == 0 {
        return Err(ApiError::not_found("Student not found"));
    }
    Ok(())
}

/// Percentage of classes attended, rounded to the nearest whole number.
/// A student with no recorded classes counts as fully present.
pub fn attendance_rate(total_classes: i64, total_absences: i64) -> u32 {
    if total_classes <= 0 {
        return 100;
    }
    let attended = (total_classes - total_absences).max(0) as f64;
    ((attended / total_classes as f64) * 100.0).round() as u32
}

pub fn band_for(rate: u32) -> AttendanceBand {
    match rate {
        0..=74 => AttendanceBand::Critical,
        75..=84 => AttendanceBand::Warning,
        85..=99 => AttendanceBand::Regular,
        _ => AttendanceBand::Excellent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rate_is_full_with_no_classes() {
        assert_eq!(attendance_rate(0, 0), 100);
    }

    #[test]
    fn rate_rounds_to_nearest_percent() {
        assert_eq!(attendance_rate(3, 1), 67);
        assert_eq!(attendance_rate(200, 15), 93);
        assert_eq!(attendance_rate(10, 10), 0);
    }

    #[test]
    fn bands_follow_thresholds() {
        assert_eq!(band_for(100), AttendanceBand::Excellent);
        assert_eq!(band_for(99), AttendanceBand::Regular);
        assert_eq!(band_for(85), AttendanceBand::Regular);
        assert_eq!(band_for(84), AttendanceBand::Warning);
        assert_eq!(band_for(75), AttendanceBand::Warning);
        assert_eq!(band_for(74), AttendanceBand::Critical);
        assert_eq!(band_for(0), AttendanceBand::Critical);
    }

    #[test]
    fn empty_update_is_detected() {
        assert!(UpdateDetails::default().is_empty());
        assert!(!UpdateDetails { address: Some("Elm St 1".into()), ..Default::default() }.is_empty());
    }
}
