//! Response DTOs shared between services and handlers.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

// =====================
// Student
// =====================

#[derive(Debug, Clone, Serialize)]
pub struct StudentProfile {
    pub id: Uuid,
    pub name: String,
    pub enrollment_number: String,
    pub class_name: String,
    pub class_id: Option<Uuid>,
    pub school_id: Uuid,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_phone: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
}

/// Attendance banding shown on the student dashboard
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AttendanceBand {
    Excellent,
    Regular,
    Warning,
    Critical,
}

#[derive(Debug, Clone, Serialize)]
pub struct AttendanceStats {
    /// Percentage of classes attended, rounded
    pub attendance_rate: u32,
    pub total_classes: i64,
    pub total_absences: i64,
    pub justified_absences: i64,
    pub status: AttendanceBand,
}

// =====================
// Attendance
// =====================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct AttendanceRecord {
    pub id: Uuid,
    pub record_date: NaiveDate,
    pub present: bool,
    pub justified: bool,
    pub class_name: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct MonthlySummary {
    pub year: i32,
    pub month: u32,
    pub total_classes: i64,
    pub attended: i64,
    pub absences: i64,
    pub justified_absences: i64,
    pub attendance_rate: u32,
}

// =====================
// Medical certificates
// =====================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Certificate {
    pub id: Uuid,
    pub student_id: Uuid,
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub description: String,
    pub status: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateCertificate {
    pub starts_on: NaiveDate,
    pub ends_on: NaiveDate,
    pub description: String,
}

// =====================
// Absence justifications
// =====================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Justification {
    pub id: Uuid,
    pub attendance_id: Uuid,
    pub reason: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Deserialize)]
pub struct CreateJustification {
    pub attendance_id: Uuid,
    pub reason: String,
}

// =====================
// Grades
// =====================

#[derive(Debug, Clone, Serialize, sqlx::FromRow)]
pub struct Grade {
    pub id: Uuid,
    pub subject_id: Uuid,
    pub subject_name: String,
    pub subject_color: String,
    pub semester: i32,
    pub value: f64,
    pub assessment_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct GradeEntry {
    pub semester: i32,
    pub value: f64,
    pub assessment_type: String,
}

#[derive(Debug, Clone, Serialize)]
pub struct SubjectGrades {
    pub id: Uuid,
    pub name: String,
    pub color: String,
    pub grades: Vec<GradeEntry>,
    /// Mean of "average" assessments, rounded to one decimal
    pub average: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct ReportCard {
    pub subjects: Vec<SubjectGrades>,
}

// =====================
// Benefits
// =====================

#[derive(Debug, Clone, Serialize)]
pub struct Benefit {
    pub id: Uuid,
    pub program_name: String,
    pub status: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub amount: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_on: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub guardian_tax_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bank: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub branch: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub account: Option<String>,
}

// =====================
// School
// =====================

#[derive(Debug, Clone, Serialize)]
pub struct SchoolInfo {
    pub id: Uuid,
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub address: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub phone: Option<String>,
    pub email: String,
    pub primary_color: String,
    pub secondary_color: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub logo_url: Option<String>,
}

// =====================
// Pagination
// =====================

#[derive(Debug, Clone, Serialize)]
pub struct Paginated<T> {
    pub data: Vec<T>,
    pub page: i64,
    pub page_size: i64,
    pub total: i64,
    pub has_more: bool,
}
