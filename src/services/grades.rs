use uuid::Uuid;

use crate::database::manager::DatabaseManager;
use crate::error::ApiError;
use crate::types::{Grade, GradeEntry, ReportCard, SubjectGrades};

const DEFAULT_SUBJECT_COLOR: &str = "#E2E8F0";

/// Assessment type whose entries feed the per-subject average
const AVERAGE_ASSESSMENT: &str = "average";

/// Full report card grouped by subject
pub async fn get_report_card(student_id: Uuid, school_id: Uuid) -> Result<ReportCard, ApiError> {
    let grades = fetch_grades(student_id, school_id, None).await?;
    Ok(build_report_card(grades))
}

/// Grades for one semester
pub async fn get_semester_grades(
    student_id: Uuid,
    school_id: Uuid,
    semester: i32,
) -> Result<Vec<Grade>, ApiError> {
    fetch_grades(student_id, school_id, Some(semester)).await
}

async fn fetch_grades(
    student_id: Uuid,
    school_id: Uuid,
    semester: Option<i32>,
) -> Result<Vec<Grade>, ApiError> {
    let pool = DatabaseManager::pool()?;

    let grades = sqlx::query_as(
        "SELECT g.id, g.subject_id, g.semester, g.value, g.assessment_type,
                COALESCE(s.name, 'Unnamed') AS subject_name,
                COALESCE(s.color, $4) AS subject_color
         FROM grades g
         LEFT JOIN subjects s ON s.id = g.subject_id
         WHERE g.student_id = $1 AND g.school_id = $2
           AND ($3::int IS NULL OR g.semester = $3)
         ORDER BY g.semester ASC",
    )
    .bind(student_id)
    .bind(school_id)
    .bind(semester)
    .bind(DEFAULT_SUBJECT_COLOR)
    .fetch_all(&pool)
    .await?;

    Ok(grades)
}

/// Group grades by subject and compute each subject's average over the
/// `average`-type assessments, rounded to one decimal. Insertion order of
/// subjects follows first appearance (grades arrive ordered by semester).
pub fn build_report_card(grades: Vec<Grade>) -> ReportCard {
    let mut subjects: Vec<SubjectGrades> = Vec::new();

    for grade in grades {
        let entry = GradeEntry {
            semester: grade.semester,
            value: grade.value,
            assessment_type: grade.assessment_type,
        };

        match subjects.iter_mut().find(|s| s.id == grade.subject_id) {
            Some(subject) => subject.grades.push(entry),
            None => subjects.push(SubjectGrades {
                id: grade.subject_id,
                name: grade.subject_name,
                color: grade.subject_color,
                grades: vec![entry],
                average: 0.0,
            }),
        }
    }

    for subject in &mut subjects {
        subject.average = subject_average(&subject.grades);
    }

    ReportCard { subjects }
}

fn subject_average(grades: &[GradeEntry]) -> f64 {
    let averages: Vec<f64> = grades
        .iter()
        .filter(|g| g.assessment_type == AVERAGE_ASSESSMENT)
        .map(|g| g.value)
        .collect();

    if averages.is_empty() {
        return 0.0;
    }
    let mean = averages.iter().sum::<f64>() / averages.len() as f64;
    (mean * 10.0).round() / 10.0
}

#[cfg(test)]
mod tests {
    use super::*;

    fn grade(subject_id: Uuid, semester: i32, value: f64, assessment_type: &str) -> Grade {
        Grade {
            id: Uuid::new_v4(),
            subject_id,
            subject_name: "Mathematics".to_string(),
            subject_color: DEFAULT_SUBJECT_COLOR.to_string(),
            semester,
            value,
            assessment_type: assessment_type.to_string(),
        }
    }

    #[test]
    fn groups_grades_by_subject() {
        let math = Uuid::new_v4();
        let history = Uuid::new_v4();

        let card = build_report_card(vec![
            grade(math, 1, 8.0, "average"),
            grade(history, 1, 6.0, "average"),
            grade(math, 2, 9.0, "average"),
        ]);

        assert_eq!(card.subjects.len(), 2);
        assert_eq!(card.subjects[0].grades.len(), 2);
        assert_eq!(card.subjects[1].grades.len(), 1);
    }

    #[test]
    fn average_uses_only_average_assessments() {
        let math = Uuid::new_v4();

        let card = build_report_card(vec![
            grade(math, 1, 8.0, "average"),
            grade(math, 1, 2.0, "recovery"),
            grade(math, 2, 9.0, "average"),
        ]);

        assert_eq!(card.subjects[0].average, 8.5);
    }

    #[test]
    fn average_rounds_to_one_decimal() {
        let math = Uuid::new_v4();

        let card = build_report_card(vec![
            grade(math, 1, 7.0, "average"),
            grade(math, 2, 8.0, "average"),
            grade(math, 3, 8.0, "average"),
        ]);

        // 23 / 3 = 7.666...
        assert_eq!(card.subjects[0].average, 7.7);
    }

    #[test]
    fn subject_without_average_assessments_scores_zero() {
        let math = Uuid::new_v4();
        let card = build_report_card(vec![grade(math, 1, 9.5, "exam")]);
        assert_eq!(card.subjects[0].average, 0.0);
    }

    #[test]
    fn empty_grades_yield_empty_card() {
        assert!(build_report_card(Vec::new()).subjects.is_empty());
    }
}
