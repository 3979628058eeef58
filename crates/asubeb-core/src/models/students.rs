//! The students page view, derived from the admin dashboard without a network call.

use serde::{Deserialize, Serialize};

use super::dashboard::{DashboardPayload, Reference, StudentScore};

/// Number of graded subjects assumed when averaging a student's total.
///
/// Hard-coded by the backend contract as it stands; not derived from the
/// dashboard's subject list.
pub const GRADED_SUBJECT_COUNT: f64 = 7.0;

/// Maximum score per subject.
pub const MAX_SUBJECT_SCORE: f64 = 100.0;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PerformanceRecord {
    pub position: u32,
    pub student_name: String,
    pub exam_no: String,
    pub school: String,
    pub class: String,
    pub total: f64,
    pub average: f64,
    pub percentage: f64,
    pub gender: String,
}

impl PerformanceRecord {
    /// `index` is the zero-based row, used when the backend sends no position.
    pub fn from_score(index: usize, score: &StudentScore) -> Self {
        let total = score.total_score;
        Self {
            position: score.position.unwrap_or(index as u32 + 1),
            student_name: score.student_name.clone(),
            exam_no: score.exam_number.clone(),
            school: score.school.clone(),
            class: score.class.clone(),
            total,
            average: total / GRADED_SUBJECT_COUNT,
            percentage: total / (GRADED_SUBJECT_COUNT * MAX_SUBJECT_SCORE) * 100.0,
            gender: score.gender.clone(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DerivedStudentsPayload {
    pub session: Option<Reference>,
    pub term: Option<Reference>,
    pub performance_table: Vec<PerformanceRecord>,
    pub lgas: Vec<Reference>,
    pub schools: Vec<Reference>,
    pub classes: Vec<Reference>,
    pub subjects: Vec<Reference>,
    pub genders: Vec<String>,
}

impl DerivedStudentsPayload {
    pub fn from_dashboard(dashboard: &DashboardPayload) -> Self {
        Self {
            session: dashboard.current_session.clone(),
            term: dashboard.current_term.clone(),
            performance_table: dashboard
                .top_students
                .iter()
                .enumerate()
                .map(|(i, s)| PerformanceRecord::from_score(i, s))
                .collect(),
            lgas: dashboard.lgas.clone(),
            schools: dashboard.schools.clone(),
            classes: dashboard.classes.clone(),
            subjects: dashboard.subjects.clone(),
            genders: dashboard.genders.clone(),
        }
    }
}
