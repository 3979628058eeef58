//! Plain-text rendering of dashboard data.

use std::fmt::Write;

use asubeb_core::models::{DashboardPayload, DerivedStudentsPayload, Reference};
use asubeb_core::utils::{format_percentage, format_score, truncate_string};

const NAME_WIDTH: usize = 24;
const SCHOOL_WIDTH: usize = 24;

fn reference_name(reference: &Option<Reference>) -> &str {
    reference.as_ref().map(|r| r.name.as_str()).unwrap_or("-")
}

fn count(value: Option<u64>, fallback: usize) -> String {
    value.unwrap_or(fallback as u64).to_string()
}

pub fn dashboard(payload: &DashboardPayload) -> String {
    let mut out = String::new();
    let s = &payload.summary;

    let _ = writeln!(
        out,
        "Session: {}    Term: {}",
        reference_name(&payload.current_session),
        reference_name(&payload.current_term)
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Students  {:>8}", count(s.total_students, payload.students.items.len()));
    let _ = writeln!(out, "Schools   {:>8}", count(s.total_schools, payload.schools.len()));
    let _ = writeln!(out, "LGAs      {:>8}", count(s.total_lgas, payload.lgas.len()));
    let _ = writeln!(out, "Classes   {:>8}", count(s.total_classes, payload.classes.len()));
    if let Some(teachers) = s.total_teachers {
        let _ = writeln!(out, "Teachers  {:>8}", teachers);
    }
    let _ = writeln!(out, "Subjects  {:>8}", payload.subjects.len());

    let page = &payload.students.pagination;
    if let (Some(current), Some(pages)) = (page.page, page.total_pages) {
        let _ = writeln!(out, "\nStudent list page {} of {}", current, pages);
    }

    if !payload.top_students.is_empty() {
        let _ = writeln!(out, "\nTop students:");
        for (i, student) in payload.top_students.iter().take(5).enumerate() {
            let _ = writeln!(
                out,
                "  {}. {} ({}) - {}",
                student.position.unwrap_or(i as u32 + 1),
                student.student_name,
                student.school,
                format_score(student.total_score)
            );
        }
    }
    out
}

pub fn students(view: &DerivedStudentsPayload) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "Session: {}    Term: {}",
        reference_name(&view.session),
        reference_name(&view.term)
    );

    if view.performance_table.is_empty() {
        let _ = writeln!(out, "\nNo performance records.");
        return out;
    }

    let _ = writeln!(
        out,
        "\n{:>4}  {:<name$}  {:<12}  {:<school$}  {:<6}  {:<6}  {:>6}  {:>7}  {:>7}",
        "Pos", "Student", "Exam No", "School", "Class", "Gender", "Total", "Average", "Percent",
        name = NAME_WIDTH,
        school = SCHOOL_WIDTH
    );
    for r in &view.performance_table {
        let _ = writeln!(
            out,
            "{:>4}  {:<name$}  {:<12}  {:<school$}  {:<6}  {:<6}  {:>6}  {:>7}  {:>7}",
            r.position,
            truncate_string(&r.student_name, NAME_WIDTH),
            truncate_string(&r.exam_no, 12),
            truncate_string(&r.school, SCHOOL_WIDTH),
            truncate_string(&r.class, 6),
            truncate_string(&r.gender, 6),
            format_score(r.total),
            format_score(r.average),
            format_percentage(r.percentage),
            name = NAME_WIDTH,
            school = SCHOOL_WIDTH
        );
    }
    let _ = writeln!(
        out,
        "\n{} schools, {} LGAs, {} classes, {} subjects",
        view.schools.len(),
        view.lgas.len(),
        view.classes.len(),
        view.subjects.len()
    );
    out
}
