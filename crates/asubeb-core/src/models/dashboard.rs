//! Canonical admin dashboard payload and the ingestion normalizer.
//!
//! The backend has shipped several shapes of the same data over time
//! (`data.schools` vs `schools`, `performance.topStudents` vs `topStudents`
//! vs `data.students`). Every shape is resolved here, once, when a response
//! is accepted into the cache. The lookup orders below are the single source
//! of truth; the first candidate that is present and non-empty wins.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

type Path = &'static [&'static str];

pub const SCHOOL_PATHS: &[Path] = &[&["data", "schools"], &["schools"]];
pub const LGA_PATHS: &[Path] = &[&["data", "lgas"], &["lgas"]];
pub const CLASS_PATHS: &[Path] = &[&["data", "classes"], &["classes"]];
pub const SUBJECT_PATHS: &[Path] = &[&["data", "subjects"], &["subjects"]];
pub const GENDER_PATHS: &[Path] = &[&["data", "genders"], &["genders"]];
pub const PERFORMANCE_PATHS: &[Path] = &[
    &["performance", "topStudents"],
    &["topStudents"],
    &["data", "students"],
];
pub const STUDENT_PATHS: &[Path] = &[&["data", "students"], &["students"]];
pub const SESSION_PATHS: &[Path] = &[
    &["data", "currentSession"],
    &["currentSession"],
    &["session"],
];
pub const TERM_PATHS: &[Path] = &[&["data", "currentTerm"], &["currentTerm"], &["term"]];
pub const PAGINATION_PATHS: &[Path] = &[
    &["data", "pagination"],
    &["pagination"],
    &["data", "students", "pagination"],
];
pub const SUMMARY_PATHS: &[Path] = &[&["data", "summary"], &["summary"], &["stats"]];

/// Used when the payload carries no gender list of its own.
pub const DEFAULT_GENDERS: &[&str] = &["MALE", "FEMALE"];

const ID_KEYS: &[&str] = &["id", "_id", "value"];
const NAME_KEYS: &[&str] = &["name", "title", "label"];
const LIST_KEYS: &[&str] = &["items", "data", "students", "rows"];

/// A lookup entity (school, LGA, class, subject, session, term).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Reference {
    pub id: String,
    pub name: String,
    /// Fields the dashboard doesn't interpret, kept for display.
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl Reference {
    pub fn new(id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            name: name.into(),
            extra: Map::new(),
        }
    }

    /// Accepts `{id, name, ...}` objects with string or numeric ids, or a bare string.
    pub fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) if !s.trim().is_empty() => Some(Self::new(s.clone(), s.clone())),
            Value::Object(obj) => {
                let id_field = keyed_text(value, ID_KEYS);
                let name_field = keyed_text(value, NAME_KEYS);
                if id_field.is_none() && name_field.is_none() {
                    return None;
                }
                // Only the keys that supplied id and name are consumed.
                let used = [id_field.as_ref(), name_field.as_ref()].map(|f| f.map(|(k, _)| *k));
                let extra = obj
                    .iter()
                    .filter(|(k, _)| !used.contains(&Some(k.as_str())))
                    .map(|(k, v)| (k.clone(), v.clone()))
                    .collect();
                let id = id_field.map(|(_, v)| v);
                let name = name_field.map(|(_, v)| v);
                Some(Self {
                    id: id.clone().or_else(|| name.clone()).unwrap_or_default(),
                    name: name.or(id).unwrap_or_default(),
                    extra,
                })
            }
            _ => None,
        }
    }
}

/// One student row with an aggregate score, as reported by the backend.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StudentScore {
    pub position: Option<u32>,
    pub student_name: String,
    pub exam_number: String,
    pub school: String,
    pub class: String,
    pub gender: String,
    pub total_score: f64,
}

const POSITION_KEYS: &[&str] = &["position", "rank"];
const STUDENT_NAME_KEYS: &[&str] = &["studentName", "name", "fullName"];
const EXAM_NUMBER_KEYS: &[&str] = &["examNumber", "examNo"];
const SCHOOL_NAME_KEYS: &[&str] = &["school", "schoolName"];
const CLASS_NAME_KEYS: &[&str] = &["class", "className"];
const GENDER_KEYS: &[&str] = &["gender", "sex"];
const TOTAL_SCORE_KEYS: &[&str] = &["totalScore", "total"];

impl StudentScore {
    /// Lenient conversion: missing fields default, numbers may arrive as strings,
    /// and nested `{name}` objects are flattened to their name.
    pub fn from_value(value: &Value) -> Option<Self> {
        if !value.is_object() {
            return None;
        }
        Some(Self {
            position: number(value, POSITION_KEYS)
                .filter(|p| *p >= 1.0)
                .map(|p| p as u32),
            student_name: text(value, STUDENT_NAME_KEYS).unwrap_or_default(),
            exam_number: text(value, EXAM_NUMBER_KEYS).unwrap_or_default(),
            school: text(value, SCHOOL_NAME_KEYS).unwrap_or_default(),
            class: text(value, CLASS_NAME_KEYS).unwrap_or_default(),
            gender: text(value, GENDER_KEYS).unwrap_or_default(),
            total_score: number(value, TOTAL_SCORE_KEYS).unwrap_or(0.0),
        })
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Pagination {
    pub page: Option<u64>,
    pub limit: Option<u64>,
    pub total: Option<u64>,
    pub total_pages: Option<u64>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct StudentPage {
    pub items: Vec<StudentScore>,
    pub pagination: Pagination,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardSummary {
    pub total_students: Option<u64>,
    pub total_schools: Option<u64>,
    pub total_lgas: Option<u64>,
    pub total_teachers: Option<u64>,
    pub total_classes: Option<u64>,
}

/// The admin dashboard after normalization.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardPayload {
    pub current_session: Option<Reference>,
    pub current_term: Option<Reference>,
    pub schools: Vec<Reference>,
    pub lgas: Vec<Reference>,
    pub classes: Vec<Reference>,
    pub subjects: Vec<Reference>,
    pub genders: Vec<String>,
    pub students: StudentPage,
    pub summary: DashboardSummary,
    pub top_students: Vec<StudentScore>,
}

impl DashboardPayload {
    /// Resolve a raw `data` field from the dashboard envelope into the canonical shape.
    pub fn normalize(raw: &Value) -> Self {
        let genders = first_list(raw, GENDER_PATHS)
            .map(|items| items.iter().filter_map(|v| text_of(v, NAME_KEYS)).collect::<Vec<_>>())
            .filter(|g| !g.is_empty())
            .unwrap_or_else(|| DEFAULT_GENDERS.iter().map(|g| g.to_string()).collect());

        Self {
            current_session: first_reference(raw, SESSION_PATHS),
            current_term: first_reference(raw, TERM_PATHS),
            schools: references(raw, SCHOOL_PATHS),
            lgas: references(raw, LGA_PATHS),
            classes: references(raw, CLASS_PATHS),
            subjects: references(raw, SUBJECT_PATHS),
            genders,
            students: StudentPage {
                items: scores(raw, STUDENT_PATHS),
                pagination: pagination(raw),
            },
            summary: summary(raw),
            top_students: scores(raw, PERFORMANCE_PATHS),
        }
    }
}

// ===== Path probing =====

fn lookup<'a>(root: &'a Value, path: &[&str]) -> Option<&'a Value> {
    path.iter().try_fold(root, |node, key| node.get(key))
}

/// A list is either a JSON array or a paginated object wrapping one.
fn as_list(value: &Value) -> Option<&Vec<Value>> {
    match value {
        Value::Array(items) => Some(items),
        Value::Object(_) => LIST_KEYS
            .iter()
            .find_map(|k| value.get(k).and_then(Value::as_array)),
        _ => None,
    }
}

fn first_list<'a>(root: &'a Value, paths: &[Path]) -> Option<&'a Vec<Value>> {
    paths
        .iter()
        .filter_map(|p| lookup(root, p).and_then(as_list))
        .find(|items| !items.is_empty())
}

fn references(root: &Value, paths: &[Path]) -> Vec<Reference> {
    first_list(root, paths)
        .map(|items| items.iter().filter_map(Reference::from_value).collect())
        .unwrap_or_default()
}

fn scores(root: &Value, paths: &[Path]) -> Vec<StudentScore> {
    first_list(root, paths)
        .map(|items| items.iter().filter_map(StudentScore::from_value).collect())
        .unwrap_or_default()
}

fn first_reference(root: &Value, paths: &[Path]) -> Option<Reference> {
    paths
        .iter()
        .filter_map(|p| lookup(root, p))
        .find_map(Reference::from_value)
}

fn pagination(root: &Value) -> Pagination {
    PAGINATION_PATHS
        .iter()
        .filter_map(|p| lookup(root, p))
        .find(|v| v.is_object())
        .map(|v| Pagination {
            page: count(v, &["page", "currentPage"]),
            limit: count(v, &["limit", "pageSize"]),
            total: count(v, &["total", "totalItems", "totalCount"]),
            total_pages: count(v, &["totalPages", "pages"]),
        })
        .unwrap_or_default()
}

fn summary(root: &Value) -> DashboardSummary {
    SUMMARY_PATHS
        .iter()
        .filter_map(|p| lookup(root, p))
        .find(|v| v.is_object())
        .map(|v| DashboardSummary {
            total_students: count(v, &["totalStudents", "students"]),
            total_schools: count(v, &["totalSchools", "schools"]),
            total_lgas: count(v, &["totalLgas", "lgas"]),
            total_teachers: count(v, &["totalTeachers", "teachers"]),
            total_classes: count(v, &["totalClasses", "classes"]),
        })
        .unwrap_or_default()
}

// ===== Scalar extraction =====

/// Text of a scalar, or the name of a nested reference object.
fn text_of(value: &Value, name_keys: &[&str]) -> Option<String> {
    match value {
        Value::String(s) if !s.trim().is_empty() => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Object(_) => text(value, name_keys),
        _ => None,
    }
}

fn text(value: &Value, keys: &[&str]) -> Option<String> {
    keyed_text(value, keys).map(|(_, text)| text)
}

/// Like `text`, also reporting which key supplied the value.
fn keyed_text<'k>(value: &Value, keys: &[&'k str]) -> Option<(&'k str, String)> {
    keys.iter()
        .find_map(|k| value.get(k).and_then(|v| text_of(v, NAME_KEYS)).map(|t| (*k, t)))
}

fn number(value: &Value, keys: &[&str]) -> Option<f64> {
    keys.iter().filter_map(|k| value.get(k)).find_map(|v| match v {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse::<f64>().ok(),
        _ => None,
    })
}

fn count(value: &Value, keys: &[&str]) -> Option<u64> {
    number(value, keys).filter(|n| *n >= 0.0).map(|n| n as u64)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_nested_collections_win_over_legacy() {
        let raw = json!({
            "data": {"schools": [{"id": "n1", "name": "Nested School"}]},
            "schools": [{"id": "l1", "name": "Legacy School"}]
        });
        let payload = DashboardPayload::normalize(&raw);
        assert_eq!(payload.schools, vec![Reference::new("n1", "Nested School")]);
    }

    #[test]
    fn test_empty_nested_collection_falls_back_to_legacy() {
        let raw = json!({
            "data": {"lgas": []},
            "lgas": [{"id": 7, "name": "Umuahia North"}]
        });
        let payload = DashboardPayload::normalize(&raw);
        assert_eq!(payload.lgas, vec![Reference::new("7", "Umuahia North")]);
        assert!(payload.classes.is_empty());
    }

    #[test]
    fn test_reference_keeps_unknown_fields() {
        let school = Reference::from_value(&json!({"_id": "s9", "name": "Ohafia High", "lga": "Ohafia"}))
            .unwrap();
        assert_eq!(school.id, "s9");
        assert_eq!(school.extra.get("lga"), Some(&json!("Ohafia")));
        assert!(Reference::from_value(&json!({"code": 3})).is_none());
    }

    #[test]
    fn test_reference_keeps_unused_aliases() {
        let subject = Reference::from_value(&json!({
            "id": "m1",
            "name": "Mathematics",
            "title": "General Mathematics",
            "value": 12
        }))
        .unwrap();
        assert_eq!(subject.id, "m1");
        assert_eq!(subject.name, "Mathematics");
        assert_eq!(subject.extra.get("title"), Some(&json!("General Mathematics")));
        assert_eq!(subject.extra.get("value"), Some(&json!(12)));
        assert!(!subject.extra.contains_key("id"));
        assert!(!subject.extra.contains_key("name"));

        // An empty primary key falls through to the alias, which is then consumed.
        let lga = Reference::from_value(&json!({"_id": "l3", "name": "", "label": "Aba South"})).unwrap();
        assert_eq!(lga.name, "Aba South");
        assert!(!lga.extra.contains_key("label"));
        assert_eq!(lga.extra.get("name"), Some(&json!("")));
    }

    #[test]
    fn test_performance_lookup_order() {
        let both = json!({
            "performance": {"topStudents": [{"studentName": "First"}]},
            "topStudents": [{"studentName": "Second"}]
        });
        assert_eq!(DashboardPayload::normalize(&both).top_students[0].student_name, "First");

        let legacy = json!({"topStudents": [{"studentName": "Second"}]});
        assert_eq!(DashboardPayload::normalize(&legacy).top_students[0].student_name, "Second");

        let students_only = json!({"data": {"students": {"items": [{"name": "Third"}], "pagination": {"page": 1}}}});
        let payload = DashboardPayload::normalize(&students_only);
        assert_eq!(payload.top_students[0].student_name, "Third");
        assert_eq!(payload.students.items.len(), 1);
        assert_eq!(payload.students.pagination.page, Some(1));
    }

    #[test]
    fn test_student_score_is_lenient() {
        let score = StudentScore::from_value(&json!({
            "name": "Ada",
            "examNo": "ABS/001",
            "schoolName": {"id": "s1", "name": "Aba Grammar"},
            "className": "JSS3",
            "gender": "FEMALE",
            "totalScore": "455.5"
        }))
        .unwrap();
        assert_eq!(score.student_name, "Ada");
        assert_eq!(score.exam_number, "ABS/001");
        assert_eq!(score.school, "Aba Grammar");
        assert_eq!(score.total_score, 455.5);
        assert_eq!(score.position, None);
    }

    #[test]
    fn test_session_term_and_summary() {
        let raw = json!({
            "data": {
                "currentSession": {"id": 3, "name": "2024/2025"},
                "summary": {"totalStudents": 1200, "totalSchools": "14"}
            },
            "currentTerm": "Second Term"
        });
        let payload = DashboardPayload::normalize(&raw);
        assert_eq!(payload.current_session, Some(Reference::new("3", "2024/2025")));
        assert_eq!(payload.current_term, Some(Reference::new("Second Term", "Second Term")));
        assert_eq!(payload.summary.total_students, Some(1200));
        assert_eq!(payload.summary.total_schools, Some(14));
        assert_eq!(payload.summary.total_teachers, None);
    }

    #[test]
    fn test_genders_default_when_absent() {
        let payload = DashboardPayload::normalize(&json!({}));
        assert_eq!(payload.genders, vec!["MALE", "FEMALE"]);

        let payload = DashboardPayload::normalize(&json!({"genders": ["F"]}));
        assert_eq!(payload.genders, vec!["F"]);
    }

    #[test]
    fn test_malformed_payload_normalizes_to_defaults() {
        let payload = DashboardPayload::normalize(&json!("not an object"));
        assert!(payload.schools.is_empty());
        assert!(payload.top_students.is_empty());
        assert_eq!(payload.current_session, None);
    }
}
