//! Filter, sort and pagination parameters for the admin dashboard endpoint.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SortOrder {
    Asc,
    Desc,
}

impl SortOrder {
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "asc" | "ascending" => Some(SortOrder::Asc),
            "desc" | "descending" => Some(SortOrder::Desc),
            _ => None,
        }
    }
}

/// Every field is optional; unset fields are left off the query string.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DashboardParams {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub session_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub term_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub page: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub limit: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub school_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub class_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gender: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lga_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_by: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub sort_order: Option<SortOrder>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_students: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub include_performance: Option<bool>,
}

impl DashboardParams {
    /// True when no field carries a value. Empty strings count as unset.
    pub fn is_empty(&self) -> bool {
        fn blank(v: &Option<String>) -> bool {
            v.as_deref().map(|s| s.trim().is_empty()).unwrap_or(true)
        }

        blank(&self.session_id)
            && blank(&self.term_id)
            && self.page.is_none()
            && self.limit.is_none()
            && blank(&self.search)
            && blank(&self.school_id)
            && blank(&self.class_id)
            && blank(&self.gender)
            && blank(&self.lga_id)
            && blank(&self.sort_by)
            && self.sort_order.is_none()
            && self.include_students.is_none()
            && self.include_performance.is_none()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_params_are_empty() {
        assert!(DashboardParams::default().is_empty());

        let blank = DashboardParams {
            search: Some("   ".to_string()),
            ..Default::default()
        };
        assert!(blank.is_empty());
    }

    #[test]
    fn test_any_value_makes_params_non_empty() {
        let paged = DashboardParams {
            page: Some(2),
            ..Default::default()
        };
        assert!(!paged.is_empty());

        let flagged = DashboardParams {
            include_performance: Some(false),
            ..Default::default()
        };
        assert!(!flagged.is_empty());
    }

    #[test]
    fn test_serializes_camel_case_without_unset_fields() {
        let params = DashboardParams {
            term_id: Some("t2".to_string()),
            sort_order: Some(SortOrder::Desc),
            ..Default::default()
        };
        let json = serde_json::to_value(&params).unwrap();
        assert_eq!(json, serde_json::json!({"termId": "t2", "sortOrder": "desc"}));
    }

    #[test]
    fn test_parse_sort_order() {
        assert_eq!(SortOrder::parse("DESC"), Some(SortOrder::Desc));
        assert_eq!(SortOrder::parse("ascending"), Some(SortOrder::Asc));
        assert_eq!(SortOrder::parse("sideways"), None);
    }
}
