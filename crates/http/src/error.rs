//! Error body shapes returned by the backend
//!
//! The backend answers failures in one of three shapes: an RFC 7807 problem
//! document, a FastAPI `{"detail": "..."}` message, or a FastAPI validation
//! list `{"detail": [{"loc": [...], "msg": "..."}]}`. All of them are
//! normalized into [`ProblemDetails`].

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// `type` used when the backend did not name a problem type
pub const DEFAULT_PROBLEM_TYPE: &str = "about:blank";

/// Normalized error body
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProblemDetails {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    pub status: u16,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub detail: Option<String>,
    /// Field-level validation failures, empty for non-validation errors
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub errors: Vec<FieldError>,
}

/// A single invalid field
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Dotted path to the field, e.g. `salary_min` or `contact.email`
    pub field: String,
    pub message: String,
}

impl ProblemDetails {
    pub fn new(status: u16, title: impl Into<String>, detail: Option<String>) -> Self {
        Self {
            problem_type: DEFAULT_PROBLEM_TYPE.to_string(),
            title: title.into(),
            status,
            detail,
            errors: Vec::new(),
        }
    }

    /// Human readable message: the detail when present, the title otherwise
    pub fn message(&self) -> &str {
        self.detail.as_deref().unwrap_or(&self.title)
    }

    pub fn is_validation(&self) -> bool {
        !self.errors.is_empty()
    }
}

/// Every error body shape the backend is known to produce
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum ErrorBody {
    Problem(RawProblem),
    FastApi { detail: FastApiDetail },
}

#[derive(Debug, Deserialize)]
pub(crate) struct RawProblem {
    #[serde(rename = "type")]
    pub problem_type: String,
    pub title: String,
    #[serde(default)]
    pub status: Option<u16>,
    #[serde(default)]
    pub detail: Option<String>,
    #[serde(default)]
    pub errors: Vec<FieldError>,
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub(crate) enum FastApiDetail {
    Message(String),
    Validation(Vec<FastApiValidationItem>),
}

#[derive(Debug, Deserialize)]
pub(crate) struct FastApiValidationItem {
    #[serde(default)]
    pub loc: Vec<Value>,
    pub msg: String,
}

impl FastApiValidationItem {
    /// Field path without the leading request location (`body`, `query`, ...)
    pub fn field(&self) -> String {
        let parts: Vec<String> = self
            .loc
            .iter()
            .map(|part| match part {
                Value::String(s) => s.clone(),
                other => other.to_string(),
            })
            .collect();

        let start = usize::from(matches!(
            parts.first().map(String::as_str),
            Some("body" | "query" | "path" | "header" | "cookie")
        ));
        parts[start..].join(".")
    }
}

impl From<FastApiValidationItem> for FieldError {
    fn from(item: FastApiValidationItem) -> Self {
        Self {
            field: item.field(),
            message: item.msg,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_validation_item_field_path() {
        let item: FastApiValidationItem = serde_json::from_value(json!({
            "loc": ["body", "salary", 0],
            "msg": "value is not a valid integer",
            "type": "type_error.integer"
        }))
        .unwrap();
        assert_eq!(item.field(), "salary.0");

        let item: FastApiValidationItem =
            serde_json::from_value(json!({"loc": ["email"], "msg": "bad"})).unwrap();
        assert_eq!(item.field(), "email");
    }

    #[test]
    fn test_problem_message_falls_back_to_title() {
        let problem = ProblemDetails::new(403, "Forbidden", None);
        assert_eq!(problem.message(), "Forbidden");
        assert_eq!(problem.problem_type, DEFAULT_PROBLEM_TYPE);

        let problem = ProblemDetails::new(404, "Not Found", Some("Job not found".into()));
        assert_eq!(problem.message(), "Job not found");
    }

    #[test]
    fn test_problem_serializes_type_field() {
        let problem = ProblemDetails::new(409, "Conflict", None);
        let value = serde_json::to_value(&problem).unwrap();
        assert_eq!(value["type"], "about:blank");
        assert!(value.get("detail").is_none());
        assert!(value.get("errors").is_none());
    }
}
