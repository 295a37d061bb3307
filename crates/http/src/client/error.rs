//! Client error types

use crate::error::{ErrorBody, FastApiDetail, FieldError, ProblemDetails};
use reqwest::StatusCode;
use thiserror::Error;

/// Client error types
///
/// A failed token refresh reaches every waiting request as a clone of the
/// same error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ClientError {
    /// The backend could not be reached (connection refused, DNS, TLS)
    #[error("Unable to reach server at {base_url}: {message}")]
    Network { base_url: String, message: String },

    /// Request rejected with field-level validation errors
    #[error("Validation failed: {}", .0.message())]
    Validation(ProblemDetails),

    /// Server returned an error status with a readable message
    #[error("Server error {}: {}", .0.status, .0.message())]
    Http(ProblemDetails),

    /// The access token could not be renewed; the session has been cleared
    #[error("Session expired, please log in again")]
    SessionExpired,

    /// Server returned an error body in no recognized shape
    #[error("Request failed with status {status}: {status_text}")]
    Unknown { status: u16, status_text: String },

    /// A successful response body could not be decoded
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Invalid configuration
    #[error("Invalid configuration: {0}")]
    Configuration(String),
}

impl ClientError {
    /// HTTP status carried by the error, if any
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Validation(problem) | Self::Http(problem) => Some(problem.status),
            Self::Unknown { status, .. } => Some(*status),
            _ => None,
        }
    }

    /// Normalized error body, if the backend sent one
    pub fn problem(&self) -> Option<&ProblemDetails> {
        match self {
            Self::Validation(problem) | Self::Http(problem) => Some(problem),
            _ => None,
        }
    }

    /// Whether the backend refused the credentials or the permission
    pub fn is_auth_error(&self) -> bool {
        matches!(self.status(), Some(401 | 403))
    }

    pub fn is_session_expired(&self) -> bool {
        matches!(self, Self::SessionExpired)
    }

    pub fn is_network(&self) -> bool {
        matches!(self, Self::Network { .. })
    }
}

impl From<serde_json::Error> for ClientError {
    fn from(err: serde_json::Error) -> Self {
        Self::Serialization(err.to_string())
    }
}

fn status_text(status: StatusCode) -> String {
    status
        .canonical_reason()
        .unwrap_or("Unknown error")
        .to_string()
}

/// Classify a non-success response body.
///
/// Returns [`ClientError::Validation`] for field-level failures,
/// [`ClientError::Http`] for any other recognized error body and
/// [`ClientError::Unknown`] when the body matches no known shape.
pub fn parse_error_body(status: StatusCode, body: &str) -> ClientError {
    let Ok(parsed) = serde_json::from_str::<ErrorBody>(body) else {
        return ClientError::Unknown {
            status: status.as_u16(),
            status_text: status_text(status),
        };
    };

    match parsed {
        ErrorBody::Problem(raw) => {
            let problem = ProblemDetails {
                problem_type: raw.problem_type,
                title: raw.title,
                status: raw.status.unwrap_or_else(|| status.as_u16()),
                detail: raw.detail,
                errors: raw.errors,
            };
            if problem.is_validation() && status.is_client_error() {
                ClientError::Validation(problem)
            } else {
                ClientError::Http(problem)
            }
        }
        ErrorBody::FastApi {
            detail: FastApiDetail::Message(message),
        } => ClientError::Http(ProblemDetails::new(
            status.as_u16(),
            status_text(status),
            Some(message),
        )),
        ErrorBody::FastApi {
            detail: FastApiDetail::Validation(items),
        } => {
            let errors: Vec<FieldError> = items.into_iter().map(FieldError::from).collect();
            let detail = errors
                .iter()
                .map(|e| {
                    if e.field.is_empty() {
                        e.message.clone()
                    } else {
                        format!("{}: {}", e.field, e.message)
                    }
                })
                .collect::<Vec<_>>()
                .join("; ");

            ClientError::Validation(ProblemDetails {
                errors,
                ..ProblemDetails::new(status.as_u16(), "Validation Error", Some(detail))
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fastapi_message_becomes_http_error() {
        let error = parse_error_body(StatusCode::NOT_FOUND, r#"{"detail":"Not Found"}"#);

        match &error {
            ClientError::Http(problem) => {
                assert_eq!(problem.status, 404);
                assert_eq!(problem.detail.as_deref(), Some("Not Found"));
                assert_eq!(problem.title, "Not Found");
                assert_eq!(problem.problem_type, "about:blank");
            }
            other => panic!("Expected Http error, got {other:?}"),
        }
        assert_eq!(error.status(), Some(404));
        assert_eq!(error.to_string(), "Server error 404: Not Found");
    }

    #[test]
    fn test_fastapi_validation_list_becomes_validation_error() {
        let body = r#"{"detail":[
            {"loc":["body","email"],"msg":"value is not a valid email address","type":"value_error.email"},
            {"loc":["body","password"],"msg":"field required","type":"value_error.missing"}
        ]}"#;

        let error = parse_error_body(StatusCode::UNPROCESSABLE_ENTITY, body);
        let ClientError::Validation(problem) = &error else {
            panic!("Expected Validation error, got {error:?}");
        };

        assert_eq!(problem.status, 422);
        assert_eq!(problem.errors.len(), 2);
        assert_eq!(problem.errors[0].field, "email");
        assert_eq!(problem.errors[1].message, "field required");
        assert_eq!(
            problem.detail.as_deref(),
            Some("email: value is not a valid email address; password: field required")
        );
    }

    #[test]
    fn test_problem_document_is_kept() {
        let body = r#"{"type":"https://jobs.example/errors/conflict","title":"Conflict","status":409,"detail":"Email already registered"}"#;

        let error = parse_error_body(StatusCode::CONFLICT, body);
        let problem = error.problem().expect("problem details");
        assert!(matches!(error, ClientError::Http(_)));
        assert_eq!(problem.problem_type, "https://jobs.example/errors/conflict");
        assert_eq!(problem.message(), "Email already registered");
    }

    #[test]
    fn test_problem_document_with_field_errors_is_validation() {
        let body = r#"{"type":"validation","title":"Invalid job","status":400,
            "errors":[{"field":"salary_min","message":"must be positive"}]}"#;

        let error = parse_error_body(StatusCode::BAD_REQUEST, body);
        assert!(matches!(error, ClientError::Validation(_)));
    }

    #[test]
    fn test_problem_without_status_uses_response_status() {
        let body = r#"{"type":"about:blank","title":"Forbidden"}"#;
        let error = parse_error_body(StatusCode::FORBIDDEN, body);
        assert_eq!(error.status(), Some(403));
        assert!(error.is_auth_error());
    }

    #[test]
    fn test_unparseable_body_falls_back_to_status_text() {
        let error = parse_error_body(StatusCode::BAD_GATEWAY, "<html>upstream down</html>");
        assert_eq!(
            error,
            ClientError::Unknown {
                status: 502,
                status_text: "Bad Gateway".to_string()
            }
        );

        let error = parse_error_body(StatusCode::INTERNAL_SERVER_ERROR, "");
        assert!(matches!(error, ClientError::Unknown { status: 500, .. }));
    }
}
