//! # Error Handling
//!
//! Provides the unified `AppError` enum used across the workspace, and the
//! `ApiError` taxonomy raised when traffic does not match an endpoint contract.

use crate::schema::ValidationReport;
use derive_more::{Display, From};

/// The Global Error Enum.
///
/// We use `derive_more` for boilerplate.
/// Note: String errors default to `General`.
#[derive(Debug, Display, From)]
pub enum AppError {
    /// Wrapper for standard IO errors.
    #[display("IO Error: {_0}")]
    Io(std::io::Error),

    /// Wrapper for JSON (de)serialization errors.
    #[display("JSON Error: {_0}")]
    Json(serde_json::Error),

    /// Wrapper for YAML (de)serialization errors.
    #[display("YAML Error: {_0}")]
    Yaml(serde_yaml::Error),

    /// An endpoint contract or API model violates a construction rule.
    #[from(ignore)]
    #[display("Invalid contract: {_0}")]
    Contract(String),

    /// A schema definition could not be compiled by the validation engine.
    #[from(ignore)]
    #[display("Invalid schema: {_0}")]
    Schema(String),

    /// An operation id that the API model does not declare.
    #[from(ignore)]
    #[display("Unknown operation: {_0}")]
    UnknownOperation(String),

    /// Failure reported by the underlying HTTP transport.
    #[from(ignore)]
    #[display("Transport Error: {_0}")]
    Transport(String),

    /// Traffic rejected by a contract.
    #[display("{_0}")]
    Api(ApiError),

    /// Generic errors.
    #[display("General Error: {_0}")]
    General(String),
}

/// Manual implementation of the standard Error trait.
impl std::error::Error for AppError {}

/// Helper type alias for Result using AppError.
pub type AppResult<T> = Result<T, AppError>;

/// A request or response that does not satisfy its endpoint contract.
///
/// Each variant carries the validation engine's report so the host can surface
/// field-level detail.
#[derive(Debug, Clone, PartialEq, Display)]
pub enum ApiError {
    /// The URL query does not match the declared query schema.
    #[display("Invalid URL query: {_0}")]
    InvalidQuery(ValidationReport),

    /// The declared request headers are missing or malformed.
    #[display("Invalid headers: {_0}")]
    InvalidHeaders(ValidationReport),

    /// The request payload does not match the declared request body schema.
    #[display("Invalid request body: {_0}")]
    InvalidRequestBody(ValidationReport),

    /// The handler produced a payload that does not match the response body schema.
    #[display("Invalid response body: {_0}")]
    InvalidResponseBody(ValidationReport),
}

impl std::error::Error for ApiError {}

impl ApiError {
    /// Short human-readable summary, without the field-level detail.
    pub fn summary(&self) -> &'static str {
        match self {
            ApiError::InvalidQuery(_) => "Invalid URL query",
            ApiError::InvalidHeaders(_) => "Invalid headers",
            ApiError::InvalidRequestBody(_) => "Invalid request body",
            ApiError::InvalidResponseBody(_) => "Invalid response body",
        }
    }

    /// The structured validation report.
    pub fn report(&self) -> &ValidationReport {
        match self {
            ApiError::InvalidQuery(r)
            | ApiError::InvalidHeaders(r)
            | ApiError::InvalidRequestBody(r)
            | ApiError::InvalidResponseBody(r) => r,
        }
    }

    /// Whether the failure was caused by the caller's input (as opposed to the handler's output).
    pub fn is_client_fault(&self) -> bool {
        !matches!(self, ApiError::InvalidResponseBody(_))
    }

    /// HTTP status code this failure maps to under the given policy.
    pub fn status_code(&self, policy: RejectionPolicy) -> u16 {
        match (policy, self.is_client_fault()) {
            (RejectionPolicy::Strict, true) => 400,
            _ => 500,
        }
    }

    /// JSON body describing the failure.
    pub fn to_json(&self) -> serde_json::Value {
        serde_json::json!({
            "error": self.summary(),
            "issues": self.report().issues,
        })
    }
}

/// How request validation failures are presented to the caller.
///
/// Response validation failures are server faults and map to `500` under every policy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RejectionPolicy {
    /// Invalid query, headers or request body answer `400 Bad Request`.
    #[default]
    Strict,
    /// Every contract failure answers `500 Internal Server Error`.
    Uniform,
}

#[cfg(feature = "server")]
impl actix_web::ResponseError for ApiError {
    fn status_code(&self) -> actix_web::http::StatusCode {
        actix_web::http::StatusCode::from_u16(ApiError::status_code(self, RejectionPolicy::Strict))
            .unwrap_or(actix_web::http::StatusCode::INTERNAL_SERVER_ERROR)
    }

    fn error_response(&self) -> actix_web::HttpResponse {
        actix_web::HttpResponse::build(actix_web::ResponseError::status_code(self))
            .content_type("application/json")
            .body(self.to_json().to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::schema::ValidationIssue;
    use std::io::{Error, ErrorKind};

    fn report() -> ValidationReport {
        ValidationReport::new(vec![ValidationIssue::new("/userId", "1 is not of type \"string\"")])
    }

    #[test]
    fn test_io_conversion() {
        let io_err = Error::new(ErrorKind::Other, "test");
        let app_err: AppError = io_err.into();
        assert!(matches!(app_err, AppError::Io(_)));
    }

    #[test]
    fn test_string_conversion() {
        let msg = String::from("something wrong");
        let app_err: AppError = msg.into();
        match app_err {
            AppError::General(s) => assert_eq!(s, "something wrong"),
            _ => panic!("String should convert to AppError::General"),
        }
    }

    #[test]
    fn test_api_error_wraps_into_app_error() {
        let app_err: AppError = ApiError::InvalidQuery(report()).into();
        assert!(matches!(app_err, AppError::Api(ApiError::InvalidQuery(_))));
        assert!(app_err.to_string().starts_with("Invalid URL query"));
    }

    #[test]
    fn test_status_codes_per_policy() {
        let query = ApiError::InvalidQuery(report());
        let response = ApiError::InvalidResponseBody(report());

        assert_eq!(query.status_code(RejectionPolicy::Strict), 400);
        assert_eq!(query.status_code(RejectionPolicy::Uniform), 500);
        assert_eq!(response.status_code(RejectionPolicy::Strict), 500);
        assert_eq!(response.status_code(RejectionPolicy::Uniform), 500);
    }

    #[test]
    fn test_json_body_lists_issues() {
        let body = ApiError::InvalidRequestBody(report()).to_json();
        assert_eq!(body["error"], "Invalid request body");
        assert_eq!(body["issues"][0]["path"], "/userId");
    }
}
