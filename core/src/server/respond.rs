//! # Response Rendering
//!
//! Validates and serializes handler payloads. Without a response schema the
//! payload is written as-is with the contract status.

use crate::contract::Endpoint;
use crate::error::ApiError;
use crate::schema::ValidationReport;
use crate::server::validate::parse_body;
use serde_json::Value;

/// Payload handed to `respond`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum ResponseBody {
    /// No payload.
    #[default]
    Empty,
    /// Structured payload.
    Json(Value),
    /// Already-serialized payload.
    Raw(Vec<u8>),
}

impl From<Value> for ResponseBody {
    fn from(value: Value) -> Self {
        ResponseBody::Json(value)
    }
}

impl From<Option<Value>> for ResponseBody {
    fn from(value: Option<Value>) -> Self {
        value.map_or(ResponseBody::Empty, ResponseBody::Json)
    }
}

impl From<()> for ResponseBody {
    fn from(_: ()) -> Self {
        ResponseBody::Empty
    }
}

impl From<String> for ResponseBody {
    fn from(value: String) -> Self {
        ResponseBody::Raw(value.into_bytes())
    }
}

impl From<&str> for ResponseBody {
    fn from(value: &str) -> Self {
        ResponseBody::Raw(value.as_bytes().to_vec())
    }
}

impl From<Vec<u8>> for ResponseBody {
    fn from(value: Vec<u8>) -> Self {
        ResponseBody::Raw(value)
    }
}

/// A response ready to be written by the host.
#[derive(Debug, Clone, PartialEq)]
pub struct RenderedResponse {
    /// The contract status.
    pub status: u16,
    /// `application/json` for validated payloads.
    pub content_type: Option<&'static str>,
    /// Serialized payload.
    pub body: Vec<u8>,
}

/// Renders `body` for `endpoint`.
///
/// With a response schema the payload is validated and the validated value is
/// emitted as JSON; a mismatch yields `InvalidResponseBody` and nothing is rendered.
pub fn render_response(endpoint: &Endpoint, body: ResponseBody) -> Result<RenderedResponse, ApiError> {
    let Some(validator) = endpoint.validators().response_body.as_ref() else {
        let bytes = match body {
            ResponseBody::Empty => Vec::new(),
            ResponseBody::Raw(bytes) => bytes,
            ResponseBody::Json(Value::String(text)) => text.into_bytes(),
            ResponseBody::Json(other) => other.to_string().into_bytes(),
        };
        return Ok(RenderedResponse {
            status: endpoint.status(),
            content_type: None,
            body: bytes,
        });
    };

    let value = match body {
        ResponseBody::Empty => Value::Null,
        ResponseBody::Json(value) => value,
        ResponseBody::Raw(bytes) => parse_body(&bytes).map_err(|e| {
            ApiError::InvalidResponseBody(ValidationReport::single(format!(
                "response body is not valid JSON: {}",
                e
            )))
        })?,
    };

    let validated = validator
        .validate(&value)
        .map_err(ApiError::InvalidResponseBody)?;

    Ok(RenderedResponse {
        status: endpoint.status(),
        content_type: Some("application/json"),
        body: validated.to_string().into_bytes(),
    })
}
