//! # Request Validation
//!
//! Gates inbound traffic against an endpoint contract. Query, headers and body
//! are validated independently; path parameters come from the host router and
//! are merged without validation.

use crate::contract::Endpoint;
use crate::error::ApiError;
use crate::schema::ValidationReport;
use indexmap::IndexMap;
use serde_json::{Map, Value};

/// Host-agnostic view of an inbound request.
#[derive(Debug, Clone, Default)]
pub struct RawRequest<'a> {
    /// Path parameters as matched by the host router.
    pub path_params: IndexMap<String, String>,
    /// Raw query string, without the leading `?`.
    pub query: &'a str,
    /// Inbound headers (any case).
    pub headers: Vec<(&'a str, &'a str)>,
    /// Raw payload.
    pub body: &'a [u8],
}

/// The outcome of a successful validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedRequest {
    /// Path, query and header parameters merged in that order.
    pub params: Map<String, Value>,
    /// Validated body when a schema is declared, otherwise the best-effort parsed payload.
    pub request_body: Value,
}

/// Validates every surface of `raw` against `endpoint`.
pub fn validate_request(endpoint: &Endpoint, raw: &RawRequest<'_>) -> Result<ValidatedRequest, ApiError> {
    let query = validate_query(endpoint, raw.query)?;
    let headers = validate_headers(endpoint, &raw.headers)?;
    let request_body = validate_body(endpoint, raw.body)?;

    let path = raw
        .path_params
        .iter()
        .map(|(k, v)| (k.clone(), Value::String(v.clone())))
        .collect();

    Ok(ValidatedRequest {
        params: merge_params(path, query, headers),
        request_body,
    })
}

/// Parses a query string into an object; repeated keys become arrays.
pub fn parse_query(query: &str) -> Map<String, Value> {
    let mut out = Map::new();
    for (key, value) in url::form_urlencoded::parse(query.as_bytes()) {
        let value = Value::String(value.into_owned());
        match out.get_mut(key.as_ref()) {
            Some(Value::Array(values)) => values.push(value),
            Some(existing) => {
                let first = existing.take();
                *existing = Value::Array(vec![first, value]);
            }
            None => {
                out.insert(key.into_owned(), value);
            }
        }
    }
    out
}

/// Validates the query strictly: undeclared keys are rejected.
pub fn validate_query(endpoint: &Endpoint, query: &str) -> Result<Map<String, Value>, ApiError> {
    let parsed = Value::Object(parse_query(query));
    endpoint
        .validators()
        .query
        .validate(&parsed)
        .map(into_object)
        .map_err(ApiError::InvalidQuery)
}

/// Reads each declared header case-insensitively and validates the result strictly.
pub fn validate_headers(
    endpoint: &Endpoint,
    headers: &[(&str, &str)],
) -> Result<Map<String, Value>, ApiError> {
    let mut picked = Map::new();
    for name in endpoint.headers().keys() {
        let found = headers
            .iter()
            .find(|(candidate, _)| candidate.eq_ignore_ascii_case(name));
        if let Some((_, value)) = found {
            picked.insert(name.clone(), Value::String((*value).to_string()));
        }
    }
    endpoint
        .validators()
        .headers
        .validate(&Value::Object(picked))
        .map(into_object)
        .map_err(ApiError::InvalidHeaders)
}

/// Validates the payload when a request body schema is declared.
///
/// Empty payloads read as `null`. Without a schema the payload passes through
/// unvalidated (`null` when it is not JSON).
pub fn validate_body(endpoint: &Endpoint, body: &[u8]) -> Result<Value, ApiError> {
    let Some(validator) = endpoint.validators().request_body.as_ref() else {
        return Ok(parse_body(body).unwrap_or(Value::Null));
    };
    let value = parse_body(body).map_err(|e| {
        ApiError::InvalidRequestBody(ValidationReport::single(format!(
            "request body is not valid JSON: {}",
            e
        )))
    })?;
    validator.validate(&value).map_err(ApiError::InvalidRequestBody)
}

/// Merges parameter sources; later sources overwrite earlier ones on name collision.
pub fn merge_params(
    path: Map<String, Value>,
    query: Map<String, Value>,
    headers: Map<String, Value>,
) -> Map<String, Value> {
    let mut merged = path;
    merged.extend(query);
    merged.extend(headers);
    merged
}

pub(crate) fn parse_body(body: &[u8]) -> Result<Value, serde_json::Error> {
    if body.iter().all(u8::is_ascii_whitespace) {
        return Ok(Value::Null);
    }
    serde_json::from_slice(body)
}

fn into_object(value: Value) -> Map<String, Value> {
    match value {
        Value::Object(map) => map,
        _ => Map::new(),
    }
}
