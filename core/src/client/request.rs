//! # Request Assembly
//!
//! Turns an endpoint contract plus caller-supplied values into a transport-ready
//! [`RequestDescriptor`]. Assembly never fails: missing values serialize as empty
//! strings, and validation is left to the server.

use crate::contract::{Endpoint, HttpMethod};
use crate::contract::path::substitute_path;
use indexmap::IndexMap;
use percent_encoding::{utf8_percent_encode, AsciiSet, NON_ALPHANUMERIC};
use serde_json::{Map, Value};
use std::time::Duration;

/// Characters left unescaped by `encodeURIComponent`.
const URI_COMPONENT: &AsciiSet = &NON_ALPHANUMERIC
    .remove(b'-')
    .remove(b'_')
    .remove(b'.')
    .remove(b'!')
    .remove(b'~')
    .remove(b'*')
    .remove(b'\'')
    .remove(b'(')
    .remove(b')');

/// Transport options that pass through assembly untouched.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestOptions {
    /// Base URL the relative request URL is resolved against.
    pub base_url: Option<String>,
    /// Whole-request timeout.
    pub timeout: Option<Duration>,
    /// Free-form transport settings.
    pub extensions: Map<String, Value>,
}

/// Everything a caller supplies for one invocation.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CallConfig {
    /// Path, query and header parameter values keyed by declared name.
    pub params: Map<String, Value>,
    /// Request payload.
    pub body: Option<Value>,
    /// Generic headers; declared header parameters override them.
    pub headers: IndexMap<String, String>,
    /// Transport options.
    pub options: RequestOptions,
}

impl CallConfig {
    /// Empty configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets one parameter value.
    pub fn param(mut self, name: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(name.into(), value.into());
        self
    }

    /// Sets the request payload.
    pub fn body(mut self, body: Value) -> Self {
        self.body = Some(body);
        self
    }

    /// Adds a generic header.
    pub fn header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Replaces the transport options.
    pub fn options(mut self, options: RequestOptions) -> Self {
        self.options = options;
        self
    }
}

/// A fully assembled outbound request.
#[derive(Debug, Clone, PartialEq)]
pub struct RequestDescriptor {
    /// Always the contract's method.
    pub method: HttpMethod,
    /// Path with substituted parameters and the query string, relative to the base URL.
    pub url: String,
    /// Generic headers merged with declared header parameters.
    pub headers: IndexMap<String, String>,
    /// Payload, passed through unchanged.
    pub body: Option<Value>,
    /// Transport options, passed through unchanged.
    pub options: RequestOptions,
}

/// Builds the outbound request for `endpoint`.
pub fn assemble_request(endpoint: &Endpoint, config: CallConfig) -> RequestDescriptor {
    let CallConfig {
        params,
        body,
        headers: generic_headers,
        options,
    } = config;

    let path = substitute_path(endpoint.path(), |name| {
        utf8_percent_encode(&stringify(params.get(name)), URI_COMPONENT).to_string()
    });

    let url = if endpoint.query().is_empty() {
        path
    } else {
        let mut query = url::form_urlencoded::Serializer::new(String::new());
        for name in endpoint.query().keys() {
            query.append_pair(name, &stringify(params.get(name)));
        }
        format!("{}?{}", path, query.finish())
    };

    let mut headers = generic_headers;
    for name in endpoint.headers().keys() {
        let Some(value) = params.get(name) else {
            continue;
        };
        headers.retain(|existing, _| !existing.eq_ignore_ascii_case(name));
        headers.insert(name.clone(), stringify(Some(value)));
    }

    tracing::debug!(method = %endpoint.method(), url = %url, "assembled request");

    RequestDescriptor {
        method: endpoint.method(),
        url,
        headers,
        body,
        options,
    }
}

/// Renders a parameter value as text: strings verbatim, missing/`null` as empty.
pub(crate) fn stringify(value: Option<&Value>) -> String {
    match value {
        None | Some(Value::Null) => String::new(),
        Some(Value::String(s)) => s.clone(),
        Some(other) => other.to_string(),
    }
}
