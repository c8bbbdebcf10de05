//! # Transports
//!
//! The seam between request assembly and the network. The default
//! implementation delegates to `ureq`; tests inject their own.

use crate::client::request::RequestDescriptor;
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::de::DeserializeOwned;
use serde_json::Value;

/// A response as returned by a transport.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ApiResponse {
    /// Status code.
    pub status: u16,
    /// Response headers (lowercase names).
    pub headers: IndexMap<String, String>,
    /// Raw response body.
    pub body: String,
}

impl ApiResponse {
    /// Whether the status is in the 2xx range.
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Parses the body as JSON (`null` when empty).
    pub fn json(&self) -> AppResult<Value> {
        if self.body.trim().is_empty() {
            return Ok(Value::Null);
        }
        Ok(serde_json::from_str(&self.body)?)
    }

    /// Deserializes the body into `T`.
    pub fn json_as<T: DeserializeOwned>(&self) -> AppResult<T> {
        Ok(serde_json::from_str(&self.body)?)
    }
}

/// Sends assembled requests.
pub trait Transport {
    /// Performs the request.
    fn send(&self, request: RequestDescriptor) -> AppResult<ApiResponse>;
}

impl<T: Transport + ?Sized> Transport for std::sync::Arc<T> {
    fn send(&self, request: RequestDescriptor) -> AppResult<ApiResponse> {
        (**self).send(request)
    }
}

/// Joins a base URL and a relative request URL.
///
/// Absolute request URLs are used as-is.
pub fn resolve_url(base_url: Option<&str>, url: &str) -> AppResult<String> {
    let joined = match base_url {
        _ if url.starts_with("http://") || url.starts_with("https://") => url.to_string(),
        Some(base) => format!("{}{}", base.trim_end_matches('/'), url),
        None => {
            return Err(AppError::Transport(format!(
                "No base URL to resolve '{}' against",
                url
            )))
        }
    };
    url::Url::parse(&joined)
        .map_err(|e| AppError::Transport(format!("Invalid URL '{}': {}", joined, e)))?;
    Ok(joined)
}

/// Default transport over a `ureq` agent.
///
/// Error statuses (4xx/5xx) are returned as responses, not as errors.
#[cfg(feature = "client")]
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    base_url: Option<String>,
}

#[cfg(feature = "client")]
impl std::fmt::Debug for UreqTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("UreqTransport")
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

#[cfg(feature = "client")]
impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(feature = "client")]
impl UreqTransport {
    /// Transport without a base URL or timeout.
    pub fn new() -> Self {
        Self {
            agent: build_agent(None),
            base_url: None,
        }
    }

    /// Sets the base URL used when the request options do not carry one.
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = Some(base_url.into());
        self
    }

    /// Sets a whole-request timeout for every call.
    pub fn with_timeout(mut self, timeout: std::time::Duration) -> Self {
        self.agent = build_agent(Some(timeout));
        self
    }
}

#[cfg(feature = "client")]
fn build_agent(timeout: Option<std::time::Duration>) -> ureq::Agent {
    let config = ureq::Agent::config_builder()
        .timeout_global(timeout)
        .http_status_as_error(false)
        .build();
    ureq::Agent::new_with_config(config)
}

#[cfg(feature = "client")]
impl Transport for UreqTransport {
    fn send(&self, request: RequestDescriptor) -> AppResult<ApiResponse> {
        let base_url = request
            .options
            .base_url
            .as_deref()
            .or(self.base_url.as_deref());
        let url = resolve_url(base_url, &request.url)?;

        let mut builder = ureq::http::Request::builder()
            .method(request.method.wire_name())
            .uri(&url);
        for (name, value) in &request.headers {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let agent = match request.options.timeout {
            Some(timeout) => build_agent(Some(timeout)),
            None => self.agent.clone(),
        };

        tracing::debug!(method = request.method.wire_name(), url = %url, "sending request");

        let result = match &request.body {
            Some(body) => {
                let has_content_type = request
                    .headers
                    .keys()
                    .any(|name| name.eq_ignore_ascii_case("content-type"));
                if !has_content_type {
                    builder = builder.header("content-type", "application/json");
                }
                let bytes = serde_json::to_vec(body)?;
                let http_request = builder
                    .body(bytes)
                    .map_err(|e| AppError::Transport(e.to_string()))?;
                agent.run(http_request)
            }
            None => {
                let http_request = builder
                    .body(())
                    .map_err(|e| AppError::Transport(e.to_string()))?;
                agent.run(http_request)
            }
        };
        let mut response = result.map_err(|e| AppError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .map(|(name, value)| {
                (
                    name.as_str().to_string(),
                    value.to_str().unwrap_or_default().to_string(),
                )
            })
            .collect();
        let body = response
            .body_mut()
            .read_to_string()
            .map_err(|e| AppError::Transport(e.to_string()))?;

        Ok(ApiResponse {
            status,
            headers,
            body,
        })
    }
}
