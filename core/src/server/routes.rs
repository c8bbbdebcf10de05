//! # Actix Route Binding
//!
//! [`ApiRoutes`] mounts the operations of an [`ApiModel`] onto an Actix
//! `ServiceConfig`. Each request is validated against its contract before the
//! registered handler runs; handlers answer through [`EndpointCall::respond`].

use crate::contract::{extract_path_params, to_template_path, ApiModel, Endpoint};
use crate::error::{ApiError, AppError, AppResult, RejectionPolicy};
use crate::server::respond::{render_response, ResponseBody};
use crate::server::validate::{validate_request, RawRequest, ValidatedRequest};
use actix_web::http::StatusCode;
use actix_web::{web, HttpRequest, HttpResponse};
use indexmap::IndexMap;
use percent_encoding::percent_decode_str;
use serde_json::{Map, Value};
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by a registered handler.
pub type HandlerFuture = Pin<Box<dyn Future<Output = Result<HttpResponse, actix_web::Error>>>>;

type BoxedHandler = Arc<dyn Fn(EndpointCall) -> HandlerFuture + Send + Sync>;

/// Pairs of (segment name in the mounted pattern, parameter name in the contract).
type PathAliases = Arc<Vec<(String, String)>>;

/// Host-side settings for mounted routes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RoutesConfig {
    /// Status mapping for rejected requests.
    pub rejection: RejectionPolicy,
    /// Maximum accepted payload size in bytes.
    pub body_limit: usize,
}

impl Default for RoutesConfig {
    fn default() -> Self {
        Self {
            rejection: RejectionPolicy::Strict,
            body_limit: 256 * 1024,
        }
    }
}

/// A validated request handed to a handler.
pub struct EndpointCall {
    /// The underlying Actix request.
    pub request: HttpRequest,
    /// Path, query and header parameters, merged in that order.
    pub params: Map<String, Value>,
    /// Validated body (or the best-effort parsed payload when no schema is declared).
    pub request_body: Value,
    /// Unparsed payload.
    pub raw_body: web::Bytes,
    endpoint: Arc<Endpoint>,
}

impl EndpointCall {
    /// The contract this call was validated against.
    pub fn endpoint(&self) -> &Endpoint {
        &self.endpoint
    }

    /// Looks up a merged parameter.
    pub fn param(&self, name: &str) -> Option<&Value> {
        self.params.get(name)
    }

    /// Validates `body` against the response schema and builds the response with
    /// the contract status.
    pub fn respond(&self, body: impl Into<ResponseBody>) -> Result<HttpResponse, ApiError> {
        let rendered = render_response(&self.endpoint, body.into()).inspect_err(|err| {
            tracing::warn!(
                route = %self.endpoint.path(),
                error = %err,
                "handler produced an invalid response"
            )
        })?;
        let status = StatusCode::from_u16(rendered.status).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
        let mut builder = HttpResponse::build(status);
        if let Some(content_type) = rendered.content_type {
            builder.content_type(content_type);
        }
        Ok(builder.body(rendered.body))
    }
}

impl std::fmt::Debug for EndpointCall {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EndpointCall")
            .field("method", &self.endpoint.method())
            .field("path", &self.endpoint.path())
            .field("params", &self.params)
            .field("request_body", &self.request_body)
            .finish_non_exhaustive()
    }
}

/// Router adapter over an API model.
///
/// Handlers are registered per operation id; `configure` mounts every
/// operation that has one. Operations without a handler are left unrouted.
#[derive(Clone)]
pub struct ApiRoutes {
    api: Arc<ApiModel>,
    config: RoutesConfig,
    handlers: IndexMap<String, BoxedHandler>,
}

impl ApiRoutes {
    /// Adapter with the default configuration.
    pub fn new(api: Arc<ApiModel>) -> Self {
        Self::with_config(api, RoutesConfig::default())
    }

    /// Adapter with an explicit configuration.
    pub fn with_config(api: Arc<ApiModel>, config: RoutesConfig) -> Self {
        Self {
            api,
            config,
            handlers: IndexMap::new(),
        }
    }

    /// The bound API model.
    pub fn api(&self) -> &ApiModel {
        &self.api
    }

    /// Active configuration.
    pub fn config(&self) -> RoutesConfig {
        self.config
    }

    /// Registers the handler for `operation_id`, replacing any previous one.
    pub fn register<F, Fut>(&mut self, operation_id: &str, handler: F) -> AppResult<()>
    where
        F: Fn(EndpointCall) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = Result<HttpResponse, actix_web::Error>> + 'static,
    {
        if !self.api.endpoints().contains_key(operation_id) {
            return Err(AppError::UnknownOperation(operation_id.to_string()));
        }
        let boxed: BoxedHandler = Arc::new(move |call: EndpointCall| -> HandlerFuture { Box::pin(handler(call)) });
        if self.handlers.insert(operation_id.to_string(), boxed).is_some() {
            tracing::debug!(operation = operation_id, "replaced handler");
        } else {
            tracing::debug!(operation = operation_id, "registered handler");
        }
        Ok(())
    }

    /// Whether `operation_id` has a handler.
    pub fn is_registered(&self, operation_id: &str) -> bool {
        self.handlers.contains_key(operation_id)
    }

    /// Mounts every handled operation. Use with `App::configure`.
    ///
    /// Operations whose paths differ only in parameter names share one resource;
    /// each handler still sees its own parameter names.
    pub fn configure(&self, cfg: &mut web::ServiceConfig) {
        let mut grouped: IndexMap<&str, Vec<(&str, &Endpoint, BoxedHandler)>> = IndexMap::new();
        for (id, endpoint) in self.api.endpoints() {
            let Some(handler) = self.handlers.get(id) else {
                tracing::warn!(operation = %id, "no handler registered, operation is not routed");
                continue;
            };
            grouped
                .entry(self.api.mount_path(endpoint))
                .or_default()
                .push((id.as_str(), endpoint, handler.clone()));
        }

        for (mount, routes) in grouped {
            let path = to_template_path(mount);
            let segments = extract_path_params(mount);
            let mut resource = web::resource(path.as_str())
                .app_data(web::PayloadConfig::new(self.config.body_limit));
            for (id, endpoint, handler) in routes {
                tracing::info!(operation = id, method = %endpoint.method(), path = %path, "mounted route");
                let aliases: PathAliases = Arc::new(
                    segments
                        .iter()
                        .cloned()
                        .zip(endpoint.path_params().iter().cloned())
                        .collect(),
                );
                let endpoint = Arc::new(endpoint.clone());
                let policy = self.config.rejection;
                resource = resource.route(web::method(endpoint.method().into()).to(
                    move |req: HttpRequest, body: web::Bytes| {
                        dispatch(endpoint.clone(), aliases.clone(), handler.clone(), policy, req, body)
                    },
                ));
            }
            cfg.service(resource);
        }
    }
}

impl std::fmt::Debug for ApiRoutes {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiRoutes")
            .field("config", &self.config)
            .field("handlers", &self.handlers.keys().collect::<Vec<_>>())
            .finish_non_exhaustive()
    }
}

async fn dispatch(
    endpoint: Arc<Endpoint>,
    aliases: PathAliases,
    handler: BoxedHandler,
    policy: RejectionPolicy,
    req: HttpRequest,
    body: web::Bytes,
) -> Result<HttpResponse, actix_web::Error> {
    let validated = {
        let path_params = aliases
            .iter()
            .filter_map(|(segment, name)| {
                req.match_info()
                    .get(segment)
                    .map(|value| (name.clone(), decode_segment(value)))
            })
            .collect();
        let headers = req
            .headers()
            .iter()
            .filter_map(|(name, value)| value.to_str().ok().map(|v| (name.as_str(), v)))
            .collect();
        let raw = RawRequest {
            path_params,
            query: req.query_string(),
            headers,
            body: &body,
        };
        validate_request(&endpoint, &raw)
    };

    let ValidatedRequest { params, request_body } = match validated {
        Ok(validated) => validated,
        Err(err) => {
            tracing::warn!(
                method = %endpoint.method(),
                route = %endpoint.path(),
                error = %err,
                "rejected request"
            );
            return Ok(reject(&err, policy));
        }
    };

    let call = EndpointCall {
        request: req,
        params,
        request_body,
        raw_body: body,
        endpoint,
    };
    handler(call).await
}

/// The router leaves reserved escapes such as `%2F` in matched segments.
fn decode_segment(value: &str) -> String {
    percent_decode_str(value).decode_utf8_lossy().into_owned()
}

fn reject(err: &ApiError, policy: RejectionPolicy) -> HttpResponse {
    let status = StatusCode::from_u16(err.status_code(policy)).unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    HttpResponse::build(status)
        .content_type("application/json")
        .body(err.to_json().to_string())
}
