#![deny(missing_docs)]

//! # Client
//!
//! - **request**: contract-driven request assembly.
//! - **transport**: the transport seam and the default `ureq` transport.
//!
//! [`ApiClient`] binds an API model to a transport and exposes one call per
//! operation id.

pub mod request;
pub mod transport;

pub use request::{assemble_request, CallConfig, RequestDescriptor, RequestOptions};
#[cfg(feature = "client")]
pub use transport::UreqTransport;
pub use transport::{ApiResponse, Transport};

use crate::contract::ApiModel;
use crate::error::AppResult;
use std::sync::Arc;

/// Replaces the default `transport.send(request)` step.
pub type RequestFn<T> = dyn Fn(&T, RequestDescriptor) -> AppResult<ApiResponse> + Send + Sync;

/// Typed-by-contract client over an API model.
pub struct ApiClient<T> {
    api: Arc<ApiModel>,
    transport: T,
    request_fn: Box<RequestFn<T>>,
}

impl<T: Transport + 'static> ApiClient<T> {
    /// Client that sends every request through `transport`.
    pub fn new(api: Arc<ApiModel>, transport: T) -> Self {
        Self {
            api,
            transport,
            request_fn: Box::new(|transport: &T, request| transport.send(request)),
        }
    }
}

impl<T> ApiClient<T> {
    /// Client whose requests are performed by `request_fn(&transport, request)`.
    pub fn with_request_fn<F>(api: Arc<ApiModel>, transport: T, request_fn: F) -> Self
    where
        F: Fn(&T, RequestDescriptor) -> AppResult<ApiResponse> + Send + Sync + 'static,
    {
        Self {
            api,
            transport,
            request_fn: Box::new(request_fn),
        }
    }

    /// The bound API model.
    pub fn api(&self) -> &ApiModel {
        &self.api
    }

    /// The underlying transport.
    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Assembles the request for `operation_id` without sending it.
    pub fn request(&self, operation_id: &str, config: CallConfig) -> AppResult<RequestDescriptor> {
        let endpoint = self.api.endpoint(operation_id)?;
        Ok(assemble_request(endpoint, config))
    }

    /// Assembles and performs the request for `operation_id`.
    pub fn call(&self, operation_id: &str, config: CallConfig) -> AppResult<ApiResponse> {
        let request = self.request(operation_id, config)?;
        tracing::debug!(operation = operation_id, url = %request.url, "calling operation");
        (self.request_fn)(&self.transport, request)
    }
}

impl<T: std::fmt::Debug> std::fmt::Debug for ApiClient<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ApiClient")
            .field("operations", &self.api.endpoints().keys().collect::<Vec<_>>())
            .field("transport", &self.transport)
            .finish_non_exhaustive()
    }
}
