#![deny(missing_docs)]

//! # Apidriven Core
//!
//! Contract-first HTTP APIs: one endpoint contract drives the client request
//! assembler, the server-side validators and the OpenAPI document.

/// Shared error types.
pub mod error;

/// Validation schemas and the compiled validator.
pub mod schema;

/// Endpoint contracts and the API model.
pub mod contract;

/// Contract-driven client.
pub mod client;

/// Request validation, response rendering and route binding.
pub mod server;

/// OpenAPI document generation.
pub mod oas;

/// JSON/YAML API definition files.
pub mod definition;

pub use client::{ApiClient, ApiResponse, CallConfig, RequestDescriptor, RequestOptions, Transport};
#[cfg(feature = "client")]
pub use client::UreqTransport;
pub use contract::{
    delete, get, head, options, patch, post, put, ApiDocs, ApiModel, Endpoint, EndpointBuilder,
    HttpMethod,
};
pub use definition::{load_api_definition, ApiDefinition, EndpointDefinition};
pub use error::{ApiError, AppError, AppResult, RejectionPolicy};
pub use oas::{build_specification, render_specification, DocumentFormat};
pub use schema::{Schema, ValidationIssue, ValidationReport, Validator};
#[cfg(feature = "server")]
pub use server::{ApiRoutes, EndpointCall, RoutesConfig};
pub use server::{render_response, validate_request, RawRequest, ResponseBody, ValidatedRequest};
