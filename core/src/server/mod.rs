#![deny(missing_docs)]

//! # Server
//!
//! - **validate**: request gating (query, headers, body) and parameter merging.
//! - **respond**: response validation and serialization.
//! - **routes**: the Actix adapter (feature `server`).

pub mod respond;
#[cfg(feature = "server")]
pub mod routes;
pub mod validate;

pub use respond::{render_response, RenderedResponse, ResponseBody};
#[cfg(feature = "server")]
pub use routes::{ApiRoutes, EndpointCall, HandlerFuture, RoutesConfig};
pub use validate::{merge_params, validate_request, RawRequest, ValidatedRequest};
