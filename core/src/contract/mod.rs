#![deny(missing_docs)]

//! # Contracts
//!
//! - **method**: the HTTP method enumeration.
//! - **path**: `:name` path templates and parameter extraction.
//! - **endpoint**: immutable endpoint contracts and their builders.
//! - **api**: the API model grouping contracts under operation ids.

pub mod api;
pub mod endpoint;
pub mod method;
pub mod path;

pub use api::{ApiDocs, ApiModel, ApiModelBuilder};
pub use endpoint::{delete, get, head, options, patch, post, put, Endpoint, EndpointBuilder};
pub use method::HttpMethod;
pub use path::{extract_path_params, to_template_path};
