#![deny(missing_docs)]

//! # API Definition Files
//!
//! Serde representation of an API model, read from JSON or YAML:
//!
//! ```yaml
//! docs:
//!   info: { title: Users, version: 1.0.0 }
//! endpoints:
//!   getUser:
//!     method: get
//!     path: /users/:userId
//!     status: 200
//!     query:
//!       verbose: { type: string, optional: true }
//!     responseBody:
//!       type: object
//!       properties: { userId: { type: string } }
//! ```
//!
//! Definitions are converted through the contract builders, so every
//! construction rule applies to files exactly as it does to code.

use crate::contract::{ApiDocs, ApiModel, Endpoint, HttpMethod};
use crate::error::{AppError, AppResult};
use crate::schema::Schema;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;
use utoipa::openapi::path::Operation;

/// A whole API: document metadata plus endpoints keyed by operation id.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDefinition {
    /// Document-level metadata.
    pub docs: ApiDocs,
    /// Endpoints in declaration order.
    #[serde(default)]
    pub endpoints: IndexMap<String, EndpointDefinition>,
}

/// One endpoint contract as written in a definition file.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct EndpointDefinition {
    /// Lowercase HTTP method.
    pub method: HttpMethod,
    /// `:name` path template.
    pub path: String,
    /// Success status code.
    pub status: u16,
    /// Query parameter schemas.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub query: IndexMap<String, Schema>,
    /// Header parameter schemas.
    #[serde(default, skip_serializing_if = "IndexMap::is_empty")]
    pub headers: IndexMap<String, Schema>,
    /// Request body schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub request_body: Option<Schema>,
    /// Response body schema.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub response_body: Option<Schema>,
    /// OpenAPI operation fragment.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub docs: Option<Operation>,
}

impl ApiDefinition {
    /// Parses a JSON definition.
    pub fn from_json_str(content: &str) -> AppResult<Self> {
        serde_json::from_str(content)
            .map_err(|e| AppError::General(format!("Failed to parse API definition JSON: {}", e)))
    }

    /// Parses a YAML definition.
    pub fn from_yaml_str(content: &str) -> AppResult<Self> {
        serde_yaml::from_str(content)
            .map_err(|e| AppError::General(format!("Failed to parse API definition YAML: {}", e)))
    }

    /// Captures an existing model.
    pub fn from_model(api: &ApiModel) -> Self {
        let endpoints = api
            .endpoints()
            .iter()
            .map(|(id, endpoint)| (id.clone(), EndpointDefinition::from(endpoint)))
            .collect();
        Self {
            docs: api.docs().clone(),
            endpoints,
        }
    }

    /// Builds the model, enforcing every contract rule.
    pub fn into_model(self) -> AppResult<ApiModel> {
        let mut builder = ApiModel::builder(self.docs);
        for (id, definition) in self.endpoints {
            let endpoint = definition.into_endpoint().map_err(|e| match e {
                AppError::Contract(msg) => AppError::Contract(format!("Operation '{}': {}", id, msg)),
                AppError::Schema(msg) => AppError::Schema(format!("Operation '{}': {}", id, msg)),
                other => other,
            })?;
            builder = builder.endpoint(id, endpoint);
        }
        builder.build()
    }
}

impl EndpointDefinition {
    /// Builds the contract.
    pub fn into_endpoint(self) -> AppResult<Endpoint> {
        let mut builder = Endpoint::builder(self.method, self.path).status(self.status);
        for (name, schema) in self.query {
            builder = builder.query(name, schema);
        }
        for (name, schema) in self.headers {
            builder = builder.header(name, schema);
        }
        if let Some(schema) = self.request_body {
            builder = builder.request_body(schema);
        }
        if let Some(schema) = self.response_body {
            builder = builder.response_body(schema);
        }
        if let Some(docs) = self.docs {
            builder = builder.docs(docs);
        }
        builder.build()
    }
}

impl From<&Endpoint> for EndpointDefinition {
    fn from(endpoint: &Endpoint) -> Self {
        Self {
            method: endpoint.method(),
            path: endpoint.path().to_string(),
            status: endpoint.status(),
            query: endpoint.query().clone(),
            headers: endpoint.headers().clone(),
            request_body: endpoint.request_body().cloned(),
            response_body: endpoint.response_body().cloned(),
            docs: endpoint.docs().cloned(),
        }
    }
}

/// Reads and builds the API model stored at `path`.
///
/// `.json` files are parsed as JSON; anything else is parsed as YAML.
pub fn load_api_definition(path: impl AsRef<Path>) -> AppResult<ApiModel> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let is_json = path
        .extension()
        .and_then(|ext| ext.to_str())
        .is_some_and(|ext| ext.eq_ignore_ascii_case("json"));

    let definition = if is_json {
        ApiDefinition::from_json_str(&content)?
    } else {
        ApiDefinition::from_yaml_str(&content)?
    };

    tracing::debug!(
        path = %path.display(),
        endpoints = definition.endpoints.len(),
        "loaded API definition"
    );
    definition.into_model()
}
