//! # API Model
//!
//! A named set of endpoint contracts plus the document-level metadata
//! (`info`, `servers`, `tags`...) that the specification assembler emits verbatim.

use crate::contract::endpoint::Endpoint;
use crate::contract::path::route_shape;
use crate::error::{AppError, AppResult};
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use utoipa::openapi::external_docs::ExternalDocs;
use utoipa::openapi::security::SecurityRequirement;
use utoipa::openapi::server::Server;
use utoipa::openapi::tag::Tag;
use utoipa::openapi::Info;

/// Top-level document metadata (everything except `openapi` and `paths`).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiDocs {
    /// The `info` object (title and version are required by OpenAPI).
    pub info: Info,
    /// Server list.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub servers: Vec<Server>,
    /// Global security requirements.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub security: Vec<SecurityRequirement>,
    /// Tag metadata.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tags: Vec<Tag>,
    /// External documentation link.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub external_docs: Option<ExternalDocs>,
}

impl ApiDocs {
    /// Metadata with only a title and a version.
    pub fn new(title: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            info: Info::new(title.into(), version.into()),
            servers: Vec::new(),
            security: Vec::new(),
            tags: Vec::new(),
            external_docs: None,
        }
    }
}

/// Immutable API description shared by the client, the routes and the document builder.
#[derive(Debug, Clone)]
pub struct ApiModel {
    docs: ApiDocs,
    endpoints: IndexMap<String, Endpoint>,
    mounts: IndexMap<String, String>,
}

impl ApiModel {
    /// Starts building a model.
    pub fn builder(docs: ApiDocs) -> ApiModelBuilder {
        ApiModelBuilder {
            docs,
            endpoints: Vec::new(),
        }
    }

    /// Document metadata.
    pub fn docs(&self) -> &ApiDocs {
        &self.docs
    }

    /// Endpoints keyed by operation id, in declaration order.
    pub fn endpoints(&self) -> &IndexMap<String, Endpoint> {
        &self.endpoints
    }

    /// Looks up one endpoint.
    pub fn endpoint(&self, operation_id: &str) -> AppResult<&Endpoint> {
        self.endpoints
            .get(operation_id)
            .ok_or_else(|| AppError::UnknownOperation(operation_id.to_string()))
    }

    /// The path `endpoint` is mounted and documented under.
    ///
    /// Paths that differ only in parameter names (`/users/:id`, `/users/:userId`)
    /// share the first declared one.
    pub fn mount_path<'a>(&'a self, endpoint: &'a Endpoint) -> &'a str {
        self.mounts
            .get(&route_shape(endpoint.path()))
            .map_or(endpoint.path(), String::as_str)
    }
}

/// Builder for [`ApiModel`].
#[derive(Debug)]
pub struct ApiModelBuilder {
    docs: ApiDocs,
    endpoints: Vec<(String, Endpoint)>,
}

impl ApiModelBuilder {
    /// Adds an endpoint under `operation_id`.
    pub fn endpoint(mut self, operation_id: impl Into<String>, endpoint: Endpoint) -> Self {
        self.endpoints.push((operation_id.into(), endpoint));
        self
    }

    /// Finalizes the model.
    ///
    /// Operation ids must be unique, and no two endpoints may share a method and
    /// a route (path templates are compared with parameter names erased).
    pub fn build(self) -> AppResult<ApiModel> {
        let mut endpoints = IndexMap::new();
        let mut routes = HashSet::new();
        let mut mounts = IndexMap::new();

        for (id, endpoint) in self.endpoints {
            if id.trim().is_empty() {
                return Err(AppError::Contract("Operation id must not be empty".into()));
            }
            let shape = route_shape(endpoint.path());
            mounts
                .entry(shape.clone())
                .or_insert_with(|| endpoint.path().to_string());
            if !routes.insert((endpoint.method(), shape)) {
                return Err(AppError::Contract(format!(
                    "Operation '{}' duplicates route {} {}",
                    id,
                    endpoint.method().wire_name(),
                    endpoint.path()
                )));
            }
            if endpoints.insert(id.clone(), endpoint).is_some() {
                return Err(AppError::Contract(format!(
                    "Duplicate operation id '{}'",
                    id
                )));
            }
        }

        Ok(ApiModel {
            docs: self.docs,
            endpoints,
            mounts,
        })
    }
}
