#![deny(missing_docs)]

//! # OpenAPI Document Assembly
//!
//! Builds an OpenAPI 3.0 document from an [`ApiModel`]. The document is a
//! plain `serde_json::Value` so it can be emitted as JSON or YAML unchanged.

use crate::contract::{extract_path_params, to_template_path, ApiModel, Endpoint};
use crate::error::AppResult;
use crate::schema::Schema;
use indexmap::IndexMap;
use serde_json::{json, Map, Value};

/// OpenAPI version stamped on every document.
pub const OPENAPI_VERSION: &str = "3.0.0";

/// Assembles the specification document for `api`.
///
/// The document carries the model's metadata, `openapi` and one operation per
/// endpoint keyed by `{name}` template path and lowercase method. Paths that
/// differ only in parameter names are documented under the first declared one.
pub fn build_specification(api: &ApiModel) -> AppResult<Value> {
    let mut doc = match serde_json::to_value(api.docs())? {
        Value::Object(map) => map,
        _ => Map::new(),
    };

    let mut paths: IndexMap<String, Map<String, Value>> = IndexMap::new();
    for (id, endpoint) in api.endpoints() {
        let mount = api.mount_path(endpoint);
        let operation = operation_at(id, endpoint, &extract_path_params(mount))?;
        paths
            .entry(to_template_path(mount))
            .or_default()
            .insert(endpoint.method().as_str().to_string(), Value::Object(operation));
    }

    doc.insert("openapi".into(), json!(OPENAPI_VERSION));
    doc.insert(
        "paths".into(),
        Value::Object(paths.into_iter().map(|(k, v)| (k, Value::Object(v))).collect()),
    );

    tracing::debug!(operations = api.endpoints().len(), "assembled specification");
    Ok(Value::Object(doc))
}

/// One operation object: the docs fragment completed from the contract.
pub fn build_operation(operation_id: &str, endpoint: &Endpoint) -> AppResult<Map<String, Value>> {
    operation_at(operation_id, endpoint, endpoint.path_params())
}

fn operation_at(
    operation_id: &str,
    endpoint: &Endpoint,
    path_names: &[String],
) -> AppResult<Map<String, Value>> {
    let mut operation = Map::new();
    operation.insert("operationId".into(), json!(operation_id));
    if let Some(docs) = endpoint.docs() {
        if let Value::Object(fragment) = serde_json::to_value(docs)? {
            operation.extend(fragment);
        }
    }

    default_response(&mut operation, endpoint);
    if let Some(schema) = endpoint.request_body() {
        operation.insert(
            "requestBody".into(),
            json!({
                "required": true,
                "content": { "application/json": { "schema": schema.describe() } },
            }),
        );
    }
    append_parameters(&mut operation, endpoint, path_names);

    Ok(operation)
}

fn default_response(operation: &mut Map<String, Value>, endpoint: &Endpoint) {
    let Some(responses) = object_entry(operation, "responses") else {
        return;
    };
    let Some(response) = object_entry(responses, &endpoint.status().to_string()) else {
        return;
    };
    if !response.get("description").is_some_and(Value::is_string) {
        response.insert("description".into(), json!(""));
    }
    if let Some(schema) = endpoint.response_body() {
        response.insert(
            "content".into(),
            json!({ "application/json": { "schema": schema.describe() } }),
        );
    }
}

fn append_parameters(operation: &mut Map<String, Value>, endpoint: &Endpoint, path_names: &[String]) {
    let mut parameters = match operation.remove("parameters") {
        Some(Value::Array(existing)) => existing,
        _ => Vec::new(),
    };

    for name in path_names {
        parameters.push(json!({
            "name": name,
            "in": "path",
            "required": true,
            "schema": { "type": "string" },
        }));
    }
    parameters.extend(describe_params("query", endpoint.query()));
    parameters.extend(describe_params("header", endpoint.headers()));

    operation.insert("parameters".into(), Value::Array(parameters));
}

fn describe_params<'a>(
    location: &'a str,
    params: &'a IndexMap<String, Schema>,
) -> impl Iterator<Item = Value> + 'a {
    params.iter().map(move |(name, schema)| {
        json!({
            "name": name,
            "in": location,
            "required": !schema.is_optional(),
            "schema": schema.describe(),
        })
    })
}

/// `map[key]` as an object, replacing any non-object value.
fn object_entry<'a>(map: &'a mut Map<String, Value>, key: &str) -> Option<&'a mut Map<String, Value>> {
    let slot = map.entry(key.to_string()).or_insert_with(|| json!({}));
    if !slot.is_object() {
        *slot = json!({});
    }
    slot.as_object_mut()
}
