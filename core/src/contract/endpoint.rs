#![deny(missing_docs)]

//! # Endpoint Contracts
//!
//! An [`Endpoint`] describes one HTTP operation: method, path template, parameter
//! schemas, body schemas and success status. It is built once through an
//! [`EndpointBuilder`] and never mutated afterwards.

use crate::contract::method::HttpMethod;
use crate::contract::path::{to_template_path, validate_path_params};
use crate::error::{AppError, AppResult};
use crate::schema::{Schema, Validator};
use indexmap::IndexMap;
use utoipa::openapi::path::Operation;

/// Validators compiled when the endpoint is built.
#[derive(Debug, Clone)]
pub(crate) struct EndpointValidators {
    pub(crate) query: Validator,
    pub(crate) headers: Validator,
    pub(crate) request_body: Option<Validator>,
    pub(crate) response_body: Option<Validator>,
}

/// An immutable HTTP operation contract.
#[derive(Debug, Clone)]
pub struct Endpoint {
    method: HttpMethod,
    path: String,
    path_params: Vec<String>,
    query: IndexMap<String, Schema>,
    headers: IndexMap<String, Schema>,
    request_body: Option<Schema>,
    response_body: Option<Schema>,
    status: u16,
    docs: Option<Operation>,
    validators: EndpointValidators,
}

impl Endpoint {
    /// Starts a contract for `method` on `path`.
    pub fn builder(method: HttpMethod, path: impl Into<String>) -> EndpointBuilder {
        EndpointBuilder::new(method, path)
    }

    /// HTTP method.
    pub fn method(&self) -> HttpMethod {
        self.method
    }

    /// Path template with `:name` parameters.
    pub fn path(&self) -> &str {
        &self.path
    }

    /// Path template with `{name}` parameters.
    pub fn template_path(&self) -> String {
        to_template_path(&self.path)
    }

    /// Path parameter names in order of appearance.
    pub fn path_params(&self) -> &[String] {
        &self.path_params
    }

    /// Declared query parameters.
    pub fn query(&self) -> &IndexMap<String, Schema> {
        &self.query
    }

    /// Declared header parameters.
    pub fn headers(&self) -> &IndexMap<String, Schema> {
        &self.headers
    }

    /// Request body schema, if a body is expected.
    pub fn request_body(&self) -> Option<&Schema> {
        self.request_body.as_ref()
    }

    /// Response body schema, if the response is validated and serialized as JSON.
    pub fn response_body(&self) -> Option<&Schema> {
        self.response_body.as_ref()
    }

    /// Success status code.
    pub fn status(&self) -> u16 {
        self.status
    }

    /// Supplementary documentation merged into the generated operation.
    pub fn docs(&self) -> Option<&Operation> {
        self.docs.as_ref()
    }

    pub(crate) fn validators(&self) -> &EndpointValidators {
        &self.validators
    }
}

/// Builder for [`Endpoint`].
#[derive(Debug, Clone)]
pub struct EndpointBuilder {
    method: HttpMethod,
    path: String,
    status: Option<u16>,
    query: IndexMap<String, Schema>,
    headers: IndexMap<String, Schema>,
    request_body: Option<Schema>,
    response_body: Option<Schema>,
    docs: Option<Operation>,
}

impl EndpointBuilder {
    /// Creates a builder for `method` on `path`.
    pub fn new(method: HttpMethod, path: impl Into<String>) -> Self {
        Self {
            method,
            path: path.into(),
            status: None,
            query: IndexMap::new(),
            headers: IndexMap::new(),
            request_body: None,
            response_body: None,
            docs: None,
        }
    }

    /// Sets the success status code (required).
    pub fn status(mut self, status: u16) -> Self {
        self.status = Some(status);
        self
    }

    /// Declares a query parameter.
    pub fn query(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.query.insert(name.into(), schema);
        self
    }

    /// Declares a header parameter.
    pub fn header(mut self, name: impl Into<String>, schema: Schema) -> Self {
        self.headers.insert(name.into(), schema);
        self
    }

    /// Declares the request body schema.
    pub fn request_body(mut self, schema: Schema) -> Self {
        self.request_body = Some(schema);
        self
    }

    /// Declares the response body schema.
    pub fn response_body(mut self, schema: Schema) -> Self {
        self.response_body = Some(schema);
        self
    }

    /// Attaches an OpenAPI operation fragment (summary, tags, extra responses...).
    pub fn docs(mut self, docs: Operation) -> Self {
        self.docs = Some(docs);
        self
    }

    /// Validates the contract and compiles its schemas.
    ///
    /// Fails when the status is missing or out of range, when the path repeats a
    /// parameter, when a name appears in more than one parameter namespace, or
    /// when a schema does not compile.
    pub fn build(self) -> AppResult<Endpoint> {
        let route = format!("{} {}", self.method.wire_name(), self.path);

        if !self.path.starts_with('/') {
            return Err(AppError::Contract(format!(
                "Endpoint '{}': path must start with '/'",
                route
            )));
        }

        let status = self.status.ok_or_else(|| {
            AppError::Contract(format!("Endpoint '{}' is missing a status code", route))
        })?;
        if !(100..=599).contains(&status) {
            return Err(AppError::Contract(format!(
                "Endpoint '{}': status {} is not a valid HTTP status code",
                route, status
            )));
        }

        let path_params = validate_path_params(&self.path)?;
        check_parameter_surface(&route, &path_params, &self.query, &self.headers)?;

        let validators = EndpointValidators {
            query: Validator::compile(&surface_schema(&self.query))?,
            headers: Validator::compile(&surface_schema(&self.headers))?,
            request_body: self.request_body.as_ref().map(Validator::compile).transpose()?,
            response_body: self.response_body.as_ref().map(Validator::compile).transpose()?,
        };

        tracing::debug!(route = %route, params = ?path_params, "built endpoint contract");

        Ok(Endpoint {
            method: self.method,
            path: self.path,
            path_params,
            query: self.query,
            headers: self.headers,
            request_body: self.request_body,
            response_body: self.response_body,
            status,
            docs: self.docs,
            validators,
        })
    }
}

/// Strict object schema over a parameter namespace.
fn surface_schema(params: &IndexMap<String, Schema>) -> Schema {
    Schema::strict_object(params.iter().map(|(k, v)| (k.clone(), v.clone())))
}

/// Rejects names shared between namespaces. Header names compare case-insensitively.
fn check_parameter_surface(
    route: &str,
    path_params: &[String],
    query: &IndexMap<String, Schema>,
    headers: &IndexMap<String, Schema>,
) -> AppResult<()> {
    for name in query.keys() {
        if path_params.contains(name) {
            return Err(AppError::Contract(format!(
                "Endpoint '{}': '{}' is declared both as a path and a query parameter",
                route, name
            )));
        }
    }

    let header_names: Vec<&String> = headers.keys().collect();
    for (i, header) in header_names.iter().enumerate() {
        if header_names[..i]
            .iter()
            .any(|other| other.eq_ignore_ascii_case(header))
        {
            return Err(AppError::Contract(format!(
                "Endpoint '{}': header '{}' is declared twice",
                route, header
            )));
        }
        let clash = path_params
            .iter()
            .chain(query.keys())
            .find(|name| name.eq_ignore_ascii_case(header));
        if let Some(name) = clash {
            return Err(AppError::Contract(format!(
                "Endpoint '{}': header '{}' clashes with parameter '{}'",
                route, header, name
            )));
        }
    }

    Ok(())
}

macro_rules! method_builders {
    ($($(#[$doc:meta])* $name:ident => $method:ident),* $(,)?) => {
        $(
            $(#[$doc])*
            pub fn $name(path: impl Into<String>) -> EndpointBuilder {
                EndpointBuilder::new(HttpMethod::$method, path)
            }
        )*
    };
}

method_builders! {
    /// Starts a `GET` contract.
    get => Get,
    /// Starts a `POST` contract.
    post => Post,
    /// Starts a `PUT` contract.
    put => Put,
    /// Starts a `DELETE` contract.
    delete => Delete,
    /// Starts a `PATCH` contract.
    patch => Patch,
    /// Starts an `OPTIONS` contract.
    options => Options,
    /// Starts a `HEAD` contract.
    head => Head,
}
