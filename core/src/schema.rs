#![deny(missing_docs)]

//! # Schema
//!
//! Validation schemas attached to contract fields.
//!
//! A [`Schema`] is a JSON Schema document plus an `optional` marker. It is a plain
//! value: cheap to clone, comparable, and serializable into API definition files.
//! Validation happens through a [`Validator`], compiled once by the validation engine
//! when an endpoint is built.

use crate::error::{AppError, AppResult};
use jsonschema::JSONSchema;
use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;
use std::sync::Arc;

/// A single failed constraint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationIssue {
    /// JSON pointer to the offending value (empty for the root).
    pub path: String,
    /// Reason reported by the validation engine.
    pub message: String,
}

impl ValidationIssue {
    /// Creates a new issue.
    pub fn new(path: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            message: message.into(),
        }
    }
}

/// Detailed failure report for one validated value.
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize, Deserialize)]
pub struct ValidationReport {
    /// Every failed constraint, in engine order.
    pub issues: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Creates a report from a list of issues.
    pub fn new(issues: Vec<ValidationIssue>) -> Self {
        Self { issues }
    }

    /// Report with a single issue at the root.
    pub fn single(message: impl Into<String>) -> Self {
        Self::new(vec![ValidationIssue::new("", message)])
    }
}

impl fmt::Display for ValidationReport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut first = true;
        for issue in &self.issues {
            if !first {
                write!(f, "; ")?;
            }
            first = false;
            let path = if issue.path.is_empty() { "/" } else { &issue.path };
            write!(f, "{}: {}", path, issue.message)?;
        }
        Ok(())
    }
}

/// A JSON Schema definition with an optionality marker.
///
/// Optional schemas make the corresponding query/header parameter or object
/// property non-required; a top-level optional body also accepts `null`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(try_from = "Value", into = "Value")]
pub struct Schema {
    definition: Value,
    optional: bool,
}

impl Schema {
    /// Wraps a raw JSON Schema document (an object or a boolean).
    pub fn from_json(definition: Value) -> AppResult<Self> {
        match definition {
            Value::Object(_) | Value::Bool(_) => Ok(Self {
                definition,
                optional: false,
            }),
            other => Err(AppError::Schema(format!(
                "schema must be an object or a boolean, got {}",
                other
            ))),
        }
    }

    /// Derives the schema of a Rust type from its `utoipa` introspection.
    ///
    /// Nested types should be `#[schema(inline)]`: component references are not resolved.
    pub fn of<T: utoipa::PartialSchema>() -> AppResult<Self> {
        let definition = serde_json::to_value(T::schema())?;
        Self::from_json(definition)
    }

    /// `{"type": "string"}`
    pub fn string() -> Self {
        Self::typed("string")
    }

    /// `{"type": "integer"}`
    ///
    /// Query and header values reach the server as strings and are not coerced,
    /// so an integer query parameter never validates there. Constrain a string
    /// instead: `Schema::from_json(json!({"type": "string", "pattern": "^[0-9]+$"}))`.
    pub fn integer() -> Self {
        Self::typed("integer")
    }

    /// `{"type": "number"}`
    ///
    /// Meant for bodies; see [`Schema::integer`] for query and header values.
    pub fn number() -> Self {
        Self::typed("number")
    }

    /// `{"type": "boolean"}`
    ///
    /// Meant for bodies; see [`Schema::integer`] for query and header values.
    pub fn boolean() -> Self {
        Self::typed("boolean")
    }

    /// An array whose items match `items`.
    pub fn array(items: Schema) -> Self {
        Self {
            definition: json!({ "type": "array", "items": items.definition }),
            optional: false,
        }
    }

    /// An object with the given properties; unknown properties are allowed.
    pub fn object<K, I>(properties: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self::object_schema(properties, false)
    }

    /// An object with the given properties; unknown properties are rejected.
    pub fn strict_object<K, I>(properties: I) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        Self::object_schema(properties, true)
    }

    /// Rejects properties an object schema does not list.
    ///
    /// Useful with [`Schema::of`], whose derived objects allow unknown fields.
    pub fn strict(mut self) -> Self {
        if let Value::Object(definition) = &mut self.definition {
            definition.insert("additionalProperties".into(), json!(false));
        }
        self
    }

    /// Marks the schema optional.
    pub fn optional(mut self) -> Self {
        self.optional = true;
        self
    }

    /// Whether the schema is optional.
    pub fn is_optional(&self) -> bool {
        self.optional
    }

    /// The raw JSON Schema document.
    pub fn definition(&self) -> &Value {
        &self.definition
    }

    /// Structural descriptor for documents: the definition without its `$schema` dialect.
    pub fn describe(&self) -> Value {
        match &self.definition {
            Value::Object(map) => {
                let mut out = map.clone();
                out.remove("$schema");
                Value::Object(out)
            }
            Value::Bool(true) => json!({}),
            Value::Bool(false) => json!({ "not": {} }),
            other => other.clone(),
        }
    }

    fn typed(ty: &str) -> Self {
        Self {
            definition: json!({ "type": ty }),
            optional: false,
        }
    }

    fn object_schema<K, I>(properties: I, strict: bool) -> Self
    where
        K: Into<String>,
        I: IntoIterator<Item = (K, Schema)>,
    {
        let mut props = Map::new();
        let mut required = Vec::new();
        for (name, schema) in properties {
            let name = name.into();
            if !schema.optional {
                required.push(Value::String(name.clone()));
            }
            props.insert(name, schema.definition);
        }

        let mut definition = Map::new();
        definition.insert("type".into(), json!("object"));
        definition.insert("properties".into(), Value::Object(props));
        if !required.is_empty() {
            definition.insert("required".into(), Value::Array(required));
        }
        if strict {
            definition.insert("additionalProperties".into(), json!(false));
        }

        Self {
            definition: Value::Object(definition),
            optional: false,
        }
    }
}

impl TryFrom<Value> for Schema {
    type Error = String;

    fn try_from(value: Value) -> Result<Self, Self::Error> {
        match value {
            Value::Object(mut map) => {
                let optional = match map.remove("optional") {
                    None => false,
                    Some(Value::Bool(flag)) => flag,
                    Some(other) => return Err(format!("'optional' must be a boolean, got {}", other)),
                };
                Ok(Self {
                    definition: Value::Object(map),
                    optional,
                })
            }
            Value::Bool(_) => Ok(Self {
                definition: value,
                optional: false,
            }),
            other => Err(format!("schema must be an object or a boolean, got {}", other)),
        }
    }
}

impl From<Schema> for Value {
    fn from(schema: Schema) -> Self {
        match schema.definition {
            Value::Object(mut map) if schema.optional => {
                map.insert("optional".into(), Value::Bool(true));
                Value::Object(map)
            }
            other => other,
        }
    }
}

/// A schema compiled by the validation engine.
///
/// Compiled once at endpoint construction and shared across requests.
#[derive(Clone)]
pub struct Validator {
    compiled: Arc<JSONSchema>,
    optional: bool,
}

impl Validator {
    /// Compiles a schema, failing on definitions the engine rejects.
    pub fn compile(schema: &Schema) -> AppResult<Self> {
        let compiled = JSONSchema::options()
            .compile(&schema.definition)
            .map_err(|e| AppError::Schema(format!("{} (at {})", e, e.schema_path)))?;
        Ok(Self {
            compiled: Arc::new(compiled),
            optional: schema.optional,
        })
    }

    /// Validates a value, returning the validated data or the engine's report.
    pub fn validate(&self, value: &Value) -> Result<Value, ValidationReport> {
        if self.optional && value.is_null() {
            return Ok(Value::Null);
        }
        match self.compiled.validate(value) {
            Ok(()) => Ok(value.clone()),
            Err(errors) => Err(ValidationReport::new(
                errors
                    .map(|e| ValidationIssue::new(e.instance_path.to_string(), e.to_string()))
                    .collect(),
            )),
        }
    }
}

impl fmt::Debug for Validator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Validator")
            .field("optional", &self.optional)
            .finish_non_exhaustive()
    }
}
