#![deny(missing_docs)]

//! # OpenAPI Generation
//!
//! Derives the OpenAPI document of an API model and renders it as JSON or YAML.

pub mod document;

pub use document::{build_operation, build_specification, OPENAPI_VERSION};

use crate::contract::ApiModel;
use crate::error::AppResult;

/// Output format for rendered documents.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum DocumentFormat {
    /// Pretty-printed JSON.
    #[default]
    Json,
    /// YAML.
    Yaml,
}

impl std::str::FromStr for DocumentFormat {
    type Err = crate::error::AppError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(DocumentFormat::Json),
            "yaml" | "yml" => Ok(DocumentFormat::Yaml),
            other => Err(crate::error::AppError::General(format!(
                "Unknown document format '{}'",
                other
            ))),
        }
    }
}

/// Renders the specification of `api` in `format`.
pub fn render_specification(api: &ApiModel, format: DocumentFormat) -> AppResult<String> {
    let spec = build_specification(api)?;
    match format {
        DocumentFormat::Json => Ok(serde_json::to_string_pretty(&spec)?),
        DocumentFormat::Yaml => Ok(serde_yaml::to_string(&spec)?),
    }
}
