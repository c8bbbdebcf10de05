#![deny(missing_docs)]

//! # Spec Command
//!
//! Renders the OpenAPI document of an API definition file.

use std::fs;
use std::path::PathBuf;

use apidriven_core::{load_api_definition, render_specification, AppError, AppResult, DocumentFormat};

/// Arguments for the spec command.
#[derive(clap::Args, Debug, Clone)]
pub struct SpecArgs {
    /// Path to the API definition (JSON or YAML).
    #[clap(long, env = "APIDRIVEN_API")]
    pub api: PathBuf,

    /// Output path. Prints to stdout when omitted.
    #[clap(long)]
    pub output: Option<PathBuf>,

    /// Output format (`json` or `yaml`).
    #[clap(long, default_value = "json")]
    pub format: DocumentFormat,
}

/// Renders the document as text.
pub fn render(args: &SpecArgs) -> AppResult<String> {
    let api = load_api_definition(&args.api)?;
    render_specification(&api, args.format)
}

/// Executes the spec command.
pub fn execute(args: &SpecArgs) -> AppResult<()> {
    let document = render(args)?;

    match &args.output {
        Some(output) => {
            if let Some(parent) = output.parent().filter(|p| !p.as_os_str().is_empty()) {
                fs::create_dir_all(parent)
                    .map_err(|e| AppError::General(format!("Failed to create output dir: {}", e)))?;
            }
            fs::write(output, document)
                .map_err(|e| AppError::General(format!("Failed to write document: {}", e)))?;
            tracing::info!(output = %output.display(), "wrote OpenAPI document");
        }
        None => println!("{}", document),
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    const DEFINITION: &str = r#"
docs:
  info: { title: Users, version: 1.0.0 }
endpoints:
  getUser:
    method: get
    path: /users/:userId
    status: 200
"#;

    #[test]
    fn test_execute_writes_yaml() {
        let dir = tempdir().unwrap();
        let api = dir.path().join("api.yaml");
        let output = dir.path().join("docs/openapi.yaml");
        fs::write(&api, DEFINITION).unwrap();

        let args = SpecArgs {
            api,
            output: Some(output.clone()),
            format: DocumentFormat::Yaml,
        };
        execute(&args).unwrap();

        let written = fs::read_to_string(output).unwrap();
        let doc: serde_json::Value = serde_yaml::from_str(&written).unwrap();
        assert_eq!(doc["openapi"], "3.0.0");
        assert_eq!(doc["paths"]["/users/{userId}"]["get"]["operationId"], "getUser");
    }

    #[test]
    fn test_render_json() {
        let dir = tempdir().unwrap();
        let api = dir.path().join("api.yaml");
        fs::write(&api, DEFINITION).unwrap();

        let args = SpecArgs {
            api,
            output: None,
            format: DocumentFormat::Json,
        };
        let doc: serde_json::Value = serde_json::from_str(&render(&args).unwrap()).unwrap();
        assert_eq!(doc["info"]["title"], "Users");
    }

    #[test]
    fn test_missing_definition() {
        let dir = tempdir().unwrap();
        let args = SpecArgs {
            api: dir.path().join("missing.yaml"),
            output: None,
            format: DocumentFormat::Json,
        };
        assert!(matches!(execute(&args), Err(AppError::Io(_))));
    }
}
