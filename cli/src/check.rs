#![deny(missing_docs)]

//! # Check Command
//!
//! Loads an API definition, enforcing every contract rule, and lists its operations.

use std::path::PathBuf;

use apidriven_core::{load_api_definition, ApiModel, AppResult};
use serde::Serialize;

/// Arguments for the check command.
#[derive(clap::Args, Debug, Clone)]
pub struct CheckArgs {
    /// Path to the API definition (JSON or YAML).
    #[clap(long, env = "APIDRIVEN_API")]
    pub api: PathBuf,

    /// Print the operation table as JSON.
    #[clap(long)]
    pub json: bool,
}

/// One row of the operation table.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OperationSummary {
    /// Operation id.
    pub operation_id: String,
    /// Uppercase method.
    pub method: String,
    /// `:name` path template.
    pub path: String,
    /// Success status.
    pub status: u16,
}

/// Summarizes every operation of `api`.
pub fn summarize(api: &ApiModel) -> Vec<OperationSummary> {
    api.endpoints()
        .iter()
        .map(|(id, endpoint)| OperationSummary {
            operation_id: id.clone(),
            method: endpoint.method().wire_name().to_string(),
            path: endpoint.path().to_string(),
            status: endpoint.status(),
        })
        .collect()
}

/// Executes the check command.
pub fn execute(args: &CheckArgs) -> AppResult<()> {
    let api = load_api_definition(&args.api)?;
    let rows = summarize(&api);

    if args.json {
        println!("{}", serde_json::to_string_pretty(&rows)?);
    } else {
        println!(
            "{} v{}: {} operation(s)",
            api.docs().info.title,
            api.docs().info.version,
            rows.len()
        );
        for row in &rows {
            println!(
                "  {:<7} {:<30} {} -> {}",
                row.method, row.path, row.operation_id, row.status
            );
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidriven_core::AppError;
    use pretty_assertions::assert_eq;
    use std::fs;
    use tempfile::tempdir;

    #[test]
    fn test_summarize_definition() {
        let dir = tempdir().unwrap();
        let api = dir.path().join("api.json");
        fs::write(
            &api,
            r#"{
  "docs": { "info": { "title": "Users", "version": "1.0.0" } },
  "endpoints": {
    "createUser": { "method": "post", "path": "/users", "status": 201 }
  }
}"#,
        )
        .unwrap();

        let model = load_api_definition(&api).unwrap();
        assert_eq!(
            summarize(&model),
            vec![OperationSummary {
                operation_id: "createUser".into(),
                method: "POST".into(),
                path: "/users".into(),
                status: 201,
            }]
        );
        execute(&CheckArgs { api, json: true }).unwrap();
    }

    #[test]
    fn test_rejects_clashing_parameters() {
        let dir = tempdir().unwrap();
        let api = dir.path().join("api.yaml");
        fs::write(
            &api,
            r#"
docs: { info: { title: x, version: "1" } }
endpoints:
  getUser:
    method: get
    path: /users/:userId
    status: 200
    query:
      userId: { type: string }
"#,
        )
        .unwrap();

        let err = execute(&CheckArgs { api, json: false }).unwrap_err();
        assert!(matches!(err, AppError::Contract(_)));
    }
}
