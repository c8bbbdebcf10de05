#![deny(missing_docs)]

//! # Call Command
//!
//! Invokes one operation of an API definition over HTTP.

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Duration;

use apidriven_core::client::RequestDescriptor;
use apidriven_core::{
    load_api_definition, ApiClient, AppError, AppResult, CallConfig, RequestOptions, UreqTransport,
};
use serde_json::Value;

use crate::error::{parse_key_value, CliError, CliResult};

/// Arguments for the call command.
#[derive(clap::Args, Debug, Clone)]
pub struct CallArgs {
    /// Path to the API definition (JSON or YAML).
    #[clap(long, env = "APIDRIVEN_API")]
    pub api: PathBuf,

    /// Operation id to invoke.
    #[clap(long)]
    pub operation: String,

    /// Path, query or header parameter (`name=value`, repeatable).
    #[clap(long = "param", value_parser = parse_key_value)]
    pub params: Vec<(String, String)>,

    /// Generic request header (`name=value`, repeatable).
    #[clap(long = "header", value_parser = parse_key_value)]
    pub headers: Vec<(String, String)>,

    /// JSON request body.
    #[clap(long)]
    pub body: Option<String>,

    /// Base URL requests are resolved against.
    #[clap(long, env = "APIDRIVEN_BASE_URL", default_value = "http://127.0.0.1:8080")]
    pub base_url: String,

    /// Whole-request timeout in seconds.
    #[clap(long)]
    pub timeout_secs: Option<u64>,

    /// Print the assembled request instead of sending it.
    #[clap(long)]
    pub dry_run: bool,
}

/// Builds the call configuration from the command line values.
pub fn call_config(args: &CallArgs) -> CliResult<CallConfig> {
    let mut config = CallConfig::new();
    for (name, value) in &args.params {
        config = config.param(name.clone(), value.clone());
    }
    for (name, value) in &args.headers {
        config = config.header(name.clone(), value.clone());
    }
    if let Some(raw) = &args.body {
        let body: Value = serde_json::from_str(raw)
            .map_err(|e| CliError::InvalidArgument(format!("--body is not valid JSON: {}", e)))?;
        config = config.body(body);
    }
    Ok(config.options(RequestOptions {
        base_url: Some(args.base_url.clone()),
        timeout: args.timeout_secs.map(Duration::from_secs),
        ..RequestOptions::default()
    }))
}

/// Renders an assembled request as an HTTP-like preview.
pub fn describe_request(request: &RequestDescriptor) -> String {
    let mut out = format!("{} {}", request.method.wire_name(), request.url);
    for (name, value) in &request.headers {
        out.push_str(&format!("\n{}: {}", name, value));
    }
    if let Some(body) = &request.body {
        out.push_str(&format!("\n\n{}", body));
    }
    out
}

/// Executes the call command.
pub fn execute(args: &CallArgs) -> AppResult<()> {
    let api = load_api_definition(&args.api)?;
    let config = call_config(args)?;
    let client = ApiClient::new(Arc::new(api), UreqTransport::new());

    if args.dry_run {
        let request = client.request(&args.operation, config)?;
        println!("{}", describe_request(&request));
        return Ok(());
    }

    let response = client.call(&args.operation, config)?;
    println!("{}", response.status);
    if !response.body.is_empty() {
        match response.json() {
            Ok(json) => println!("{}", serde_json::to_string_pretty(&json)?),
            Err(_) => println!("{}", response.body),
        }
    }

    if !response.is_success() {
        return Err(AppError::General(format!(
            "Operation '{}' answered with status {}",
            args.operation, response.status
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use apidriven_core::HttpMethod;
    use std::fs;
    use tempfile::tempdir;

    fn args(api: PathBuf) -> CallArgs {
        CallArgs {
            api,
            operation: "findUser".into(),
            params: vec![("userId".into(), "0".into())],
            headers: vec![("Accept".into(), "application/json".into())],
            body: None,
            base_url: "http://localhost:9".into(),
            timeout_secs: Some(1),
            dry_run: true,
        }
    }

    fn definition() -> (tempfile::TempDir, PathBuf) {
        let dir = tempdir().unwrap();
        let api = dir.path().join("api.yaml");
        fs::write(
            &api,
            r#"
docs: { info: { title: Users, version: 1.0.0 } }
endpoints:
  findUser:
    method: get
    path: /users
    status: 200
    query:
      userId: { type: string }
"#,
        )
        .unwrap();
        (dir, api)
    }

    #[test]
    fn test_call_config_from_args() {
        let (_dir, api) = definition();
        let mut args = args(api);
        args.body = Some(r#"{"a":1}"#.into());

        let config = call_config(&args).unwrap();
        assert_eq!(config.params["userId"], "0");
        assert_eq!(config.headers["Accept"], "application/json");
        assert_eq!(config.body, Some(serde_json::json!({"a": 1})));
        assert_eq!(config.options.base_url.as_deref(), Some("http://localhost:9"));
        assert_eq!(config.options.timeout, Some(Duration::from_secs(1)));
    }

    #[test]
    fn test_invalid_body_rejected() {
        let (_dir, api) = definition();
        let mut args = args(api);
        args.body = Some("{oops".into());
        assert!(matches!(call_config(&args), Err(CliError::InvalidArgument(_))));
    }

    #[test]
    fn test_dry_run_prints_request() {
        let (_dir, api) = definition();
        execute(&args(api)).unwrap();
    }

    #[test]
    fn test_describe_request() {
        let request = RequestDescriptor {
            method: HttpMethod::Post,
            url: "/users".into(),
            headers: [("X-Trace".to_string(), "1".to_string())].into_iter().collect(),
            body: Some(serde_json::json!({"userId": "0"})),
            options: RequestOptions::default(),
        };
        assert_eq!(
            describe_request(&request),
            "POST /users\nX-Trace: 1\n\n{\"userId\":\"0\"}"
        );
    }

    #[test]
    fn test_unknown_operation() {
        let (_dir, api) = definition();
        let mut args = args(api);
        args.operation = "nope".into();
        assert!(matches!(execute(&args), Err(AppError::UnknownOperation(_))));
    }
}
