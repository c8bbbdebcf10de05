#![deny(missing_docs)]

//! # Apidriven CLI
//!
//! Command Line Interface over API definition files.
//!
//! Supported Commands:
//! - `spec`: Renders the OpenAPI document of a definition.
//! - `check`: Validates a definition and lists its operations.
//! - `call`: Invokes one operation over HTTP.

use apidriven_core::AppResult;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

mod call;
mod check;
mod error;
mod spec;

#[derive(Parser, Debug)]
#[clap(author, version, about = "Contract-driven API toolchain")]
struct Cli {
    #[clap(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Render the OpenAPI document of an API definition.
    Spec(spec::SpecArgs),
    /// Validate an API definition and list its operations.
    Check(check::CheckArgs),
    /// Call one operation of an API definition.
    Call(call::CallArgs),
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr)
        .try_init();
}

fn main() -> AppResult<()> {
    dotenvy::dotenv().ok();
    init_tracing();
    let cli = Cli::parse();

    match &cli.command {
        Commands::Spec(args) => spec::execute(args)?,
        Commands::Check(args) => check::execute(args)?,
        Commands::Call(args) => call::execute(args)?,
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli_structure() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_call_arguments() {
        let cli = Cli::try_parse_from([
            "apidriven",
            "call",
            "--api",
            "api.yaml",
            "--operation",
            "getUser",
            "--param",
            "userId=0",
            "--param",
            "X-Tenant=acme",
            "--dry-run",
        ])
        .unwrap();
        match cli.command {
            Commands::Call(args) => {
                assert_eq!(args.operation, "getUser");
                assert_eq!(args.params.len(), 2);
                assert!(args.dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_rejects_malformed_param() {
        let res = Cli::try_parse_from([
            "apidriven",
            "call",
            "--api",
            "api.yaml",
            "--operation",
            "getUser",
            "--param",
            "userId",
        ]);
        assert!(res.is_err());
    }
}
