#![deny(missing_docs)]

//! # CLI Errors
//!
//! Error types for the CLI crate.

use apidriven_core::AppError;
use derive_more::{Display, From};

/// Main error enum for CLI operations.
#[derive(Debug, Display, From)]
pub enum CliError {
    /// IO Error wrapper.
    #[display("IO Error: {}", _0)]
    Io(std::io::Error),

    /// A command line value that could not be interpreted.
    #[from(ignore)]
    #[display("Invalid argument: {}", _0)]
    InvalidArgument(String),
}

/// Manual implementation of the standard Error trait.
///
/// We implement this manually (instead of `derive(Error)`) because the `InvalidArgument(String)`
/// variant contains a `String`, which does not implement `std::error::Error`, causing
/// auto-derived `source()` implementations to fail compilation.
impl std::error::Error for CliError {}

impl From<CliError> for AppError {
    fn from(err: CliError) -> Self {
        match err {
            CliError::Io(e) => AppError::Io(e),
            other @ CliError::InvalidArgument(_) => AppError::General(other.to_string()),
        }
    }
}

/// Result type alias.
pub type CliResult<T> = Result<T, CliError>;

/// Splits a `key=value` argument.
pub fn parse_key_value(raw: &str) -> CliResult<(String, String)> {
    match raw.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(CliError::InvalidArgument(format!(
            "expected KEY=VALUE, got '{}'",
            raw
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_key_value() {
        assert_eq!(
            parse_key_value("userId=0").unwrap(),
            ("userId".to_string(), "0".to_string())
        );
        assert_eq!(
            parse_key_value("q=a=b").unwrap(),
            ("q".to_string(), "a=b".to_string())
        );
        assert_eq!(parse_key_value("empty=").unwrap().1, "");
        assert!(matches!(
            parse_key_value("novalue"),
            Err(CliError::InvalidArgument(_))
        ));
        assert!(parse_key_value("=x").is_err());
    }

    #[test]
    fn test_converts_into_app_error() {
        let err: AppError = CliError::InvalidArgument("bad".into()).into();
        assert!(matches!(err, AppError::General(msg) if msg == "Invalid argument: bad"));
    }

    #[test]
    fn test_io_error_keeps_its_kind() {
        let err: AppError = CliError::from(std::io::Error::from(std::io::ErrorKind::NotFound)).into();
        assert!(matches!(err, AppError::Io(e) if e.kind() == std::io::ErrorKind::NotFound));
    }
}
