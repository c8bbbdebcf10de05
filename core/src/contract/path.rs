//! # Path Templates
//!
//! Path templates mark parameters with `:name` segments (`/users/:userId`).
//! A name is the maximal run of non-`/` characters following a colon.

use crate::error::{AppError, AppResult};
use regex::{Captures, Regex};
use std::collections::HashSet;
use std::sync::OnceLock;

fn param_re() -> &'static Regex {
    static PARAM_RE: OnceLock<Regex> = OnceLock::new();
    PARAM_RE.get_or_init(|| Regex::new(r":([^/]+)").expect("Invalid regex"))
}

/// Extracts parameter names in order of first appearance.
///
/// A path without colons yields an empty list.
pub fn extract_path_params(path: &str) -> Vec<String> {
    param_re()
        .captures_iter(path)
        .map(|caps| caps[1].to_string())
        .collect()
}

/// Extracts parameter names, rejecting templates that repeat a name.
pub fn validate_path_params(path: &str) -> AppResult<Vec<String>> {
    let params = extract_path_params(path);
    let mut seen = HashSet::new();
    for name in &params {
        if !seen.insert(name.as_str()) {
            return Err(AppError::Contract(format!(
                "Duplicate path parameter ':{}' in '{}'",
                name, path
            )));
        }
    }
    Ok(params)
}

/// Replaces every `:name` token in a single pass.
///
/// Each token is matched whole, so `:id` never rewrites part of `:identifier`.
pub fn substitute_path<F>(path: &str, mut value_of: F) -> String
where
    F: FnMut(&str) -> String,
{
    param_re()
        .replace_all(path, |caps: &Captures| value_of(&caps[1]))
        .into_owned()
}

/// Converts `:name` segments into `{name}` templating (OpenAPI and actix-web syntax).
pub fn to_template_path(path: &str) -> String {
    substitute_path(path, |name| format!("{{{}}}", name))
}

/// Erases parameter names: `/users/:userId` and `/users/:id` match the same requests.
pub fn route_shape(path: &str) -> String {
    substitute_path(path, |_| ":".to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extracts_in_order_of_appearance() {
        assert_eq!(
            extract_path_params("/orgs/:orgId/users/:userId"),
            vec!["orgId", "userId"]
        );
    }

    #[test]
    fn test_no_colons_yields_empty() {
        assert!(extract_path_params("/users").is_empty());
        assert!(extract_path_params("/").is_empty());
    }

    #[test]
    fn test_name_is_maximal_non_slash_run() {
        assert_eq!(extract_path_params("/files/:name.json"), vec!["name.json"]);
        assert_eq!(extract_path_params("/a/:x/b"), vec!["x"]);
    }

    #[test]
    fn test_duplicate_names_rejected() {
        let err = validate_path_params("/a/:id/b/:id").unwrap_err();
        assert!(err.to_string().contains("Duplicate path parameter ':id'"));
    }

    #[test]
    fn test_substitution_respects_token_boundaries() {
        let out = substitute_path("/x/:id/:identifier", |name| match name {
            "id" => "1".into(),
            "identifier" => "long".into(),
            _ => String::new(),
        });
        assert_eq!(out, "/x/1/long");
    }

    #[test]
    fn test_template_path() {
        assert_eq!(to_template_path("/users/:userId/posts/:postId"), "/users/{userId}/posts/{postId}");
        assert_eq!(to_template_path("/users"), "/users");
    }

    #[test]
    fn test_route_shape_ignores_names() {
        assert_eq!(route_shape("/users/:id"), route_shape("/users/:userId"));
        assert_ne!(route_shape("/users/:id"), route_shape("/users/:id/posts"));
    }
}
