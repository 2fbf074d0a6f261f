//! Construct paths and logical ids
//!
//! Every declared resource lives at a path such as
//! `RustLambdaFunction/ServiceRole/Resource`. The template key for that
//! resource is derived from the path alone, so the same declaration always
//! produces the same id.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Maximum length of a logical id accepted by the provider
const MAX_LOGICAL_ID_LEN: usize = 255;

/// Maximum length of the human-readable part of a path-derived id
const MAX_HUMAN_LEN: usize = 240;

/// Number of hash characters appended to path-derived ids
const HASH_LEN: usize = 8;

/// Path components left out of the human-readable part
const HIDDEN_FROM_HUMAN: &[&str] = &["Resource", "Default"];

/// Template key of a resource or output
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct LogicalId(String);

impl LogicalId {
    /// Create a logical id from a literal, rejecting ids the provider would refuse
    pub fn new(id: impl Into<String>) -> Result<Self> {
        let id = id.into();
        if id.is_empty() {
            return Err(Error::InvalidLogicalId {
                id,
                reason: "must not be empty",
            });
        }
        if id.len() > MAX_LOGICAL_ID_LEN {
            return Err(Error::InvalidLogicalId {
                id,
                reason: "must be at most 255 characters",
            });
        }
        if !id.chars().all(|c| c.is_ascii_alphanumeric()) {
            return Err(Error::InvalidLogicalId {
                id,
                reason: "must be alphanumeric",
            });
        }
        Ok(Self(id))
    }

    /// Derive a stable logical id from a construct path
    ///
    /// A single-component path maps to its alphanumeric form. Longer paths
    /// get a readable prefix plus a hash of the full path, so two paths that
    /// sanitize to the same prefix still get distinct ids.
    pub fn from_path(path: &ConstructPath) -> Self {
        let components = path.components();

        if let [only] = components {
            let candidate = remove_non_alphanumeric(only);
            if !candidate.is_empty() && candidate.len() <= MAX_LOGICAL_ID_LEN {
                return Self(candidate);
            }
        }

        let mut human = String::new();
        let mut previous: Option<&str> = None;
        for component in components {
            if HIDDEN_FROM_HUMAN.contains(&component.as_str()) {
                continue;
            }
            if previous == Some(component.as_str()) {
                continue;
            }
            human.push_str(&remove_non_alphanumeric(component));
            previous = Some(component.as_str());
        }
        human.truncate(MAX_HUMAN_LEN);

        Self(format!("{human}{}", path_hash(path)))
    }

    /// Borrow the id as a string slice
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for LogicalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl AsRef<str> for LogicalId {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

/// Position of a construct in the stack, e.g. `RustLambdaFunction/FunctionUrl`
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct ConstructPath(Vec<String>);

impl ConstructPath {
    /// A top-level construct directly under the stack
    pub fn root(id: impl Into<String>) -> Self {
        Self(vec![id.into()])
    }

    /// A child of this construct
    pub fn child(&self, id: impl Into<String>) -> Self {
        let mut components = self.0.clone();
        components.push(id.into());
        Self(components)
    }

    /// Path components from the stack downwards
    pub fn components(&self) -> &[String] {
        &self.0
    }

    /// Logical id derived from this path
    pub fn logical_id(&self) -> LogicalId {
        LogicalId::from_path(self)
    }
}

impl fmt::Display for ConstructPath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0.join("/"))
    }
}

fn remove_non_alphanumeric(s: &str) -> String {
    s.chars().filter(char::is_ascii_alphanumeric).collect()
}

fn path_hash(path: &ConstructPath) -> String {
    let hex = blake3::hash(path.to_string().as_bytes()).to_hex();
    hex[..HASH_LEN].to_uppercase()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_accepts_alphanumeric() {
        let id = LogicalId::new("EmailsTable").unwrap();
        assert_eq!(id.as_str(), "EmailsTable");
    }

    #[test]
    fn test_new_rejects_invalid() {
        assert!(LogicalId::new("").is_err());
        assert!(LogicalId::new("Lambda URL").is_err());
        assert!(LogicalId::new("a".repeat(256)).is_err());
    }

    #[test]
    fn test_single_component_is_sanitized() {
        let id = ConstructPath::root("Lambda URL").logical_id();
        assert_eq!(id.as_str(), "LambdaURL");
    }

    #[test]
    fn test_nested_path_hides_resource_and_appends_hash() {
        let id = ConstructPath::root("EmailsTable").child("Resource").logical_id();
        assert!(id.as_str().starts_with("EmailsTable"));
        assert_eq!(id.as_str().len(), "EmailsTable".len() + HASH_LEN);
        let suffix = &id.as_str()["EmailsTable".len()..];
        assert!(suffix.chars().all(|c| c.is_ascii_digit() || c.is_ascii_uppercase()));
    }

    #[test]
    fn test_path_ids_are_stable() {
        let a = ConstructPath::root("RustLambdaFunction")
            .child("ServiceRole")
            .child("Resource");
        let b = ConstructPath::root("RustLambdaFunction")
            .child("ServiceRole")
            .child("Resource");
        assert_eq!(a.logical_id(), b.logical_id());
    }

    #[test]
    fn test_distinct_paths_with_same_prefix_differ() {
        let a = ConstructPath::root("Fn").child("Resource").logical_id();
        let b = ConstructPath::root("Fn").child("Default").logical_id();
        assert_ne!(a, b);
        assert!(a.as_str().starts_with("Fn"));
        assert!(b.as_str().starts_with("Fn"));
    }

    #[test]
    fn test_consecutive_duplicates_collapsed() {
        let id = ConstructPath::root("Table").child("Table").logical_id();
        assert_eq!(id.as_str().len(), "Table".len() + HASH_LEN);
    }

    #[test]
    fn test_path_id_is_valid_logical_id() {
        let id = ConstructPath::root("Rust-Lambda")
            .child("invoke-function-url")
            .logical_id();
        assert!(LogicalId::new(id.as_str()).is_ok());
    }

    #[test]
    fn test_display_path() {
        let path = ConstructPath::root("RustLambdaFunction").child("FunctionUrl");
        assert_eq!(path.to_string(), "RustLambdaFunction/FunctionUrl");
    }
}
