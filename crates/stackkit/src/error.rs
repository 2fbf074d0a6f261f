//! Error types for provisioning plans.
//!
//! Errors are categorized so callers can tell a malformed declaration apart
//! from a missing artifact or a failure inside the provisioning engine.

use std::fmt;
use std::io;
use std::path::PathBuf;

/// Result type alias for stackkit operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Categories of stackkit errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// The declared resource graph is structurally invalid.
    Declaration,
    /// A deployable artifact is missing or was not staged.
    Asset,
    /// Filesystem or serialization failure while writing the request.
    Io,
    /// The provisioning engine rejected or failed the request.
    Engine,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    #[must_use]
    pub fn description(&self) -> &'static str {
        match self {
            Self::Declaration => "Invalid resource declaration",
            Self::Asset => "Deployment artifact problem",
            Self::Io => "Could not write provisioning request",
            Self::Engine => "Provisioning engine failure",
        }
    }

    /// Get actionable advice for resolving this error category.
    #[must_use]
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Declaration => "Check resource names and references in the stack definition",
            Self::Asset => "Build and package the function artifact before synthesizing",
            Self::Io => "Check that the output directory is writable",
            Self::Engine => "Check the engine output for details",
        }
    }
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.description())
    }
}

/// Errors that can occur while building, rendering or submitting a plan.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Logical id is empty, too long, or contains non-alphanumeric characters.
    #[error("invalid logical id '{id}': {reason}")]
    InvalidLogicalId {
        /// The rejected id.
        id: String,
        /// Why it was rejected.
        reason: &'static str,
    },

    /// Two resources or outputs share a logical id.
    #[error("duplicate logical id: {0}")]
    DuplicateLogicalId(String),

    /// A `Ref` or `Fn::GetAtt` names a resource that is not in the template.
    #[error("{from} references unknown resource '{target}'")]
    UnknownReference {
        /// Resource or output holding the reference.
        from: String,
        /// The missing target.
        target: String,
    },

    /// A `DependsOn` entry names a resource that is not in the template.
    #[error("{from} depends on unknown resource '{target}'")]
    UnknownDependency {
        /// Resource declaring the dependency.
        from: String,
        /// The missing target.
        target: String,
    },

    /// Asset path does not exist at staging time.
    #[error("asset not found: {}", .0.display())]
    AssetNotFound(PathBuf),

    /// A resource was rendered before its asset was staged.
    #[error("asset not staged: {}", .0.display())]
    AssetNotStaged(PathBuf),

    /// IO error during file operations.
    #[error("IO error at {}: {source}", .path.display())]
    Io {
        /// Path involved in the error.
        path: PathBuf,
        /// Underlying IO error.
        #[source]
        source: io::Error,
    },

    /// Failed to write an asset archive.
    #[error("zip error: {0}")]
    Zip(#[from] zip::result::ZipError),

    /// Failed to serialize or parse JSON.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The provisioning engine failed.
    #[error("engine error: {0}")]
    Engine(String),
}

impl Error {
    /// Create an IO error with path context.
    pub fn io(path: impl Into<PathBuf>, source: io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Get the error category.
    #[must_use]
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidLogicalId { .. }
            | Error::DuplicateLogicalId(_)
            | Error::UnknownReference { .. }
            | Error::UnknownDependency { .. } => ErrorCategory::Declaration,
            Error::AssetNotFound(_) | Error::AssetNotStaged(_) => ErrorCategory::Asset,
            Error::Io { .. } | Error::Zip(_) | Error::Json(_) => ErrorCategory::Io,
            Error::Engine(_) => ErrorCategory::Engine,
        }
    }
}
