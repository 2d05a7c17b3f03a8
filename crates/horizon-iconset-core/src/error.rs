//! Error types for icon discovery and resolution.

use std::fmt;
use std::path::PathBuf;

/// Result type alias for iconset operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while discovering or resolving icons.
///
/// The first four variants are caller errors: they describe a malformed
/// reference or missing content and are never worth retrying.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The reference string is malformed.
    #[error("Invalid icon reference '{reference}': {reason}")]
    InvalidReference { reference: String, reason: String },

    /// The reference names an icon but no library.
    #[error("Icon reference '{reference}' has no library (expected 'library/icon')")]
    MissingLibrary { reference: String },

    /// The namespace prefix does not match any registered layer.
    #[error("Icon namespace '{namespace}' not found (available: {})", Available(.available))]
    EngineNotFound {
        namespace: String,
        available: Vec<String>,
    },

    /// The reference is well-formed but no layer has the file.
    #[error("Icon '{reference}' not found (tried: {})", Attempted(.attempted))]
    IconNotFound {
        reference: String,
        attempted: Vec<PathBuf>,
    },

    /// A plugin identifier normalizes to an empty namespace.
    #[error("Plugin identifier '{identifier}' does not produce a usable namespace")]
    InvalidNamespace { identifier: String },

    /// Walking a layer root failed during discovery.
    #[error("Failed to scan icon layer {} at '{root}': {source}", LayerName(.namespace))]
    Discovery {
        namespace: Option<String>,
        root: PathBuf,
        #[source]
        source: walkdir::Error,
    },

    /// File I/O error.
    #[error("Failed to read '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Configuration could not be parsed.
    #[error("Invalid iconset configuration '{path}': {message}")]
    Config { path: PathBuf, message: String },
}

impl Error {
    /// Create an invalid reference error.
    pub fn invalid_reference(reference: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::InvalidReference {
            reference: reference.into(),
            reason: reason.into(),
        }
    }

    /// Create a missing library error.
    pub fn missing_library(reference: impl Into<String>) -> Self {
        Self::MissingLibrary {
            reference: reference.into(),
        }
    }

    /// Create an I/O error.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }

    /// Create a configuration error.
    pub fn config(path: impl Into<PathBuf>, message: impl Into<String>) -> Self {
        Self::Config {
            path: path.into(),
            message: message.into(),
        }
    }

    /// Returns true for the not-found class (unknown namespace or missing file).
    pub fn is_not_found(&self) -> bool {
        matches!(self, Self::EngineNotFound { .. } | Self::IconNotFound { .. })
    }

    /// Returns true if the error was caused by the reference or the content,
    /// rather than by the filesystem or configuration.
    pub fn is_caller_error(&self) -> bool {
        matches!(
            self,
            Self::InvalidReference { .. }
                | Self::MissingLibrary { .. }
                | Self::EngineNotFound { .. }
                | Self::IconNotFound { .. }
        )
    }
}

struct Available<'a>(&'a [String]);

impl fmt::Display for Available<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            f.write_str("none available")
        } else {
            f.write_str(&self.0.join(", "))
        }
    }
}

struct Attempted<'a>(&'a [PathBuf]);

impl fmt::Display for Attempted<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.0.is_empty() {
            return f.write_str("no compatible layers");
        }
        for (i, path) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(", ")?;
            }
            write!(f, "{}", path.display())?;
        }
        Ok(())
    }
}

struct LayerName<'a>(&'a Option<String>);

impl fmt::Display for LayerName<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Some(namespace) => write!(f, "'{namespace}'"),
            None => f.write_str("(application)"),
        }
    }
}
