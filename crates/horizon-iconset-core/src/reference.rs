//! Icon reference parsing.
//!
//! A reference names one icon, optionally inside a plugin namespace:
//!
//! ```text
//! reference    := [namespace ":"] library-path "/" icon-name
//! library-path := segment ("/" segment)*
//! ```
//!
//! Parsing is purely syntactic. Whether the namespace exists is checked by
//! the resolver against the layer registry.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use crate::error::{Error, Result};
use crate::types::{LibraryKey, NAMESPACE_SEPARATOR, PATH_SEPARATOR};

/// A parsed icon reference.
///
/// # Examples
///
/// ```
/// use horizon_iconset_core::IconReference;
///
/// let reference = IconReference::parse("ui:heroicons/outline/home").unwrap();
/// assert_eq!(reference.namespace.as_deref(), Some("ui"));
/// assert_eq!(reference.library_path, "heroicons/outline");
/// assert_eq!(reference.icon_name, "home");
/// assert_eq!(reference.library_key().as_str(), "ui:heroicons/outline");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconReference {
    /// Plugin namespace, if the reference is qualified.
    pub namespace: Option<String>,
    /// Library path relative to the layer root, without the namespace.
    pub library_path: String,
    /// Icon name (file stem).
    pub icon_name: String,
}

impl IconReference {
    /// Parse a reference string.
    ///
    /// Surrounding whitespace is ignored.
    pub fn parse(input: &str) -> Result<Self> {
        let reference = input.trim();
        if reference.is_empty() {
            return Err(Error::invalid_reference(input, "reference is empty"));
        }

        let Some((library, icon_name)) = reference.rsplit_once(PATH_SEPARATOR) else {
            return Err(Error::missing_library(reference));
        };

        if icon_name.is_empty() {
            return Err(Error::invalid_reference(reference, "icon name is empty"));
        }
        validate_segment(reference, icon_name, "icon name")?;

        let (namespace, library_path) = match library.split_once(NAMESPACE_SEPARATOR) {
            Some((namespace, rest)) => {
                if namespace.is_empty() {
                    return Err(Error::invalid_reference(reference, "namespace is empty"));
                }
                validate_segment(reference, namespace, "namespace")?;
                (Some(namespace), rest)
            }
            None => (None, library),
        };

        if library_path.is_empty() {
            return Err(Error::missing_library(reference));
        }
        for segment in library_path.split(PATH_SEPARATOR) {
            if segment.is_empty() {
                return Err(Error::invalid_reference(
                    reference,
                    "library path contains an empty segment",
                ));
            }
            validate_segment(reference, segment, "library segment")?;
        }

        Ok(Self {
            namespace: namespace.map(str::to_string),
            library_path: library_path.to_string(),
            icon_name: icon_name.to_string(),
        })
    }

    /// The library path as written in the reference, namespace included.
    pub fn library_key(&self) -> LibraryKey {
        LibraryKey::new(self.namespace.as_deref(), &self.library_path)
    }

    /// Path of the icon file relative to a layer root.
    pub fn relative_path(&self, extension: &str) -> PathBuf {
        let mut path: PathBuf = self.library_path.split(PATH_SEPARATOR).collect();
        path.push(format!("{}.{}", self.icon_name, extension));
        path
    }
}

/// Reject separators and dot segments inside a single path token.
fn validate_segment(reference: &str, segment: &str, what: &str) -> Result<()> {
    match segment_problem(segment) {
        Some(problem) => Err(Error::invalid_reference(
            reference,
            format!("{what} '{segment}' {problem}"),
        )),
        None => Ok(()),
    }
}

/// Why a token can never appear in a reference, if it can't.
///
/// Discovery uses this too, so every listed `library/icon` pair parses.
pub(crate) fn segment_problem(segment: &str) -> Option<String> {
    if segment.is_empty() {
        return Some("is empty".to_string());
    }
    if segment == "." || segment == ".." {
        return Some("is not allowed".to_string());
    }
    for ch in [NAMESPACE_SEPARATOR, PATH_SEPARATOR, '\\', '\0'] {
        if segment.contains(ch) {
            return Some(format!("contains reserved character {ch:?}"));
        }
    }
    if segment.trim() != segment {
        return Some("has leading or trailing whitespace".to_string());
    }
    None
}

impl fmt::Display for IconReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if let Some(ns) = &self.namespace {
            write!(f, "{ns}{NAMESPACE_SEPARATOR}")?;
        }
        write!(f, "{}{PATH_SEPARATOR}{}", self.library_path, self.icon_name)
    }
}

impl FromStr for IconReference {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::parse(s)
    }
}
