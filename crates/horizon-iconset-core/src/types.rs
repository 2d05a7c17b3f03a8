//! Core types for layered icon libraries.
//!
//! This module provides the plain data carried between the registry, the
//! discovery walk and the resolver:
//! - [`PathLayer`]: one search root, optionally owned by a plugin namespace
//! - [`LibraryKey`]: the qualified name of a library (`ns:path` or `path`)
//! - [`LibraryEntry`]: the icons a discovered library contains
//! - [`IconHandle`]: the result of a successful resolution

use std::borrow::Borrow;
use std::collections::BTreeMap;
use std::fmt;
use std::path::{Path, PathBuf};

/// Extension of icon files when none is configured.
pub const DEFAULT_ICON_EXTENSION: &str = "svg";

/// Separator between a namespace and a library path.
pub const NAMESPACE_SEPARATOR: char = ':';

/// Separator between library path segments and the icon name.
pub const PATH_SEPARATOR: char = '/';

/// A search root contributing icons.
///
/// The application layer has no namespace. Every plugin layer has a unique,
/// already-normalized namespace.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct PathLayer {
    /// Namespace of the owning plugin, `None` for the application.
    pub namespace: Option<String>,
    /// Directory holding the layer's libraries.
    pub root: PathBuf,
}

impl PathLayer {
    /// Create the unnamespaced application layer.
    pub fn application(root: impl Into<PathBuf>) -> Self {
        Self {
            namespace: None,
            root: root.into(),
        }
    }

    /// Create a namespaced plugin layer.
    pub fn plugin(namespace: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        Self {
            namespace: Some(namespace.into()),
            root: root.into(),
        }
    }

    /// Returns true if this is the application layer.
    pub fn is_application(&self) -> bool {
        self.namespace.is_none()
    }

    /// Returns the namespace, if any.
    pub fn namespace(&self) -> Option<&str> {
        self.namespace.as_deref()
    }

    /// Returns true if references with the given namespace may resolve here.
    pub fn accepts(&self, namespace: Option<&str>) -> bool {
        self.namespace.as_deref() == namespace
    }
}

impl fmt::Display for PathLayer {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.namespace {
            Some(ns) => write!(f, "{ns} => {}", self.root.display()),
            None => write!(f, "(application) => {}", self.root.display()),
        }
    }
}

/// Qualified library name.
///
/// Rendered as `path` for the application layer and `namespace:path` for a
/// plugin layer, where `path` always uses `/` separators.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct LibraryKey(String);

impl LibraryKey {
    /// Build a key from its parts.
    pub fn new(namespace: Option<&str>, library_path: &str) -> Self {
        match namespace {
            Some(ns) => Self(format!("{ns}{NAMESPACE_SEPARATOR}{library_path}")),
            None => Self(library_path.to_string()),
        }
    }

    /// Wrap an already-rendered key.
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// The key as a string.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// The namespace part, if present.
    pub fn namespace(&self) -> Option<&str> {
        self.0.split_once(NAMESPACE_SEPARATOR).map(|(ns, _)| ns)
    }

    /// The library path without the namespace.
    pub fn library_path(&self) -> &str {
        self.0
            .split_once(NAMESPACE_SEPARATOR)
            .map_or(self.0.as_str(), |(_, path)| path)
    }
}

impl fmt::Display for LibraryKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl Borrow<str> for LibraryKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl AsRef<str> for LibraryKey {
    fn as_ref(&self) -> &str {
        &self.0
    }
}

impl From<&str> for LibraryKey {
    fn from(raw: &str) -> Self {
        Self(raw.to_string())
    }
}

impl PartialEq<str> for LibraryKey {
    fn eq(&self, other: &str) -> bool {
        self.0 == other
    }
}

impl PartialEq<&str> for LibraryKey {
    fn eq(&self, other: &&str) -> bool {
        self.0 == *other
    }
}

/// A discovered library and the icons it directly contains.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LibraryEntry {
    /// Qualified library name.
    pub key: LibraryKey,
    /// Directory on disk.
    pub root: PathBuf,
    /// Icon names (file stems), sorted lexically.
    pub icon_names: Vec<String>,
}

impl LibraryEntry {
    /// Number of icons in the library.
    pub fn len(&self) -> usize {
        self.icon_names.len()
    }

    /// Returns true if the library has no icons.
    ///
    /// Discovery never produces empty entries.
    pub fn is_empty(&self) -> bool {
        self.icon_names.is_empty()
    }

    /// Returns true if the library contains an icon with this name.
    pub fn contains(&self, icon_name: &str) -> bool {
        self.icon_names
            .binary_search_by(|name| name.as_str().cmp(icon_name))
            .is_ok()
    }
}

/// Snapshot of every discovered library, ordered by key.
pub type LibraryMap = BTreeMap<LibraryKey, LibraryEntry>;

/// A successfully resolved icon.
///
/// Handles are plain values: two handles are equal when all three fields are.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct IconHandle {
    /// Location of the icon file.
    pub file_path: PathBuf,
    /// Icon name, the last segment of the reference.
    pub icon_name: String,
    /// Library path exactly as written in the reference, namespace included.
    pub library_key: LibraryKey,
}

impl IconHandle {
    /// Location of the icon file.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Read the icon file.
    ///
    /// The contents are returned as-is; nothing checks that they are SVG.
    pub fn read_bytes(&self) -> crate::Result<Vec<u8>> {
        std::fs::read(&self.file_path).map_err(|e| crate::Error::io(&self.file_path, e))
    }
}
