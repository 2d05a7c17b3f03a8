//! Ordered registry of icon search layers.
//!
//! Layers are declared once at composition time: an optional application
//! root followed by plugin roots in the order the host enumerates them. The
//! registry turns those declarations into the [`PathLayer`] list every
//! lookup walks. A declaration only becomes a layer if its root directory
//! exists when the list is computed.
//!
//! The computed list is memoized. [`LayerRegistry::reset`] drops the memo so
//! the next call re-checks the filesystem.
//!
//! # Example
//!
//! ```
//! use horizon_iconset_core::LayerRegistry;
//!
//! let registry = LayerRegistry::builder()
//!     .application_root("app/assets/icons")
//!     .plugin("UiKit", "vendor/ui_kit/icons")
//!     .build()
//!     .unwrap();
//!
//! // Roots that do not exist are simply absent.
//! for layer in registry.layers().iter() {
//!     println!("{layer}");
//! }
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use parking_lot::RwLock;

use crate::error::{Error, Result};
use crate::logging::targets;
use crate::types::{DEFAULT_ICON_EXTENSION, PathLayer};

/// A declared layer, before the existence check.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LayerDeclaration {
    /// Identifier as the plugin declared it, `None` for the application.
    pub identifier: Option<String>,
    /// Normalized namespace derived from the identifier.
    pub namespace: Option<String>,
    /// Root directory.
    pub root: PathBuf,
}

/// Builder for [`LayerRegistry`].
#[derive(Debug, Default)]
pub struct LayerRegistryBuilder {
    application: Option<PathBuf>,
    plugins: Vec<(String, PathBuf)>,
    extension: Option<String>,
}

impl LayerRegistryBuilder {
    /// Set the application root. A later call replaces the earlier one.
    pub fn application_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.application = Some(root.into());
        self
    }

    /// Register a plugin root under the plugin's declared identifier.
    ///
    /// The identifier is normalized with [`namespace_for`].
    pub fn plugin(mut self, identifier: impl Into<String>, root: impl Into<PathBuf>) -> Self {
        self.plugins.push((identifier.into(), root.into()));
        self
    }

    /// Set the icon file extension (without the dot). Defaults to `svg`.
    pub fn extension(mut self, extension: impl Into<String>) -> Self {
        self.extension = Some(extension.into());
        self
    }

    /// Build the registry.
    ///
    /// Fails if a plugin identifier normalizes to an empty namespace.
    /// Duplicate namespaces are not an error: the later declaration is
    /// dropped and can never be reached.
    pub fn build(self) -> Result<LayerRegistry> {
        let mut declarations = Vec::with_capacity(self.plugins.len() + 1);

        if let Some(root) = self.application {
            declarations.push(LayerDeclaration {
                identifier: None,
                namespace: None,
                root,
            });
        }

        for (identifier, root) in self.plugins {
            let namespace = namespace_for(&identifier);
            if namespace.is_empty() {
                return Err(Error::InvalidNamespace { identifier });
            }

            if let Some(existing) = declarations
                .iter()
                .find(|d| d.namespace.as_deref() == Some(namespace.as_str()))
            {
                tracing::warn!(
                    target: targets::REGISTRY,
                    "Plugin '{}' maps to namespace '{}' already used by {}; ignoring {}",
                    identifier,
                    namespace,
                    existing.root.display(),
                    root.display(),
                );
                continue;
            }

            declarations.push(LayerDeclaration {
                identifier: Some(identifier),
                namespace: Some(namespace),
                root,
            });
        }

        let extension = self
            .extension
            .map(|ext| ext.trim_start_matches('.').to_string())
            .filter(|ext| !ext.is_empty())
            .unwrap_or_else(|| DEFAULT_ICON_EXTENSION.to_string());

        Ok(LayerRegistry {
            declarations,
            extension,
            layers: RwLock::new(None),
        })
    }
}

/// Ordered, memoized list of icon search layers.
///
/// Registration order is the tie-break for every lookup.
#[derive(Debug)]
pub struct LayerRegistry {
    declarations: Vec<LayerDeclaration>,
    extension: String,
    layers: RwLock<Option<Arc<[PathLayer]>>>,
}

impl LayerRegistry {
    /// Create a registry builder.
    pub fn builder() -> LayerRegistryBuilder {
        LayerRegistryBuilder::default()
    }

    /// Create a registry with no layers.
    pub fn empty() -> Self {
        Self {
            declarations: Vec::new(),
            extension: DEFAULT_ICON_EXTENSION.to_string(),
            layers: RwLock::new(None),
        }
    }

    /// The layers whose roots exist, in registration order.
    ///
    /// Computed on first access and memoized until [`reset`](Self::reset).
    pub fn layers(&self) -> Arc<[PathLayer]> {
        if let Some(layers) = self.layers.read().as_ref() {
            return Arc::clone(layers);
        }

        let mut slot = self.layers.write();
        // Another caller may have built the list while we waited.
        if let Some(layers) = slot.as_ref() {
            return Arc::clone(layers);
        }

        let layers = self.compute();
        *slot = Some(Arc::clone(&layers));
        layers
    }

    /// Drop the memoized layer list.
    pub fn reset(&self) {
        if self.layers.write().take().is_some() {
            tracing::debug!(target: targets::REGISTRY, "Layer list reset");
        }
    }

    /// Returns true if the layer list is currently memoized.
    pub fn is_built(&self) -> bool {
        self.layers.read().is_some()
    }

    /// Namespaces of the current layers, in registration order.
    pub fn namespaces(&self) -> Vec<String> {
        self.layers()
            .iter()
            .filter_map(|layer| layer.namespace.clone())
            .collect()
    }

    /// Returns true if a current layer has this namespace.
    pub fn has_namespace(&self, namespace: &str) -> bool {
        self.layers()
            .iter()
            .any(|layer| layer.namespace.as_deref() == Some(namespace))
    }

    /// Icon file extension, without the dot.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// All declarations, including ones whose roots do not exist.
    pub fn declarations(&self) -> &[LayerDeclaration] {
        &self.declarations
    }

    fn compute(&self) -> Arc<[PathLayer]> {
        let layers: Vec<PathLayer> = self
            .declarations
            .iter()
            .filter(|decl| {
                let exists = decl.root.is_dir();
                if !exists {
                    tracing::debug!(
                        target: targets::REGISTRY,
                        "Skipping icon layer {}: {} is not a directory",
                        decl.namespace.as_deref().unwrap_or("(application)"),
                        decl.root.display(),
                    );
                }
                exists
            })
            .map(|decl| PathLayer {
                namespace: decl.namespace.clone(),
                root: decl.root.clone(),
            })
            .collect();

        tracing::info!(
            target: targets::REGISTRY,
            "Registered {} icon layer(s) out of {} declared",
            layers.len(),
            self.declarations.len(),
        );

        layers.into()
    }
}

impl Default for LayerRegistry {
    fn default() -> Self {
        Self::empty()
    }
}

/// Normalize a plugin identifier into a namespace token.
///
/// CamelCase boundaries become `_`, everything outside `[a-z0-9]` collapses
/// into a single `_`, and leading or trailing `_` is trimmed.
///
/// ```
/// use horizon_iconset_core::registry::namespace_for;
///
/// assert_eq!(namespace_for("UiKit"), "ui_kit");
/// assert_eq!(namespace_for("admin-panel"), "admin_panel");
/// assert_eq!(namespace_for("Reports 2"), "reports_2");
/// ```
pub fn namespace_for(identifier: &str) -> String {
    let mut out = String::with_capacity(identifier.len() + 4);
    let mut prev: Option<char> = None;

    for ch in identifier.trim().chars() {
        if ch.is_ascii_alphanumeric() {
            if ch.is_ascii_uppercase()
                && prev.is_some_and(|p| p.is_ascii_lowercase() || p.is_ascii_digit())
            {
                out.push('_');
            }
            out.push(ch.to_ascii_lowercase());
        } else if !out.is_empty() && !out.ends_with('_') {
            out.push('_');
        }
        prev = Some(ch);
    }

    while out.ends_with('_') {
        out.pop();
    }
    out
}
