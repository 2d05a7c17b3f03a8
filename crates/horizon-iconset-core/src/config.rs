//! Layer configuration loaded from TOML.
//!
//! Hosts that do not build a [`LayerRegistry`] in code can declare their
//! layers in an `iconset.toml`:
//!
//! ```toml
//! extension = "svg"
//!
//! [application]
//! root = "app/assets/icons"
//!
//! [[plugins]]
//! id = "UiKit"
//! root = "vendor/ui_kit/icons"
//! ```
//!
//! Relative roots are resolved against the directory containing the file.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};
use crate::registry::LayerRegistry;

/// File name looked up in the platform config directory.
pub const CONFIG_FILE_NAME: &str = "iconset.toml";

/// Application layer section.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApplicationConfig {
    /// Root directory of the application's icon libraries.
    pub root: PathBuf,
}

/// One plugin layer.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PluginConfig {
    /// Plugin identifier; normalized into the layer namespace.
    pub id: String,
    /// Root directory of the plugin's icon libraries.
    pub root: PathBuf,
}

/// Declarative layer configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct IconsetConfig {
    /// Icon file extension, without the dot.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub extension: Option<String>,
    /// Application layer, if the host has one.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub application: Option<ApplicationConfig>,
    /// Plugin layers in precedence order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub plugins: Vec<PluginConfig>,
}

impl IconsetConfig {
    /// Parse a configuration from TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e: toml::de::Error| Error::config("<string>", e.message()))
    }

    /// Load a configuration file, resolving relative roots against its directory.
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| Error::io(path, e))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e: toml::de::Error| Error::config(path, e.message()))?;

        let base = path.parent().unwrap_or_else(|| Path::new("."));
        Ok(config.with_base_dir(base))
    }

    /// Default configuration location for the current platform.
    ///
    /// `<config dir>/horizon-iconset/iconset.toml`, or `None` when the
    /// platform has no config directory.
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("horizon-iconset").join(CONFIG_FILE_NAME))
    }

    /// Load the default configuration file.
    ///
    /// A missing file yields an empty configuration.
    pub fn load_default() -> Result<Self> {
        match Self::default_path() {
            Some(path) if path.is_file() => Self::from_file(path),
            _ => {
                tracing::debug!(
                    target: crate::logging::targets::REGISTRY,
                    "No default iconset configuration found"
                );
                Ok(Self::default())
            }
        }
    }

    /// Resolve relative roots against `base`.
    pub fn with_base_dir(mut self, base: &Path) -> Self {
        let rebase = |root: &mut PathBuf| {
            if root.is_relative() {
                *root = base.join(&*root);
            }
        };
        if let Some(app) = self.application.as_mut() {
            rebase(&mut app.root);
        }
        for plugin in &mut self.plugins {
            rebase(&mut plugin.root);
        }
        self
    }

    /// Serialize to TOML text.
    pub fn to_toml_string(&self) -> Result<String> {
        toml::to_string_pretty(self).map_err(|e| Error::config("<string>", e.to_string()))
    }

    /// Build a layer registry from this configuration.
    pub fn into_registry(self) -> Result<LayerRegistry> {
        let mut builder = LayerRegistry::builder();
        if let Some(extension) = self.extension {
            builder = builder.extension(extension);
        }
        if let Some(app) = self.application {
            builder = builder.application_root(app.root);
        }
        for plugin in self.plugins {
            builder = builder.plugin(plugin.id, plugin.root);
        }
        builder.build()
    }
}
