//! The composed icon engine.

use std::sync::Arc;

use horizon_iconset_core::logging::targets;
use horizon_iconset_core::{
    IconHandle, IconReference, IconResolver, IconsetConfig, LayerRegistry, LibraryDiscovery,
    LibraryEntry, LibraryMap, PathLayer, Result,
};

/// Owns the layer registry, the discovery cache and the resolver.
///
/// All three share one registry, so bulk listing and point lookups agree on
/// precedence. The engine is `Send + Sync`; share it behind an [`Arc`].
///
/// # Example
///
/// ```no_run
/// use horizon_iconset::{IconEngine, LayerRegistry};
///
/// let engine = IconEngine::new(
///     LayerRegistry::builder()
///         .application_root("app/assets/icons")
///         .plugin("ui", "plugins/ui/icons")
///         .build()?,
/// );
///
/// let home = engine.resolve("feather/home")?;
/// let libraries = engine.discover_all()?;
///
/// // After icons change on disk:
/// engine.invalidate();
/// # Ok::<(), horizon_iconset::Error>(())
/// ```
#[derive(Debug)]
pub struct IconEngine {
    registry: Arc<LayerRegistry>,
    discovery: LibraryDiscovery,
    resolver: IconResolver,
}

impl IconEngine {
    /// Compose an engine around a registry.
    pub fn new(registry: LayerRegistry) -> Self {
        let registry = Arc::new(registry);
        Self {
            discovery: LibraryDiscovery::new(Arc::clone(&registry)),
            resolver: IconResolver::new(Arc::clone(&registry)),
            registry,
        }
    }

    /// Compose an engine from a declarative configuration.
    pub fn from_config(config: IconsetConfig) -> Result<Self> {
        Ok(Self::new(config.into_registry()?))
    }

    /// The layer registry.
    pub fn registry(&self) -> &LayerRegistry {
        &self.registry
    }

    /// The current layers, in precedence order.
    pub fn layers(&self) -> Arc<[PathLayer]> {
        self.registry.layers()
    }

    /// Resolve a reference string to an icon file.
    pub fn resolve(&self, reference: &str) -> Result<IconHandle> {
        self.resolver.resolve(reference)
    }

    /// Resolve an already-parsed reference.
    pub fn resolve_reference(&self, reference: &IconReference) -> Result<IconHandle> {
        self.resolver.resolve_reference(reference)
    }

    /// All discovered libraries, from cache when fresh.
    pub fn discover_all(&self) -> Result<Arc<LibraryMap>> {
        self.discovery.discover_all()
    }

    /// One discovered library.
    pub fn library(&self, key: &str) -> Result<Option<LibraryEntry>> {
        self.discovery.library(key)
    }

    /// The discovery cache.
    pub fn discovery(&self) -> &LibraryDiscovery {
        &self.discovery
    }

    /// The resolver.
    pub fn resolver(&self) -> &IconResolver {
        &self.resolver
    }

    /// Mark both the layer list and the library cache as unbuilt.
    ///
    /// This is the reaction to a filesystem change under any layer root.
    pub fn invalidate(&self) {
        self.registry.reset();
        self.discovery.invalidate();
        tracing::info!(
            target: targets::REGISTRY,
            "Icon caches invalidated (layer list and library listing)"
        );
    }
}
