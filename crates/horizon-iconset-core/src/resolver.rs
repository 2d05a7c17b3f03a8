//! Icon reference resolution.
//!
//! The resolver turns a reference string into an [`IconHandle`] by walking
//! the layer registry in registration order. The first layer that accepts
//! the reference's namespace and has the file wins. Resolution does not
//! consult the discovery cache, so it sees files as soon as they exist on
//! disk. It does respect the registry's memoized layer list.

use std::path::PathBuf;
use std::sync::Arc;

use crate::error::{Error, Result};
use crate::logging::targets;
use crate::reference::IconReference;
use crate::registry::LayerRegistry;
use crate::types::IconHandle;

/// Resolves icon references against a [`LayerRegistry`].
#[derive(Debug, Clone)]
pub struct IconResolver {
    registry: Arc<LayerRegistry>,
}

impl IconResolver {
    /// Create a resolver over the given registry.
    pub fn new(registry: Arc<LayerRegistry>) -> Self {
        Self { registry }
    }

    /// The registry this resolver walks.
    pub fn registry(&self) -> &Arc<LayerRegistry> {
        &self.registry
    }

    /// Resolve a reference string.
    ///
    /// # Errors
    ///
    /// - [`Error::InvalidReference`] for empty or malformed input
    /// - [`Error::MissingLibrary`] when the reference has no library part
    /// - [`Error::EngineNotFound`] when the namespace is not registered
    /// - [`Error::IconNotFound`] when no compatible layer has the file
    pub fn resolve(&self, reference: &str) -> Result<IconHandle> {
        let parsed = IconReference::parse(reference)?;
        self.resolve_reference(&parsed)
    }

    /// Resolve an already-parsed reference.
    pub fn resolve_reference(&self, reference: &IconReference) -> Result<IconHandle> {
        self.check_namespace(reference)?;

        let attempted = self.candidates(reference);
        if let Some(file_path) = attempted.iter().find(|path| path.is_file()) {
            tracing::trace!(
                target: targets::RESOLVER,
                "Resolved {} to {}",
                reference,
                file_path.display()
            );
            return Ok(IconHandle {
                file_path: file_path.clone(),
                icon_name: reference.icon_name.clone(),
                library_key: reference.library_key(),
            });
        }

        tracing::debug!(
            target: targets::RESOLVER,
            "Icon {} not found in {} candidate(s)",
            reference,
            attempted.len()
        );
        Err(Error::IconNotFound {
            reference: reference.to_string(),
            attempted,
        })
    }

    /// Returns true if the reference resolves to an existing file.
    pub fn exists(&self, reference: &str) -> bool {
        self.resolve(reference).is_ok()
    }

    /// Candidate file paths for a reference, in precedence order.
    ///
    /// Only layers whose namespace matches the reference contribute.
    pub fn candidates(&self, reference: &IconReference) -> Vec<PathBuf> {
        let relative = reference.relative_path(self.registry.extension());
        self.registry
            .layers()
            .iter()
            .filter(|layer| layer.accepts(reference.namespace.as_deref()))
            .map(|layer| layer.root.join(&relative))
            .collect()
    }

    fn check_namespace(&self, reference: &IconReference) -> Result<()> {
        let Some(namespace) = reference.namespace.as_deref() else {
            return Ok(());
        };
        if self.registry.has_namespace(namespace) {
            return Ok(());
        }
        Err(Error::EngineNotFound {
            namespace: namespace.to_string(),
            available: self.registry.namespaces(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use std::path::Path;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<svg/>").unwrap();
    }

    fn resolver(app: &Path, ui: &Path) -> IconResolver {
        let registry = LayerRegistry::builder()
            .application_root(app)
            .plugin("ui", ui)
            .build()
            .unwrap();
        IconResolver::new(Arc::new(registry))
    }

    #[test]
    fn test_resolve_application_icon() {
        let temp = TempDir::new().unwrap();
        let (app, ui) = (temp.path().join("app"), temp.path().join("ui"));
        touch(&app, "feather/home.svg");
        fs::create_dir_all(&ui).unwrap();

        let handle = resolver(&app, &ui).resolve("feather/home").unwrap();
        assert_eq!(handle.file_path, app.join("feather/home.svg"));
        assert_eq!(handle.icon_name, "home");
        assert_eq!(handle.library_key.as_str(), "feather");
    }

    #[test]
    fn test_namespace_only_searches_its_layer() {
        let temp = TempDir::new().unwrap();
        let (app, ui) = (temp.path().join("app"), temp.path().join("ui"));
        touch(&app, "feather/home.svg");
        touch(&ui, "feather/settings.svg");

        let resolver = resolver(&app, &ui);
        assert!(resolver.resolve("ui:feather/settings").is_ok());
        assert!(matches!(
            resolver.resolve("ui:feather/home"),
            Err(Error::IconNotFound { .. })
        ));
        assert!(matches!(
            resolver.resolve("feather/settings"),
            Err(Error::IconNotFound { .. })
        ));
    }

    #[test]
    fn test_candidates_follow_namespace() {
        let temp = TempDir::new().unwrap();
        let (app, ui) = (temp.path().join("app"), temp.path().join("ui"));
        fs::create_dir_all(&app).unwrap();
        fs::create_dir_all(&ui).unwrap();

        let resolver = resolver(&app, &ui);
        let reference = IconReference::parse("ui:heroicons/solid/bell").unwrap();
        assert_eq!(
            resolver.candidates(&reference),
            vec![ui.join("heroicons").join("solid").join("bell.svg")]
        );
    }

    #[test]
    fn test_directory_named_like_icon_is_not_a_match() {
        let temp = TempDir::new().unwrap();
        let (app, ui) = (temp.path().join("app"), temp.path().join("ui"));
        fs::create_dir_all(app.join("feather/home.svg")).unwrap();
        fs::create_dir_all(&ui).unwrap();

        assert!(!resolver(&app, &ui).exists("feather/home"));
    }

    #[test]
    fn test_unknown_namespace_without_plugins() {
        let temp = TempDir::new().unwrap();
        let registry = LayerRegistry::builder()
            .application_root(temp.path())
            .build()
            .unwrap();
        let resolver = IconResolver::new(Arc::new(registry));

        match resolver.resolve("bogus:feather/home") {
            Err(Error::EngineNotFound { namespace, available }) => {
                assert_eq!(namespace, "bogus");
                assert!(available.is_empty());
            }
            other => panic!("Expected EngineNotFound, got {:?}", other),
        }
    }
}
