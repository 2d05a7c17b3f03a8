//! Library discovery and caching.
//!
//! Discovery walks every layer root and reports each directory that directly
//! contains at least one icon file as a library. Sub-directories are walked
//! too and form their own libraries, so `heroicons/outline` and
//! `heroicons/solid` are two libraries. A layer root is never a library.
//!
//! The result is cached as one immutable [`LibraryMap`]. A rebuild walks
//! into a fresh map and publishes it with a single pointer swap, so readers
//! see either the previous map or the new one. Concurrent callers that find
//! the cache stale wait for the rebuild in progress instead of starting
//! their own.

use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::Instant;

use parking_lot::{Mutex, RwLock};
use walkdir::{DirEntry, WalkDir};

use crate::error::{Error, Result};
use crate::logging::targets;
use crate::reference::segment_problem;
use crate::registry::LayerRegistry;
use crate::types::{LibraryEntry, LibraryKey, LibraryMap, PATH_SEPARATOR, PathLayer};

/// A published discovery result.
#[derive(Debug)]
struct Snapshot {
    /// Invalidation generation the walk started in.
    generation: u64,
    libraries: Arc<LibraryMap>,
}

/// Cached discovery of every library across all layers.
#[derive(Debug)]
pub struct LibraryDiscovery {
    registry: Arc<LayerRegistry>,
    snapshot: RwLock<Option<Snapshot>>,
    /// Bumped by every invalidation.
    generation: AtomicU64,
    /// Serializes rebuilds.
    rebuild_lock: Mutex<()>,
    builds: AtomicUsize,
}

impl LibraryDiscovery {
    /// Create a discovery cache over the given registry.
    pub fn new(registry: Arc<LayerRegistry>) -> Self {
        Self {
            registry,
            snapshot: RwLock::new(None),
            generation: AtomicU64::new(0),
            rebuild_lock: Mutex::new(()),
            builds: AtomicUsize::new(0),
        }
    }

    /// The registry this cache walks.
    pub fn registry(&self) -> &Arc<LayerRegistry> {
        &self.registry
    }

    /// All libraries across all layers.
    ///
    /// Returns the cached map while it is fresh; otherwise walks every layer
    /// and publishes a new map. Discovery is fail-fast: if any layer cannot
    /// be walked, nothing is published, the error is returned, and the next
    /// call walks again.
    pub fn discover_all(&self) -> Result<Arc<LibraryMap>> {
        if let Some(libraries) = self.fresh() {
            return Ok(libraries);
        }

        let _guard = self.rebuild_lock.lock();
        // A rebuild may have completed while we waited for the lock.
        if let Some(libraries) = self.fresh() {
            return Ok(libraries);
        }

        let generation = self.generation.load(Ordering::Acquire);
        self.rebuild(generation)
    }

    /// Walk every layer and publish the result stamped with `generation`.
    ///
    /// An invalidation that lands after `generation` was read leaves the
    /// published map stale.
    fn rebuild(&self, generation: u64) -> Result<Arc<LibraryMap>> {
        let layers = self.registry.layers();
        let started = Instant::now();

        let libraries = match scan_layers(&layers, self.registry.extension()) {
            Ok(map) => Arc::new(map),
            Err(e) => {
                tracing::warn!(target: targets::DISCOVERY, "Icon discovery failed: {}", e);
                return Err(e);
            }
        };

        *self.snapshot.write() = Some(Snapshot {
            generation,
            libraries: Arc::clone(&libraries),
        });
        self.builds.fetch_add(1, Ordering::Relaxed);

        tracing::info!(
            target: targets::DISCOVERY,
            libraries = libraries.len(),
            layers = layers.len(),
            elapsed_ms = (started.elapsed().as_millis() as u64),
            "Discovered icon libraries"
        );

        Ok(libraries)
    }

    /// Look up one discovered library by key.
    pub fn library(&self, key: &str) -> Result<Option<LibraryEntry>> {
        Ok(self.discover_all()?.get(key).cloned())
    }

    /// Mark the cache stale. The next [`discover_all`](Self::discover_all)
    /// walks the filesystem again.
    pub fn invalidate(&self) {
        let generation = self.generation.fetch_add(1, Ordering::AcqRel) + 1;
        tracing::debug!(target: targets::DISCOVERY, generation, "Library cache invalidated");
    }

    /// The last published map, even if it has since been invalidated.
    pub fn cached(&self) -> Option<Arc<LibraryMap>> {
        self.snapshot
            .read()
            .as_ref()
            .map(|snapshot| Arc::clone(&snapshot.libraries))
    }

    /// Returns true if a published map exists and has not been invalidated.
    pub fn is_fresh(&self) -> bool {
        self.fresh().is_some()
    }

    /// Number of successful rebuilds so far.
    pub fn builds(&self) -> usize {
        self.builds.load(Ordering::Relaxed)
    }

    fn fresh(&self) -> Option<Arc<LibraryMap>> {
        let current = self.generation.load(Ordering::Acquire);
        self.snapshot
            .read()
            .as_ref()
            .filter(|snapshot| snapshot.generation == current)
            .map(|snapshot| Arc::clone(&snapshot.libraries))
    }
}

/// Walk every layer into one map. Stops at the first layer that fails.
pub fn scan_layers(layers: &[PathLayer], extension: &str) -> Result<LibraryMap> {
    let mut map = LibraryMap::new();
    for layer in layers {
        for entry in scan_layer(layer, extension)? {
            map.entry(entry.key.clone()).or_insert(entry);
        }
    }
    Ok(map)
}

/// Walk one layer root and collect its libraries, sorted by path.
pub fn scan_layer(layer: &PathLayer, extension: &str) -> Result<Vec<LibraryEntry>> {
    let mut libraries: BTreeMap<String, (PathBuf, Vec<String>)> = BTreeMap::new();

    let walker = WalkDir::new(&layer.root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_entry(|entry| entry.depth() == 0 || !is_hidden(entry));

    for entry in walker {
        let entry = entry.map_err(|source| Error::Discovery {
            namespace: layer.namespace.clone(),
            root: layer.root.clone(),
            source,
        })?;

        // Files directly under the root do not belong to any library.
        if entry.depth() < 2 || !is_icon_file(&entry, extension) {
            continue;
        }

        let Some(dir) = entry.path().parent() else {
            continue;
        };
        let Some(library_path) = relative_library_path(&layer.root, dir) else {
            tracing::debug!(
                target: targets::DISCOVERY,
                "Skipping library with a non UTF-8 path: {}",
                dir.display()
            );
            continue;
        };
        let Some(icon_name) = entry.path().file_stem().and_then(OsStr::to_str) else {
            tracing::debug!(
                target: targets::DISCOVERY,
                "Skipping icon with a non UTF-8 name: {}",
                entry.path().display()
            );
            continue;
        };

        if let Some(problem) = library_path
            .split(PATH_SEPARATOR)
            .chain(std::iter::once(icon_name))
            .find_map(segment_problem)
        {
            tracing::debug!(
                target: targets::DISCOVERY,
                "Skipping icon no reference can name ({}): {}",
                problem,
                entry.path().display()
            );
            continue;
        }

        libraries
            .entry(library_path)
            .or_insert_with(|| (dir.to_path_buf(), Vec::new()))
            .1
            .push(icon_name.to_string());
    }

    Ok(libraries
        .into_iter()
        .map(|(library_path, (root, mut icon_names))| {
            icon_names.sort();
            icon_names.dedup();
            LibraryEntry {
                key: LibraryKey::new(layer.namespace.as_deref(), &library_path),
                root,
                icon_names,
            }
        })
        .collect())
}

fn is_hidden(entry: &DirEntry) -> bool {
    entry.file_name().to_str().is_some_and(|name| name.starts_with('.'))
}

fn is_icon_file(entry: &DirEntry, extension: &str) -> bool {
    let file_type = entry.file_type();
    let is_file = file_type.is_file() || (file_type.is_symlink() && entry.path().is_file());
    is_file
        && entry
            .path()
            .extension()
            .and_then(OsStr::to_str)
            .is_some_and(|ext| ext == extension)
}

/// `root/a/b` relative to `root`, rendered as `a/b`.
fn relative_library_path(root: &Path, dir: &Path) -> Option<String> {
    let relative = dir.strip_prefix(root).ok()?;
    let mut out = String::new();
    for component in relative.components() {
        if !out.is_empty() {
            out.push(PATH_SEPARATOR);
        }
        out.push_str(component.as_os_str().to_str()?);
    }
    (!out.is_empty()).then_some(out)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    fn touch(root: &Path, relative: &str) {
        let path = root.join(relative);
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(path, "<svg/>").unwrap();
    }

    fn app_discovery(root: &Path) -> LibraryDiscovery {
        let registry = LayerRegistry::builder().application_root(root).build().unwrap();
        LibraryDiscovery::new(Arc::new(registry))
    }

    #[test]
    fn test_scan_groups_by_directory() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "feather/home.svg");
        touch(temp.path(), "feather/zap.svg");
        touch(temp.path(), "feather/arrow.svg");
        touch(temp.path(), "heroicons/outline/bell.svg");
        touch(temp.path(), "heroicons/solid/bell.svg");

        let layer = PathLayer::application(temp.path());
        let entries = scan_layer(&layer, "svg").unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();

        assert_eq!(keys, vec!["feather", "heroicons/outline", "heroicons/solid"]);
        assert_eq!(entries[0].icon_names, vec!["arrow", "home", "zap"]);
        assert_eq!(entries[0].root, temp.path().join("feather"));
    }

    #[test]
    fn test_scan_skips_root_files_and_other_extensions() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "stray.svg");
        touch(temp.path(), "docs/readme.md");
        touch(temp.path(), "feather/home.svg");
        touch(temp.path(), "feather/LICENSE");

        let entries = scan_layer(&PathLayer::application(temp.path()), "svg").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].icon_names, vec!["home"]);
    }

    #[test]
    fn test_scan_matches_extension_exactly() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "feather/home.svg");
        touch(temp.path(), "feather/zap.SVG");

        let entries = scan_layer(&PathLayer::application(temp.path()), "svg").unwrap();
        assert_eq!(entries[0].icon_names, vec!["home"]);
    }

    #[test]
    fn test_scan_skips_hidden_entries() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), ".cache/home.svg");
        touch(temp.path(), "feather/.home.svg");
        touch(temp.path(), "feather/home.svg");

        let entries = scan_layer(&PathLayer::application(temp.path()), "svg").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].key.as_str(), "feather");
        assert_eq!(entries[0].icon_names, vec!["home"]);
    }

    #[test]
    fn test_scan_namespaced_keys() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "feather/settings.svg");

        let entries = scan_layer(&PathLayer::plugin("ui", temp.path()), "svg").unwrap();
        assert_eq!(entries[0].key.as_str(), "ui:feather");
        assert_eq!(entries[0].key.library_path(), "feather");
    }

    #[test]
    fn test_discover_all_is_cached() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "feather/home.svg");

        let discovery = app_discovery(temp.path());
        let first = discovery.discover_all().unwrap();
        let second = discovery.discover_all().unwrap();

        assert!(Arc::ptr_eq(&first, &second));
        assert_eq!(discovery.builds(), 1);
    }

    #[test]
    fn test_invalidate_marks_stale() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "feather/home.svg");

        let discovery = app_discovery(temp.path());
        discovery.discover_all().unwrap();
        assert!(discovery.is_fresh());

        touch(temp.path(), "feather/settings.svg");
        assert_eq!(discovery.discover_all().unwrap()["feather"].len(), 1);

        discovery.invalidate();
        assert!(!discovery.is_fresh());
        assert!(discovery.cached().is_some());
        assert_eq!(discovery.discover_all().unwrap()["feather"].len(), 2);
        assert_eq!(discovery.builds(), 2);
    }

    #[test]
    fn test_failed_rebuild_keeps_previous_snapshot() {
        let temp = TempDir::new().unwrap();
        let root = temp.path().join("icons");
        touch(&root, "feather/home.svg");

        let discovery = app_discovery(&root);
        let before = discovery.discover_all().unwrap();

        // The registry still lists the root, but the walk can no longer read it.
        fs::remove_dir_all(&root).unwrap();
        discovery.invalidate();

        let err = discovery.discover_all().unwrap_err();
        assert!(matches!(err, Error::Discovery { namespace: None, .. }));
        assert!(!discovery.is_fresh());

        let cached = discovery.cached().unwrap();
        assert!(Arc::ptr_eq(&before, &cached));

        // Still stale, so the next call walks again.
        touch(&root, "feather/home.svg");
        assert!(discovery.discover_all().is_ok());
    }

    #[test]
    fn test_invalidate_during_rebuild_leaves_result_stale() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "feather/home.svg");

        let discovery = app_discovery(temp.path());
        let started_at = discovery.generation.load(Ordering::Acquire);

        // Invalidation arrives after the walk read its generation.
        discovery.invalidate();
        touch(temp.path(), "feather/settings.svg");
        let published = discovery.rebuild(started_at).unwrap();

        assert!(!discovery.is_fresh());
        assert!(Arc::ptr_eq(&published, &discovery.cached().unwrap()));

        let next = discovery.discover_all().unwrap();
        assert!(!Arc::ptr_eq(&published, &next));
        assert!(discovery.is_fresh());
        assert_eq!(discovery.builds(), 2);
    }

    #[cfg(unix)]
    #[test]
    fn test_scan_skips_names_no_reference_can_reach() {
        let temp = TempDir::new().unwrap();
        touch(temp.path(), "feather/arrow left.svg");
        touch(temp.path(), "feather/a:b.svg");
        touch(temp.path(), "feather/ trailing.svg");
        touch(temp.path(), "Material Icons/home.svg");
        touch(temp.path(), "ns:lib/home.svg");

        let entries = scan_layer(&PathLayer::application(temp.path()), "svg").unwrap();
        let keys: Vec<&str> = entries.iter().map(|e| e.key.as_str()).collect();

        assert_eq!(keys, vec!["Material Icons", "feather"]);
        assert_eq!(entries[1].icon_names, vec!["arrow left"]);
    }

    #[test]
    fn test_relative_library_path() {
        let root = Path::new("/icons");
        assert_eq!(relative_library_path(root, Path::new("/icons")), None);
        assert_eq!(
            relative_library_path(root, Path::new("/icons/a/b")).as_deref(),
            Some("a/b")
        );
    }
}
