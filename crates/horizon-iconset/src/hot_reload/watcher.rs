//! File watching for icon layer roots.

use std::collections::HashSet;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::time::Duration;

use notify::{RecommendedWatcher, RecursiveMode};
use notify_debouncer_mini::{DebouncedEvent, DebouncedEventKind, Debouncer, new_debouncer};

use horizon_iconset_core::DEFAULT_ICON_EXTENSION;
use horizon_iconset_core::logging::targets;

use crate::engine::IconEngine;

/// Debounce window for coalescing bursts of changes.
const DEBOUNCE: Duration = Duration::from_millis(100);

/// Errors raised while setting up file watching.
#[derive(Debug, thiserror::Error)]
pub enum WatchError {
    /// The platform watcher failed.
    #[error("File watcher error: {0}")]
    Notify(#[from] notify::Error),

    /// A path could not be watched.
    #[error("Failed to watch '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

/// Event indicating something changed under a watched root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IconChangeEvent {
    /// Path of the changed file or directory.
    pub path: PathBuf,
    /// Type of change.
    pub kind: ChangeKind,
}

/// Type of file change.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ChangeKind {
    /// The path exists after the change.
    Modified,
    /// The path no longer exists.
    Removed,
}

/// Watches icon layer roots and invalidates engine caches on change.
///
/// # Example
///
/// ```ignore
/// let mut watcher = IconWatcher::new()?;
/// watcher.watch_layers(&engine)?;
///
/// // In your event loop:
/// let changes = watcher.poll();
/// watcher.apply(&engine, &changes);
/// ```
pub struct IconWatcher {
    debouncer: Debouncer<RecommendedWatcher>,
    rx: Receiver<std::result::Result<Vec<DebouncedEvent>, notify::Error>>,
    watched_roots: HashSet<PathBuf>,
    extension: String,
}

impl IconWatcher {
    /// Create a watcher for `.svg` icons.
    pub fn new() -> Result<Self, WatchError> {
        Self::with_extension(DEFAULT_ICON_EXTENSION)
    }

    /// Create a watcher for icons with the given extension.
    pub fn with_extension(extension: impl Into<String>) -> Result<Self, WatchError> {
        let (tx, rx) = mpsc::channel();
        let debouncer = new_debouncer(DEBOUNCE, tx)?;

        Ok(Self {
            debouncer,
            rx,
            watched_roots: HashSet::new(),
            extension: extension.into(),
        })
    }

    /// Watch every current layer root of the engine.
    ///
    /// Also adopts the engine's icon extension. Returns the number of roots
    /// newly watched.
    pub fn watch_layers(&mut self, engine: &IconEngine) -> Result<usize, WatchError> {
        self.extension = engine.registry().extension().to_string();

        let mut added = 0;
        for layer in engine.layers().iter() {
            if self.watch(&layer.root)? {
                added += 1;
            }
        }
        Ok(added)
    }

    /// Start watching a directory recursively.
    ///
    /// Returns false if it was already watched.
    pub fn watch(&mut self, root: impl AsRef<Path>) -> Result<bool, WatchError> {
        let root = root.as_ref();
        let root = root.canonicalize().map_err(|source| WatchError::Io {
            path: root.to_path_buf(),
            source,
        })?;

        if self.watched_roots.contains(&root) {
            return Ok(false);
        }

        self.debouncer.watcher().watch(&root, RecursiveMode::Recursive)?;
        tracing::info!(target: targets::WATCH, "Watching icon layer: {}", root.display());
        self.watched_roots.insert(root);
        Ok(true)
    }

    /// Stop watching a directory.
    pub fn unwatch(&mut self, root: impl AsRef<Path>) -> Result<(), WatchError> {
        let root = match root.as_ref().canonicalize() {
            Ok(p) => p,
            // Removed roots are forgotten by the platform watcher already
            Err(_) => root.as_ref().to_path_buf(),
        };

        if self.watched_roots.remove(&root) {
            let _ = self.debouncer.watcher().unwatch(&root);
            tracing::info!(target: targets::WATCH, "Stopped watching icon layer: {}", root.display());
        }
        Ok(())
    }

    /// Poll for icon changes.
    ///
    /// Only icon files, directories and removed paths under watched roots
    /// are reported. Each path appears at most once.
    pub fn poll(&mut self) -> Vec<IconChangeEvent> {
        let mut changes = vec![];

        loop {
            match self.rx.try_recv() {
                Ok(Ok(events)) => {
                    for event in events {
                        if event.kind != DebouncedEventKind::Any
                            && event.kind != DebouncedEventKind::AnyContinuous
                        {
                            continue;
                        }
                        if !self.is_under_root(&event.path) || !is_relevant(&event.path, &self.extension) {
                            continue;
                        }
                        let kind = if event.path.exists() {
                            ChangeKind::Modified
                        } else {
                            ChangeKind::Removed
                        };
                        changes.push(IconChangeEvent {
                            path: event.path,
                            kind,
                        });
                    }
                }
                Ok(Err(e)) => {
                    tracing::warn!(target: targets::WATCH, "File watcher error: {}", e);
                }
                Err(TryRecvError::Empty) => break,
                Err(TryRecvError::Disconnected) => {
                    tracing::error!(target: targets::WATCH, "File watcher disconnected");
                    break;
                }
            }
        }

        changes.sort_by(|a, b| a.path.cmp(&b.path));
        changes.dedup_by(|a, b| a.path == b.path);
        changes
    }

    /// Invalidate the engine's caches if there were any changes.
    ///
    /// Returns true if the engine was invalidated.
    pub fn apply(&self, engine: &IconEngine, changes: &[IconChangeEvent]) -> bool {
        if changes.is_empty() {
            return false;
        }

        for change in changes {
            tracing::debug!(
                target: targets::WATCH,
                "Icon path {:?}: {}",
                change.kind,
                change.path.display()
            );
        }
        engine.invalidate();
        true
    }

    /// Poll and apply in one step.
    pub fn poll_and_apply(&mut self, engine: &IconEngine) -> bool {
        let changes = self.poll();
        self.apply(engine, &changes)
    }

    /// Icon file extension the watcher reports.
    pub fn extension(&self) -> &str {
        &self.extension
    }

    /// Number of watched roots.
    pub fn watched_count(&self) -> usize {
        self.watched_roots.len()
    }

    /// The watched roots.
    pub fn watched_roots(&self) -> impl Iterator<Item = &Path> {
        self.watched_roots.iter().map(|p| p.as_path())
    }

    fn is_under_root(&self, path: &Path) -> bool {
        self.watched_roots.iter().any(|root| path.starts_with(root))
    }
}

impl std::fmt::Debug for IconWatcher {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("IconWatcher")
            .field("watched_roots", &self.watched_roots)
            .field("extension", &self.extension)
            .finish_non_exhaustive()
    }
}

/// Icon files, directories, and anything that no longer exists. A removed
/// path can't be told apart from a removed library directory, whatever its
/// extension looks like.
fn is_relevant(path: &Path, extension: &str) -> bool {
    if !path.exists() || path.is_dir() {
        return true;
    }
    path.extension()
        .and_then(OsStr::to_str)
        .is_some_and(|ext| ext.eq_ignore_ascii_case(extension))
}
