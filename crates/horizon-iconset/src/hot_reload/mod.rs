//! Cache invalidation driven by filesystem changes.
//!
//! This module is only available with the `hot-reload` feature.

mod watcher;

pub use watcher::{ChangeKind, IconChangeEvent, IconWatcher, WatchError};
