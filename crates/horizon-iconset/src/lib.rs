//! Horizon Iconset - namespaced SVG icon libraries for applications and plugins.
//!
//! This is the umbrella crate. It re-exports everything from
//! `horizon-iconset-core` and adds the composed [`IconEngine`] plus optional
//! filesystem watching.
//!
//! # Example
//!
//! ```no_run
//! use horizon_iconset::prelude::*;
//!
//! let engine = IconEngine::from_config(IconsetConfig::load_default()?)?;
//! let icon = engine.resolve("ui:feather/settings")?;
//! let svg = icon.read_bytes()?;
//! # Ok::<(), horizon_iconset::Error>(())
//! ```
//!
//! # Features
//!
//! - `hot-reload` (default): [`hot_reload::IconWatcher`] invalidates the
//!   engine when files under a layer root change.

pub use horizon_iconset_core::*;

mod engine;

pub use engine::IconEngine;

#[cfg(feature = "hot-reload")]
pub mod hot_reload;

/// Commonly used types.
pub mod prelude {
    pub use crate::engine::IconEngine;
    pub use horizon_iconset_core::{
        Error, IconHandle, IconReference, IconResolver, IconsetConfig, LayerRegistry,
        LibraryDiscovery, LibraryEntry, LibraryKey, LibraryMap, PathLayer, Result,
    };

    #[cfg(feature = "hot-reload")]
    pub use crate::hot_reload::{ChangeKind, IconChangeEvent, IconWatcher};
}
