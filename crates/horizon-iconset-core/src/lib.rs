//! Core engine for Horizon Iconset.
//!
//! This crate resolves symbolic icon references such as `ui:feather/home` to
//! SVG files drawn from layered search roots:
//!
//! - **Layers**: an application root plus namespaced plugin roots, kept in
//!   registration order ([`LayerRegistry`])
//! - **References**: `[namespace:]library/path/icon` strings parsed into
//!   [`IconReference`]
//! - **Resolution**: first-match lookup across compatible layers
//!   ([`IconResolver`])
//! - **Discovery**: a cached listing of every library and its icons
//!   ([`LibraryDiscovery`])
//!
//! # Example
//!
//! ```no_run
//! use std::sync::Arc;
//! use horizon_iconset_core::{IconResolver, LayerRegistry, LibraryDiscovery};
//!
//! let registry = Arc::new(
//!     LayerRegistry::builder()
//!         .application_root("app/assets/icons")
//!         .plugin("ui", "plugins/ui/icons")
//!         .build()?,
//! );
//!
//! let resolver = IconResolver::new(Arc::clone(&registry));
//! let icon = resolver.resolve("ui:feather/settings")?;
//! println!("{} -> {}", icon.library_key, icon.file_path.display());
//!
//! let discovery = LibraryDiscovery::new(registry);
//! for (key, library) in discovery.discover_all()?.iter() {
//!     println!("{key}: {} icons", library.len());
//! }
//! # Ok::<(), horizon_iconset_core::Error>(())
//! ```

pub mod config;
pub mod discovery;
pub mod logging;
pub mod reference;
pub mod registry;
pub mod resolver;
pub mod types;

mod error;

pub use config::IconsetConfig;
pub use discovery::LibraryDiscovery;
pub use error::{Error, Result};
pub use reference::IconReference;
pub use registry::{LayerRegistry, LayerRegistryBuilder};
pub use resolver::IconResolver;
pub use types::{
    DEFAULT_ICON_EXTENSION, IconHandle, LibraryEntry, LibraryKey, LibraryMap, PathLayer,
};
