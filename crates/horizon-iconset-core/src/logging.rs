//! Logging facilities for Horizon Iconset.
//!
//! The engine is instrumented with the `tracing` crate and never installs a
//! subscriber itself. To see its logs, install one in your application:
//!
//! ```ignore
//! fn main() {
//!     tracing_subscriber::fmt()
//!         .with_env_filter("horizon_iconset::discovery=debug")
//!         .init();
//! }
//! ```

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Layer registration and memoization.
    pub const REGISTRY: &str = "horizon_iconset::registry";
    /// Library discovery walks and cache rebuilds.
    pub const DISCOVERY: &str = "horizon_iconset::discovery";
    /// Reference resolution.
    pub const RESOLVER: &str = "horizon_iconset::resolver";
    /// Filesystem watching and invalidation.
    pub const WATCH: &str = "horizon_iconset::watch";
}

