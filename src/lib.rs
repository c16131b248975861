//! An embeddable off-heap object cache.
//!
//! Values are stored outside the Rust heap in a bounded arena (optionally
//! overflowing to an ephemeral scratch file once the arena fills past a
//! configurable threshold) and addressed by opaque, monotonically issued
//! handles. A pluggable eviction policy decides what to reclaim when the
//! store is under pressure.
//!
//! ```no_run
//! use offheap_cache::{Store, StoreConfig};
//!
//! let store = Store::new(StoreConfig::default())?;
//! let handle = store.put(b"hello")?;
//! assert_eq!(store.get(handle), Some(b"hello".to_vec()));
//! # Ok::<(), offheap_cache::Error>(())
//! ```
#![warn(missing_docs)]

pub mod allocator;
pub mod codec;
pub mod config;
pub mod error;
pub mod pointer;
pub mod policy;
pub mod store;
pub mod system;

pub use config::StoreConfig;
pub use error::{Error, Result};
pub use pointer::Handle;
pub use store::Store;

/// Crate version, as set in `Cargo.toml`.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
/// Crate name, as set in `Cargo.toml`.
pub const NAME: &str = env!("CARGO_PKG_NAME");

/// Install a `tracing-subscriber` formatter honoring `RUST_LOG`. Optional —
/// embedders with their own subscriber can skip this and use the crate's
/// `tracing` spans directly.
pub fn init() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();
    tracing::info!("{} v{}", NAME, VERSION);
    Ok(())
}
