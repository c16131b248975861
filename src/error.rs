//! Error types for the off-heap cache.
//!
//! Mirrors the teacher crate's nested, `thiserror`-derived error hierarchy:
//! one top-level enum with a variant per kind named in the component design,
//! `#[from]` conversions for the errors we wrap rather than construct
//! ourselves, and a crate-wide `Result` alias.

use thiserror::Error;

/// Crate-wide result alias.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors surfaced by the allocator, policy, and store layers.
#[derive(Error, Debug)]
pub enum Error {
    /// `put` could not admit the payload even after exhausting evictable
    /// entries, or a single allocation would exceed the allocator's
    /// capacity outright.
    #[error("out of capacity: requested {requested} bytes, {available} available")]
    OutOfCapacity {
        /// Bytes the caller asked to allocate.
        requested: u64,
        /// Bytes the allocator had free at the time of the failed attempt.
        available: u64,
    },

    /// An operation was given a pointer this allocator did not mint, or a
    /// pointer belonging to the wrong tier for the operation attempted.
    #[error("invalid pointer: {0}")]
    InvalidHandle(String),

    /// A constructor argument fell outside its documented domain (e.g. a
    /// threshold outside `(0, 1)`).
    #[error("invalid argument: {0}")]
    InvalidArgument(String),

    /// The file tier failed a read or write.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// The external object<->bytes collaborator failed to encode or decode
    /// a payload. The store itself never raises this; it is here so
    /// embedders can fold encoder failures into the same error type.
    #[error("serialization error: {0}")]
    Serialization(String),

    /// The store has been closed; no further operations are permitted.
    #[error("store is closed")]
    Closed,
}

impl Error {
    /// Construct an [`Error::OutOfCapacity`].
    pub fn out_of_capacity(requested: u64, available: u64) -> Self {
        Self::OutOfCapacity { requested, available }
    }

    /// Construct an [`Error::InvalidHandle`].
    pub fn invalid_handle(msg: impl Into<String>) -> Self {
        Self::InvalidHandle(msg.into())
    }

    /// Construct an [`Error::InvalidArgument`].
    pub fn invalid_argument(msg: impl Into<String>) -> Self {
        Self::InvalidArgument(msg.into())
    }

    /// True for errors the core itself considers retryable internally
    /// (currently none are retried beyond the single forced-eviction retry
    /// baked into `Store::put`; exposed for symmetry with the teacher's
    /// `Error::is_retryable`).
    pub fn is_retryable(&self) -> bool {
        false
    }
}
