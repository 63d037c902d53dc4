//! Error types surfaced by the core.
//!
//! Not every failure mode in this crate is an `Err`: allocation failure is a
//! null pointer `Value` (see [`crate::value::Value::is_null_pointer`]) and a
//! double free is a silent no-op. Only the two failure modes that cannot be
//! represented in-band get a variant here.

use thiserror::Error;

/// Failures that can be returned from the core API.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum MemoryManagerError {
    /// A [`Value`](crate::value::Value) operation was attempted on a word of
    /// the wrong kind: pointer arithmetic on a non-pointer, or `encode` with
    /// an out-of-domain payload for the requested type.
    #[error("type error: {0}")]
    TypeError(&'static str),

    /// [`MemoryManager::collect`](crate::memory_manager::MemoryManager::collect)
    /// was called without a collector configured.
    #[error("collect() called without a configured collector")]
    ConfigError,
}
