//! Domain error types.

use thiserror::Error;

/// Top-level domain error type.
///
/// Only `InvalidInput`, `ProfileNotFound`, `ConcurrencyConflict` and
/// `UpstreamUnavailable` ever reach an HTTP caller. `MalformedUpstreamOutput`
/// and `ResourceMissing` are recovered where they are raised.
#[derive(Debug, Error)]
pub enum DomainError {
    /// Caller supplied an empty or malformed value.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// No profile exists for the visitor.
    #[error("profile not found: {0}")]
    ProfileNotFound(String),

    /// Optimistic concurrency conflict on a profile document.
    #[error("concurrency conflict on profile {visitor_id}: expected revision {expected}, found {actual}")]
    ConcurrencyConflict {
        /// The visitor whose profile had the conflict.
        visitor_id: String,
        /// The expected revision.
        expected: i64,
        /// The actual revision found.
        actual: i64,
    },

    /// The text-generation service, document store or SMS provider failed.
    #[error("upstream unavailable: {0}")]
    UpstreamUnavailable(String),

    /// An upstream payload could not be parsed.
    #[error("malformed upstream output: {0}")]
    MalformedUpstreamOutput(String),

    /// Visual resources for an actor kind are missing.
    #[error("resource missing: {0}")]
    ResourceMissing(String),
}
