//! Error types for the trust engine.
//!
//! `TrustError` is the public error surface of the engine; `StoreError`
//! covers the storage boundary. Transient sub-score failures are handled
//! inside the manager (fail-soft to neutral values) and never appear here.

use thiserror::Error;

/// Errors surfaced by the storage layer.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("record not found: {0}")]
    NotFound(String),

    #[error("storage backend error: {0}")]
    Backend(String),
}

/// Errors surfaced by the trust engine's public operations.
#[derive(Debug, Error)]
pub enum TrustError {
    /// Input rejected by a business rule (e.g. an unverified user
    /// attempting to endorse another).
    #[error("validation failed: {0}")]
    Validation(String),

    /// A report or lookup targeted a user with no trust profile.
    #[error("trust profile not found for user {0}")]
    ProfileNotFound(String),

    /// The storage layer failed in a way the caller must see, e.g. a
    /// failed profile persist that the caller should retry.
    #[error(transparent)]
    Store(#[from] StoreError),
}
