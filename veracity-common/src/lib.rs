//! Shared error types and observability helpers for the Veracity workspace.
//!
//! This crate is intentionally lightweight and dependency-minimal so that all
//! other crates can depend on it without heavy transitive costs.
//!
//! # Overview
//!
//! - [`VeracityError`] and [`Result`]: shared error handling
//! - [`observability`]: centralised tracing/logging initialisation

pub mod observability;

/// Error types used across the Veracity system.
#[derive(thiserror::Error, Debug)]
pub enum VeracityError {
    /// The caller supplied a missing or malformed request field.
    #[error("invalid input: {0}")]
    InvalidInput(String),

    /// The verification API is unreachable, misconfigured, or rejected us.
    #[error("verification service unavailable: {0}")]
    Upstream(String),

    /// A platform extractor failed for a given URL.
    #[error("extraction failed: {0}")]
    Extraction(String),

    /// Configuration was incomplete or invalid.
    #[error("configuration error: {0}")]
    Config(String),

    /// Operation exceeded the configured timeout.
    #[error("request timed out")]
    Timeout,
}

/// Convenient alias for results that use [`VeracityError`].
pub type Result<T> = std::result::Result<T, VeracityError>;
