//! Response interpretation and verdict classification for Veracity.
//!
//! This crate is the decision core of the system. Given a user message
//! (optionally with conversation history, media URLs, and an extracted
//! platform record), it:
//!
//! 1. composes the natural-language query sent to the external
//!    fact-checking AI service ([`compose`]),
//! 2. performs the single outbound call ([`client`]),
//! 3. interprets the free-text answer into a structured
//!    [`types::VerificationResult`] via an ordered lexical cascade
//!    ([`classify`]) plus citation mining and confidence scoring
//!    ([`sources`]).
//!
//! [`pipeline::ContentChecker`] ties the stages together and guarantees that
//! no downstream failure escapes as an unhandled error.

pub mod classify;
pub mod client;
pub mod compose;
pub mod pipeline;
pub mod sources;
pub mod types;

pub use client::{VerificationClient, VerifyApiClient};
pub use pipeline::ContentChecker;
pub use types::{CheckRequest, VerificationResult, Verdict};
