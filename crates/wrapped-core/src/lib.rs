//! Shared types for Chat Wrapped.
//!
//! Holds the event and statistics models, the error type, CLI settings, and
//! the two text-level helpers used while parsing a transcript: sender name
//! normalization and message tokenization.

pub mod error;
pub mod models;
pub mod normalizer;
pub mod settings;
pub mod tokenizer;
