//! Data ingestion layer for Chat Wrapped.
//!
//! Responsible for classifying transcript lines, reading an export file,
//! aggregating message statistics, fitting the membership growth trend and
//! running the top-level analysis pipeline.

pub mod aggregator;
pub mod analysis;
pub mod growth;
pub mod parser;
pub mod reader;

pub use wrapped_core as core;
