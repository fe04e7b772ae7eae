//! Report layer for Chat Wrapped.
//!
//! Renders the wrapped summary and growth forecast as plain text and saves
//! both as JSON.

pub mod export;
pub mod formatting;
pub mod growth_view;
pub mod wrapped_view;

pub use wrapped_core as core;
