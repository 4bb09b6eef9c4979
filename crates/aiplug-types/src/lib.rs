//! Shared domain types for aiplug.
//!
//! Integration settings, model catalog records, request bodies, call
//! descriptors and the result envelope, plus their error types.
//!
//! Zero infrastructure dependencies -- only serde, thiserror, validator.

pub mod config;
pub mod descriptor;
pub mod error;
pub mod llm;
pub mod model;
pub mod prompt;
pub mod request;
pub mod result;
pub mod secret;
pub mod settings;
