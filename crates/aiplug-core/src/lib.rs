//! Business logic and port trait definitions for aiplug.
//!
//! This crate defines the "ports" (repository and backend traits) that the
//! infrastructure layer implements. It depends only on `aiplug-types` --
//! never on `aiplug-infra` or any network/storage crate.

pub mod dispatch;
pub mod llm;
pub mod model;
pub mod prompt;
pub mod repository;
pub mod service;
pub mod settings;
pub mod validation;
