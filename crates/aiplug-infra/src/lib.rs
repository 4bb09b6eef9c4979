//! Infrastructure for aiplug: the OpenAI backend, the JSON file store used for
//! secrets and the model catalog, the environment secret provider, and the
//! `aiplug.toml` loader.

pub mod config;
pub mod llm;
pub mod secret;
pub mod store;
