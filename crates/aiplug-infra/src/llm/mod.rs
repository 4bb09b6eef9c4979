//! Concrete implementations of the [`ModelBackend`](aiplug_core::llm::backend::ModelBackend)
//! port.

pub mod openai;
