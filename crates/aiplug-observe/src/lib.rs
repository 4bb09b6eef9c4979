//! Observability for aiplug: subscriber setup and the attribute names
//! provider calls are recorded under.

pub mod genai_attrs;
pub mod tracing_setup;
