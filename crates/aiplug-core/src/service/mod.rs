//! Business logic services (use cases).
//!
//! Services orchestrate repository calls, catalog lookups and provider
//! calls. They depend on traits (ports) -- never on concrete
//! infrastructure implementations.

pub mod adapter;
pub mod secret;
