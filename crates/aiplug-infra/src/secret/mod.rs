//! Secret provider implementations.
//!
//! - `env`: environment variable provider (read-only, highest priority)
//! - `chain`: builds the provider chain handed to `SecretService`
//!
//! The writable provider is [`FileStore`](crate::store::FileStore).

pub mod chain;
pub mod env;
