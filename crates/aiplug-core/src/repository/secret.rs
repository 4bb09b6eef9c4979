//! Secret provider trait definition.

use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

use aiplug_types::error::RepositoryError;
use aiplug_types::secret::SecretScope;

/// Trait for secret storage backends (environment, file store, platform vault).
///
/// Each provider stores and retrieves secret values. `SecretService` chains
/// multiple providers in priority order.
pub trait SecretProvider: Send + Sync {
    /// Retrieve a secret value by name and scope.
    /// Returns None if the secret does not exist in this provider.
    fn get(
        &self,
        name: &str,
        scope: &SecretScope,
    ) -> impl Future<Output = Result<Option<String>, RepositoryError>> + Send;

    /// Store a secret value.
    fn set(
        &self,
        name: &str,
        value: &str,
        scope: &SecretScope,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;

    /// List the secret names stored for a scope (never values).
    fn list(
        &self,
        scope: &SecretScope,
    ) -> impl Future<Output = Result<Vec<String>, RepositoryError>> + Send;
}

/// Object-safe version of [`SecretProvider`] with boxed futures.
pub trait SecretProviderDyn: Send + Sync {
    fn get_boxed<'a>(
        &'a self,
        name: &'a str,
        scope: &'a SecretScope,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, RepositoryError>> + Send + 'a>>;

    fn set_boxed<'a>(
        &'a self,
        name: &'a str,
        value: &'a str,
        scope: &'a SecretScope,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>>;

    fn list_boxed<'a>(
        &'a self,
        scope: &'a SecretScope,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, RepositoryError>> + Send + 'a>>;
}

impl<T: SecretProvider> SecretProviderDyn for T {
    fn get_boxed<'a>(
        &'a self,
        name: &'a str,
        scope: &'a SecretScope,
    ) -> Pin<Box<dyn Future<Output = Result<Option<String>, RepositoryError>> + Send + 'a>> {
        Box::pin(self.get(name, scope))
    }

    fn set_boxed<'a>(
        &'a self,
        name: &'a str,
        value: &'a str,
        scope: &'a SecretScope,
    ) -> Pin<Box<dyn Future<Output = Result<(), RepositoryError>> + Send + 'a>> {
        Box::pin(self.set(name, value, scope))
    }

    fn list_boxed<'a>(
        &'a self,
        scope: &'a SecretScope,
    ) -> Pin<Box<dyn Future<Output = Result<Vec<String>, RepositoryError>> + Send + 'a>> {
        Box::pin(self.list(scope))
    }
}

/// Shared, type-erased secret provider as held by `SecretService`.
pub type DynSecretProvider = Arc<dyn SecretProviderDyn>;
