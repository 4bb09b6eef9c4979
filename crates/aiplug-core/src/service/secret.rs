//! Secret management service.
//!
//! SecretService resolves secrets through a chain of providers in priority order.
//! Resolution precedence: project-scoped keys > global keys, and within one
//! scope the first provider in the chain wins.
//!
//! This service lives in `aiplug-core` and depends only on `aiplug-types`
//! and the `DynSecretProvider` trait -- never on concrete infra implementations.

use std::collections::BTreeSet;

use aiplug_types::error::{RepositoryError, SecretError};
use aiplug_types::secret::{ProjectId, Redacted, SecretField, SecretScope};

use crate::repository::secret::DynSecretProvider;

/// Service for resolving secrets across multiple storage backends.
///
/// Providers are ordered by precedence (first match wins).
/// Default chain: `[EnvSecretProvider, FileStore]`
///
/// For project-scoped secrets, the service first tries every provider with the
/// project scope, then falls back to global scope.
pub struct SecretService {
    providers: Vec<DynSecretProvider>,
}

impl SecretService {
    /// Create a new SecretService with the given provider chain.
    ///
    /// Providers should be ordered by precedence (highest priority first).
    pub fn new(providers: Vec<DynSecretProvider>) -> Self {
        Self { providers }
    }

    /// Resolve a secret value by iterating through providers in priority order.
    ///
    /// For `SecretScope::Project`: first tries providers with the project
    /// scope, then falls back to global scope.
    pub async fn get_secret(
        &self,
        name: &str,
        scope: &SecretScope,
    ) -> Result<Option<String>, RepositoryError> {
        if let Some(value) = self.first_match(name, scope).await? {
            return Ok(Some(value));
        }

        if let SecretScope::Project(_) = scope {
            return self.first_match(name, &SecretScope::Global).await;
        }

        Ok(None)
    }

    async fn first_match(
        &self,
        name: &str,
        scope: &SecretScope,
    ) -> Result<Option<String>, RepositoryError> {
        for provider in &self.providers {
            if let Some(value) = provider.get_boxed(name, scope).await? {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    /// Turn a settings credential into a plaintext key for a request.
    ///
    /// Literal values pass through untouched. Secret references are resolved
    /// in the project's scope, or globally when there is no project context.
    pub async fn unsecret(
        &self,
        field: &SecretField,
        project: Option<ProjectId>,
    ) -> Result<Redacted, SecretError> {
        if let Some(literal) = field.literal() {
            return Ok(Redacted::new(literal));
        }

        // literal() is None only for secret references
        let name = field.secret_name().unwrap_or_default();
        let scope = SecretScope::for_project(project);

        match self.get_secret(name, &scope).await {
            Ok(Some(value)) => {
                tracing::debug!(secret = name, %scope, "resolved secret reference");
                Ok(Redacted::new(value))
            }
            Ok(None) => Err(SecretError::NotFound {
                name: name.to_string(),
                scope: scope.to_string(),
            }),
            Err(err) => Err(SecretError::StorageError(err.to_string())),
        }
    }

    /// Store a secret value in the first writable provider.
    ///
    /// Read-only providers (e.g., env vars) return an error, which is skipped.
    pub async fn set_secret(
        &self,
        name: &str,
        value: &str,
        scope: &SecretScope,
    ) -> Result<(), RepositoryError> {
        for provider in &self.providers {
            if provider.set_boxed(name, value, scope).await.is_ok() {
                return Ok(());
            }
        }

        Err(RepositoryError::Query(
            "no writable secret provider available".to_string(),
        ))
    }

    /// List secret names, aggregated from all providers and deduplicated.
    pub async fn list_secrets(&self, scope: &SecretScope) -> Vec<String> {
        let mut names = BTreeSet::new();

        for provider in &self.providers {
            match provider.list_boxed(scope).await {
                Ok(provider_names) => names.extend(provider_names),
                Err(err) => {
                    tracing::debug!(error = %err, "secret provider could not list names");
                }
            }
        }

        names.into_iter().collect()
    }
}
