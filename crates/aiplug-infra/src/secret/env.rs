//! Environment variable secret provider.
//!
//! A read-only provider consulted before the file store, so environment
//! variables override stored secrets.
//!
//! Key resolution (`name` is upper-cased, non-alphanumerics become `_`):
//! - Project scope: `AIPLUG_PROJECT_{ID}_{NAME}`
//! - Global scope: `AIPLUG_SECRET_{NAME}`, then `name` itself

use aiplug_core::repository::secret::SecretProvider;
use aiplug_types::error::RepositoryError;
use aiplug_types::secret::SecretScope;

/// Environment variable secret provider.
///
/// Read-only: `set()` returns an error because environment variables cannot
/// be persistently modified.
pub struct EnvSecretProvider;

impl EnvSecretProvider {
    pub fn new() -> Self {
        Self
    }

    /// Environment variable names checked for `name` in `scope`, in order.
    pub fn candidates(name: &str, scope: &SecretScope) -> Vec<String> {
        let normalized: String = name
            .chars()
            .map(|c| if c.is_ascii_alphanumeric() { c.to_ascii_uppercase() } else { '_' })
            .collect();

        match scope {
            SecretScope::Project(id) => vec![format!("AIPLUG_PROJECT_{id}_{normalized}")],
            SecretScope::Global => vec![format!("AIPLUG_SECRET_{normalized}"), name.to_string()],
        }
    }
}

impl Default for EnvSecretProvider {
    fn default() -> Self {
        Self::new()
    }
}

impl SecretProvider for EnvSecretProvider {
    async fn get(&self, name: &str, scope: &SecretScope) -> Result<Option<String>, RepositoryError> {
        for var in Self::candidates(name, scope) {
            // Non-unicode values are treated as absent.
            if let Ok(value) = std::env::var(&var) {
                return Ok(Some(value));
            }
        }
        Ok(None)
    }

    async fn set(&self, _name: &str, _value: &str, _scope: &SecretScope) -> Result<(), RepositoryError> {
        Err(RepositoryError::Query(
            "environment variable provider is read-only".to_string(),
        ))
    }

    async fn list(&self, _scope: &SecretScope) -> Result<Vec<String>, RepositoryError> {
        // Environment variables cannot be enumerated per scope.
        Ok(Vec::new())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiplug_types::secret::ProjectId;

    #[test]
    fn test_candidates_normalize_name() {
        assert_eq!(
            EnvSecretProvider::candidates("open-ai.token", &SecretScope::Project(ProjectId(3))),
            vec!["AIPLUG_PROJECT_3_OPEN_AI_TOKEN"]
        );
        assert_eq!(
            EnvSecretProvider::candidates("open_ai_token", &SecretScope::Global),
            vec!["AIPLUG_SECRET_OPEN_AI_TOKEN", "open_ai_token"]
        );
    }

    #[tokio::test]
    async fn test_env_provider_get_existing() {
        // SAFETY: the variable name is unique to this test and removed after.
        unsafe { std::env::set_var("AIPLUG_SECRET_ENV_TEST_TOKEN_1", "test-value-123") };

        let provider = EnvSecretProvider::new();
        let result = provider
            .get("env_test_token_1", &SecretScope::Global)
            .await
            .unwrap();
        assert_eq!(result.as_deref(), Some("test-value-123"));

        // SAFETY: set above.
        unsafe { std::env::remove_var("AIPLUG_SECRET_ENV_TEST_TOKEN_1") };
    }

    #[tokio::test]
    async fn test_env_provider_project_scope() {
        // SAFETY: the variable name is unique to this test and removed after.
        unsafe { std::env::set_var("AIPLUG_PROJECT_42_ENV_TEST_TOKEN_2", "project-value") };

        let provider = EnvSecretProvider::new();
        let project = provider
            .get("env_test_token_2", &SecretScope::Project(ProjectId(42)))
            .await
            .unwrap();
        assert_eq!(project.as_deref(), Some("project-value"));

        let other = provider
            .get("env_test_token_2", &SecretScope::Project(ProjectId(43)))
            .await
            .unwrap();
        assert!(other.is_none());

        // SAFETY: set above.
        unsafe { std::env::remove_var("AIPLUG_PROJECT_42_ENV_TEST_TOKEN_2") };
    }

    #[tokio::test]
    async fn test_env_provider_get_missing() {
        let provider = EnvSecretProvider::new();
        let result = provider
            .get("nonexistent_var_xyz_123", &SecretScope::Global)
            .await
            .unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_env_provider_is_read_only() {
        let provider = EnvSecretProvider::new();
        assert!(provider.set("KEY", "value", &SecretScope::Global).await.is_err());
        assert!(provider.list(&SecretScope::Global).await.unwrap().is_empty());
    }
}
