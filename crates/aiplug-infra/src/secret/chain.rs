//! Secret chain builder: wires concrete providers in priority order.
//!
//! The resulting chain is passed to `SecretService` in `aiplug-core` via the
//! `DynSecretProvider` abstraction.

use std::sync::Arc;

use aiplug_core::repository::secret::DynSecretProvider;

use crate::secret::env::EnvSecretProvider;
use crate::store::FileStore;

/// Build the secret resolution chain (first match wins):
/// 1. Environment variables (if `include_env`)
/// 2. JSON file store (always; the write target)
pub fn build_secret_chain(store: FileStore, include_env: bool) -> Vec<DynSecretProvider> {
    let mut chain: Vec<DynSecretProvider> = Vec::new();

    if include_env {
        chain.push(Arc::new(EnvSecretProvider::new()));
    }

    chain.push(Arc::new(store));
    chain
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiplug_core::service::secret::SecretService;
    use aiplug_types::secret::{ProjectId, SecretScope};
    use tempfile::TempDir;

    #[test]
    fn test_chain_length() {
        let store = FileStore::new("/tmp/unused.json");
        assert_eq!(build_secret_chain(store.clone(), true).len(), 2);
        assert_eq!(build_secret_chain(store, false).len(), 1);
    }

    #[tokio::test]
    async fn test_env_overrides_file_store() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("store.json"));
        let service = SecretService::new(build_secret_chain(store, true));

        service
            .set_secret("chain_test_token", "from-file", &SecretScope::Global)
            .await
            .unwrap();

        // SAFETY: the variable name is unique to this test and removed after.
        unsafe { std::env::set_var("AIPLUG_SECRET_CHAIN_TEST_TOKEN", "from-env") };
        let value = service
            .get_secret("chain_test_token", &SecretScope::Project(ProjectId(1)))
            .await
            .unwrap();
        // SAFETY: set above.
        unsafe { std::env::remove_var("AIPLUG_SECRET_CHAIN_TEST_TOKEN") };

        assert_eq!(value.as_deref(), Some("from-env"));
    }
}
