//! JSON file store backing both secrets and configuration blobs.
//!
//! Layout of the file:
//!
//! ```json
//! {
//!   "secrets": { "global": { "open_ai_token": "sk-..." }, "project:7": { ... } },
//!   "config":  { "open_ai_capabilities_map": { ... } }
//! }
//! ```
//!
//! The file is re-read on every lookup so edits made by other workers are
//! picked up. Writes are serialized within the process and land through a
//! temp file + rename.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tokio::sync::Mutex;

use aiplug_core::repository::config_store::ConfigStore;
use aiplug_core::repository::secret::SecretProvider;
use aiplug_types::error::RepositoryError;
use aiplug_types::secret::SecretScope;

#[derive(Debug, Default, Serialize, Deserialize)]
struct StoreDocument {
    #[serde(default)]
    secrets: BTreeMap<String, BTreeMap<String, String>>,
    #[serde(default)]
    config: BTreeMap<String, serde_json::Value>,
}

/// File-backed secret provider and config store.
///
/// Cloning is cheap; clones share the write lock.
#[derive(Clone)]
pub struct FileStore {
    path: Arc<PathBuf>,
    write_lock: Arc<Mutex<()>>,
}

impl FileStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: Arc::new(path.into()),
            write_lock: Arc::new(Mutex::new(())),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    async fn load(&self) -> Result<StoreDocument, RepositoryError> {
        match tokio::fs::read_to_string(self.path.as_path()).await {
            Ok(content) if content.trim().is_empty() => Ok(StoreDocument::default()),
            Ok(content) => serde_json::from_str(&content).map_err(|e| {
                RepositoryError::Corrupt(format!("{}: {e}", self.path.display()))
            }),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                Ok(StoreDocument::default())
            }
            Err(err) => Err(RepositoryError::Query(format!(
                "failed to read {}: {err}",
                self.path.display()
            ))),
        }
    }

    async fn save(&self, doc: &StoreDocument) -> Result<(), RepositoryError> {
        let content = serde_json::to_string_pretty(doc)
            .map_err(|e| RepositoryError::Query(format!("failed to encode store: {e}")))?;

        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await.map_err(|e| {
                    RepositoryError::Query(format!("failed to create {}: {e}", parent.display()))
                })?;
            }
        }

        let tmp = self.path.with_extension("json.tmp");
        tokio::fs::write(&tmp, content)
            .await
            .map_err(|e| RepositoryError::Query(format!("failed to write {}: {e}", tmp.display())))?;
        tokio::fs::rename(&tmp, self.path.as_path()).await.map_err(|e| {
            RepositoryError::Query(format!("failed to replace {}: {e}", self.path.display()))
        })
    }

    /// Load, modify and save under the write lock.
    async fn update<F>(&self, apply: F) -> Result<(), RepositoryError>
    where
        F: FnOnce(&mut StoreDocument) + Send,
    {
        let _guard = self.write_lock.lock().await;
        let mut doc = self.load().await?;
        apply(&mut doc);
        self.save(&doc).await
    }
}

impl SecretProvider for FileStore {
    async fn get(&self, name: &str, scope: &SecretScope) -> Result<Option<String>, RepositoryError> {
        let doc = self.load().await?;
        Ok(doc
            .secrets
            .get(&scope.to_string())
            .and_then(|entries| entries.get(name))
            .cloned())
    }

    async fn set(&self, name: &str, value: &str, scope: &SecretScope) -> Result<(), RepositoryError> {
        let scope_key = scope.to_string();
        self.update(|doc| {
            doc.secrets
                .entry(scope_key)
                .or_default()
                .insert(name.to_string(), value.to_string());
        })
        .await?;
        tracing::debug!(secret = name, %scope, "secret stored");
        Ok(())
    }

    async fn list(&self, scope: &SecretScope) -> Result<Vec<String>, RepositoryError> {
        let doc = self.load().await?;
        Ok(doc
            .secrets
            .get(&scope.to_string())
            .map(|entries| entries.keys().cloned().collect())
            .unwrap_or_default())
    }
}

impl ConfigStore for FileStore {
    async fn get(&self, key: &str) -> Result<Option<serde_json::Value>, RepositoryError> {
        let doc = self.load().await?;
        Ok(doc.config.get(key).cloned())
    }

    async fn put(&self, key: &str, value: serde_json::Value) -> Result<(), RepositoryError> {
        self.update(|doc| {
            doc.config.insert(key.to_string(), value);
        })
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use aiplug_types::secret::ProjectId;
    use serde_json::json;
    use tempfile::TempDir;

    fn store(tmp: &TempDir) -> FileStore {
        FileStore::new(tmp.path().join("store.json"))
    }

    #[tokio::test]
    async fn test_missing_file_is_empty() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        let secret = SecretProvider::get(&store, "open_ai_token", &SecretScope::Global)
            .await
            .unwrap();
        assert!(secret.is_none());
        assert!(ConfigStore::get(&store, "anything").await.unwrap().is_none());
        assert!(store.list(&SecretScope::Global).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_secret_roundtrip_is_scoped() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        let project = SecretScope::Project(ProjectId(7));

        store.set("open_ai_token", "sk-project", &project).await.unwrap();

        let from_project = SecretProvider::get(&store, "open_ai_token", &project).await.unwrap();
        assert_eq!(from_project.as_deref(), Some("sk-project"));

        let from_global = SecretProvider::get(&store, "open_ai_token", &SecretScope::Global)
            .await
            .unwrap();
        assert!(from_global.is_none());
        assert_eq!(store.list(&project).await.unwrap(), vec!["open_ai_token"]);
    }

    #[tokio::test]
    async fn test_config_and_secrets_share_file() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);

        store.set("key", "v", &SecretScope::Global).await.unwrap();
        store.put("open_ai_token_limits", json!({"gpt-4": 8192})).await.unwrap();

        let reopened = FileStore::new(store.path().to_path_buf());
        assert_eq!(
            ConfigStore::get(&reopened, "open_ai_token_limits").await.unwrap(),
            Some(json!({"gpt-4": 8192}))
        );
        assert_eq!(
            SecretProvider::get(&reopened, "key", &SecretScope::Global).await.unwrap(),
            Some("v".to_string())
        );
    }

    #[tokio::test]
    async fn test_corrupt_file_is_reported() {
        let tmp = TempDir::new().unwrap();
        let store = store(&tmp);
        tokio::fs::write(store.path(), "{not json").await.unwrap();

        let err = ConfigStore::get(&store, "k").await.unwrap_err();
        assert!(matches!(err, RepositoryError::Corrupt(_)));
    }

    #[tokio::test]
    async fn test_put_creates_parent_directory() {
        let tmp = TempDir::new().unwrap();
        let store = FileStore::new(tmp.path().join("nested").join("store.json"));

        store.put("k", json!(1)).await.unwrap();
        assert!(store.path().exists());
    }
}
