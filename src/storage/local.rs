//! Local single-blob store.
//!
//! The snapshot lives as one JSON document at
//! `<data_dir>/<namespace>/root_data.json`. Bumping the namespace starts from
//! an empty store; configure the old namespace under `legacy_namespaces` to
//! have bootstrap copy its record forward instead of seeding.

use super::{Bootstrap, Change, ProgressKey, ProgressStore, StorageAdapter};
use crate::{
    errors::Result,
    models::{AppSnapshot, seed_snapshot},
};
use async_trait::async_trait;
use chrono::{DateTime, Utc};
use std::{
    collections::{BTreeMap, BTreeSet},
    path::{Path, PathBuf},
};
use tokio::{io::AsyncWriteExt, sync::Mutex};
use tracing::{debug, info, instrument, warn};

const DATA_FILE: &str = "root_data.json";
const PROGRESS_FILE: &str = "progress.json";

/// Completion sets by phone, then by module id.
type ProgressFile = BTreeMap<String, BTreeMap<String, BTreeSet<String>>>;

/// Snapshot store backed by a single JSON file.
#[derive(Debug)]
pub struct LocalStore {
    root: PathBuf,
    namespace: String,
    legacy_roots: Vec<(String, PathBuf)>,
    write_lock: Mutex<()>,
}

impl LocalStore {
    /// Opens (without touching disk) the store for `namespace` under `data_dir`.
    pub fn new(data_dir: impl AsRef<Path>, namespace: &str) -> Self {
        Self {
            root: data_dir.as_ref().join(namespace),
            namespace: namespace.to_string(),
            legacy_roots: Vec::new(),
            write_lock: Mutex::new(()),
        }
    }

    /// Adds older namespaces, searched in the given order, to copy forward on bootstrap.
    #[must_use]
    pub fn with_legacy_namespaces<I, S>(mut self, data_dir: impl AsRef<Path>, namespaces: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.legacy_roots.extend(namespaces.into_iter().map(|ns| {
            let ns = ns.into();
            let root = data_dir.as_ref().join(&ns);
            (ns, root)
        }));
        self
    }

    /// Path of the snapshot blob.
    #[must_use]
    pub fn data_path(&self) -> PathBuf {
        self.root.join(DATA_FILE)
    }

    fn progress_path(&self) -> PathBuf {
        self.root.join(PROGRESS_FILE)
    }

    /// Reads and parses the blob, failing on any error.
    async fn read_strict(&self) -> Result<AppSnapshot> {
        let bytes = tokio::fs::read(self.data_path()).await?;
        let mut snapshot: AppSnapshot = serde_json::from_slice(&bytes)?;
        snapshot.normalize();
        Ok(snapshot)
    }

    async fn write_snapshot(&self, snapshot: &AppSnapshot) -> Result<()> {
        let json = serde_json::to_vec(snapshot)?;
        write_atomic(&self.data_path(), &json).await
    }

    async fn bootstrap_locked(&self, now: DateTime<Utc>) -> Result<Bootstrap> {
        if tokio::fs::try_exists(self.data_path()).await? {
            return Ok(Bootstrap::Existing);
        }

        for (namespace, legacy_root) in &self.legacy_roots {
            let legacy_path = legacy_root.join(DATA_FILE);
            if tokio::fs::try_exists(&legacy_path).await? {
                let bytes = tokio::fs::read(&legacy_path).await?;
                // Refuse to carry a corrupt record forward
                serde_json::from_slice::<AppSnapshot>(&bytes)?;
                write_atomic(&self.data_path(), &bytes).await?;
                info!(
                    "Copied snapshot forward from namespace '{}' to '{}'",
                    namespace, self.namespace
                );
                return Ok(Bootstrap::Migrated {
                    namespace: namespace.clone(),
                });
            }
        }

        self.write_snapshot(&seed_snapshot(now)).await?;
        info!("Seeded new local store in namespace '{}'", self.namespace);
        Ok(Bootstrap::Seeded)
    }

    async fn read_progress(&self) -> Result<ProgressFile> {
        let path = self.progress_path();
        if !tokio::fs::try_exists(&path).await? {
            return Ok(ProgressFile::new());
        }
        let bytes = tokio::fs::read(&path).await?;
        Ok(serde_json::from_slice(&bytes)?)
    }
}

/// Writes `bytes` to a sibling temp file, syncs it, and renames it over `path`.
async fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let tmp_path = path.with_extension("json.tmp");

    let mut file = tokio::fs::File::create(&tmp_path).await?;
    file.write_all(bytes).await?;
    file.sync_all().await?;
    drop(file);

    tokio::fs::rename(&tmp_path, path).await?;
    Ok(())
}

#[async_trait]
impl StorageAdapter for LocalStore {
    #[instrument(skip(self), fields(namespace = %self.namespace))]
    async fn bootstrap(&self, now: DateTime<Utc>) -> Result<Bootstrap> {
        let _guard = self.write_lock.lock().await;
        self.bootstrap_locked(now).await
    }

    #[instrument(skip(self), fields(namespace = %self.namespace))]
    async fn load(&self) -> Result<AppSnapshot> {
        let now = Utc::now();
        self.bootstrap(now).await?;

        match self.read_strict().await {
            Ok(snapshot) => {
                debug!(
                    "Loaded snapshot: {} users, {} modules, {} media",
                    snapshot.users.len(),
                    snapshot.modules.len(),
                    snapshot.media.len()
                );
                Ok(snapshot)
            }
            Err(e) => {
                // Reads degrade to the seed; the unreadable record is left in place.
                warn!("Failed to read local snapshot, serving seed data: {}", e);
                let mut snapshot = seed_snapshot(now);
                snapshot.normalize();
                Ok(snapshot)
            }
        }
    }

    #[instrument(skip(self), fields(namespace = %self.namespace))]
    async fn load_strict(&self) -> Result<AppSnapshot> {
        self.bootstrap(Utc::now()).await?;
        self.read_strict().await
    }

    #[instrument(skip(self, snapshot), fields(namespace = %self.namespace))]
    async fn save(&self, snapshot: &AppSnapshot) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.write_snapshot(snapshot).await?;
        info!("Saved snapshot to {:?}", self.data_path());
        Ok(())
    }

    #[instrument(skip(self, changes), fields(namespace = %self.namespace, changes = changes.len()))]
    async fn apply(&self, changes: &[Change]) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        self.bootstrap_locked(Utc::now()).await?;

        let mut snapshot = self.read_strict().await?;
        for change in changes {
            change.apply_to(&mut snapshot);
        }
        self.write_snapshot(&snapshot).await
    }
}

#[async_trait]
impl ProgressStore for LocalStore {
    async fn completed(&self, key: &ProgressKey) -> Result<BTreeSet<String>> {
        let progress = self.read_progress().await?;
        Ok(progress
            .get(&key.user_phone)
            .and_then(|modules| modules.get(&key.module_id))
            .cloned()
            .unwrap_or_default())
    }

    #[instrument(skip(self, completed))]
    async fn set_completed(&self, key: &ProgressKey, completed: &BTreeSet<String>) -> Result<()> {
        let _guard = self.write_lock.lock().await;
        let mut progress = self.read_progress().await?;
        let modules = progress.entry(key.user_phone.clone()).or_default();
        if completed.is_empty() {
            modules.remove(&key.module_id);
        } else {
            modules.insert(key.module_id.clone(), completed.clone());
        }
        if modules.is_empty() {
            progress.remove(&key.user_phone);
        }

        let json = serde_json::to_vec(&progress)?;
        write_atomic(&self.progress_path(), &json).await
    }
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::errors::Error;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> LocalStore {
        LocalStore::new(dir.path(), "KidsEnglishDB_v9")
    }

    #[tokio::test]
    async fn test_bootstrap_is_idempotent() -> Result<()> {
        let dir = TempDir::new()?;
        let store = store(&dir);

        assert_eq!(store.bootstrap(Utc::now()).await?, Bootstrap::Seeded);
        let first = store.load().await?;
        let bytes_before = tokio::fs::read(store.data_path()).await?;

        assert_eq!(store.bootstrap(Utc::now()).await?, Bootstrap::Existing);
        let second = store.load().await?;
        let bytes_after = tokio::fs::read(store.data_path()).await?;

        assert_eq!(first, second);
        assert_eq!(bytes_before, bytes_after);
        Ok(())
    }

    #[tokio::test]
    async fn test_bootstrap_does_not_overwrite_existing_record() -> Result<()> {
        let dir = TempDir::new()?;
        let store = store(&dir);
        let snapshot = AppSnapshot::empty();
        store.save(&snapshot).await?;

        assert_eq!(store.bootstrap(Utc::now()).await?, Bootstrap::Existing);
        assert_eq!(store.load().await?, snapshot);
        Ok(())
    }

    #[tokio::test]
    async fn test_legacy_namespace_is_copied_forward() -> Result<()> {
        let dir = TempDir::new()?;
        let old = LocalStore::new(dir.path(), "KidsEnglishDB_v8");
        let mut snapshot = AppSnapshot::empty();
        snapshot.settings.app_name = "Carried Over".to_string();
        old.save(&snapshot).await?;

        let store = store(&dir).with_legacy_namespaces(dir.path(), ["KidsEnglishDB_v8"]);

        assert_eq!(
            store.bootstrap(Utc::now()).await?,
            Bootstrap::Migrated {
                namespace: "KidsEnglishDB_v8".to_string()
            }
        );
        assert_eq!(store.load().await?.settings.app_name, "Carried Over");
        // The old record is copied, not moved
        assert!(old.data_path().exists());
        Ok(())
    }

    #[tokio::test]
    async fn test_corrupt_blob_degrades_on_load_but_not_on_apply() -> Result<()> {
        let dir = TempDir::new()?;
        let store = store(&dir);
        tokio::fs::create_dir_all(store.data_path().parent().unwrap()).await?;
        tokio::fs::write(store.data_path(), b"{not json").await?;

        let loaded = store.load().await?;
        assert_eq!(loaded.modules[0].title, "Welcome Stories");

        let result = store
            .apply(&[Change::DeleteUser("98988650771".to_string())])
            .await;
        assert!(matches!(result, Err(Error::Json(_))));
        assert!(matches!(store.load_strict().await, Err(Error::Json(_))));
        // The unreadable record was not replaced
        assert_eq!(tokio::fs::read(store.data_path()).await?, b"{not json");
        Ok(())
    }

    #[tokio::test]
    async fn test_apply_persists_all_changes() -> Result<()> {
        let dir = TempDir::new()?;
        let store = store(&dir);
        store.bootstrap(Utc::now()).await?;

        store
            .apply(&[
                Change::DeleteModuleMedia("1".to_string()),
                Change::DeleteModule("1".to_string()),
            ])
            .await?;

        let reopened = LocalStore::new(dir.path(), "KidsEnglishDB_v9");
        let snapshot = reopened.load().await?;
        assert!(snapshot.modules.is_empty());
        assert!(snapshot.media.is_empty());
        Ok(())
    }

    #[tokio::test]
    async fn test_progress_is_kept_per_user() -> Result<()> {
        let dir = TempDir::new()?;
        let store = store(&dir);
        let alice = ProgressKey::new("111", "1");
        let bob = ProgressKey::new("222", "1");

        store
            .set_completed(&alice, &BTreeSet::from(["m1".to_string()]))
            .await?;

        assert_eq!(store.completed(&alice).await?.len(), 1);
        assert!(store.completed(&bob).await?.is_empty());
        // Progress never leaks into the snapshot blob
        assert!(!store.data_path().exists());
        Ok(())
    }
}
