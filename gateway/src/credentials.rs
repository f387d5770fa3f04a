/// The credential store adapter resolves a tenant key to tracker credentials
/// and persists a tenant's credentials after they validate successfully.
/// The store itself is an external document store; implementations here model
/// it at its boundary.
use async_trait::async_trait;
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fs::File;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use std::time::{SystemTime, UNIX_EPOCH};
use tokio::sync::Mutex;
use tracker::Credentials;

#[derive(thiserror::Error, Debug)]
pub enum StoreError {
    /// No active record for the tenant key. Callers treat this as missing
    /// configuration on the tenant's side, not a system fault.
    #[error("no active record for tenant: {0}")]
    NotFound(String),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("document error: {0}")]
    Document(#[from] serde_json::Error),
}

/// One tenant's tracker credentials. The tenant key doubles as the tracker
/// account email for basic auth. `active = false` marks a soft-deleted tenant
/// and is excluded from lookups.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct TenantCredential {
    pub tenant_key: String,
    pub tracker_domain: String,
    pub api_token: String,
    pub active: bool,
    pub created_at: u64,
    pub updated_at: u64,
}

impl TenantCredential {
    pub fn tracker_credentials(&self) -> Credentials {
        Credentials::new(&self.tracker_domain, &self.tenant_key, &self.api_token)
    }
}

#[async_trait]
pub trait CredentialStore: Send + Sync {
    /// Looks up the unique active record for a tenant key.
    async fn resolve(&self, tenant_key: &str) -> Result<TenantCredential, StoreError>;

    /// Creates an active record, or overwrites domain/token on the existing
    /// one keyed by `tenant_key` and reactivates it. Always writes the full
    /// triple it receives; there is no field-level merge.
    async fn upsert(
        &self,
        tenant_key: &str,
        domain: &str,
        api_token: &str,
    ) -> Result<(), StoreError>;
}

fn now_epoch_secs() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or_default()
}

fn upsert_record(
    records: &mut HashMap<String, TenantCredential>,
    key: &str,
    domain: &str,
    token: &str,
) {
    let now = now_epoch_secs();
    match records.get_mut(key) {
        Some(record) => {
            record.tracker_domain = domain.to_string();
            record.api_token = token.to_string();
            record.active = true;
            record.updated_at = now;
        }
        None => {
            records.insert(
                key.to_string(),
                TenantCredential {
                    tenant_key: key.to_string(),
                    tracker_domain: domain.to_string(),
                    api_token: token.to_string(),
                    active: true,
                    created_at: now,
                    updated_at: now,
                },
            );
        }
    }
}

fn resolve_record(
    records: &HashMap<String, TenantCredential>,
    key: &str,
) -> Result<TenantCredential, StoreError> {
    records
        .get(key)
        .filter(|record| record.active)
        .cloned()
        .ok_or_else(|| StoreError::NotFound(key.to_string()))
}

/// Store backed by a single JSON document on the filesystem, keyed by tenant.
/// Writes are serialized through one lock; the whole document is rewritten on
/// every upsert.
pub struct FilesystemStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl FilesystemStore {
    pub fn new(base_dir: &str, filename: &str) -> Self {
        FilesystemStore {
            path: Path::new(base_dir).join(filename),
            write_lock: Mutex::new(()),
        }
    }

    fn load(&self) -> Result<HashMap<String, TenantCredential>, StoreError> {
        let file = match File::open(&self.path) {
            Ok(file) => file,
            // A store that was never written to is an empty document
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(HashMap::new()),
            Err(err) => return Err(err.into()),
        };
        Ok(serde_json::from_reader(BufReader::new(file))?)
    }

    fn store(&self, records: &HashMap<String, TenantCredential>) -> Result<(), StoreError> {
        let file = File::create(&self.path)?;
        let mut writer = BufWriter::new(file);
        serde_json::to_writer(&mut writer, records)?;
        Ok(())
    }
}

#[async_trait]
impl CredentialStore for FilesystemStore {
    async fn resolve(&self, tenant_key: &str) -> Result<TenantCredential, StoreError> {
        let _guard = self.write_lock.lock().await;
        resolve_record(&self.load()?, tenant_key)
    }

    async fn upsert(
        &self,
        tenant_key: &str,
        domain: &str,
        api_token: &str,
    ) -> Result<(), StoreError> {
        let _guard = self.write_lock.lock().await;
        let mut records = self.load()?;
        upsert_record(&mut records, tenant_key, domain, api_token);
        self.store(&records)?;
        tracing::debug!(tenant = tenant_key, "stored tenant credentials");
        Ok(())
    }
}

// In-process store for tests
#[derive(Default)]
pub struct MemoryStore {
    records: RwLock<HashMap<String, TenantCredential>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        MemoryStore::default()
    }

    pub fn seed(&self, record: TenantCredential) {
        self.records
            .write()
            .insert(record.tenant_key.clone(), record);
    }

    pub fn snapshot(&self) -> HashMap<String, TenantCredential> {
        self.records.read().clone()
    }
}

#[async_trait]
impl CredentialStore for MemoryStore {
    async fn resolve(&self, tenant_key: &str) -> Result<TenantCredential, StoreError> {
        resolve_record(&self.records.read(), tenant_key)
    }

    async fn upsert(
        &self,
        tenant_key: &str,
        domain: &str,
        api_token: &str,
    ) -> Result<(), StoreError> {
        upsert_record(&mut self.records.write(), tenant_key, domain, api_token);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn tempdir_store() -> (tempfile::TempDir, FilesystemStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = FilesystemStore::new(dir.path().to_str().unwrap(), "tenants.json");
        (dir, store)
    }

    #[tokio::test]
    async fn test_filesystem_roundtrip() {
        let (_dir, store) = tempdir_store();

        store
            .upsert("bob@example.com", "yourco.atlassian.net", "token-1")
            .await
            .unwrap();

        let record = store.resolve("bob@example.com").await.unwrap();
        assert_eq!(record.tenant_key, "bob@example.com");
        assert_eq!(record.tracker_domain, "yourco.atlassian.net");
        assert_eq!(record.api_token, "token-1");
        assert!(record.active);
    }

    #[tokio::test]
    async fn test_resolve_unknown_tenant() {
        let (_dir, store) = tempdir_store();

        let err = store.resolve("nobody@example.com").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_resolve_excludes_inactive() {
        let store = MemoryStore::new();
        store.seed(TenantCredential {
            tenant_key: "gone@example.com".into(),
            tracker_domain: "yourco.atlassian.net".into(),
            api_token: "token-1".into(),
            active: false,
            created_at: 1,
            updated_at: 1,
        });

        let err = store.resolve("gone@example.com").await.unwrap_err();
        assert!(matches!(err, StoreError::NotFound(_)));
    }

    #[tokio::test]
    async fn test_upsert_is_idempotent() {
        let (_dir, store) = tempdir_store();

        store
            .upsert("bob@example.com", "yourco.atlassian.net", "token-1")
            .await
            .unwrap();
        store
            .upsert("bob@example.com", "yourco.atlassian.net", "token-1")
            .await
            .unwrap();

        let records = store.load().unwrap();
        assert_eq!(records.len(), 1);
        let record = &records["bob@example.com"];
        assert!(record.active);
        assert_eq!(record.api_token, "token-1");
    }

    #[tokio::test]
    async fn test_upsert_overwrites_and_reactivates() {
        let store = MemoryStore::new();
        store.seed(TenantCredential {
            tenant_key: "bob@example.com".into(),
            tracker_domain: "old.atlassian.net".into(),
            api_token: "old-token".into(),
            active: false,
            created_at: 1,
            updated_at: 1,
        });

        store
            .upsert("bob@example.com", "new.atlassian.net", "new-token")
            .await
            .unwrap();

        let record = store.resolve("bob@example.com").await.unwrap();
        assert_eq!(record.tracker_domain, "new.atlassian.net");
        assert_eq!(record.api_token, "new-token");
        assert!(record.active);
        // The creation stamp survives an overwrite
        assert_eq!(record.created_at, 1);
        assert_eq!(store.snapshot().len(), 1);
    }
}
