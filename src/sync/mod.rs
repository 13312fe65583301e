//! Save, share and load portfolio snapshots
//!
//! The controller serializes the document, keeps a local copy in the cache
//! and pushes it to the remote store with a create-or-update write. Failures
//! come back as [`SyncError`] values; nothing here retries.

pub mod github;
pub mod remote;

use std::fmt;

use chrono::{DateTime, Utc};
use thiserror::Error;

use crate::core::cache::{shared_key, LocalCache, PORTFOLIO_KEY};
use crate::core::config::AppConfig;
use crate::core::document::Document;
use remote::{FileWrite, Identity, RemoteStore};

#[derive(Debug, Error)]
pub enum SyncError {
    #[error("configuration error: {0}")]
    Configuration(String),
    #[error("network error: {0}")]
    Network(String),
    #[error("remote store rejected the request ({status}): {body}")]
    RemoteRejection { status: u16, body: String },
    #[error("shared portfolio `{0}` was not found")]
    NotFound(String),
    #[error("invalid portfolio document: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl SyncError {
    /// The write lost an optimistic-concurrency check
    pub fn is_conflict(&self) -> bool {
        matches!(self, Self::RemoteRejection { status: 409 | 422, .. })
    }
}

/// Link under which a saved snapshot can be viewed
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ShareReference {
    pub snapshot_id: String,
    pub url: String,
}

impl ShareReference {
    pub fn new(base_url: &str, snapshot_id: &str) -> Self {
        Self {
            snapshot_id: snapshot_id.to_string(),
            url: format!("{}/view/{}", base_url.trim_end_matches('/'), snapshot_id),
        }
    }
}

impl fmt::Display for ShareReference {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.url)
    }
}

/// Fixed parameters of every save
#[derive(Debug, Clone)]
pub struct SyncSettings {
    pub snapshot_id: String,
    pub file_path: String,
    pub branch: String,
    pub commit_message: String,
    pub identity: Identity,
    pub share_base_url: String,
}

impl SyncSettings {
    pub fn from_config(config: &AppConfig) -> Self {
        let remote = &config.remote;
        Self {
            snapshot_id: remote.snapshot_id.clone(),
            file_path: remote.file_path(),
            branch: remote.branch.clone(),
            commit_message: remote.commit_message.clone(),
            identity: Identity {
                name: remote.committer_name.clone(),
                email: remote.committer_email.clone(),
            },
            share_base_url: config.share.base_url.clone(),
        }
    }
}

/// Snapshot ids end up in URLs and cache keys
pub fn is_valid_snapshot_id(id: &str) -> bool {
    !id.is_empty()
        && id.len() <= 128
        && !id.starts_with('.')
        && id
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || matches!(c, '-' | '_' | '.'))
}

pub struct SyncController<S> {
    store: S,
    cache: Option<LocalCache>,
    settings: SyncSettings,
}

impl<S: RemoteStore> SyncController<S> {
    pub fn new(store: S, cache: Option<LocalCache>, settings: SyncSettings) -> Self {
        Self {
            store,
            cache,
            settings,
        }
    }

    pub fn settings(&self) -> &SyncSettings {
        &self.settings
    }

    /// Link to the owner's snapshot
    pub fn share_reference(&self) -> ShareReference {
        ShareReference::new(&self.settings.share_base_url, &self.settings.snapshot_id)
    }

    /// The document from the last save, if the cache holds a readable one
    pub fn load_cached(&self) -> Option<Document> {
        self.cached_document(PORTFOLIO_KEY)
    }

    /// Cache locally, then create or update the remote snapshot
    pub async fn save(&self, document: &Document) -> Result<ShareReference, SyncError> {
        let result = self.push(document).await;
        match &result {
            Ok(reference) => tracing::info!("Saved portfolio, viewable at {}", reference),
            Err(e) => tracing::error!("Failed to save portfolio: {}", e),
        }
        result
    }

    /// Save a copy stamped with share metadata
    pub async fn share(
        &self,
        document: &Document,
        at: DateTime<Utc>,
    ) -> Result<ShareReference, SyncError> {
        let mut stamped = document.clone();
        stamped.stamp_shared(at);
        self.save(&stamped).await
    }

    /// Fetch a shared snapshot, falling back to a cached copy when offline
    pub async fn fetch_shared(&self, snapshot_id: &str) -> Result<Document, SyncError> {
        if !is_valid_snapshot_id(snapshot_id) {
            return Err(SyncError::NotFound(snapshot_id.to_string()));
        }

        let key = shared_key(snapshot_id);
        match self.store.fetch_raw(snapshot_id).await {
            Ok(content) => {
                let document = Document::from_json(&content)?;
                self.cache_write(&key, &content);
                tracing::info!("Loaded shared portfolio {}", snapshot_id);
                Ok(document)
            }
            Err(SyncError::Network(reason)) => match self.cached_document(&key) {
                Some(document) => {
                    tracing::warn!(
                        "Remote unavailable ({}), showing cached copy of {}",
                        reason,
                        snapshot_id
                    );
                    Ok(document)
                }
                None => Err(SyncError::Network(reason)),
            },
            Err(SyncError::NotFound(id)) => {
                self.cache_remove(&key);
                Err(SyncError::NotFound(id))
            }
            Err(e) => Err(e),
        }
    }

    async fn push(&self, document: &Document) -> Result<ShareReference, SyncError> {
        let snapshot_id = &self.settings.snapshot_id;
        if !is_valid_snapshot_id(snapshot_id) {
            return Err(SyncError::Configuration(format!(
                "remote.snapshot_id `{snapshot_id}` is not a valid snapshot id"
            )));
        }

        let content = document.to_json()?;
        self.cache_write(PORTFOLIO_KEY, &content);

        let path = &self.settings.file_path;
        let state = self.store.lookup(path).await?;
        tracing::debug!(
            path = %path,
            exists = state.exists(),
            sha = state.sha().unwrap_or("-"),
            "Looked up remote snapshot"
        );

        let write = FileWrite::after(
            state,
            path.as_str(),
            content,
            self.settings.commit_message.as_str(),
            self.settings.branch.as_str(),
            self.settings.identity.clone(),
        );
        self.store.put(&write).await?;

        Ok(self.share_reference())
    }

    fn cache_write(&self, key: &str, content: &str) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.write(key, content) {
            tracing::warn!("Failed to cache {}: {:#}", key, e);
        }
    }

    fn cache_remove(&self, key: &str) {
        let Some(cache) = &self.cache else {
            return;
        };
        if let Err(e) = cache.remove(key) {
            tracing::warn!("Failed to drop cached {}: {:#}", key, e);
        }
    }

    fn cached_document(&self, key: &str) -> Option<Document> {
        let cache = self.cache.as_ref()?;
        match cache.read(key) {
            Ok(Some(content)) => match Document::from_json(&content) {
                Ok(document) => Some(document),
                Err(e) => {
                    tracing::warn!("Ignoring unreadable cache slot {}: {}", key, e);
                    None
                }
            },
            Ok(None) => None,
            Err(e) => {
                tracing::warn!("{:#}", e);
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::remote::RemoteState;
    use super::*;
    use async_trait::async_trait;
    use chrono::TimeZone;
    use serde_json::json;
    use std::collections::HashMap;
    use std::sync::Mutex;

    #[derive(Default)]
    struct FakeStore {
        existing_sha: Option<String>,
        reject_put: Option<u16>,
        offline: bool,
        snapshots: HashMap<String, String>,
        lookups: Mutex<Vec<String>>,
        writes: Mutex<Vec<FileWrite>>,
        fetches: Mutex<Vec<String>>,
    }

    impl FakeStore {
        fn offline_error() -> SyncError {
            SyncError::Network("connection refused".to_string())
        }

        fn writes(&self) -> Vec<FileWrite> {
            self.writes.lock().unwrap().clone()
        }
    }

    #[async_trait]
    impl RemoteStore for FakeStore {
        async fn lookup(&self, path: &str) -> Result<RemoteState, SyncError> {
            if self.offline {
                return Err(Self::offline_error());
            }
            self.lookups.lock().unwrap().push(path.to_string());
            Ok(match &self.existing_sha {
                Some(sha) => RemoteState::present(sha.clone()),
                None => RemoteState::absent(),
            })
        }

        async fn put(&self, write: &FileWrite) -> Result<(), SyncError> {
            if self.offline {
                return Err(Self::offline_error());
            }
            self.writes.lock().unwrap().push(write.clone());
            match self.reject_put {
                Some(status) => Err(SyncError::RemoteRejection {
                    status,
                    body: r#"{"message":"sha does not match"}"#.to_string(),
                }),
                None => Ok(()),
            }
        }

        async fn fetch_raw(&self, snapshot_id: &str) -> Result<String, SyncError> {
            self.fetches.lock().unwrap().push(snapshot_id.to_string());
            if self.offline {
                return Err(Self::offline_error());
            }
            self.snapshots
                .get(snapshot_id)
                .cloned()
                .ok_or_else(|| SyncError::NotFound(snapshot_id.to_string()))
        }
    }

    fn settings() -> SyncSettings {
        let mut config = AppConfig::default();
        config.remote.snapshot_id = "ada".to_string();
        config.share.base_url = "https://folio.example.com/".to_string();
        SyncSettings::from_config(&config)
    }

    fn controller(store: FakeStore, dir: &tempfile::TempDir) -> SyncController<FakeStore> {
        SyncController::new(store, Some(LocalCache::new(dir.path())), settings())
    }

    fn ada() -> Document {
        Document::from_json(r#"{ "name": "Ada", "skills": [{ "name": "Rust", "level": 90 }] }"#)
            .unwrap()
    }

    #[tokio::test]
    async fn test_save_creates_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let sync = controller(FakeStore::default(), &dir);

        let reference = sync.save(&ada()).await.unwrap();
        assert_eq!(reference.url, "https://folio.example.com/view/ada");
        assert_eq!(reference.snapshot_id, "ada");

        assert_eq!(*sync.store.lookups.lock().unwrap(), vec!["ada.json".to_string()]);
        let writes = sync.store.writes();
        assert_eq!(writes.len(), 1);
        let write = &writes[0];
        assert!(write.is_create());
        assert_eq!(write.sha(), None);
        assert_eq!(write.path(), "ada.json");
        assert_eq!(write.branch(), "main");
        assert_eq!(write.message(), "Update portfolio");
        assert_eq!(Document::from_json(write.content()).unwrap(), ada());
    }

    #[tokio::test]
    async fn test_save_updates_existing_file_with_its_sha() {
        let dir = tempfile::tempdir().unwrap();
        let store = FakeStore {
            existing_sha: Some("3d21ec53a331a6f037a91c368710b99387d012c1".to_string()),
            ..FakeStore::default()
        };
        let sync = controller(store, &dir);

        sync.save(&ada()).await.unwrap();

        let writes = sync.store.writes();
        assert!(!writes[0].is_create());
        assert_eq!(
            writes[0].sha(),
            Some("3d21ec53a331a6f037a91c368710b99387d012c1")
        );
    }

    #[tokio::test]
    async fn test_rejected_write_fails_but_keeps_cache() {
        let dir = tempfile::tempdir().unwrap();
        let store = FakeStore {
            existing_sha: Some("stale".to_string()),
            reject_put: Some(409),
            ..FakeStore::default()
        };
        let sync = controller(store, &dir);

        let err = sync.save(&ada()).await.unwrap_err();
        assert!(err.is_conflict());
        assert!(matches!(err, SyncError::RemoteRejection { status: 409, .. }));
        assert_eq!(sync.load_cached(), Some(ada()));
    }

    #[tokio::test]
    async fn test_network_failure_is_reported() {
        let dir = tempfile::tempdir().unwrap();
        let store = FakeStore {
            offline: true,
            ..FakeStore::default()
        };
        let sync = controller(store, &dir);

        let err = sync.save(&ada()).await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
        assert!(sync.store.writes().is_empty());
        assert_eq!(sync.load_cached(), Some(ada()));
    }

    #[tokio::test]
    async fn test_save_rejects_unopenable_snapshot_id() {
        let dir = tempfile::tempdir().unwrap();
        let mut config = AppConfig::default();
        config.remote.snapshot_id = "my portfolio".to_string();
        let sync = SyncController::new(
            FakeStore::default(),
            Some(LocalCache::new(dir.path())),
            SyncSettings::from_config(&config),
        );

        let err = sync.save(&ada()).await.unwrap_err();
        assert!(matches!(err, SyncError::Configuration(_)));
        assert!(sync.store.lookups.lock().unwrap().is_empty());
        assert!(sync.store.writes().is_empty());
        assert_eq!(sync.load_cached(), None);
    }

    #[tokio::test]
    async fn test_saved_reference_can_be_fetched() {
        let dir = tempfile::tempdir().unwrap();
        let sync = controller(FakeStore::default(), &dir);

        let reference = sync.save(&ada()).await.unwrap();
        assert!(is_valid_snapshot_id(&reference.snapshot_id));
        assert!(reference.url.ends_with(&format!("/view/{}", reference.snapshot_id)));
    }

    #[tokio::test]
    async fn test_save_without_cache_still_pushes() {
        let sync = SyncController::new(FakeStore::default(), None, settings());
        sync.save(&ada()).await.unwrap();
        assert_eq!(sync.store.writes().len(), 1);
        assert_eq!(sync.load_cached(), None);
    }

    #[tokio::test]
    async fn test_share_stamps_a_copy() {
        let dir = tempfile::tempdir().unwrap();
        let sync = controller(FakeStore::default(), &dir);
        let document = ada();
        let at = Utc.with_ymd_and_hms(2025, 1, 2, 3, 4, 5).unwrap();

        let reference = sync.share(&document, at).await.unwrap();
        assert_eq!(reference.to_string(), "https://folio.example.com/view/ada");
        assert!(!document.is_shared());

        let written = Document::from_json(sync.store.writes()[0].content()).unwrap();
        assert!(written.is_shared());
        assert_eq!(written.share_date().unwrap(), at);
        assert_eq!(written.str_or("name", ""), "Ada");
        assert_eq!(sync.load_cached(), Some(written));
    }

    #[tokio::test]
    async fn test_fetch_shared_snapshot() {
        let dir = tempfile::tempdir().unwrap();
        let store = FakeStore {
            snapshots: HashMap::from([(
                "grace".to_string(),
                json!({ "name": "Grace", "isShared": true }).to_string(),
            )]),
            ..FakeStore::default()
        };
        let sync = controller(store, &dir);

        let document = sync.fetch_shared("grace").await.unwrap();
        assert_eq!(document.str_or("name", ""), "Grace");

        let cached = LocalCache::new(dir.path()).read(&shared_key("grace")).unwrap();
        assert!(cached.is_some());
    }

    #[tokio::test]
    async fn test_fetch_missing_snapshot_drops_stale_copy() {
        let dir = tempfile::tempdir().unwrap();
        let cache = LocalCache::new(dir.path());
        cache.write(&shared_key("nobody"), r#"{ "name": "Gone" }"#).unwrap();
        let sync = controller(FakeStore::default(), &dir);

        let err = sync.fetch_shared("nobody").await.unwrap_err();
        assert!(matches!(err, SyncError::NotFound(id) if id == "nobody"));
        assert_eq!(cache.read(&shared_key("nobody")).unwrap(), None);
    }

    #[tokio::test]
    async fn test_fetch_rejects_invalid_ids_without_request() {
        let dir = tempfile::tempdir().unwrap();
        let sync = controller(FakeStore::default(), &dir);

        for id in ["", "../secrets", "a/b", ".hidden"] {
            let err = sync.fetch_shared(id).await.unwrap_err();
            assert!(matches!(err, SyncError::NotFound(_)), "id {id:?}");
        }
        assert!(sync.store.fetches.lock().unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_fetch_falls_back_to_cache_when_offline() {
        let dir = tempfile::tempdir().unwrap();
        LocalCache::new(dir.path())
            .write(&shared_key("grace"), r#"{ "name": "Grace" }"#)
            .unwrap();
        let store = FakeStore {
            offline: true,
            ..FakeStore::default()
        };
        let sync = controller(store, &dir);

        let document = sync.fetch_shared("grace").await.unwrap();
        assert_eq!(document.str_or("name", ""), "Grace");

        let err = sync.fetch_shared("unknown").await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
    }

    #[tokio::test]
    async fn test_offline_fetch_does_not_mix_up_similar_ids() {
        let dir = tempfile::tempdir().unwrap();
        LocalCache::new(dir.path())
            .write(&shared_key("a_b"), r#"{ "name": "Alice B" }"#)
            .unwrap();
        let store = FakeStore {
            offline: true,
            ..FakeStore::default()
        };
        let sync = controller(store, &dir);

        let err = sync.fetch_shared("a.b").await.unwrap_err();
        assert!(matches!(err, SyncError::Network(_)));
        let document = sync.fetch_shared("a_b").await.unwrap();
        assert_eq!(document.str_or("name", ""), "Alice B");
    }

    #[tokio::test]
    async fn test_invalid_remote_document() {
        let dir = tempfile::tempdir().unwrap();
        let store = FakeStore {
            snapshots: HashMap::from([("broken".to_string(), "[1, 2]".to_string())]),
            ..FakeStore::default()
        };
        let sync = controller(store, &dir);

        let err = sync.fetch_shared("broken").await.unwrap_err();
        assert!(matches!(err, SyncError::Serialization(_)));
    }

    #[test]
    fn test_unreadable_cache_is_ignored() {
        let dir = tempfile::tempdir().unwrap();
        LocalCache::new(dir.path())
            .write(PORTFOLIO_KEY, "not json")
            .unwrap();
        let sync = controller(FakeStore::default(), &dir);
        assert_eq!(sync.load_cached(), None);
    }
}
