//! Remote single-file store seam
//!
//! Writes follow a two-step optimistic protocol: [`RemoteStore::lookup`]
//! reports whether the file exists and its content id, and a [`FileWrite`]
//! can only be built from that [`RemoteState`]. The store rejects an update
//! whose content id no longer matches.

use async_trait::async_trait;
use serde::Serialize;

use super::SyncError;

/// What the remote store holds at the target path
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RemoteState {
    sha: Option<String>,
}

impl RemoteState {
    /// No file at the target path; the next write creates it
    pub(crate) fn absent() -> Self {
        Self { sha: None }
    }

    /// A file exists with content id `sha`; the next write updates it
    pub(crate) fn present(sha: impl Into<String>) -> Self {
        Self {
            sha: Some(sha.into()),
        }
    }

    pub fn exists(&self) -> bool {
        self.sha.is_some()
    }

    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }
}

/// Name and email recorded on commits
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Identity {
    pub name: String,
    pub email: String,
}

/// A create-or-update request for one file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileWrite {
    path: String,
    content: String,
    message: String,
    branch: String,
    identity: Identity,
    sha: Option<String>,
}

impl FileWrite {
    /// Build the write that follows `state`; updates carry its content id
    pub fn after(
        state: RemoteState,
        path: impl Into<String>,
        content: impl Into<String>,
        message: impl Into<String>,
        branch: impl Into<String>,
        identity: Identity,
    ) -> Self {
        Self {
            path: path.into(),
            content: content.into(),
            message: message.into(),
            branch: branch.into(),
            identity,
            sha: state.sha,
        }
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Raw file content; stores apply their own transfer encoding
    pub fn content(&self) -> &str {
        &self.content
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn branch(&self) -> &str {
        &self.branch
    }

    pub fn identity(&self) -> &Identity {
        &self.identity
    }

    /// Content id of the file being replaced; `None` when creating
    pub fn sha(&self) -> Option<&str> {
        self.sha.as_deref()
    }

    pub fn is_create(&self) -> bool {
        self.sha.is_none()
    }
}

/// A store holding portfolio snapshots as single files
#[async_trait]
pub trait RemoteStore: Send + Sync {
    /// Check whether a file exists at `path`
    ///
    /// A missing file (any non-success response) is [`RemoteState::absent`],
    /// not an error. Transport failures are reported as
    /// [`SyncError::Network`].
    async fn lookup(&self, path: &str) -> Result<RemoteState, SyncError>;

    /// Create or update a file
    async fn put(&self, write: &FileWrite) -> Result<(), SyncError>;

    /// Fetch the raw content of the snapshot `snapshot_id`
    async fn fetch_raw(&self, snapshot_id: &str) -> Result<String, SyncError>;
}
