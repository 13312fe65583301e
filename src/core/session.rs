//! Editing session: the document currently on screen and its edit state

use serde_json::Value;

use super::document::Document;
use super::path::PathError;

/// Where the session's document came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionSource {
    /// The owner's own portfolio, editable and saved to the remote store
    Local,
    /// A shared snapshot fetched by id, shown read-only
    Shared { snapshot_id: String },
}

/// Owns the document for as long as it is displayed
///
/// Entering edit mode keeps a copy of the document so the edit can be
/// cancelled. While a save is in flight the document is frozen, so what is
/// on screen when edit mode ends is exactly what was saved. A shared session
/// never enters edit mode.
#[derive(Debug, Clone)]
pub struct Session {
    document: Document,
    source: SessionSource,
    baseline: Option<Document>,
    modified: bool,
    saving: bool,
}

impl Session {
    /// Session over the owner's document
    pub fn local(document: Document) -> Self {
        Self {
            document,
            source: SessionSource::Local,
            baseline: None,
            modified: false,
            saving: false,
        }
    }

    /// Read-only session over a fetched snapshot
    pub fn shared(snapshot_id: impl Into<String>, document: Document) -> Self {
        Self {
            document,
            source: SessionSource::Shared {
                snapshot_id: snapshot_id.into(),
            },
            baseline: None,
            modified: false,
            saving: false,
        }
    }

    pub fn document(&self) -> &Document {
        &self.document
    }

    pub fn source(&self) -> &SessionSource {
        &self.source
    }

    pub fn is_read_only(&self) -> bool {
        matches!(self.source, SessionSource::Shared { .. })
    }

    pub fn is_editing(&self) -> bool {
        self.baseline.is_some()
    }

    /// Whether the document changed since edit mode was entered
    pub fn is_modified(&self) -> bool {
        self.modified
    }

    /// Enter edit mode, remembering the current content
    pub fn begin_edit(&mut self) -> bool {
        if self.is_read_only() || self.is_editing() {
            return false;
        }
        self.baseline = Some(self.document.clone());
        self.modified = false;
        true
    }

    /// Whether widgets may write to the document right now
    pub fn accepts_edits(&self) -> bool {
        self.is_editing() && !self.saving
    }

    pub fn is_saving(&self) -> bool {
        self.saving
    }

    /// Freeze the document for a save and return the content to push
    pub fn begin_save(&mut self) -> Option<Document> {
        if !self.accepts_edits() {
            return None;
        }
        self.saving = true;
        Some(self.document.clone())
    }

    /// Unfreeze after a save; a successful save also leaves edit mode
    pub fn finish_save(&mut self, saved: bool) {
        if !self.saving {
            return;
        }
        self.saving = false;
        if saved {
            self.commit_edit();
        }
    }

    /// Leave edit mode and restore the content from before the edit
    pub fn cancel_edit(&mut self) {
        if let Some(baseline) = self.baseline.take() {
            self.document = baseline;
        }
        self.modified = false;
        self.saving = false;
    }

    /// Leave edit mode keeping the edited content
    pub fn commit_edit(&mut self) {
        self.baseline = None;
        self.modified = false;
    }

    /// Write through a path; ignored unless the session accepts edits
    pub fn set(&mut self, path: &str, value: impl Into<Value>) -> Result<(), PathError> {
        if !self.accepts_edits() {
            return Ok(());
        }
        self.document.set(path, value)?;
        self.modified = true;
        Ok(())
    }

    /// Mutable access for list edits (add/remove entries) while editing
    pub fn edit_document(&mut self) -> Option<&mut Document> {
        if !self.accepts_edits() {
            return None;
        }
        self.modified = true;
        Some(&mut self.document)
    }
}
