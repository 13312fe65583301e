//! Main application state and UI coordination

use std::future::Future;
use std::sync::mpsc::{self, Receiver, TryRecvError};
use std::sync::Arc;

use chrono::Utc;
use eframe::egui;

use crate::core::{config::AppConfig, document::Document, session::Session};
use crate::sync::{github::GitHubStore, ShareReference, SyncController, SyncError};
use crate::ui::{
    actions::ActionBar, header::HeaderPanel, images::ImageCache, sections::PortfolioPanel,
    snapshot_dialog::SnapshotDialog,
};

/// Sync operation currently running in the background
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncTask {
    Save,
    Share,
    Fetch(String),
}

impl SyncTask {
    fn label(&self) -> String {
        match self {
            SyncTask::Save => "Saving…".to_string(),
            SyncTask::Share => "Sharing…".to_string(),
            SyncTask::Fetch(snapshot_id) => format!("Loading {snapshot_id}…"),
        }
    }
}

/// Result of a background sync operation, sent back to the UI thread
enum SyncOutcome {
    Saved(Result<ShareReference, SyncError>),
    Shared(Result<ShareReference, SyncError>),
    Fetched(String, Result<Document, SyncError>),
}

struct PendingSync {
    task: SyncTask,
    receiver: Receiver<SyncOutcome>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// One-line message shown in the action bar
#[derive(Debug, Clone)]
pub struct StatusMessage {
    pub kind: StatusKind,
    pub text: String,
}

impl StatusMessage {
    fn info(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Info,
            text: text.into(),
        }
    }

    fn success(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Success,
            text: text.into(),
        }
    }

    fn error(text: impl Into<String>) -> Self {
        Self {
            kind: StatusKind::Error,
            text: text.into(),
        }
    }
}

/// Main application state
pub struct PortfolioApp {
    /// Application configuration
    pub config: AppConfig,
    /// Document on screen
    pub session: Session,
    /// The owner's session, parked while a shared snapshot is shown
    home: Option<Session>,
    sync: Arc<SyncController<GitHubStore>>,
    runtime: tokio::runtime::Runtime,
    pending: Option<PendingSync>,
    pub status: Option<StatusMessage>,
    /// Link produced by the last successful share
    pub last_share: Option<ShareReference>,
    pub images: ImageCache,
    /// Commonmark cache for the about section
    pub commonmark_cache: egui_commonmark::CommonMarkCache,
    pub snapshot_dialog: SnapshotDialog,
}

impl PortfolioApp {
    /// Create a new application instance
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        config: AppConfig,
        sync: SyncController<GitHubStore>,
        runtime: tokio::runtime::Runtime,
        initial_snapshot: Option<String>,
    ) -> Self {
        egui_extras::install_image_loaders(&cc.egui_ctx);
        Self::apply_theme(&cc.egui_ctx, &config.ui.theme);

        let document = sync.load_cached().unwrap_or_else(|| {
            tracing::info!("No saved portfolio found, starting from the sample");
            Document::sample()
        });

        let mut app = Self {
            config,
            session: Session::local(document),
            home: None,
            sync: Arc::new(sync),
            runtime,
            pending: None,
            status: None,
            last_share: None,
            images: ImageCache::new(),
            commonmark_cache: egui_commonmark::CommonMarkCache::default(),
            snapshot_dialog: SnapshotDialog::default(),
        };

        if let Some(snapshot_id) = initial_snapshot {
            app.open_snapshot(&cc.egui_ctx, snapshot_id);
        }
        app
    }

    fn apply_theme(ctx: &egui::Context, theme: &str) {
        if theme.eq_ignore_ascii_case("light") {
            ctx.set_visuals(egui::Visuals::light());
        } else {
            ctx.set_visuals(egui::Visuals::dark());
        }
    }

    pub fn is_busy(&self) -> bool {
        self.pending.is_some()
    }

    /// Label for the running sync operation, if any
    pub fn busy_label(&self) -> Option<String> {
        self.pending.as_ref().map(|pending| pending.task.label())
    }

    pub fn begin_edit(&mut self) {
        if self.is_busy() {
            return;
        }
        if self.session.begin_edit() {
            self.status = Some(StatusMessage::info("Editing. Save to publish your changes."));
        }
    }

    pub fn cancel_edit(&mut self) {
        if !self.session.is_editing() || self.is_busy() {
            return;
        }
        self.session.cancel_edit();
        self.status = Some(StatusMessage::info("Changes discarded"));
    }

    /// Push the edited document; edit mode ends only once the save succeeds
    pub fn save(&mut self, ctx: &egui::Context) {
        if self.is_busy() {
            return;
        }
        let Some(document) = self.session.begin_save() else {
            return;
        };
        let sync = Arc::clone(&self.sync);
        self.spawn(ctx, SyncTask::Save, async move {
            SyncOutcome::Saved(sync.save(&document).await)
        });
    }

    /// Publish the document with share metadata and copy its link
    pub fn share(&mut self, ctx: &egui::Context) {
        if self.session.is_read_only() || self.session.is_editing() || self.is_busy() {
            return;
        }
        let sync = Arc::clone(&self.sync);
        let document = self.session.document().clone();
        self.spawn(ctx, SyncTask::Share, async move {
            SyncOutcome::Shared(sync.share(&document, Utc::now()).await)
        });
    }

    /// Fetch a shared snapshot and show it read-only
    pub fn open_snapshot(&mut self, ctx: &egui::Context, snapshot_id: String) {
        if self.is_busy() {
            return;
        }
        if self.session.is_editing() {
            self.status = Some(StatusMessage::error(
                "Save or cancel your changes before opening another portfolio",
            ));
            return;
        }
        let sync = Arc::clone(&self.sync);
        let task = SyncTask::Fetch(snapshot_id.clone());
        self.spawn(ctx, task, async move {
            let result = sync.fetch_shared(&snapshot_id).await;
            SyncOutcome::Fetched(snapshot_id, result)
        });
    }

    /// Leave the shared snapshot and show the owner's portfolio again
    pub fn return_home(&mut self) {
        if let Some(home) = self.home.take() {
            self.session = home;
            self.status = None;
        }
    }

    fn spawn<F>(&mut self, ctx: &egui::Context, task: SyncTask, job: F)
    where
        F: Future<Output = SyncOutcome> + Send + 'static,
    {
        let (sender, receiver) = mpsc::channel();
        let ctx = ctx.clone();
        self.runtime.spawn(async move {
            let outcome = job.await;
            if sender.send(outcome).is_err() {
                tracing::debug!("Sync result dropped, receiver gone");
            }
            ctx.request_repaint();
        });
        self.pending = Some(PendingSync { task, receiver });
    }

    /// Pick up the result of the running sync operation, if it finished
    fn poll_sync(&mut self, ctx: &egui::Context) {
        let Some(pending) = &self.pending else {
            return;
        };
        match pending.receiver.try_recv() {
            Ok(outcome) => {
                self.pending = None;
                self.apply_outcome(ctx, outcome);
            }
            Err(TryRecvError::Empty) => {}
            Err(TryRecvError::Disconnected) => {
                self.pending = None;
                self.session.finish_save(false);
                self.status = Some(StatusMessage::error("Sync stopped unexpectedly"));
            }
        }
    }

    fn apply_outcome(&mut self, ctx: &egui::Context, outcome: SyncOutcome) {
        match outcome {
            SyncOutcome::Saved(Ok(_)) => {
                self.session.finish_save(true);
                self.status = Some(StatusMessage::success("Portfolio saved"));
            }
            SyncOutcome::Saved(Err(e)) => {
                self.session.finish_save(false);
                self.status = Some(StatusMessage::error(describe_error("Save failed", &e)));
            }
            SyncOutcome::Shared(Ok(reference)) => {
                ctx.copy_text(reference.url.clone());
                self.status = Some(StatusMessage::success(format!(
                    "Share link copied: {}",
                    reference.url
                )));
                self.last_share = Some(reference);
            }
            SyncOutcome::Shared(Err(e)) => {
                self.status = Some(StatusMessage::error(describe_error("Share failed", &e)));
            }
            SyncOutcome::Fetched(snapshot_id, Ok(document)) => {
                let shared = Session::shared(snapshot_id.as_str(), document);
                let previous = std::mem::replace(&mut self.session, shared);
                if !previous.is_read_only() {
                    self.home = Some(previous);
                }
                self.status = None;

                self.config.set_last_snapshot(&snapshot_id);
                if let Err(e) = self.config.save() {
                    tracing::warn!("Failed to remember snapshot {}: {:#}", snapshot_id, e);
                }
            }
            SyncOutcome::Fetched(snapshot_id, Err(SyncError::NotFound(_))) => {
                self.status = Some(StatusMessage::error(format!(
                    "Portfolio not found: {snapshot_id}"
                )));
            }
            SyncOutcome::Fetched(_, Err(e)) => {
                self.status = Some(StatusMessage::error(describe_error(
                    "Could not load portfolio",
                    &e,
                )));
            }
        }
    }

    fn handle_shortcuts(&mut self, ctx: &egui::Context) {
        let (save, edit, cancel) = ctx.input(|i| {
            (
                i.modifiers.command && i.key_pressed(egui::Key::S),
                i.modifiers.command && i.key_pressed(egui::Key::E),
                i.key_pressed(egui::Key::Escape),
            )
        });

        if save {
            self.save(ctx);
        }
        if edit {
            self.begin_edit();
        }
        if cancel && !self.snapshot_dialog.visible {
            self.cancel_edit();
        }
    }
}

/// User-facing text for a failed sync operation
fn describe_error(action: &str, error: &SyncError) -> String {
    match error {
        SyncError::Configuration(reason) => format!("{action}: sync is not configured ({reason})"),
        SyncError::Network(_) => format!("{action}: could not reach the server"),
        e if e.is_conflict() => {
            format!("{action}: the portfolio changed remotely, try again")
        }
        e => format!("{action}: {e}"),
    }
}

impl eframe::App for PortfolioApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_sync(ctx);
        self.handle_shortcuts(ctx);

        egui::TopBottomPanel::top("header").show(ctx, |ui| {
            ui.add_space(4.0);
            HeaderPanel::show(ui, self);
            ui.add_space(4.0);
        });

        egui::TopBottomPanel::bottom("actions").show(ctx, |ui| {
            ui.add_space(4.0);
            ActionBar::show(ui, self);
            ui.add_space(4.0);
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            PortfolioPanel::show(ui, self);
        });

        if let Some(snapshot_id) = self.snapshot_dialog.show(ctx) {
            self.open_snapshot(ctx, snapshot_id);
        }
    }
}
