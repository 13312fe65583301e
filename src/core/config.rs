//! Application configuration management

use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

/// Environment variable holding the GitHub access token
pub const TOKEN_VAR: &str = "GITHUB_TOKEN";
/// Environment variable overriding the base URL of share links
pub const APP_URL_VAR: &str = "FOLIO_APP_URL";

/// Application configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Remote store settings
    pub remote: RemoteConfig,
    /// Share link settings
    pub share: ShareConfig,
    /// UI settings
    pub ui: UiConfig,
    /// GitHub token; only ever taken from the environment
    #[serde(skip)]
    pub github_token: Option<String>,
    /// `share.base_url` as read from the file, kept while an environment
    /// override is in effect so the override is never written back
    #[serde(skip)]
    file_base_url: Option<String>,
}

/// Where snapshots are stored on GitHub
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct RemoteConfig {
    /// Repository owner
    pub owner: String,
    /// Repository name
    pub repo: String,
    /// Branch commits are written to
    pub branch: String,
    /// Snapshot id; the file is stored as `<snapshot_id>.json`
    pub snapshot_id: String,
    /// REST API base URL
    pub api_base: String,
    /// Base URL serving raw file contents
    pub raw_base: String,
    /// Commit message used for every save
    pub commit_message: String,
    /// Committer and author name
    pub committer_name: String,
    /// Committer and author email
    pub committer_email: String,
    /// Per-request timeout in seconds
    pub timeout_secs: u64,
}

/// Share link settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ShareConfig {
    /// Base URL share links are composed from
    pub base_url: String,
}

/// UI settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct UiConfig {
    /// Theme (light/dark)
    pub theme: String,
    /// Last shared snapshot id that was opened
    pub last_snapshot: Option<String>,
}

impl Default for RemoteConfig {
    fn default() -> Self {
        Self {
            owner: String::new(),
            repo: String::new(),
            branch: "main".to_string(),
            snapshot_id: "portfolio".to_string(),
            api_base: "https://api.github.com".to_string(),
            raw_base: "https://raw.githubusercontent.com".to_string(),
            commit_message: "Update portfolio".to_string(),
            committer_name: "Folio".to_string(),
            committer_email: "folio@users.noreply.github.com".to_string(),
            timeout_secs: 30,
        }
    }
}

impl Default for ShareConfig {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:3000".to_string(),
        }
    }
}

impl Default for UiConfig {
    fn default() -> Self {
        Self {
            theme: "dark".to_string(),
            last_snapshot: None,
        }
    }
}

impl RemoteConfig {
    /// Path of the snapshot file inside the repository
    pub fn file_path(&self) -> String {
        format!("{}.json", self.snapshot_id)
    }
}

impl AppConfig {
    /// Get the config file path
    fn config_path() -> Option<PathBuf> {
        ProjectDirs::from("com", "folio", "Folio").map(|dirs| dirs.config_dir().join("config.json"))
    }

    /// Load configuration from disk and apply environment overrides
    pub fn load() -> Result<Self> {
        let path = Self::config_path().context("Could not determine config directory")?;
        let mut config = Self::load_from(&path)?;
        config.apply_overrides(|key| std::env::var(key).ok());
        Ok(config)
    }

    /// Load configuration from a specific file, defaulting when it is absent
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        let config: Self = serde_json::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;
        Ok(config)
    }

    /// Save configuration to disk
    pub fn save(&self) -> Result<()> {
        let path = Self::config_path().context("Could not determine config directory")?;
        self.save_to(&path)
    }

    /// Save configuration to a specific file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        // Ensure config directory exists
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let mut on_disk = self.clone();
        if let Some(base_url) = &self.file_base_url {
            on_disk.share.base_url = base_url.clone();
        }
        let content = serde_json::to_string_pretty(&on_disk)?;
        std::fs::write(path, content)?;

        tracing::info!("Saved config to: {}", path.display());
        Ok(())
    }

    /// Apply overrides from an environment-like lookup
    pub fn apply_overrides(&mut self, lookup: impl Fn(&str) -> Option<String>) {
        if let Some(token) = lookup(TOKEN_VAR).filter(|t| !t.trim().is_empty()) {
            self.github_token = Some(token.trim().to_string());
        }
        if let Some(url) = lookup(APP_URL_VAR).filter(|u| !u.trim().is_empty()) {
            let from_file = std::mem::replace(
                &mut self.share.base_url,
                url.trim().trim_end_matches('/').to_string(),
            );
            self.file_base_url.get_or_insert(from_file);
        }
    }

    /// Remember the last opened shared snapshot
    pub fn set_last_snapshot(&mut self, snapshot_id: &str) {
        self.ui.last_snapshot = Some(snapshot_id.to_string());
    }
}
