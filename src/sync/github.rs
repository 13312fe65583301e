//! GitHub contents API backed snapshot store

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use base64::engine::general_purpose::STANDARD;
use base64::Engine as _;
use reqwest::header::{ACCEPT, USER_AGENT};
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

use super::remote::{FileWrite, Identity, RemoteState, RemoteStore};
use super::SyncError;
use crate::core::config::{RemoteConfig, TOKEN_VAR};

const API_VERSION: &str = "2022-11-28";
const MEDIA_TYPE: &str = "application/vnd.github+json";

/// Request body of `PUT /repos/{owner}/{repo}/contents/{path}`
#[derive(Debug, Serialize)]
struct PutContents<'a> {
    message: &'a str,
    content: String,
    branch: &'a str,
    #[serde(skip_serializing_if = "Option::is_none")]
    sha: Option<&'a str>,
    committer: &'a Identity,
    author: &'a Identity,
}

impl<'a> PutContents<'a> {
    fn from_write(write: &'a FileWrite) -> Self {
        Self {
            message: write.message(),
            content: STANDARD.encode(write.content().as_bytes()),
            branch: write.branch(),
            sha: write.sha(),
            committer: write.identity(),
            author: write.identity(),
        }
    }
}

/// The part of a contents response we care about
#[derive(Debug, Deserialize)]
struct ContentsEntry {
    sha: String,
}

pub struct GitHubStore {
    http: reqwest::Client,
    token: Option<String>,
    owner: String,
    repo: String,
    branch: String,
    api_base: String,
    raw_base: String,
}

impl fmt::Debug for GitHubStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GitHubStore")
            .field("owner", &self.owner)
            .field("repo", &self.repo)
            .field("branch", &self.branch)
            .field("token", &self.token.as_ref().map(|_| "<redacted>"))
            .finish()
    }
}

impl GitHubStore {
    /// Build a store; a missing token only fails the calls that need it
    pub fn new(config: &RemoteConfig, token: Option<String>) -> Result<Self, SyncError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs.max(1)))
            .build()
            .map_err(|e| SyncError::Configuration(format!("http client: {e}")))?;

        Ok(Self {
            http,
            token,
            owner: config.owner.clone(),
            repo: config.repo.clone(),
            branch: config.branch.clone(),
            api_base: config.api_base.trim_end_matches('/').to_string(),
            raw_base: config.raw_base.trim_end_matches('/').to_string(),
        })
    }

    fn token(&self) -> Result<&str, SyncError> {
        self.token.as_deref().ok_or_else(|| {
            SyncError::Configuration(format!("GitHub token is not configured (set {TOKEN_VAR})"))
        })
    }

    fn ensure_repository(&self) -> Result<(), SyncError> {
        if self.owner.is_empty() || self.repo.is_empty() {
            return Err(SyncError::Configuration(
                "remote.owner and remote.repo must be set".to_string(),
            ));
        }
        Ok(())
    }

    fn contents_url(&self, path: &str) -> String {
        format!(
            "{}/repos/{}/{}/contents/{}",
            self.api_base,
            self.owner,
            self.repo,
            path.trim_start_matches('/')
        )
    }

    fn raw_url(&self, snapshot_id: &str) -> String {
        format!(
            "{}/{}/{}/{}/{}.json",
            self.raw_base, self.owner, self.repo, self.branch, snapshot_id
        )
    }

    fn api_request(
        &self,
        method: reqwest::Method,
        url: &str,
    ) -> Result<reqwest::RequestBuilder, SyncError> {
        let token = self.token()?;
        Ok(self
            .http
            .request(method, url)
            .bearer_auth(token)
            .header(ACCEPT, MEDIA_TYPE)
            .header("X-GitHub-Api-Version", API_VERSION)
            .header(USER_AGENT, user_agent()))
    }
}

fn user_agent() -> String {
    format!("folio/{}", env!("CARGO_PKG_VERSION"))
}

fn network(e: reqwest::Error) -> SyncError {
    SyncError::Network(e.to_string())
}

#[async_trait]
impl RemoteStore for GitHubStore {
    async fn lookup(&self, path: &str) -> Result<RemoteState, SyncError> {
        self.ensure_repository()?;
        let url = self.contents_url(path);
        let response = self
            .api_request(reqwest::Method::GET, &url)?
            .query(&[("ref", self.branch.as_str())])
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            tracing::debug!(%status, "No remote file at {}, will create it", path);
            return Ok(RemoteState::absent());
        }

        let body = response.text().await.map_err(network)?;
        let entry: ContentsEntry =
            serde_json::from_str(&body).map_err(|e| SyncError::RemoteRejection {
                status: status.as_u16(),
                body: format!("unexpected contents response: {e}"),
            })?;
        Ok(RemoteState::present(entry.sha))
    }

    async fn put(&self, write: &FileWrite) -> Result<(), SyncError> {
        self.ensure_repository()?;
        let url = self.contents_url(write.path());
        let body = PutContents::from_write(write);
        tracing::debug!(
            path = write.path(),
            create = write.is_create(),
            "Writing snapshot to GitHub"
        );

        let response = self
            .api_request(reqwest::Method::PUT, &url)?
            .json(&body)
            .send()
            .await
            .map_err(network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::RemoteRejection {
                status: status.as_u16(),
                body,
            });
        }
        Ok(())
    }

    async fn fetch_raw(&self, snapshot_id: &str) -> Result<String, SyncError> {
        self.ensure_repository()?;
        let mut request = self
            .http
            .get(self.raw_url(snapshot_id))
            .header(USER_AGENT, user_agent());
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await.map_err(network)?;
        let status = response.status();
        if status == StatusCode::NOT_FOUND {
            return Err(SyncError::NotFound(snapshot_id.to_string()));
        }
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(SyncError::RemoteRejection {
                status: status.as_u16(),
                body,
            });
        }
        response.text().await.map_err(network)
    }
}
