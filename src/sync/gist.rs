//! GitHub gist backend.
//!
//! Uses the gists REST API: `GET /gists/{id}` to fetch, `PATCH /gists/{id}`
//! to update, `POST /gists` to create. The envelope is stored as a single
//! file in a secret gist.

use std::collections::HashMap;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use super::remote::{CreatedDocument, Owner, RemoteDocument, RemoteStore, RemoteTarget};
use super::types::{SyncError, SyncResult};

/// Public GitHub API endpoint.
pub const DEFAULT_API_URL: &str = "https://api.github.com";

const USER_AGENT: &str = concat!("daybook/", env!("CARGO_PKG_VERSION"));
const GIST_DESCRIPTION: &str = "Daybook backup";

/// Gist-backed [`RemoteStore`].
pub struct GistStore {
    client: reqwest::Client,
    base_url: String,
}

impl GistStore {
    /// Create a client against `base_url` with a per-request timeout.
    ///
    /// # Errors
    ///
    /// Returns [`SyncError::RemoteUnavailable`] if the HTTP client cannot be built.
    pub fn new(base_url: &str, timeout: Duration) -> SyncResult<Self> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(timeout)
            .build()
            .map_err(|e| SyncError::RemoteUnavailable(format!("HTTP client: {e}")))?;
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn request(&self, method: reqwest::Method, path: &str, token: &str) -> reqwest::RequestBuilder {
        self.client
            .request(method, format!("{}{path}", self.base_url))
            .header(reqwest::header::AUTHORIZATION, format!("token {token}"))
            .header(reqwest::header::ACCEPT, "application/vnd.github+json")
    }

    async fn fetch_raw(&self, url: &str, token: &str) -> SyncResult<String> {
        let response = self
            .client
            .get(url)
            .header(reqwest::header::AUTHORIZATION, format!("token {token}"))
            .send()
            .await
            .map_err(unavailable)?;
        check(response, "fetch raw gist file").await?.text().await.map_err(unavailable)
    }
}

// ── Wire types ────────────────────────────────────────────────

#[derive(Debug, Deserialize)]
struct GistResponse {
    #[serde(default)]
    files: HashMap<String, GistFile>,
    owner: Option<GistOwner>,
}

#[derive(Debug, Deserialize)]
struct GistFile {
    content: Option<String>,
    #[serde(default)]
    truncated: bool,
    raw_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct GistOwner {
    login: Option<String>,
    avatar_url: Option<String>,
}

#[derive(Debug, Deserialize)]
struct CreateResponse {
    id: String,
    #[serde(default)]
    html_url: String,
}

#[derive(Debug, Serialize)]
struct FileContent<'a> {
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct UpdateRequest<'a> {
    files: HashMap<&'a str, FileContent<'a>>,
}

#[derive(Debug, Serialize)]
struct CreateRequest<'a> {
    description: &'a str,
    public: bool,
    files: HashMap<&'a str, FileContent<'a>>,
}

fn files<'a>(filename: &'a str, content: &'a str) -> HashMap<&'a str, FileContent<'a>> {
    HashMap::from([(filename, FileContent { content })])
}

fn unavailable(e: reqwest::Error) -> SyncError {
    if e.is_timeout() {
        SyncError::RemoteUnavailable("request timed out".into())
    } else {
        SyncError::RemoteUnavailable(e.to_string())
    }
}

/// Map non-success statuses to sync errors.
async fn check(response: reqwest::Response, what: &str) -> SyncResult<reqwest::Response> {
    let status = response.status();
    if status.is_success() {
        return Ok(response);
    }
    if status == reqwest::StatusCode::NOT_FOUND {
        return Err(SyncError::NoRemoteDocument);
    }
    let body = response.text().await.unwrap_or_default();
    if matches!(
        status,
        reqwest::StatusCode::UNAUTHORIZED | reqwest::StatusCode::FORBIDDEN
    ) {
        return Err(SyncError::Unauthorized(format!("Failed to {what}: {status} {body}")));
    }
    Err(SyncError::RemoteUnavailable(format!("Failed to {what}: {status} {body}")))
}

impl RemoteStore for GistStore {
    fn name(&self) -> &str {
        "gist"
    }

    async fn fetch(&self, target: &RemoteTarget) -> SyncResult<RemoteDocument> {
        if !target.has_document() {
            return Err(SyncError::NoRemoteDocument);
        }
        let path = format!("/gists/{}", target.document_id);
        let response = self
            .request(reqwest::Method::GET, &path, &target.token)
            .send()
            .await
            .map_err(unavailable)?;
        let gist: GistResponse = check(response, "fetch gist")
            .await?
            .json()
            .await
            .map_err(unavailable)?;

        let content = match gist.files.get(&target.filename) {
            Some(GistFile {
                truncated: true,
                raw_url: Some(raw),
                ..
            }) => Some(self.fetch_raw(raw, &target.token).await?),
            Some(file) => file.content.clone(),
            None => None,
        };
        debug!(
            gist = %target.document_id,
            bytes = content.as_ref().map_or(0, String::len),
            "Fetched gist"
        );

        Ok(RemoteDocument {
            content,
            owner: gist.owner.map(|o| Owner {
                login: o.login,
                avatar_url: o.avatar_url,
            }),
        })
    }

    async fn update(&self, target: &RemoteTarget, content: &str) -> SyncResult<()> {
        let path = format!("/gists/{}", target.document_id);
        let body = UpdateRequest {
            files: files(&target.filename, content),
        };
        let response = self
            .request(reqwest::Method::PATCH, &path, &target.token)
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;
        check(response, "update gist").await?;
        debug!(gist = %target.document_id, bytes = content.len(), "Updated gist");
        Ok(())
    }

    async fn create(&self, target: &RemoteTarget, content: &str) -> SyncResult<CreatedDocument> {
        let body = CreateRequest {
            description: GIST_DESCRIPTION,
            public: false,
            files: files(&target.filename, content),
        };
        let response = self
            .request(reqwest::Method::POST, "/gists", &target.token)
            .json(&body)
            .send()
            .await
            .map_err(unavailable)?;
        let created: CreateResponse = check(response, "create gist")
            .await?
            .json()
            .await
            .map_err(unavailable)?;
        debug!(gist = %created.id, "Created gist");
        Ok(CreatedDocument {
            id: created.id,
            url: created.html_url,
        })
    }
}
