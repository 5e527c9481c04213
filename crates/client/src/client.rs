//! Crosscheck service HTTP client.
//!
//! Blocking reqwest client (no Tokio runtime required). Covers listing
//! files, fetching per-sheet column metadata for both selected files, and
//! posting the assembled reconciliation job.

use std::thread;
use std::time::Duration;

use crosscheck_protocol::{
    FileDetailsResponse, FileEntry, FileListResponse, ReconcileRequest, ReconcileResponse,
};

use crate::auth::{load_auth, SessionContext};

/// Crosscheck API client (blocking).
#[derive(Clone)]
pub struct ApiClient {
    http: reqwest::blocking::Client,
    api_base: String,
    token: String,
}

/// Error type for service operations.
#[derive(Debug)]
pub enum ApiError {
    /// No session credentials configured
    NotAuthenticated,
    /// Network error
    Network(String),
    /// HTTP error with status code
    Http(u16, String),
    /// JSON parsing error
    Parse(String),
    /// Server returned a validation error (4xx with message)
    Validation(String),
}

impl std::fmt::Display for ApiError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ApiError::NotAuthenticated => {
                write!(f, "Not authenticated — run `xcheck login` first")
            }
            ApiError::Network(msg) => write!(f, "Network error: {}", msg),
            ApiError::Http(code, msg) => write!(f, "HTTP {}: {}", code, msg),
            ApiError::Parse(msg) => write!(f, "Parse error: {}", msg),
            ApiError::Validation(msg) => write!(f, "{}", msg),
        }
    }
}

impl std::error::Error for ApiError {}

impl ApiClient {
    /// Create a new client using the saved session.
    pub fn from_saved_auth() -> Result<Self, ApiError> {
        let session = load_auth().ok_or(ApiError::NotAuthenticated)?;
        Ok(Self::new(session))
    }

    /// Create a new client with an explicit session.
    pub fn new(session: SessionContext) -> Self {
        let http = reqwest::blocking::Client::builder()
            .user_agent(format!("xcheck/{}", env!("CARGO_PKG_VERSION")))
            .timeout(Duration::from_secs(60))
            .build()
            .expect("Failed to create HTTP client");

        Self { http, api_base: session.api_base, token: session.token }
    }

    /// List the account's uploaded files.
    pub fn list_files(&self) -> Result<Vec<FileEntry>, ApiError> {
        let url = format!("{}/api/files", self.api_base);
        let resp = self.get(&url)?;
        let listing: FileListResponse =
            resp.json().map_err(|e| ApiError::Parse(e.to_string()))?;
        Ok(listing.files)
    }

    /// Cheap token check: the listing endpoint rejects bad credentials.
    pub fn verify_session(&self) -> Result<(), ApiError> {
        self.list_files().map(|_| ())
    }

    /// Fetch one file's per-sheet column metadata.
    pub fn get_file_details(&self, file_name: &str) -> Result<FileDetailsResponse, ApiError> {
        let url = format!("{}/api/files/{}/details", self.api_base, file_name);
        let resp = self.get(&url)?;
        resp.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    /// Fetch both selected files' metadata concurrently. Fails as a whole
    /// when either request fails — callers never see a half-applied pair.
    pub fn get_details_pair(
        &self,
        file1: &str,
        file2: &str,
    ) -> Result<(FileDetailsResponse, FileDetailsResponse), ApiError> {
        thread::scope(|scope| {
            let first = scope.spawn(|| self.get_file_details(file1));
            let second = scope.spawn(|| self.get_file_details(file2));
            let first = join_fetch(first)?;
            let second = join_fetch(second)?;
            Ok((first, second))
        })
    }

    /// Submit the reconciliation job. One request per submit click; no
    /// retries — a failure leaves the wizard state intact for a resubmit.
    pub fn submit_reconciliation(
        &self,
        request: &ReconcileRequest,
    ) -> Result<ReconcileResponse, ApiError> {
        let url = format!("{}/api/reconcile", self.api_base);
        let body = serde_json::to_value(request).map_err(|e| ApiError::Parse(e.to_string()))?;
        let resp = self.post_json(&url, &body)?;
        resp.json().map_err(|e| ApiError::Parse(e.to_string()))
    }

    // ── Internal helpers ────────────────────────────────────────────

    fn get(&self, url: &str) -> Result<reqwest::blocking::Response, ApiError> {
        let response = self
            .http
            .get(url)
            .bearer_auth(&self.token)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        check_status(response)
    }

    fn post_json(
        &self,
        url: &str,
        body: &serde_json::Value,
    ) -> Result<reqwest::blocking::Response, ApiError> {
        let response = self
            .http
            .post(url)
            .bearer_auth(&self.token)
            .json(body)
            .send()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        check_status(response)
    }
}

fn check_status(
    response: reqwest::blocking::Response,
) -> Result<reqwest::blocking::Response, ApiError> {
    let status = response.status().as_u16();
    if !response.status().is_success() {
        let body = response.text().unwrap_or_default();
        if status == 422 || status == 400 {
            return Err(ApiError::Validation(body));
        }
        return Err(ApiError::Http(status, body));
    }
    Ok(response)
}

fn join_fetch(
    handle: thread::ScopedJoinHandle<'_, Result<FileDetailsResponse, ApiError>>,
) -> Result<FileDetailsResponse, ApiError> {
    handle
        .join()
        .unwrap_or_else(|_| Err(ApiError::Network("metadata fetch worker panicked".into())))
}
