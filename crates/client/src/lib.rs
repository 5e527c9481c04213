//! `crosscheck-client` — HTTP client for the spreadsheet service.
//!
//! Blocking reqwest client (no Tokio runtime required). Covers the file
//! listing, the paired column-metadata fetch and the reconciliation job
//! submission, plus on-disk session credentials.

pub mod auth;
pub mod client;

pub use auth::{auth_file_path, delete_auth, load_auth, save_auth, SessionContext};
pub use client::{ApiClient, ApiError};
