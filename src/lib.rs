//! PDF Summary Client Library
//!
//! Client for a PDF summarization service, exposed as MCP tools:
//! - `upload_pdf`: Upload a PDF and remember the returned identifiers
//! - `view_summary`: Fetch the summary of the most recent upload
//! - `view_document`: Open the most recently uploaded PDF
//! - `download_summary` / `download_document`: Save either to disk

pub mod api;
pub mod config;
pub mod document;
pub mod error;
pub mod server;
pub mod session;

pub use api::{ApiClient, SelectedFile, SummaryResponse, UploadResponse, UploadedIds};
pub use config::ClientConfig;
pub use error::{Error, Result};
pub use server::{run_server, run_server_with_config, SummaryServer};
pub use session::{DocumentLink, PageView, SavedFile, Session, StatusKind, StatusLine, UploadState};
