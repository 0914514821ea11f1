//! Summarization backend API

mod client;
mod types;

pub use client::ApiClient;
pub use types::{SelectedFile, SummaryResponse, UploadResponse, UploadedIds};
