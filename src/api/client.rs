//! HTTP client for the summarization backend

use crate::api::types::{ErrorBody, SelectedFile, SummaryResponse, UploadResponse};
use crate::config::ClientConfig;
use crate::error::{Error, Result};
use futures_util::StreamExt;
use reqwest::multipart::{Form, Part};
use serde::de::DeserializeOwned;
use url::Url;

const UPLOAD_PATH: &str = "upload_pdf";
const SUMMARY_PATH: &str = "get_summary";
const DOCUMENT_PATH: &str = "view_pdf";

/// Client for the upload / summary / document endpoints
#[derive(Debug, Clone)]
pub struct ApiClient {
    http: reqwest::Client,
    base_url: Url,
    max_download_bytes: u64,
}

impl ApiClient {
    pub fn new(config: &ClientConfig) -> Result<Self> {
        let http = reqwest::Client::builder()
            .timeout(config.request_timeout)
            .build()
            .map_err(Error::HttpRequest)?;

        let mut base_url = config.base_url.clone();
        base_url.set_query(None);
        base_url.set_fragment(None);

        Ok(Self {
            http,
            base_url,
            max_download_bytes: config.max_download_bytes,
        })
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    /// Append percent-encoded path segments to the base URL.
    /// A base path prefix is kept; a trailing slash on the base is tolerated.
    pub fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.base_url.clone();
        {
            let mut path = url.path_segments_mut().map_err(|_| Error::InvalidBaseUrl {
                url: self.base_url.to_string(),
            })?;
            path.pop_if_empty().extend(segments);
        }
        Ok(url)
    }

    /// Location of the original document for `document_id`
    pub fn document_url(&self, document_id: &str) -> Result<Url> {
        self.endpoint(&[DOCUMENT_PATH, document_id])
    }

    /// Location of the generated summary for `summary_id`
    pub fn summary_url(&self, summary_id: &str) -> Result<Url> {
        self.endpoint(&[SUMMARY_PATH, summary_id])
    }

    /// Submit a file as multipart field `file`
    pub async fn upload_pdf(&self, file: &SelectedFile) -> Result<UploadResponse> {
        let url = self.endpoint(&[UPLOAD_PATH])?;
        tracing::debug!(url = %url, file = %file.file_name, bytes = file.len(), "uploading file");

        let part = Part::bytes(file.data.clone())
            .file_name(file.file_name.clone())
            .mime_str("application/pdf")?;
        let form = Form::new().part("file", part);

        let response = self.http.post(url).multipart(form).send().await?;
        decode_json(response).await
    }

    /// Fetch the summary text for `summary_id`
    pub async fn get_summary(&self, summary_id: &str) -> Result<SummaryResponse> {
        let url = self.summary_url(summary_id)?;
        tracing::debug!(url = %url, "fetching summary");

        let response = self.http.get(url).send().await?;
        decode_json(response).await
    }

    /// Download the original document with a size limit
    pub async fn fetch_document(&self, document_id: &str) -> Result<Vec<u8>> {
        let url = self.document_url(document_id)?;
        tracing::debug!(url = %url, "downloading document");

        let response = self.http.get(url).send().await?;
        let status = response.status();

        if !status.is_success() {
            let body = response.bytes().await?;
            return Err(match serde_json::from_slice::<ErrorBody>(&body) {
                Ok(ErrorBody {
                    message: Some(message),
                }) => Error::Rejected { message },
                _ => Error::InvalidResponse {
                    reason: format!("HTTP request failed with status: {}", status),
                },
            });
        }

        // Check Content-Length header for early rejection
        if let Some(content_length) = response.content_length() {
            if content_length > self.max_download_bytes {
                return Err(Error::DownloadTooLarge {
                    size: content_length,
                    max_size: self.max_download_bytes,
                });
            }
        }

        let mut data = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(Error::HttpRequest)?;
            data.extend_from_slice(&chunk);
            if data.len() as u64 > self.max_download_bytes {
                return Err(Error::DownloadTooLarge {
                    size: data.len() as u64,
                    max_size: self.max_download_bytes,
                });
            }
        }

        if !data.starts_with(b"%PDF") {
            return Err(Error::InvalidPdf {
                reason: "Downloaded data is not a valid PDF file".to_string(),
            });
        }

        Ok(data)
    }

    /// Fetch the backend's status banner from its root path
    pub async fn health(&self) -> Result<String> {
        let url = self.endpoint(&[])?;
        let response = self.http.get(url).send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(Error::InvalidResponse {
                reason: format!("HTTP request failed with status: {}", status),
            });
        }
        Ok(response.text().await?)
    }
}

/// Decode a JSON body regardless of HTTP status; the backend reports
/// failures as `{success: false, message}` with 4xx/5xx codes.
async fn decode_json<T: DeserializeOwned>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    let body = response.bytes().await?;
    serde_json::from_slice(&body).map_err(|e| Error::InvalidResponse {
        reason: format!("HTTP {}: {}", status, e),
    })
}
