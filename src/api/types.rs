//! Wire types exchanged with the summarization backend

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Body of `POST /upload_pdf`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct UploadResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pdf_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub original_filename: Option<String>,
}

/// Identifiers assigned to one successful upload
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadedIds {
    pub document_id: String,
    pub summary_id: String,
}

impl UploadResponse {
    /// Both identifiers, when the response carries non-empty values for them
    pub fn ids(&self) -> Option<UploadedIds> {
        let document_id = self.pdf_id.as_deref().filter(|id| !id.is_empty())?;
        let summary_id = self.summary_id.as_deref().filter(|id| !id.is_empty())?;
        Some(UploadedIds {
            document_id: document_id.to_string(),
            summary_id: summary_id.to_string(),
        })
    }
}

/// Body of `GET /get_summary/{id}`
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SummaryResponse {
    pub success: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub summary: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Error body returned by the backend on non-JSON endpoints (e.g. `view_pdf`)
#[derive(Debug, Deserialize)]
pub(crate) struct ErrorBody {
    #[serde(default)]
    pub message: Option<String>,
}

/// A user-selected file, read into memory for upload
#[derive(Debug, Clone)]
pub struct SelectedFile {
    pub file_name: String,
    pub data: Vec<u8>,
}

impl SelectedFile {
    pub fn new(file_name: impl Into<String>, data: Vec<u8>) -> Self {
        Self {
            file_name: file_name.into(),
            data,
        }
    }

    /// Read a file from disk. Content is not inspected; the backend decides
    /// whether it accepts the file.
    pub fn from_path<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();

        if !path.is_file() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let data = std::fs::read(path)?;
        let file_name = path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_else(|| "upload.pdf".to_string());

        Ok(Self { file_name, data })
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }
}
