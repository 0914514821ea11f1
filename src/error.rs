//! Error types for the PDF summary client

use thiserror::Error;

/// Result type alias for the PDF summary client
pub type Result<T> = std::result::Result<T, Error>;

/// Error types for the PDF summary client
#[derive(Error, Debug)]
pub enum Error {
    /// Upload attempted without a selected file
    #[error("No file selected")]
    NoFileSelected,

    /// Selected file does not exist on disk
    #[error("File not found: {path}")]
    FileNotFound { path: String },

    /// Backend answered with `success: false`
    #[error("Request rejected: {message}")]
    Rejected { message: String },

    /// Backend answered with a body that does not match the contract
    #[error("Invalid response: {reason}")]
    InvalidResponse { reason: String },

    /// Downloaded document is not a PDF
    #[error("Invalid PDF: {reason}")]
    InvalidPdf { reason: String },

    /// Download too large
    #[error("Download too large: {size} bytes (max: {max_size} bytes)")]
    DownloadTooLarge { size: u64, max_size: u64 },

    /// Invalid configuration value
    #[error("Invalid configuration for {key}: {reason}")]
    Config { key: String, reason: String },

    /// Base URL cannot carry path segments
    #[error("Invalid base URL: {url}")]
    InvalidBaseUrl { url: String },

    /// Failed to hand a URL to the browser
    #[error("Failed to open {url}: {reason}")]
    Open { url: String, reason: String },

    /// URL parse error
    #[error("Invalid URL: {0}")]
    Url(#[from] url::ParseError),

    /// HTTP request error
    #[error("HTTP request failed: {0}")]
    HttpRequest(#[from] reqwest::Error),

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),
}

impl Error {
    /// Local validation failures, raised before any request is sent.
    pub fn is_validation(&self) -> bool {
        matches!(self, Error::NoFileSelected | Error::FileNotFound { .. })
    }

    /// Return a sanitized error message safe to send to clients.
    /// Backend-provided messages are passed through verbatim; transport and
    /// local details are omitted and should be logged via tracing instead.
    pub fn client_message(&self) -> String {
        match self {
            Error::NoFileSelected => "Please select a PDF file.".to_string(),
            Error::FileNotFound { path } => format!("File not found: {}", path),
            Error::Rejected { message } => message.clone(),
            Error::InvalidResponse { .. } => "Unexpected response from server".to_string(),
            Error::InvalidPdf { .. } => "Downloaded file is not a PDF".to_string(),
            Error::DownloadTooLarge { max_size, .. } => {
                format!("Download exceeds maximum size of {} bytes", max_size)
            }
            Error::Config { key, .. } => format!("Invalid configuration for {}", key),
            Error::InvalidBaseUrl { .. } | Error::Url(_) => "Invalid server URL".to_string(),
            Error::Open { .. } => "Failed to open document".to_string(),
            Error::HttpRequest(_) => "HTTP request failed".to_string(),
            Error::Io(_) => "I/O error".to_string(),
            Error::Serialization(_) => "Serialization error".to_string(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validation_kinds() {
        assert!(Error::NoFileSelected.is_validation());
        assert!(Error::FileNotFound {
            path: "/tmp/x.pdf".to_string()
        }
        .is_validation());
        assert!(!Error::Rejected {
            message: "bad format".to_string()
        }
        .is_validation());
    }

    #[test]
    fn test_rejected_message_is_verbatim() {
        let err = Error::Rejected {
            message: "bad format".to_string(),
        };
        assert_eq!(err.client_message(), "bad format");
    }

    #[test]
    fn test_client_message_hides_details() {
        let err = Error::InvalidResponse {
            reason: "missing field `success` at line 1".to_string(),
        };
        assert!(!err.client_message().contains("line 1"));

        let err = Error::Io(std::io::Error::new(
            std::io::ErrorKind::PermissionDenied,
            "/secret/path",
        ));
        assert_eq!(err.client_message(), "I/O error");
    }
}
