//! Upload-and-summary session
//!
//! A `Session` is the state of one page: the identifiers returned by the most
//! recent successful upload, the upload state, and what the page currently
//! shows (`PageView`). Every operation takes the session explicitly; nothing
//! is kept in globals, and a reload is `Session::reset`.

use crate::api::{ApiClient, SelectedFile, UploadedIds};
use crate::document::{DocumentCache, DocumentOpener};
use crate::error::{Error, Result};
use serde::Serialize;
use std::path::{Path, PathBuf};
use url::Url;

pub const MSG_SELECT_FILE: &str = "Please select a PDF file.";
pub const MSG_UPLOADING: &str = "Uploading...";
pub const MSG_UPLOAD_OK: &str = "PDF uploaded successfully!";
pub const MSG_UPLOAD_FAILED: &str = "Error uploading file.";
pub const MSG_SUMMARY_FAILED: &str = "Error retrieving summary.";
pub const MSG_DOCUMENT_FAILED: &str = "Error retrieving document.";

/// Progress of the most recent upload
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum UploadState {
    #[default]
    Idle,
    Uploading,
    Ready,
    Failed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StatusKind {
    Info,
    Success,
    Error,
}

/// Text shown in the status region
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StatusLine {
    pub kind: StatusKind,
    pub text: String,
}

/// What the page currently displays
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct PageView {
    pub status: Option<StatusLine>,
    pub view_document_visible: bool,
    pub view_summary_visible: bool,
    pub download_summary_visible: bool,
    pub summary_visible: bool,
    pub summary_content: String,
}

impl PageView {
    /// Current status text, if any
    pub fn status_text(&self) -> Option<&str> {
        self.status.as_ref().map(|s| s.text.as_str())
    }
}

/// Location of the current document and whether a browser was handed it
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DocumentLink {
    pub url: Url,
    pub opened: bool,
}

/// A file written by one of the download operations
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct SavedFile {
    pub path: PathBuf,
    pub bytes: u64,
    pub from_cache: bool,
}

#[derive(Debug, Default)]
pub struct Session {
    document_id: Option<String>,
    summary_id: Option<String>,
    upload_state: UploadState,
    view: PageView,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document_id(&self) -> Option<&str> {
        self.document_id.as_deref()
    }

    pub fn summary_id(&self) -> Option<&str> {
        self.summary_id.as_deref()
    }

    pub fn upload_state(&self) -> UploadState {
        self.upload_state
    }

    pub fn view(&self) -> &PageView {
        &self.view
    }

    /// Forget everything, as a page reload does
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    fn set_status(&mut self, kind: StatusKind, text: impl Into<String>) {
        self.view.status = Some(StatusLine {
            kind,
            text: text.into(),
        });
    }

    /// Upload a file and remember the identifiers the backend assigns.
    ///
    /// Without a file nothing is sent and the status asks for one. A failed
    /// upload keeps the identifiers of the previous successful upload.
    pub async fn submit_upload(
        &mut self,
        api: &ApiClient,
        file: Option<SelectedFile>,
    ) -> Result<UploadedIds> {
        let Some(file) = file else {
            self.set_status(StatusKind::Error, MSG_SELECT_FILE);
            return Err(Error::NoFileSelected);
        };

        self.upload_state = UploadState::Uploading;
        self.set_status(StatusKind::Info, MSG_UPLOADING);

        let outcome = match api.upload_pdf(&file).await {
            Ok(response) if response.success => match response.ids() {
                Some(ids) => Ok((ids, response.message)),
                None => Err(Error::InvalidResponse {
                    reason: "upload succeeded without pdf_id and summary_id".to_string(),
                }),
            },
            Ok(response) => Err(Error::Rejected {
                message: response
                    .message
                    .unwrap_or_else(|| MSG_UPLOAD_FAILED.to_string()),
            }),
            Err(e) => Err(e),
        };

        match outcome {
            Ok((ids, message)) => {
                tracing::info!(
                    file = %file.file_name,
                    document_id = %ids.document_id,
                    summary_id = %ids.summary_id,
                    "upload complete"
                );
                self.document_id = Some(ids.document_id.clone());
                self.summary_id = Some(ids.summary_id.clone());
                self.upload_state = UploadState::Ready;
                self.view.view_document_visible = true;
                self.view.view_summary_visible = true;
                self.view.download_summary_visible = true;
                self.set_status(
                    StatusKind::Success,
                    message.unwrap_or_else(|| MSG_UPLOAD_OK.to_string()),
                );
                Ok(ids)
            }
            Err(e) => {
                tracing::warn!(file = %file.file_name, error = %e, "upload failed");
                self.upload_state = UploadState::Failed;
                self.set_status(StatusKind::Error, request_error_text(&e, MSG_UPLOAD_FAILED));
                Err(e)
            }
        }
    }

    /// Read the file at `path` and upload it. A missing or empty path counts
    /// as no selection.
    pub async fn submit_upload_from_path(
        &mut self,
        api: &ApiClient,
        path: Option<&Path>,
    ) -> Result<UploadedIds> {
        let path = path.filter(|p| !p.as_os_str().is_empty());
        let file = match path.map(SelectedFile::from_path).transpose() {
            Ok(file) => file,
            Err(e) => {
                self.set_status(StatusKind::Error, e.client_message());
                return Err(e);
            }
        };
        self.submit_upload(api, file).await
    }

    /// Open the most recently uploaded document, or `None` when nothing has
    /// been uploaded yet.
    pub fn view_document(
        &self,
        api: &ApiClient,
        opener: &dyn DocumentOpener,
    ) -> Result<Option<DocumentLink>> {
        let Some(document_id) = self.document_id.as_deref() else {
            return Ok(None);
        };

        let url = api.document_url(document_id)?;
        let opened = opener.open(&url)?;
        tracing::debug!(url = %url, opened, "document link ready");
        Ok(Some(DocumentLink { url, opened }))
    }

    /// Fetch and show the most recent summary. `None` when there is no summary yet.
    pub async fn view_summary(&mut self, api: &ApiClient) -> Result<Option<String>> {
        let Some(summary_id) = self.summary_id.clone() else {
            return Ok(None);
        };

        let summary = self.fetch_summary(api, &summary_id).await?;
        self.view.summary_content = summary.clone();
        self.view.summary_visible = true;
        Ok(Some(summary))
    }

    /// Fetch the most recent summary and save it as UTF-8 text. A directory
    /// destination gets `summary_{id}.txt` inside it, with the id reduced to
    /// a single file-name component.
    pub async fn download_summary(
        &mut self,
        api: &ApiClient,
        dest: &Path,
    ) -> Result<Option<SavedFile>> {
        let Some(summary_id) = self.summary_id.clone() else {
            return Ok(None);
        };

        let summary = self.fetch_summary(api, &summary_id).await?;
        let path = resolve_destination(dest, &format!("summary_{}.txt", file_stem(&summary_id)));

        if let Err(e) = tokio::fs::write(&path, summary.as_bytes()).await {
            tracing::warn!(path = %path.display(), error = %e, "failed to save summary");
            self.set_status(StatusKind::Error, MSG_SUMMARY_FAILED);
            return Err(e.into());
        }

        self.set_status(
            StatusKind::Success,
            format!("Summary saved to {}", path.display()),
        );
        Ok(Some(SavedFile {
            path,
            bytes: summary.len() as u64,
            from_cache: false,
        }))
    }

    /// Download the most recent document, reusing cached bytes. A directory
    /// destination gets `{id}.pdf` inside it, named like `download_summary`.
    pub async fn download_document(
        &mut self,
        api: &ApiClient,
        cache: &DocumentCache,
        dest: &Path,
    ) -> Result<Option<SavedFile>> {
        let Some(document_id) = self.document_id.clone() else {
            return Ok(None);
        };

        let url = api.document_url(&document_id)?;
        let (data, from_cache) = match cache.lookup(&url) {
            Some(data) => (data, true),
            None => match api.fetch_document(&document_id).await {
                Ok(data) => {
                    cache.store(&url, data.clone());
                    (data, false)
                }
                Err(e) => {
                    tracing::warn!(document_id = %document_id, error = %e, "document download failed");
                    self.set_status(
                        StatusKind::Error,
                        request_error_text(&e, MSG_DOCUMENT_FAILED),
                    );
                    return Err(e);
                }
            },
        };

        let path = resolve_destination(dest, &format!("{}.pdf", file_stem(&document_id)));
        if let Err(e) = tokio::fs::write(&path, &data).await {
            self.set_status(StatusKind::Error, MSG_DOCUMENT_FAILED);
            return Err(e.into());
        }

        self.set_status(
            StatusKind::Success,
            format!("Document saved to {}", path.display()),
        );
        Ok(Some(SavedFile {
            path,
            bytes: data.len() as u64,
            from_cache,
        }))
    }

    async fn fetch_summary(&mut self, api: &ApiClient, summary_id: &str) -> Result<String> {
        let result = match api.get_summary(summary_id).await {
            Ok(response) if response.success => Ok(response.summary.unwrap_or_default()),
            Ok(response) => Err(Error::Rejected {
                message: response
                    .message
                    .unwrap_or_else(|| MSG_SUMMARY_FAILED.to_string()),
            }),
            Err(e) => Err(e),
        };

        if let Err(e) = &result {
            tracing::warn!(summary_id, error = %e, "summary request failed");
            self.set_status(StatusKind::Error, request_error_text(e, MSG_SUMMARY_FAILED));
        }
        result
    }
}

fn request_error_text(error: &Error, generic: &str) -> String {
    match error {
        Error::Rejected { message } => message.clone(),
        _ => generic.to_string(),
    }
}

/// Reduce a server-assigned identifier to one file-name component: path
/// separators, NUL and `..` become `_`.
fn file_stem(id: &str) -> String {
    let stem: String = id
        .chars()
        .map(|c| match c {
            '/' | '\\' | '\0' => '_',
            c => c,
        })
        .collect::<String>()
        .replace("..", "_");

    if stem.is_empty() || stem == "." {
        "document".to_string()
    } else {
        stem
    }
}

fn resolve_destination(dest: &Path, default_name: &str) -> PathBuf {
    if dest.is_dir() {
        dest.join(default_name)
    } else {
        dest.to_path_buf()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ClientConfig;
    use crate::document::DisabledOpener;
    use pretty_assertions::assert_eq;

    /// Client aimed at a port nobody listens on
    fn unreachable_client() -> ApiClient {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let port = listener.local_addr().unwrap().port();
        drop(listener);
        let config = ClientConfig::with_base_url(&format!("http://127.0.0.1:{}", port)).unwrap();
        ApiClient::new(&config).unwrap()
    }

    #[test]
    fn test_new_session_is_idle() {
        let session = Session::new();
        assert_eq!(session.upload_state(), UploadState::Idle);
        assert_eq!(session.document_id(), None);
        assert_eq!(session.summary_id(), None);
        assert_eq!(session.view(), &PageView::default());
    }

    #[tokio::test]
    async fn test_upload_without_file() {
        let api = unreachable_client();
        let mut session = Session::new();

        let result = session.submit_upload(&api, None).await;

        assert!(matches!(result, Err(Error::NoFileSelected)));
        assert_eq!(session.upload_state(), UploadState::Idle);
        assert_eq!(session.view().status_text(), Some(MSG_SELECT_FILE));
        assert_eq!(session.view().status.as_ref().unwrap().kind, StatusKind::Error);
    }

    #[tokio::test]
    async fn test_upload_from_empty_path_is_no_selection() {
        let api = unreachable_client();
        let mut session = Session::new();

        let result = session
            .submit_upload_from_path(&api, Some(Path::new("")))
            .await;

        assert!(matches!(result, Err(Error::NoFileSelected)));
        assert_eq!(session.view().status_text(), Some(MSG_SELECT_FILE));
    }

    #[tokio::test]
    async fn test_upload_from_missing_path() {
        let api = unreachable_client();
        let mut session = Session::new();

        let result = session
            .submit_upload_from_path(&api, Some(Path::new("/nonexistent/report.pdf")))
            .await;

        assert!(matches!(result, Err(Error::FileNotFound { .. })));
        assert_eq!(session.upload_state(), UploadState::Idle);
        assert_eq!(
            session.view().status_text(),
            Some("File not found: /nonexistent/report.pdf")
        );
    }

    #[tokio::test]
    async fn test_upload_network_failure_is_generic() {
        let api = unreachable_client();
        let mut session = Session::new();
        let file = SelectedFile::new("a.pdf", b"%PDF-1.4".to_vec());

        let result = session.submit_upload(&api, Some(file)).await;

        assert!(matches!(result, Err(Error::HttpRequest(_))));
        assert_eq!(session.upload_state(), UploadState::Failed);
        assert_eq!(session.view().status_text(), Some(MSG_UPLOAD_FAILED));
        assert!(!session.view().view_summary_visible);
    }

    #[tokio::test]
    async fn test_views_are_noops_before_upload() {
        let api = unreachable_client();
        let mut session = Session::new();

        assert_eq!(session.view_document(&api, &DisabledOpener).unwrap(), None);
        assert_eq!(session.view_summary(&api).await.unwrap(), None);

        let dir = tempfile::tempdir().unwrap();
        assert_eq!(session.download_summary(&api, dir.path()).await.unwrap(), None);
        let cache = DocumentCache::new(4, 1024);
        assert_eq!(
            session.download_document(&api, &cache, dir.path()).await.unwrap(),
            None
        );
        assert_eq!(session.view().status, None);
    }

    #[tokio::test]
    async fn test_summary_network_failure_keeps_session_usable() {
        let api = unreachable_client();
        let mut session = Session::new();
        session.summary_id = Some("B".to_string());
        session.view.summary_content = "earlier".to_string();
        session.view.summary_visible = true;

        let result = session.view_summary(&api).await;

        assert!(result.is_err());
        assert_eq!(session.view().status_text(), Some(MSG_SUMMARY_FAILED));
        assert_eq!(session.view().summary_content, "earlier");
        assert_eq!(session.summary_id(), Some("B"));
    }

    #[tokio::test]
    async fn test_cached_document_skips_network() {
        let api = unreachable_client();
        let cache = DocumentCache::new(4, 1024);
        cache.store(&api.document_url("A").unwrap(), b"%PDF-1.4 cached".to_vec());

        let mut session = Session::new();
        session.document_id = Some("A".to_string());

        let dir = tempfile::tempdir().unwrap();
        let saved = session
            .download_document(&api, &cache, dir.path())
            .await
            .unwrap()
            .unwrap();

        assert!(saved.from_cache);
        assert_eq!(saved.path, dir.path().join("A.pdf"));
        assert_eq!(std::fs::read(&saved.path).unwrap(), b"%PDF-1.4 cached");
    }

    #[test]
    fn test_reset_clears_everything() {
        let mut session = Session::new();
        session.document_id = Some("A".to_string());
        session.summary_id = Some("B".to_string());
        session.upload_state = UploadState::Ready;
        session.view.summary_visible = true;

        session.reset();

        assert_eq!(session.document_id(), None);
        assert_eq!(session.upload_state(), UploadState::Idle);
        assert!(!session.view().summary_visible);
    }

    #[test]
    fn test_file_stem_stays_one_component() {
        assert_eq!(file_stem("A"), "A");
        assert_eq!(file_stem("3f2a-9c"), "3f2a-9c");
        assert_eq!(file_stem("../escaped"), "__escaped");
        assert_eq!(file_stem("a/b\\c"), "a_b_c");
        assert_eq!(file_stem(".."), "_");
        assert_eq!(file_stem("."), "document");
        assert_eq!(file_stem(""), "document");
        assert_eq!(Path::new(&file_stem("../../etc/x")).components().count(), 1);
    }

    #[test]
    fn test_disabled_opener_reports_not_opened() {
        let api = unreachable_client();
        let mut session = Session::new();
        session.document_id = Some("A".to_string());

        let link = session.view_document(&api, &DisabledOpener).unwrap().unwrap();
        assert_eq!(link.url.path(), "/view_pdf/A");
        assert!(!link.opened);
    }

    #[test]
    fn test_resolve_destination() {
        let dir = tempfile::tempdir().unwrap();
        assert_eq!(
            resolve_destination(dir.path(), "summary_B.txt"),
            dir.path().join("summary_B.txt")
        );
        let file = dir.path().join("out.txt");
        assert_eq!(resolve_destination(&file, "summary_B.txt"), file);
    }
}
