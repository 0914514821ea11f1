//! MCP server exposing the upload-and-summary session as tools

use crate::api::ApiClient;
use crate::config::ClientConfig;
use crate::document::{DisabledOpener, DocumentCache, DocumentOpener, SystemBrowser};
use crate::session::{PageView, SavedFile, Session, UploadState};
use anyhow::Result;
use rmcp::{
    handler::server::tool::ToolRouter, handler::server::wrapper::Parameters, model::*,
    schemars::JsonSchema, tool, tool_handler, tool_router, ServerHandler, ServiceExt,
};
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;
use tokio::sync::Mutex;

/// PDF summary MCP server
///
/// Holds a single session; every tool call locks it for its whole duration,
/// so overlapping calls are applied one after another.
#[derive(Clone)]
pub struct SummaryServer {
    session: Arc<Mutex<Session>>,
    api: ApiClient,
    cache: Arc<DocumentCache>,
    opener: Arc<dyn DocumentOpener>,
    tool_router: ToolRouter<Self>,
}

// ============================================================================
// Request/Response types
// ============================================================================

#[derive(Debug, Default, Deserialize, JsonSchema)]
pub struct UploadPdfParams {
    /// Path to the PDF file to upload
    #[serde(default)]
    pub path: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct UploadPdfResult {
    pub success: bool,
    /// Status line shown after the upload
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pdf_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub summary_id: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ViewDocumentResult {
    /// Document location; absent before the first successful upload
    pub url: Option<String>,
    /// Whether the URL was handed to a browser
    pub opened: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct ViewSummaryResult {
    /// Summary text; absent before the first successful upload
    pub summary: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

#[derive(Debug, Deserialize, JsonSchema)]
pub struct DownloadParams {
    /// Output file, or a directory to place the file in
    pub output_path: String,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct DownloadResult {
    /// Written file; absent before the first successful upload
    pub path: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub bytes: Option<u64>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    pub from_cache: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl DownloadResult {
    fn from_outcome(outcome: crate::error::Result<Option<SavedFile>>) -> Self {
        match outcome {
            Ok(Some(saved)) => Self {
                path: Some(saved.path.display().to_string()),
                bytes: Some(saved.bytes),
                from_cache: saved.from_cache,
                error: None,
            },
            Ok(None) => Self {
                path: None,
                bytes: None,
                from_cache: false,
                error: None,
            },
            Err(e) => Self {
                path: None,
                bytes: None,
                from_cache: false,
                error: Some(e.client_message()),
            },
        }
    }
}

#[derive(Debug, Serialize)]
pub struct SessionStatusResult {
    pub upload_state: UploadState,
    pub pdf_id: Option<String>,
    pub summary_id: Option<String>,
    pub view: PageView,
    pub cached_documents: usize,
}

#[derive(Debug, Serialize, JsonSchema)]
pub struct CheckBackendResult {
    pub base_url: String,
    pub reachable: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

fn to_json<T: Serialize>(value: &T) -> String {
    serde_json::to_string_pretty(value).unwrap_or_default()
}

// ============================================================================
// Tool implementations
// ============================================================================

#[tool_router]
impl SummaryServer {
    /// Create a server with default configuration
    pub fn new() -> crate::error::Result<Self> {
        Self::with_config(ClientConfig::default())
    }

    /// Create a server with full configuration
    pub fn with_config(config: ClientConfig) -> crate::error::Result<Self> {
        let opener: Arc<dyn DocumentOpener> = if config.open_browser {
            Arc::new(SystemBrowser)
        } else {
            Arc::new(DisabledOpener)
        };
        Self::with_opener(config, opener)
    }

    /// Create a server with a custom document opener
    pub fn with_opener(
        config: ClientConfig,
        opener: Arc<dyn DocumentOpener>,
    ) -> crate::error::Result<Self> {
        Ok(Self {
            session: Arc::new(Mutex::new(Session::new())),
            api: ApiClient::new(&config)?,
            cache: Arc::new(DocumentCache::new(
                config.cache_max_entries,
                config.cache_max_bytes,
            )),
            opener,
            tool_router: Self::tool_router(),
        })
    }

    /// Upload a PDF and remember its identifiers
    #[tool(
        description = "Upload a PDF file to the summarization service. On success the returned pdf_id and summary_id replace those of any earlier upload and are used by view_document, view_summary, download_summary and download_document."
    )]
    async fn upload_pdf(&self, Parameters(params): Parameters<UploadPdfParams>) -> String {
        to_json(&self.process_upload(&params).await)
    }

    /// Open the uploaded document
    #[tool(
        description = "Open the most recently uploaded PDF in the default browser and return its URL. Does nothing before the first successful upload."
    )]
    async fn view_document(&self) -> String {
        to_json(&self.process_view_document().await)
    }

    /// Show the generated summary
    #[tool(
        description = "Fetch the summary generated for the most recent upload. Does nothing before the first successful upload."
    )]
    async fn view_summary(&self) -> String {
        to_json(&self.process_view_summary().await)
    }

    #[tool(
        description = "Save the summary of the most recent upload as a text file. output_path may be a file or an existing directory (the file is then named summary_<id>.txt)."
    )]
    async fn download_summary(&self, Parameters(params): Parameters<DownloadParams>) -> String {
        to_json(&self.process_download_summary(&params).await)
    }

    #[tool(
        description = "Save the most recently uploaded PDF. output_path may be a file or an existing directory (the file is then named <id>.pdf)."
    )]
    async fn download_document(&self, Parameters(params): Parameters<DownloadParams>) -> String {
        to_json(&self.process_download_document(&params).await)
    }

    /// Current session state
    #[tool(
        description = "Report the session: upload state, current identifiers, status line, visible controls and the summary shown."
    )]
    async fn session_status(&self) -> String {
        to_json(&self.process_session_status().await)
    }

    #[tool(description = "Check that the summarization service is reachable.")]
    async fn check_backend(&self) -> String {
        to_json(&self.process_check_backend().await)
    }
}

impl SummaryServer {
    pub async fn process_upload(&self, params: &UploadPdfParams) -> UploadPdfResult {
        let mut session = self.session.lock().await;
        let outcome = session
            .submit_upload_from_path(&self.api, params.path.as_deref().map(Path::new))
            .await;
        let status = session.view().status_text().map(str::to_string);

        match outcome {
            Ok(ids) => UploadPdfResult {
                success: true,
                status,
                pdf_id: Some(ids.document_id),
                summary_id: Some(ids.summary_id),
                error: None,
            },
            Err(e) => {
                if e.is_validation() {
                    tracing::debug!(error = %e, "upload_pdf: nothing sent");
                }
                UploadPdfResult {
                    success: false,
                    status,
                    pdf_id: None,
                    summary_id: None,
                    error: Some(e.client_message()),
                }
            }
        }
    }

    pub async fn process_view_document(&self) -> ViewDocumentResult {
        let session = self.session.lock().await;

        match session.view_document(&self.api, self.opener.as_ref()) {
            Ok(Some(link)) => ViewDocumentResult {
                url: Some(link.url.to_string()),
                opened: link.opened,
                error: None,
            },
            Ok(None) => ViewDocumentResult {
                url: None,
                opened: false,
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "view_document failed");
                // The URL is still usable when only the browser hand-off failed
                let url = session
                    .document_id()
                    .and_then(|id| self.api.document_url(id).ok())
                    .map(|u| u.to_string());
                ViewDocumentResult {
                    url,
                    opened: false,
                    error: Some(e.client_message()),
                }
            }
        }
    }

    pub async fn process_view_summary(&self) -> ViewSummaryResult {
        let mut session = self.session.lock().await;

        match session.view_summary(&self.api).await {
            Ok(summary) => ViewSummaryResult {
                summary,
                error: None,
            },
            Err(e) => ViewSummaryResult {
                summary: None,
                error: Some(e.client_message()),
            },
        }
    }

    pub async fn process_download_summary(&self, params: &DownloadParams) -> DownloadResult {
        let mut session = self.session.lock().await;
        let outcome = session
            .download_summary(&self.api, Path::new(&params.output_path))
            .await;
        DownloadResult::from_outcome(outcome)
    }

    pub async fn process_download_document(&self, params: &DownloadParams) -> DownloadResult {
        let mut session = self.session.lock().await;
        let outcome = session
            .download_document(&self.api, &self.cache, Path::new(&params.output_path))
            .await;
        DownloadResult::from_outcome(outcome)
    }

    pub async fn process_session_status(&self) -> SessionStatusResult {
        let session = self.session.lock().await;
        SessionStatusResult {
            upload_state: session.upload_state(),
            pdf_id: session.document_id().map(str::to_string),
            summary_id: session.summary_id().map(str::to_string),
            view: session.view().clone(),
            cached_documents: self.cache.len(),
        }
    }

    pub async fn process_check_backend(&self) -> CheckBackendResult {
        let base_url = self.api.base_url().to_string();
        match self.api.health().await {
            Ok(message) => CheckBackendResult {
                base_url,
                reachable: true,
                message: Some(message),
                error: None,
            },
            Err(e) => {
                tracing::warn!(error = %e, "backend check failed");
                CheckBackendResult {
                    base_url,
                    reachable: false,
                    message: None,
                    error: Some(e.client_message()),
                }
            }
        }
    }
}

#[tool_handler]
impl ServerHandler for SummaryServer {
    fn get_info(&self) -> ServerInfo {
        ServerInfo {
            protocol_version: ProtocolVersion::V_2024_11_05,
            capabilities: ServerCapabilities::builder().enable_tools().build(),
            server_info: Implementation::from_build_env(),
            instructions: Some(
                "PDF summary client uploads PDFs to a summarization service. Call upload_pdf first, \
                 then view_summary or view_document for the most recent upload."
                    .into(),
            ),
        }
    }
}

/// Run the MCP server with default configuration
pub async fn run_server() -> Result<()> {
    run_server_with_config(ClientConfig::default()).await
}

/// Run the MCP server with full configuration
pub async fn run_server_with_config(config: ClientConfig) -> Result<()> {
    let base_url = config.base_url.to_string();
    let server = SummaryServer::with_config(config)?;

    tracing::info!(base_url = %base_url, "PDF summary client ready, waiting for connections...");

    let service = server.serve(rmcp::transport::io::stdio()).await?;
    service.waiting().await?;

    Ok(())
}
