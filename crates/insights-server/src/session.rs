//! One dashboard session per WebSocket connection.
//!
//! Each session owns its [`DashboardContext`]; the fallback dataset is shared
//! read-only with every other session through an `Arc`. A session never sees
//! another session's filters or uploads.

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use insights::{DashboardView, RenderOptions, render_dashboard};
use insights_core::{ControlId, ControlValue, DashboardContext, Dataset, DatasetSource, DatePolicy};

use crate::error::{ServerError, ServerResult};
use crate::protocol::ServerMessage;

/// Decode and parse an uploaded file.
///
/// Blocking: call from the blocking pool for large files.
pub fn load_upload(file_name: &str, data_base64: &str, policy: DatePolicy) -> ServerResult<Dataset> {
    let bytes = BASE64
        .decode(data_base64.trim())
        .map_err(|e| ServerError::Upload(format!("{file_name}: {e}")))?;
    let source = DatasetSource::Upload {
        file_name: file_name.to_string(),
        bytes,
    };
    Ok(Dataset::open(&source, policy)?)
}

/// Dashboard state for one connected client.
pub struct DashboardSession {
    ctx: DashboardContext,
    options: RenderOptions,
    policy: DatePolicy,
}

impl DashboardSession {
    /// New session on the shared fallback dataset.
    pub fn new(fallback: Dataset, options: RenderOptions, policy: DatePolicy) -> Self {
        Self {
            ctx: DashboardContext::new(fallback),
            options,
            policy,
        }
    }

    pub fn context(&self) -> &DashboardContext {
        &self.ctx
    }

    pub fn date_policy(&self) -> DatePolicy {
        self.policy
    }

    /// Render the dashboard for the current state.
    pub fn view(&self) -> DashboardView {
        render_dashboard(&self.ctx, &self.options)
    }

    /// Current dashboard as a protocol message.
    pub fn dashboard(&self) -> ServerMessage {
        ServerMessage::Dashboard {
            view: Box::new(self.view()),
        }
    }

    /// Apply a control change and re-render.
    ///
    /// A rejected update leaves the filters unchanged; the client gets the
    /// error followed by the unchanged dashboard so its controls resync.
    pub fn control_update(&mut self, id: ControlId, value: &ControlValue) -> Vec<ServerMessage> {
        match self.ctx.apply(id, value) {
            Ok(()) => vec![self.dashboard()],
            Err(e) => {
                tracing::warn!("Rejected control update: {}", e);
                vec![
                    ServerMessage::Error {
                        message: e.to_string(),
                    },
                    self.dashboard(),
                ]
            }
        }
    }

    /// Swap in an uploaded dataset, or report why it could not be loaded.
    pub fn finish_upload(&mut self, result: ServerResult<Dataset>) -> Vec<ServerMessage> {
        match result {
            Ok(dataset) => {
                self.ctx.replace_dataset(dataset);
                vec![self.dashboard()]
            }
            Err(e) => {
                tracing::warn!("Upload rejected: {}", e);
                vec![
                    ServerMessage::LoadError {
                        message: e.with_hint(),
                    },
                    self.dashboard(),
                ]
            }
        }
    }

    /// Decode, parse and apply an upload in one step.
    pub fn upload(&mut self, file_name: &str, data_base64: &str) -> Vec<ServerMessage> {
        let result = load_upload(file_name, data_base64, self.policy);
        self.finish_upload(result)
    }

    pub fn reset_filters(&mut self) -> Vec<ServerMessage> {
        self.ctx.reset();
        vec![self.dashboard()]
    }

    /// CSV of the current filtered view.
    pub fn export(&self) -> ServerMessage {
        match self.ctx.export() {
            Ok(export) => {
                tracing::info!("Exported {} bytes", export.bytes.len());
                ServerMessage::ExportReady {
                    file_name: export.file_name.to_string(),
                    mime_type: export.mime_type.to_string(),
                    data_base64: BASE64.encode(&export.bytes),
                }
            }
            Err(e) => ServerMessage::Error {
                message: format!("Export failed: {e}"),
            },
        }
    }
}
