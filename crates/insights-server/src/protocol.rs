//! WebSocket protocol messages for the dashboard server.
//!
//! Defines the message types exchanged between client and server.

use insights::DashboardView;
use insights_core::{ControlId, ControlValue};
use serde::{Deserialize, Serialize};

/// Messages sent from client to server.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ClientMessage {
    /// Request the current dashboard.
    GetState,

    /// A date picker or multi-select changed.
    ControlUpdate {
        /// Control that changed.
        control_id: ControlId,
        /// New value: a `YYYY-MM-DD` string or a list of strings.
        value: ControlValue,
    },

    /// Replace the session's dataset with an uploaded file.
    Upload {
        /// Original file name; its extension selects the format.
        file_name: String,
        /// File contents, base64 encoded.
        data_base64: String,
    },

    /// Full date range, nothing selected.
    ResetFilters,

    /// Download the filtered view as CSV.
    Export,
}

/// Messages sent from server to client.
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum ServerMessage {
    /// The complete dashboard for the session's current state.
    Dashboard {
        view: Box<DashboardView>,
    },

    /// A CSV export ready to be saved by the browser.
    ExportReady {
        file_name: String,
        mime_type: String,
        /// File contents, base64 encoded.
        data_base64: String,
    },

    /// An upload could not be loaded; the session keeps its previous dataset.
    LoadError {
        message: String,
    },

    /// Generic error.
    Error {
        message: String,
    },
}
