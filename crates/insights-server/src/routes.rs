//! HTTP and WebSocket routes for the dashboard server.

use std::sync::Arc;

use axum::{
    Router,
    extract::{
        State, WebSocketUpgrade,
        ws::{Message, WebSocket},
    },
    http::{StatusCode, header},
    response::{IntoResponse, Json, Response},
    routing::{get, post},
};

#[cfg(feature = "embedded-frontend")]
use axum::extract::Path as AxumPath;

#[cfg(not(feature = "embedded-frontend"))]
use axum::response::Html;
use futures::stream::SplitSink;
use futures::{SinkExt, StreamExt};
use insights::RenderOptions;
use insights_core::{Dataset, DatePolicy, FilterState, export, filter};
use tokio::sync::Mutex as TokioMutex;
use tower_http::cors::CorsLayer;

use crate::error::ServerError;
use crate::protocol::{ClientMessage, ServerMessage};
use crate::session::{DashboardSession, load_upload};

#[cfg(feature = "embedded-frontend")]
use crate::embedded_frontend;

type WsSender = Arc<TokioMutex<SplitSink<WebSocket, Message>>>;

/// Application state shared across handlers.
///
/// Read-only: every connection builds its own [`DashboardSession`] from it.
pub struct AppState {
    /// Dataset shown until a session uploads its own.
    pub fallback: Dataset,
    pub options: RenderOptions,
    pub date_policy: DatePolicy,
}

impl AppState {
    fn new_session(&self) -> DashboardSession {
        DashboardSession::new(self.fallback.clone(), self.options, self.date_policy)
    }
}

/// Create the router with all routes.
pub fn create_router(state: Arc<AppState>) -> Router {
    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/ws", get(ws_handler))
        .route("/api/state", get(state_handler))
        .route("/api/export", post(export_handler));

    // Add frontend routes
    #[cfg(feature = "embedded-frontend")]
    let router = router
        .route("/", get(frontend_index_handler))
        .route("/static/{*path}", get(static_handler));

    #[cfg(not(feature = "embedded-frontend"))]
    let router = router.route("/", get(index_handler));

    router.layer(CorsLayer::permissive()).with_state(state)
}

/// Index page handler (fallback when embedded-frontend is disabled).
#[cfg(not(feature = "embedded-frontend"))]
async fn index_handler() -> Html<&'static str> {
    Html(
        r#"<!DOCTYPE html>
<html>
<head>
    <title>Market Insights Dashboard</title>
    <style>
        body { font-family: system-ui, sans-serif; margin: 2rem; }
    </style>
</head>
<body>
    <h1>Market Insights Dashboard Server</h1>
    <p>WebSocket endpoint: <code>/ws</code></p>
    <ul>
        <li><code>GET /health</code> - Health check</li>
        <li><code>GET /api/state</code> - Default dashboard</li>
        <li><code>POST /api/export</code> - Filtered CSV of the default dataset</li>
    </ul>
    <p><em>The full UI is available with the <code>embedded-frontend</code> feature.</em></p>
</body>
</html>"#,
    )
}

/// Serve the embedded frontend index.html.
#[cfg(feature = "embedded-frontend")]
async fn frontend_index_handler() -> impl IntoResponse {
    embedded_frontend::serve_index()
}

/// Serve static assets from the embedded frontend.
#[cfg(feature = "embedded-frontend")]
async fn static_handler(AxumPath(path): AxumPath<String>) -> impl IntoResponse {
    embedded_frontend::serve_static(&path)
}

/// Health check handler.
async fn health_handler() -> Json<serde_json::Value> {
    Json(serde_json::json!({
        "status": "ok",
        "version": env!("CARGO_PKG_VERSION")
    }))
}

/// Dashboard for the fallback dataset with default filters.
async fn state_handler(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    Json(state.new_session().view())
}

/// CSV of the fallback dataset under the posted filter state.
async fn export_handler(State(state): State<Arc<AppState>>, Json(filter_state): Json<FilterState>) -> Response {
    let view = filter(&state.fallback.table, &filter_state);
    match export(&view) {
        Ok(out) => (
            StatusCode::OK,
            [
                (header::CONTENT_TYPE, out.mime_type.to_string()),
                (
                    header::CONTENT_DISPOSITION,
                    format!("attachment; filename=\"{}\"", out.file_name),
                ),
            ],
            out.bytes,
        )
            .into_response(),
        Err(e) => {
            tracing::error!("Export failed: {}", e);
            (StatusCode::INTERNAL_SERVER_ERROR, e.to_string()).into_response()
        }
    }
}

/// WebSocket upgrade handler.
async fn ws_handler(ws: WebSocketUpgrade, State(state): State<Arc<AppState>>) -> impl IntoResponse {
    ws.on_upgrade(|socket| handle_websocket(socket, state))
}

/// Handle WebSocket connection.
async fn handle_websocket(socket: WebSocket, state: Arc<AppState>) {
    let (sender, mut receiver) = socket.split();
    let sender: WsSender = Arc::new(TokioMutex::new(sender));
    let mut session = state.new_session();
    tracing::debug!("Dashboard session opened");

    // Send initial state
    send_message(&sender, &session.dashboard()).await;

    // Handle incoming client messages
    while let Some(result) = receiver.next().await {
        match result {
            Ok(Message::Text(text)) => match serde_json::from_str::<ClientMessage>(&text) {
                Ok(msg) => handle_client_message(msg, &mut session, &sender).await,
                Err(e) => {
                    tracing::warn!("Failed to parse client message: {} (input: {})", e, text);
                    send_message(
                        &sender,
                        &ServerMessage::Error {
                            message: format!("Invalid message format: {}", e),
                        },
                    )
                    .await;
                }
            },
            Ok(Message::Close(_)) => break,
            Err(e) => {
                tracing::warn!("WebSocket error: {}", e);
                break;
            }
            _ => {}
        }
    }

    tracing::debug!("Dashboard session closed");
}

/// Send a server message through the WebSocket.
async fn send_message(sender: &WsSender, msg: &ServerMessage) {
    match serde_json::to_string(msg) {
        Ok(json) => {
            let mut sender = sender.lock().await;
            let _ = sender.send(Message::Text(json.into())).await;
        }
        Err(e) => tracing::error!("Failed to serialize server message: {}", e),
    }
}

async fn send_all(sender: &WsSender, messages: Vec<ServerMessage>) {
    for msg in &messages {
        send_message(sender, msg).await;
    }
}

/// Handle a client message.
async fn handle_client_message(msg: ClientMessage, session: &mut DashboardSession, sender: &WsSender) {
    match msg {
        ClientMessage::GetState => {
            send_message(sender, &session.dashboard()).await;
        }

        ClientMessage::ControlUpdate { control_id, value } => {
            let messages = session.control_update(control_id, &value);
            send_all(sender, messages).await;
        }

        ClientMessage::Upload { file_name, data_base64 } => {
            tracing::info!("Upload received: {}", file_name);
            let policy = session.date_policy();
            // spreadsheet parsing runs on the blocking pool
            let result = tokio::task::spawn_blocking(move || load_upload(&file_name, &data_base64, policy))
                .await
                .unwrap_or_else(|e| Err(ServerError::Upload(format!("upload task failed: {e}"))));
            let messages = session.finish_upload(result);
            send_all(sender, messages).await;
        }

        ClientMessage::ResetFilters => {
            let messages = session.reset_filters();
            send_all(sender, messages).await;
        }

        ClientMessage::Export => {
            send_message(sender, &session.export()).await;
        }
    }
}
