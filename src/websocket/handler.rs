//! WebSocket Handler
//!
//! Handles the device's WebSocket upgrade and feeds the connection into an
//! ingestion session.

use async_trait::async_trait;
use axum::{
    extract::{
        ws::{Message, WebSocket, WebSocketUpgrade},
        State,
    },
    response::Response,
};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use crate::api::AppState;
use crate::ingest::{FrameSource, IngestionSession};

/// WebSocket upgrade handler
///
/// Entry point for device connections. Each upgrade starts one session.
pub async fn device_socket_handler(
    ws: WebSocketUpgrade,
    State(state): State<Arc<AppState>>,
) -> Response {
    ws.on_upgrade(move |socket| handle_socket(socket, state))
}

/// Run one ingestion session over an established connection
async fn handle_socket(socket: WebSocket, state: Arc<AppState>) {
    let _guard = SessionGuard::enter(&state.active_sessions);

    let session = IngestionSession::new(Arc::clone(&state.storage));
    session.accept(WebSocketSource::new(socket)).await;
}

/// Counts live device sessions for as long as it is held
struct SessionGuard<'a> {
    active: &'a AtomicUsize,
}

impl<'a> SessionGuard<'a> {
    fn enter(active: &'a AtomicUsize) -> Self {
        let now_active = active.fetch_add(1, Ordering::SeqCst) + 1;
        if now_active > 1 {
            tracing::warn!(
                active_sessions = now_active,
                "Another device session is already active; writes will be interleaved"
            );
        }
        Self { active }
    }
}

impl Drop for SessionGuard<'_> {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Adapts an axum WebSocket to a [`FrameSource`]
pub struct WebSocketSource {
    socket: WebSocket,
}

impl WebSocketSource {
    pub fn new(socket: WebSocket) -> Self {
        Self { socket }
    }
}

#[async_trait]
impl FrameSource for WebSocketSource {
    async fn receive(&mut self) -> Option<Vec<u8>> {
        loop {
            match self.socket.recv().await? {
                Ok(Message::Text(text)) => return Some(text.into_bytes()),
                Ok(Message::Binary(bytes)) => return Some(bytes),
                // axum answers pings itself
                Ok(Message::Ping(_)) | Ok(Message::Pong(_)) => continue,
                Ok(Message::Close(frame)) => {
                    tracing::debug!(?frame, "Device closed the connection");
                    return None;
                }
                Err(e) => {
                    tracing::debug!(error = %e, "WebSocket receive error");
                    return None;
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_session_guard_counts() {
        let active = AtomicUsize::new(0);
        {
            let _a = SessionGuard::enter(&active);
            let _b = SessionGuard::enter(&active);
            assert_eq!(active.load(Ordering::SeqCst), 2);
        }
        assert_eq!(active.load(Ordering::SeqCst), 0);
    }
}
