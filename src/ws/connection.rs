//! WebSocket connection loop.
//!
//! Bridges one upgraded socket to the [`SessionRouter`]: inbound frames are
//! handed to the router, and everything the core queues on this
//! connection's [`ConnectionHandle`] is written back to the socket.

use std::sync::Arc;

use axum::extract::ws::{Message, WebSocket};
use futures_util::{SinkExt, StreamExt};

use crate::domain::ConnectionHandle;
use crate::service::SessionRouter;

/// Runs the read/write loop for a single WebSocket connection.
///
/// - Text and binary frames are decoded and dispatched by the router.
/// - Payloads queued by the router (replies and room fan-out) are forwarded
///   to the client.
/// - On close, stream end, or a failed write the connection is removed from
///   the registry and no further frames are processed.
pub async fn run_connection(socket: WebSocket, router: Arc<SessionRouter>, queue_capacity: usize) {
    let (mut ws_tx, mut ws_rx) = socket.split();
    let (handle, mut outbound_rx) = ConnectionHandle::channel(queue_capacity);
    let conn = handle.id();
    tracing::info!(conn = %conn, "connection opened");

    loop {
        tokio::select! {
            // Incoming frame from client
            msg = ws_rx.next() => {
                match msg {
                    Some(Ok(Message::Text(text))) => {
                        let _ = router.handle_frame(&handle, text.as_str().as_bytes()).await;
                    }
                    Some(Ok(Message::Binary(bytes))) => {
                        let _ = router.handle_frame(&handle, &bytes).await;
                    }
                    Some(Ok(Message::Close(_))) | None => break,
                    Some(Err(err)) => {
                        tracing::debug!(conn = %conn, error = %err, "ws read failed");
                        break;
                    }
                    // Ping/pong are answered by the transport.
                    Some(Ok(_)) => {}
                }
            }
            // Payload queued by the router
            payload = outbound_rx.recv() => {
                let Some(payload) = payload else { break };
                if ws_tx.send(Message::text(payload.to_string())).await.is_err() {
                    break;
                }
            }
        }
    }

    // Stop accepting payloads before the entry disappears so a concurrent
    // fan-out sees this handle as not writable.
    outbound_rx.close();
    router.disconnect(conn).await;
    tracing::info!(conn = %conn, "connection closed");
}
