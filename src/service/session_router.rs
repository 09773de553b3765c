//! Session router: per-connection state machine over decoded envelopes.
//!
//! [`SessionRouter`] is the only writer of the [`ConnectionRegistry`]. The
//! registry and the display-name sequence share one mutex, and every
//! transport event (frame or close) holds it from start to finish, so joins,
//! chats and disconnects are atomic with respect to each other.
//!
//! ```text
//!   Unjoined ──join──▶ Joined ──join──▶ Joined (room replaced, name kept)
//!      │ chat → error     │ chat → fan-out to room, minus sender
//!      └──────close──────▶ removed
//! ```

use serde::Serialize;
use tokio::sync::Mutex;
use utoipa::ToSchema;

use crate::domain::{
    Connection, ConnectionHandle, ConnectionId, ConnectionRegistry, NameSequence, Payload,
    RoomBroadcaster,
};
use crate::error::RelayError;
use crate::ws::messages::Envelope;

/// What a successfully handled frame did.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    /// The connection is now in `room` under `username`.
    Joined {
        /// Room joined.
        room: String,
        /// Display name of the connection.
        username: String,
    },
    /// A chat message was fanned out.
    Broadcast {
        /// Room the message went to.
        room: String,
        /// Number of members the payload was queued for.
        delivered: usize,
    },
}

/// Point-in-time relay counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
pub struct RelayStats {
    /// Connections that have joined a room and not yet closed.
    pub connections: usize,
    /// Distinct rooms with at least one member.
    pub rooms: usize,
}

#[derive(Debug, Default)]
struct RelayState {
    registry: ConnectionRegistry,
    names: NameSequence,
}

/// Dispatches client frames and close notifications.
#[derive(Debug)]
pub struct SessionRouter {
    state: Mutex<RelayState>,
    announce_usernames: bool,
}

impl SessionRouter {
    /// Creates a router with an empty registry.
    ///
    /// With `announce_usernames` a join is answered with `assign_username`,
    /// otherwise with `joined`.
    #[must_use]
    pub fn new(announce_usernames: bool) -> Self {
        Self {
            state: Mutex::new(RelayState::default()),
            announce_usernames,
        }
    }

    /// Handles one raw frame received from `handle`.
    ///
    /// On failure an `error` envelope is sent back to `handle` alone and the
    /// registry is left as it was.
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Decode`] for frames that are not a client
    /// envelope and [`RelayError::JoinRequired`] for a chat before any join.
    pub async fn handle_frame(
        &self,
        handle: &ConnectionHandle,
        bytes: &[u8],
    ) -> Result<Outcome, RelayError> {
        let result = match Envelope::decode(bytes) {
            Ok(envelope) => self.dispatch(handle, envelope).await,
            Err(err) => Err(err),
        };
        if let Err(err) = &result {
            tracing::warn!(conn = %handle.id(), error = %err, "rejected frame");
            reply(handle, &Envelope::Error(err.reason().to_string()));
        }
        result
    }

    /// Handles a close notification. Repeated calls are no-ops.
    ///
    /// Returns `true` if an entry was removed.
    pub async fn disconnect(&self, id: ConnectionId) -> bool {
        let removed = self.state.lock().await.registry.remove(id);
        match &removed {
            Some(conn) => {
                tracing::info!(conn = %id, room = conn.room(), "left room");
            }
            None => tracing::debug!(conn = %id, "closed without joining"),
        }
        removed.is_some()
    }

    /// Returns current connection and room counts.
    pub async fn stats(&self) -> RelayStats {
        let state = self.state.lock().await;
        RelayStats {
            connections: state.registry.len(),
            rooms: state.registry.room_count(),
        }
    }

    /// Returns the members of `room`, in registration order.
    pub async fn members_of(&self, room: &str) -> Vec<ConnectionId> {
        let state = self.state.lock().await;
        state
            .registry
            .members_of(room, None)
            .map(Connection::id)
            .collect()
    }

    async fn dispatch(
        &self,
        handle: &ConnectionHandle,
        envelope: Envelope,
    ) -> Result<Outcome, RelayError> {
        match envelope {
            Envelope::Join { room_id } => Ok(self.join(handle, room_id).await),
            Envelope::Chat { message } => self.chat(handle, message).await,
            other => Err(RelayError::Unexpected(other.kind())),
        }
    }

    async fn join(&self, handle: &ConnectionHandle, room: String) -> Outcome {
        let mut state = self.state.lock().await;
        let RelayState { registry, names } = &mut *state;

        let username = match registry.get(handle.id()).and_then(Connection::display_name) {
            Some(existing) => existing.to_string(),
            None => names.next_name(),
        };
        registry.set_room(handle, &room, username.clone());
        tracing::info!(conn = %handle.id(), room = %room, username = %username, "joined room");

        let ack = if self.announce_usernames {
            Envelope::AssignUsername {
                username: username.clone(),
            }
        } else {
            Envelope::Joined {
                room_id: room.clone(),
            }
        };
        reply(handle, &ack);

        Outcome::Joined { room, username }
    }

    async fn chat(&self, handle: &ConnectionHandle, message: String) -> Result<Outcome, RelayError> {
        let state = self.state.lock().await;
        let Some((room, username)) = state
            .registry
            .get(handle.id())
            .and_then(|c| c.room().zip(c.display_name()))
        else {
            return Err(RelayError::JoinRequired);
        };

        let payload = Payload::from(
            Envelope::ChatBroadcast {
                message,
                username: username.to_string(),
            }
            .encode(),
        );
        let delivered =
            RoomBroadcaster::new(&state.registry).broadcast(room, &payload, Some(handle.id()));
        tracing::debug!(conn = %handle.id(), room, delivered, "chat fan-out");

        Ok(Outcome::Broadcast {
            room: room.to_string(),
            delivered,
        })
    }
}

impl Default for SessionRouter {
    fn default() -> Self {
        Self::new(true)
    }
}

/// Sends `envelope` to `handle` only. A failed send is logged and dropped.
fn reply(handle: &ConnectionHandle, envelope: &Envelope) {
    if let Err(err) = handle.send(Payload::from(envelope.encode())) {
        tracing::debug!(conn = %handle.id(), kind = envelope.kind(), error = %err, "reply dropped");
    }
}

#[cfg(test)]
#[allow(clippy::panic)]
mod tests {
    use super::*;
    use serde_json::{Value, json};
    use tokio::sync::mpsc;

    struct Client {
        handle: ConnectionHandle,
        rx: mpsc::Receiver<Payload>,
    }

    impl Client {
        fn new() -> Self {
            let (handle, rx) = ConnectionHandle::channel(16);
            Self { handle, rx }
        }

        fn recv(&mut self) -> Option<Value> {
            self.rx
                .try_recv()
                .ok()
                .and_then(|p| serde_json::from_str(&p).ok())
        }

        fn drain(&mut self) -> Vec<Value> {
            std::iter::from_fn(|| self.recv()).collect()
        }
    }

    async fn send(router: &SessionRouter, client: &Client, frame: Value) -> Result<Outcome, RelayError> {
        router
            .handle_frame(&client.handle, frame.to_string().as_bytes())
            .await
    }

    fn join(room: &str) -> Value {
        json!({"type": "join", "payload": {"roomId": room}})
    }

    fn chat(text: &str) -> Value {
        json!({"type": "chat", "payload": {"message": text}})
    }

    #[tokio::test]
    async fn join_assigns_sequential_names() {
        let router = SessionRouter::default();
        let mut x = Client::new();
        let mut y = Client::new();

        let Ok(Outcome::Joined { username: nx, .. }) = send(&router, &x, join("red")).await else {
            panic!("x should join");
        };
        let Ok(Outcome::Joined { username: ny, .. }) = send(&router, &y, join("red")).await else {
            panic!("y should join");
        };
        assert_eq!(nx, "User 1");
        assert_eq!(ny, "User 2");
        assert_eq!(
            x.drain(),
            vec![json!({"type": "assign_username", "payload": {"username": "User 1"}})]
        );
        assert_eq!(y.drain().len(), 1);
    }

    #[tokio::test]
    async fn join_acknowledges_with_joined_when_names_are_not_announced() {
        let router = SessionRouter::new(false);
        let mut x = Client::new();
        assert!(send(&router, &x, join("red")).await.is_ok());
        assert_eq!(
            x.drain(),
            vec![json!({"type": "joined", "payload": {"roomId": "red"}})]
        );
    }

    #[tokio::test]
    async fn chat_reaches_room_members_but_not_sender() {
        let router = SessionRouter::default();
        let mut x = Client::new();
        let mut y = Client::new();
        let _ = send(&router, &x, join("red")).await;
        let _ = send(&router, &y, join("red")).await;
        x.drain();
        y.drain();

        let res = send(&router, &x, chat("hi")).await;
        assert!(matches!(res, Ok(Outcome::Broadcast { delivered: 1, .. })));
        assert_eq!(
            y.drain(),
            vec![json!({"type": "chat", "payload": {"message": "hi", "username": "User 1"}})]
        );
        assert!(x.drain().is_empty());
    }

    #[tokio::test]
    async fn chat_never_crosses_rooms() {
        let router = SessionRouter::default();
        let mut x = Client::new();
        let mut y = Client::new();
        let _ = send(&router, &x, join("red")).await;
        let _ = send(&router, &y, join("blue")).await;
        x.drain();
        y.drain();

        let res = send(&router, &x, chat("hi")).await;
        assert!(matches!(res, Ok(Outcome::Broadcast { delivered: 0, .. })));
        assert!(y.drain().is_empty());
    }

    #[tokio::test]
    async fn chat_before_join_errors_once_and_broadcasts_nothing() {
        let router = SessionRouter::default();
        let mut z = Client::new();
        let mut bystander = Client::new();
        let _ = send(&router, &bystander, join("red")).await;
        bystander.drain();

        let res = send(&router, &z, chat("hi")).await;
        assert!(matches!(res, Err(RelayError::JoinRequired)));
        assert_eq!(
            z.drain(),
            vec![json!({"type": "error", "payload": "Join a room first!"})]
        );
        assert!(bystander.drain().is_empty());
        assert_eq!(router.stats().await.connections, 1);
    }

    #[tokio::test]
    async fn malformed_frame_errors_without_changing_state() {
        let router = SessionRouter::default();
        let mut x = Client::new();
        let _ = send(&router, &x, join("red")).await;
        x.drain();

        let res = router.handle_frame(&x.handle, b"{not json").await;
        assert!(matches!(res, Err(RelayError::Decode(_))));
        let res = send(&router, &x, json!({"type": "wave", "payload": {}})).await;
        assert!(matches!(res, Err(RelayError::Decode(_))));
        assert_eq!(
            x.drain(),
            vec![
                json!({"type": "error", "payload": "Invalid message format"}),
                json!({"type": "error", "payload": "Invalid message format"}),
            ]
        );
        assert_eq!(router.members_of("red").await, vec![x.handle.id()]);
    }

    #[tokio::test]
    async fn server_only_envelope_is_rejected() {
        let router = SessionRouter::default();
        let x = Client::new();
        let res = router
            .dispatch(&x.handle, Envelope::Error("spoof".to_string()))
            .await;
        assert!(matches!(res, Err(RelayError::Unexpected("error"))));
    }

    #[tokio::test]
    async fn rejoin_same_room_keeps_single_entry_and_name() {
        let router = SessionRouter::default();
        let x = Client::new();
        let first = send(&router, &x, join("red")).await;
        let second = send(&router, &x, join("red")).await;
        let (Ok(first), Ok(second)) = (first, second) else {
            panic!("both joins should succeed");
        };
        assert_eq!(first, second);
        assert_eq!(router.members_of("red").await, vec![x.handle.id()]);
        assert_eq!(router.stats().await.connections, 1);
    }

    #[tokio::test]
    async fn rejoin_other_room_replaces_membership() {
        let router = SessionRouter::default();
        let x = Client::new();
        let _ = send(&router, &x, join("red")).await;
        let res = send(&router, &x, join("blue")).await;
        assert!(matches!(
            res,
            Ok(Outcome::Joined { ref room, ref username }) if room == "blue" && username == "User 1"
        ));
        assert!(router.members_of("red").await.is_empty());
        assert_eq!(router.members_of("blue").await, vec![x.handle.id()]);
    }

    #[tokio::test]
    async fn disconnect_removes_and_is_idempotent() {
        let router = SessionRouter::default();
        let x = Client::new();
        let mut y = Client::new();
        let _ = send(&router, &x, join("red")).await;
        let _ = send(&router, &y, join("red")).await;
        y.drain();

        assert!(router.disconnect(x.handle.id()).await);
        assert!(!router.disconnect(x.handle.id()).await);
        assert_eq!(router.members_of("red").await, vec![y.handle.id()]);

        let res = send(&router, &x, chat("ghost")).await;
        assert!(matches!(res, Err(RelayError::JoinRequired)));
        assert!(y.drain().is_empty());
    }

    #[tokio::test]
    async fn closed_member_is_skipped_until_disconnect() {
        let router = SessionRouter::default();
        let mut x = Client::new();
        let y = Client::new();
        let _ = send(&router, &x, join("red")).await;
        let _ = send(&router, &y, join("red")).await;
        x.drain();
        let Client { handle: y_handle, rx } = y;
        drop(rx);

        let res = send(&router, &x, chat("anyone?")).await;
        assert!(matches!(res, Ok(Outcome::Broadcast { delivered: 0, .. })));
        assert_eq!(router.members_of("red").await.len(), 2);

        assert!(router.disconnect(y_handle.id()).await);
        assert_eq!(router.members_of("red").await, vec![x.handle.id()]);
    }

    #[tokio::test]
    async fn stats_count_connections_and_rooms() {
        let router = SessionRouter::default();
        let a = Client::new();
        let b = Client::new();
        let c = Client::new();
        let _ = send(&router, &a, join("red")).await;
        let _ = send(&router, &b, join("red")).await;
        let _ = send(&router, &c, join("blue")).await;
        assert_eq!(
            router.stats().await,
            RelayStats {
                connections: 3,
                rooms: 2
            }
        );
    }
}
