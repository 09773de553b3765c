//! Live connection handle and its per-session state.
//!
//! A [`ConnectionHandle`] is the core's borrowed view of a transport: it can
//! push already-encoded payloads into the transport's outbound queue and
//! report whether that queue currently accepts writes. The queue itself is
//! owned and drained by the WebSocket task in [`crate::ws::connection`].

use std::sync::Arc;

use tokio::sync::mpsc;
use tokio::sync::mpsc::error::TrySendError;

use super::ConnectionId;

/// An encoded envelope, shared between every recipient of a fan-out.
pub type Payload = Arc<str>;

/// Sending side of a live transport.
///
/// Cloning a handle does not create a new transport; equality and hashing
/// follow the [`ConnectionId`] only.
#[derive(Debug, Clone)]
pub struct ConnectionHandle {
    id: ConnectionId,
    outbound: mpsc::Sender<Payload>,
}

impl ConnectionHandle {
    /// Wraps the outbound queue of a freshly accepted transport.
    #[must_use]
    pub fn new(outbound: mpsc::Sender<Payload>) -> Self {
        Self {
            id: ConnectionId::new(),
            outbound,
        }
    }

    /// Creates a handle together with its outbound queue receiver.
    #[must_use]
    pub fn channel(capacity: usize) -> (Self, mpsc::Receiver<Payload>) {
        let (tx, rx) = mpsc::channel(capacity.max(1));
        (Self::new(tx), rx)
    }

    /// Returns the transport identity.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.id
    }

    /// Returns `true` if the transport is open and its queue has room.
    #[must_use]
    pub fn is_writable(&self) -> bool {
        !self.outbound.is_closed() && self.outbound.capacity() > 0
    }

    /// Queues `payload` without waiting.
    ///
    /// # Errors
    ///
    /// Returns [`TrySendError::Full`] when the transport is not draining
    /// fast enough and [`TrySendError::Closed`] once it has shut down.
    pub fn send(&self, payload: Payload) -> Result<(), TrySendError<Payload>> {
        self.outbound.try_send(payload)
    }
}

impl PartialEq for ConnectionHandle {
    fn eq(&self, other: &Self) -> bool {
        self.id == other.id
    }
}

impl Eq for ConnectionHandle {}

/// Registry entry for one live transport.
#[derive(Debug, Clone)]
pub struct Connection {
    handle: ConnectionHandle,
    room: Option<String>,
    display_name: Option<String>,
}

impl Connection {
    /// Creates an entry that has not joined any room yet.
    #[must_use]
    pub fn new(handle: ConnectionHandle) -> Self {
        Self {
            handle,
            room: None,
            display_name: None,
        }
    }

    /// Returns the transport handle.
    #[must_use]
    pub const fn handle(&self) -> &ConnectionHandle {
        &self.handle
    }

    /// Returns the transport identity.
    #[must_use]
    pub const fn id(&self) -> ConnectionId {
        self.handle.id()
    }

    /// Returns the joined room, if any.
    #[must_use]
    pub fn room(&self) -> Option<&str> {
        self.room.as_deref()
    }

    /// Returns the server-assigned display name, if any.
    #[must_use]
    pub fn display_name(&self) -> Option<&str> {
        self.display_name.as_deref()
    }

    /// Moves the connection into `room`. The display name is only set the
    /// first time; later calls keep the original one.
    pub(crate) fn assign(&mut self, room: String, display_name: String) {
        self.room = Some(room);
        if self.display_name.is_none() {
            self.display_name = Some(display_name);
        }
    }
}
