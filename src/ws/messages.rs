//! Wire envelope codec.
//!
//! Every frame is a JSON object `{"type": ..., "payload": ...}`. Clients may
//! only send `join` and `chat`; the server sends `assign_username`,
//! `joined`, `chat` (fan-out, carrying the sender's name) and `error`.
//!
//! ```text
//! → {"type":"join","payload":{"roomId":"red"}}
//! ← {"type":"assign_username","payload":{"username":"User 1"}}
//! → {"type":"chat","payload":{"message":"hi"}}
//! ⇉ {"type":"chat","payload":{"message":"hi","username":"User 1"}}
//! ← {"type":"error","payload":"Join a room first!"}
//! ```

use serde::{Deserialize, Serialize};

use crate::error::RelayError;

/// A decoded protocol message.
///
/// Server-only variants are never produced by [`Envelope::decode`]: a
/// client frame tagged `assign_username`, `joined` or `error` is rejected
/// like any other unknown tag.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
pub enum Envelope {
    /// Client → server: enter (or switch to) a room.
    Join {
        /// Room to join.
        #[serde(rename = "roomId")]
        room_id: String,
    },
    /// Client → server: a message for the current room.
    Chat {
        /// Message text. Older clients send it as `text`.
        #[serde(alias = "text")]
        message: String,
    },
    /// Server → sender: the display name assigned on join.
    #[serde(skip_deserializing)]
    AssignUsername {
        /// Assigned display name.
        username: String,
    },
    /// Server → sender: join acknowledgement without a name.
    #[serde(skip_deserializing)]
    Joined {
        /// Room that was joined.
        room_id: String,
    },
    /// Server → other room members: a chat message and who sent it.
    #[serde(skip_deserializing)]
    ChatBroadcast {
        /// Message text.
        message: String,
        /// Display name of the sender.
        username: String,
    },
    /// Server → single client: why the last frame was rejected.
    #[serde(skip_deserializing)]
    Error(String),
}

/// Borrowed serialization view. `Chat` and `ChatBroadcast` share the
/// `chat` tag and differ only by the presence of `username`.
#[derive(Serialize)]
#[serde(tag = "type", content = "payload", rename_all = "snake_case")]
enum Frame<'a> {
    Join {
        #[serde(rename = "roomId")]
        room_id: &'a str,
    },
    Chat {
        message: &'a str,
        #[serde(skip_serializing_if = "Option::is_none")]
        username: Option<&'a str>,
    },
    AssignUsername {
        username: &'a str,
    },
    Joined {
        #[serde(rename = "roomId")]
        room_id: &'a str,
    },
    Error(&'a str),
}

impl Envelope {
    /// Decodes a client frame (text or binary).
    ///
    /// # Errors
    ///
    /// Returns [`RelayError::Decode`] for malformed JSON, a missing or
    /// unknown `type`, or a payload that does not fit the tag.
    pub fn decode(bytes: &[u8]) -> Result<Self, RelayError> {
        Ok(serde_json::from_slice(bytes)?)
    }

    /// Encodes the envelope as a JSON string.
    #[must_use]
    pub fn encode(&self) -> String {
        let frame = match self {
            Self::Join { room_id } => Frame::Join { room_id },
            Self::Chat { message } => Frame::Chat {
                message,
                username: None,
            },
            Self::AssignUsername { username } => Frame::AssignUsername { username },
            Self::Joined { room_id } => Frame::Joined { room_id },
            Self::ChatBroadcast { message, username } => Frame::Chat {
                message,
                username: Some(username.as_str()),
            },
            Self::Error(reason) => Frame::Error(reason),
        };
        // Every field is a plain string; serialization cannot fail.
        serde_json::to_string(&frame).unwrap_or_default()
    }

    /// Returns the wire tag, for logging.
    #[must_use]
    pub const fn kind(&self) -> &'static str {
        match self {
            Self::Join { .. } => "join",
            Self::Chat { .. } | Self::ChatBroadcast { .. } => "chat",
            Self::AssignUsername { .. } => "assign_username",
            Self::Joined { .. } => "joined",
            Self::Error(_) => "error",
        }
    }
}
