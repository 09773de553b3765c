//! Relay error types.
//!
//! Every [`RelayError`] is recovered at the connection that caused it: the
//! router answers with an `error` envelope carrying [`RelayError::reason`]
//! and leaves the registry untouched. None of them stop the server.

/// Errors raised while handling a client frame.
///
/// | Variant          | Cause                                  | Client sees               |
/// |------------------|----------------------------------------|---------------------------|
/// | `Decode`         | malformed JSON, unknown or missing tag | `"Invalid message format"` |
/// | `JoinRequired`   | `chat` before any `join`               | `"Join a room first!"`     |
/// | `Unexpected`     | server-only envelope handed to router  | `"Invalid message format"` |
#[derive(Debug, thiserror::Error)]
pub enum RelayError {
    /// The frame is not a valid client envelope.
    #[error("invalid envelope: {0}")]
    Decode(#[from] serde_json::Error),

    /// The connection sent a chat message without having joined a room.
    #[error("chat received before join")]
    JoinRequired,

    /// A server-to-client envelope was submitted as client input.
    #[error("unexpected {0} envelope from client")]
    Unexpected(&'static str),
}

impl RelayError {
    /// Returns the client-facing reason placed in the `error` envelope.
    #[must_use]
    pub const fn reason(&self) -> &'static str {
        match self {
            Self::Decode(_) | Self::Unexpected(_) => "Invalid message format",
            Self::JoinRequired => "Join a room first!",
        }
    }
}
