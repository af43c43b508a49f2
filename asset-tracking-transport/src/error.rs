//! Error types for the transport layer.

/// Failures reported by a realtime transport
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum TransportError {
    /// The client connection could not be established or was lost
    #[error("Connection error: {0}")]
    Connection(String),

    /// The trackable's channel could not be attached or detached
    #[error("Channel attach error on {channel}: {reason}")]
    ChannelAttach { channel: String, reason: String },

    /// Entering, updating or leaving presence failed
    #[error("Presence error: {0}")]
    Presence(String),

    /// Publishing a message failed
    #[error("Publish error: {0}")]
    Publish(String),

    /// A presence member carried data that could not be decoded
    #[error("Invalid presence data from {client_id}: {reason}")]
    InvalidPresenceData { client_id: String, reason: String },

    /// The transport has been closed
    #[error("Transport is closed")]
    Closed,
}

/// Result type for transport operations
pub type Result<T> = std::result::Result<T, TransportError>;
