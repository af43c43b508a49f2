//! Error types for the subscriber SDK

use asset_tracking_transport::TransportError;
use thiserror::Error;

/// Errors delivered to subscriber completions and delegates
#[derive(Error, Debug, Clone, PartialEq)]
pub enum TrackingError {
    /// A mandatory builder option was never set
    #[error("Incomplete configuration: missing {missing_property}, set it with the `{builder_option}` builder option")]
    IncompleteConfiguration {
        missing_property: &'static str,
        builder_option: &'static str,
    },

    /// The operation is not allowed once the subscriber is stopping or stopped
    #[error("Subscriber has already been stopped")]
    SubscriberStopped,

    /// The realtime transport reported a failure
    #[error("Transport error: {0}")]
    Transport(#[from] TransportError),

    /// The subscriber was dropped before the request could complete
    #[error("Subscriber was shut down before the request completed")]
    SubscriberTerminated,

    /// A background thread could not be spawned
    #[error("Failed to spawn subscriber thread: {0}")]
    WorkerSpawn(String),
}

/// Flat classification of [`TrackingError`]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorKind {
    IncompleteConfiguration,
    SubscriberStopped,
    Transport,
    SubscriberTerminated,
    WorkerSpawn,
}

impl TrackingError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            TrackingError::IncompleteConfiguration { .. } => ErrorKind::IncompleteConfiguration,
            TrackingError::SubscriberStopped => ErrorKind::SubscriberStopped,
            TrackingError::Transport(_) => ErrorKind::Transport,
            TrackingError::SubscriberTerminated => ErrorKind::SubscriberTerminated,
            TrackingError::WorkerSpawn(_) => ErrorKind::WorkerSpawn,
        }
    }
}

/// Result type for subscriber operations
pub type Result<T> = std::result::Result<T, TrackingError>;
