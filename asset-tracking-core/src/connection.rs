//! Connection signals and the trackable status derived from them

use std::fmt;

use serde::{Deserialize, Serialize};

/// Raw connection signal reported by the realtime transport
///
/// Tracked separately for the client connection and for the trackable's
/// channel.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ConnectionState {
    Online,
    #[default]
    Offline,
    Failed,
}

/// Connection status of a trackable as seen by the application
///
/// Never reported by the transport directly. See [`TrackableConnectionStatus::derive`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TrackableConnectionStatus {
    Online,
    #[default]
    Offline,
    Failed,
}

impl TrackableConnectionStatus {
    /// Combines the client signal, the channel signal and publisher presence
    ///
    /// A client failure wins over everything else. With the client online the
    /// channel decides, and a healthy channel is only `Online` while the
    /// publisher is present on it.
    pub fn derive(
        client: ConnectionState,
        channel: ConnectionState,
        publisher_present: bool,
    ) -> Self {
        match (client, channel) {
            (ConnectionState::Failed, _) => Self::Failed,
            (ConnectionState::Offline, _) => Self::Offline,
            (ConnectionState::Online, ConnectionState::Failed) => Self::Failed,
            (ConnectionState::Online, ConnectionState::Offline) => Self::Offline,
            (ConnectionState::Online, ConnectionState::Online) => {
                if publisher_present {
                    Self::Online
                } else {
                    Self::Offline
                }
            }
        }
    }
}

impl fmt::Display for ConnectionState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ConnectionState::Online => write!(f, "online"),
            ConnectionState::Offline => write!(f, "offline"),
            ConnectionState::Failed => write!(f, "failed"),
        }
    }
}

impl fmt::Display for TrackableConnectionStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TrackableConnectionStatus::Online => write!(f, "online"),
            TrackableConnectionStatus::Offline => write!(f, "offline"),
            TrackableConnectionStatus::Failed => write!(f, "failed"),
        }
    }
}
