//! Events consumed by the subscriber worker

use asset_tracking_core::{
    ConnectionState, EnhancedLocationUpdate, Location, PresenceMessage, Resolution,
};
use asset_tracking_transport::{TransportError, TransportEvent};

use crate::dispatch::Completion;

/// Everything the worker processes, user requests and transport callbacks alike
pub(crate) enum Event {
    Start(Completion),
    Stop(Completion),
    ChangeResolution {
        resolution: Option<Resolution>,
        completion: Completion,
    },
    /// Transport stop succeeded; finishes the pending stop request
    ConnectionClosed(Completion),
    /// Transport stop failed; the subscriber stays stopping
    StopFailed {
        error: TransportError,
        completion: Completion,
    },
    ClientConnectionStateChanged(ConnectionState),
    ChannelConnectionStateChanged(ConnectionState),
    PresenceUpdate(PresenceMessage),
    EnhancedLocationReceived(EnhancedLocationUpdate),
    RawLocationReceived(Location),
    TransportFailed(TransportError),
    /// The owning `Subscriber` was dropped
    Shutdown,
}

impl Event {
    pub(crate) fn name(&self) -> &'static str {
        match self {
            Event::Start(_) => "Start",
            Event::Stop(_) => "Stop",
            Event::ChangeResolution { .. } => "ChangeResolution",
            Event::ConnectionClosed(_) => "ConnectionClosed",
            Event::StopFailed { .. } => "StopFailed",
            Event::ClientConnectionStateChanged(_) => "ClientConnectionStateChanged",
            Event::ChannelConnectionStateChanged(_) => "ChannelConnectionStateChanged",
            Event::PresenceUpdate(_) => "PresenceUpdate",
            Event::EnhancedLocationReceived(_) => "EnhancedLocationReceived",
            Event::RawLocationReceived(_) => "RawLocationReceived",
            Event::TransportFailed(_) => "TransportFailed",
            Event::Shutdown => "Shutdown",
        }
    }
}

impl From<TransportEvent> for Event {
    fn from(event: TransportEvent) -> Self {
        match event {
            TransportEvent::ClientConnectionStateChanged(state) => {
                Event::ClientConnectionStateChanged(state)
            }
            TransportEvent::ChannelConnectionStateChanged(state) => {
                Event::ChannelConnectionStateChanged(state)
            }
            TransportEvent::PresenceUpdate(presence) => Event::PresenceUpdate(presence),
            TransportEvent::EnhancedLocationReceived(update) => {
                Event::EnhancedLocationReceived(update)
            }
            TransportEvent::RawLocationReceived(location) => Event::RawLocationReceived(location),
            TransportEvent::Failed(error) => Event::TransportFailed(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_transport_events_map_by_kind() {
        let event = Event::from(TransportEvent::ChannelConnectionStateChanged(
            ConnectionState::Failed,
        ));
        assert!(matches!(
            event,
            Event::ChannelConnectionStateChanged(ConnectionState::Failed)
        ));
        assert_eq!(
            Event::from(TransportEvent::Failed(TransportError::Closed)).name(),
            "TransportFailed"
        );
    }
}
