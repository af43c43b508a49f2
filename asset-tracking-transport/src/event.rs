//! Callbacks emitted by a transport

use std::fmt;
use std::sync::Arc;

use asset_tracking_core::{ConnectionState, EnhancedLocationUpdate, Location, PresenceMessage};
use tokio::sync::mpsc;

use crate::error::TransportError;

/// Something the transport observed on the realtime service
#[derive(Debug, Clone, PartialEq)]
pub enum TransportEvent {
    ClientConnectionStateChanged(ConnectionState),
    ChannelConnectionStateChanged(ConnectionState),
    PresenceUpdate(PresenceMessage),
    EnhancedLocationReceived(EnhancedLocationUpdate),
    RawLocationReceived(Location),
    Failed(TransportError),
}

/// Where a transport delivers its [`TransportEvent`]s
///
/// Emitting never blocks. The subscriber core forwards every event into its
/// serialization queue.
#[derive(Clone)]
pub struct TransportEventSink {
    forward: Arc<dyn Fn(TransportEvent) -> bool + Send + Sync>,
}

impl TransportEventSink {
    /// Creates a sink from a forwarding function
    ///
    /// The function returns `false` once the receiving side is gone.
    pub fn new<F>(forward: F) -> Self
    where
        F: Fn(TransportEvent) -> bool + Send + Sync + 'static,
    {
        Self {
            forward: Arc::new(forward),
        }
    }

    /// Delivers an event, returning `false` if nobody is listening any more
    pub fn emit(&self, event: TransportEvent) -> bool {
        let delivered = (self.forward)(event);
        if !delivered {
            tracing::trace!("Transport event dropped, receiver is gone");
        }
        delivered
    }
}

impl From<mpsc::UnboundedSender<TransportEvent>> for TransportEventSink {
    fn from(tx: mpsc::UnboundedSender<TransportEvent>) -> Self {
        Self::new(move |event| tx.send(event).is_ok())
    }
}

impl fmt::Debug for TransportEventSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("TransportEventSink").finish_non_exhaustive()
    }
}
