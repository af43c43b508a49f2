//! Application-facing notifications

use asset_tracking_core::{EnhancedLocationUpdate, Location, TrackableConnectionStatus};

use crate::error::TrackingError;

/// Receives notifications about a subscribed trackable
///
/// The subscriber only keeps a weak reference to its delegate. Every method
/// has an empty default body, so implementors pick what they care about.
/// Calls arrive on the subscriber's callback executor, never on the worker.
pub trait SubscriberDelegate: Send + Sync {
    /// The trackable's derived connection status changed
    fn on_connection_status_changed(&self, _status: TrackableConnectionStatus) {}

    fn on_enhanced_location(&self, _update: &EnhancedLocationUpdate) {}

    fn on_raw_location(&self, _location: &Location) {}

    /// The transport reported a failure outside of any request
    fn on_error(&self, _error: &TrackingError) {}
}

/// A notification waiting to be delivered to the delegate
#[derive(Debug, Clone)]
pub(crate) enum DelegateEvent {
    ConnectionStatusChanged(TrackableConnectionStatus),
    EnhancedLocation(EnhancedLocationUpdate),
    RawLocation(Location),
    Error(TrackingError),
}

impl DelegateEvent {
    pub(crate) fn deliver(self, delegate: &dyn SubscriberDelegate) {
        match self {
            DelegateEvent::ConnectionStatusChanged(status) => {
                delegate.on_connection_status_changed(status)
            }
            DelegateEvent::EnhancedLocation(update) => delegate.on_enhanced_location(&update),
            DelegateEvent::RawLocation(location) => delegate.on_raw_location(&location),
            DelegateEvent::Error(error) => delegate.on_error(&error),
        }
    }
}
