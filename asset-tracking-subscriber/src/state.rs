//! Subscriber lifecycle and connection status reconciliation

use asset_tracking_core::{ConnectionState, PresenceMessage, TrackableConnectionStatus};

/// Lifecycle of a subscriber; only ever moves forward
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SubscriberState {
    Working,
    Stopping,
    Stopped,
}

impl SubscriberState {
    pub(crate) fn is_stopping_or_stopped(self) -> bool {
        matches!(self, SubscriberState::Stopping | SubscriberState::Stopped)
    }
}

/// Tracks the raw connection signals and the last status handed out
///
/// Each setter returns the new [`TrackableConnectionStatus`] only when it
/// differs from the last one emitted.
#[derive(Debug, Default)]
pub(crate) struct ConnectionReconciler {
    client: ConnectionState,
    channel: ConnectionState,
    publisher_present: bool,
    last_emitted: TrackableConnectionStatus,
}

impl ConnectionReconciler {
    pub(crate) fn set_client_state(
        &mut self,
        state: ConnectionState,
    ) -> Option<TrackableConnectionStatus> {
        self.client = state;
        self.reconcile()
    }

    pub(crate) fn set_channel_state(
        &mut self,
        state: ConnectionState,
    ) -> Option<TrackableConnectionStatus> {
        self.channel = state;
        self.reconcile()
    }

    /// Applies a presence change; only publisher members count
    pub(crate) fn apply_presence(
        &mut self,
        presence: &PresenceMessage,
    ) -> Option<TrackableConnectionStatus> {
        if presence.is_publisher() {
            self.publisher_present = presence.action.is_present();
        }
        self.reconcile()
    }

    pub(crate) fn last_emitted(&self) -> TrackableConnectionStatus {
        self.last_emitted
    }

    fn reconcile(&mut self) -> Option<TrackableConnectionStatus> {
        let derived =
            TrackableConnectionStatus::derive(self.client, self.channel, self.publisher_present);
        let changed = derived != self.last_emitted;
        self.last_emitted = derived;
        changed.then_some(derived)
    }
}
