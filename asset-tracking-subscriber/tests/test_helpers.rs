//! Shared helpers for subscriber integration tests.

#![allow(dead_code)]

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;

use asset_tracking_subscriber::{
    ConnectionConfiguration, EnhancedLocationUpdate, Location, Result, SubscriberBuilder,
    SubscriberDelegate, TrackableConnectionStatus, TrackingError,
};

pub const TRACKING_ID: &str = "order-42";

/// Delegate that records everything it is told
#[derive(Default)]
pub struct RecordingDelegate {
    pub statuses: Mutex<Vec<TrackableConnectionStatus>>,
    pub enhanced: Mutex<Vec<EnhancedLocationUpdate>>,
    pub raw: Mutex<Vec<Location>>,
    pub errors: Mutex<Vec<TrackingError>>,
}

impl RecordingDelegate {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn statuses(&self) -> Vec<TrackableConnectionStatus> {
        self.statuses.lock().clone()
    }

    pub fn enhanced(&self) -> Vec<EnhancedLocationUpdate> {
        self.enhanced.lock().clone()
    }

    pub fn raw(&self) -> Vec<Location> {
        self.raw.lock().clone()
    }

    pub fn errors(&self) -> Vec<TrackingError> {
        self.errors.lock().clone()
    }
}

impl SubscriberDelegate for RecordingDelegate {
    fn on_connection_status_changed(&self, status: TrackableConnectionStatus) {
        self.statuses.lock().push(status);
    }

    fn on_enhanced_location(&self, update: &EnhancedLocationUpdate) {
        self.enhanced.lock().push(update.clone());
    }

    fn on_raw_location(&self, location: &Location) {
        self.raw.lock().push(location.clone());
    }

    fn on_error(&self, error: &TrackingError) {
        self.errors.lock().push(error.clone());
    }
}

/// Builder with connection and tracking id already set
pub fn base_builder() -> SubscriberBuilder {
    SubscriberBuilder::new()
        .connection(ConnectionConfiguration::new("key:secret", "dispatch-desk"))
        .tracking_id(TRACKING_ID)
}

/// Completion handler paired with a receiver for its result
pub fn completion_channel() -> (
    impl FnOnce(Result<()>) + Send + 'static,
    tokio::sync::oneshot::Receiver<Result<()>>,
) {
    let (tx, rx) = tokio::sync::oneshot::channel();
    let handler = move |result: Result<()>| {
        let _ = tx.send(result);
    };
    (handler, rx)
}

/// Waits for a completion result, panicking after a few seconds
pub async fn completed(rx: tokio::sync::oneshot::Receiver<Result<()>>) -> Result<()> {
    tokio::time::timeout(Duration::from_secs(5), rx)
        .await
        .expect("completion timed out")
        .expect("completion handler dropped")
}

/// Polls `condition` until it holds, panicking after a few seconds
pub async fn wait_until<F>(mut condition: F)
where
    F: FnMut() -> bool,
{
    let deadline = tokio::time::Instant::now() + Duration::from_secs(5);
    while !condition() {
        assert!(
            tokio::time::Instant::now() < deadline,
            "condition not met in time"
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
    }
}

/// Gives queued callbacks a moment to run
pub async fn settle() {
    tokio::time::sleep(Duration::from_millis(100)).await;
}

pub async fn with_timeout<T>(future: impl Future<Output = T>) -> T {
    tokio::time::timeout(Duration::from_secs(5), future)
        .await
        .expect("operation timed out")
}
