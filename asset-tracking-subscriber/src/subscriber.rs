//! The running subscriber handle
//!
//! Every operation only enqueues an event for the worker and returns. Results
//! arrive later through the completion, on the callback executor.

use std::thread::JoinHandle;

use tokio::sync::{mpsc, oneshot, watch};

use asset_tracking_core::{Resolution, TrackableConnectionStatus};

use crate::dispatch::{CallbackDispatcher, Completion};
use crate::error::{Result, TrackingError};
use crate::event::Event;

/// A live subscription to one trackable
///
/// Created by [`SubscriberBuilder::start`](crate::SubscriberBuilder::start).
/// Dropping it shuts the worker down. The transport is stopped first if
/// `stop` was never called, and requests still in flight complete with
/// [`TrackingError::SubscriberTerminated`].
pub struct Subscriber {
    tracking_id: String,
    queue: mpsc::UnboundedSender<Event>,
    dispatcher: CallbackDispatcher,
    status_rx: watch::Receiver<TrackableConnectionStatus>,
    _worker: JoinHandle<()>,
}

impl Subscriber {
    pub(crate) fn new(
        tracking_id: String,
        queue: mpsc::UnboundedSender<Event>,
        dispatcher: CallbackDispatcher,
        status_rx: watch::Receiver<TrackableConnectionStatus>,
        worker: JoinHandle<()>,
    ) -> Self {
        Self {
            tracking_id,
            queue,
            dispatcher,
            status_rx,
            _worker: worker,
        }
    }

    pub fn tracking_id(&self) -> &str {
        &self.tracking_id
    }

    /// Starts (or restarts) the transport
    ///
    /// The builder already issues one start, so this is only needed to
    /// reconnect.
    pub fn start<F>(&self, completion: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        self.enqueue(Event::Start, completion);
    }

    /// Stops the subscriber
    ///
    /// Completes successfully straight away if a stop already went through or
    /// is in progress.
    pub fn stop<F>(&self, completion: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        self.enqueue(Event::Stop, completion);
    }

    /// Asks the publisher for a different resolution
    ///
    /// Fails with [`TrackingError::SubscriberStopped`] once `stop` was called.
    pub fn change_resolution_preference<F>(&self, resolution: Option<Resolution>, completion: F)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        self.enqueue(
            move |completion| Event::ChangeResolution {
                resolution,
                completion,
            },
            completion,
        );
    }

    pub async fn start_async(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.start(move |result| {
            let _ = tx.send(result);
        });
        rx.await.unwrap_or(Err(TrackingError::SubscriberTerminated))
    }

    pub async fn stop_async(&self) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.stop(move |result| {
            let _ = tx.send(result);
        });
        rx.await.unwrap_or(Err(TrackingError::SubscriberTerminated))
    }

    pub async fn change_resolution_preference_async(
        &self,
        resolution: Option<Resolution>,
    ) -> Result<()> {
        let (tx, rx) = oneshot::channel();
        self.change_resolution_preference(resolution, move |result| {
            let _ = tx.send(result);
        });
        rx.await.unwrap_or(Err(TrackingError::SubscriberTerminated))
    }

    /// Last connection status delivered to the delegate
    pub fn connection_status(&self) -> TrackableConnectionStatus {
        *self.status_rx.borrow()
    }

    /// Receiver that is updated whenever the connection status changes
    pub fn watch_connection_status(&self) -> watch::Receiver<TrackableConnectionStatus> {
        self.status_rx.clone()
    }

    fn enqueue<E, F>(&self, make_event: E, handler: F)
    where
        E: FnOnce(Completion) -> Event,
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let completion = self.dispatcher.completion(handler);
        if let Err(mpsc::error::SendError(event)) = self.queue.send(make_event(completion)) {
            // Dropping the event resolves its completion as terminated.
            tracing::warn!(
                "Trackable {}: worker is not running, rejecting {}",
                self.tracking_id,
                event.name()
            );
        }
    }
}

impl Drop for Subscriber {
    fn drop(&mut self) {
        tracing::debug!("Subscriber for trackable {} dropping", self.tracking_id);
        let _ = self.queue.send(Event::Shutdown);
    }
}
