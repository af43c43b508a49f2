//! Background worker that owns a subscriber's state
//!
//! Spawns a thread with its own single-threaded tokio runtime. Every user
//! request and every transport callback arrives on one queue, and each event
//! is fully applied before the next one is taken. Transport calls run as tasks
//! on the same runtime so the queue keeps moving while they are in flight.

use std::sync::Arc;
use std::thread::{self, JoinHandle};

use tokio::sync::{mpsc, watch};

use asset_tracking_core::{PresenceMessage, Resolution, TrackableConnectionStatus};
use asset_tracking_transport::{SubscriberTransport, TransportError};

use crate::delegate::DelegateEvent;
use crate::dispatch::{CallbackDispatcher, Completion};
use crate::error::TrackingError;
use crate::event::Event;
use crate::state::{ConnectionReconciler, SubscriberState};

pub(crate) struct SubscriberWorker {
    tracking_id: String,
    transport: Arc<dyn SubscriberTransport>,
    dispatcher: CallbackDispatcher,
    /// Used by transport tasks to re-enter the queue
    queue: mpsc::UnboundedSender<Event>,
    state: SubscriberState,
    /// A transport stop failed and nothing has detached it since
    stop_failed: bool,
    connection: ConnectionReconciler,
    status_tx: watch::Sender<TrackableConnectionStatus>,
}

impl SubscriberWorker {
    pub(crate) fn new(
        tracking_id: String,
        transport: Arc<dyn SubscriberTransport>,
        dispatcher: CallbackDispatcher,
        queue: mpsc::UnboundedSender<Event>,
        status_tx: watch::Sender<TrackableConnectionStatus>,
    ) -> Self {
        Self {
            tracking_id,
            transport,
            dispatcher,
            queue,
            state: SubscriberState::Working,
            stop_failed: false,
            connection: ConnectionReconciler::default(),
            status_tx,
        }
    }
}

/// Spawns the worker thread
///
/// If the runtime cannot be created the queue is dropped, which resolves any
/// queued request with [`TrackingError::SubscriberTerminated`].
pub(crate) fn spawn_subscriber_worker(
    worker: SubscriberWorker,
    events: mpsc::UnboundedReceiver<Event>,
) -> std::io::Result<JoinHandle<()>> {
    thread::Builder::new()
        .name(format!("asset-tracking-{}", worker.tracking_id))
        .spawn(move || {
            let rt = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(rt) => rt,
                Err(e) => {
                    tracing::error!("Failed to create tokio runtime for subscriber worker: {}", e);
                    return;
                }
            };

            rt.block_on(worker.run(events));
        })
}

impl SubscriberWorker {
    async fn run(mut self, mut events: mpsc::UnboundedReceiver<Event>) {
        tracing::info!("Subscriber worker started for trackable {}", self.tracking_id);

        while let Some(event) = events.recv().await {
            tracing::debug!(
                "Trackable {}: processing {} while {:?}",
                self.tracking_id,
                event.name(),
                self.state
            );

            match event {
                Event::Start(completion) => self.start(completion),
                Event::Stop(completion) => self.stop(completion),
                Event::ChangeResolution {
                    resolution,
                    completion,
                } => self.change_resolution(resolution, completion),
                Event::ConnectionClosed(completion) => self.connection_closed(completion),
                Event::StopFailed { error, completion } => self.stop_failure(error, completion),
                Event::ClientConnectionStateChanged(state) => {
                    let changed = self.connection.set_client_state(state);
                    self.publish_status(changed);
                }
                Event::ChannelConnectionStateChanged(state) => {
                    let changed = self.connection.set_channel_state(state);
                    self.publish_status(changed);
                }
                Event::PresenceUpdate(presence) => self.presence_update(&presence),
                Event::EnhancedLocationReceived(update) => {
                    self.dispatcher.notify(DelegateEvent::EnhancedLocation(update))
                }
                Event::RawLocationReceived(location) => {
                    self.dispatcher.notify(DelegateEvent::RawLocation(location))
                }
                Event::TransportFailed(error) => {
                    tracing::warn!("Trackable {}: transport failure: {}", self.tracking_id, error);
                    self.dispatcher
                        .notify(DelegateEvent::Error(TrackingError::Transport(error)));
                }
                Event::Shutdown => {
                    self.shutdown().await;
                    break;
                }
            }
        }

        tracing::info!(
            "Subscriber worker for trackable {} shut down (last status {})",
            self.tracking_id,
            self.connection.last_emitted()
        );
    }

    fn set_state(&mut self, state: SubscriberState) {
        tracing::info!(
            "Trackable {}: subscriber {:?} -> {:?}",
            self.tracking_id,
            self.state,
            state
        );
        self.state = state;
    }

    /// Not guarded by the lifecycle: a stopped subscriber can be started again.
    fn start(&self, completion: Completion) {
        let transport = Arc::clone(&self.transport);
        let tracking_id = self.tracking_id.clone();

        tokio::spawn(async move {
            let result = transport.start().await;
            if let Err(e) = &result {
                tracing::warn!("Trackable {}: transport start failed: {}", tracking_id, e);
            }
            completion.resolve(result.map_err(TrackingError::from));
        });
    }

    fn stop(&mut self, completion: Completion) {
        if self.state.is_stopping_or_stopped() {
            tracing::debug!(
                "Trackable {}: stop requested while {:?}, nothing to do",
                self.tracking_id,
                self.state
            );
            completion.resolve(Ok(()));
            return;
        }

        self.set_state(SubscriberState::Stopping);

        let transport = Arc::clone(&self.transport);
        let queue = self.queue.clone();
        let tracking_id = self.tracking_id.clone();

        tokio::spawn(async move {
            match transport.stop().await {
                Ok(()) => {
                    if queue.send(Event::ConnectionClosed(completion)).is_err() {
                        tracing::debug!("Trackable {}: worker gone before stop finished", tracking_id);
                    }
                }
                Err(error) => {
                    if queue.send(Event::StopFailed { error, completion }).is_err() {
                        tracing::debug!("Trackable {}: worker gone before stop finished", tracking_id);
                    }
                }
            }
        });
    }

    fn connection_closed(&mut self, completion: Completion) {
        self.stop_failed = false;
        self.set_state(SubscriberState::Stopped);
        completion.resolve(Ok(()));
    }

    /// Stays in Stopping; a later stop() is a no-op.
    fn stop_failure(&mut self, error: TransportError, completion: Completion) {
        tracing::warn!("Trackable {}: transport stop failed: {}", self.tracking_id, error);
        self.stop_failed = true;
        completion.resolve(Err(error.into()));
    }

    fn change_resolution(&self, resolution: Option<Resolution>, completion: Completion) {
        if self.state.is_stopping_or_stopped() {
            completion.resolve(Err(TrackingError::SubscriberStopped));
            return;
        }

        let transport = Arc::clone(&self.transport);
        let tracking_id = self.tracking_id.clone();

        tokio::spawn(async move {
            let result = transport.send_resolution_preference(resolution).await;
            if let Err(e) = &result {
                tracing::warn!(
                    "Trackable {}: sending resolution preference failed: {}",
                    tracking_id,
                    e
                );
            }
            completion.resolve(result.map_err(TrackingError::from));
        });
    }

    fn presence_update(&mut self, presence: &PresenceMessage) {
        tracing::debug!(
            "Trackable {}: presence {:?} from {} ({:?})",
            self.tracking_id,
            presence.action,
            presence.client_id,
            presence.data.client_type
        );
        let changed = self.connection.apply_presence(presence);
        self.publish_status(changed);
    }

    fn publish_status(&self, changed: Option<TrackableConnectionStatus>) {
        let Some(status) = changed else {
            return;
        };

        tracing::info!("Trackable {} is now {}", self.tracking_id, status);
        self.status_tx.send_replace(status);
        self.dispatcher
            .notify(DelegateEvent::ConnectionStatusChanged(status));
    }

    /// Detaches the transport unless a stop already did
    async fn shutdown(&mut self) {
        let detach = match self.state {
            SubscriberState::Working => true,
            SubscriberState::Stopping => self.stop_failed,
            SubscriberState::Stopped => false,
        };
        if !detach {
            return;
        }

        tracing::debug!("Trackable {}: stopping transport on shutdown", self.tracking_id);
        if let Err(e) = self.transport.stop().await {
            tracing::warn!(
                "Trackable {}: transport stop on shutdown failed: {}",
                self.tracking_id,
                e
            );
        }
    }
}

