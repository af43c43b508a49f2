//! Builder for configuring and starting a [`Subscriber`]
//!
//! Every option returns a new builder and leaves the original untouched, so a
//! partially configured builder can be reused as a template:
//!
//! ```rust,ignore
//! use asset_tracking_subscriber::{ConnectionConfiguration, LocalRealtime, SubscriberBuilder};
//!
//! let base = SubscriberBuilder::new()
//!     .connection(ConnectionConfiguration::new("key:secret", "dispatch-desk"))
//!     .transport(LocalRealtime::new());
//!
//! let first = base.tracking_id("order-1").start(|result| println!("order-1: {:?}", result))?;
//! let second = base.tracking_id("order-2").start(|result| println!("order-2: {:?}", result))?;
//! ```

use std::sync::{Arc, Weak};

use tokio::sync::{mpsc, watch};

use asset_tracking_core::{
    logging, ConnectionConfiguration, LogConfiguration, Resolution, TrackableConnectionStatus,
};
use asset_tracking_transport::{TransportEventSink, TransportFactory, TransportParams};

use crate::delegate::SubscriberDelegate;
use crate::dispatch::{CallbackDispatcher, CallbackExecutor, CallbackQueue};
use crate::error::{Result, TrackingError};
use crate::event::Event;
use crate::subscriber::Subscriber;
use crate::worker::{spawn_subscriber_worker, SubscriberWorker};

/// Immutable-step builder for [`Subscriber`]
///
/// Mandatory options:
/// - [`connection`](Self::connection)
/// - [`tracking_id`](Self::tracking_id)
/// - [`transport`](Self::transport)
#[derive(Clone, Default)]
pub struct SubscriberBuilder {
    connection: Option<ConnectionConfiguration>,
    log: Option<LogConfiguration>,
    tracking_id: Option<String>,
    resolution: Option<Resolution>,
    delegate: Option<Weak<dyn SubscriberDelegate>>,
    transport: Option<Arc<dyn TransportFactory>>,
    callback_executor: Option<Arc<dyn CallbackExecutor>>,
}

impl SubscriberBuilder {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn connection(&self, configuration: ConnectionConfiguration) -> Self {
        Self {
            connection: Some(configuration),
            ..self.clone()
        }
    }

    /// Installs a global `tracing` subscriber on start, unless one exists
    pub fn log(&self, configuration: LogConfiguration) -> Self {
        Self {
            log: Some(configuration),
            ..self.clone()
        }
    }

    pub fn tracking_id(&self, tracking_id: impl Into<String>) -> Self {
        Self {
            tracking_id: Some(tracking_id.into()),
            ..self.clone()
        }
    }

    /// Initial resolution preference sent when the transport starts
    pub fn resolution(&self, resolution: Resolution) -> Self {
        Self {
            resolution: Some(resolution),
            ..self.clone()
        }
    }

    /// Registers a delegate without taking ownership of it
    pub fn delegate<D>(&self, delegate: &Arc<D>) -> Self
    where
        D: SubscriberDelegate + 'static,
    {
        let weak = Arc::downgrade(delegate);
        let weak: Weak<dyn SubscriberDelegate> = weak;
        Self {
            delegate: Some(weak),
            ..self.clone()
        }
    }

    pub fn transport<T>(&self, factory: T) -> Self
    where
        T: TransportFactory + 'static,
    {
        Self {
            transport: Some(Arc::new(factory)),
            ..self.clone()
        }
    }

    /// Context that completions and delegate calls run on
    ///
    /// Defaults to a dedicated callback thread per subscriber.
    pub fn callback_executor<E>(&self, executor: E) -> Self
    where
        E: CallbackExecutor + 'static,
    {
        Self {
            callback_executor: Some(Arc::new(executor)),
            ..self.clone()
        }
    }

    /// Validates the configuration, builds the subscriber and starts it
    ///
    /// Missing options are reported here, before any transport or thread is
    /// created. The error is returned and also passed to `completion`, on the
    /// configured callback executor if there is one, else on the calling
    /// thread. Otherwise the subscriber is returned immediately and
    /// `completion` receives the outcome of the initial start.
    pub fn start<F>(&self, completion: F) -> Result<Subscriber>
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        let (connection, tracking_id, factory) = match self.validate() {
            Ok(parts) => parts,
            Err(error) => {
                tracing::warn!("Subscriber not started: {}", error);
                self.reject(completion, error.clone());
                return Err(error);
            }
        };

        if let Some(log) = self.log {
            if !logging::is_initialized() {
                if let Err(e) = logging::init_logging(log.mode) {
                    tracing::debug!("Logging not initialized: {}", e);
                }
            }
        }

        let executor: Arc<dyn CallbackExecutor> = match &self.callback_executor {
            Some(executor) => Arc::clone(executor),
            None => match CallbackQueue::spawn(format!("asset-tracking-callbacks-{}", tracking_id))
            {
                Ok(queue) => Arc::new(queue),
                Err(e) => {
                    let error = TrackingError::WorkerSpawn(e.to_string());
                    self.reject(completion, error.clone());
                    return Err(error);
                }
            },
        };
        let dispatcher = CallbackDispatcher::new(executor, self.delegate.clone());
        // From here on a failure resolves the completion through the dispatcher.
        let completion = dispatcher.completion(completion);

        let (queue_tx, queue_rx) = mpsc::unbounded_channel();
        let sink_tx = queue_tx.clone();
        let sink = TransportEventSink::new(move |event| sink_tx.send(Event::from(event)).is_ok());

        let params = TransportParams {
            connection,
            tracking_id: tracking_id.clone(),
            resolution: self.resolution,
        };
        let transport = match factory.create(params, sink) {
            Ok(transport) => transport,
            Err(e) => {
                let error = TrackingError::from(e);
                completion.resolve(Err(error.clone()));
                return Err(error);
            }
        };

        let (status_tx, status_rx) = watch::channel(TrackableConnectionStatus::Offline);
        let worker = SubscriberWorker::new(
            tracking_id.clone(),
            transport,
            dispatcher.clone(),
            queue_tx.clone(),
            status_tx,
        );
        let handle = match spawn_subscriber_worker(worker, queue_rx) {
            Ok(handle) => handle,
            Err(e) => {
                let error = TrackingError::WorkerSpawn(e.to_string());
                completion.resolve(Err(error.clone()));
                return Err(error);
            }
        };

        tracing::info!("Subscriber for trackable {} created", tracking_id);

        if queue_tx.send(Event::Start(completion)).is_err() {
            tracing::warn!("Trackable {}: worker exited before the initial start", tracking_id);
        }
        Ok(Subscriber::new(tracking_id, queue_tx, dispatcher, status_rx, handle))
    }

    fn validate(&self) -> Result<(ConnectionConfiguration, String, Arc<dyn TransportFactory>)> {
        let connection = self
            .connection
            .clone()
            .ok_or(TrackingError::IncompleteConfiguration {
                missing_property: "ConnectionConfiguration",
                builder_option: "connection",
            })?;
        let tracking_id = self
            .tracking_id
            .clone()
            .ok_or(TrackingError::IncompleteConfiguration {
                missing_property: "TrackingId",
                builder_option: "tracking_id",
            })?;
        let factory = self
            .transport
            .clone()
            .ok_or(TrackingError::IncompleteConfiguration {
                missing_property: "TransportFactory",
                builder_option: "transport",
            })?;
        Ok((connection, tracking_id, factory))
    }

    /// Fails `completion` before any callback thread exists
    fn reject<F>(&self, completion: F, error: TrackingError)
    where
        F: FnOnce(Result<()>) + Send + 'static,
    {
        match &self.callback_executor {
            Some(executor) => executor.execute(Box::new(move || completion(Err(error)))),
            None => completion(Err(error)),
        }
    }
}
