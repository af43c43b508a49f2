//! The transport trait driven by the subscriber core

use std::sync::Arc;

use async_trait::async_trait;

use asset_tracking_core::{ConnectionConfiguration, Resolution};

use crate::error::Result;
use crate::event::TransportEventSink;

/// Subscriber-side view of a realtime pub/sub connection for one trackable
///
/// Implementations report state changes, presence and locations through the
/// [`TransportEventSink`] they were created with. The methods here only return
/// once the service has acknowledged the request.
#[async_trait]
pub trait SubscriberTransport: Send + Sync {
    /// Connects, attaches to the trackable's channel and enters presence
    async fn start(&self) -> Result<()>;

    /// Leaves presence and detaches from the channel
    async fn stop(&self) -> Result<()>;

    /// Publishes this subscriber's preferred resolution to the publisher
    async fn send_resolution_preference(&self, resolution: Option<Resolution>) -> Result<()>;
}

/// Everything a factory needs to build a transport for one subscriber
#[derive(Debug, Clone)]
pub struct TransportParams {
    pub connection: ConnectionConfiguration,
    pub tracking_id: String,
    pub resolution: Option<Resolution>,
}

/// Builds transports for subscriber builders
///
/// Implemented for closures with the matching signature.
pub trait TransportFactory: Send + Sync {
    fn create(
        &self,
        params: TransportParams,
        events: TransportEventSink,
    ) -> Result<Arc<dyn SubscriberTransport>>;
}

impl<F> TransportFactory for F
where
    F: Fn(TransportParams, TransportEventSink) -> Result<Arc<dyn SubscriberTransport>>
        + Send
        + Sync,
{
    fn create(
        &self,
        params: TransportParams,
        events: TransportEventSink,
    ) -> Result<Arc<dyn SubscriberTransport>> {
        self(params, events)
    }
}
