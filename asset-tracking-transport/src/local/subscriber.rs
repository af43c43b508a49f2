//! Subscriber transport backed by a [`LocalRealtime`]

use async_trait::async_trait;
use parking_lot::Mutex;

use asset_tracking_core::{ClientType, ConnectionConfiguration, PresenceData, Resolution};

use super::LocalRealtime;
use crate::error::{Result, TransportError};
use crate::event::TransportEventSink;
use crate::transport::{SubscriberTransport, TransportParams};

struct AttachmentState {
    attachment: Option<u64>,
    resolution: Option<Resolution>,
}

/// A subscriber's connection to one trackable channel on a [`LocalRealtime`]
pub struct LocalSubscriberTransport {
    realtime: LocalRealtime,
    channel: String,
    connection: ConnectionConfiguration,
    sink: TransportEventSink,
    state: Mutex<AttachmentState>,
}

impl LocalSubscriberTransport {
    pub fn new(realtime: LocalRealtime, params: TransportParams, sink: TransportEventSink) -> Self {
        Self {
            realtime,
            channel: crate::channel_name(&params.tracking_id),
            connection: params.connection,
            sink,
            state: Mutex::new(AttachmentState {
                attachment: None,
                resolution: params.resolution,
            }),
        }
    }

    pub fn is_attached(&self) -> bool {
        self.state.lock().attachment.is_some()
    }
}

#[async_trait]
impl SubscriberTransport for LocalSubscriberTransport {
    async fn start(&self) -> Result<()> {
        if self.connection.api_key.trim().is_empty() {
            return Err(TransportError::Connection("no API key configured".to_string()));
        }

        let mut state = self.state.lock();
        if state.attachment.is_some() {
            return Ok(());
        }

        let data = PresenceData::with_resolution(ClientType::Subscriber, state.resolution);
        let id = self.realtime.attach(
            &self.channel,
            &self.connection.client_id,
            &data,
            self.sink.clone(),
        )?;
        state.attachment = Some(id);
        Ok(())
    }

    async fn stop(&self) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(id) = state.attachment {
            self.realtime.detach(&self.channel, id)?;
            state.attachment = None;
        }
        Ok(())
    }

    async fn send_resolution_preference(&self, resolution: Option<Resolution>) -> Result<()> {
        let mut state = self.state.lock();
        if let Some(id) = state.attachment {
            let data = PresenceData::with_resolution(ClientType::Subscriber, resolution);
            self.realtime.update_presence(&self.channel, id, &data)?;
        }
        // Picked up by the next start when not attached.
        state.resolution = resolution;
        Ok(())
    }
}
