//! In-process realtime hub
//!
//! [`LocalRealtime`] routes messages and presence between publishers and
//! subscribers that live in the same process. Channels, presence members and
//! attachments are kept in one shared table. Presence data is stored as JSON,
//! the same way it would travel over a real channel.
//!
//! Events are collected while the table is locked and delivered to sinks after
//! the lock is released.

mod subscriber;

use std::collections::HashMap;
use std::sync::Arc;

use parking_lot::Mutex;

use asset_tracking_core::{
    ClientType, ConnectionState, EnhancedLocationUpdate, Location, PresenceAction, PresenceData,
    PresenceMessage, Resolution,
};

use crate::error::{Result, TransportError};
use crate::event::{TransportEvent, TransportEventSink};
use crate::transport::{SubscriberTransport, TransportFactory, TransportParams};

pub use subscriber::LocalSubscriberTransport;

/// Subscriber transport operations that can be made to fail on purpose
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum LocalOperation {
    Start,
    Stop,
    SendResolution,
}

type Outbox = Vec<(TransportEventSink, TransportEvent)>;

struct Attachment {
    client_id: String,
    sink: TransportEventSink,
}

struct Channel {
    state: ConnectionState,
    /// Presence members by client id, data kept as JSON
    members: HashMap<String, String>,
    attachments: HashMap<u64, Attachment>,
}

impl Default for Channel {
    fn default() -> Self {
        Self {
            state: ConnectionState::Online,
            members: HashMap::new(),
            attachments: HashMap::new(),
        }
    }
}

impl Channel {
    fn broadcast(&self, outbox: &mut Outbox, event: &TransportEvent, except: Option<u64>) {
        for (id, attachment) in &self.attachments {
            if Some(*id) != except {
                outbox.push((attachment.sink.clone(), event.clone()));
            }
        }
    }
}

#[derive(Default)]
struct Hub {
    next_attachment: u64,
    channels: HashMap<String, Channel>,
    pending_failures: HashMap<LocalOperation, TransportError>,
}

/// Shared handle to an in-process realtime service
///
/// Cloning is cheap and every clone sees the same channels.
#[derive(Clone, Default)]
pub struct LocalRealtime {
    hub: Arc<Mutex<Hub>>,
}

impl LocalRealtime {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns a publisher handle for a trackable
    pub fn publisher(&self, tracking_id: &str) -> LocalPublisher {
        self.publisher_with_client_id(tracking_id, format!("publisher:{}", tracking_id))
    }

    pub fn publisher_with_client_id(
        &self,
        tracking_id: &str,
        client_id: impl Into<String>,
    ) -> LocalPublisher {
        LocalPublisher {
            realtime: self.clone(),
            channel: crate::channel_name(tracking_id),
            client_id: client_id.into(),
        }
    }

    /// Makes the next call of `operation` by any local subscriber transport fail
    pub fn fail_next(&self, operation: LocalOperation, error: TransportError) {
        self.hub.lock().pending_failures.insert(operation, error);
    }

    /// Reports a client connection change to every attachment of `client_id`
    pub fn set_client_state(&self, client_id: &str, state: ConnectionState) {
        let mut outbox = Outbox::new();
        {
            let hub = self.hub.lock();
            for channel in hub.channels.values() {
                for attachment in channel.attachments.values() {
                    if attachment.client_id == client_id {
                        outbox.push((
                            attachment.sink.clone(),
                            TransportEvent::ClientConnectionStateChanged(state),
                        ));
                    }
                }
            }
        }
        tracing::debug!("Client {} is now {} ({} attachments)", client_id, state, outbox.len());
        deliver(outbox);
    }

    /// Changes a trackable channel's state and tells everyone attached to it
    pub fn set_channel_state(&self, tracking_id: &str, state: ConnectionState) {
        let mut outbox = Outbox::new();
        {
            let mut hub = self.hub.lock();
            let channel = hub.channels.entry(crate::channel_name(tracking_id)).or_default();
            channel.state = state;
            channel.broadcast(
                &mut outbox,
                &TransportEvent::ChannelConnectionStateChanged(state),
                None,
            );
        }
        deliver(outbox);
    }

    /// Reports an asynchronous transport failure on a trackable's channel
    pub fn emit_failure(&self, tracking_id: &str, error: TransportError) {
        self.broadcast(tracking_id, TransportEvent::Failed(error));
    }

    /// Number of subscriber transports attached to a trackable's channel
    pub fn attachment_count(&self, tracking_id: &str) -> usize {
        self.hub
            .lock()
            .channels
            .get(&crate::channel_name(tracking_id))
            .map_or(0, |c| c.attachments.len())
    }

    fn broadcast(&self, tracking_id: &str, event: TransportEvent) -> usize {
        let mut outbox = Outbox::new();
        {
            let hub = self.hub.lock();
            if let Some(channel) = hub.channels.get(&crate::channel_name(tracking_id)) {
                channel.broadcast(&mut outbox, &event, None);
            }
        }
        let count = outbox.len();
        deliver(outbox);
        count
    }

    fn take_failure(hub: &mut Hub, operation: LocalOperation) -> Result<()> {
        match hub.pending_failures.remove(&operation) {
            Some(error) => {
                tracing::debug!("Injected failure for {:?}: {}", operation, error);
                Err(error)
            }
            None => Ok(()),
        }
    }

    pub(crate) fn attach(
        &self,
        channel_name: &str,
        client_id: &str,
        data: &PresenceData,
        sink: TransportEventSink,
    ) -> Result<u64> {
        let json = data
            .to_json()
            .map_err(|e| TransportError::Presence(e.to_string()))?;

        let mut outbox = Outbox::new();
        let id = {
            let mut guard = self.hub.lock();
            let hub = &mut *guard;
            Self::take_failure(hub, LocalOperation::Start)?;

            hub.next_attachment += 1;
            let id = hub.next_attachment;
            let channel = hub.channels.entry(channel_name.to_string()).or_default();

            outbox.push((
                sink.clone(),
                TransportEvent::ClientConnectionStateChanged(ConnectionState::Online),
            ));
            outbox.push((
                sink.clone(),
                TransportEvent::ChannelConnectionStateChanged(channel.state),
            ));
            for (member_id, member_json) in &channel.members {
                if member_id != client_id {
                    outbox.push((
                        sink.clone(),
                        decode_member(PresenceAction::Present, member_id, member_json),
                    ));
                }
            }
            channel.broadcast(
                &mut outbox,
                &decode_member(PresenceAction::Enter, client_id, &json),
                None,
            );

            channel.members.insert(client_id.to_string(), json);
            channel.attachments.insert(
                id,
                Attachment {
                    client_id: client_id.to_string(),
                    sink,
                },
            );
            id
        };

        tracing::debug!("Attachment {} joined {} as {}", id, channel_name, client_id);
        deliver(outbox);
        Ok(id)
    }

    pub(crate) fn detach(&self, channel_name: &str, attachment_id: u64) -> Result<()> {
        let mut outbox = Outbox::new();
        {
            let mut guard = self.hub.lock();
            let hub = &mut *guard;
            Self::take_failure(hub, LocalOperation::Stop)?;

            let Some(channel) = hub.channels.get_mut(channel_name) else {
                return Ok(());
            };
            let Some(attachment) = channel.attachments.remove(&attachment_id) else {
                return Ok(());
            };

            outbox.push((
                attachment.sink.clone(),
                TransportEvent::ChannelConnectionStateChanged(ConnectionState::Offline),
            ));
            outbox.push((
                attachment.sink.clone(),
                TransportEvent::ClientConnectionStateChanged(ConnectionState::Offline),
            ));

            let still_attached = channel
                .attachments
                .values()
                .any(|a| a.client_id == attachment.client_id);
            if !still_attached {
                if let Some(json) = channel.members.remove(&attachment.client_id) {
                    channel.broadcast(
                        &mut outbox,
                        &decode_member(PresenceAction::Leave, &attachment.client_id, &json),
                        None,
                    );
                }
            }
        }

        tracing::debug!("Attachment {} left {}", attachment_id, channel_name);
        deliver(outbox);
        Ok(())
    }

    pub(crate) fn update_presence(
        &self,
        channel_name: &str,
        attachment_id: u64,
        data: &PresenceData,
    ) -> Result<()> {
        let json = data
            .to_json()
            .map_err(|e| TransportError::Presence(e.to_string()))?;

        let mut outbox = Outbox::new();
        {
            let mut guard = self.hub.lock();
            let hub = &mut *guard;
            Self::take_failure(hub, LocalOperation::SendResolution)?;

            let channel = hub
                .channels
                .get_mut(channel_name)
                .ok_or(TransportError::Closed)?;
            let client_id = channel
                .attachments
                .get(&attachment_id)
                .map(|a| a.client_id.clone())
                .ok_or(TransportError::Closed)?;

            channel.broadcast(
                &mut outbox,
                &decode_member(PresenceAction::Update, &client_id, &json),
                Some(attachment_id),
            );
            channel.members.insert(client_id, json);
        }

        deliver(outbox);
        Ok(())
    }
}

impl TransportFactory for LocalRealtime {
    fn create(
        &self,
        params: TransportParams,
        events: TransportEventSink,
    ) -> Result<Arc<dyn SubscriberTransport>> {
        Ok(Arc::new(LocalSubscriberTransport::new(
            self.clone(),
            params,
            events,
        )))
    }
}

/// Publisher side of a trackable on a [`LocalRealtime`]
#[derive(Clone)]
pub struct LocalPublisher {
    realtime: LocalRealtime,
    channel: String,
    client_id: String,
}

impl LocalPublisher {
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Enters presence as a publisher
    pub fn enter(&self) -> Result<()> {
        self.set_presence(Some(PresenceData::new(ClientType::Publisher)))
    }

    /// Leaves presence; does nothing if not present
    pub fn leave(&self) -> Result<()> {
        self.set_presence(None)
    }

    /// Publishes an enhanced location, returning how many subscribers got it
    pub fn publish_enhanced_location(&self, update: EnhancedLocationUpdate) -> usize {
        self.publish(TransportEvent::EnhancedLocationReceived(update))
    }

    /// Publishes a raw location, returning how many subscribers got it
    pub fn publish_raw_location(&self, location: Location) -> usize {
        self.publish(TransportEvent::RawLocationReceived(location))
    }

    /// Resolutions currently requested by subscribers present on the channel
    pub fn requested_resolutions(&self) -> Vec<Option<Resolution>> {
        let hub = self.realtime.hub.lock();
        let Some(channel) = hub.channels.get(&self.channel) else {
            return Vec::new();
        };

        channel
            .members
            .values()
            .filter_map(|json| PresenceData::from_json(json).ok())
            .filter(|data| data.client_type == ClientType::Subscriber)
            .map(|data| data.resolution)
            .collect()
    }

    fn publish(&self, event: TransportEvent) -> usize {
        let mut outbox = Outbox::new();
        {
            let hub = self.realtime.hub.lock();
            if let Some(channel) = hub.channels.get(&self.channel) {
                channel.broadcast(&mut outbox, &event, None);
            }
        }
        let count = outbox.len();
        deliver(outbox);
        count
    }

    fn set_presence(&self, data: Option<PresenceData>) -> Result<()> {
        let json = data
            .map(|d| d.to_json())
            .transpose()
            .map_err(|e| TransportError::Presence(e.to_string()))?;

        let mut outbox = Outbox::new();
        {
            let mut hub = self.realtime.hub.lock();
            let channel = hub.channels.entry(self.channel.clone()).or_default();
            match json {
                Some(json) => {
                    channel.broadcast(
                        &mut outbox,
                        &decode_member(PresenceAction::Enter, &self.client_id, &json),
                        None,
                    );
                    channel.members.insert(self.client_id.clone(), json);
                }
                None => {
                    if let Some(json) = channel.members.remove(&self.client_id) {
                        channel.broadcast(
                            &mut outbox,
                            &decode_member(PresenceAction::Leave, &self.client_id, &json),
                            None,
                        );
                    }
                }
            }
        }

        deliver(outbox);
        Ok(())
    }
}

fn decode_member(action: PresenceAction, client_id: &str, json: &str) -> TransportEvent {
    match PresenceData::from_json(json) {
        Ok(data) => TransportEvent::PresenceUpdate(PresenceMessage::new(action, client_id, data)),
        Err(e) => TransportEvent::Failed(TransportError::InvalidPresenceData {
            client_id: client_id.to_string(),
            reason: e.to_string(),
        }),
    }
}

fn deliver(outbox: Outbox) {
    for (sink, event) in outbox {
        sink.emit(event);
    }
}
