//! Presence messages exchanged on a trackable's channel
//!
//! Publishers and subscribers both enter presence on the channel. Each member
//! attaches a [`PresenceData`] payload, which travels as JSON.

use serde::{Deserialize, Serialize};

use crate::resolution::Resolution;

/// Which side of the tracking relationship a presence member is on
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ClientType {
    Publisher,
    Subscriber,
}

/// Payload attached to a presence member
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PresenceData {
    #[serde(rename = "type")]
    pub client_type: ClientType,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub resolution: Option<Resolution>,
}

impl PresenceData {
    pub fn new(client_type: ClientType) -> Self {
        Self {
            client_type,
            resolution: None,
        }
    }

    pub fn with_resolution(client_type: ClientType, resolution: Option<Resolution>) -> Self {
        Self {
            client_type,
            resolution,
        }
    }

    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string(self)
    }

    pub fn from_json(json: &str) -> serde_json::Result<Self> {
        serde_json::from_str(json)
    }
}

/// Kind of presence change
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PresenceAction {
    /// Member was already on the channel when we attached
    Present,
    Enter,
    Update,
    Leave,
    /// Member was found missing during a presence sync
    Absent,
}

impl PresenceAction {
    /// Whether the member is on the channel after this action
    pub fn is_present(self) -> bool {
        matches!(
            self,
            PresenceAction::Present | PresenceAction::Enter | PresenceAction::Update
        )
    }
}

/// A presence change observed on a channel
#[derive(Debug, Clone, PartialEq)]
pub struct PresenceMessage {
    pub action: PresenceAction,
    pub client_id: String,
    pub data: PresenceData,
}

impl PresenceMessage {
    pub fn new(action: PresenceAction, client_id: impl Into<String>, data: PresenceData) -> Self {
        Self {
            action,
            client_id: client_id.into(),
            data,
        }
    }

    pub fn is_publisher(&self) -> bool {
        self.data.client_type == ClientType::Publisher
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::resolution::Accuracy;
    use std::time::Duration;

    #[test]
    fn test_publisher_data_json_shape() {
        let json = PresenceData::new(ClientType::Publisher).to_json().unwrap();
        assert_eq!(json, r#"{"type":"PUBLISHER"}"#);
    }

    #[test]
    fn test_subscriber_data_carries_resolution() {
        let resolution = Resolution::new(Accuracy::Low, Duration::from_secs(10), 50.0);
        let data = PresenceData::with_resolution(ClientType::Subscriber, Some(resolution));

        let decoded = PresenceData::from_json(&data.to_json().unwrap()).unwrap();
        assert_eq!(decoded.client_type, ClientType::Subscriber);
        assert_eq!(decoded.resolution, Some(resolution));
    }

    #[test]
    fn test_unknown_client_type_is_rejected() {
        assert!(PresenceData::from_json(r#"{"type":"OBSERVER"}"#).is_err());
    }

    #[test]
    fn test_presence_actions() {
        assert!(PresenceAction::Enter.is_present());
        assert!(PresenceAction::Present.is_present());
        assert!(PresenceAction::Update.is_present());
        assert!(!PresenceAction::Leave.is_present());
        assert!(!PresenceAction::Absent.is_present());
    }
}
