//! # Asset Tracking Transport
//!
//! The narrow interface between the subscriber core and a realtime pub/sub
//! service.
//!
//! - [`SubscriberTransport`]: async operations the core drives (attach, detach,
//!   send a resolution preference)
//! - [`TransportEvent`] / [`TransportEventSink`]: callbacks flowing back into
//!   the core
//! - [`TransportFactory`]: how a subscriber builder obtains a transport
//!
//! [`local::LocalRealtime`] implements all of the above in-process. It is
//! useful for tests, demos and running a publisher and subscribers in the same
//! process.

pub mod error;
pub mod event;
pub mod local;
pub mod transport;

pub use error::{Result, TransportError};
pub use event::{TransportEvent, TransportEventSink};
pub use local::{LocalOperation, LocalPublisher, LocalRealtime};
pub use transport::{SubscriberTransport, TransportFactory, TransportParams};

/// Name of the channel carrying a trackable's messages and presence
pub fn channel_name(tracking_id: &str) -> String {
    format!("tracking:{}", tracking_id)
}
