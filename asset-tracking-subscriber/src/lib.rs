//! # Asset Tracking Subscriber
//!
//! Follow a trackable's live location from the receiving side.
//!
//! A [`Subscriber`] attaches to the trackable's channel through a
//! [`SubscriberTransport`], turns connection and presence changes into a
//! single [`TrackableConnectionStatus`] and hands location updates to a
//! [`SubscriberDelegate`].
//!
//! ## Quick start
//!
//! ```rust,ignore
//! use std::sync::Arc;
//! use asset_tracking_subscriber::prelude::*;
//!
//! struct Printer;
//!
//! impl SubscriberDelegate for Printer {
//!     fn on_enhanced_location(&self, update: &EnhancedLocationUpdate) {
//!         println!("{:?}", update.location);
//!     }
//! }
//!
//! let realtime = LocalRealtime::new();
//! let printer = Arc::new(Printer);
//!
//! let subscriber = SubscriberBuilder::new()
//!     .connection(ConnectionConfiguration::new("key:secret", "dispatch-desk"))
//!     .tracking_id("order-42")
//!     .delegate(&printer)
//!     .transport(realtime.clone())
//!     .start(|result| println!("started: {:?}", result))?;
//! ```
//!
//! ## Threading
//!
//! Each subscriber owns a worker thread that applies requests and transport
//! callbacks one at a time, in arrival order. Completions and delegate calls
//! never run on that thread; they go to the [`CallbackExecutor`] configured on
//! the builder, by default a dedicated [`CallbackQueue`].

pub mod builder;
pub mod delegate;
pub mod dispatch;
pub mod error;
mod event;
mod state;
pub mod subscriber;
mod worker;

pub use builder::SubscriberBuilder;
pub use delegate::SubscriberDelegate;
pub use dispatch::{CallbackExecutor, CallbackQueue, Job};
pub use error::{ErrorKind, Result, TrackingError};
pub use subscriber::Subscriber;

pub use asset_tracking_core::{
    logging, Accuracy, ConnectionConfiguration, ConnectionState, EnhancedLocationUpdate,
    LogConfiguration, Location, LocationUpdateType, LoggingMode, Resolution,
    TrackableConnectionStatus,
};
pub use asset_tracking_transport::{
    LocalPublisher, LocalRealtime, SubscriberTransport, TransportError, TransportEvent,
    TransportEventSink, TransportFactory, TransportParams,
};

/// Everything needed to configure and run a subscriber
pub mod prelude {
    pub use crate::{
        Accuracy, ConnectionConfiguration, EnhancedLocationUpdate, LocalRealtime, Location,
        LogConfiguration, LoggingMode, Resolution, Subscriber, SubscriberBuilder,
        SubscriberDelegate, TrackableConnectionStatus, TrackingError,
    };
}
