//! # Asset Tracking Core
//!
//! Shared building blocks for the asset tracking SDK crates:
//!
//! - **Domain types**: [`Resolution`], [`Location`], [`EnhancedLocationUpdate`],
//!   [`ConnectionState`], [`TrackableConnectionStatus`] and presence messages
//! - **Configuration**: [`ConnectionConfiguration`] and [`LogConfiguration`]
//! - **Logging**: `tracing-subscriber` initialisation through [`logging`]
//!
//! Nothing in this crate talks to the network. The transport and subscriber
//! crates build on these types.

pub mod config;
pub mod connection;
pub mod error;
pub mod location;
pub mod logging;
pub mod presence;
pub mod resolution;

pub use config::{ConnectionConfiguration, LogConfiguration};
pub use connection::{ConnectionState, TrackableConnectionStatus};
pub use error::ConfigError;
pub use location::{EnhancedLocationUpdate, Location, LocationUpdateType};
pub use logging::{LoggingError, LoggingMode};
pub use presence::{ClientType, PresenceAction, PresenceData, PresenceMessage};
pub use resolution::{Accuracy, Resolution};
