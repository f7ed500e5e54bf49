//! Vinco review and edit event bus.
//!
//! - [`EventBus`] -- in-process publish/subscribe hub backed by
//!   `tokio::sync::broadcast`.
//! - [`ReviewEvent`] -- the event envelope published by the API layer.
//! - [`event_types`] -- the closed set of event names.
//! - [`EventLogger`] -- background subscriber that writes every event to the
//!   structured log.

pub mod bus;
pub mod event_types;
pub mod logger;

pub use bus::{EventBus, ReviewEvent};
pub use logger::EventLogger;
