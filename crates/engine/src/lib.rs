//! The deskflow request lifecycle engine.
//!
//! Wires the pure core logic to a store and a notifier, serializes every
//! mutation, and drives the periodic sweep. The surrounding application
//! owns identity, rendering, and notification delivery.

pub mod background;
pub mod config;
pub mod engine;
pub mod error;
pub mod notify;

pub use config::EngineConfig;
pub use engine::RequestEngine;
pub use error::EngineError;
pub use notify::{MemoryNotifier, Notifier, TracingNotifier};
