//! Streaming coordination core
//!
//! This module provides the mode-aware state machine that multiplexes
//! worker-produced audio chunks to one of two consumers:
//! - `Coordinator` — the 3-state mode machine and session owner
//! - `Dispatcher` — the event router and backpressure relay
//! - `ControlsView` — pure projection of published state for a UI layer
//! - `PipelineSnapshot` — the serializable published state itself

pub mod config;
pub mod controls;
pub mod coordinator;
pub mod dispatcher;
pub mod stats;

pub use config::SessionSettings;
pub use controls::{ControlState, ControlsView};
pub use coordinator::{Coordinator, Mode};
pub use dispatcher::Dispatcher;
pub use stats::PipelineSnapshot;
