//! showlink Core - State synchronization and feedback engine for a show
//! controller bridged to a control-surface host over OSC.
//!
//! This crate provides the building blocks of the bridge:
//!
//! - **State** - Snapshot of everything the show controller reports
//! - **Dispatcher** - Routes inbound OSC status messages into the snapshot
//! - **Debounce** - Gathers bursts of updates into single recomputations
//! - **Feedback** - Derived button states (loops, queued jumps, progress bars)
//! - **Command** - Button actions encoded as outbound OSC messages
//! - **Supervisor** - Subscribe, heartbeat and reconnect handling
//! - **Projection / Presets** - Host-facing variables and button presets
//! - **Runtime** - Runs a [`Session`] on its own thread
//!
//! # Architecture
//!
//! Inbound OSC flows through the [`Dispatcher`] into the [`Snapshot`]
//! held by the [`StateManager`]; the invalidations it reports are gathered
//! by the debouncers and pushed to a [`ProjectionSink`]. Button presses
//! go the other way: a [`Command`] is encoded against the snapshot and
//! sent to every configured remote. All timer logic takes the current
//! time as an argument, so every component can be driven by a virtual clock.

pub mod coerce;
pub mod colors;
pub mod command;
pub mod config;
pub mod debounce;
pub mod dispatcher;
pub mod error;
pub mod feedback;
pub mod osc;
pub mod osc_command;
pub mod presets;
pub mod progress;
pub mod projection;
pub mod runtime;
pub mod session;
pub mod settings;
pub mod state;
pub mod supervisor;
pub mod timing;
pub mod transport;

// Re-export main types for convenience
pub use command::{Command, JumpTarget, OutboundMessage, Pa12Scene, ProtocolRequest, Target};
pub use config::{Config, ResolvedConfig};
pub use dispatcher::{Dispatch, Dispatcher, Topic};
pub use error::{Error, Result};
pub use feedback::{
    feedback_definitions, Feedback, FeedbackDefinition, FeedbackId, FeedbackValue, QueueDelta,
    SectionRef, StylePatch,
};
pub use osc::{InboundMessage, OscClient, OscListener};
pub use presets::{presets, PresetDefinition};
pub use projection::{ProjectionSink, VariableDefinition, VariableValue, Variables};
pub use runtime::{Runtime, RuntimeHandle};
pub use session::Session;
pub use settings::{Setting, SettingValue};
pub use state::{Snapshot, StateManager};
pub use supervisor::ConnectionStatus;
pub use timing::{HumanPosition, Measure, TimeSignature, Timecode};
pub use transport::{OscOutput, RemoteSet};
