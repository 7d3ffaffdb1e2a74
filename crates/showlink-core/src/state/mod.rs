//! State management for showlink.
//!
//! # Architecture
//!
//! - [`Snapshot`] - Everything known about the show controller
//! - [`StateManager`] - Thread-safe snapshot access

mod manager;
mod model;

pub use manager::StateManager;
pub(crate) use model::name_at;
pub use model::{
    ConnectionState, PlayAudio12State, SetlistState, SettingsMirror, Snapshot, TimecodeState,
    TransportState,
};
