//! showlink runtime - runs a session on its own thread.
//!
//! The runtime manages:
//! - The listening socket and its receive thread
//! - The remotes commands are sent to
//! - The session thread driving timers and dispatch

pub mod thread;

pub use thread::{Runtime, RuntimeHandle};
