//! showlink - headless control host for a show controller
//!
//! Runs a bridge session against the configured show controller and
//! reports its projected variables and connection status. Also dumps the
//! preset and variable tables, and sends one-off OSC commands.
//!
//! # Usage as a Library
//!
//! ```no_run
//! use showlink_cli::LogSink;
//! use showlink_core::{Config, Runtime};
//!
//! let config = Config::load_or_default();
//! let runtime = Runtime::start(&config, LogSink::new(true)).unwrap();
//! runtime.shutdown();
//! ```

pub mod sink;

pub use sink::LogSink;
