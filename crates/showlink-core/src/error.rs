//! Error types for showlink

use thiserror::Error;

/// Result type alias for showlink operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while bridging the show controller
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration is unusable; no connection attempt is made
    #[error("Configuration error: {0}")]
    Config(String),

    /// The local listening socket could not be bound
    #[error("Could not listen on {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// Sending to a remote failed
    #[error("Failed to send to {addr}: {source}")]
    Send {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    /// A raw OSC command string could not be parsed
    #[error("Invalid OSC command: {0}")]
    InvalidCommand(String),

    /// OSC encoding/decoding error
    #[error("OSC error: {0:?}")]
    Osc(rosc::OscError),

    /// The runtime thread is gone
    #[error("Runtime channel closed")]
    ChannelClosed,

    /// IO error
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// TOML parsing error
    #[error("TOML parse error: {0}")]
    TomlParse(#[from] toml::de::Error),

    /// TOML serialization error
    #[error("TOML serialization error: {0}")]
    TomlSerialize(#[from] toml::ser::Error),
}

impl From<rosc::OscError> for Error {
    fn from(err: rosc::OscError) -> Self {
        Error::Osc(err)
    }
}

impl Error {
    /// Whether this error should surface as a "bad configuration" status.
    pub fn is_config(&self) -> bool {
        matches!(self, Error::Config(_) | Error::TomlParse(_))
    }
}
