//! Configuration file support for showlink
//!
//! Configuration is stored in TOML format at:
//! - Linux: `~/.config/showlink/config.toml`
//! - macOS: `~/Library/Application Support/showlink/config.toml`
//! - Windows: `%APPDATA%\showlink\config.toml`
//!
//! The raw [`Config`] is what the user edits. [`Config::resolve`] validates it
//! into a [`ResolvedConfig`]; a session never starts from an unresolved config.

use crate::error::{Error, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Port the show controller listens on for commands.
pub const DEFAULT_SERVER_PORT: u16 = 39051;
/// Port we listen on for status updates.
pub const DEFAULT_CLIENT_PORT: u16 = 39052;
/// Interval between subscribe attempts while not connected.
pub const DEFAULT_RETRY_INTERVAL: Duration = Duration::from_millis(2000);
/// Liveness window; no heartbeat for longer than this means disconnected.
pub const DEFAULT_HEARTBEAT_TIMEOUT: Duration = Duration::from_millis(2500);
/// Window for gathering invalidated feedbacks into one recomputation.
pub const DEFAULT_FEEDBACK_DEBOUNCE: Duration = Duration::from_millis(50);
/// Window for composite projections such as next/previous song names.
pub const DEFAULT_PROJECTION_DEBOUNCE: Duration = Duration::from_millis(20);

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Where to find the show controller and where it should send updates
    pub connection: ConnectionSettings,
    /// Timer windows
    pub timing: TimingSettings,
}

/// Connection settings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ConnectionSettings {
    /// One or more comma-separated hostnames/IPs of the show controller
    pub server_host: String,
    /// Command port of the show controller
    pub server_port: u16,
    /// Address the show controller should send updates to (empty = auto)
    pub client_host: String,
    /// Local port to listen on for updates
    pub client_port: String,
    /// Name we register under when subscribing
    pub client_id: String,
    /// Request high-frequency position updates instead of once per beat
    pub fine_updates: bool,
}

impl Default for ConnectionSettings {
    fn default() -> Self {
        Self {
            server_host: "127.0.0.1".to_string(),
            server_port: DEFAULT_SERVER_PORT,
            client_host: "127.0.0.1".to_string(),
            client_port: DEFAULT_CLIENT_PORT.to_string(),
            client_id: "showlink".to_string(),
            fine_updates: false,
        }
    }
}

/// Timer windows as human-readable durations ("2s", "50ms")
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TimingSettings {
    pub retry_interval: String,
    pub heartbeat_timeout: String,
    pub feedback_debounce: String,
    pub projection_debounce: String,
}

impl Default for TimingSettings {
    fn default() -> Self {
        Self {
            retry_interval: "2s".to_string(),
            heartbeat_timeout: "2500ms".to_string(),
            feedback_debounce: "50ms".to_string(),
            projection_debounce: "20ms".to_string(),
        }
    }
}

/// Validated timer windows.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Timings {
    pub retry_interval: Duration,
    pub heartbeat_timeout: Duration,
    pub feedback_debounce: Duration,
    pub projection_debounce: Duration,
}

impl Default for Timings {
    fn default() -> Self {
        Self {
            retry_interval: DEFAULT_RETRY_INTERVAL,
            heartbeat_timeout: DEFAULT_HEARTBEAT_TIMEOUT,
            feedback_debounce: DEFAULT_FEEDBACK_DEBOUNCE,
            projection_debounce: DEFAULT_PROJECTION_DEBOUNCE,
        }
    }
}

/// A configuration that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedConfig {
    /// Every remote the commands are sent to
    pub server_hosts: Vec<String>,
    pub server_port: u16,
    /// Host announced in `/subscribe`, `None` lets the remote pick the sender address
    pub client_host: Option<String>,
    pub client_port: u16,
    pub client_id: String,
    pub fine_updates: bool,
    pub timings: Timings,
}

impl ResolvedConfig {
    /// Address for the local listening socket.
    pub fn bind_addr(&self) -> String {
        let host = self.client_host.as_deref().unwrap_or("0.0.0.0");
        format!("{}:{}", host, self.client_port)
    }

    /// `host:port` for every remote.
    pub fn remote_addrs(&self) -> Vec<String> {
        self.server_hosts
            .iter()
            .map(|host| format!("{}:{}", host, self.server_port))
            .collect()
    }

    /// Host argument for `/subscribe`.
    pub fn announced_host(&self) -> &str {
        self.client_host.as_deref().unwrap_or("auto")
    }
}

impl Default for ResolvedConfig {
    fn default() -> Self {
        Self {
            server_hosts: vec!["127.0.0.1".to_string()],
            server_port: DEFAULT_SERVER_PORT,
            client_host: Some("127.0.0.1".to_string()),
            client_port: DEFAULT_CLIENT_PORT,
            client_id: "showlink".to_string(),
            fine_updates: false,
            timings: Timings::default(),
        }
    }
}

fn is_loopback(host: &str) -> bool {
    matches!(host, "127.0.0.1" | "localhost" | "::1")
}

fn parse_duration(field: &str, value: &str) -> Result<Duration> {
    humantime::parse_duration(value.trim())
        .map_err(|e| Error::Config(format!("{} is not a valid duration ({}): {}", field, value, e)))
}

impl Config {
    /// Load configuration from the default config file location
    pub fn load() -> Result<Self> {
        let path = Self::config_path()?;
        if path.exists() {
            Self::load_from(&path)
        } else {
            Err(Error::Config(format!("Config file not found at {:?}", path)))
        }
    }

    /// Load configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }

    /// Load configuration or return default if not found
    pub fn load_or_default() -> Self {
        Self::load().unwrap_or_default()
    }

    /// Save configuration to the given path
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    /// Save configuration to the default config file location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    /// Get the default configuration file path
    pub fn config_path() -> Result<PathBuf> {
        if let Some(proj_dirs) = ProjectDirs::from("", "", "showlink") {
            Ok(proj_dirs.config_dir().join("config.toml"))
        } else {
            Err(Error::Config("Could not determine config directory".to_string()))
        }
    }

    /// Create a default config file with comments
    pub fn create_default_config_file() -> Result<PathBuf> {
        let path = Self::config_path()?;
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }

        let content = r#"# showlink configuration file

[connection]
# Host(s) running the show controller, comma separated for redundant rigs
server_host = "127.0.0.1"

# Command port of the show controller
server_port = 39051

# Address the show controller sends updates to. Set this to this computer's
# IP address when the show controller runs on another machine.
client_host = "127.0.0.1"

# Port to listen on for updates
client_port = "39052"

# Name to register under
client_id = "showlink"

# Receive position updates at high frequency instead of once per beat
fine_updates = false

[timing]
retry_interval = "2s"
heartbeat_timeout = "2500ms"
feedback_debounce = "50ms"
projection_debounce = "20ms"
"#;

        fs::write(&path, content)?;
        Ok(path)
    }

    /// Validate the configuration.
    ///
    /// Fails when the client port is not a port number, or when a remote
    /// show controller would be told to send updates to a loopback address.
    pub fn resolve(&self) -> Result<ResolvedConfig> {
        let conn = &self.connection;

        let server_hosts: Vec<String> = conn
            .server_host
            .split(',')
            .map(str::trim)
            .filter(|h| !h.is_empty())
            .map(str::to_string)
            .collect();
        if server_hosts.is_empty() {
            return Err(Error::Config("No server host configured".to_string()));
        }

        let client_host = conn.client_host.trim();
        let client_is_local = client_host.is_empty() || is_loopback(client_host);
        if let Some(remote) = server_hosts.iter().find(|h| !is_loopback(h)) {
            if client_is_local {
                return Err(Error::Config(format!(
                    "The show controller at {} is not on this machine, so the client host \
                     must be an address it can reach (not empty, 127.0.0.1 or localhost)",
                    remote
                )));
            }
        }

        let client_port = match conn.client_port.trim().parse::<u16>() {
            Ok(port) if port > 0 => port,
            _ => {
                return Err(Error::Config(format!(
                    "Client port is not valid: {}",
                    conn.client_port
                )))
            }
        };

        if conn.server_port == 0 {
            return Err(Error::Config("Server port must not be 0".to_string()));
        }

        let timings = Timings {
            retry_interval: parse_duration("retry_interval", &self.timing.retry_interval)?,
            heartbeat_timeout: parse_duration("heartbeat_timeout", &self.timing.heartbeat_timeout)?,
            feedback_debounce: parse_duration("feedback_debounce", &self.timing.feedback_debounce)?,
            projection_debounce: parse_duration(
                "projection_debounce",
                &self.timing.projection_debounce,
            )?,
        };

        let client_id = if conn.client_id.trim().is_empty() {
            "showlink".to_string()
        } else {
            conn.client_id.trim().to_string()
        };

        Ok(ResolvedConfig {
            server_hosts,
            server_port: conn.server_port,
            client_host: (!client_host.is_empty()).then(|| client_host.to_string()),
            client_port,
            client_id,
            fine_updates: conn.fine_updates,
            timings,
        })
    }
}
