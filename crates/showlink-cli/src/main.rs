//! showlink - bridge a show controller to a control-surface host
//!
//! Mirrors the show controller's state, logs projected variables and sends
//! ad-hoc OSC commands.

use anyhow::{bail, Context, Result};
use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use showlink_core::{
    feedback_definitions, projection::variable_definitions, Command, Config, OscOutput, RemoteSet,
    Runtime, Snapshot,
};
use showlink_cli::LogSink;

#[derive(Parser)]
#[command(name = "showlink")]
#[command(author, version, about = "Bridge a show controller to a control-surface host over OSC", long_about = None)]
struct Cli {
    #[command(subcommand)]
    command: Option<Commands>,

    /// Config file path (default: ~/.config/showlink/config.toml)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Show controller host(s), comma separated
    #[arg(long)]
    server_host: Option<String>,

    /// Show controller command port
    #[arg(long)]
    server_port: Option<u16>,

    /// Address the show controller should send updates to
    #[arg(long)]
    client_host: Option<String>,

    /// Local port to listen on
    #[arg(long)]
    client_port: Option<String>,

    /// Request high-frequency position updates
    #[arg(long)]
    fine_updates: bool,
}

#[derive(Subcommand)]
enum Commands {
    /// Mirror the show controller until interrupted (default)
    Run {
        /// Print every changed variable to stdout
        #[arg(short, long)]
        print: bool,
    },
    /// Create a default configuration file
    Init,
    /// Show the configuration file path
    ConfigPath,
    /// Dump the preset table as JSON
    Presets,
    /// Dump the variable definitions as JSON
    Variables,
    /// Dump the feedback definitions as JSON
    Feedbacks,
    /// Send a raw OSC command, e.g. `/setlist/jumpToSong 3; /global/play`
    Send {
        command: String,
    },
}

fn main() -> Result<()> {
    env_logger::init();

    let cli = Cli::parse();

    match cli.command {
        Some(Commands::Init) => {
            let path = Config::create_default_config_file()?;
            println!("Created default config at: {}", path.display());
            return Ok(());
        }
        Some(Commands::ConfigPath) => {
            let path = Config::config_path()?;
            println!("{}", path.display());
            return Ok(());
        }
        Some(Commands::Presets) => {
            let json = serde_json::to_string_pretty(&showlink_core::presets())?;
            println!("{}", json);
            return Ok(());
        }
        Some(Commands::Variables) => {
            let json = serde_json::to_string_pretty(&variable_definitions())?;
            println!("{}", json);
            return Ok(());
        }
        Some(Commands::Feedbacks) => {
            let json = serde_json::to_string_pretty(&feedback_definitions())?;
            println!("{}", json);
            return Ok(());
        }
        _ => {}
    }

    // Load config
    let mut config = match &cli.config {
        Some(path) => Config::load_from(path)
            .with_context(|| format!("Failed to load config from {}", path.display()))?,
        None => Config::load_or_default(),
    };

    // Apply CLI overrides
    if let Some(host) = cli.server_host {
        config.connection.server_host = host;
    }
    if let Some(port) = cli.server_port {
        config.connection.server_port = port;
    }
    if let Some(host) = cli.client_host {
        config.connection.client_host = host;
    }
    if let Some(port) = cli.client_port {
        config.connection.client_port = port;
    }
    if cli.fine_updates {
        config.connection.fine_updates = true;
    }

    match cli.command {
        Some(Commands::Send { command }) => send(&config, &command),
        Some(Commands::Run { print }) => run(&config, print),
        _ => run(&config, false),
    }
}

fn send(config: &Config, command: &str) -> Result<()> {
    let resolved = config.resolve().context("Invalid configuration")?;
    let remotes = RemoteSet::new(&resolved.remote_addrs())?;
    let messages = Command::SendOscCommand {
        command: command.to_string(),
    }
    .encode(&Snapshot::new())?;
    if messages.is_empty() {
        bail!("Nothing to send");
    }
    for message in &messages {
        remotes
            .send(message)
            .with_context(|| format!("Failed to send {}", message.addr))?;
        println!("sent {} {:?}", message.addr, message.payload());
    }
    Ok(())
}

fn run(config: &Config, print: bool) -> Result<()> {
    let term = Arc::new(AtomicBool::new(false));
    for signal in [signal_hook::consts::SIGINT, signal_hook::consts::SIGTERM] {
        signal_hook::flag::register(signal, Arc::clone(&term))
            .context("Failed to install signal handler")?;
    }

    let runtime = Runtime::start(config, LogSink::new(print)).context("Failed to start")?;
    log::info!("Running, press Ctrl+C to stop");

    while !term.load(Ordering::Relaxed) {
        std::thread::sleep(Duration::from_millis(100));
    }

    log::info!("Shutting down");
    runtime.shutdown();
    Ok(())
}
