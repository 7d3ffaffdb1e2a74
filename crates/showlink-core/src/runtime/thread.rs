//! Runtime thread for showlink.
//!
//! The runtime thread owns the [`Session`]. It:
//! - Applies inbound OSC messages in arrival order
//! - Fires debounce and heartbeat timers when they are due
//! - Executes commands sent through the [`RuntimeHandle`]

use crossbeam_channel::{bounded, select, unbounded, Receiver, Sender};
use std::thread::{self, JoinHandle};
use std::time::{Duration, Instant};

use crate::command::Command;
use crate::config::Config;
use crate::error::{Error, Result};
use crate::osc::{InboundMessage, OscListener};
use crate::projection::ProjectionSink;
use crate::session::Session;
use crate::state::{Snapshot, StateManager};
use crate::supervisor::ConnectionStatus;
use crate::transport::RemoteSet;

/// Upper bound on how long the loop sleeps with no timer pending.
const IDLE_WAIT: Duration = Duration::from_millis(500);

/// Requests from host threads to the runtime thread.
#[derive(Debug)]
enum ControlMessage {
    Execute {
        command: Command,
        reply: Sender<Result<()>>,
    },
    /// Start over with a clean snapshot and a fresh subscription.
    Resubscribe,
    Shutdown,
}

/// Handle to the running runtime.
///
/// Cheap to clone; every clone talks to the same thread.
#[derive(Clone, Debug)]
pub struct RuntimeHandle {
    /// Sender for control messages.
    control_tx: Sender<ControlMessage>,
    /// Shared state manager for read access.
    state_manager: StateManager,
}

impl RuntimeHandle {
    /// Run a command on the runtime thread and wait for the send result.
    pub fn execute(&self, command: Command) -> Result<()> {
        let (reply, result) = bounded(1);
        self.control_tx
            .send(ControlMessage::Execute { command, reply })
            .map_err(|_| Error::ChannelClosed)?;
        result.recv().map_err(|_| Error::ChannelClosed)?
    }

    /// Reset the snapshot and subscribe again.
    pub fn resubscribe(&self) -> Result<()> {
        self.control_tx
            .send(ControlMessage::Resubscribe)
            .map_err(|_| Error::ChannelClosed)
    }

    /// Get the state manager for read access.
    pub fn state(&self) -> &StateManager {
        &self.state_manager
    }

    /// Read the current state with a closure.
    pub fn with_state<F, R>(&self, f: F) -> R
    where
        F: FnOnce(&Snapshot) -> R,
    {
        self.state_manager.with_state_read(f)
    }

    /// Signal the runtime to shut down. Returns false if it had already
    /// stopped.
    pub fn shutdown(&self) -> bool {
        if self.control_tx.send(ControlMessage::Shutdown).is_err() {
            log::debug!("[RUNTIME] Shutdown requested, runtime already stopped");
            return false;
        }
        true
    }
}

/// The showlink runtime: a listener, the remotes and the runtime thread.
pub struct Runtime {
    /// Handle for interacting with the runtime.
    handle: RuntimeHandle,
    /// Join handle for the runtime thread.
    thread_handle: Option<JoinHandle<()>>,
}

impl Runtime {
    /// Validate `config`, bind the sockets and start the session.
    ///
    /// Configuration and socket errors are reported to `sink` as a status
    /// before being returned; no connection is attempted in that case.
    pub fn start<S>(config: &Config, mut sink: S) -> Result<Self>
    where
        S: ProjectionSink + 'static,
    {
        let resolved = match config.resolve() {
            Ok(resolved) => resolved,
            Err(e) => {
                log::error!("[RUNTIME] {}", e);
                sink.update_status(&ConnectionStatus::BadConfig(e.to_string()));
                return Err(e);
            }
        };

        let (inbound_tx, inbound_rx) = unbounded();
        let sockets = RemoteSet::new(&resolved.remote_addrs()).and_then(|remotes| {
            OscListener::bind(&resolved.bind_addr(), inbound_tx).map(|listener| (remotes, listener))
        });
        let (remotes, listener) = match sockets {
            Ok(sockets) => sockets,
            Err(e) => {
                log::error!("[RUNTIME] {}", e);
                sink.update_status(&ConnectionStatus::ConnectionFailure(e.to_string()));
                return Err(e);
            }
        };
        log::info!(
            "[RUNTIME] Bridging {} <-> {}",
            resolved.bind_addr(),
            remotes.addrs().join(", ")
        );

        let state_manager = StateManager::new();
        let (control_tx, control_rx) = unbounded();
        let handle = RuntimeHandle {
            control_tx,
            state_manager: state_manager.clone(),
        };

        let session = Session::new(resolved, state_manager, remotes, sink);
        let thread_handle = thread::Builder::new()
            .name("showlink-runtime".to_string())
            .spawn(move || {
                let mut rt = RuntimeThread {
                    session,
                    inbound_rx,
                    control_rx,
                };
                rt.run();
                rt.session.stop();
                // timers are cancelled; now release the port
                listener.close();
                log::info!("[RUNTIME] Stopped");
            })?;

        Ok(Self {
            handle,
            thread_handle: Some(thread_handle),
        })
    }

    /// Get a handle to interact with the runtime.
    pub fn handle(&self) -> &RuntimeHandle {
        &self.handle
    }

    /// Unsubscribe, close the sockets and wait for the thread to finish.
    pub fn shutdown(mut self) {
        self.join();
    }

    fn join(&mut self) {
        self.handle.shutdown();
        if let Some(handle) = self.thread_handle.take() {
            if handle.join().is_err() {
                log::error!("[RUNTIME] Runtime thread panicked");
            }
        }
    }
}

impl Drop for Runtime {
    fn drop(&mut self) {
        self.join();
    }
}

/// The thread-side half of the runtime.
struct RuntimeThread<S: ProjectionSink> {
    session: Session<RemoteSet, S>,
    inbound_rx: Receiver<InboundMessage>,
    control_rx: Receiver<ControlMessage>,
}

impl<S: ProjectionSink> RuntimeThread<S> {
    fn run(&mut self) {
        self.session.start(Instant::now());

        loop {
            let timeout = self
                .session
                .next_deadline()
                .map(|deadline| deadline.saturating_duration_since(Instant::now()))
                .unwrap_or(IDLE_WAIT)
                .min(IDLE_WAIT);

            select! {
                recv(self.inbound_rx) -> message => match message {
                    Ok(message) => {
                        log::trace!("[RUNTIME] <- {} {:?}", message.addr, message.args);
                        self.session
                            .handle_message(&message.addr, &message.args, Instant::now());
                    }
                    Err(_) => {
                        log::warn!("[RUNTIME] Receive thread is gone");
                        return;
                    }
                },
                recv(self.control_rx) -> message => match message {
                    Ok(ControlMessage::Execute { command, reply }) => {
                        let _ = reply.send(self.session.execute(&command));
                    }
                    Ok(ControlMessage::Resubscribe) => self.session.start(Instant::now()),
                    Ok(ControlMessage::Shutdown) | Err(_) => return,
                },
                default(timeout) => {}
            }

            self.session.poll(Instant::now());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ConnectionSettings;
    use crate::feedback::FeedbackId;
    use crate::osc::OscClient;
    use crate::projection::Variables;
    use rosc::OscType;
    use std::sync::{Arc, Mutex};

    #[derive(Clone, Default)]
    struct SharedSink {
        statuses: Arc<Mutex<Vec<ConnectionStatus>>>,
        variables: Arc<Mutex<Variables>>,
    }

    impl ProjectionSink for SharedSink {
        fn set_variables(&mut self, variables: &Variables) {
            self.variables
                .lock()
                .unwrap()
                .extend(variables.iter().map(|(k, v)| (k.clone(), v.clone())));
        }

        fn check_feedbacks(&mut self, _ids: &[FeedbackId], _snapshot: &Snapshot) {}

        fn update_status(&mut self, status: &ConnectionStatus) {
            self.statuses.lock().unwrap().push(status.clone());
        }
    }

    fn wait_for<F: Fn() -> bool>(check: F) -> bool {
        let deadline = Instant::now() + Duration::from_secs(3);
        while Instant::now() < deadline {
            if check() {
                return true;
            }
            thread::sleep(Duration::from_millis(10));
        }
        false
    }

    /// A free local UDP port.
    fn free_port() -> u16 {
        let sock = std::net::UdpSocket::bind("127.0.0.1:0").unwrap();
        sock.local_addr().unwrap().port()
    }

    #[test]
    fn test_bad_config_is_reported() {
        let config = Config {
            connection: ConnectionSettings {
                client_port: "not a port".into(),
                ..Default::default()
            },
            ..Default::default()
        };
        let sink = SharedSink::default();
        let result = Runtime::start(&config, sink.clone());
        assert!(result.is_err());
        assert!(matches!(
            sink.statuses.lock().unwrap().last(),
            Some(ConnectionStatus::BadConfig(_))
        ));
    }

    #[test]
    fn test_runtime_round_trip() {
        let _ = env_logger::builder().is_test(true).try_init();
        let (remote_tx, remote_rx) = unbounded();
        let remote = OscListener::bind("127.0.0.1:0", remote_tx).unwrap();
        let client_port = free_port();

        let config = Config {
            connection: ConnectionSettings {
                server_host: "127.0.0.1".into(),
                server_port: remote.local_addr().port(),
                client_host: "127.0.0.1".into(),
                client_port: client_port.to_string(),
                ..Default::default()
            },
            ..Default::default()
        };
        let sink = SharedSink::default();
        let runtime = Runtime::start(&config, sink.clone()).unwrap();

        let first = remote_rx.recv_timeout(Duration::from_secs(2)).unwrap();
        assert_eq!(first.addr, "/subscribe");

        let controller = OscClient::new(format!("127.0.0.1:{}", client_port)).unwrap();
        controller
            .send_msg("/global/isPlaying", vec![OscType::Bool(true)])
            .unwrap();
        assert!(wait_for(|| runtime.handle().state().is_playing()));
        assert!(wait_for(|| sink
            .statuses
            .lock()
            .unwrap()
            .contains(&ConnectionStatus::Ok)));

        runtime.handle().execute(Command::PlayPause).unwrap();
        let pause = std::iter::from_fn(|| remote_rx.recv_timeout(Duration::from_secs(2)).ok())
            .find(|m| m.addr == "/global/pause");
        assert!(pause.is_some());

        let handle = runtime.handle().clone();
        runtime.shutdown();
        assert!(!handle.shutdown());
        assert!(matches!(
            handle.execute(Command::Play),
            Err(Error::ChannelClosed)
        ));
        let unsubscribe = std::iter::from_fn(|| remote_rx.recv_timeout(Duration::from_secs(2)).ok())
            .find(|m| m.addr == "/unsubscribe");
        assert!(unsubscribe.is_some());
        remote.close();
    }
}
