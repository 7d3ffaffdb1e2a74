//! Subscribe, heartbeat and reconnect handling.
//!
//! The supervisor is a pure state machine. It is told when it starts,
//! when a liveness signal arrives and what time it is; in return it hands
//! back the protocol requests to send and the status changes to report.
//! Sockets and timers belong to the caller.

use std::time::{Duration, Instant};

use crate::command::ProtocolRequest;
use crate::config::ResolvedConfig;
use crate::dispatcher::Liveness;

/// Connection status reported to the host.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum ConnectionStatus {
    Connecting,
    Ok,
    Disconnected(String),
    BadConfig(String),
    ConnectionFailure(String),
}

impl std::fmt::Display for ConnectionStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ConnectionStatus::Connecting => f.write_str("connecting"),
            ConnectionStatus::Ok => f.write_str("ok"),
            ConnectionStatus::Disconnected(reason) => write!(f, "disconnected: {}", reason),
            ConnectionStatus::BadConfig(reason) => write!(f, "bad config: {}", reason),
            ConnectionStatus::ConnectionFailure(reason) => {
                write!(f, "connection failure: {}", reason)
            }
        }
    }
}

pub const HEARTBEAT_LOST: &str = "Didn't receive a heartbeat in a while";

/// Supervisor phase.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    Disconnected,
    /// Subscribed, reported as [`ConnectionStatus::Connecting`].
    AwaitingFirstSignal,
    Connected,
}

/// Output of one supervisor step.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Step {
    pub requests: Vec<ProtocolRequest>,
    pub status: Option<ConnectionStatus>,
}

impl Step {
    fn merge(&mut self, other: Step) {
        self.requests.extend(other.requests);
        if other.status.is_some() {
            self.status = other.status;
        }
    }
}

#[derive(Debug)]
pub struct Supervisor {
    subscribe: ProtocolRequest,
    retry_interval: Duration,
    heartbeat_timeout: Duration,
    phase: Phase,
    next_retry: Option<Instant>,
    heartbeat_deadline: Option<Instant>,
}

impl Supervisor {
    pub fn new(config: &ResolvedConfig) -> Self {
        Self {
            subscribe: ProtocolRequest::Subscribe {
                host: config.announced_host().to_string(),
                port: config.client_port,
                client_id: config.client_id.clone(),
                fine_updates: config.fine_updates,
            },
            retry_interval: config.timings.retry_interval,
            heartbeat_timeout: config.timings.heartbeat_timeout,
            phase: Phase::Disconnected,
            next_retry: None,
            heartbeat_deadline: None,
        }
    }

    pub fn phase(&self) -> Phase {
        self.phase
    }

    pub fn is_connected(&self) -> bool {
        self.phase == Phase::Connected
    }

    fn connect_requests(&self) -> Vec<ProtocolRequest> {
        vec![self.subscribe.clone(), ProtocolRequest::GetValues { port: None }]
    }

    /// Begin subscribing. Restarting an already started supervisor
    /// behaves like a fresh start.
    pub fn start(&mut self, now: Instant) -> Step {
        log::info!("[SUPERVISOR] Trying to connect");
        let requests = self.connect_requests();
        self.phase = Phase::AwaitingFirstSignal;
        self.next_retry = Some(now + self.retry_interval);
        self.heartbeat_deadline = Some(now + self.heartbeat_timeout);
        Step {
            requests,
            status: Some(ConnectionStatus::Connecting),
        }
    }

    /// Record a liveness signal.
    pub fn on_liveness(&mut self, kind: Liveness, now: Instant) -> Step {
        if self.next_retry.is_none() {
            // not started
            return Step::default();
        }
        self.heartbeat_deadline = Some(now + self.heartbeat_timeout);
        if self.phase == Phase::Connected {
            return Step::default();
        }
        if self.phase == Phase::Disconnected {
            log::info!("[SUPERVISOR] Got {:?} again, connection re-established", kind);
        } else {
            log::info!("[SUPERVISOR] Connection established");
        }
        self.phase = Phase::Connected;
        Step {
            requests: Vec::new(),
            status: Some(ConnectionStatus::Ok),
        }
    }

    /// Fire due timers.
    pub fn poll(&mut self, now: Instant) -> Step {
        let mut step = Step::default();

        if let Some(deadline) = self.heartbeat_deadline {
            if now > deadline {
                self.heartbeat_deadline = None;
                if self.phase != Phase::Disconnected {
                    log::warn!(
                        "[SUPERVISOR] Took too long between heartbeats, connection likely lost"
                    );
                    self.phase = Phase::Disconnected;
                    step.merge(Step {
                        requests: Vec::new(),
                        status: Some(ConnectionStatus::Disconnected(HEARTBEAT_LOST.to_string())),
                    });
                }
            }
        }

        if let Some(retry) = self.next_retry {
            if now >= retry {
                let mut next = retry + self.retry_interval;
                if next <= now {
                    next = now + self.retry_interval;
                }
                self.next_retry = Some(next);
                if !self.is_connected() {
                    log::info!("[SUPERVISOR] Trying to connect");
                    step.requests.extend(self.connect_requests());
                }
            }
        }

        step
    }

    /// Cancel every timer and unsubscribe.
    pub fn stop(&mut self) -> Step {
        let was_started = self.next_retry.is_some();
        self.next_retry = None;
        self.heartbeat_deadline = None;
        self.phase = Phase::Disconnected;
        Step {
            requests: if was_started {
                vec![ProtocolRequest::Unsubscribe]
            } else {
                Vec::new()
            },
            status: None,
        }
    }

    /// When `poll` next has something to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        // expiry is strict, so wake just after the heartbeat deadline
        let heartbeat = self
            .heartbeat_deadline
            .map(|d| d + Duration::from_millis(1));
        crate::debounce::earliest([self.next_retry, heartbeat])
    }
}
