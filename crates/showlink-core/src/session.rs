//! One bridge session: snapshot, timers and outputs for a single config.
//!
//! A [`Session`] ties the pure parts together. Inbound messages go
//! through the [`Dispatcher`] into the snapshot; the invalidations it
//! reports are published right away or gathered by the debouncers; the
//! [`Supervisor`] decides what protocol requests to send. Time is always
//! passed in, so the owner decides whether it is the wall clock.

use std::time::Instant;

use rosc::OscType;

use crate::command::Command;
use crate::config::ResolvedConfig;
use crate::debounce::{self, GatherDebouncer, TrailingDebouncer};
use crate::dispatcher::{Dispatcher, ProjectionGroup};
use crate::error::Result;
use crate::feedback::{Feedback, FeedbackId, FeedbackValue};
use crate::projection::{self, ProjectionSink};
use crate::state::StateManager;
use crate::supervisor::{ConnectionStatus, Step, Supervisor};
use crate::transport::OscOutput;

pub struct Session<O: OscOutput, S: ProjectionSink> {
    config: ResolvedConfig,
    state: StateManager,
    dispatcher: Dispatcher,
    supervisor: Supervisor,
    feedbacks: GatherDebouncer<FeedbackId>,
    songs: TrailingDebouncer,
    sections: TrailingDebouncer,
    output: O,
    sink: S,
}

impl<O: OscOutput, S: ProjectionSink> Session<O, S> {
    pub fn new(config: ResolvedConfig, state: StateManager, output: O, sink: S) -> Self {
        let timings = config.timings;
        Self {
            supervisor: Supervisor::new(&config),
            config,
            state,
            dispatcher: Dispatcher::new(),
            feedbacks: GatherDebouncer::new(timings.feedback_debounce),
            songs: TrailingDebouncer::new(timings.projection_debounce),
            sections: TrailingDebouncer::new(timings.projection_debounce),
            output,
            sink,
        }
    }

    pub fn config(&self) -> &ResolvedConfig {
        &self.config
    }

    pub fn state(&self) -> &StateManager {
        &self.state
    }

    pub fn output(&self) -> &O {
        &self.output
    }

    pub fn sink(&self) -> &S {
        &self.sink
    }

    /// Reset the snapshot and subscribe. Calling it again resubscribes
    /// from a clean state.
    pub fn start(&mut self, now: Instant) {
        self.clear();
        self.publish_all();
        let step = self.supervisor.start(now);
        self.apply_step(step);
    }

    /// Unsubscribe, cancel every timer and forget the remote's state.
    pub fn stop(&mut self) {
        let step = self.supervisor.stop();
        self.apply_step(step);
        self.clear();
        log::info!("[SESSION] Stopped");
    }

    fn clear(&mut self) {
        self.feedbacks.cancel();
        self.songs.cancel();
        self.sections.cancel();
        self.state.reset();
    }

    fn publish_all(&mut self) {
        let vars = self.state.with_state_read(projection::project_all);
        self.sink.set_variables(&vars);
        self.check_feedbacks(&FeedbackId::ALL);
    }

    fn check_feedbacks(&mut self, ids: &[FeedbackId]) {
        let sink = &mut self.sink;
        self.state
            .with_state_read(|s| sink.check_feedbacks(ids, s));
    }

    /// Apply one inbound message.
    pub fn handle_message(&mut self, addr: &str, args: &[OscType], now: Instant) {
        let dispatcher = &self.dispatcher;
        let applied = self.state.with_state_write(|s| {
            let (topic, dispatch) = dispatcher.dispatch(addr, args, s)?;
            if dispatch.liveness.is_some() {
                s.connection.last_heartbeat_at = Some(now);
            }
            Some((dispatch, projection::variables_for(topic, s)))
        });
        let Some((dispatch, vars)) = applied else {
            return;
        };

        if let Some(kind) = dispatch.liveness {
            let step = self.supervisor.on_liveness(kind, now);
            self.apply_step(step);
        }
        if !vars.is_empty() {
            self.sink.set_variables(&vars);
        }
        if !dispatch.immediate.is_empty() {
            self.check_feedbacks(&dispatch.immediate);
        }
        self.feedbacks.enqueue(dispatch.feedbacks, now);
        for group in dispatch.projections {
            match group {
                ProjectionGroup::Songs => self.songs.trigger(now),
                ProjectionGroup::Sections => self.sections.trigger(now),
            }
        }
    }

    /// Fire every timer that is due.
    pub fn poll(&mut self, now: Instant) {
        let step = self.supervisor.poll(now);
        self.apply_step(step);

        for (debouncer, group) in [
            (&mut self.songs, ProjectionGroup::Songs),
            (&mut self.sections, ProjectionGroup::Sections),
        ] {
            if debouncer.poll(now) {
                let vars = self
                    .state
                    .with_state_read(|s| projection::project_group(group, s));
                self.sink.set_variables(&vars);
            }
        }

        if let Some(ids) = self.feedbacks.poll(now) {
            log::trace!("[SESSION] Checking feedbacks {:?}", ids);
            self.check_feedbacks(&ids);
        }
    }

    /// When [`poll`](Self::poll) next has work to do.
    pub fn next_deadline(&self) -> Option<Instant> {
        debounce::earliest([
            self.supervisor.next_deadline(),
            self.feedbacks.deadline(),
            self.songs.deadline(),
            self.sections.deadline(),
        ])
    }

    /// Encode a command against the current snapshot and send it.
    pub fn execute(&mut self, command: &Command) -> Result<()> {
        let messages = self.state.with_state_read(|s| command.encode(s))?;
        log::debug!("[SESSION] {:?} -> {} message(s)", command, messages.len());
        let mut first_err = None;
        for message in &messages {
            if let Err(e) = self.output.send(message) {
                log::error!("[SESSION] Failed to send {}: {}", message.addr, e);
                first_err.get_or_insert(e);
            }
        }
        match first_err {
            Some(e) => Err(e),
            None => Ok(()),
        }
    }

    /// Evaluate a feedback against the current snapshot.
    pub fn evaluate(&self, feedback: &Feedback) -> FeedbackValue {
        self.state.with_state_read(|s| feedback.evaluate(s))
    }

    fn apply_step(&mut self, step: Step) {
        let mut status = step.status;
        for request in step.requests {
            let message = request.encode();
            if let Err(e) = self.output.send(&message) {
                log::error!("[SESSION] Failed to send {}: {}", message.addr, e);
                status = Some(ConnectionStatus::ConnectionFailure(e.to_string()));
            }
        }
        let Some(status) = status else {
            return;
        };
        match &status {
            ConnectionStatus::Ok => self.set_connected(true),
            ConnectionStatus::Connecting
            | ConnectionStatus::Disconnected(_)
            | ConnectionStatus::ConnectionFailure(_)
            | ConnectionStatus::BadConfig(_) => self.set_connected(false),
        }
        log::info!("[SESSION] Status: {}", status);
        self.sink.update_status(&status);
    }

    fn set_connected(&self, connected: bool) {
        self.state
            .with_state_write(|s| s.connection.is_connected = connected);
    }
}

impl<O: OscOutput, S: ProjectionSink> std::fmt::Debug for Session<O, S> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Session")
            .field("phase", &self.supervisor.phase())
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
