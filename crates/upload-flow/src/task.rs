//! Request lifecycle controller
//!
//! Owns the state of the current upload task and enforces the
//! single-flight rule: at most one outstanding call, and a resolution is
//! applied only if it belongs to the task that is actually in flight.
//!
//! The controller is sans-IO. Callers obtain a [`TaskTicket`] from
//! [`TaskController::begin_submit`], perform the network call, and hand
//! the resolution back through [`TaskController::complete`].

use crate::error::{FlowError, Phase};
use crate::outcome::Outcome;

/// Lifecycle states of the current task.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TaskState {
    Idle,
    Armed,
    InFlight,
    Succeeded,
    Failed,
}

/// Identity of one admitted submission. Completions are matched against
/// it so a stale resolution can never overwrite a later task's state.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TaskTicket {
    id: u64,
}

/// The request lifecycle state machine for one task type.
#[derive(Debug)]
pub struct TaskController {
    phase: Phase,
    state: TaskState,
    next_id: u64,
    in_flight: Option<u64>,
    result: Option<Outcome>,
    error: Option<String>,
}

impl TaskController {
    pub fn new(phase: Phase) -> Self {
        Self {
            phase,
            state: TaskState::Idle,
            next_id: 0,
            in_flight: None,
            result: None,
            error: None,
        }
    }

    pub fn state(&self) -> TaskState {
        self.state
    }

    pub fn is_in_flight(&self) -> bool {
        self.state == TaskState::InFlight
    }

    /// Present iff the task succeeded.
    pub fn result(&self) -> Option<&Outcome> {
        self.result.as_ref()
    }

    /// Present iff the task failed.
    pub fn error_message(&self) -> Option<&str> {
        self.error.as_deref()
    }

    /// Input changed: arm when ready, return to idle when not. A new
    /// armed task supersedes any prior terminal task and clears its
    /// result and error. Ignored while a call is in flight.
    pub fn input_changed(&mut self, ready: bool) {
        if self.state == TaskState::InFlight {
            return;
        }
        self.result = None;
        self.error = None;
        self.state = if ready { TaskState::Armed } else { TaskState::Idle };
    }

    /// Admit a submission.
    ///
    /// Refused without any state change while a call is outstanding.
    /// A failed readiness check moves the task straight to `Failed`
    /// with the validation message; no network call may be issued.
    /// Otherwise the task goes `InFlight` and the returned ticket must
    /// accompany exactly one network call.
    pub fn begin_submit(&mut self, readiness: Result<(), FlowError>) -> Result<TaskTicket, FlowError> {
        if self.state == TaskState::InFlight {
            return Err(FlowError::AlreadyInFlight);
        }
        if let Err(err) = readiness {
            self.state = TaskState::Failed;
            self.result = None;
            self.error = Some(err.user_message(self.phase));
            return Err(err);
        }

        self.next_id += 1;
        self.in_flight = Some(self.next_id);
        self.state = TaskState::InFlight;
        self.result = None;
        self.error = None;
        Ok(TaskTicket { id: self.next_id })
    }

    /// Apply the resolution of an in-flight call. Resolutions carrying
    /// any ticket other than the tracked one are dropped, so a call
    /// that somehow resolves after its task was superseded (or after a
    /// timeout already failed it) cannot disturb later state.
    pub fn complete(&mut self, ticket: TaskTicket, resolution: Result<Outcome, FlowError>) {
        if self.in_flight != Some(ticket.id) {
            return;
        }
        self.in_flight = None;
        match resolution {
            Ok(outcome) => {
                self.state = TaskState::Succeeded;
                self.result = Some(outcome);
                self.error = None;
            }
            Err(err) => {
                self.state = TaskState::Failed;
                self.result = None;
                self.error = Some(err.user_message(self.phase));
            }
        }
    }
}
