//! Operational state machine.
//!
//! Legal edges:
//! - `OFFLINE -> INITIALIZING -> READY -> ACTIVE`
//! - `ACTIVE -> DEGRADED -> ACTIVE`, `DEGRADED -> FAILED`
//! - `ACTIVE -> OFFLINE` on stop
//! - any state `-> FAILED`
//! - `FAILED -> INITIALIZING`, taken only by an explicit re-initialization
//!
//! `MAINTENANCE` belongs to the vocabulary but has no edges.

use serde::{Deserialize, Serialize};
use std::collections::VecDeque;
use std::fmt;
use std::time::Instant;
use time::OffsetDateTime;
use tracing::debug;

use crate::error::StateError;

const JOURNAL_CAPACITY: usize = 64;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OperationalState {
    Offline,
    Initializing,
    Ready,
    Active,
    Degraded,
    Failed,
    Maintenance,
}

impl OperationalState {
    pub fn as_str(self) -> &'static str {
        match self {
            OperationalState::Offline => "OFFLINE",
            OperationalState::Initializing => "INITIALIZING",
            OperationalState::Ready => "READY",
            OperationalState::Active => "ACTIVE",
            OperationalState::Degraded => "DEGRADED",
            OperationalState::Failed => "FAILED",
            OperationalState::Maintenance => "MAINTENANCE",
        }
    }

    pub fn can_transition_to(self, target: OperationalState) -> bool {
        use OperationalState::*;

        if self == target {
            return false;
        }
        matches!(
            (self, target),
            (Offline, Initializing)
                | (Initializing, Ready)
                | (Ready, Active)
                | (Active, Degraded)
                | (Degraded, Active)
                | (Active, Offline)
                | (Failed, Initializing)
                | (_, Failed)
        )
    }
}

impl fmt::Display for OperationalState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One accepted transition, kept in the journal.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StateTransition {
    pub from: OperationalState,
    pub to: OperationalState,
    #[serde(with = "time::serde::rfc3339")]
    pub at: OffsetDateTime,
}

#[derive(Debug)]
pub struct StateMachine {
    current: OperationalState,
    since: Instant,
    journal: VecDeque<StateTransition>,
}

impl StateMachine {
    pub fn new() -> Self {
        Self {
            current: OperationalState::Offline,
            since: Instant::now(),
            journal: VecDeque::with_capacity(JOURNAL_CAPACITY),
        }
    }

    pub fn current(&self) -> OperationalState {
        self.current
    }

    pub fn is(&self, state: OperationalState) -> bool {
        self.current == state
    }

    /// Instant of the last accepted transition (construction if none).
    pub fn since(&self) -> Instant {
        self.since
    }

    /// Moves to `target` if the edge is legal and returns the previous state.
    /// On refusal the current state is left untouched.
    pub fn transition(&mut self, target: OperationalState) -> Result<OperationalState, StateError> {
        let from = self.current;
        if !from.can_transition_to(target) {
            return Err(StateError::IllegalTransition { from, to: target });
        }

        self.current = target;
        self.since = Instant::now();
        if self.journal.len() == JOURNAL_CAPACITY {
            self.journal.pop_front();
        }
        self.journal.push_back(StateTransition {
            from,
            to: target,
            at: OffsetDateTime::now_utc(),
        });
        debug!(%from, to = %target, "state transition");
        Ok(from)
    }

    /// Recorded transitions, oldest first.
    pub fn journal(&self) -> Vec<StateTransition> {
        self.journal.iter().cloned().collect()
    }
}

impl Default for StateMachine {
    fn default() -> Self {
        Self::new()
    }
}
