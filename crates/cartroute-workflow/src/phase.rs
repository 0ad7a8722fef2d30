//! The two-phase state machine and its in-progress guard.

use std::fmt;

use crate::error::WorkflowError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Phase {
    #[default]
    Discovery,
    Planning,
}

impl fmt::Display for Phase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Phase::Discovery => f.write_str("discovery"),
            Phase::Planning => f.write_str("planning"),
        }
    }
}

/// Network work currently blocking duplicate triggers.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Activity {
    Discovering,
    Planning,
}

impl Activity {
    fn label(self) -> &'static str {
        match self {
            Activity::Discovering => "discovery",
            Activity::Planning => "planning",
        }
    }
}

#[derive(Debug, Default)]
pub struct PhaseMachine {
    phase: Phase,
    in_progress: Option<Activity>,
}

impl PhaseMachine {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn current(&self) -> Phase {
        self.phase
    }

    #[must_use]
    pub fn is_busy(&self) -> bool {
        self.in_progress.is_some()
    }

    /// Enters (or re-enters) Discovery with a search in flight. A newer search
    /// always supersedes an older one.
    pub fn start_discovery(&mut self) {
        self.phase = Phase::Discovery;
        self.in_progress = Some(Activity::Discovering);
    }

    /// Discovery → Planning.
    ///
    /// # Errors
    ///
    /// - [`WorkflowError::Busy`] while a search or planning call is in flight.
    /// - [`WorkflowError::WrongPhase`] when already planning.
    /// - [`WorkflowError::NoStores`] when `store_count` is zero.
    pub fn begin_planning(&mut self, store_count: usize) -> Result<(), WorkflowError> {
        if let Some(activity) = self.in_progress {
            return Err(WorkflowError::Busy(activity.label()));
        }
        if self.phase != Phase::Discovery {
            return Err(WorkflowError::WrongPhase {
                expected: Phase::Discovery,
                actual: self.phase,
            });
        }
        if store_count == 0 {
            return Err(WorkflowError::NoStores);
        }
        self.phase = Phase::Planning;
        self.in_progress = Some(Activity::Planning);
        Ok(())
    }

    /// Clears the in-progress flag once the awaited response has been applied.
    pub fn finish(&mut self) {
        self.in_progress = None;
    }

    /// Planning → Discovery. Returns `false` when already in Discovery.
    pub fn back(&mut self) -> bool {
        if self.phase != Phase::Planning {
            return false;
        }
        self.phase = Phase::Discovery;
        self.in_progress = None;
        true
    }
}
