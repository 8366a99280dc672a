// src/engine/state.rs

//! Pure run-state core.
//!
//! No sockets, no Tokio: just the phase, the ordered test list and the
//! progress index, with the rules for moving between them.

use std::fmt;

use tracing::warn;

use crate::model::TestIdentifier;
use crate::types::ExecutionMode;

/// Lifecycle of a run.
///
/// `Waiting → Starting → Running → Finished` in automatic mode,
/// `Waiting → Running → Finished` in manual mode. `Finished` is terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunPhase {
    Waiting,
    Starting,
    Running,
    Finished,
}

impl fmt::Display for RunPhase {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RunPhase::Waiting => "WAITING",
            RunPhase::Starting => "STARTING",
            RunPhase::Running => "RUNNING",
            RunPhase::Finished => "FINISHED",
        };
        f.write_str(s)
    }
}

#[derive(Debug, Clone)]
pub struct RunState {
    mode: ExecutionMode,
    phase: RunPhase,
    tests: Option<Vec<TestIdentifier>>,
    index: usize,
}

impl RunState {
    pub fn new(mode: ExecutionMode) -> Self {
        Self {
            mode,
            phase: RunPhase::Waiting,
            tests: None,
            index: 0,
        }
    }

    pub fn mode(&self) -> ExecutionMode {
        self.mode
    }

    pub fn phase(&self) -> RunPhase {
        self.phase
    }

    /// Move to `phase`. Leaving `Finished` is refused.
    ///
    /// Returns whether the phase changed.
    pub fn set_phase(&mut self, phase: RunPhase) -> bool {
        if self.phase == RunPhase::Finished && phase != RunPhase::Finished {
            warn!(requested = %phase, "run already finished; ignoring phase change");
            return false;
        }
        let changed = self.phase != phase;
        self.phase = phase;
        changed
    }

    /// Store the discovered test list. Only the first assignment sticks.
    pub fn assign_tests(&mut self, tests: Vec<TestIdentifier>) -> bool {
        if self.tests.is_some() {
            warn!("test list already assigned for this run; ignoring new list");
            return false;
        }
        self.tests = Some(tests);
        true
    }

    pub fn tests(&self) -> &[TestIdentifier] {
        self.tests.as_deref().unwrap_or(&[])
    }

    pub fn has_test_list(&self) -> bool {
        self.tests.is_some()
    }

    pub fn total(&self) -> usize {
        self.tests().len()
    }

    pub fn progress_index(&self) -> usize {
        self.index
    }

    /// The test at the progress index, if any remain.
    pub fn current_test(&self) -> Option<&TestIdentifier> {
        self.tests().get(self.index)
    }

    /// Move past the current test. Never goes beyond the list length.
    pub fn advance(&mut self) -> usize {
        if self.index < self.total() {
            self.index += 1;
        }
        self.index
    }

    /// True once a test list exists and every entry has been attempted.
    pub fn is_complete(&self) -> bool {
        self.has_test_list() && self.index >= self.total()
    }

    /// A new connection during an automatic run picks up where the previous
    /// one left off.
    pub fn should_resume(&self) -> bool {
        self.mode == ExecutionMode::Automatic && self.phase == RunPhase::Running
    }
}
