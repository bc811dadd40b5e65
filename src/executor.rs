// src/executor.rs

//! Action executor with per-sequence rollback
//!
//! `Executor::run` applies a sequence of actions in order. Actions whose
//! `check()` reports the target state already in place are skipped. If any
//! action fails, every action applied earlier in the same call is rolled
//! back in reverse order, and the failure is returned. Rollback errors are
//! logged and swallowed so the original failure stays the reported error.
//!
//! Each `run` call is its own rollback scope; nothing carries over between
//! calls on the same executor.

use crate::action::Action;
use crate::error::{Error, Result};
use tracing::{debug, info, warn};

/// Where the executor is in its current (or last) `run` call
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExecutorState {
    Ready,
    Executing(usize),
    RollingBack,
    Failed,
    Succeeded,
}

/// Runs action sequences with best-effort rollback on failure
#[derive(Debug)]
pub struct Executor {
    applied: Vec<usize>,
    state: ExecutorState,
}

impl Executor {
    pub fn new() -> Self {
        Self {
            applied: Vec::new(),
            state: ExecutorState::Ready,
        }
    }

    /// Apply `actions` in order
    ///
    /// Returns `Error::ActionFailed` naming the first failing action. By then
    /// all actions applied before it have been rolled back.
    pub fn run(&mut self, actions: &mut [Box<dyn Action>]) -> Result<()> {
        self.applied.clear();
        self.state = ExecutorState::Ready;

        for index in 0..actions.len() {
            self.state = ExecutorState::Executing(index);
            let action = &mut actions[index];

            if !action.check() {
                debug!("Skipping satisfied action: {}", action.describe());
                continue;
            }

            debug!("Running action: {}", action.describe());
            if let Err(e) = action.run() {
                let description = action.describe();
                warn!("Action failed: {}: {}", description, e);
                self.roll_back(actions);
                self.state = ExecutorState::Failed;
                return Err(Error::ActionFailed {
                    description,
                    source: Box::new(e),
                });
            }
            self.applied.push(index);
        }

        self.state = ExecutorState::Succeeded;
        Ok(())
    }

    fn roll_back(&mut self, actions: &mut [Box<dyn Action>]) {
        self.state = ExecutorState::RollingBack;
        if !self.applied.is_empty() {
            info!("Rolling back {} applied action(s)", self.applied.len());
        }

        for &index in self.applied.iter().rev() {
            let action = &mut actions[index];
            match action.rollback() {
                Ok(()) => debug!("Rolled back: {}", action.describe()),
                Err(e) => warn!("Rollback failed for {}: {}", action.describe(), e),
            }
        }
    }

    /// Indices of the actions applied by the last `run` call, in order
    pub fn applied(&self) -> &[usize] {
        &self.applied
    }

    pub fn state(&self) -> ExecutorState {
        self.state
    }
}

impl Default for Executor {
    fn default() -> Self {
        Self::new()
    }
}
