//! What one sequencer invocation reports back.

use crate::steps::StepResult;

/// How an invocation ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    /// Steps ran and every one that ran succeeded (possibly finishing the sequence).
    Advanced,

    /// A step failed; progress stays at that step.
    Failed,

    /// Another invocation holds the lease; nothing was done.
    Busy,

    /// The sequence had already completed; nothing was done.
    AlreadyComplete,
}

impl RunOutcome {
    /// Whether the invocation did any work.
    pub fn did_work(&self) -> bool {
        matches!(self, RunOutcome::Advanced | RunOutcome::Failed)
    }
}

/// Result of [`Sequencer::advance`](super::Sequencer::advance).
#[derive(Debug, Clone, PartialEq)]
pub struct RunResult {
    /// How the invocation ended.
    pub outcome: RunOutcome,

    /// Label of the last step that ran.
    pub label: Option<String>,

    /// Whether every step that ran succeeded.
    pub success: bool,

    /// Share of the sequence done, 0 to 100.
    pub progress_percent: u8,

    /// Whether the whole sequence is done.
    pub completed: bool,

    /// Results of the steps that ran, in order.
    pub steps: Vec<StepResult>,

    /// Human-readable notes about what happened.
    pub log: Vec<String>,
}

impl RunResult {
    /// A result for an invocation that ran nothing.
    pub(crate) fn idle(outcome: RunOutcome, progress_percent: u8, completed: bool, note: &str) -> Self {
        Self {
            outcome,
            label: None,
            success: outcome != RunOutcome::Busy,
            progress_percent,
            completed,
            steps: Vec::new(),
            log: vec![note.to_string()],
        }
    }

    /// The first failed step, if any.
    pub fn first_failure(&self) -> Option<&StepResult> {
        self.steps.iter().find(|s| !s.success)
    }

    /// Whether another invocation was running.
    pub fn is_busy(&self) -> bool {
        self.outcome == RunOutcome::Busy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn idle_results() {
        let busy = RunResult::idle(RunOutcome::Busy, 40, false, "busy");
        assert!(!busy.success);
        assert!(busy.is_busy());
        assert!(!busy.outcome.did_work());

        let done = RunResult::idle(RunOutcome::AlreadyComplete, 100, true, "done");
        assert!(done.success);
        assert!(done.completed);
        assert!(done.first_failure().is_none());
    }

    #[test]
    fn first_failure_finds_failed_step() {
        let mut result = RunResult::idle(RunOutcome::Failed, 40, false, "");
        result.steps.push(StepResult::failure("plugins", "Installing plugins...", "boom"));
        assert_eq!(result.first_failure().unwrap().name, "plugins");
    }
}
