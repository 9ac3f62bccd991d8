//! Progress reporting.
//!
//! Pure formatting of sequencer output. Nothing here touches the terminal;
//! commands decide where the text goes.

use serde::{Deserialize, Serialize};

use crate::runner::{RunOutcome, RunResult};
use crate::state::{JournalEntry, RunProgress};
use crate::steps::StepRegistry;

/// Poll payload returned after each invocation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatusPayload {
    /// Whether the whole sequence is done.
    pub completed: bool,

    /// Share of the sequence done, 0 to 100.
    pub progress: u8,

    /// What to show the user next.
    pub message: String,

    /// Whether the invocation succeeded.
    pub success: bool,

    /// Whether another invocation held the lease.
    pub busy: bool,
}

impl StatusPayload {
    /// Build the payload for an invocation's result.
    pub fn from_result(result: &RunResult) -> Self {
        Self {
            completed: result.completed,
            progress: result.progress_percent,
            message: status_message(result),
            success: result.success,
            busy: result.is_busy(),
        }
    }
}

fn status_message(result: &RunResult) -> String {
    match result.outcome {
        RunOutcome::AlreadyComplete => "Provisioning already complete".to_string(),
        RunOutcome::Busy => "Provisioning already in progress".to_string(),
        RunOutcome::Failed => match result.first_failure() {
            Some(step) => format!("Step '{}' failed: {}", step.name, step.message),
            None => "Step failed".to_string(),
        },
        RunOutcome::Advanced if result.completed => "Provisioning complete".to_string(),
        RunOutcome::Advanced => result
            .label
            .clone()
            .unwrap_or_else(|| "Working...".to_string()),
    }
}

/// One-line incremental status for a poller.
pub fn format_status(result: &RunResult) -> String {
    format!("[{:>3}%] {}", result.progress_percent, status_message(result))
}

/// Where a site stands: `Step 3 of 6 (33%), next: pages`.
pub fn format_position(progress: &RunProgress, registry: &StepRegistry) -> String {
    let total = registry.len();
    let percent = progress.percent(total);
    if progress.completed {
        return format!("Complete ({} steps, {}%)", total, percent);
    }
    match registry.get(progress.current_step_index) {
        Some(step) => format!(
            "Step {} of {} ({}%), next: {}",
            progress.current_step_index + 1,
            total,
            percent,
            step.name
        ),
        None => format!("All {} steps done, awaiting completion ({}%)", total, percent),
    }
}

/// Final per-step summary, one line per journal entry.
pub fn format_summary(entries: &[JournalEntry]) -> String {
    let width = entries.iter().map(|e| e.step.len()).max().unwrap_or(0);
    entries
        .iter()
        .map(|entry| {
            format!(
                "{} {} {:<width$}  {}",
                entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
                entry.status().display_char(),
                entry.step,
                entry.message,
                width = width
            )
        })
        .collect::<Vec<_>>()
        .join("\n")
}
