//! Step journal.
//!
//! Every executed step leaves a [`JournalEntry`]. The journal spans
//! invocations, newest first, and is trimmed to the configured retention.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::steps::{StepResult, StepStatus};

/// A record of one executed step.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct JournalEntry {
    /// When the step finished.
    pub timestamp: DateTime<Utc>,

    /// Step name.
    pub step: String,

    /// Step label.
    pub label: String,

    /// Whether the step succeeded.
    pub success: bool,

    /// Whether the step found its work already done.
    #[serde(default)]
    pub skipped: bool,

    /// Result message.
    pub message: String,
}

impl JournalEntry {
    /// Record a step result as of now.
    pub fn from_result(result: &StepResult) -> Self {
        Self {
            timestamp: Utc::now(),
            step: result.name.clone(),
            label: result.label.clone(),
            success: result.success,
            skipped: result.skipped,
            message: result.message.clone(),
        }
    }

    /// Status of the recorded step.
    pub fn status(&self) -> StepStatus {
        if !self.success {
            StepStatus::Failed
        } else if self.skipped {
            StepStatus::Skipped
        } else {
            StepStatus::Completed
        }
    }
}

/// Prepend `entries` (oldest first) to `journal` (newest first) and trim it.
pub fn merge_entries(journal: &mut Vec<JournalEntry>, entries: &[JournalEntry], retention: usize) {
    for entry in entries {
        journal.insert(0, entry.clone());
    }
    journal.truncate(retention);
}
