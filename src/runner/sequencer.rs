//! The provisioning sequencer.
//!
//! Each call to [`Sequencer::advance`] is one short-lived invocation: load
//! progress, take the lease, run one step or all remaining steps, persist,
//! release. Both modes share the same single-step transition, so a site
//! driven one step at a time by a poller ends up exactly where a single
//! run-to-completion would have left it.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, info, warn};

use crate::config::{FailurePolicy, Settings};
use crate::error::{KickoffError, Result};
use crate::site::Site;
use crate::state::{holder_token, JournalEntry, ProgressStore, RunProgress};
use crate::steps::{Step, StepExecutor, StepRegistry, StepResult};

use super::result::{RunOutcome, RunResult};

/// How much work one invocation does.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AdvanceMode {
    /// Execute the next pending step only.
    SingleStep,

    /// Execute every remaining step.
    RunToCompletion,
}

/// Behaviour settings for a [`Sequencer`].
#[derive(Debug, Clone, PartialEq)]
pub struct SequencerOptions {
    /// How long the run lease stays valid.
    pub lease_ttl: Duration,

    /// Default for steps without their own policy.
    pub failure_policy: FailurePolicy,

    /// Journal entries to keep.
    pub history_retention: usize,

    /// Site option set once the sequence completes.
    pub completion_option: String,

    /// Bootstrap plugin to remove once the sequence completes.
    pub self_uninstall: Option<String>,
}

impl Default for SequencerOptions {
    fn default() -> Self {
        Self::from_settings(&Settings::default())
    }
}

impl SequencerOptions {
    /// Options from configured settings.
    pub fn from_settings(settings: &Settings) -> Self {
        Self {
            lease_ttl: Duration::from_secs(settings.lease_ttl_secs),
            failure_policy: settings.on_failure,
            history_retention: settings.history_retention,
            completion_option: settings.completion_option.clone(),
            self_uninstall: settings.self_uninstall.clone(),
        }
    }
}

/// Progress events emitted while steps run.
#[derive(Debug)]
pub enum SequenceEvent<'a> {
    /// A step is about to start.
    StepStarting {
        step: &'a Step,
        index: usize,
        total: usize,
    },
    /// A step finished.
    StepFinished {
        step: &'a Step,
        index: usize,
        result: &'a StepResult,
    },
    /// Every step has succeeded and teardown is about to run.
    Completed,
}

/// Drives a step registry against a site, one invocation at a time.
pub struct Sequencer {
    registry: StepRegistry,
    site: Arc<dyn Site>,
    store: Arc<dyn ProgressStore>,
    executor: StepExecutor,
    options: SequencerOptions,
}

impl std::fmt::Debug for Sequencer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sequencer")
            .field("steps", &self.registry.len())
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

/// Work done while the lease was held.
struct LeasedRun {
    result: RunResult,
    teardown: bool,
}

impl Sequencer {
    /// Create a sequencer.
    pub fn new(
        registry: StepRegistry,
        site: Arc<dyn Site>,
        store: Arc<dyn ProgressStore>,
        options: SequencerOptions,
    ) -> Self {
        let executor = StepExecutor::new(Arc::clone(&site));
        Self {
            registry,
            site,
            store,
            executor,
            options,
        }
    }

    /// The step registry.
    pub fn registry(&self) -> &StepRegistry {
        &self.registry
    }

    /// The progress store.
    pub fn store(&self) -> &dyn ProgressStore {
        self.store.as_ref()
    }

    /// The step executor, for running steps outside the sequence.
    pub fn executor(&self) -> &StepExecutor {
        &self.executor
    }

    /// Behaviour settings.
    pub fn options(&self) -> &SequencerOptions {
        &self.options
    }

    /// Current progress.
    pub fn progress(&self) -> Result<RunProgress> {
        self.store.load()
    }

    /// Run one invocation.
    ///
    /// # Errors
    ///
    /// Returns `Storage` if progress cannot be read or written, and
    /// `RegistryChanged` if the step sequence differs from the one the run
    /// started with. Step failures are reported in the result, not as errors.
    pub fn advance(&self, mode: AdvanceMode) -> Result<RunResult> {
        self.advance_with_progress(mode, |_| {})
    }

    /// Run one invocation, reporting step progress to `on_progress`.
    pub fn advance_with_progress(
        &self,
        mode: AdvanceMode,
        mut on_progress: impl FnMut(SequenceEvent<'_>),
    ) -> Result<RunResult> {
        let total = self.registry.len();

        let progress = self.store.load()?;
        if progress.completed {
            debug!("Sequence already complete");
            return Ok(RunResult::idle(
                RunOutcome::AlreadyComplete,
                100,
                true,
                "Provisioning already complete",
            ));
        }

        let holder = holder_token();
        if !self.store.acquire_lease(&holder, self.options.lease_ttl)? {
            info!("Another invocation is running; not advancing");
            return Ok(RunResult::idle(
                RunOutcome::Busy,
                progress.percent(total),
                false,
                "Provisioning already in progress",
            ));
        }
        debug!("Acquired lease {}", holder);

        let leased = self.run_leased(mode, &holder, &mut on_progress);
        let released = self.store.release_lease(&holder);

        let LeasedRun {
            mut result,
            teardown,
        } = leased?;
        if let Err(e) = released {
            warn!("Failed to release lease: {}", e);
            result.log.push(format!("Lease not released: {}", e));
        }

        if teardown {
            on_progress(SequenceEvent::Completed);
            self.teardown(&mut result);
        }

        Ok(result)
    }

    /// Steps run while the lease is held.
    fn run_leased(
        &self,
        mode: AdvanceMode,
        holder: &str,
        on_progress: &mut impl FnMut(SequenceEvent<'_>),
    ) -> Result<LeasedRun> {
        let total = self.registry.len();
        let fingerprint = self.registry.fingerprint();

        let mut progress = self.store.load()?;
        if progress.completed {
            return Ok(LeasedRun {
                result: RunResult::idle(
                    RunOutcome::AlreadyComplete,
                    100,
                    true,
                    "Provisioning already complete",
                ),
                teardown: false,
            });
        }

        match &progress.fingerprint {
            Some(recorded) if *recorded != fingerprint && !progress.is_fresh() => {
                return Err(KickoffError::RegistryChanged {
                    recorded: recorded.clone(),
                    current: fingerprint,
                });
            }
            Some(recorded) if *recorded == fingerprint => {}
            _ => progress.fingerprint = Some(fingerprint),
        }

        let mut result = RunResult {
            outcome: RunOutcome::Advanced,
            label: None,
            success: true,
            progress_percent: progress.percent(total),
            completed: false,
            steps: Vec::new(),
            log: Vec::new(),
        };

        let start = progress.current_step_index;
        // Index of the first failure; progress does not move past it.
        let mut frozen: Option<usize> = None;

        for index in start..total {
            let Some(step) = self.registry.get(index) else {
                break;
            };

            if !self.store.renew_lease(holder, self.options.lease_ttl)? {
                return self.lease_lost(result);
            }

            on_progress(SequenceEvent::StepStarting { step, index, total });
            let step_result = self.executor.execute(step);
            on_progress(SequenceEvent::StepFinished {
                step,
                index,
                result: &step_result,
            });

            let mut saved = true;
            if step_result.success && frozen.is_none() {
                progress.advance();
                saved = self.store.save_as_holder(holder, &progress)?;
            }

            self.store.append_journal(
                &[JournalEntry::from_result(&step_result)],
                self.options.history_retention,
            )?;

            result.label = Some(step.label.clone());
            result.log.push(step_result.summary_line());

            if !saved {
                result.steps.push(step_result);
                return self.lease_lost(result);
            }

            if step_result.success {
                if frozen.is_none() {
                    info!(
                        "Step {}/{} '{}' done",
                        progress.current_step_index, total, step.name
                    );
                }
            } else {
                result.success = false;
                result.outcome = RunOutcome::Failed;
                frozen.get_or_insert(index);

                let policy = step.failure_policy(self.options.failure_policy);
                if mode == AdvanceMode::SingleStep || policy == FailurePolicy::Halt {
                    result.steps.push(step_result);
                    break;
                }
                warn!("Step '{}' failed; continuing with later steps", step.name);
            }
            result.steps.push(step_result);

            if mode == AdvanceMode::SingleStep {
                break;
            }
        }

        let mut teardown = false;
        if frozen.is_none() && progress.current_step_index >= total {
            if self.store.load()?.completed {
                return self.lease_lost(result);
            }
            progress.complete(total);
            if !self.store.save_as_holder(holder, &progress)? {
                return self.lease_lost(result);
            }
            info!("Provisioning complete");
            result.completed = true;
            result.log.push("Provisioning complete".to_string());
            teardown = true;
        }

        result.progress_percent = progress.percent(total);
        Ok(LeasedRun { result, teardown })
    }

    /// Stop after another invocation took the lease over. Its record stands.
    fn lease_lost(&self, mut result: RunResult) -> Result<LeasedRun> {
        warn!("Lease taken over by another invocation; stopping");
        let current = self.store.load()?;
        result.outcome = RunOutcome::Busy;
        result.success = false;
        result.completed = current.completed;
        result.progress_percent = current.percent(self.registry.len());
        result.log.push("Lease lost to another invocation".to_string());
        Ok(LeasedRun {
            result,
            teardown: false,
        })
    }

    /// Signal the site that provisioning finished. Failures are reported, not retried.
    fn teardown(&self, result: &mut RunResult) {
        let option = &self.options.completion_option;
        match self.site.mark_provisioning_complete(option) {
            Ok(()) => result.log.push(format!("Marked site complete ({})", option)),
            Err(e) => {
                warn!("Could not mark provisioning complete: {}", e);
                result.log.push(format!("Could not mark site complete: {}", e));
            }
        }

        if let Some(plugin) = &self.options.self_uninstall {
            match self.site.self_uninstall(plugin) {
                Ok(()) => result.log.push(format!("Removed {}", plugin)),
                Err(e) => {
                    warn!("Could not remove {}: {}", plugin, e);
                    result.log.push(format!("Could not remove {}: {}", plugin, e));
                }
            }
        }
    }
}
