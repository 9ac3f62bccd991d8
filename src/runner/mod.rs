//! Step sequencing.
//!
//! [`Sequencer`] owns the transition from one step to the next: lease,
//! execute, persist, and teardown once the last step succeeds.

pub mod result;
pub mod sequencer;

pub use result::{RunOutcome, RunResult};
pub use sequencer::{AdvanceMode, SequenceEvent, Sequencer, SequencerOptions};
