//! Progress state for provisioned sites.
//!
//! This module tracks where each site is in its step sequence, which
//! invocation currently holds the run lease, and a journal of step results.

pub mod journal;
pub mod memory;
pub mod progress;
pub mod site_id;
pub mod store;

pub use journal::JournalEntry;
pub use memory::MemoryProgressStore;
pub use progress::{holder_token, Lease, RunProgress};
pub use site_id::SiteId;
pub use store::{FileProgressStore, ProgressStore};
