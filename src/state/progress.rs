//! The persisted progress record and the run lease.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

/// Where a site is in its provisioning sequence.
///
/// `current_step_index` is the next step to run. It only moves forward,
/// except through an explicit reset, and `completed` implies it equals the
/// number of steps.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct RunProgress {
    /// Index of the next step to execute.
    pub current_step_index: usize,

    /// Whether every step has succeeded.
    pub completed: bool,

    /// Expiry of the lease held by the invocation currently running, if any.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub lease_expiry: Option<DateTime<Utc>>,

    /// Fingerprint of the step registry the run started with.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fingerprint: Option<String>,

    /// When the record was last written.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub updated_at: Option<DateTime<Utc>>,
}

impl RunProgress {
    /// Whether no step has run yet.
    pub fn is_fresh(&self) -> bool {
        self.current_step_index == 0 && !self.completed
    }

    /// Percentage of `total` steps done, rounded down; 100 when there are none.
    pub fn percent(&self, total: usize) -> u8 {
        if total == 0 || self.completed {
            return 100;
        }
        let index = self.current_step_index.min(total);
        (index * 100 / total) as u8
    }

    /// Whether a lease is held and unexpired at `now`.
    pub fn lease_active(&self, now: DateTime<Utc>) -> bool {
        self.lease_expiry.is_some_and(|expiry| expiry > now)
    }

    /// Mark one more step as done.
    pub fn advance(&mut self) {
        self.current_step_index += 1;
        self.touch();
    }

    /// Mark the whole sequence as done.
    pub fn complete(&mut self, total: usize) {
        self.current_step_index = total;
        self.completed = true;
        self.touch();
    }

    fn touch(&mut self) {
        self.updated_at = Some(Utc::now());
    }
}

/// A short-lived claim that one invocation is executing steps.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Lease {
    /// Token identifying the invocation holding the lease.
    pub holder: String,

    /// When the lease lapses.
    pub expires_at: DateTime<Utc>,
}

impl Lease {
    /// A lease for `holder` valid for `ttl` from now.
    pub fn new(holder: &str, ttl: std::time::Duration) -> Self {
        let ttl = Duration::from_std(ttl).unwrap_or_else(|_| Duration::days(365));
        let expires_at = Utc::now()
            .checked_add_signed(ttl)
            .unwrap_or(DateTime::<Utc>::MAX_UTC);
        Self {
            holder: holder.to_string(),
            expires_at,
        }
    }

    /// Whether the lease is still valid at `now`.
    pub fn is_active(&self, now: DateTime<Utc>) -> bool {
        self.expires_at > now
    }
}

/// Generate a lease holder token unique to this process and moment.
pub fn holder_token() -> String {
    use std::sync::atomic::{AtomicU64, Ordering};
    static COUNTER: AtomicU64 = AtomicU64::new(0);

    format!(
        "{}-{}-{}",
        std::process::id(),
        Utc::now().timestamp_nanos_opt().unwrap_or_default(),
        COUNTER.fetch_add(1, Ordering::Relaxed)
    )
}
