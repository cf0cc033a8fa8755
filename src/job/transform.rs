use crate::core::{BatchError, Result, UserRecord, UserStatus};
use chrono::{DateTime, Utc};

/// Per-record state transition. Implementations must be pure: no I/O, no
/// shared-state mutation, deterministic for a given input.
pub trait ItemTransform: Send + Sync {
    fn apply(&self, user: UserRecord) -> Result<UserRecord>;
}

/// The production transform: ACTIVE -> INACTIVE, `updated_at` stamped with
/// the job's `now` parameter, everything else untouched.
pub struct Inactivate {
    now: DateTime<Utc>,
}

impl Inactivate {
    pub fn new(now: DateTime<Utc>) -> Self {
        Self { now }
    }
}

impl ItemTransform for Inactivate {
    fn apply(&self, user: UserRecord) -> Result<UserRecord> {
        if user.status != UserStatus::Active {
            // The source predicate only selects ACTIVE records; anything else
            // reaching the transform means the snapshot was built wrong.
            return Err(BatchError::TransformError(format!(
                "user '{}' is not active",
                user.idx
            )));
        }
        Ok(user.into_inactive(self.now))
    }
}
