use serde::{Deserialize, Serialize};
use vodca::{AsRefln, Fromln, References};

use crate::entity::{FinePerDay, LendingDuration};

/// Maximum number of lendings a reader may hold open at once.
#[derive(Debug, Clone, Copy, Eq, PartialEq, Fromln, AsRefln, Serialize, Deserialize)]
pub struct OutstandingLimit(usize);

impl OutstandingLimit {
    pub fn new(limit: impl Into<usize>) -> Self {
        Self(limit.into())
    }
}

/// Library rules applied when a lending is opened.
#[derive(Debug, Clone, Eq, PartialEq, References)]
pub struct LendingPolicy {
    duration: LendingDuration,
    fine_per_day: FinePerDay,
    outstanding_limit: OutstandingLimit,
}

impl LendingPolicy {
    pub fn new(
        duration: LendingDuration,
        fine_per_day: FinePerDay,
        outstanding_limit: OutstandingLimit,
    ) -> Self {
        Self {
            duration,
            fine_per_day,
            outstanding_limit,
        }
    }
}

impl Default for LendingPolicy {
    fn default() -> Self {
        Self::new(
            LendingDuration::new(15),
            FinePerDay::new(200),
            OutstandingLimit::new(3usize),
        )
    }
}
