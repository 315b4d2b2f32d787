//! Failed-login counting and temporary account locks

use chrono::{DateTime, Duration, Utc};

/// Consecutive failures that trigger a lock
pub const MAX_FAILED_ATTEMPTS: i64 = 3;

/// How long a lock lasts once triggered
pub fn lockout_window() -> Duration {
    Duration::minutes(15)
}

/// Per-account counter and lock expiry as persisted on the user row
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LockoutState {
    pub failed_attempts: i64,
    pub lockout_until: Option<DateTime<Utc>>,
}

/// Whether an account may attempt a password check right now
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LockoutStatus {
    Active,
    Locked { until: DateTime<Utc> },
}

/// Result of recording a wrong password
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailureOutcome {
    Invalid {
        failed_attempts: i64,
    },
    Locked {
        failed_attempts: i64,
        until: DateTime<Utc>,
    },
}

/// Pure state machine over [`LockoutState`]
///
/// Persistence is left to the caller so the transitions can be tested with
/// a fixed clock.
pub struct LockoutGuard;

impl LockoutGuard {
    /// A lock is in force only while `now` is strictly before its expiry
    pub fn status(state: &LockoutState, now: DateTime<Utc>) -> LockoutStatus {
        match state.lockout_until {
            Some(until) if now < until => LockoutStatus::Locked { until },
            _ => LockoutStatus::Active,
        }
    }

    /// Count one more failure, locking the account on the threshold
    ///
    /// The counter survives an expired lock, so the first failure after
    /// expiry locks again.
    pub fn record_failure(state: LockoutState, now: DateTime<Utc>) -> (LockoutState, FailureOutcome) {
        let failed_attempts = state.failed_attempts + 1;

        if failed_attempts >= MAX_FAILED_ATTEMPTS {
            let until = now + lockout_window();
            (
                LockoutState {
                    failed_attempts,
                    lockout_until: Some(until),
                },
                FailureOutcome::Locked {
                    failed_attempts,
                    until,
                },
            )
        } else {
            (
                LockoutState {
                    failed_attempts,
                    lockout_until: state.lockout_until,
                },
                FailureOutcome::Invalid { failed_attempts },
            )
        }
    }

    /// Cleared state after a correct password, or `None` if nothing to clear
    pub fn record_success(state: LockoutState) -> Option<LockoutState> {
        if state.failed_attempts > 0 || state.lockout_until.is_some() {
            Some(LockoutState::default())
        } else {
            None
        }
    }
}
