//! Work limits for one search: deadline, cancellation, candidate ceiling.
//!
//! Finders call [`SearchBudget::tick`] once per examined candidate and stop
//! enumerating as soon as it returns `false`. The clock and the cancellation
//! flag are only consulted every 1024 ticks (and on the first one), so the
//! check stays cheap inside the combinatorial loops. Once a limit trips the
//! budget stays exhausted.

use std::fmt;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};

use serde::{Deserialize, Serialize};

use crate::config::SearchLimits;

/// Check the clock every 1024 ticks (2^10).
const CLOCK_CHECK_MASK: u64 = 0x3FF;

/// Why a search stopped before exhausting its enumeration.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum StopReason {
    Deadline,
    Cancelled,
    CandidateLimit,
}

impl fmt::Display for StopReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StopReason::Deadline => write!(f, "time limit reached"),
            StopReason::Cancelled => write!(f, "cancelled"),
            StopReason::CandidateLimit => write!(f, "candidate limit reached"),
        }
    }
}

#[derive(Debug, Clone, Default)]
pub struct SearchBudget {
    deadline: Option<Instant>,
    cancel: Option<Arc<AtomicBool>>,
    max_candidates: Option<u64>,
    examined: u64,
    stopped: Option<StopReason>,
}

impl SearchBudget {
    pub fn unlimited() -> Self {
        Self::default()
    }

    /// Budget starting now, bounded by `limits`.
    pub fn from_limits(limits: &SearchLimits) -> Self {
        Self {
            deadline: limits
                .time_limit_ms
                .map(|ms| Instant::now() + Duration::from_millis(ms)),
            max_candidates: limits.max_candidates,
            ..Self::default()
        }
    }

    pub fn with_deadline(mut self, deadline: Instant) -> Self {
        self.deadline = Some(deadline);
        self
    }

    pub fn with_max_candidates(mut self, max_candidates: u64) -> Self {
        self.max_candidates = Some(max_candidates);
        self
    }

    /// Stop the search once `flag` is set to `true` by another thread.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    /// Account for one candidate. Returns `false` when the search must stop.
    #[inline]
    pub fn tick(&mut self) -> bool {
        if self.stopped.is_some() {
            return false;
        }
        if self.examined & CLOCK_CHECK_MASK == 0 {
            if let Some(reason) = self.check_external() {
                self.stopped = Some(reason);
                return false;
            }
        }
        if let Some(max) = self.max_candidates {
            if self.examined >= max {
                self.stopped = Some(StopReason::CandidateLimit);
                return false;
            }
        }
        self.examined = self.examined.wrapping_add(1);
        true
    }

    fn check_external(&self) -> Option<StopReason> {
        if self
            .cancel
            .as_ref()
            .is_some_and(|flag| flag.load(Ordering::Relaxed))
        {
            return Some(StopReason::Cancelled);
        }
        if self.deadline.is_some_and(|d| Instant::now() >= d) {
            return Some(StopReason::Deadline);
        }
        None
    }

    /// Candidates accounted for so far.
    pub fn examined(&self) -> u64 {
        self.examined
    }

    pub fn stop_reason(&self) -> Option<StopReason> {
        self.stopped
    }

    pub fn is_exhausted(&self) -> bool {
        self.stopped.is_some()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unlimited_budget_never_stops() {
        let mut budget = SearchBudget::unlimited();
        assert!((0..10_000).all(|_| budget.tick()));
        assert_eq!(budget.examined(), 10_000);
        assert_eq!(budget.stop_reason(), None);
    }

    #[test]
    fn candidate_limit_is_exact() {
        let mut budget = SearchBudget::unlimited().with_max_candidates(3);
        assert!(budget.tick());
        assert!(budget.tick());
        assert!(budget.tick());
        assert!(!budget.tick());
        assert_eq!(budget.examined(), 3);
        assert_eq!(budget.stop_reason(), Some(StopReason::CandidateLimit));
    }

    #[test]
    fn preset_cancel_flag_stops_on_first_tick() {
        let flag = Arc::new(AtomicBool::new(true));
        let mut budget = SearchBudget::unlimited().with_cancel_flag(flag);
        assert!(!budget.tick());
        assert_eq!(budget.stop_reason(), Some(StopReason::Cancelled));
    }

    #[test]
    fn expired_deadline_stops_on_first_tick() {
        let mut budget = SearchBudget::unlimited().with_deadline(Instant::now());
        assert!(!budget.tick());
        assert_eq!(budget.stop_reason(), Some(StopReason::Deadline));
    }

    #[test]
    fn exhaustion_latches() {
        let mut budget = SearchBudget::unlimited().with_max_candidates(0);
        assert!(!budget.tick());
        assert!(!budget.tick());
        assert!(budget.is_exhausted());
    }

    #[test]
    fn cancel_flag_observed_at_check_interval() {
        let flag = Arc::new(AtomicBool::new(false));
        let mut budget = SearchBudget::unlimited().with_cancel_flag(Arc::clone(&flag));
        assert!(budget.tick());
        flag.store(true, Ordering::Relaxed);
        let ran = (0..5_000).take_while(|_| budget.tick()).count();
        assert_eq!(ran as u64, CLOCK_CHECK_MASK);
        assert_eq!(budget.stop_reason(), Some(StopReason::Cancelled));
    }
}
