//! Fixed-step start-time candidates within one day's work hours.
//!
//! Both finders draw from the same generator: the common finder with the
//! required window duration, the split finder with the minimum segment
//! duration. A candidate `t` is produced when `t + duration <= day_end`.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};

use crate::slot::Segment;

/// Grid step used unless the minimum gap is coarser.
pub const DEFAULT_STEP_MINUTES: i64 = 15;

/// Step between candidates: 15 minutes, or `min_gap` when that is larger.
pub fn candidate_step(min_gap: Duration) -> Duration {
    let default = Duration::minutes(DEFAULT_STEP_MINUTES);
    if min_gap > default {
        min_gap
    } else {
        default
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateGenerator {
    day_start: NaiveDateTime,
    day_end: NaiveDateTime,
    step: Duration,
}

impl CandidateGenerator {
    pub fn new(date: NaiveDate, earliest: NaiveTime, latest: NaiveTime, step: Duration) -> Self {
        let step = if step > Duration::zero() {
            step
        } else {
            Duration::minutes(DEFAULT_STEP_MINUTES)
        };
        Self {
            day_start: date.and_time(earliest),
            day_end: date.and_time(latest),
            step,
        }
    }

    pub fn day_start(&self) -> NaiveDateTime {
        self.day_start
    }

    pub fn day_end(&self) -> NaiveDateTime {
        self.day_end
    }

    pub fn step(&self) -> Duration {
        self.step
    }

    /// Start times `t` on the grid with `t + duration <= day_end`.
    pub fn starts(&self, duration: Duration) -> CandidateStarts {
        CandidateStarts {
            next: Some(self.day_start),
            last: self.day_end.checked_sub_signed(duration),
            step: self.step,
        }
    }

    /// Segments `[t, t + duration)` for every candidate start.
    pub fn segments(&self, duration: Duration) -> impl Iterator<Item = Segment> + Clone {
        self.starts(duration)
            .filter_map(move |start| {
                start
                    .checked_add_signed(duration)
                    .map(|end| Segment::new(start, end))
            })
    }
}

/// Lazy, finite sequence of candidate starts. Clone it to restart.
///
/// Empty when `day_end - duration` is not representable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CandidateStarts {
    next: Option<NaiveDateTime>,
    last: Option<NaiveDateTime>,
    step: Duration,
}

impl Iterator for CandidateStarts {
    type Item = NaiveDateTime;

    fn next(&mut self) -> Option<Self::Item> {
        let (current, last) = (self.next?, self.last?);
        if current > last {
            return None;
        }
        self.next = current.checked_add_signed(self.step);
        Some(current)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn generator(step_minutes: i64) -> CandidateGenerator {
        CandidateGenerator::new(
            NaiveDate::from_ymd_opt(2025, 6, 9).unwrap(),
            NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
            NaiveTime::from_hms_opt(11, 0, 0).unwrap(),
            Duration::minutes(step_minutes),
        )
    }

    #[test]
    fn last_candidate_may_end_at_day_end() {
        let starts: Vec<_> = generator(15).starts(Duration::hours(1)).collect();
        assert_eq!(starts.len(), 5);
        assert_eq!(starts.last().unwrap().time(), NaiveTime::from_hms_opt(10, 0, 0).unwrap());
    }

    #[test]
    fn duration_longer_than_day_yields_nothing() {
        assert_eq!(generator(15).starts(Duration::hours(3)).count(), 0);
    }

    #[test]
    fn step_uses_larger_min_gap() {
        assert_eq!(candidate_step(Duration::zero()), Duration::minutes(15));
        assert_eq!(candidate_step(Duration::minutes(3)), Duration::minutes(15));
        assert_eq!(candidate_step(Duration::minutes(30)), Duration::minutes(30));
    }

    #[test]
    fn unrepresentable_duration_yields_nothing() {
        let huge = Duration::days(365 * 300_000);
        assert_eq!(generator(15).starts(huge).count(), 0);
        assert_eq!(generator(15).segments(huge).count(), 0);
    }

    #[test]
    fn non_positive_step_falls_back_to_default() {
        assert_eq!(generator(0).step(), Duration::minutes(15));
    }

    #[test]
    fn clone_restarts_sequence() {
        let starts = generator(30).starts(Duration::minutes(30));
        assert_eq!(starts.collect::<Vec<_>>(), starts.clone().collect::<Vec<_>>());
    }
}
