//! Normalized, weighted multi-criteria window scoring.
//!
//! Each enabled criterion yields a sub-score in `[0, 1]`, multiplied by its
//! weight and summed. Only the relative order of scores within one search is
//! meaningful.
//!
//! - **participants**: `|window.participants| / |universe|`
//! - **start time**: `1 - min(hours since reference / 24, 1)`
//! - **total idle**: per participant, the gap since their last slot that
//!   day (or day start) plus the gap until their next slot that day (or day
//!   end); summed and normalized by `2 * work_day_hours * |participants|`
//! - **max gap**: the largest single such gap, normalized by `work_day_hours`

use chrono::{NaiveDateTime, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::config::{ScoringConfig, SearchConfig};
use crate::slot::{duration_to_hours, ParticipantId, SearchWindow};
use crate::store::BusyCalendarStore;

/// Horizon of the start-time criterion.
const START_HORIZON_HOURS: f64 = 24.0;

/// Sub-scores of one window, `None` for disabled criteria.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ScoreBreakdown {
    pub participants: Option<f64>,
    pub start_time: Option<f64>,
    pub total_idle: Option<f64>,
    pub max_gap: Option<f64>,
    pub total: f64,
}

#[derive(Debug, Clone)]
pub struct WindowScorer<'a> {
    store: &'a BusyCalendarStore,
    scoring: &'a ScoringConfig,
    universe_size: usize,
    reference: NaiveDateTime,
    earliest: NaiveTime,
    latest: NaiveTime,
    work_day_hours: f64,
}

impl<'a> WindowScorer<'a> {
    /// Scorer for windows of `config`; the reference instant is the first
    /// day's earliest start time.
    pub fn new(store: &'a BusyCalendarStore, config: &'a SearchConfig) -> Self {
        Self {
            store,
            scoring: &config.scoring,
            universe_size: config.participants.len(),
            reference: config.start_date.and_time(config.earliest_start_time),
            earliest: config.earliest_start_time,
            latest: config.latest_end_time,
            work_day_hours: config.work_day_hours(),
        }
    }

    pub fn score(&self, window: &SearchWindow) -> f64 {
        self.breakdown(window).total
    }

    pub fn breakdown(&self, window: &SearchWindow) -> ScoreBreakdown {
        let s = self.scoring;

        let participants = (s.maximize_participants && self.universe_size > 0)
            .then(|| window.participants.len() as f64 / self.universe_size as f64);

        let start_time = s.minimize_start_time.then(|| {
            let delay = duration_to_hours(window.start - self.reference);
            complement(delay / START_HORIZON_HOURS)
        });

        let needs_gaps = s.minimize_total_idle || s.minimize_max_gap;
        let gaps: Vec<(f64, f64)> = if needs_gaps {
            window
                .participants
                .iter()
                .map(|p| self.gaps_around(p, window))
                .collect()
        } else {
            Vec::new()
        };

        let total_idle = (s.minimize_total_idle && !gaps.is_empty()).then(|| {
            let idle: f64 = gaps.iter().map(|(before, after)| before + after).sum();
            let max_idle = 2.0 * self.work_day_hours * gaps.len() as f64;
            complement(ratio(idle, max_idle))
        });

        let max_gap = (s.minimize_max_gap && !gaps.is_empty()).then(|| {
            let largest = gaps
                .iter()
                .map(|(before, after)| before.max(*after))
                .fold(0.0_f64, f64::max);
            complement(ratio(largest, self.work_day_hours))
        });

        let total = participants.unwrap_or(0.0) * s.weight_participants
            + start_time.unwrap_or(0.0) * s.weight_start_time
            + total_idle.unwrap_or(0.0) * s.weight_total_idle
            + max_gap.unwrap_or(0.0) * s.weight_max_gap;

        ScoreBreakdown {
            participants,
            start_time,
            total_idle,
            max_gap,
            total,
        }
    }

    /// Hours between the participant's previous and next same-day slots and the window.
    fn gaps_around(&self, participant: &ParticipantId, window: &SearchWindow) -> (f64, f64) {
        let start_day = window.start.date();
        let end_day = window.end.date();
        let calendar = self.store.get(participant);

        let previous_end = calendar
            .and_then(|c| c.last_end_before(window.start))
            .filter(|end| end.date() == start_day)
            .unwrap_or_else(|| start_day.and_time(self.earliest));
        let next_start = calendar
            .and_then(|c| c.next_start_after(window.end))
            .filter(|start| start.date() == end_day)
            .unwrap_or_else(|| end_day.and_time(self.latest));

        (
            duration_to_hours(window.start - previous_end).max(0.0),
            duration_to_hours(next_start - window.end).max(0.0),
        )
    }
}

fn ratio(value: f64, max: f64) -> f64 {
    if max > 0.0 {
        value / max
    } else {
        0.0
    }
}

/// `1 - min(x, 1)`, kept within `[0, 1]`.
fn complement(x: f64) -> f64 {
    (1.0 - x.min(1.0)).clamp(0.0, 1.0)
}

/// Streaming arg-max over scored windows.
///
/// A window replaces the incumbent only with a strictly greater score, so
/// among equal scores the first one offered wins.
#[derive(Debug, Clone, Default)]
pub struct BestWindow {
    best: Option<(SearchWindow, f64)>,
    offered: u64,
}

impl BestWindow {
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns `true` if `window` became the new incumbent.
    pub fn offer(&mut self, window: SearchWindow, score: f64) -> bool {
        self.offered += 1;
        let better = match &self.best {
            Some((_, best)) => score > *best,
            None => true,
        };
        if better {
            self.best = Some((window, score));
        }
        better
    }

    pub fn offered(&self) -> u64 {
        self.offered
    }

    pub fn best_score(&self) -> Option<f64> {
        self.best.as_ref().map(|(_, s)| *s)
    }

    pub fn into_inner(self) -> Option<(SearchWindow, f64)> {
        self.best
    }
}
