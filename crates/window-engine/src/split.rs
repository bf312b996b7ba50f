//! Windows assembled from several same-day segments.
//!
//! For each business day the finder lays minimal segments
//! `[t, t + min_segment)` on the candidate grid, keeps those free for every
//! participant under the gap-expanded index, and then walks `k`-segment
//! combinations for `k = 1..=max_segments` in lexicographic order. A
//! combination is a window when its segments are chronologically ordered,
//! pairwise non-overlapping, and add up to at least the requested total.
//!
//! Only chronologically compatible combinations are generated (see
//! [`Combinations::chains`]); the order among them is the same as filtering
//! the full lexicographic enumeration. Sizes `k` with
//! `k * min_segment < total` cannot reach the total and are skipped.

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::budget::SearchBudget;
use crate::candidates::{candidate_step, CandidateGenerator};
use crate::combinatorics::Combinations;
use crate::config::{SearchConfig, WindowRequirement};
use crate::error::Result;
use crate::index::OverlapIndex;
use crate::outcome::{SearchOutcome, SearchStats};
use crate::rules::CalendarRules;
use crate::scorer::{BestWindow, WindowScorer};
use crate::slot::{hours_to_duration, Segment, SearchWindow};
use crate::store::BusyCalendarStore;

/// Parameters of a split-window search, at millisecond precision.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SplitShape {
    pub total: Duration,
    pub min_segment: Duration,
    pub max_segments: u32,
}

impl SplitShape {
    pub fn new(total_hours: f64, min_segment_hours: f64, max_segments: u32) -> Result<Self> {
        WindowRequirement::split(total_hours, min_segment_hours, max_segments).validate()?;
        Ok(Self {
            total: hours_to_duration(total_hours),
            min_segment: hours_to_duration(min_segment_hours),
            max_segments,
        })
    }

    /// Segment counts that can reach the total with minimal segments.
    fn segment_counts(&self, available: usize) -> impl Iterator<Item = usize> + '_ {
        let upper = (self.max_segments as usize).min(available);
        (1..=upper).filter(move |&k| self.min_segment * (k as i32) >= self.total)
    }
}

/// Chronologically ordered, pairwise disjoint, and long enough in total.
pub fn is_valid_combination(segments: &[Segment], total: Duration) -> bool {
    if segments.is_empty() {
        return false;
    }
    let ordered = segments
        .windows(2)
        .all(|pair| pair[0].end <= pair[1].start);
    let sum = segments
        .iter()
        .fold(Duration::zero(), |acc, s| acc + s.duration());
    ordered && sum >= total
}

/// Finds the best split window for the full participant set.
///
/// `maximize_participants` only affects scoring here: every split window
/// covers all participants.
#[derive(Debug, Clone, Copy)]
pub struct SplitWindowFinder<'a> {
    store: &'a BusyCalendarStore,
    rules: &'a CalendarRules,
}

impl<'a> SplitWindowFinder<'a> {
    pub fn new(store: &'a BusyCalendarStore, rules: &'a CalendarRules) -> Self {
        Self { store, rules }
    }

    pub fn find(
        &self,
        config: &SearchConfig,
        shape: SplitShape,
        budget: &mut SearchBudget,
    ) -> Result<SearchOutcome> {
        config.validate()?;
        let scorer = WindowScorer::new(self.store, config);
        let mut best = BestWindow::new();

        let stats = self.scan(config, shape, budget, |window| {
            let score = scorer.score(&window);
            best.offer(window, score);
        });

        let outcome = SearchOutcome::from_best(best, stats);
        info!(
            found = outcome.is_found(),
            score = ?outcome.score,
            stats = %outcome.stats,
            "split window search finished"
        );
        Ok(outcome)
    }

    /// Every valid combination in enumeration order, unscored.
    pub fn candidates(
        &self,
        config: &SearchConfig,
        shape: SplitShape,
        budget: &mut SearchBudget,
    ) -> Result<Vec<SearchWindow>> {
        config.validate()?;
        let mut windows = Vec::new();
        self.scan(config, shape, budget, |window| windows.push(window));
        Ok(windows)
    }

    fn scan(
        &self,
        config: &SearchConfig,
        shape: SplitShape,
        budget: &mut SearchBudget,
        mut visit: impl FnMut(SearchWindow),
    ) -> SearchStats {
        let days: Vec<NaiveDate> = self
            .rules
            .business_days(
                config.start_date,
                config.end_date,
                config.include_weekends,
                config.include_holidays,
            )
            .collect();
        let step = candidate_step(config.min_gap());
        let index = OverlapIndex::build(self.store, &config.participants, config.min_gap());

        let mut stats = SearchStats {
            subsets_searched: 1,
            days_searched: days.len() as u64,
            ..SearchStats::default()
        };

        'search: for &day in &days {
            let generator = CandidateGenerator::new(
                day,
                config.earliest_start_time,
                config.latest_end_time,
                step,
            );
            let free: Vec<Segment> = generator
                .segments(shape.min_segment)
                .filter(|s| !index.overlaps(s.start, s.end))
                .collect();
            let successors = successor_table(&free);

            for k in shape.segment_counts(free.len()) {
                for combination in Combinations::chains(successors.clone(), k) {
                    if !budget.tick() {
                        break 'search;
                    }
                    stats.candidates_examined += 1;
                    let segments: Vec<Segment> = combination.iter().map(|&i| free[i]).collect();
                    if !is_valid_combination(&segments, shape.total) {
                        continue;
                    }
                    let participants = config.participants.clone();
                    if let Some(window) = SearchWindow::split(segments, participants) {
                        stats.windows_found += 1;
                        visit(window);
                    }
                }
            }
            debug!(
                %day,
                free_segments = free.len(),
                examined = stats.candidates_examined,
                "day searched"
            );
        }

        stats.stop_reason = budget.stop_reason();
        stats
    }
}

/// `next[i]`: first segment starting at or after segment `i` ends.
fn successor_table(segments: &[Segment]) -> Vec<usize> {
    segments
        .iter()
        .map(|s| segments.partition_point(|other| other.start < s.end))
        .collect()
}
