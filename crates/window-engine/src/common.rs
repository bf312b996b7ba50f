//! Contiguous windows free for a whole participant subset.
//!
//! Enumeration order, which doubles as the tie-break order:
//!
//! 1. participant subsets, largest first (only the full set unless
//!    `maximize_participants` is on and there are several participants);
//! 2. business days, ascending;
//! 3. grid start times within the day, ascending.
//!
//! A candidate `[t, t + D)` is a window when the subset's gap-expanded
//! [`OverlapIndex`](crate::index::OverlapIndex) reports no overlap.

use chrono::{Duration, NaiveDate};
use tracing::{debug, info};

use crate::budget::SearchBudget;
use crate::candidates::{candidate_step, CandidateGenerator};
use crate::combinatorics::SubsetsBySize;
use crate::config::{SearchConfig, WindowRequirement};
use crate::error::Result;
use crate::index::IndexCache;
use crate::outcome::{SearchOutcome, SearchStats};
use crate::rules::CalendarRules;
use crate::scorer::{BestWindow, WindowScorer};
use crate::slot::{hours_to_duration, ParticipantId, SearchWindow};
use crate::store::BusyCalendarStore;

/// Finds the best common window over calendars already loaded into a store.
///
/// Participants whose calendars are not in the store count as free.
#[derive(Debug, Clone, Copy)]
pub struct CommonWindowFinder<'a> {
    store: &'a BusyCalendarStore,
    rules: &'a CalendarRules,
}

impl<'a> CommonWindowFinder<'a> {
    pub fn new(store: &'a BusyCalendarStore, rules: &'a CalendarRules) -> Self {
        Self { store, rules }
    }

    /// Highest-scoring window of `required_hours`, or `None` if no candidate is free.
    pub fn find(
        &self,
        config: &SearchConfig,
        required_hours: f64,
        budget: &mut SearchBudget,
    ) -> Result<SearchOutcome> {
        let duration = validated_duration(config, required_hours)?;
        let scorer = WindowScorer::new(self.store, config);
        let mut best = BestWindow::new();

        let stats = self.scan(config, duration, budget, |window| {
            let score = scorer.score(&window);
            best.offer(window, score);
        });

        let outcome = SearchOutcome::from_best(best, stats);
        info!(
            found = outcome.is_found(),
            score = ?outcome.score,
            stats = %outcome.stats,
            "common window search finished"
        );
        Ok(outcome)
    }

    /// Every free candidate in enumeration order, unscored.
    pub fn candidates(
        &self,
        config: &SearchConfig,
        required_hours: f64,
        budget: &mut SearchBudget,
    ) -> Result<Vec<SearchWindow>> {
        let duration = validated_duration(config, required_hours)?;
        let mut windows = Vec::new();
        self.scan(config, duration, budget, |window| windows.push(window));
        Ok(windows)
    }

    fn scan(
        &self,
        config: &SearchConfig,
        duration: Duration,
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
        let n = config.participants.len();
        let subsets = if config.scoring.maximize_participants && n > 1 {
            SubsetsBySize::new(n)
        } else {
            SubsetsBySize::full(n)
        };

        let mut stats = SearchStats {
            days_searched: days.len() as u64,
            ..SearchStats::default()
        };
        let mut cache = IndexCache::new(config.min_gap());

        'search: for indices in subsets {
            let subset: Vec<ParticipantId> = indices
                .iter()
                .map(|&i| config.participants[i].clone())
                .collect();
            let index = cache.get_or_build(self.store, &subset);
            stats.subsets_searched += 1;

            for &day in &days {
                let generator = CandidateGenerator::new(
                    day,
                    config.earliest_start_time,
                    config.latest_end_time,
                    step,
                );
                for start in generator.starts(duration) {
                    if !budget.tick() {
                        break 'search;
                    }
                    stats.candidates_examined += 1;
                    if !index.overlaps(start, start + duration) {
                        stats.windows_found += 1;
                        visit(SearchWindow::common(start, duration, subset.clone()));
                    }
                }
            }
            debug!(
                subset = ?subset,
                examined = stats.candidates_examined,
                "subset searched"
            );
        }

        stats.stop_reason = budget.stop_reason();
        stats
    }
}

fn validated_duration(config: &SearchConfig, required_hours: f64) -> Result<Duration> {
    config.validate()?;
    WindowRequirement::common(required_hours).validate()?;
    Ok(hours_to_duration(required_hours))
}
