//! Orchestration of one or more window searches over a shared calendar store.

use std::sync::atomic::AtomicBool;
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::{info, warn};

use crate::budget::SearchBudget;
use crate::common::CommonWindowFinder;
use crate::config::{SearchConfig, SearchRequest, WindowRequirement};
use crate::error::Result;
use crate::outcome::SearchOutcome;
use crate::rules::CalendarRules;
use crate::slot::{ParticipantId, SearchWindow};
use crate::source::CalendarSource;
use crate::split::{SplitShape, SplitWindowFinder};
use crate::store::{BusyCalendarStore, LoadWarning};

/// Result of one request in a batch.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    /// Position of the request in the batch.
    pub index: usize,
    /// `common_window` or `split_window`.
    pub kind: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub outcome: Option<SearchOutcome>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// Loads calendars, runs the finder a request asks for, and returns its best window.
///
/// Calendars stay cached in the analyzer's store across searches; call
/// [`ScheduleAnalyzer::store_mut`] to refresh or clear them.
#[derive(Debug)]
pub struct ScheduleAnalyzer {
    store: BusyCalendarStore,
    rules: CalendarRules,
    cancel: Option<Arc<AtomicBool>>,
}

impl ScheduleAnalyzer {
    /// Analyzer without holidays.
    pub fn new(source: impl CalendarSource + 'static) -> Self {
        Self {
            store: BusyCalendarStore::new(source),
            rules: CalendarRules::without_holidays(),
            cancel: None,
        }
    }

    pub fn with_rules(mut self, rules: CalendarRules) -> Self {
        self.rules = rules;
        self
    }

    /// Searches stop with [`StopReason::Cancelled`](crate::budget::StopReason)
    /// once `flag` is set.
    pub fn with_cancel_flag(mut self, flag: Arc<AtomicBool>) -> Self {
        self.cancel = Some(flag);
        self
    }

    pub fn store(&self) -> &BusyCalendarStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut BusyCalendarStore {
        &mut self.store
    }

    pub fn rules(&self) -> &CalendarRules {
        &self.rules
    }

    /// Calendar loading problems recorded so far.
    pub fn warnings(&self) -> &[LoadWarning] {
        self.store.warnings()
    }

    /// Best contiguous window of `required_hours`, or `None` if there is none.
    pub fn find_common_window(
        &mut self,
        config: &SearchConfig,
        required_hours: f64,
    ) -> Result<Option<SearchWindow>> {
        let request = SearchRequest::new(config.clone(), WindowRequirement::common(required_hours));
        Ok(self.search(&request)?.into_window())
    }

    /// Best split window, or `None` if there is none.
    pub fn find_split_window(
        &mut self,
        config: &SearchConfig,
        total_hours: f64,
        min_segment_hours: f64,
        max_segments: u32,
    ) -> Result<Option<SearchWindow>> {
        let request = SearchRequest::new(
            config.clone(),
            WindowRequirement::split(total_hours, min_segment_hours, max_segments),
        );
        Ok(self.search(&request)?.into_window())
    }

    /// Validate `request`, load its participants, and run the matching finder.
    pub fn search(&mut self, request: &SearchRequest) -> Result<SearchOutcome> {
        request.validate()?;
        let config = &request.config;
        info!(
            kind = request.requirement.kind_name(),
            participants = config.participants.len(),
            start_date = %config.start_date,
            end_date = %config.end_date,
            "window search started"
        );

        self.load_participants(&config.participants);
        let mut budget = self.budget_for(config);

        match request.requirement {
            WindowRequirement::CommonWindow { required_duration } => {
                CommonWindowFinder::new(&self.store, &self.rules).find(
                    config,
                    required_duration,
                    &mut budget,
                )
            }
            WindowRequirement::SplitWindow {
                total_duration,
                min_segment_duration,
                max_segments,
            } => {
                let shape = SplitShape::new(total_duration, min_segment_duration, max_segments)?;
                SplitWindowFinder::new(&self.store, &self.rules).find(config, shape, &mut budget)
            }
        }
    }

    /// Run every request; a failing request is reported, not propagated.
    pub fn analyze(&mut self, requests: &[SearchRequest]) -> Vec<AnalysisReport> {
        requests
            .iter()
            .enumerate()
            .map(|(index, request)| {
                let kind = request.requirement.kind_name().to_string();
                match self.search(request) {
                    Ok(outcome) => AnalysisReport {
                        index,
                        kind,
                        outcome: Some(outcome),
                        error: None,
                    },
                    Err(e) => {
                        warn!(index, error = %e, "request rejected");
                        AnalysisReport {
                            index,
                            kind,
                            outcome: None,
                            error: Some(e.to_string()),
                        }
                    }
                }
            })
            .collect()
    }

    fn load_participants(&mut self, participants: &[ParticipantId]) {
        let before = self.store.warnings().len();
        self.store.load_all(participants);
        let degraded = self.store.warnings().len() - before;
        if degraded > 0 {
            warn!(degraded, "searching with incomplete calendar data");
        }
    }

    fn budget_for(&self, config: &SearchConfig) -> SearchBudget {
        let budget = SearchBudget::from_limits(&config.limits);
        match &self.cancel {
            Some(flag) => budget.with_cancel_flag(Arc::clone(flag)),
            None => budget,
        }
    }
}
