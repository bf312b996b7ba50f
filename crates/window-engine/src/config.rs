//! Strongly-typed search configuration.
//!
//! A [`SearchRequest`] is a [`SearchConfig`] plus a [`WindowRequirement`]. Both
//! deserialize from JSON with explicit defaults and are validated once, at the
//! entry of a search.

use std::collections::HashSet;

use chrono::{Duration, NaiveDate, NaiveTime};
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::slot::{hours_to_duration, ParticipantId};

/// Upper bound for durations and the gap: windows never leave their day.
const MAX_HOURS: f64 = 24.0;

fn default_earliest() -> NaiveTime {
    NaiveTime::from_hms_opt(7, 0, 0).unwrap_or_default()
}

fn default_latest() -> NaiveTime {
    NaiveTime::from_hms_opt(23, 0, 0).unwrap_or_default()
}

fn default_true() -> bool {
    true
}

fn default_weight() -> f64 {
    1.0
}

fn default_required_duration() -> f64 {
    1.0
}

fn default_total_duration() -> f64 {
    4.0
}

fn default_min_segment() -> f64 {
    0.5
}

fn default_max_segments() -> u32 {
    5
}

fn default_max_candidates() -> Option<u64> {
    Some(5_000_000)
}

/// Which criteria contribute to a window's score, and how much.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoringConfig {
    /// Also switches the common finder into subset enumeration.
    #[serde(default = "default_true")]
    pub maximize_participants: bool,
    #[serde(default = "default_true")]
    pub minimize_start_time: bool,
    #[serde(default = "default_true")]
    pub minimize_total_idle: bool,
    #[serde(default = "default_true")]
    pub minimize_max_gap: bool,
    #[serde(default = "default_weight")]
    pub weight_participants: f64,
    #[serde(default = "default_weight")]
    pub weight_start_time: f64,
    #[serde(default = "default_weight")]
    pub weight_total_idle: f64,
    #[serde(default = "default_weight")]
    pub weight_max_gap: f64,
}

impl Default for ScoringConfig {
    fn default() -> Self {
        Self {
            maximize_participants: true,
            minimize_start_time: true,
            minimize_total_idle: true,
            minimize_max_gap: true,
            weight_participants: 1.0,
            weight_start_time: 1.0,
            weight_total_idle: 1.0,
            weight_max_gap: 1.0,
        }
    }
}

/// Bounds on how much work one search may do.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchLimits {
    /// Wall-clock budget in milliseconds.
    #[serde(default)]
    pub time_limit_ms: Option<u64>,
    /// Maximum number of candidate windows examined.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: Option<u64>,
}

impl Default for SearchLimits {
    fn default() -> Self {
        Self {
            time_limit_ms: None,
            max_candidates: default_max_candidates(),
        }
    }
}

impl SearchLimits {
    pub fn unlimited() -> Self {
        Self {
            time_limit_ms: None,
            max_candidates: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchConfig {
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub participants: Vec<ParticipantId>,
    #[serde(default = "default_earliest")]
    pub earliest_start_time: NaiveTime,
    #[serde(default = "default_latest")]
    pub latest_end_time: NaiveTime,
    #[serde(default)]
    pub min_gap_hours: f64,
    #[serde(default)]
    pub include_weekends: bool,
    #[serde(default)]
    pub include_holidays: bool,
    #[serde(flatten)]
    pub scoring: ScoringConfig,
    #[serde(default)]
    pub limits: SearchLimits,
}

impl SearchConfig {
    /// A config with source-system defaults for everything but the range and participants.
    pub fn new(start_date: NaiveDate, end_date: NaiveDate, participants: Vec<ParticipantId>) -> Self {
        Self {
            start_date,
            end_date,
            participants,
            earliest_start_time: default_earliest(),
            latest_end_time: default_latest(),
            min_gap_hours: 0.0,
            include_weekends: false,
            include_holidays: false,
            scoring: ScoringConfig::default(),
            limits: SearchLimits::default(),
        }
    }

    pub fn with_work_hours(mut self, earliest: NaiveTime, latest: NaiveTime) -> Self {
        self.earliest_start_time = earliest;
        self.latest_end_time = latest;
        self
    }

    pub fn with_min_gap_hours(mut self, hours: f64) -> Self {
        self.min_gap_hours = hours;
        self
    }

    pub fn with_scoring(mut self, scoring: ScoringConfig) -> Self {
        self.scoring = scoring;
        self
    }

    pub fn with_limits(mut self, limits: SearchLimits) -> Self {
        self.limits = limits;
        self
    }

    pub fn min_gap(&self) -> Duration {
        hours_to_duration(self.min_gap_hours)
    }

    /// Length of the daily work window in hours.
    pub fn work_day_hours(&self) -> f64 {
        (self.latest_end_time - self.earliest_start_time).num_milliseconds() as f64 / 3_600_000.0
    }

    /// Check every field that does not depend on the requirement.
    pub fn validate(&self) -> Result<()> {
        if self.participants.is_empty() {
            return Err(EngineError::invalid("participant list is empty"));
        }
        let mut seen = HashSet::new();
        for p in &self.participants {
            if !seen.insert(p) {
                return Err(EngineError::invalid(format!("participant '{}' listed twice", p)));
            }
        }
        if self.earliest_start_time >= self.latest_end_time {
            return Err(EngineError::invalid(format!(
                "earliest_start_time {} must be before latest_end_time {}",
                self.earliest_start_time, self.latest_end_time
            )));
        }
        if self.start_date > self.end_date {
            return Err(EngineError::invalid(format!(
                "start_date {} is after end_date {}",
                self.start_date, self.end_date
            )));
        }
        if !self.min_gap_hours.is_finite() || self.min_gap_hours < 0.0 {
            return Err(EngineError::invalid("min_gap_hours must be a non-negative number"));
        }
        if self.min_gap_hours > MAX_HOURS {
            return Err(EngineError::invalid(format!(
                "min_gap_hours must not exceed {} hours",
                MAX_HOURS
            )));
        }
        let weights = [
            ("weight_participants", self.scoring.weight_participants),
            ("weight_start_time", self.scoring.weight_start_time),
            ("weight_total_idle", self.scoring.weight_total_idle),
            ("weight_max_gap", self.scoring.weight_max_gap),
        ];
        for (name, weight) in weights {
            if !weight.is_finite() || weight < 0.0 {
                return Err(EngineError::invalid(format!(
                    "{} must be a non-negative number",
                    name
                )));
            }
        }
        Ok(())
    }
}

/// What kind of window to look for.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum WindowRequirement {
    /// One contiguous window of exactly `required_duration` hours.
    CommonWindow {
        #[serde(default = "default_required_duration")]
        required_duration: f64,
    },
    /// Up to `max_segments` pieces of at least `min_segment_duration` hours
    /// adding up to at least `total_duration` hours.
    SplitWindow {
        #[serde(default = "default_total_duration")]
        total_duration: f64,
        #[serde(default = "default_min_segment")]
        min_segment_duration: f64,
        #[serde(default = "default_max_segments")]
        max_segments: u32,
    },
}

impl WindowRequirement {
    pub fn common(required_duration: f64) -> Self {
        WindowRequirement::CommonWindow { required_duration }
    }

    pub fn split(total_duration: f64, min_segment_duration: f64, max_segments: u32) -> Self {
        WindowRequirement::SplitWindow {
            total_duration,
            min_segment_duration,
            max_segments,
        }
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            WindowRequirement::CommonWindow { .. } => "common_window",
            WindowRequirement::SplitWindow { .. } => "split_window",
        }
    }

    pub fn validate(&self) -> Result<()> {
        match *self {
            WindowRequirement::CommonWindow { required_duration } => {
                positive_hours("required_duration", required_duration)
            }
            WindowRequirement::SplitWindow {
                total_duration,
                min_segment_duration,
                max_segments,
            } => {
                positive_hours("total_duration", total_duration)?;
                positive_hours("min_segment_duration", min_segment_duration)?;
                if max_segments < 1 {
                    return Err(EngineError::invalid("max_segments must be at least 1"));
                }
                Ok(())
            }
        }
    }
}

fn positive_hours(name: &str, hours: f64) -> Result<()> {
    if !hours.is_finite() || hours <= 0.0 {
        return Err(EngineError::invalid(format!("{} must be positive", name)));
    }
    if hours > MAX_HOURS {
        return Err(EngineError::invalid(format!(
            "{} must not exceed {} hours",
            name, MAX_HOURS
        )));
    }
    // Durations are kept at millisecond precision.
    if hours_to_duration(hours) <= Duration::zero() {
        return Err(EngineError::invalid(format!("{} is too small", name)));
    }
    Ok(())
}

/// A complete search request as received from a transport collaborator.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchRequest {
    #[serde(flatten)]
    pub requirement: WindowRequirement,
    #[serde(flatten)]
    pub config: SearchConfig,
}

impl SearchRequest {
    pub fn new(config: SearchConfig, requirement: WindowRequirement) -> Self {
        Self {
            requirement,
            config,
        }
    }

    pub fn validate(&self) -> Result<()> {
        self.config.validate()?;
        self.requirement.validate()
    }
}
