//! RRULE expansion -- turns recurring busy series into concrete intervals.
//!
//! Wraps the `rrule` crate (v0.13). Expansion runs in floating time: the
//! series is anchored at a naive local `dtstart` and every instance keeps the
//! same wall-clock time, matching how the rest of the engine treats instants.

use chrono::{Duration, NaiveDateTime, Utc};
use rrule::RRuleSet;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::slot::{ParticipantId, TimeSlot};

/// Upper bound on instances produced when neither COUNT nor `count` caps a series.
const MAX_INSTANCES: u16 = 1000;

/// iCalendar basic format, e.g. `20250609T090000`.
const ICAL_FORMAT: &str = "%Y%m%dT%H%M%S";

/// A single expanded instance `[start, end)`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExpandedInterval {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

/// A recurring busy series as supplied by a calendar source.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RecurringSlot {
    /// RFC 5545 RRULE body, e.g. `FREQ=WEEKLY;BYDAY=MO,WE`.
    pub rrule: String,
    pub dtstart: NaiveDateTime,
    pub duration_minutes: u32,
    #[serde(default)]
    pub until: Option<NaiveDateTime>,
    #[serde(default)]
    pub count: Option<u32>,
    #[serde(default)]
    pub exdates: Vec<NaiveDateTime>,
    #[serde(default)]
    pub label: String,
}

impl RecurringSlot {
    /// Expand the series into busy slots owned by `owner`.
    pub fn expand(&self, owner: &ParticipantId) -> Result<Vec<TimeSlot>> {
        if self.duration_minutes == 0 {
            return Err(EngineError::InvalidRule(format!(
                "series '{}' has zero duration",
                self.rrule
            )));
        }
        expand_rrule_with_exdates(
            &self.rrule,
            self.dtstart,
            Duration::minutes(self.duration_minutes as i64),
            self.until,
            self.count,
            &self.exdates,
        )?
        .into_iter()
        .map(|interval| TimeSlot::new(owner.clone(), interval.start, interval.end, &self.label))
        .collect()
    }
}

/// Expand an RRULE into concrete intervals of length `duration`.
///
/// # Arguments
/// - `rrule` -- RFC 5545 RRULE body (e.g., "FREQ=WEEKLY;BYDAY=TU,TH")
/// - `dtstart` -- first occurrence, naive local time
/// - `duration` -- length of each instance
/// - `until` -- optional inclusive end boundary
/// - `count` -- optional maximum number of instances (overrides COUNT in rrule)
///
/// # Errors
/// Returns `EngineError::InvalidRule` if the RRULE string is empty or unparseable.
pub fn expand_rrule(
    rrule: &str,
    dtstart: NaiveDateTime,
    duration: Duration,
    until: Option<NaiveDateTime>,
    count: Option<u32>,
) -> Result<Vec<ExpandedInterval>> {
    expand_rrule_with_exdates(rrule, dtstart, duration, until, count, &[])
}

/// Expand an RRULE, excluding the given EXDATE instances (RFC 5545 Section 3.8.5.1).
///
/// Identical to [`expand_rrule`] otherwise.
pub fn expand_rrule_with_exdates(
    rrule: &str,
    dtstart: NaiveDateTime,
    duration: Duration,
    until: Option<NaiveDateTime>,
    count: Option<u32>,
    exdates: &[NaiveDateTime],
) -> Result<Vec<ExpandedInterval>> {
    if rrule.trim().is_empty() {
        return Err(EngineError::InvalidRule("empty RRULE string".to_string()));
    }

    if count == Some(0) {
        return Ok(Vec::new());
    }

    let mut rrule_str = rrule.trim().to_string();
    let upper = rrule_str.to_uppercase();

    if let Some(c) = count {
        if !upper.contains("COUNT=") {
            rrule_str = format!("{};COUNT={}", rrule_str, c);
        }
    }

    // Floating series are anchored in UTC, so UNTIL must carry the "Z" suffix.
    if let Some(until) = until {
        if !upper.contains("UNTIL=") {
            rrule_str = format!("{};UNTIL={}Z", rrule_str, until.format(ICAL_FORMAT));
        }
    }

    let mut rrule_text = format!(
        "DTSTART;TZID=UTC:{}\nRRULE:{}",
        dtstart.format(ICAL_FORMAT),
        rrule_str
    );

    if !exdates.is_empty() {
        let exdate_icals: Vec<String> = exdates
            .iter()
            .map(|d| d.format(ICAL_FORMAT).to_string())
            .collect();
        rrule_text.push_str(&format!("\nEXDATE;TZID=UTC:{}", exdate_icals.join(",")));
    }

    let rrule_set: RRuleSet = rrule_text
        .parse()
        .map_err(|e| EngineError::InvalidRule(format!("{}", e)))?;

    // `.all(limit)` counts before EXDATE filtering, so leave room for exclusions.
    let exdate_buffer = u16::try_from(exdates.len()).unwrap_or(u16::MAX);
    let max_count: u16 = count
        .map(|c| u16::try_from(c).unwrap_or(u16::MAX).saturating_add(exdate_buffer))
        .unwrap_or(MAX_INSTANCES);

    let instances = rrule_set.all(max_count);

    let mut intervals: Vec<ExpandedInterval> = instances
        .dates
        .into_iter()
        .map(|dt| {
            let start = dt.with_timezone(&Utc).naive_utc();
            ExpandedInterval {
                start,
                end: start + duration,
            }
        })
        .collect();

    if let Some(c) = count {
        intervals.truncate(c as usize);
    }

    Ok(intervals)
}
