//! Core value types: participants, busy slots, and found windows.
//!
//! All instants are naive local timestamps. Conversion from and to epoch
//! milliseconds of a named zone happens only at the boundary helpers
//! [`TimeSlot::from_epoch_millis`] and [`SearchWindow::deadline_millis`].

use std::fmt;

use chrono::{DateTime, Duration, NaiveDateTime, TimeZone, Utc};
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};

const MILLIS_PER_HOUR: f64 = 3_600_000.0;

/// Convert a fractional hour count into a millisecond-precision duration.
pub fn hours_to_duration(hours: f64) -> Duration {
    Duration::milliseconds((hours * MILLIS_PER_HOUR).round() as i64)
}

/// Convert a duration into fractional hours.
pub fn duration_to_hours(duration: Duration) -> f64 {
    duration.num_milliseconds() as f64 / MILLIS_PER_HOUR
}

/// Opaque identifier of one calendar owner (a person, a group, a room).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ParticipantId(String);

impl ParticipantId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for ParticipantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ParticipantId {
    fn from(id: &str) -> Self {
        Self::new(id)
    }
}

impl From<String> for ParticipantId {
    fn from(id: String) -> Self {
        Self(id)
    }
}

/// Join participant ids with ", " for human-readable output.
pub(crate) fn join_participants(participants: &[ParticipantId]) -> String {
    participants
        .iter()
        .map(ParticipantId::as_str)
        .collect::<Vec<_>>()
        .join(", ")
}

/// One busy interval `[start, end)` in a participant's calendar.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TimeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub owner: ParticipantId,
    #[serde(default)]
    pub label: String,
}

impl TimeSlot {
    /// Create a slot, rejecting empty or inverted intervals.
    pub fn new(
        owner: ParticipantId,
        start: NaiveDateTime,
        end: NaiveDateTime,
        label: impl Into<String>,
    ) -> Result<Self> {
        if start >= end {
            return Err(EngineError::invalid(format!(
                "slot for '{}' must start before it ends ({} >= {})",
                owner, start, end
            )));
        }
        Ok(Self {
            start,
            end,
            owner,
            label: label.into(),
        })
    }

    /// Build a slot from epoch milliseconds, expressed as wall time in `tz`.
    pub fn from_epoch_millis(
        owner: ParticipantId,
        start_ms: i64,
        end_ms: i64,
        tz: Tz,
        label: impl Into<String>,
    ) -> Result<Self> {
        let start = local_from_millis(start_ms, tz)?;
        let end = local_from_millis(end_ms, tz)?;
        Self::new(owner, start, end, label)
    }

    pub fn duration_hours(&self) -> f64 {
        duration_to_hours(self.end - self.start)
    }

    /// Half-open overlap test: a slot ending exactly at `start` does not overlap.
    pub fn overlaps(&self, start: NaiveDateTime, end: NaiveDateTime) -> bool {
        self.start < end && start < self.end
    }
}

fn local_from_millis(ms: i64, tz: Tz) -> Result<NaiveDateTime> {
    let utc: DateTime<Utc> = DateTime::from_timestamp_millis(ms)
        .ok_or_else(|| EngineError::invalid(format!("timestamp out of range: {}", ms)))?;
    Ok(utc.with_timezone(&tz).naive_local())
}

fn millis_from_local(local: NaiveDateTime, tz: Tz) -> Result<i64> {
    tz.from_local_datetime(&local)
        .earliest()
        .map(|dt| dt.timestamp_millis())
        .ok_or_else(|| {
            EngineError::invalid(format!("{} does not exist in timezone {}", local, tz))
        })
}

/// One contiguous piece of a window.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Segment {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
}

impl Segment {
    pub fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self { start, end }
    }

    pub fn duration(&self) -> Duration {
        self.end - self.start
    }
}

/// Kind of window a finder produced.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum WindowKind {
    /// One contiguous block free for every listed participant.
    #[serde(rename = "common_window")]
    Common,
    /// Several segments whose durations add up to the requested total.
    #[serde(rename = "split_window")]
    Split,
}

impl WindowKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            WindowKind::Common => "common_window",
            WindowKind::Split => "split_window",
        }
    }
}

impl fmt::Display for WindowKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A found window. Immutable once produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchWindow {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    /// Exact length for common windows; sum of segment lengths for split windows.
    pub duration_hours: f64,
    pub kind: WindowKind,
    /// Participants the window is free for, in the order they were requested.
    pub participants: Vec<ParticipantId>,
    pub days_count: u32,
    pub segments: Vec<Segment>,
    pub description: String,
}

impl SearchWindow {
    /// A single contiguous window `[start, start + duration)`.
    pub fn common(start: NaiveDateTime, duration: Duration, participants: Vec<ParticipantId>) -> Self {
        let end = start + duration;
        let description = format!(
            "Common window for participants: {}",
            join_participants(&participants)
        );
        Self {
            start,
            end,
            duration_hours: duration_to_hours(duration),
            kind: WindowKind::Common,
            days_count: days_spanned(start, end),
            segments: vec![Segment::new(start, end)],
            participants,
            description,
        }
    }

    /// A window assembled from chronologically ordered, non-overlapping segments.
    ///
    /// `None` when `segments` is empty.
    pub fn split(segments: Vec<Segment>, participants: Vec<ParticipantId>) -> Option<Self> {
        let start = segments.first()?.start;
        let end = segments.last()?.end;
        let total = segments
            .iter()
            .fold(Duration::zero(), |acc, s| acc + s.duration());
        let description = format!(
            "Split window of {} segment(s) for participants: {}",
            segments.len(),
            join_participants(&participants)
        );
        Some(Self {
            start,
            end,
            duration_hours: duration_to_hours(total),
            kind: WindowKind::Split,
            days_count: days_spanned(start, end),
            segments,
            participants,
            description,
        })
    }

    /// Short title, e.g. `Window 1.5h` or `Window 4.0h (2 days)`.
    pub fn title(&self) -> String {
        let mut title = format!("Window {:.1}h", self.duration_hours);
        if self.days_count > 1 {
            title.push_str(&format!(" ({} days)", self.days_count));
        }
        title
    }

    /// Multi-line human-readable description for display collaborators.
    pub fn summary(&self) -> String {
        let mut lines = vec![
            format!("Type: {}", self.kind),
            format!("Start: {}", self.start.format("%d.%m.%Y %H:%M")),
            format!("End: {}", self.end.format("%d.%m.%Y %H:%M")),
            format!("Duration: {:.1} hours", self.duration_hours),
            self.description.clone(),
        ];
        if self.kind == WindowKind::Split {
            for (i, segment) in self.segments.iter().enumerate() {
                lines.push(format!(
                    "Segment {}: {} - {}",
                    i + 1,
                    segment.start.format("%H:%M"),
                    segment.end.format("%H:%M")
                ));
            }
        }
        if !self.participants.is_empty() {
            lines.push(format!(
                "Participants: {}",
                join_participants(&self.participants)
            ));
        }
        lines.join("\n")
    }

    /// Start and end as epoch milliseconds, reading the naive wall times in `tz`.
    pub fn deadline_millis(&self, tz: Tz) -> Result<(i64, i64)> {
        Ok((
            millis_from_local(self.start, tz)?,
            millis_from_local(self.end, tz)?,
        ))
    }
}

fn days_spanned(start: NaiveDateTime, end: NaiveDateTime) -> u32 {
    let days = (end.date() - start.date()).num_days() + 1;
    days.max(1) as u32
}
