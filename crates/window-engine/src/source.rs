//! Calendar sources: where busy slots come from.
//!
//! The engine never fetches data itself. A [`CalendarSource`] hands over the
//! busy slots of one participant; [`InMemorySource`] is the snapshot-backed
//! implementation used by the CLI and the tests.

use std::collections::BTreeMap;

use chrono::NaiveDateTime;
use chrono_tz::Tz;
use serde::{Deserialize, Serialize};

use crate::error::{EngineError, Result};
use crate::expander::RecurringSlot;
use crate::slot::{ParticipantId, TimeSlot};

/// Supplies the busy slots of a participant.
///
/// Implementations may return slots in any order and may return overlapping
/// slots; the store normalizes them.
pub trait CalendarSource {
    fn load(&self, participant: &ParticipantId) -> Result<Vec<TimeSlot>>;
}

/// One entry of a participant's calendar in a [`CalendarSnapshot`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CalendarEntry {
    /// Naive local start/end.
    Local {
        start: NaiveDateTime,
        end: NaiveDateTime,
        #[serde(default)]
        label: String,
    },
    /// Epoch milliseconds, read as wall time in the snapshot's timezone.
    Epoch {
        start_ms: i64,
        end_ms: i64,
        #[serde(default)]
        label: String,
    },
    Recurring(RecurringSlot),
}

/// A mapping from participant to calendar entries.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CalendarSnapshot {
    /// IANA zone for epoch entries. Defaults to UTC.
    #[serde(default)]
    pub timezone: Option<String>,
    pub calendars: BTreeMap<ParticipantId, Vec<CalendarEntry>>,
}

impl CalendarSnapshot {
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| EngineError::invalid(format!("calendar snapshot: {}", e)))
    }
}

/// A [`CalendarSource`] over an in-memory snapshot.
///
/// Entries are materialized lazily on `load`, so a bad entry only affects the
/// participant that owns it.
#[derive(Debug, Clone, Default)]
pub struct InMemorySource {
    snapshot: CalendarSnapshot,
}

impl InMemorySource {
    pub fn new(snapshot: CalendarSnapshot) -> Self {
        Self { snapshot }
    }

    /// A source holding already-materialized slots, grouped by owner.
    pub fn from_slots(slots: impl IntoIterator<Item = TimeSlot>) -> Self {
        let mut calendars: BTreeMap<ParticipantId, Vec<CalendarEntry>> = BTreeMap::new();
        for slot in slots {
            calendars
                .entry(slot.owner.clone())
                .or_default()
                .push(CalendarEntry::Local {
                    start: slot.start,
                    end: slot.end,
                    label: slot.label,
                });
        }
        Self::new(CalendarSnapshot {
            timezone: None,
            calendars,
        })
    }

    pub fn participants(&self) -> impl Iterator<Item = &ParticipantId> {
        self.snapshot.calendars.keys()
    }

    fn timezone(&self) -> Result<Tz> {
        match &self.snapshot.timezone {
            Some(name) => name
                .parse()
                .map_err(|_| EngineError::InvalidTimezone(name.clone())),
            None => Ok(Tz::UTC),
        }
    }
}

impl CalendarSource for InMemorySource {
    fn load(&self, participant: &ParticipantId) -> Result<Vec<TimeSlot>> {
        let entries = self
            .snapshot
            .calendars
            .get(participant)
            .ok_or_else(|| EngineError::Source {
                participant: participant.to_string(),
                message: "no calendar in snapshot".to_string(),
            })?;

        let mut slots = Vec::with_capacity(entries.len());
        for entry in entries {
            match entry {
                CalendarEntry::Local { start, end, label } => {
                    slots.push(TimeSlot::new(participant.clone(), *start, *end, label)?);
                }
                CalendarEntry::Epoch {
                    start_ms,
                    end_ms,
                    label,
                } => {
                    slots.push(TimeSlot::from_epoch_millis(
                        participant.clone(),
                        *start_ms,
                        *end_ms,
                        self.timezone()?,
                        label,
                    )?);
                }
                CalendarEntry::Recurring(series) => {
                    slots.extend(series.expand(participant)?);
                }
            }
        }
        Ok(slots)
    }
}
