//! Per-search cache of participant busy calendars.
//!
//! A store is owned by one search call (or one batch). Calendars are pulled
//! from the [`CalendarSource`] the first time a participant is loaded and kept
//! until [`BusyCalendarStore::refresh`] or [`BusyCalendarStore::clear`].
//! A participant whose calendar cannot be loaded is treated as fully free and
//! the failure is recorded as a warning.

use std::collections::HashMap;

use chrono::NaiveDateTime;
use tracing::{info, warn};

use crate::freebusy::{self, FreeSlot};
use crate::slot::{ParticipantId, TimeSlot};
use crate::source::CalendarSource;

/// Busy slots of one participant, sorted by start and non-overlapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusyCalendar {
    owner: ParticipantId,
    slots: Vec<TimeSlot>,
}

impl BusyCalendar {
    /// Normalize arbitrary slots into a calendar owned by `owner`.
    ///
    /// Slots of other owners and empty slots are dropped; overlapping or
    /// adjacent slots are merged.
    pub fn new(owner: ParticipantId, slots: Vec<TimeSlot>) -> Self {
        let total = slots.len();
        let kept: Vec<TimeSlot> = slots
            .into_iter()
            .filter(|s| s.owner == owner && s.start < s.end)
            .collect();
        if kept.len() < total {
            warn!(
                participant = %owner,
                dropped = total - kept.len(),
                "dropped slots with foreign owner or empty interval"
            );
        }
        Self {
            slots: freebusy::merge_slots(kept),
            owner,
        }
    }

    pub fn empty(owner: ParticipantId) -> Self {
        Self {
            owner,
            slots: Vec::new(),
        }
    }

    pub fn owner(&self) -> &ParticipantId {
        &self.owner
    }

    pub fn slots(&self) -> &[TimeSlot] {
        &self.slots
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Linear scan: no slot overlaps `[a, b)`.
    pub fn is_free(&self, a: NaiveDateTime, b: NaiveDateTime) -> bool {
        !self.slots.iter().any(|s| s.overlaps(a, b))
    }

    /// End of the latest slot ending at or before `t`.
    pub fn last_end_before(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        // Slots are disjoint and sorted by start, so ends are sorted too.
        let idx = self.slots.partition_point(|s| s.end <= t);
        idx.checked_sub(1).map(|i| self.slots[i].end)
    }

    /// Start of the earliest slot starting at or after `t`.
    pub fn next_start_after(&self, t: NaiveDateTime) -> Option<NaiveDateTime> {
        let idx = self.slots.partition_point(|s| s.start < t);
        self.slots.get(idx).map(|s| s.start)
    }
}

/// A degradation recorded while loading calendars.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadWarning {
    pub participant: ParticipantId,
    pub message: String,
}

pub struct BusyCalendarStore {
    source: Box<dyn CalendarSource>,
    calendars: HashMap<ParticipantId, BusyCalendar>,
    warnings: Vec<LoadWarning>,
}

impl std::fmt::Debug for BusyCalendarStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("BusyCalendarStore")
            .field("calendars", &self.calendars.len())
            .field("warnings", &self.warnings)
            .finish()
    }
}

impl BusyCalendarStore {
    pub fn new(source: impl CalendarSource + 'static) -> Self {
        Self {
            source: Box::new(source),
            calendars: HashMap::new(),
            warnings: Vec::new(),
        }
    }

    /// Load a participant's calendar unless it is already cached.
    pub fn load(&mut self, participant: &ParticipantId) -> &BusyCalendar {
        if !self.calendars.contains_key(participant) {
            let calendar = self.fetch(participant);
            self.calendars.insert(participant.clone(), calendar);
        }
        &self.calendars[participant]
    }

    pub fn load_all<'a>(&mut self, participants: impl IntoIterator<Item = &'a ParticipantId>) {
        for participant in participants {
            self.load(participant);
        }
    }

    /// Drop the cached calendar of `participant` and load it again.
    pub fn refresh(&mut self, participant: &ParticipantId) -> &BusyCalendar {
        self.calendars.remove(participant);
        self.load(participant)
    }

    /// Forget every cached calendar and warning.
    pub fn clear(&mut self) {
        self.calendars.clear();
        self.warnings.clear();
    }

    /// The cached calendar of `participant`, if loaded.
    pub fn get(&self, participant: &ParticipantId) -> Option<&BusyCalendar> {
        self.calendars.get(participant)
    }

    /// Cached slots of `participant`; empty when not loaded.
    pub fn slots(&self, participant: &ParticipantId) -> &[TimeSlot] {
        self.calendars
            .get(participant)
            .map(BusyCalendar::slots)
            .unwrap_or(&[])
    }

    /// Every participant in `participants` is free over `[a, b)`.
    pub fn is_free(&self, participants: &[ParticipantId], a: NaiveDateTime, b: NaiveDateTime) -> bool {
        participants
            .iter()
            .filter_map(|p| self.calendars.get(p))
            .all(|c| c.is_free(a, b))
    }

    /// Gaps within `[from, to)` during which every participant is free.
    pub fn free_slots(
        &self,
        participants: &[ParticipantId],
        from: NaiveDateTime,
        to: NaiveDateTime,
    ) -> Vec<FreeSlot> {
        let busy = participants
            .iter()
            .flat_map(|p| self.slots(p).iter().map(|s| (s.start, s.end)));
        freebusy::find_free_slots(busy, from, to)
    }

    pub fn warnings(&self) -> &[LoadWarning] {
        &self.warnings
    }

    fn fetch(&mut self, participant: &ParticipantId) -> BusyCalendar {
        match self.source.load(participant) {
            Ok(slots) => {
                let calendar = BusyCalendar::new(participant.clone(), slots);
                info!(
                    participant = %participant,
                    slots = calendar.slots().len(),
                    "loaded busy calendar"
                );
                calendar
            }
            Err(e) => {
                warn!(
                    participant = %participant,
                    error = %e,
                    "calendar unavailable; treating participant as free"
                );
                self.warnings.push(LoadWarning {
                    participant: participant.clone(),
                    message: e.to_string(),
                });
                BusyCalendar::empty(participant.clone())
            }
        }
    }
}
