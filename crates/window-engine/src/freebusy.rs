//! Merge busy slots and compute the free gaps between them.
//!
//! Sorts slots by start time, merges overlapping or adjacent busy periods,
//! then computes the gaps between merged periods within a given time window.

use chrono::NaiveDateTime;
use serde::{Deserialize, Serialize};

use crate::slot::TimeSlot;

/// A free time slot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FreeSlot {
    pub start: NaiveDateTime,
    pub end: NaiveDateTime,
    pub duration_minutes: i64,
}

impl FreeSlot {
    fn new(start: NaiveDateTime, end: NaiveDateTime) -> Self {
        Self {
            start,
            end,
            duration_minutes: (end - start).num_minutes(),
        }
    }
}

/// Merge overlapping or adjacent slots of one owner into a sorted,
/// non-overlapping sequence. Labels of merged slots are joined with " / ".
pub fn merge_slots(mut slots: Vec<TimeSlot>) -> Vec<TimeSlot> {
    slots.sort_by_key(|s| (s.start, s.end));

    let mut merged: Vec<TimeSlot> = Vec::with_capacity(slots.len());
    for slot in slots {
        if let Some(last) = merged.last_mut() {
            if slot.start <= last.end {
                last.end = last.end.max(slot.end);
                if !slot.label.is_empty() && slot.label != last.label {
                    if last.label.is_empty() {
                        last.label = slot.label;
                    } else {
                        last.label = format!("{} / {}", last.label, slot.label);
                    }
                }
                continue;
            }
        }
        merged.push(slot);
    }
    merged
}

/// Merge `(start, end)` intervals clipped to the window.
///
/// Returns a sorted, non-overlapping list of intervals.
fn merge_busy_periods(
    intervals: impl IntoIterator<Item = (NaiveDateTime, NaiveDateTime)>,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Vec<(NaiveDateTime, NaiveDateTime)> {
    let mut clipped: Vec<(NaiveDateTime, NaiveDateTime)> = intervals
        .into_iter()
        .filter(|&(start, end)| start < window_end && end > window_start)
        .map(|(start, end)| (start.max(window_start), end.min(window_end)))
        .collect();

    if clipped.is_empty() {
        return Vec::new();
    }

    clipped.sort_by_key(|&(start, end)| (start, end));

    let mut merged: Vec<(NaiveDateTime, NaiveDateTime)> = Vec::new();
    for (start, end) in clipped {
        if let Some(last) = merged.last_mut() {
            if start <= last.1 {
                last.1 = last.1.max(end);
                continue;
            }
        }
        merged.push((start, end));
    }

    merged
}

/// Find free slots within `[window_start, window_end)` given busy intervals.
///
/// Intervals may overlap and may belong to different owners; they are merged
/// before computing gaps. Returns free slots sorted by start time.
pub fn find_free_slots(
    busy: impl IntoIterator<Item = (NaiveDateTime, NaiveDateTime)>,
    window_start: NaiveDateTime,
    window_end: NaiveDateTime,
) -> Vec<FreeSlot> {
    if window_start >= window_end {
        return Vec::new();
    }

    let merged = merge_busy_periods(busy, window_start, window_end);

    let mut free_slots = Vec::new();
    let mut cursor = window_start;

    for (busy_start, busy_end) in &merged {
        if cursor < *busy_start {
            free_slots.push(FreeSlot::new(cursor, *busy_start));
        }
        cursor = cursor.max(*busy_end);
    }

    if cursor < window_end {
        free_slots.push(FreeSlot::new(cursor, window_end));
    }

    free_slots
}
