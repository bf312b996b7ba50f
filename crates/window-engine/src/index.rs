//! Gap-expanded interval index over the busy slots of a participant subset.
//!
//! Every slot `[s, e)` is stored as `[s - gap, e + gap)`. Intervals are kept
//! sorted by start together with a running maximum of their ends, so an
//! overlap query is one binary search plus one lookup:
//!
//! - every stored interval with `start < b` lies in the prefix found by
//!   `partition_point`;
//! - some interval in that prefix has `end > a` iff the prefix maximum
//!   end exceeds `a`.
//!
//! Adjacent intervals (`end == a` or `start == b`) are not overlaps.

use std::collections::HashMap;

use chrono::{Duration, NaiveDateTime};
use tracing::debug;

use crate::slot::ParticipantId;
use crate::store::BusyCalendarStore;

#[derive(Debug, Clone)]
pub struct OverlapIndex {
    starts: Vec<NaiveDateTime>,
    /// `max_end[i]` is the maximum end among `starts[..=i]`.
    max_end: Vec<NaiveDateTime>,
    gap: Duration,
}

impl OverlapIndex {
    /// Build from raw `(start, end)` pairs, expanding each by `gap` on both sides.
    ///
    /// Expansion saturates at the representable range.
    pub fn from_intervals(
        intervals: impl IntoIterator<Item = (NaiveDateTime, NaiveDateTime)>,
        gap: Duration,
    ) -> Self {
        let mut adjusted: Vec<(NaiveDateTime, NaiveDateTime)> = intervals
            .into_iter()
            .map(|(start, end)| {
                (
                    start.checked_sub_signed(gap).unwrap_or(NaiveDateTime::MIN),
                    end.checked_add_signed(gap).unwrap_or(NaiveDateTime::MAX),
                )
            })
            .collect();
        adjusted.sort_by_key(|&(start, end)| (start, end));

        let mut starts = Vec::with_capacity(adjusted.len());
        let mut max_end: Vec<NaiveDateTime> = Vec::with_capacity(adjusted.len());
        for (start, end) in adjusted {
            let running = match max_end.last() {
                Some(prev) => (*prev).max(end),
                None => end,
            };
            starts.push(start);
            max_end.push(running);
        }

        Self {
            starts,
            max_end,
            gap,
        }
    }

    /// Build over every slot owned by a participant in `subset`.
    pub fn build(store: &BusyCalendarStore, subset: &[ParticipantId], gap: Duration) -> Self {
        let intervals = subset
            .iter()
            .flat_map(|p| store.slots(p).iter().map(|s| (s.start, s.end)));
        Self::from_intervals(intervals, gap)
    }

    /// Does `[a, b)` overlap any stored (gap-expanded) interval?
    pub fn overlaps(&self, a: NaiveDateTime, b: NaiveDateTime) -> bool {
        if a >= b {
            return false;
        }
        let candidates = self.starts.partition_point(|start| *start < b);
        candidates > 0 && self.max_end[candidates - 1] > a
    }

    pub fn len(&self) -> usize {
        self.starts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.starts.is_empty()
    }

    pub fn gap(&self) -> Duration {
        self.gap
    }
}

/// Per-search cache of indexes keyed by the canonical (sorted) participant tuple.
#[derive(Debug)]
pub struct IndexCache {
    gap: Duration,
    indexes: HashMap<Vec<ParticipantId>, OverlapIndex>,
}

impl IndexCache {
    pub fn new(gap: Duration) -> Self {
        Self {
            gap,
            indexes: HashMap::new(),
        }
    }

    /// Return the index for `subset`, building it on first use.
    pub fn get_or_build(
        &mut self,
        store: &BusyCalendarStore,
        subset: &[ParticipantId],
    ) -> &OverlapIndex {
        let mut key = subset.to_vec();
        key.sort();
        key.dedup();
        let gap = self.gap;
        self.indexes.entry(key).or_insert_with_key(|key| {
            let index = OverlapIndex::build(store, key, gap);
            debug!(subset = ?key, intervals = index.len(), "built overlap index");
            index
        })
    }

    pub fn len(&self) -> usize {
        self.indexes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.indexes.is_empty()
    }
}
