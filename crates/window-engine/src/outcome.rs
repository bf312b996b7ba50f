//! Search results and the counters collected while producing them.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::budget::StopReason;
use crate::scorer::BestWindow;
use crate::slot::SearchWindow;

/// Work counters of one search.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchStats {
    /// Participant subsets whose candidates were enumerated.
    pub subsets_searched: u64,
    /// Business days in the search range.
    pub days_searched: u64,
    /// Candidates (start times or segment combinations) examined.
    pub candidates_examined: u64,
    /// Candidates that were valid windows.
    pub windows_found: u64,
    /// Set when a limit ended the enumeration early.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub stop_reason: Option<StopReason>,
}

impl SearchStats {
    /// `true` when the whole candidate space was enumerated.
    pub fn is_complete(&self) -> bool {
        self.stop_reason.is_none()
    }
}

impl fmt::Display for SearchStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "subsets={} days={} candidates={} windows={}",
            self.subsets_searched, self.days_searched, self.candidates_examined, self.windows_found
        )?;
        if let Some(reason) = self.stop_reason {
            write!(f, " stopped={}", reason)?;
        }
        Ok(())
    }
}

/// The best window of one search, if any, with its score and counters.
///
/// With a `stop_reason` in the stats the window is the best among the
/// candidates examined before the limit tripped.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchOutcome {
    pub window: Option<SearchWindow>,
    pub score: Option<f64>,
    pub stats: SearchStats,
}

impl SearchOutcome {
    pub(crate) fn from_best(best: BestWindow, mut stats: SearchStats) -> Self {
        stats.windows_found = best.offered();
        match best.into_inner() {
            Some((window, score)) => Self {
                window: Some(window),
                score: Some(score),
                stats,
            },
            None => Self {
                window: None,
                score: None,
                stats,
            },
        }
    }

    pub fn is_found(&self) -> bool {
        self.window.is_some()
    }

    pub fn into_window(self) -> Option<SearchWindow> {
        self.window
    }
}
