//! # window-engine
//!
//! Deterministic search for shared free time across participant calendars.
//!
//! Given busy calendars for a set of participants, a date range, daily work
//! hours and a minimum buffer around busy slots, the engine finds either one
//! contiguous block free for as many participants as possible, or a set of
//! same-day segments adding up to a total duration, and picks the
//! highest-scoring candidate. Enumeration order is fixed, so equal scores
//! always resolve to the same window.
//!
//! ## Modules
//!
//! - [`slot`]: participants, busy slots, found windows
//! - [`source`] / [`store`]: where calendars come from and how they are cached
//! - [`expander`]: RRULE expansion of recurring busy series
//! - [`rules`]: weekends, holidays, work hours
//! - [`index`]: gap-expanded interval index over a participant subset
//! - [`candidates`] / [`combinatorics`]: the enumeration order
//! - [`common`] / [`split`]: the two finders
//! - [`scorer`]: weighted multi-criteria scoring
//! - [`budget`]: deadlines, cancellation and candidate limits
//! - [`analyzer`]: request validation and orchestration
//!
//! ## Example
//!
//! ```
//! use chrono::{NaiveDate, NaiveTime};
//! use window_engine::{InMemorySource, ScheduleAnalyzer, ScoringConfig, SearchConfig, TimeSlot};
//!
//! let day = NaiveDate::from_ymd_opt(2025, 6, 9).unwrap();
//! let busy = TimeSlot::new(
//!     "A".into(),
//!     day.and_hms_opt(9, 0, 0).unwrap(),
//!     day.and_hms_opt(12, 0, 0).unwrap(),
//!     "standup",
//! )
//! .unwrap();
//! let mut analyzer = ScheduleAnalyzer::new(InMemorySource::from_slots([busy]));
//!
//! // Rank by coverage, then promptness.
//! let scoring = ScoringConfig {
//!     minimize_total_idle: false,
//!     minimize_max_gap: false,
//!     ..ScoringConfig::default()
//! };
//! let config = SearchConfig::new(day, day, vec!["A".into(), "B".into()])
//!     .with_work_hours(
//!         NaiveTime::from_hms_opt(9, 0, 0).unwrap(),
//!         NaiveTime::from_hms_opt(20, 0, 0).unwrap(),
//!     )
//!     .with_scoring(scoring);
//! let window = analyzer.find_common_window(&config, 1.0).unwrap().unwrap();
//! assert_eq!(window.start, day.and_hms_opt(12, 0, 0).unwrap());
//! ```

pub mod analyzer;
pub mod budget;
pub mod candidates;
pub mod combinatorics;
pub mod common;
pub mod config;
pub mod error;
pub mod expander;
pub mod freebusy;
pub mod index;
pub mod outcome;
pub mod rules;
pub mod scorer;
pub mod slot;
pub mod source;
pub mod split;
pub mod store;

pub use analyzer::{AnalysisReport, ScheduleAnalyzer};
pub use budget::{SearchBudget, StopReason};
pub use candidates::CandidateGenerator;
pub use common::CommonWindowFinder;
pub use config::{ScoringConfig, SearchConfig, SearchLimits, SearchRequest, WindowRequirement};
pub use error::{EngineError, Result};
pub use expander::{expand_rrule, expand_rrule_with_exdates, RecurringSlot};
pub use freebusy::{find_free_slots, FreeSlot};
pub use index::{IndexCache, OverlapIndex};
pub use outcome::{SearchOutcome, SearchStats};
pub use rules::CalendarRules;
pub use scorer::{ScoreBreakdown, WindowScorer};
pub use slot::{ParticipantId, SearchWindow, Segment, TimeSlot, WindowKind};
pub use source::{CalendarSnapshot, CalendarSource, InMemorySource};
pub use split::{SplitShape, SplitWindowFinder};
pub use store::{BusyCalendar, BusyCalendarStore, LoadWarning};
