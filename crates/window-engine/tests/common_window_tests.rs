//! Tests for the contiguous (common) window finder.

use chrono::{Duration, NaiveDate, NaiveDateTime, NaiveTime};
use window_engine::error::EngineError;
use window_engine::{
    BusyCalendarStore, CalendarRules, CommonWindowFinder, InMemorySource, ParticipantId,
    ScoringConfig, SearchBudget, SearchConfig, StopReason, TimeSlot, WindowKind,
};

// ── Helpers ─────────────────────────────────────────────────────────────────

fn day(d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, 6, d).unwrap()
}

fn at(d: u32, h: u32, m: u32) -> NaiveDateTime {
    day(d).and_hms_opt(h, m, 0).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

fn ids(names: &[&str]) -> Vec<ParticipantId> {
    names.iter().map(|n| ParticipantId::new(*n)).collect()
}

/// Store with the given busy slots, every listed participant loaded.
fn store(busy: &[(&str, NaiveDateTime, NaiveDateTime)], participants: &[&str]) -> BusyCalendarStore {
    let slots = busy
        .iter()
        .map(|&(owner, start, end)| TimeSlot::new(owner.into(), start, end, "busy").unwrap());
    let mut store = BusyCalendarStore::new(InMemorySource::from_slots(slots));
    store.load_all(&ids(participants));
    store
}

/// Coverage and promptness only.
fn prompt_scoring() -> ScoringConfig {
    ScoringConfig {
        minimize_total_idle: false,
        minimize_max_gap: false,
        ..ScoringConfig::default()
    }
}

fn config(start: u32, end: u32, participants: &[&str]) -> SearchConfig {
    SearchConfig::new(day(start), day(end), ids(participants))
        .with_work_hours(time(9, 0), time(20, 0))
        .with_scoring(prompt_scoring())
}

// ── Test 1: partially busy participant still joins the window ───────────────

#[test]
fn finds_full_group_after_morning_block() {
    let store = store(&[("A", at(9, 9, 0), at(9, 12, 0))], &["A", "B"]);
    let rules = CalendarRules::without_holidays();
    let finder = CommonWindowFinder::new(&store, &rules);

    let outcome = finder
        .find(&config(9, 9, &["A", "B"]), 1.0, &mut SearchBudget::unlimited())
        .unwrap();

    let window = outcome.window.expect("a window should be found");
    assert_eq!(window.kind, WindowKind::Common);
    assert_eq!(window.participants, ids(&["A", "B"]));
    assert_eq!(window.start, at(9, 12, 0));
    assert_eq!(window.end, at(9, 13, 0));
    assert_eq!(window.duration_hours, 1.0);
    assert!(outcome.stats.is_complete());
}

// ── Test 2: fully busy participant drops out ────────────────────────────────

#[test]
fn falls_back_to_smaller_subset_when_one_participant_is_busy_all_day() {
    let store = store(&[("A", at(9, 9, 0), at(9, 20, 0))], &["A", "B"]);
    let rules = CalendarRules::without_holidays();
    let finder = CommonWindowFinder::new(&store, &rules);

    let outcome = finder
        .find(&config(9, 9, &["A", "B"]), 1.0, &mut SearchBudget::unlimited())
        .unwrap();

    let window = outcome.window.expect("a window should be found");
    assert_eq!(window.participants, ids(&["B"]));
    assert_eq!(window.start, at(9, 9, 0));
    assert_eq!(outcome.stats.subsets_searched, 3);
}

// ── Test 3: balanced gaps under the default scoring ─────────────────────────

#[test]
fn default_scoring_prefers_balanced_gaps() {
    // With both gap terms on, the largest gap around the window is smallest
    // when the window sits at 14:00 (5h before for B, 5h after for both).
    let store = store(&[("A", at(9, 9, 0), at(9, 12, 0))], &["A", "B"]);
    let rules = CalendarRules::without_holidays();
    let cfg = SearchConfig::new(day(9), day(9), ids(&["A", "B"]))
        .with_work_hours(time(9, 0), time(20, 0));

    let window = CommonWindowFinder::new(&store, &rules)
        .find(&cfg, 1.0, &mut SearchBudget::unlimited())
        .unwrap()
        .window
        .unwrap();

    assert_eq!(window.participants, ids(&["A", "B"]));
    assert_eq!(window.start, at(9, 14, 0));
}

// ── Test 4: fully tiled calendars yield no window ───────────────────────────

#[test]
fn no_window_is_not_an_error() {
    let store = store(
        &[
            ("A", at(9, 9, 0), at(9, 20, 0)),
            ("B", at(9, 9, 0), at(9, 14, 30)),
            ("B", at(9, 15, 0), at(9, 20, 0)),
        ],
        &["A", "B"],
    );
    let rules = CalendarRules::without_holidays();
    let finder = CommonWindowFinder::new(&store, &rules);

    let outcome = finder
        .find(&config(9, 9, &["A", "B"]), 1.0, &mut SearchBudget::unlimited())
        .unwrap();

    assert!(outcome.window.is_none());
    assert!(outcome.score.is_none());
    assert_eq!(outcome.stats.windows_found, 0);
    assert!(outcome.stats.candidates_examined > 0);
}

// ── Test 5: min gap widens busy slots and coarsens the grid ─────────────────

#[test]
fn min_gap_keeps_distance_from_busy_slots() {
    let store = store(&[("A", at(9, 10, 0), at(9, 11, 0))], &["A"]);
    let rules = CalendarRules::without_holidays();
    let finder = CommonWindowFinder::new(&store, &rules);

    let tight = finder
        .find(&config(9, 9, &["A"]), 1.0, &mut SearchBudget::unlimited())
        .unwrap()
        .window
        .unwrap();
    assert_eq!(tight.start, at(9, 9, 0), "window may end where a slot starts");

    let buffered = finder
        .find(
            &config(9, 9, &["A"]).with_min_gap_hours(0.5),
            1.0,
            &mut SearchBudget::unlimited(),
        )
        .unwrap()
        .window
        .unwrap();
    assert_eq!(buffered.start, at(9, 11, 30));
}

// ── Test 6: day boundary is inclusive ───────────────────────────────────────

#[test]
fn window_may_end_exactly_at_latest_end_time() {
    let store = store(&[("A", at(9, 9, 0), at(9, 19, 0))], &["A"]);
    let rules = CalendarRules::without_holidays();

    let window = CommonWindowFinder::new(&store, &rules)
        .find(&config(9, 9, &["A"]), 1.0, &mut SearchBudget::unlimited())
        .unwrap()
        .window
        .unwrap();

    assert_eq!(window.start, at(9, 19, 0));
    assert_eq!(window.end, at(9, 20, 0));
}

#[test]
fn duration_longer_than_work_day_finds_nothing() {
    let store = store(&[], &["A"]);
    let rules = CalendarRules::without_holidays();

    let outcome = CommonWindowFinder::new(&store, &rules)
        .find(&config(9, 9, &["A"]), 12.0, &mut SearchBudget::unlimited())
        .unwrap();
    assert!(outcome.window.is_none());
    assert_eq!(outcome.stats.candidates_examined, 0);
}

// ── Test 7: weekends and holidays ───────────────────────────────────────────

#[test]
fn weekends_are_skipped_unless_included() {
    // 2025-06-14 is a Saturday.
    let store = store(&[], &["A"]);
    let rules = CalendarRules::without_holidays();
    let finder = CommonWindowFinder::new(&store, &rules);

    let weekday = finder
        .find(&config(14, 16, &["A"]), 1.0, &mut SearchBudget::unlimited())
        .unwrap();
    assert_eq!(weekday.window.unwrap().start, at(16, 9, 0));
    assert_eq!(weekday.stats.days_searched, 1);

    let mut cfg = config(14, 16, &["A"]);
    cfg.include_weekends = true;
    let weekend = finder.find(&cfg, 1.0, &mut SearchBudget::unlimited()).unwrap();
    assert_eq!(weekend.window.unwrap().start, at(14, 9, 0));
}

#[test]
fn holidays_are_skipped_unless_included() {
    let store = store(&[], &["A"]);
    let rules = CalendarRules::russian_federal(2025, 2025);
    let finder = CommonWindowFinder::new(&store, &rules);

    let skipped = finder
        .find(&config(12, 12, &["A"]), 1.0, &mut SearchBudget::unlimited())
        .unwrap();
    assert!(skipped.window.is_none());
    assert_eq!(skipped.stats.days_searched, 0);

    let mut cfg = config(12, 12, &["A"]);
    cfg.include_holidays = true;
    let included = finder.find(&cfg, 1.0, &mut SearchBudget::unlimited()).unwrap();
    assert_eq!(included.window.unwrap().start, at(12, 9, 0));
}

// ── Test 8: enumeration order ───────────────────────────────────────────────

#[test]
fn candidates_follow_subset_then_date_then_time_order() {
    let store = store(&[], &["A", "B"]);
    let rules = CalendarRules::without_holidays();
    let cfg = SearchConfig::new(day(9), day(10), ids(&["A", "B"])).with_work_hours(time(9, 0), time(11, 0));

    let windows = CommonWindowFinder::new(&store, &rules)
        .candidates(&cfg, 1.0, &mut SearchBudget::unlimited())
        .unwrap();

    // 3 subsets x 2 days x 5 starts (09:00 .. 10:00 every 15 min).
    assert_eq!(windows.len(), 30);
    assert_eq!(windows[0].participants, ids(&["A", "B"]));
    assert_eq!(windows[0].start, at(9, 9, 0));
    assert_eq!(windows[4].start, at(9, 10, 0));
    assert_eq!(windows[5].start, at(10, 9, 0));
    assert_eq!(windows[10].participants, ids(&["A"]));
    assert_eq!(windows[20].participants, ids(&["B"]));
    assert_eq!(windows[29].start, at(10, 10, 0));
}

#[test]
fn without_maximizing_only_the_full_set_is_searched() {
    let store = store(&[("A", at(9, 9, 0), at(9, 20, 0))], &["A", "B"]);
    let rules = CalendarRules::without_holidays();
    let cfg = config(9, 9, &["A", "B"]).with_scoring(ScoringConfig {
        maximize_participants: false,
        ..prompt_scoring()
    });

    let outcome = CommonWindowFinder::new(&store, &rules)
        .find(&cfg, 1.0, &mut SearchBudget::unlimited())
        .unwrap();

    assert!(outcome.window.is_none());
    assert_eq!(outcome.stats.subsets_searched, 1);
}

#[test]
fn equal_scores_resolve_to_first_enumerated() {
    let store = store(&[], &["A", "B"]);
    let rules = CalendarRules::without_holidays();
    // Only coverage counts, so every full-group window ties.
    let cfg = config(9, 10, &["A", "B"]).with_scoring(ScoringConfig {
        minimize_start_time: false,
        ..prompt_scoring()
    });

    let window = CommonWindowFinder::new(&store, &rules)
        .find(&cfg, 2.0, &mut SearchBudget::unlimited())
        .unwrap()
        .window
        .unwrap();
    assert_eq!(window.start, at(9, 9, 0));
    assert_eq!(window.participants, ids(&["A", "B"]));
}

// ── Test 9: limits ──────────────────────────────────────────────────────────

#[test]
fn candidate_limit_returns_best_so_far() {
    let store = store(&[("A", at(9, 9, 0), at(9, 9, 30))], &["A"]);
    let rules = CalendarRules::without_holidays();
    let mut budget = SearchBudget::unlimited().with_max_candidates(4);

    let outcome = CommonWindowFinder::new(&store, &rules)
        .find(&config(9, 9, &["A"]), 1.0, &mut budget)
        .unwrap();

    // 09:00, 09:15 overlap; 09:30, 09:45 are free.
    assert_eq!(outcome.stats.candidates_examined, 4);
    assert_eq!(outcome.stats.windows_found, 2);
    assert_eq!(outcome.stats.stop_reason, Some(StopReason::CandidateLimit));
    assert_eq!(outcome.window.unwrap().start, at(9, 9, 30));
}

#[test]
fn zero_budget_examines_nothing() {
    let store = store(&[], &["A"]);
    let rules = CalendarRules::without_holidays();
    let mut budget = SearchBudget::unlimited().with_max_candidates(0);

    let outcome = CommonWindowFinder::new(&store, &rules)
        .find(&config(9, 9, &["A"]), 1.0, &mut budget)
        .unwrap();
    assert!(outcome.window.is_none());
    assert!(!outcome.stats.is_complete());
}

// ── Test 10: validation ─────────────────────────────────────────────────────

#[test]
fn invalid_parameters_are_rejected() {
    let store = store(&[], &["A"]);
    let rules = CalendarRules::without_holidays();
    let finder = CommonWindowFinder::new(&store, &rules);

    let cases = [
        (config(9, 9, &[]), 1.0),
        (config(9, 9, &["A"]), 0.0),
        (config(9, 9, &["A"]), -1.0),
        (config(9, 9, &["A"]), f64::NAN),
        (config(9, 9, &["A", "A"]), 1.0),
        (config(10, 9, &["A"]), 1.0),
        (config(9, 9, &["A"]).with_work_hours(time(18, 0), time(9, 0)), 1.0),
        (config(9, 9, &["A"]).with_min_gap_hours(-0.5), 1.0),
    ];
    for (cfg, hours) in cases {
        let err = finder
            .find(&cfg, hours, &mut SearchBudget::unlimited())
            .unwrap_err();
        assert!(
            matches!(err, EngineError::InvalidParameters(_)),
            "expected InvalidParameters for {:?} / {}",
            cfg,
            hours
        );
    }
}

#[test]
fn oversized_duration_and_gap_are_rejected_without_panicking() {
    let store = store(&[("A", at(9, 10, 0), at(9, 11, 0))], &["A"]);
    let rules = CalendarRules::without_holidays();
    let finder = CommonWindowFinder::new(&store, &rules);

    let cases = [
        (config(9, 9, &["A"]), 1e10),
        (config(9, 9, &["A"]), 24.5),
        (config(9, 9, &["A"]).with_min_gap_hours(1e10), 1.0),
        (config(9, 9, &["A"]).with_min_gap_hours(25.0), 1.0),
    ];
    for (cfg, hours) in cases {
        let err = finder
            .find(&cfg, hours, &mut SearchBudget::unlimited())
            .unwrap_err();
        assert!(matches!(err, EngineError::InvalidParameters(_)));
    }

    // A full-day duration is still a valid request with no window.
    let outcome = finder
        .find(&config(9, 9, &["A"]), 24.0, &mut SearchBudget::unlimited())
        .unwrap();
    assert!(outcome.window.is_none());
}

#[test]
fn window_never_overlaps_gap_expanded_slots() {
    let gap = Duration::minutes(45);
    let busy = [
        ("A", at(9, 9, 30), at(9, 10, 15)),
        ("B", at(9, 12, 0), at(9, 13, 0)),
        ("A", at(9, 15, 10), at(9, 16, 0)),
    ];
    let store = store(&busy, &["A", "B"]);
    let rules = CalendarRules::without_holidays();
    let cfg = config(9, 9, &["A", "B"]).with_min_gap_hours(0.75);

    let windows = CommonWindowFinder::new(&store, &rules)
        .candidates(&cfg, 1.5, &mut SearchBudget::unlimited())
        .unwrap();

    assert!(!windows.is_empty());
    for w in &windows {
        assert_eq!(w.end - w.start, Duration::minutes(90));
        for &(owner, start, end) in &busy {
            if w.participants.contains(&ParticipantId::new(owner)) {
                assert!(
                    !(w.start - gap < end && start < w.end + gap),
                    "{:?} too close to {}'s slot {}-{}",
                    w,
                    owner,
                    start,
                    end
                );
            }
        }
    }
}
