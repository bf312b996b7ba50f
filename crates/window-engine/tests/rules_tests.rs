//! Tests for business-day and work-hour rules.

use chrono::{NaiveDate, NaiveTime};
use window_engine::rules::{in_work_hours, is_weekend, CalendarRules};

fn date(m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(2025, m, d).unwrap()
}

fn time(h: u32, m: u32) -> NaiveTime {
    NaiveTime::from_hms_opt(h, m, 0).unwrap()
}

#[test]
fn weekends_are_detected() {
    assert!(is_weekend(date(6, 14))); // Saturday
    assert!(is_weekend(date(6, 15))); // Sunday
    assert!(!is_weekend(date(6, 16)));
}

#[test]
fn weekend_is_business_day_only_when_included() {
    let rules = CalendarRules::without_holidays();
    assert!(!rules.is_business_day(date(6, 14), false, false));
    assert!(rules.is_business_day(date(6, 14), true, false));
    assert!(rules.is_business_day(date(6, 13), false, false));
}

#[test]
fn injected_holiday_is_excluded_unless_included() {
    let rules = CalendarRules::new([date(6, 12)]);
    assert!(rules.is_holiday(date(6, 12)));
    assert!(!rules.is_business_day(date(6, 12), false, false));
    assert!(rules.is_business_day(date(6, 12), false, true));
}

#[test]
fn holiday_on_weekend_needs_both_flags() {
    let rules = CalendarRules::new([date(6, 14)]);
    assert!(!rules.is_business_day(date(6, 14), true, false));
    assert!(!rules.is_business_day(date(6, 14), false, true));
    assert!(rules.is_business_day(date(6, 14), true, true));
}

#[test]
fn russian_federal_calendar_for_one_year() {
    let rules = CalendarRules::russian_federal(2025, 2025);
    let holidays: Vec<NaiveDate> = rules.holidays().collect();

    assert_eq!(holidays.len(), 14);
    for d in 1..=8 {
        assert!(rules.is_holiday(date(1, d)), "January {} should be a holiday", d);
    }
    for (m, d) in [(2, 23), (3, 8), (5, 1), (5, 9), (6, 12), (11, 4)] {
        assert!(rules.is_holiday(date(m, d)), "{}-{} should be a holiday", m, d);
    }
    assert!(!rules.is_holiday(date(1, 9)));
}

#[test]
fn russian_federal_calendar_spans_years() {
    let rules = CalendarRules::russian_federal(2025, 2026);
    assert_eq!(rules.holidays().count(), 28);
    assert!(rules.is_holiday(NaiveDate::from_ymd_opt(2026, 11, 4).unwrap()));
}

#[test]
fn bad_holiday_rule_is_skipped() {
    let rules = CalendarRules::from_rrules(
        &["FREQ=NEVER", "FREQ=YEARLY;BYMONTH=1;BYMONTHDAY=1"],
        2025,
        2025,
    );
    let holidays: Vec<NaiveDate> = rules.holidays().collect();
    assert_eq!(holidays, vec![date(1, 1)]);
}

#[test]
fn business_days_skip_weekends_and_holidays() {
    let rules = CalendarRules::russian_federal(2025, 2025);

    let plain: Vec<NaiveDate> = rules.business_days(date(6, 9), date(6, 15), false, true).collect();
    assert_eq!(
        plain,
        vec![date(6, 9), date(6, 10), date(6, 11), date(6, 12), date(6, 13)]
    );

    let without_holidays: Vec<NaiveDate> =
        rules.business_days(date(6, 9), date(6, 15), false, false).collect();
    assert_eq!(without_holidays.len(), 4);
    assert!(!without_holidays.contains(&date(6, 12)));

    let everything = rules.business_days(date(6, 9), date(6, 15), true, true);
    assert_eq!(everything.clone().count(), 7);
    assert_eq!(everything.count(), 7, "iterator restarts from a clone");
}

#[test]
fn empty_range_has_no_business_days() {
    let rules = CalendarRules::without_holidays();
    assert_eq!(rules.business_days(date(6, 10), date(6, 9), true, true).count(), 0);
}

#[test]
fn work_hours_are_half_open_on_wall_clock() {
    let day = date(6, 9);
    let (earliest, latest) = (time(9, 0), time(18, 0));
    assert!(in_work_hours(day.and_time(time(9, 0)), earliest, latest));
    assert!(in_work_hours(day.and_time(time(17, 59)), earliest, latest));
    assert!(!in_work_hours(day.and_time(time(18, 0)), earliest, latest));
    assert!(!in_work_hours(day.and_time(time(8, 59)), earliest, latest));
}
