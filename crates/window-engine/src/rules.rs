//! Business-day and work-hour predicates.
//!
//! [`CalendarRules`] is a pure predicate layer over an injected holiday set.
//! Holiday sets built from recurrence rules degrade instead of failing: a rule
//! that cannot be expanded is logged and skipped.

use std::collections::BTreeSet;

use chrono::{Datelike, Duration, NaiveDate, NaiveDateTime, NaiveTime, Weekday};
use tracing::warn;

use crate::expander::expand_rrule;

/// Fixed-date federal holidays of the Russian Federation, as yearly RRULEs.
const RUSSIAN_FEDERAL_HOLIDAYS: &[&str] = &[
    "FREQ=YEARLY;BYMONTH=1;BYMONTHDAY=1,2,3,4,5,6,7,8",
    "FREQ=YEARLY;BYMONTH=2;BYMONTHDAY=23",
    "FREQ=YEARLY;BYMONTH=3;BYMONTHDAY=8",
    "FREQ=YEARLY;BYMONTH=5;BYMONTHDAY=1,9",
    "FREQ=YEARLY;BYMONTH=6;BYMONTHDAY=12",
    "FREQ=YEARLY;BYMONTH=11;BYMONTHDAY=4",
];

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CalendarRules {
    holidays: BTreeSet<NaiveDate>,
}

impl CalendarRules {
    pub fn new(holidays: impl IntoIterator<Item = NaiveDate>) -> Self {
        Self {
            holidays: holidays.into_iter().collect(),
        }
    }

    /// Rules with no holidays; only weekends are special.
    pub fn without_holidays() -> Self {
        Self::default()
    }

    /// Build the holiday set by expanding yearly RRULEs over `[first_year, last_year]`.
    pub fn from_rrules(rules: &[&str], first_year: i32, last_year: i32) -> Self {
        let (Some(dtstart), Some(until)) = (
            NaiveDate::from_ymd_opt(first_year, 1, 1).and_then(|d| d.and_hms_opt(0, 0, 0)),
            NaiveDate::from_ymd_opt(last_year, 12, 31).and_then(|d| d.and_hms_opt(23, 59, 59)),
        ) else {
            warn!(first_year, last_year, "holiday year range out of bounds; using no holidays");
            return Self::default();
        };

        let mut holidays = BTreeSet::new();
        for rule in rules {
            match expand_rrule(rule, dtstart, Duration::days(1), Some(until), None) {
                Ok(days) => holidays.extend(days.into_iter().map(|d| d.start.date())),
                Err(e) => warn!(rule = %rule, error = %e, "skipping holiday rule"),
            }
        }
        Self { holidays }
    }

    /// Federal holidays of the Russian Federation for the given years.
    pub fn russian_federal(first_year: i32, last_year: i32) -> Self {
        Self::from_rrules(RUSSIAN_FEDERAL_HOLIDAYS, first_year, last_year)
    }

    pub fn is_holiday(&self, date: NaiveDate) -> bool {
        self.holidays.contains(&date)
    }

    pub fn holidays(&self) -> impl Iterator<Item = NaiveDate> + '_ {
        self.holidays.iter().copied()
    }

    /// `false` for an excluded weekend or holiday, `true` otherwise.
    pub fn is_business_day(
        &self,
        date: NaiveDate,
        include_weekends: bool,
        include_holidays: bool,
    ) -> bool {
        if !include_weekends && is_weekend(date) {
            return false;
        }
        if !include_holidays && self.is_holiday(date) {
            return false;
        }
        true
    }

    /// Dates in `[start, end]` that pass [`is_business_day`](Self::is_business_day), ascending.
    pub fn business_days(
        &self,
        start: NaiveDate,
        end: NaiveDate,
        include_weekends: bool,
        include_holidays: bool,
    ) -> impl Iterator<Item = NaiveDate> + Clone + '_ {
        start
            .iter_days()
            .take_while(move |d| *d <= end)
            .filter(move |d| self.is_business_day(*d, include_weekends, include_holidays))
    }
}

pub fn is_weekend(date: NaiveDate) -> bool {
    matches!(date.weekday(), Weekday::Sat | Weekday::Sun)
}

/// Wall-clock time of `ts` falls in `[earliest, latest)`.
pub fn in_work_hours(ts: NaiveDateTime, earliest: NaiveTime, latest: NaiveTime) -> bool {
    let t = ts.time();
    t >= earliest && t < latest
}
