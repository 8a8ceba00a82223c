use chrono::{Datelike, Duration, Months, NaiveDate, Weekday};
use serde::{Deserialize, Serialize};

/// Weekday tag as stored on a task's eligible-day set. Ordered Monday-first,
/// matching the week anchoring used everywhere in this crate.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    Mon,
    Tue,
    Wed,
    Thu,
    Fri,
    Sat,
    Sun,
}

impl DayOfWeek {
    pub fn of(date: NaiveDate) -> Self {
        date.weekday().into()
    }
}

impl From<Weekday> for DayOfWeek {
    fn from(weekday: Weekday) -> Self {
        match weekday {
            Weekday::Mon => DayOfWeek::Mon,
            Weekday::Tue => DayOfWeek::Tue,
            Weekday::Wed => DayOfWeek::Wed,
            Weekday::Thu => DayOfWeek::Thu,
            Weekday::Fri => DayOfWeek::Fri,
            Weekday::Sat => DayOfWeek::Sat,
            Weekday::Sun => DayOfWeek::Sun,
        }
    }
}

/// Inclusive calendar-day interval.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
pub struct DateSpan {
    pub start: NaiveDate,
    pub end: NaiveDate,
}

impl DateSpan {
    pub fn new(start: NaiveDate, end: NaiveDate) -> Self {
        Self { start, end }
    }

    pub fn is_ordered(&self) -> bool {
        self.start <= self.end
    }

    pub fn contains(&self, date: NaiveDate) -> bool {
        self.start <= date && date <= self.end
    }

    /// Number of days covered, both endpoints included. Zero for an inverted span.
    pub fn len_days(&self) -> i64 {
        if self.is_ordered() {
            (self.end - self.start).num_days() + 1
        } else {
            0
        }
    }

    /// Every day in the span in ascending order; empty for an inverted span.
    pub fn days(&self) -> impl Iterator<Item = NaiveDate> {
        let end = self.end;
        let ordered = self.is_ordered();
        self.start
            .iter_days()
            .take_while(move |day| ordered && *day <= end)
    }
}

/// Monday of the week containing `date`.
pub fn week_start(date: NaiveDate) -> NaiveDate {
    date - Duration::days(i64::from(date.weekday().num_days_from_monday()))
}

/// Sunday of the week containing `date`.
pub fn week_end(date: NaiveDate) -> NaiveDate {
    week_start(date) + Duration::days(6)
}

/// Inclusive count of calendar months touched between `start` and `end`.
/// Zero when `end` precedes `start`.
pub fn month_span(start: NaiveDate, end: NaiveDate) -> u32 {
    if end < start {
        return 0;
    }
    let months = (end.year() - start.year()) * 12 + end.month() as i32 - start.month() as i32 + 1;
    months.max(0) as u32
}

pub fn shift_days(date: NaiveDate, days: i64) -> NaiveDate {
    date + Duration::days(days)
}

pub fn shift_weeks(date: NaiveDate, weeks: i64) -> NaiveDate {
    date + Duration::weeks(weeks)
}

/// Month arithmetic clamps to the last valid day of the target month.
pub fn shift_months(date: NaiveDate, months: i32) -> NaiveDate {
    let amount = Months::new(months.unsigned_abs());
    let shifted = if months >= 0 {
        date.checked_add_months(amount)
    } else {
        date.checked_sub_months(amount)
    };
    shifted.unwrap_or(date)
}

pub fn shift_years(date: NaiveDate, years: i32) -> NaiveDate {
    shift_months(date, years.saturating_mul(12))
}
