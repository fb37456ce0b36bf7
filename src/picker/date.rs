use std::cmp::Ordering;
use std::fmt;
use std::hash::{Hash, Hasher};
use time::{Date, Month, Weekday};

pub(crate) trait WeekdayExt {
    fn index0(&self) -> u8;
}

impl WeekdayExt for Weekday {
    fn index0(&self) -> u8 {
        self.number_days_from_sunday()
    }
}

/// Number of days to step back from the first of a month so that the grid's
/// first visible day falls on `week_start`.  Always in `-6..=0`.
pub(crate) fn week_alignment_offset(first_of_month: Date, week_start: Weekday) -> i8 {
    let start = i8::try_from(week_start.index0()).expect("weekday index should fit in an i8");
    let first = i8::try_from(first_of_month.weekday().index0())
        .expect("weekday index should fit in an i8");
    let mut offset = start - first;
    if offset > 0 {
        offset -= 7;
    }
    offset
}

/// A (year, month) pair identifying one calendar month.
///
/// Ordering is chronological.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct MonthKey {
    year: i32,
    month: Month,
}

impl MonthKey {
    pub(crate) fn new(year: i32, month: Month) -> MonthKey {
        MonthKey { year, month }
    }

    pub(crate) fn of(date: Date) -> MonthKey {
        MonthKey {
            year: date.year(),
            month: date.month(),
        }
    }

    pub(crate) fn year(&self) -> i32 {
        self.year
    }

    pub(crate) fn month(&self) -> Month {
        self.month
    }

    pub(crate) fn first_day(&self) -> Date {
        Date::from_calendar_date(self.year, self.month, 1)
            .expect("the first of a month should be a valid date")
    }

    pub(crate) fn next(&self) -> MonthKey {
        let month = self.month.next();
        let year = if month == Month::January {
            self.year + 1
        } else {
            self.year
        };
        MonthKey { year, month }
    }

    /// True iff `date` falls within this calendar month.
    pub(crate) fn contains(&self, date: Date) -> bool {
        date.year() == self.year && date.month() == self.month
    }
}

impl Ord for MonthKey {
    fn cmp(&self, other: &MonthKey) -> Ordering {
        (self.year, u8::from(self.month)).cmp(&(other.year, u8::from(other.month)))
    }
}

impl PartialOrd for MonthKey {
    fn partial_cmp(&self, other: &MonthKey) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Hash for MonthKey {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.year.hash(state);
        u8::from(self.month).hash(state);
    }
}

impl fmt::Display for MonthKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", self.month, self.year)
    }
}
