use super::date::MonthKey;
use super::PickerError;
use log::debug;
use std::collections::HashMap;
use std::fmt;
use time::Date;

/// The span of days the picker displays: `min` inclusive, `max` exclusive.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct DateRange {
    min: Date,
    max: Date,
}

impl DateRange {
    pub(crate) fn new(min: Date, max: Date) -> Result<DateRange, PickerError> {
        if min > max {
            return Err(PickerError::InvalidRange { min, max });
        }
        Ok(DateRange { min, max })
    }

    pub(crate) fn min(&self) -> Date {
        self.min
    }

    pub(crate) fn max(&self) -> Date {
        self.max
    }

    /// The last day actually displayed, or `None` for an empty range.  `max`
    /// is exclusive, so a `max` falling on the first of a month pulls in no
    /// extra month.
    pub(crate) fn last_day(&self) -> Option<Date> {
        let last = self.max.previous_day()?;
        (last >= self.min).then_some(last)
    }

    pub(crate) fn contains(&self, date: Date) -> bool {
        self.min <= date && date < self.max
    }
}

impl fmt::Display for DateRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.last_day() {
            Some(last) => write!(f, "{} to {last}", self.min),
            None => write!(f, "empty range at {}", self.min),
        }
    }
}

/// Ordered sequence of the months in a [`DateRange`], with O(1) lookup of a
/// month's position by key or by date.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct MonthRangeIndex {
    keys: Vec<MonthKey>,
    positions: HashMap<MonthKey, usize>,
}

impl MonthRangeIndex {
    pub(crate) fn new(range: &DateRange) -> MonthRangeIndex {
        let mut keys = Vec::new();
        let mut positions = HashMap::new();
        if let Some(last) = range.last_day() {
            let end = MonthKey::of(last);
            let mut key = MonthKey::of(range.min());
            while key <= end {
                debug!("adding month {key}");
                positions.insert(key, keys.len());
                keys.push(key);
                key = key.next();
            }
        }
        MonthRangeIndex { keys, positions }
    }

    pub(crate) fn len(&self) -> usize {
        self.keys.len()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.keys.is_empty()
    }

    pub(crate) fn keys(&self) -> &[MonthKey] {
        &self.keys
    }

    pub(crate) fn index_of(&self, key: MonthKey) -> Option<usize> {
        self.positions.get(&key).copied()
    }

    pub(crate) fn key_at(&self, index: usize) -> Option<MonthKey> {
        self.keys.get(index).copied()
    }

    /// The position and key of the month containing `date`, if displayed.
    pub(crate) fn locate(&self, date: Date) -> Option<(usize, MonthKey)> {
        let key = MonthKey::of(date);
        self.index_of(key).map(|i| (i, key))
    }
}
