use log::debug;
use std::fmt;
use time::Date;

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum SelectionMode {
    /// Exactly one date; selecting a new one replaces it.
    #[default]
    Single,
    /// Any number of independent dates; clicking a selected date unselects
    /// it.
    Multiple,
    /// A start and end date defining an inclusive interval.
    Range,
}

impl SelectionMode {
    /// Maximum number of selected days the mode permits.
    fn capacity(self) -> usize {
        match self {
            SelectionMode::Single => 1,
            SelectionMode::Range => 2,
            SelectionMode::Multiple => usize::MAX,
        }
    }
}

impl fmt::Display for SelectionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SelectionMode::Single => "single",
            SelectionMode::Multiple => "multiple",
            SelectionMode::Range => "range",
        })
    }
}

/// What a selection mutation did, reported back to the caller as values.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) enum SelectionEvent {
    Selected(Date),
    Unselected(Date),
    RangeCompleted { start: Date, end: Date },
}

/// The set of currently-selected days, in insertion order, together with the
/// selection mode governing how clicks mutate it.
///
/// Invariants: under [`SelectionMode::Single`] at most one day is held; under
/// [`SelectionMode::Range`] at most two, with the first chronologically
/// before the second.
#[derive(Clone, Debug, Default, Eq, PartialEq)]
pub(crate) struct Selection {
    mode: SelectionMode,
    days: Vec<Date>,
}

impl Selection {
    pub(crate) fn new(mode: SelectionMode) -> Selection {
        Selection {
            mode,
            days: Vec::new(),
        }
    }

    pub(crate) fn mode(&self) -> SelectionMode {
        self.mode
    }

    /// Switch modes.  A selection that would violate the new mode's capacity
    /// is cleared.
    pub(crate) fn set_mode(&mut self, mode: SelectionMode) -> Vec<SelectionEvent> {
        self.mode = mode;
        if self.days.len() > mode.capacity() {
            self.clear()
        } else {
            Vec::new()
        }
    }

    pub(crate) fn days(&self) -> &[Date] {
        &self.days
    }

    pub(crate) fn first(&self) -> Option<Date> {
        self.days.first().copied()
    }

    pub(crate) fn is_empty(&self) -> bool {
        self.days.is_empty()
    }

    pub(crate) fn contains(&self, date: Date) -> bool {
        self.days.contains(&date)
    }

    /// Chronological bounds of the selected days.
    pub(crate) fn span(&self) -> Option<(Date, Date)> {
        let min = self.days.iter().copied().min()?;
        let max = self.days.iter().copied().max()?;
        Some((min, max))
    }

    /// The range start, when one has been picked under range mode.
    pub(crate) fn range_start(&self) -> Option<Date> {
        (self.mode == SelectionMode::Range)
            .then(|| self.days.first().copied())
            .flatten()
    }

    /// The range end, once the range is complete.
    pub(crate) fn range_end(&self) -> Option<Date> {
        (self.mode == SelectionMode::Range)
            .then(|| self.days.get(1).copied())
            .flatten()
    }

    /// Apply a click or programmatic selection of `date`, which the caller
    /// has already validated as selectable.  Returns the resulting changes
    /// in the order they happened.
    pub(crate) fn apply(&mut self, date: Date) -> Vec<SelectionEvent> {
        debug!("applying selection of {date} in {} mode", self.mode);
        match self.mode {
            SelectionMode::Single => {
                if self.days == [date] {
                    // Re-selecting the sole selected day is a no-op.
                    return Vec::new();
                }
                let mut events = self.clear();
                self.days.push(date);
                events.push(SelectionEvent::Selected(date));
                events
            }
            SelectionMode::Multiple => {
                if let Some(i) = self.days.iter().position(|&d| d == date) {
                    self.days.remove(i);
                    vec![SelectionEvent::Unselected(date)]
                } else {
                    self.days.push(date);
                    vec![SelectionEvent::Selected(date)]
                }
            }
            SelectionMode::Range => match *self.days.as_slice() {
                [] => {
                    self.days.push(date);
                    vec![SelectionEvent::Selected(date)]
                }
                [start] if date > start => {
                    self.days.push(date);
                    vec![
                        SelectionEvent::Selected(date),
                        SelectionEvent::RangeCompleted { start, end: date },
                    ]
                }
                // Clicking on or before the pending start, or clicking with
                // a complete range, starts over from the clicked date.
                _ => {
                    let mut events = self.clear();
                    self.days.push(date);
                    events.push(SelectionEvent::Selected(date));
                    events
                }
            },
        }
    }

    /// Unselect everything, reporting one event per formerly-selected day.
    pub(crate) fn clear(&mut self) -> Vec<SelectionEvent> {
        self.days
            .drain(..)
            .map(SelectionEvent::Unselected)
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    #[test]
    fn single_mode_replaces() {
        let mut sel = Selection::new(SelectionMode::Single);
        assert_eq!(
            sel.apply(date!(2024 - 01 - 15)),
            [SelectionEvent::Selected(date!(2024 - 01 - 15))]
        );
        assert_eq!(
            sel.apply(date!(2024 - 01 - 20)),
            [
                SelectionEvent::Unselected(date!(2024 - 01 - 15)),
                SelectionEvent::Selected(date!(2024 - 01 - 20)),
            ]
        );
        assert_eq!(sel.days(), [date!(2024 - 01 - 20)]);
    }

    #[test]
    fn single_mode_is_idempotent() {
        let mut sel = Selection::new(SelectionMode::Single);
        sel.apply(date!(2024 - 01 - 15));
        assert!(sel.apply(date!(2024 - 01 - 15)).is_empty());
        assert_eq!(sel.days(), [date!(2024 - 01 - 15)]);
    }

    #[test]
    fn single_mode_never_exceeds_one() {
        let mut sel = Selection::new(SelectionMode::Single);
        for day in 1..=20u8 {
            let date = date!(2024 - 01 - 01).replace_day(day).unwrap();
            sel.apply(date);
            assert!(sel.days().len() <= 1);
            assert_eq!(sel.first(), Some(date));
        }
    }

    #[test]
    fn range_mode_forward_pair() {
        let mut sel = Selection::new(SelectionMode::Range);
        sel.apply(date!(2024 - 01 - 15));
        assert_eq!(sel.range_start(), Some(date!(2024 - 01 - 15)));
        assert_eq!(sel.range_end(), None);
        let events = sel.apply(date!(2024 - 01 - 20));
        assert_eq!(
            events,
            [
                SelectionEvent::Selected(date!(2024 - 01 - 20)),
                SelectionEvent::RangeCompleted {
                    start: date!(2024 - 01 - 15),
                    end: date!(2024 - 01 - 20),
                },
            ]
        );
        assert_eq!(sel.days(), [date!(2024 - 01 - 15), date!(2024 - 01 - 20)]);
        assert_eq!(sel.range_end(), Some(date!(2024 - 01 - 20)));
    }

    #[test]
    fn range_mode_earlier_click_restarts() {
        let mut sel = Selection::new(SelectionMode::Range);
        sel.apply(date!(2024 - 01 - 15));
        let events = sel.apply(date!(2024 - 01 - 10));
        assert_eq!(
            events,
            [
                SelectionEvent::Unselected(date!(2024 - 01 - 15)),
                SelectionEvent::Selected(date!(2024 - 01 - 10)),
            ]
        );
        assert_eq!(sel.days(), [date!(2024 - 01 - 10)]);
        assert_eq!(sel.range_start(), Some(date!(2024 - 01 - 10)));
    }

    #[test]
    fn range_mode_equal_click_restarts() {
        let mut sel = Selection::new(SelectionMode::Range);
        sel.apply(date!(2024 - 01 - 15));
        sel.apply(date!(2024 - 01 - 15));
        assert_eq!(sel.days(), [date!(2024 - 01 - 15)]);
        assert_eq!(sel.range_end(), None);
    }

    #[test]
    fn range_mode_third_click_restarts() {
        let mut sel = Selection::new(SelectionMode::Range);
        sel.apply(date!(2024 - 01 - 15));
        sel.apply(date!(2024 - 01 - 20));
        let events = sel.apply(date!(2024 - 01 - 10));
        assert_eq!(
            events,
            [
                SelectionEvent::Unselected(date!(2024 - 01 - 15)),
                SelectionEvent::Unselected(date!(2024 - 01 - 20)),
                SelectionEvent::Selected(date!(2024 - 01 - 10)),
            ]
        );
        assert_eq!(sel.days(), [date!(2024 - 01 - 10)]);
    }

    #[test]
    fn multiple_mode_toggles() {
        let mut sel = Selection::new(SelectionMode::Multiple);
        sel.apply(date!(2024 - 01 - 05));
        sel.apply(date!(2024 - 01 - 10));
        sel.apply(date!(2024 - 01 - 03));
        assert_eq!(
            sel.days(),
            [
                date!(2024 - 01 - 05),
                date!(2024 - 01 - 10),
                date!(2024 - 01 - 03),
            ]
        );
        assert_eq!(
            sel.apply(date!(2024 - 01 - 10)),
            [SelectionEvent::Unselected(date!(2024 - 01 - 10))]
        );
        assert_eq!(sel.days(), [date!(2024 - 01 - 05), date!(2024 - 01 - 03)]);
        assert_eq!(sel.span(), Some((date!(2024 - 01 - 03), date!(2024 - 01 - 05))));
    }

    #[test]
    fn mode_switch_clears_overfull_selection() {
        let mut sel = Selection::new(SelectionMode::Multiple);
        sel.apply(date!(2024 - 01 - 05));
        sel.apply(date!(2024 - 01 - 10));
        sel.apply(date!(2024 - 01 - 12));
        let events = sel.set_mode(SelectionMode::Single);
        assert_eq!(events.len(), 3);
        assert!(sel.is_empty());
        assert_eq!(sel.mode(), SelectionMode::Single);
    }

    #[test]
    fn mode_switch_keeps_fitting_selection() {
        let mut sel = Selection::new(SelectionMode::Single);
        sel.apply(date!(2024 - 01 - 05));
        assert!(sel.set_mode(SelectionMode::Range).is_empty());
        assert_eq!(sel.days(), [date!(2024 - 01 - 05)]);
    }
}
