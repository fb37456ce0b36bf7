mod date;
mod grid;
mod months;
mod selection;
pub(crate) use self::date::MonthKey;
pub(crate) use self::grid::{DayCell, MonthGrid, RangeState, Week};
pub(crate) use self::months::DateRange;
pub(crate) use self::selection::{SelectionEvent, SelectionMode};
use self::grid::{build_month_grid, GridContext};
use self::months::MonthRangeIndex;
use self::selection::Selection;
use log::debug;
use std::fmt;
use thiserror::Error;
use time::{Date, Weekday};

/// Decides whether a date may be chosen at all.
pub(crate) type DateFilter = dyn Fn(Date) -> bool;

/// Sees every click first; returning `true` swallows the click entirely.
pub(crate) type ClickInterceptor = dyn FnMut(Date) -> bool;

#[derive(Clone, Copy, Debug, Eq, Error, PartialEq)]
pub(crate) enum PickerError {
    #[error("minDate must be on or before maxDate (minDate {min}, maxDate {max})")]
    InvalidRange { min: Date, max: Date },
    #[error("selected date {date} must be at least {min} and before {max}")]
    OutOfRange { date: Date, min: Date, max: Date },
    #[error("{mode} mode cannot take {count} initial dates")]
    ModeMismatch { mode: SelectionMode, count: usize },
}

/// What a user click did.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) enum ClickOutcome {
    /// The selection mutated as reported; grids have been rebuilt.
    Changed(Vec<SelectionEvent>),
    /// The date was unselectable or outside the range; nothing changed.
    Invalid(Date),
    /// The registered interceptor swallowed the click.
    Intercepted,
}

/// The date-picker core: a bounded range of months rendered as day grids
/// plus the selection state over them.
///
/// Grids are immutable once built; every selection mutation replaces the
/// grids of all months containing a changed cell.  Dropping the picker and
/// calling [`CalendarPicker::init`] again is how a range or time-zone change
/// is applied.
pub(crate) struct CalendarPicker {
    range: DateRange,
    index: MonthRangeIndex,
    grids: Vec<MonthGrid>,
    selection: Selection,
    today: Date,
    week_start: Weekday,
    filter: Option<Box<DateFilter>>,
    interceptor: Option<Box<ClickInterceptor>>,
    highlights: Vec<Date>,
    display_only: bool,
    pending_scroll: Option<usize>,
}

impl CalendarPicker {
    /// Set up a picker displaying `min` (inclusive) through `max`
    /// (exclusive), in single-selection mode with nothing selected.
    pub(crate) fn init(min: Date, max: Date, today: Date) -> Result<CalendarPicker, PickerError> {
        let range = DateRange::new(min, max)?;
        let index = MonthRangeIndex::new(&range);
        let mut picker = CalendarPicker {
            range,
            index,
            grids: Vec::new(),
            selection: Selection::default(),
            today,
            week_start: Weekday::Sunday,
            filter: None,
            interceptor: None,
            highlights: Vec::new(),
            display_only: false,
            pending_scroll: None,
        };
        picker.rebuild_all();
        Ok(picker)
    }

    pub(crate) fn in_mode(mut self, mode: SelectionMode) -> CalendarPicker {
        self.set_mode(mode);
        self
    }

    pub(crate) fn first_day_of_week(mut self, week_start: Weekday) -> CalendarPicker {
        self.week_start = week_start;
        self.rebuild_all();
        self
    }

    pub(crate) fn selectable_when<F>(mut self, filter: F) -> CalendarPicker
    where
        F: Fn(Date) -> bool + 'static,
    {
        self.filter = Some(Box::new(filter));
        self.rebuild_all();
        self
    }

    pub(crate) fn intercept_clicks_with<F>(mut self, interceptor: F) -> CalendarPicker
    where
        F: FnMut(Date) -> bool + 'static,
    {
        self.interceptor = Some(Box::new(interceptor));
        self
    }

    pub(crate) fn highlight_dates(mut self, dates: Vec<Date>) -> CalendarPicker {
        self.highlights = dates;
        self.rebuild_all();
        self
    }

    /// Show the calendar without letting anything be selected.
    pub(crate) fn display_only(mut self) -> CalendarPicker {
        self.display_only = true;
        self.rebuild_all();
        self
    }

    pub(crate) fn with_selected_date(self, date: Date) -> Result<CalendarPicker, PickerError> {
        self.with_selected_dates(&[date])
    }

    /// Apply an initial selection and scroll to it.  The count must fit the
    /// current mode's capacity.
    pub(crate) fn with_selected_dates(
        mut self,
        dates: &[Date],
    ) -> Result<CalendarPicker, PickerError> {
        let mode = self.selection.mode();
        let count = dates.len();
        match mode {
            SelectionMode::Single if count > 1 => {
                return Err(PickerError::ModeMismatch { mode, count })
            }
            SelectionMode::Range if count > 2 => {
                return Err(PickerError::ModeMismatch { mode, count })
            }
            _ => (),
        }
        for &date in dates {
            self.select_date(date)?;
        }
        self.scroll_to_selection();
        Ok(self)
    }

    pub(crate) fn mode(&self) -> SelectionMode {
        self.selection.mode()
    }

    /// Switch selection modes; a selection exceeding the new mode's capacity
    /// is cleared.  A retained selection still gets its months rebuilt, since
    /// range flags depend on the mode.
    pub(crate) fn set_mode(&mut self, mode: SelectionMode) {
        if mode == self.selection.mode() {
            return;
        }
        let mut affected = self.selection_months();
        self.selection.set_mode(mode);
        affected.extend(self.selection_months());
        self.rebuild_months(affected);
    }

    pub(crate) fn range(&self) -> DateRange {
        self.range
    }

    pub(crate) fn today(&self) -> Date {
        self.today
    }

    pub(crate) fn week_start(&self) -> Weekday {
        self.week_start
    }

    /// The first selected date, in insertion order.
    pub(crate) fn selected_date(&self) -> Option<Date> {
        self.selection.first()
    }

    pub(crate) fn selected_dates(&self) -> &[Date] {
        self.selection.days()
    }

    pub(crate) fn grids(&self) -> &[MonthGrid] {
        &self.grids
    }

    pub(crate) fn month_count(&self) -> usize {
        self.grids.len()
    }

    /// Position of the month containing `date`, if displayed.
    pub(crate) fn month_of(&self, date: Date) -> Option<usize> {
        self.index.locate(date).map(|(i, _)| i)
    }

    pub(crate) fn month_key_at(&self, index: usize) -> Option<MonthKey> {
        self.index.key_at(index)
    }

    /// Route a user click on `date` through interception, validation, and
    /// the per-mode selection rules.
    pub(crate) fn handle_click(&mut self, date: Date) -> ClickOutcome {
        if let Some(interceptor) = self.interceptor.as_mut() {
            if interceptor(date) {
                debug!("click on {date} intercepted");
                return ClickOutcome::Intercepted;
            }
        }
        if !self.range.contains(date) || !self.is_selectable(date) {
            debug!("click on unselectable date {date}");
            return ClickOutcome::Invalid(date);
        }
        ClickOutcome::Changed(self.mutate(|selection| selection.apply(date)))
    }

    /// Programmatic selection.  Errors when `date` lies outside the range;
    /// returns `false` without mutating when the date maps to no selectable
    /// cell; otherwise applies the same per-mode rules as a click and queues
    /// a scroll to the date's month.
    pub(crate) fn select_date(&mut self, date: Date) -> Result<bool, PickerError> {
        if !self.range.contains(date) {
            return Err(PickerError::OutOfRange {
                date,
                min: self.range.min(),
                max: self.range.max(),
            });
        }
        let Some((month_index, _)) = self.index.locate(date) else {
            return Ok(false);
        };
        if !self.is_selectable(date) {
            return Ok(false);
        }
        self.mutate(|selection| selection.apply(date));
        self.pending_scroll = Some(month_index);
        Ok(true)
    }

    /// Whether `date` maps to a selectable in-month cell.
    pub(crate) fn is_selectable(&self, date: Date) -> bool {
        self.index
            .locate(date)
            .and_then(|(i, _)| self.grids[i].find(date))
            .is_some_and(|cell| cell.selectable)
    }

    /// Queue a scroll to the month containing `date`.  `false` (and no state
    /// change) when that month is not displayed.
    pub(crate) fn scroll_to_date(&mut self, date: Date) -> bool {
        match self.index.locate(date) {
            Some((i, key)) => {
                debug!("scrolling to {key} at position {i}");
                self.pending_scroll = Some(i);
                true
            }
            None => false,
        }
    }

    /// Queue a scroll to the first month holding a selected date, falling
    /// back to today's month.
    pub(crate) fn scroll_to_selection(&mut self) -> bool {
        let target = self
            .selection
            .days()
            .iter()
            .filter_map(|&d| self.index.locate(d).map(|(i, _)| i))
            .min()
            .or_else(|| self.index.locate(self.today).map(|(i, _)| i));
        match target {
            Some(i) => {
                self.pending_scroll = Some(i);
                true
            }
            None => false,
        }
    }

    /// Hand the queued scroll target to the UI, clearing it.
    pub(crate) fn take_scroll(&mut self) -> Option<usize> {
        self.pending_scroll.take()
    }

    /// Run a selection mutation, then rebuild the grids of every month that
    /// contained a changed cell: the months of the old and new selected days
    /// plus the full span between range endpoints.
    fn mutate<F>(&mut self, f: F) -> Vec<SelectionEvent>
    where
        F: FnOnce(&mut Selection) -> Vec<SelectionEvent>,
    {
        let mut affected = self.selection_months();
        let events = f(&mut self.selection);
        if events.is_empty() {
            return events;
        }
        affected.extend(self.selection_months());
        self.rebuild_months(affected);
        events
    }

    fn rebuild_months(&mut self, mut affected: Vec<usize>) {
        affected.sort_unstable();
        affected.dedup();
        for i in affected {
            if let Some(key) = self.index.key_at(i) {
                let grid = self.build_grid(key);
                self.grids[i] = grid;
            }
        }
    }

    /// Positions of all months whose grids depend on the current selection.
    fn selection_months(&self) -> Vec<usize> {
        let mut months: Vec<usize> = self
            .selection
            .days()
            .iter()
            .filter_map(|&d| self.index.locate(d).map(|(i, _)| i))
            .collect();
        if let (Some(start), Some(end)) = (
            self.selection.range_start().and_then(|d| self.index.locate(d)),
            self.selection.range_end().and_then(|d| self.index.locate(d)),
        ) {
            months.extend(start.0..=end.0);
        }
        months
    }

    fn build_grid(&self, key: MonthKey) -> MonthGrid {
        build_month_grid(
            key,
            &GridContext {
                range: &self.range,
                selection: &self.selection,
                today: self.today,
                week_start: self.week_start,
                filter: self.filter.as_deref(),
                highlights: &self.highlights,
                display_only: self.display_only,
            },
        )
    }

    fn rebuild_all(&mut self) {
        let grids = self
            .index
            .keys()
            .iter()
            .map(|&key| self.build_grid(key))
            .collect();
        self.grids = grids;
    }
}

impl fmt::Debug for CalendarPicker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CalendarPicker")
            .field("range", &self.range)
            .field("selection", &self.selection)
            .field("today", &self.today)
            .field("week_start", &self.week_start)
            .field("months", &self.grids.len())
            .field("filter", &self.filter.is_some())
            .field("interceptor", &self.interceptor.is_some())
            .field("highlights", &self.highlights)
            .field("display_only", &self.display_only)
            .field("pending_scroll", &self.pending_scroll)
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::date;

    fn picker() -> CalendarPicker {
        CalendarPicker::init(
            date!(2024 - 01 - 01),
            date!(2024 - 03 - 01),
            date!(2024 - 01 - 22),
        )
        .unwrap()
    }

    #[test]
    fn init_rejects_inverted_range() {
        let r = CalendarPicker::init(
            date!(2024 - 03 - 01),
            date!(2024 - 01 - 01),
            date!(2024 - 01 - 22),
        );
        assert!(matches!(r, Err(PickerError::InvalidRange { .. })));
    }

    #[test]
    fn init_builds_one_grid_per_month() {
        let picker = picker();
        assert_eq!(picker.month_count(), 2);
        assert_eq!(picker.grids()[0].key().to_string(), "January 2024");
        assert_eq!(picker.grids()[1].key().to_string(), "February 2024");
        assert!(picker.selected_date().is_none());
        assert_eq!(picker.mode(), SelectionMode::Single);
    }

    #[test]
    fn range_scenario_from_clicks() {
        let mut picker = picker().in_mode(SelectionMode::Range);
        assert!(matches!(
            picker.handle_click(date!(2024 - 01 - 15)),
            ClickOutcome::Changed(_)
        ));
        let outcome = picker.handle_click(date!(2024 - 01 - 20));
        let ClickOutcome::Changed(events) = outcome else {
            panic!("expected a selection change, got {outcome:?}");
        };
        assert!(events.contains(&SelectionEvent::RangeCompleted {
            start: date!(2024 - 01 - 15),
            end: date!(2024 - 01 - 20),
        }));
        assert_eq!(
            picker.selected_dates(),
            [date!(2024 - 01 - 15), date!(2024 - 01 - 20)]
        );
        // Third click clears both and starts over.
        picker.handle_click(date!(2024 - 01 - 10));
        assert_eq!(picker.selected_dates(), [date!(2024 - 01 - 10)]);
        let cell = picker.grids()[0].find(date!(2024 - 01 - 10)).copied().unwrap();
        assert!(cell.selected);
        assert!(cell.is_range_start());
    }

    #[test]
    fn click_outside_range_is_invalid() {
        let mut picker = picker();
        assert_eq!(
            picker.handle_click(date!(2024 - 03 - 05)),
            ClickOutcome::Invalid(date!(2024 - 03 - 05))
        );
        assert!(picker.selected_date().is_none());
    }

    #[test]
    fn click_on_filtered_date_is_invalid() {
        let mut picker = picker().selectable_when(|d| d != date!(2024 - 01 - 13));
        assert_eq!(
            picker.handle_click(date!(2024 - 01 - 13)),
            ClickOutcome::Invalid(date!(2024 - 01 - 13))
        );
        assert!(picker.selected_date().is_none());
        assert!(matches!(
            picker.handle_click(date!(2024 - 01 - 14)),
            ClickOutcome::Changed(_)
        ));
    }

    #[test]
    fn interceptor_vetoes_before_any_mutation() {
        let mut picker = picker().intercept_clicks_with(|_| true);
        assert_eq!(
            picker.handle_click(date!(2024 - 01 - 15)),
            ClickOutcome::Intercepted
        );
        assert!(picker.selected_date().is_none());
    }

    #[test]
    fn display_only_rejects_clicks() {
        let mut picker = picker().display_only();
        assert_eq!(
            picker.handle_click(date!(2024 - 01 - 15)),
            ClickOutcome::Invalid(date!(2024 - 01 - 15))
        );
    }

    #[test]
    fn select_date_out_of_range_errors() {
        let mut picker = picker();
        assert_eq!(
            picker.select_date(date!(2024 - 03 - 01)),
            Err(PickerError::OutOfRange {
                date: date!(2024 - 03 - 01),
                min: date!(2024 - 01 - 01),
                max: date!(2024 - 03 - 01),
            })
        );
        assert_eq!(
            picker.select_date(date!(2023 - 12 - 31)),
            Err(PickerError::OutOfRange {
                date: date!(2023 - 12 - 31),
                min: date!(2024 - 01 - 01),
                max: date!(2024 - 03 - 01),
            })
        );
    }

    #[test]
    fn select_date_on_unselectable_date_is_a_no_op() {
        let mut picker = picker().selectable_when(|d| d != date!(2024 - 01 - 13));
        assert_eq!(picker.select_date(date!(2024 - 01 - 13)), Ok(false));
        assert!(picker.selected_date().is_none());
        assert_eq!(picker.take_scroll(), None);
    }

    #[test]
    fn select_date_queues_a_scroll() {
        let mut picker = picker();
        assert_eq!(picker.select_date(date!(2024 - 02 - 10)), Ok(true));
        assert_eq!(picker.selected_date(), Some(date!(2024 - 02 - 10)));
        assert_eq!(picker.take_scroll(), Some(1));
        assert_eq!(picker.take_scroll(), None);
    }

    #[test]
    fn grids_track_selection_across_months() {
        let mut picker = picker();
        picker.handle_click(date!(2024 - 01 - 15));
        assert!(picker.grids()[0].find(date!(2024 - 01 - 15)).unwrap().selected);
        picker.handle_click(date!(2024 - 02 - 10));
        assert!(!picker.grids()[0].find(date!(2024 - 01 - 15)).unwrap().selected);
        assert!(picker.grids()[1].find(date!(2024 - 02 - 10)).unwrap().selected);
    }

    #[test]
    fn with_selected_dates_enforces_mode_capacity() {
        let dates = [
            date!(2024 - 01 - 10),
            date!(2024 - 01 - 15),
            date!(2024 - 01 - 20),
        ];
        let r = picker().with_selected_dates(&dates[..2]);
        assert!(matches!(
            r,
            Err(PickerError::ModeMismatch {
                mode: SelectionMode::Single,
                count: 2,
            })
        ));
        let r = picker().in_mode(SelectionMode::Range).with_selected_dates(&dates);
        assert!(matches!(
            r,
            Err(PickerError::ModeMismatch {
                mode: SelectionMode::Range,
                count: 3,
            })
        ));
    }

    #[test]
    fn with_selected_dates_applies_and_scrolls() {
        let mut picker = picker()
            .in_mode(SelectionMode::Range)
            .with_selected_dates(&[date!(2024 - 02 - 05), date!(2024 - 02 - 10)])
            .unwrap();
        assert_eq!(
            picker.selected_dates(),
            [date!(2024 - 02 - 05), date!(2024 - 02 - 10)]
        );
        assert_eq!(picker.take_scroll(), Some(1));
        let cell = picker.grids()[1].find(date!(2024 - 02 - 07)).copied().unwrap();
        assert_eq!(cell.range_state, RangeState::Middle);
    }

    #[test]
    fn multiple_mode_accepts_many_initial_dates() {
        let picker = picker()
            .in_mode(SelectionMode::Multiple)
            .with_selected_dates(&[
                date!(2024 - 01 - 05),
                date!(2024 - 01 - 10),
                date!(2024 - 02 - 15),
            ])
            .unwrap();
        assert_eq!(picker.selected_dates().len(), 3);
    }

    #[test]
    fn scroll_to_date_round_trip() {
        let mut picker = picker();
        assert!(picker.scroll_to_date(date!(2024 - 02 - 14)));
        assert_eq!(picker.take_scroll(), Some(1));
        assert!(!picker.scroll_to_date(date!(2024 - 03 - 14)));
        assert_eq!(picker.take_scroll(), None);
    }

    #[test]
    fn scroll_to_selection_falls_back_to_today() {
        let mut picker = picker();
        assert!(picker.scroll_to_selection());
        assert_eq!(picker.take_scroll(), Some(0));
        picker.handle_click(date!(2024 - 02 - 10));
        picker.take_scroll();
        assert!(picker.scroll_to_selection());
        assert_eq!(picker.take_scroll(), Some(1));
    }

    #[test]
    fn mode_switch_refreshes_mode_dependent_flags() {
        let mut picker = picker();
        picker.handle_click(date!(2024 - 01 - 15));
        picker.set_mode(SelectionMode::Range);
        let cell = picker.grids()[0].find(date!(2024 - 01 - 15)).unwrap();
        assert!(cell.selected);
        assert!(cell.is_range_start());
        // Leaving range mode drops the range flag but keeps the selection.
        picker.set_mode(SelectionMode::Multiple);
        let cell = picker.grids()[0].find(date!(2024 - 01 - 15)).unwrap();
        assert!(cell.selected);
        assert_eq!(cell.range_state, RangeState::None);
    }

    #[test]
    fn with_selected_date_selects_and_scrolls() {
        let mut picker = picker().with_selected_date(date!(2024 - 02 - 10)).unwrap();
        assert_eq!(picker.selected_date(), Some(date!(2024 - 02 - 10)));
        assert!(picker.grids()[1].find(date!(2024 - 02 - 10)).unwrap().selected);
        assert_eq!(picker.take_scroll(), Some(1));
    }

    #[test]
    fn highlighted_dates_flow_through_to_grids() {
        let picker = picker().highlight_dates(vec![date!(2024 - 02 - 14)]);
        assert!(picker.grids()[1].find(date!(2024 - 02 - 14)).unwrap().highlighted);
        assert!(!picker.grids()[0].find(date!(2024 - 01 - 14)).unwrap().highlighted);
    }

    #[test]
    fn mode_switch_clears_overfull_selection_and_grids() {
        let mut picker = picker().in_mode(SelectionMode::Multiple);
        picker.handle_click(date!(2024 - 01 - 05));
        picker.handle_click(date!(2024 - 01 - 10));
        picker.set_mode(SelectionMode::Single);
        assert!(picker.selected_date().is_none());
        assert!(!picker.grids()[0].find(date!(2024 - 01 - 05)).unwrap().selected);
        assert!(!picker.grids()[0].find(date!(2024 - 01 - 10)).unwrap().selected);
    }
}
