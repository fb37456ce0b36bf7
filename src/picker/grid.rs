use super::date::{week_alignment_offset, MonthKey};
use super::months::DateRange;
use super::selection::Selection;
use super::DateFilter;
use log::debug;
use time::{Date, Weekday};

pub(crate) const DAYS_IN_WEEK: usize = 7;

/// Position of a day within a selected range, for rendering.
#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) enum RangeState {
    #[default]
    None,
    First,
    Middle,
    Last,
}

/// Display and selection flags for one day cell of one month's grid.
///
/// Cells are plain values: a date shown as filler in a neighboring month's
/// grid is a separate `DayCell`, and grids are rebuilt wholesale whenever the
/// selection changes, so no two cells ever share state.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct DayCell {
    pub(crate) date: Date,
    pub(crate) in_month: bool,
    pub(crate) today: bool,
    pub(crate) selectable: bool,
    pub(crate) selected: bool,
    pub(crate) highlighted: bool,
    pub(crate) range_state: RangeState,
}

impl DayCell {
    pub(crate) fn day(&self) -> u8 {
        self.date.day()
    }

    pub(crate) fn is_range_start(&self) -> bool {
        self.range_state == RangeState::First
    }

    pub(crate) fn is_range_end(&self) -> bool {
        self.range_state == RangeState::Last
    }
}

/// One row of a month grid: exactly seven consecutive days.
#[derive(Clone, Copy, Debug, Eq, PartialEq)]
pub(crate) struct Week([DayCell; DAYS_IN_WEEK]);

impl Week {
    pub(crate) fn cells(&self) -> &[DayCell] {
        &self.0
    }
}

/// The full grid for one calendar month, including leading/trailing filler
/// days from the neighboring months.
#[derive(Clone, Debug, Eq, PartialEq)]
pub(crate) struct MonthGrid {
    key: MonthKey,
    weeks: Vec<Week>,
}

impl MonthGrid {
    pub(crate) fn key(&self) -> MonthKey {
        self.key
    }

    pub(crate) fn weeks(&self) -> &[Week] {
        &self.weeks
    }

    /// The in-month cell for `date`, if this is its month.
    pub(crate) fn find(&self, date: Date) -> Option<&DayCell> {
        self.weeks
            .iter()
            .flat_map(Week::cells)
            .find(|cell| cell.in_month && cell.date == date)
    }
}

/// Everything a grid build reads besides the month itself.  The output is
/// fully determined by these inputs.
pub(crate) struct GridContext<'a> {
    pub(crate) range: &'a DateRange,
    pub(crate) selection: &'a Selection,
    pub(crate) today: Date,
    pub(crate) week_start: Weekday,
    pub(crate) filter: Option<&'a DateFilter>,
    pub(crate) highlights: &'a [Date],
    pub(crate) display_only: bool,
}

/// Build the grid for `key`: start at the first of the month, step back to
/// the configured week start, and emit full seven-day rows for as long as a
/// row still begins in or before the target month.
pub(crate) fn build_month_grid(key: MonthKey, ctx: &GridContext<'_>) -> MonthGrid {
    let first = key.first_day();
    let offset = week_alignment_offset(first, ctx.week_start);
    let back = usize::try_from(-i16::from(offset)).expect("alignment offset should be in -6..=0");
    let mut cursor = n_days_before(first, back);
    let mut weeks = Vec::new();
    while MonthKey::of(cursor) <= key {
        weeks.push(Week(std::array::from_fn(|i| {
            make_cell(n_days_after(cursor, i), key, ctx)
        })));
        cursor = n_days_after(cursor, DAYS_IN_WEEK);
    }
    debug!("built grid for {key} with {} weeks", weeks.len());
    MonthGrid { key, weeks }
}

fn make_cell(date: Date, key: MonthKey, ctx: &GridContext<'_>) -> DayCell {
    let in_month = key.contains(date);
    DayCell {
        date,
        in_month,
        today: date == ctx.today,
        selectable: in_month
            && !ctx.display_only
            && ctx.range.contains(date)
            && ctx.filter.map_or(true, |f| f(date)),
        selected: in_month && ctx.selection.contains(date),
        highlighted: in_month && ctx.highlights.contains(&date),
        range_state: range_state_for(date, in_month, ctx.selection),
    }
}

fn range_state_for(date: Date, in_month: bool, selection: &Selection) -> RangeState {
    if !in_month {
        return RangeState::None;
    }
    let Some(start) = selection.range_start() else {
        return RangeState::None;
    };
    if date == start {
        return RangeState::First;
    }
    let Some(end) = selection.range_end() else {
        return RangeState::None;
    };
    if date == end {
        RangeState::Last
    } else if start < date && date < end {
        RangeState::Middle
    } else {
        RangeState::None
    }
}

fn n_days_after(mut date: Date, n: usize) -> Date {
    for _ in 0..n {
        date = date.next_day().expect("reached end of calendar");
    }
    date
}

fn n_days_before(mut date: Date, n: usize) -> Date {
    for _ in 0..n {
        date = date.previous_day().expect("reached beginning of calendar");
    }
    date
}
