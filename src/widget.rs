use crate::picker::{CalendarPicker, ClickOutcome, MonthGrid, Week};
use crate::theme::{day_style, BASE_STYLE, TITLE_STYLE, WEEKDAY_STYLE};
use ratatui::{
    buffer::Buffer,
    layout::Rect,
    style::Modifier,
    text::{Line, Span},
    widgets::StatefulWidget,
};
use time::{Date, Duration, Weekday};

/// Columns per day of week, including the gutter
const DAY_WIDTH: u16 = 5;

/// Width of one month block in columns
const MAIN_WIDTH: u16 = DAY_WIDTH * 7 - 1;

/// Lines taken up by a month's title and weekday header
const TITLE_LINES: u16 = 2;

/// Blank lines between consecutive months
const MONTH_GAP: u16 = 1;

/// The UI-side window over the picker's month sequence: which month is at
/// the top of the screen, and which date the keyboard cursor is on.
///
/// Scrolling follows the cursor, and pending scroll targets queued by the
/// picker are consumed here at render time.
#[derive(Debug)]
pub(crate) struct Viewport {
    picker: CalendarPicker,
    cursor: Date,
    first_month: usize,
}

impl Viewport {
    pub(crate) fn new(picker: CalendarPicker) -> Viewport {
        let cursor = initial_cursor(&picker);
        Viewport {
            picker,
            cursor,
            first_month: 0,
        }
    }

    pub(crate) fn picker(&self) -> &CalendarPicker {
        &self.picker
    }

    pub(crate) fn cursor(&self) -> Date {
        self.cursor
    }

    /// Move the cursor by a number of days.  `false` when that would leave
    /// the displayed range.
    pub(crate) fn move_cursor(&mut self, days: i64) -> bool {
        let Some(target) = self.cursor.checked_add(Duration::days(days)) else {
            return false;
        };
        if self.picker.range().contains(target) {
            self.cursor = target;
            true
        } else {
            false
        }
    }

    /// Move the cursor to the same day-of-month in the previous or next
    /// month, clamping to month length and range bounds.
    pub(crate) fn month_step(&mut self, forwards: bool) -> bool {
        let Some(current) = self.picker.month_of(self.cursor) else {
            return false;
        };
        let Some(target) = (if forwards {
            current.checked_add(1)
        } else {
            current.checked_sub(1)
        }) else {
            return false;
        };
        let Some(key) = self.picker.month_key_at(target) else {
            return false;
        };
        let day = self.cursor.day().min(key.month().length(key.year()));
        let Ok(date) = Date::from_calendar_date(key.year(), key.month(), day) else {
            return false;
        };
        let Some(date) = self.clamp_to_range(date) else {
            return false;
        };
        self.cursor = date;
        true
    }

    pub(crate) fn jump_to_today(&mut self) -> bool {
        let today = self.picker.today();
        let Some(date) = self.clamp_to_range(today) else {
            return false;
        };
        self.cursor = date;
        self.picker.scroll_to_date(date)
    }

    /// Move the cursor and scroll to an arbitrary date.  `false` when its
    /// month is not displayed.
    pub(crate) fn jump_to(&mut self, date: Date) -> bool {
        if self.picker.scroll_to_date(date) {
            self.cursor = date;
            true
        } else {
            false
        }
    }

    /// Click the date under the cursor.
    pub(crate) fn click_cursor(&mut self) -> ClickOutcome {
        let cursor = self.cursor;
        self.picker.handle_click(cursor)
    }

    fn clamp_to_range(&self, date: Date) -> Option<Date> {
        let range = self.picker.range();
        let last = range.last_day()?;
        Some(date.clamp(range.min(), last))
    }

    /// Consume any queued scroll target and keep the cursor's month on
    /// screen for a viewport of the given height.
    fn sync_scroll(&mut self, height: u16) {
        if let Some(i) = self.picker.take_scroll() {
            self.first_month = i;
        }
        self.first_month = self
            .first_month
            .min(self.picker.month_count().saturating_sub(1));
        if let Some(cursor_month) = self.picker.month_of(self.cursor) {
            if cursor_month < self.first_month {
                self.first_month = cursor_month;
            } else {
                while self.first_month < cursor_month
                    && self.months_height(self.first_month, cursor_month) > height
                {
                    self.first_month += 1;
                }
            }
        }
    }

    fn months_height(&self, from: usize, to: usize) -> u16 {
        self.picker.grids()[from..=to]
            .iter()
            .map(|grid| {
                let weeks = u16::try_from(grid.weeks().len()).unwrap_or(u16::MAX);
                weeks + TITLE_LINES + MONTH_GAP
            })
            .sum()
    }
}

/// Initial cursor position: the first selected day if any, otherwise today
/// clamped into the displayed range.
fn initial_cursor(picker: &CalendarPicker) -> Date {
    if let Some(date) = picker.selected_date() {
        return date;
    }
    let range = picker.range();
    match range.last_day() {
        Some(last) => picker.today().clamp(range.min(), last),
        None => range.min(),
    }
}

#[derive(Clone, Copy, Debug, Default, Eq, PartialEq)]
pub(crate) struct CalendarWidget;

impl StatefulWidget for CalendarWidget {
    type State = Viewport;

    fn render(self, area: Rect, buf: &mut Buffer, state: &mut Viewport) {
        buf.set_style(area, BASE_STYLE);
        if state.picker.month_count() == 0 {
            buf.set_string(area.x, area.y, "no days to display", BASE_STYLE);
            return;
        }
        state.sync_scroll(area.height);
        let left = area.x + area.width.saturating_sub(MAIN_WIDTH) / 2;
        let bottom = area.bottom();
        let week_start = state.picker.week_start();
        let cursor = state.cursor;
        let mut y = area.y;
        for grid in state.picker.grids().iter().skip(state.first_month) {
            if y >= bottom {
                break;
            }
            y = render_month(grid, cursor, week_start, left, y, bottom, buf);
        }
    }
}

fn render_month(
    grid: &MonthGrid,
    cursor: Date,
    week_start: Weekday,
    left: u16,
    mut y: u16,
    bottom: u16,
    buf: &mut Buffer,
) -> u16 {
    let title = grid.key().to_string();
    let width = u16::try_from(title.len()).unwrap_or(u16::MAX);
    buf.set_string(
        left + MAIN_WIDTH.saturating_sub(width) / 2,
        y,
        &title,
        TITLE_STYLE,
    );
    y += 1;
    if y >= bottom {
        return y;
    }
    buf.set_line(left, y, &weekday_header(week_start), MAIN_WIDTH);
    y += 1;
    for week in grid.weeks() {
        if y >= bottom {
            return y;
        }
        buf.set_line(left, y, &week_line(week, cursor), MAIN_WIDTH);
        y += 1;
    }
    y + MONTH_GAP
}

fn week_line(week: &Week, cursor: Date) -> Line<'static> {
    let mut spans = Vec::with_capacity(13);
    for (i, cell) in week.cells().iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        let text = if cell.today {
            format!("[{:2}]", cell.day())
        } else {
            format!(" {:2} ", cell.day())
        };
        let mut style = day_style(cell);
        if cell.date == cursor {
            style = style.add_modifier(Modifier::UNDERLINED);
        }
        spans.push(Span::styled(text, style));
    }
    Line::from(spans)
}

fn weekday_header(week_start: Weekday) -> Line<'static> {
    let mut spans = Vec::with_capacity(13);
    let mut weekday = week_start;
    for i in 0..7 {
        if i > 0 {
            spans.push(Span::raw(" "));
        }
        spans.push(Span::styled(
            format!(" {} ", short_weekday(weekday)),
            WEEKDAY_STYLE,
        ));
        weekday = weekday.next();
    }
    Line::from(spans)
}

fn short_weekday(weekday: Weekday) -> &'static str {
    match weekday {
        Weekday::Sunday => "Su",
        Weekday::Monday => "Mo",
        Weekday::Tuesday => "Tu",
        Weekday::Wednesday => "We",
        Weekday::Thursday => "Th",
        Weekday::Friday => "Fr",
        Weekday::Saturday => "Sa",
    }
}
