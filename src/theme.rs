use crate::picker::{DayCell, RangeState};
use ratatui::style::{Color, Modifier, Style};

pub(crate) const BASE_STYLE: Style = Style::new().fg(Color::White).bg(Color::Black);

pub(crate) const TITLE_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const WEEKDAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const FILLER_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

pub(crate) const UNSELECTABLE_STYLE: Style = BASE_STYLE.fg(Color::Gray);

pub(crate) const SELECTED_STYLE: Style = Style::new()
    .fg(Color::Black)
    .bg(Color::LightCyan)
    .add_modifier(Modifier::BOLD);

pub(crate) const RANGE_MIDDLE_STYLE: Style = Style::new().fg(Color::Black).bg(Color::Cyan);

pub(crate) const HIGHLIGHT_STYLE: Style = BASE_STYLE
    .fg(Color::LightYellow)
    .add_modifier(Modifier::BOLD);

pub(crate) const TODAY_STYLE: Style = BASE_STYLE.add_modifier(Modifier::BOLD);

pub(crate) const STATUS_STYLE: Style = BASE_STYLE.fg(Color::LightRed);

pub(crate) const MODE_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

/// Map a day cell's flags to its terminal style.  Selection wins over
/// everything else; filler and unselectable days are dimmed.
pub(crate) fn day_style(cell: &DayCell) -> Style {
    if !cell.in_month {
        FILLER_STYLE
    } else if cell.selected {
        SELECTED_STYLE
    } else if cell.range_state == RangeState::Middle {
        RANGE_MIDDLE_STYLE
    } else if !cell.selectable {
        UNSELECTABLE_STYLE
    } else if cell.highlighted {
        HIGHLIGHT_STYLE
    } else if cell.today {
        TODAY_STYLE
    } else {
        BASE_STYLE
    }
}

pub(crate) mod jumpto {
    use super::{Color, Modifier, Style, BASE_STYLE};

    pub(crate) const UNFILLED_CELL_STYLE: Style = BASE_STYLE.fg(Color::DarkGray);

    pub(crate) const READY_ENTER_STYLE: Style = BASE_STYLE.add_modifier(Modifier::UNDERLINED);
}
