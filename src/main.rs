mod app;
mod help;
mod jumpto;
mod picker;
mod theme;
mod widget;
use crate::app::App;
use crate::picker::{CalendarPicker, SelectionMode};
use crate::widget::Viewport;
use anyhow::Context;
use lexopt::{Arg, Parser, ValueExt};
use ratatui::DefaultTerminal;
use time::{format_description::FormatItem, macros::format_description, Date, Month, OffsetDateTime, Weekday};

static YMD_FMT: &[FormatItem<'_>] = format_description!("[year]-[month]-[day]");

#[derive(Clone, Debug, Eq, PartialEq)]
enum Command {
    Run {
        mode: Option<SelectionMode>,
        min: Option<Date>,
        max: Option<Date>,
        week_start: Weekday,
        highlights: Vec<Date>,
        dates: Vec<String>,
    },
    Help,
    Version,
}

impl Command {
    fn from_parser(mut parser: Parser) -> Result<Command, lexopt::Error> {
        let mut mode = None;
        let mut min = None;
        let mut max = None;
        let mut week_start = Weekday::Sunday;
        let mut highlights = Vec::new();
        let mut dates = Vec::new();
        while let Some(arg) = parser.next()? {
            match arg {
                Arg::Short('h') | Arg::Long("help") => return Ok(Command::Help),
                Arg::Short('V') | Arg::Long("version") => return Ok(Command::Version),
                Arg::Short('m') | Arg::Long("mode") => {
                    let value = parser.value()?.string()?;
                    match parse_mode(&value) {
                        Some(m) => mode = Some(m),
                        None => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: "expected \"single\", \"multiple\", or \"range\"".into(),
                            })
                        }
                    }
                }
                Arg::Long("min") => min = Some(parse_date(parser.value()?.string()?)?),
                Arg::Long("max") => max = Some(parse_date(parser.value()?.string()?)?),
                Arg::Long("highlight") => highlights.push(parse_date(parser.value()?.string()?)?),
                Arg::Short('w') | Arg::Long("first-weekday") => {
                    let value = parser.value()?.string()?;
                    match parse_weekday(&value) {
                        Some(wd) => week_start = wd,
                        None => {
                            return Err(lexopt::Error::ParsingFailed {
                                value,
                                error: "expected a day of the week".into(),
                            })
                        }
                    }
                }
                Arg::Value(value) => dates.push(value.string()?),
                _ => return Err(arg.unexpected()),
            }
        }
        Ok(Command::Run {
            mode,
            min,
            max,
            week_start,
            highlights,
            dates,
        })
    }

    fn run(self) -> anyhow::Result<()> {
        match self {
            Command::Run {
                mode,
                min,
                max,
                week_start,
                highlights,
                dates,
            } => {
                let today = OffsetDateTime::now_local()
                    .context("failed to determine local date")?
                    .date();
                let min = min.unwrap_or_else(|| shift_year(today, -1));
                let max = max.unwrap_or_else(|| shift_year(today, 1));
                let (mut dates, ranged, skipped) = resolve_dates(&dates);
                let mode = mode.unwrap_or_else(|| infer_mode(&dates, ranged));
                // A botched initial date still opens the picker, preselecting
                // today in single mode.
                if skipped && dates.is_empty() && mode == SelectionMode::Single {
                    dates.push(today);
                }
                let picker = CalendarPicker::init(min, max, today)
                    .context("cannot display the requested dates")?
                    .in_mode(mode)
                    .first_day_of_week(week_start)
                    .highlight_dates(highlights);
                let picker = if let [date] = *dates.as_slice() {
                    picker.with_selected_date(date)
                } else {
                    picker.with_selected_dates(&dates)
                }
                .context("cannot apply the initial selection")?;
                let picked = with_terminal(|mut terminal| {
                    terminal.hide_cursor().context("failed to hide cursor")?;
                    App::new(Viewport::new(picker)).run(terminal).map_err(Into::into)
                })?;
                report(mode, picked);
                Ok(())
            }
            Command::Help => {
                println!("Usage: daypick [OPTIONS] [DATE ...]");
                println!();
                println!("Pick one or more dates from a terminal calendar");
                println!();
                println!("Dates are given as YYYY-MM-DD; an initial range as START..END.");
                println!("Without --mode, one date means single, START..END means range,");
                println!("and several dates mean multiple.");
                println!();
                println!("Options:");
                println!("  -m, --mode <MODE>       Selection mode: single, multiple, or range");
                println!("      --min <DATE>        First selectable date [default: a year ago]");
                println!("      --max <DATE>        First date past the selectable window");
                println!("                          [default: a year from now]");
                println!("      --highlight <DATE>  Mark a date in the calendar (repeatable)");
                println!("  -w, --first-weekday <DAY>");
                println!("                          First day of the calendar week [default: sunday]");
                println!("  -h, --help              Display this help message and exit");
                println!("  -V, --version           Show the program version and exit");
                Ok(())
            }
            Command::Version => {
                println!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION"));
                Ok(())
            }
        }
    }
}

fn main() -> anyhow::Result<()> {
    Command::from_parser(Parser::from_env())?.run()
}

fn with_terminal<F, T>(func: F) -> anyhow::Result<T>
where
    F: FnOnce(DefaultTerminal) -> anyhow::Result<T>,
{
    let terminal = ratatui::init();
    let r = func(terminal);
    ratatui::restore();
    r
}

/// Print the final selection: one date per line, except a completed range,
/// which prints as `START..END`.
fn report(mode: SelectionMode, mut picked: Vec<Date>) {
    picked.sort_unstable();
    if mode == SelectionMode::Range && picked.len() == 2 {
        println!("{}..{}", picked[0], picked[1]);
    } else {
        for date in picked {
            println!("{date}");
        }
    }
}

fn parse_date(value: String) -> Result<Date, lexopt::Error> {
    match Date::parse(&value, &YMD_FMT) {
        Ok(d) => Ok(d),
        Err(e) => Err(lexopt::Error::ParsingFailed {
            value,
            error: Box::new(e),
        }),
    }
}

fn parse_mode(value: &str) -> Option<SelectionMode> {
    match value.to_ascii_lowercase().as_str() {
        "single" => Some(SelectionMode::Single),
        "multiple" | "multi" => Some(SelectionMode::Multiple),
        "range" => Some(SelectionMode::Range),
        _ => None,
    }
}

fn parse_weekday(value: &str) -> Option<Weekday> {
    match value.to_ascii_lowercase().as_str() {
        "sunday" | "sun" => Some(Weekday::Sunday),
        "monday" | "mon" => Some(Weekday::Monday),
        "tuesday" | "tue" => Some(Weekday::Tuesday),
        "wednesday" | "wed" => Some(Weekday::Wednesday),
        "thursday" | "thu" => Some(Weekday::Thursday),
        "friday" | "fri" => Some(Weekday::Friday),
        "saturday" | "sat" => Some(Weekday::Saturday),
        _ => None,
    }
}

/// Parse the positional initial-selection arguments.  Anything malformed is
/// reported and skipped rather than aborting; returns the parsed dates,
/// whether a `START..END` pair appeared, and whether anything was skipped.
fn resolve_dates(args: &[String]) -> (Vec<Date>, bool, bool) {
    let mut dates = Vec::new();
    let mut ranged = false;
    let mut skipped = false;
    for arg in args {
        if let Some((start, end)) = arg.split_once("..") {
            match (Date::parse(start, &YMD_FMT), Date::parse(end, &YMD_FMT)) {
                (Ok(start), Ok(end)) => {
                    dates.push(start);
                    dates.push(end);
                    ranged = true;
                }
                _ => {
                    eprintln!("daypick: ignoring malformed range {arg:?}");
                    skipped = true;
                }
            }
        } else {
            match Date::parse(arg, &YMD_FMT) {
                Ok(date) => dates.push(date),
                Err(_) => {
                    eprintln!("daypick: ignoring malformed date {arg:?}");
                    skipped = true;
                }
            }
        }
    }
    (dates, ranged, skipped)
}

fn infer_mode(dates: &[Date], ranged: bool) -> SelectionMode {
    if ranged {
        SelectionMode::Range
    } else if dates.len() > 1 {
        SelectionMode::Multiple
    } else {
        SelectionMode::Single
    }
}

/// The same calendar date `delta` years away.  February 29 maps to
/// February 28 in non-leap years.
fn shift_year(date: Date, delta: i32) -> Date {
    let year = date.year() + delta;
    date.replace_year(year).unwrap_or_else(|_| {
        Date::from_calendar_date(year, Month::February, 28)
            .expect("February 28 should exist in every year")
    })
}
