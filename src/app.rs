use crate::help::Help;
use crate::jumpto::{JumpTo, JumpToInput, JumpToOutput, JumpToState};
use crate::picker::{ClickOutcome, SelectionEvent, SelectionMode};
use crate::theme::{BASE_STYLE, MODE_STYLE, STATUS_STYLE};
use crate::widget::{CalendarWidget, Viewport};
use crossterm::event::{read, Event, KeyEvent, KeyEventKind, KeyCode, KeyModifiers};
use ratatui::{
    backend::Backend,
    buffer::Buffer,
    layout::Rect,
    widgets::{StatefulWidget, Widget},
    Terminal,
};
use std::io::{self, Write};
use time::Date;

#[derive(Debug)]
pub(crate) struct App {
    view: Viewport,
    state: AppState,
    status: Option<String>,
}

impl App {
    pub(crate) fn new(view: Viewport) -> App {
        App {
            view,
            state: AppState::Calendar,
            status: None,
        }
    }

    /// Run the event loop until the user picks or quits, returning the final
    /// selection in insertion order.
    pub(crate) fn run<B: Backend>(mut self, mut terminal: Terminal<B>) -> io::Result<Vec<Date>> {
        while !self.quitting() {
            self.draw(&mut terminal)?;
            self.handle_input()?;
        }
        Ok(self.view.picker().selected_dates().to_vec())
    }

    fn draw<B: Backend>(&mut self, terminal: &mut Terminal<B>) -> io::Result<()> {
        terminal.draw(|frame| frame.render_widget(self, frame.area()))?;
        Ok(())
    }

    fn handle_input(&mut self) -> io::Result<()> {
        let normal_modifiers = KeyModifiers::NONE | KeyModifiers::SHIFT;
        if let Event::Key(KeyEvent {
            kind: KeyEventKind::Press,
            code,
            modifiers,
            ..
        }) = read()?
        {
            if modifiers == KeyModifiers::CONTROL && code == KeyCode::Char('c') {
                self.state = AppState::Quitting;
            } else if !normal_modifiers.contains(modifiers) || !self.handle_key(code) {
                self.beep()?;
            }
        }
        // else: Redraw on resize, and we might as well redraw on other stuff
        // too
        Ok(())
    }

    // Returns `false` if the user pressed an invalid key
    fn handle_key(&mut self, key: KeyCode) -> bool {
        self.status = None;
        match &mut self.state {
            AppState::Calendar => match key {
                KeyCode::Char('h') | KeyCode::Left => self.view.move_cursor(-1),
                KeyCode::Char('l') | KeyCode::Right => self.view.move_cursor(1),
                KeyCode::Char('k') | KeyCode::Up => self.view.move_cursor(-7),
                KeyCode::Char('j') | KeyCode::Down => self.view.move_cursor(7),
                KeyCode::Char('w') | KeyCode::PageUp => self.view.month_step(false),
                KeyCode::Char('z') | KeyCode::PageDown => self.view.month_step(true),
                KeyCode::Char('0') | KeyCode::Home => self.view.jump_to_today(),
                KeyCode::Enter | KeyCode::Char(' ') => self.click(),
                KeyCode::Char('g') => {
                    self.state = AppState::Jumping(JumpToState::new());
                    true
                }
                KeyCode::Char('q') | KeyCode::Esc => {
                    self.state = AppState::Quitting;
                    true
                }
                KeyCode::Char('?') => {
                    self.state = AppState::Helping;
                    true
                }
                _ => false,
            },
            AppState::Helping => {
                self.state = AppState::Calendar;
                true
            }
            AppState::Jumping(state) => {
                if matches!(key, KeyCode::Char('q' | 'g') | KeyCode::Esc) {
                    self.state = AppState::Calendar;
                    true
                } else {
                    let output = match key {
                        KeyCode::Char(c @ '0'..='9') => {
                            let digit =
                                u8::try_from(c.to_digit(10).unwrap_or_default()).unwrap_or_default();
                            state.handle_input(JumpToInput::Digit(digit))
                        }
                        KeyCode::Backspace | KeyCode::Delete => {
                            state.handle_input(JumpToInput::Backspace)
                        }
                        KeyCode::Enter => state.handle_input(JumpToInput::Enter),
                        _ => JumpToOutput::Invalid,
                    };
                    match output {
                        JumpToOutput::Ok => true,
                        JumpToOutput::Invalid => false,
                        JumpToOutput::Jump(date) => {
                            self.state = AppState::Calendar;
                            if self.view.jump_to(date) {
                                true
                            } else {
                                self.status = Some(format!(
                                    "{date} is not displayed (showing {})",
                                    self.view.picker().range(),
                                ));
                                false
                            }
                        }
                    }
                }
            }
            AppState::Quitting => false,
        }
    }

    /// Click the day under the cursor, leaving once the pick is complete.
    fn click(&mut self) -> bool {
        match self.view.click_cursor() {
            ClickOutcome::Changed(events) => {
                if self.pick_finished(&events) {
                    self.state = AppState::Quitting;
                }
                true
            }
            ClickOutcome::Invalid(date) => {
                self.status = Some(format!(
                    "{date} is not selectable (valid dates: {})",
                    self.view.picker().range(),
                ));
                false
            }
            ClickOutcome::Intercepted => true,
        }
    }

    /// Single mode finishes on any selection and range mode on a completed
    /// pair; multiple mode keeps going until the user quits.
    fn pick_finished(&self, events: &[SelectionEvent]) -> bool {
        match self.view.picker().mode() {
            SelectionMode::Single => events
                .iter()
                .any(|ev| matches!(ev, SelectionEvent::Selected(_))),
            SelectionMode::Range => events
                .iter()
                .any(|ev| matches!(ev, SelectionEvent::RangeCompleted { .. })),
            SelectionMode::Multiple => false,
        }
    }

    fn beep(&self) -> io::Result<()> {
        io::stdout().write_all(b"\x07")
    }

    fn quitting(&self) -> bool {
        self.state == AppState::Quitting
    }

    fn status_line(&self) -> (String, ratatui::style::Style) {
        if let Some(status) = &self.status {
            (status.clone(), STATUS_STYLE)
        } else {
            let picker = self.view.picker();
            let count = picker.selected_dates().len();
            (
                format!(
                    " {} mode | {count} selected | {} | ? for help",
                    picker.mode(),
                    self.view.cursor(),
                ),
                MODE_STYLE,
            )
        }
    }
}

impl Widget for &mut App {
    fn render(self, area: Rect, buf: &mut Buffer) {
        buf.set_style(area, BASE_STYLE);
        let cal_area = Rect {
            height: area.height.saturating_sub(1),
            ..area
        };
        CalendarWidget.render(cal_area, buf, &mut self.view);
        if area.height > 0 {
            let (line, style) = self.status_line();
            buf.set_string(area.x, area.bottom() - 1, line, style);
        }
        if self.state == AppState::Helping {
            Help.render(cal_area, buf);
        } else if let AppState::Jumping(ref mut state) = self.state {
            JumpTo.render(cal_area, buf, state);
        }
    }
}

#[derive(Clone, Copy, Debug, Eq, PartialEq)]
enum AppState {
    Calendar,
    Helping,
    Jumping(JumpToState),
    Quitting,
}
