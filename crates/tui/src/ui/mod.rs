pub mod components;
pub mod keymap;
pub mod screens;

mod theme;

use std::io::{Stdout, stdout};

use crossterm::terminal::{
    EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode,
};
use ratatui::{
    Frame,
    backend::CrosstermBackend,
    layout::{Constraint, Direction, Layout},
    style::Style,
    text::Line,
    widgets::{Block, Paragraph},
};

use crate::{
    app::{AppState, Screen},
    error::Result,
};

pub use theme::Theme;

pub type Terminal = ratatui::Terminal<CrosstermBackend<Stdout>>;

/// Raw mode plus alternate screen, undone on drop even when the event loop
/// bails out with an error.
pub struct TerminalSession {
    terminal: Terminal,
}

impl TerminalSession {
    pub fn enter() -> Result<Self> {
        enable_raw_mode()?;
        let mut stdout = stdout();
        crossterm::execute!(stdout, EnterAlternateScreen)?;
        let terminal = Terminal::new(CrosstermBackend::new(stdout))?;
        Ok(Self { terminal })
    }

    pub fn terminal(&mut self) -> &mut Terminal {
        &mut self.terminal
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = crossterm::execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

pub fn render(frame: &mut Frame<'_>, state: &AppState) {
    let theme = Theme::for_mode(state.dark);
    let area = frame.area();
    frame.render_widget(
        Block::default().style(Style::default().bg(theme.background).fg(theme.text)),
        area,
    );

    let [content, bottom] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Min(0), Constraint::Length(1)])
        .areas(area);

    let hints = match state.screen() {
        Screen::Login => {
            screens::login::render(frame, content, state, &theme);
            components::hints::LOGIN
        }
        Screen::Ledger => {
            screens::ledger::render(frame, content, state, &theme);
            if state.editor.is_some() {
                components::hints::EDITING
            } else {
                components::hints::LEDGER
            }
        }
    };

    frame.render_widget(
        Paragraph::new(Line::from(components::hints::hints_to_spans(hints, &theme))),
        bottom,
    );
    components::toast::render(frame, area, state.toast.as_ref(), &theme);
}

#[cfg(test)]
mod tests {
    use engine::MonthPeriod;
    use ratatui::backend::TestBackend;

    use super::*;
    use crate::client::Credentials;

    fn draw(state: &AppState) -> String {
        let mut terminal = ratatui::Terminal::new(TestBackend::new(100, 30)).unwrap();
        terminal.draw(|frame| render(frame, state)).unwrap();
        terminal
            .backend()
            .buffer()
            .content
            .iter()
            .map(|cell| cell.symbol())
            .collect()
    }

    #[test]
    fn login_screen_without_session() {
        let state = AppState::new("alice".into(), MonthPeriod::new(2025, 10).unwrap(), false);
        let screen = draw(&state);
        assert!(screen.contains("sign in"));
        assert!(!screen.contains("Discounts"));
    }

    #[test]
    fn ledger_screen_with_session() {
        let mut state = AppState::new("alice".into(), MonthPeriod::new(2025, 10).unwrap(), true);
        state.signed_in(Credentials {
            username: "alice".into(),
            password: "password".into(),
        });
        state.ledger.set_received("2000");
        let screen = draw(&state);
        assert!(screen.contains("Discounts"));
        assert!(screen.contains("outubro de 2025"));
        assert!(screen.contains("R$ 2000.00"));
        assert!(screen.contains("No month closed yet"));
    }
}
