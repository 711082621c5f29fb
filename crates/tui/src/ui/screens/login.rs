use ratatui::{
    Frame,
    layout::{Alignment, Constraint, Direction, Flex, Layout, Rect},
    style::Style,
    text::{Line, Span},
    widgets::{Block, BorderType, Borders, Clear, Paragraph},
};

use crate::{
    app::{AppState, LoginField},
    ui::theme::Theme,
};

pub(crate) fn centered_box(width: u16, height: u16, area: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Length(height)])
        .flex(Flex::Center)
        .areas(area);
    let [cell] = Layout::horizontal([Constraint::Length(width)])
        .flex(Flex::Center)
        .areas(row);
    cell
}

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let card_area = centered_box(40, 8, area);
    frame.render_widget(Clear, card_area);

    let block = Block::default()
        .title(" sobra · sign in ")
        .borders(Borders::ALL)
        .border_type(BorderType::Rounded)
        .border_style(Style::default().fg(theme.border_focused))
        .style(Style::default().bg(theme.surface));

    let inner = block.inner(card_area);
    frame.render_widget(block, card_area);

    let [username_row, password_row] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([Constraint::Length(2), Constraint::Length(2)])
        .margin(1)
        .areas(inner);

    let login = &state.login;
    render_input(
        frame,
        username_row,
        "username",
        &login.username,
        login.focus == LoginField::Username,
        theme,
    );
    render_input(
        frame,
        password_row,
        "password",
        &mask_password(&login.password),
        login.focus == LoginField::Password,
        theme,
    );

    if let Some(message) = &login.message {
        let error_area = Rect {
            x: card_area.x,
            y: card_area.y + card_area.height + 1,
            width: card_area.width,
            height: 1,
        };
        frame.render_widget(
            Paragraph::new(Span::styled(message.as_str(), Style::default().fg(theme.error)))
                .alignment(Alignment::Center),
            error_area,
        );
    }
}

fn render_input(
    frame: &mut Frame<'_>,
    area: Rect,
    label: &str,
    value: &str,
    focused: bool,
    theme: &Theme,
) {
    let cursor = if focused { "│" } else { "" };
    let style = if focused {
        Style::default().fg(theme.accent)
    } else {
        Style::default().fg(theme.text)
    };

    let lines = vec![
        Line::styled(label.to_string(), Style::default().fg(theme.dim)),
        Line::styled(format!("{value}{cursor}"), style),
    ];
    frame.render_widget(Paragraph::new(lines), area);
}

/// One bullet per character, never the password itself.
fn mask_password(password: &str) -> String {
    "•".repeat(password.chars().count())
}
