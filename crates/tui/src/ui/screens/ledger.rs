use engine::EntryField;
use ratatui::{
    Frame,
    layout::{Constraint, Direction, Layout, Rect},
    style::{Modifier, Style},
    text::{Line, Span},
    widgets::{Cell, Paragraph, Row, Table, TableState},
};

use crate::{
    app::{AppState, EditTarget},
    ui::{
        components::{
            card::{Card, StatCard},
            charts,
        },
        theme::Theme,
    },
};

pub fn render(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let [header, totals, body, editor] = Layout::default()
        .direction(Direction::Vertical)
        .constraints([
            Constraint::Length(1),
            Constraint::Length(3),
            Constraint::Min(6),
            Constraint::Length(1),
        ])
        .areas(area);

    render_header(frame, header, state, theme);
    render_totals(frame, totals, state, theme);

    let [table, chart] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([Constraint::Percentage(60), Constraint::Percentage(40)])
        .areas(body);
    render_entries(frame, table, state, theme);
    charts::render_chart(frame, chart, state.chart.renderer(), theme);

    render_editor(frame, editor, state, theme);
}

fn render_header(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let user = state
        .session
        .as_ref()
        .map(|session| session.username.as_str())
        .unwrap_or("-");
    let line = Line::from(vec![
        Span::styled(
            "Sobra",
            Style::default()
                .fg(theme.accent)
                .add_modifier(Modifier::BOLD),
        ),
        Span::styled("  Month", Style::default().fg(theme.dim)),
        Span::styled(format!(": {}", state.month.label_pt_br()), Style::default().fg(theme.text)),
        Span::styled("  User", Style::default().fg(theme.dim)),
        Span::styled(format!(": {user}"), Style::default().fg(theme.text)),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}

fn render_totals(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let [received, paid, remainder] = Layout::default()
        .direction(Direction::Horizontal)
        .constraints([
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
            Constraint::Ratio(1, 3),
        ])
        .areas(area);

    let totals = state.ledger.totals();
    let editing_received = matches!(
        state.editor.as_ref().map(|editor| editor.target),
        Some(EditTarget::Received)
    );

    StatCard::new("Received", state.ledger.received().to_string(), theme)
        .focused(editing_received)
        .render(frame, received);
    StatCard::new("Paid Discounts", totals.paid_total.to_string(), theme).render(frame, paid);
    StatCard::new("Remainder", totals.remainder.to_string(), theme)
        .negative(totals.remainder.is_negative())
        .render(frame, remainder);
}

fn render_entries(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let card = Card::new("Discounts", theme).focused(state.editor.is_none());
    let entries = state.ledger.entries();
    if entries.is_empty() {
        card.render_with(
            frame,
            area,
            Paragraph::new(Line::styled(
                "No discounts yet, press a to add one",
                Style::default().fg(theme.dim),
            )),
        );
        return;
    }

    let header = Row::new(["Description", "Amount", "Paid"])
        .style(Style::default().fg(theme.dim).add_modifier(Modifier::BOLD));

    let rows = entries.iter().enumerate().map(|(idx, entry)| {
        let cell_style = |field: EntryField| {
            if idx == state.selected && field == state.column {
                Style::default()
                    .fg(theme.accent)
                    .add_modifier(Modifier::REVERSED)
            } else {
                Style::default().fg(theme.text)
            }
        };
        let description = if entry.description.is_empty() {
            Span::styled("(no description)", Style::default().fg(theme.dim))
        } else {
            Span::raw(entry.description.as_str())
        };
        let paid = if entry.paid { "[x]" } else { "[ ]" };
        Row::new([
            Cell::from(description).style(cell_style(EntryField::Description)),
            Cell::from(entry.amount.to_string()).style(cell_style(EntryField::Amount)),
            Cell::from(paid).style(cell_style(EntryField::Paid)),
        ])
    });

    let table = Table::new(
        rows,
        [
            Constraint::Min(12),
            Constraint::Length(16),
            Constraint::Length(6),
        ],
    )
    .header(header)
    .row_highlight_style(Style::default().add_modifier(Modifier::BOLD));

    let inner = card.inner(area);
    frame.render_widget(card.block(), area);
    let mut table_state = TableState::default().with_selected(Some(state.selected));
    frame.render_stateful_widget(table, inner, &mut table_state);
}

fn render_editor(frame: &mut Frame<'_>, area: Rect, state: &AppState, theme: &Theme) {
    let Some(editor) = &state.editor else {
        return;
    };
    let label = match editor.target {
        EditTarget::Month => "Month (YYYY-MM)".to_string(),
        EditTarget::Received => "Received".to_string(),
        EditTarget::Entry(idx, field) => format!("Row {} {}", idx + 1, field.as_str()),
    };
    let line = Line::from(vec![
        Span::styled(format!("{label}: "), Style::default().fg(theme.dim)),
        Span::styled(
            format!("{}│", editor.buffer),
            Style::default().fg(theme.accent),
        ),
    ]);
    frame.render_widget(Paragraph::new(line), area);
}
