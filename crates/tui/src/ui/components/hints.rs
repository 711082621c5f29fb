use ratatui::{style::Style, text::Span};

use crate::ui::theme::Theme;

/// A keyboard hint consisting of a key and its action.
#[derive(Debug, Clone)]
pub struct KeyHint {
    pub key: &'static str,
    pub action: &'static str,
}

impl KeyHint {
    pub const fn new(key: &'static str, action: &'static str) -> Self {
        Self { key, action }
    }
}

pub fn hints_to_spans(hints: &[KeyHint], theme: &Theme) -> Vec<Span<'static>> {
    let mut spans = Vec::new();

    for (i, hint) in hints.iter().enumerate() {
        if i > 0 {
            spans.push(Span::raw("  "));
        }
        spans.push(Span::styled(hint.key, Style::default().fg(theme.accent)));
        spans.push(Span::styled(
            format!(" {}", hint.action),
            Style::default().fg(theme.dim),
        ));
    }

    spans
}

pub const LEDGER: &[KeyHint] = &[
    KeyHint::new("↑↓←→", "move"),
    KeyHint::new("Enter", "edit"),
    KeyHint::new("a", "add"),
    KeyHint::new("d", "delete"),
    KeyHint::new("Space", "paid"),
    KeyHint::new("r", "received"),
    KeyHint::new("g", "month"),
    KeyHint::new("c", "close month"),
    KeyHint::new("l", "latest"),
    KeyHint::new("x/p", "csv/pdf"),
    KeyHint::new("m", "theme"),
    KeyHint::new("o", "sign out"),
    KeyHint::new("q", "quit"),
];

pub const EDITING: &[KeyHint] = &[
    KeyHint::new("Enter", "done"),
    KeyHint::new("Esc", "undo"),
];

pub const LOGIN: &[KeyHint] = &[
    KeyHint::new("Tab", "switch field"),
    KeyHint::new("Enter", "sign in"),
    KeyHint::new("Ctrl+C", "quit"),
];
