use api_types::month::MonthView;
use engine::{ChartData, ChartRenderer, MoneyCents, MonthPeriod, MonthRecord};
use ratatui::{
    Frame,
    layout::Rect,
    style::{Modifier, Style},
    text::Line,
    widgets::{Bar, BarChart, BarGroup, Paragraph},
};

use crate::ui::{components::card::Card, theme::Theme};

/// Bar chart of a closed month, `None` when the server sent a period it
/// cannot be read back as.
pub fn chart_data(view: &MonthView, owner: &str) -> Option<ChartData> {
    let month = match view.month.parse::<MonthPeriod>() {
        Ok(month) => month,
        Err(err) => {
            tracing::warn!("skipping chart for month {}: {err}", view.id);
            return None;
        }
    };
    Some(ChartData::from_record(&MonthRecord {
        id: view.id,
        user_id: owner.to_string(),
        month,
        received: MoneyCents::new(view.received_minor),
        discounts: MoneyCents::new(view.discounts_minor),
        remainder: MoneyCents::new(view.remainder_minor),
        closed_at: view.closed_at,
    }))
}

/// Keeps the dataset the next frame draws.
///
/// Ratatui redraws from scratch every frame, so a chart "instance" is just the
/// dataset held here; disposing it removes the chart from the screen.
#[derive(Debug, Default)]
pub struct TerminalChart {
    next_handle: u64,
    live: Option<(u64, ChartData)>,
}

impl TerminalChart {
    pub fn current(&self) -> Option<&ChartData> {
        self.live.as_ref().map(|(_, data)| data)
    }
}

impl ChartRenderer for TerminalChart {
    type Handle = u64;

    fn create(&mut self, data: &ChartData) -> u64 {
        self.next_handle += 1;
        self.live = Some((self.next_handle, data.clone()));
        self.next_handle
    }

    fn dispose(&mut self, handle: u64) {
        if matches!(self.live, Some((live, _)) if live == handle) {
            self.live = None;
        }
    }
}

/// Renders the live chart, or a placeholder when there is none.
pub fn render_chart(frame: &mut Frame<'_>, area: Rect, chart: &TerminalChart, theme: &Theme) {
    let Some(data) = chart.current() else {
        Card::new("Last closed month", theme).render_with(
            frame,
            area,
            Paragraph::new(Line::styled(
                "No month closed yet",
                Style::default().fg(theme.dim),
            )),
        );
        return;
    };

    let bars: Vec<Bar<'_>> = data
        .bars()
        .map(|(label, cents)| {
            let color = if cents < 0 { theme.error } else { theme.accent };
            Bar::default()
                .label(Line::from(label))
                .value(cents.max(0).unsigned_abs())
                .text_value(MoneyCents::new(cents).to_string())
                .style(Style::default().fg(color))
        })
        .collect();

    let inner_width = area.width.saturating_sub(2);
    let bar_width = (inner_width / 3).saturating_sub(2).clamp(3, 24);
    let chart = BarChart::default()
        .data(BarGroup::default().bars(&bars))
        .bar_width(bar_width)
        .bar_gap(2)
        .value_style(Style::default().fg(theme.text).add_modifier(Modifier::BOLD))
        .label_style(Style::default().fg(theme.dim));

    Card::new(&data.title, theme).render_with(frame, area, chart);
}
