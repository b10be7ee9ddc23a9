// src/ui/widgets/log_view.rs

use crate::app::{App, LogLevel};
use ratatui::{
    prelude::*,
    text::{Line, Span},
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation},
};

/// Renders the live phase log with a horizontal scrollbar for long lines.
///
/// Only the newest lines that fit are shown.
pub fn render_log_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let block = Block::default().title("Phases (scroll with ← →)").borders(Borders::ALL);
    let inner_area = block.inner(area);
    frame.render_widget(block, area);

    let max_width = app
        .phase_log
        .iter()
        .map(|entry| entry.time.len() + 1 + entry.message.chars().count())
        .max()
        .unwrap_or(0);
    app.log_horizontal_scroll_state = app.log_horizontal_scroll_state.content_length(max_width);

    // Last row belongs to the scrollbar.
    let visible = inner_area.height.saturating_sub(1) as usize;
    let skip = app.phase_log.len().saturating_sub(visible);

    let log_lines: Vec<Line> = app
        .phase_log
        .iter()
        .skip(skip)
        .map(|entry| {
            let message_style = match entry.level {
                LogLevel::Info => Style::default(),
                LogLevel::Skip => Style::default().fg(Color::DarkGray),
                LogLevel::Warn => Style::default().fg(Color::Yellow),
            };
            Line::from(vec![
                Span::styled(entry.time.as_str(), Style::default().fg(Color::DarkGray)),
                Span::styled(format!(" {}", entry.message), message_style),
            ])
        })
        .collect();

    let log_paragraph = Paragraph::new(log_lines).scroll((0, app.log_horizontal_scroll as u16));
    frame.render_widget(log_paragraph, inner_area);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::HorizontalBottom).thumb_symbol("■");
    let scrollbar_area = Rect {
        x: inner_area.x,
        y: inner_area.y + inner_area.height.saturating_sub(1),
        width: inner_area.width,
        height: 1,
    };
    frame.render_stateful_widget(scrollbar, scrollbar_area, &mut app.log_horizontal_scroll_state);
}
