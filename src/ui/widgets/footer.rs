// src/ui/widgets/footer.rs

use crate::app::{App, AppState, ExportStatus};
use ratatui::{
    prelude::*,
    style::{Color, Style, Stylize},
    text::{Line, Span},
    widgets::Paragraph,
};

fn key(label: &str) -> Span<'_> {
    Span::styled(label, Style::new().bold().fg(Color::Yellow))
}

/// Renders the footer: available keys, or the result of the last export.
pub fn render_footer(frame: &mut Frame, app: &App, area: Rect) {
    let line = if app.show_disclaimer {
        Line::from(vec![key("Enter"), Span::raw(" to acknowledge, "), key("Q"), Span::raw(" to quit.")])
    } else {
        match (&app.state, &app.export_status) {
            (AppState::Finished, ExportStatus::Success(paths)) => {
                Line::from(Span::styled(format!("Saved: {}", paths), Style::new().fg(Color::Green)))
            }
            (AppState::Finished, ExportStatus::Error(e)) => {
                Line::from(Span::styled(format!("Export failed: {}", e), Style::new().fg(Color::Red)))
            }
            (AppState::Idle, _) => Line::from(vec![
                Span::raw("Press "),
                key("Enter"),
                Span::raw(" to scan, "),
                key("Esc"),
                Span::raw(" to quit."),
            ]),
            (AppState::Finished, ExportStatus::Idle) => Line::from(vec![
                key("[N]"),
                Span::raw("ew Scan, "),
                key("[E]"),
                Span::raw("xport, "),
                key("[Q]"),
                Span::raw("uit"),
            ]),
            (AppState::Scanning, _) => Line::from("Scanning... Press Q to quit."),
        }
    };

    frame.render_widget(Paragraph::new(line).alignment(Alignment::Center), area);
}
