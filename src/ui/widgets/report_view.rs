// src/ui/widgets/report_view.rs

use crate::app::{App, AppState, SPINNER_CHARS};
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Paragraph, Scrollbar, ScrollbarOrientation, Wrap},
};

/// Section rules and list markers get their own colors; everything else is plain.
fn style_line(line: &str) -> Line<'_> {
    let trimmed = line.trim_start();
    if trimmed.starts_with("====") {
        Line::styled(line, Style::default().fg(Color::DarkGray))
    } else if trimmed.starts_with("[+]") {
        Line::styled(line, Style::default().fg(Color::Green))
    } else if trimmed.starts_with("[-]") {
        Line::styled(line, Style::default().fg(Color::Yellow))
    } else if trimmed.starts_with("[!]") {
        Line::styled(line, Style::default().fg(Color::Red))
    } else if !line.starts_with(' ') && !line.is_empty() {
        Line::styled(line, Style::default().fg(Color::Cyan).bold())
    } else {
        Line::raw(line)
    }
}

pub fn render_report_view(frame: &mut Frame, app: &mut App, area: Rect) {
    let main_block = Block::default().borders(Borders::ALL).title("Recon Report (Navigate with ↑ ↓)");

    if let Some(error) = &app.scan_error {
        let text = Text::from(vec![
            Line::from(""),
            Line::from("SCAN ABORTED".bold().fg(Color::Red)),
            Line::from(""),
            Line::from(error.as_str()),
        ]);
        let p = Paragraph::new(text).alignment(Alignment::Center).wrap(Wrap { trim: true }).block(main_block);
        frame.render_widget(p, area);
        return;
    }

    if !matches!(app.state, AppState::Finished) {
        let content = match app.state {
            AppState::Idle => Paragraph::new("Scan results will appear here...").alignment(Alignment::Center),
            AppState::Scanning => {
                let spinner_char = SPINNER_CHARS[app.spinner_frame];
                Paragraph::new(Line::from(vec![
                    Span::styled(format!("{} ", spinner_char), Style::default().fg(Color::Cyan)),
                    Span::raw("Scanning... Please wait."),
                ]))
                .alignment(Alignment::Center)
            }
            AppState::Finished => Paragraph::new(""),
        };
        frame.render_widget(content.block(main_block), area);
        return;
    }

    let inner_area = main_block.inner(area);
    frame.render_widget(main_block, area);

    let lines: Vec<Line> = app.report_lines.iter().map(|l| style_line(l)).collect();
    let report = Paragraph::new(lines).scroll((app.scroll_offset as u16, 0));
    frame.render_widget(report, inner_area);

    let scrollbar = Scrollbar::new(ScrollbarOrientation::VerticalRight);
    frame.render_stateful_widget(scrollbar, inner_area, &mut app.report_scroll_state);
}
