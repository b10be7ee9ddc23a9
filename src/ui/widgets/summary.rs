// src/ui/widgets/summary.rs

use crate::app::{App, AppState};
use crate::core::models::Label;
use ratatui::{
    prelude::*,
    text::Line,
    widgets::{Block, Borders, Gauge, Paragraph},
};

fn label_line<'a>(name: &'a str, label: Option<&'a Label>) -> Line<'a> {
    let value = match label {
        Some(l) => Span::styled(l.name.as_str(), Style::default().fg(Color::Cyan)),
        None => Span::styled("none", Style::default().fg(Color::DarkGray)),
    };
    Line::from(vec![Span::raw(format!("{:<7}", name)), value])
}

/// Renders the summary panel: header score, infrastructure labels and technologies.
///
/// Nothing is drawn inside the border until a scan has finished.
pub fn render_summary(frame: &mut Frame, app: &App, area: Rect) {
    let summary_container = Block::default().borders(Borders::ALL).title("Summary");
    frame.render_widget(summary_container, area);

    let summary_chunks = Layout::default()
        .direction(Direction::Vertical)
        .margin(1)
        .constraints([
            Constraint::Length(2), // Header score
            Constraint::Length(1), // Gauge
            Constraint::Length(1), // Spacer
            Constraint::Length(5), // Infrastructure
            Constraint::Length(1), // Spacer
            Constraint::Min(0),    // Technologies
        ])
        .split(area);

    if !matches!(app.state, AppState::Finished) {
        return;
    }
    let Some(result) = &app.scan_result else { return };

    let rating_style = match app.summary.score {
        80..=100 => Style::default().fg(Color::Green),
        50..=79 => Style::default().fg(Color::Yellow),
        _ => Style::default().fg(Color::Red),
    };
    let score_text = Text::from(vec![
        Line::from("Security Headers".bold()),
        Line::from(format!("{}/{} present", app.summary.headers_present, app.summary.headers_total))
            .style(rating_style),
    ]);
    frame.render_widget(Paragraph::new(score_text).alignment(Alignment::Center), summary_chunks[0]);

    let score_gauge = Gauge::default()
        .percent(app.displayed_score as u16)
        .label("")
        .style(rating_style);
    frame.render_widget(score_gauge, summary_chunks[1]);

    let mut infra_lines = vec![
        label_line("CDN", result.cdn.as_ref()),
        label_line("WAF", result.waf.as_ref()),
        label_line("Cloud", result.cloud_provider.as_ref()),
    ];
    if app.summary.failed_phases > 0 {
        infra_lines.push(Line::from(Span::styled(
            format!("{} phase(s) failed", app.summary.failed_phases),
            Style::default().fg(Color::Red),
        )));
    }
    let infra_block = Block::default().title("INFRASTRUCTURE".bold());
    frame.render_widget(Paragraph::new(infra_lines).block(infra_block), summary_chunks[3]);

    let mut tech_lines = Vec::new();
    if result.technologies.is_empty() {
        tech_lines.push(Line::from("Not identified."));
    }
    for tech in &result.technologies {
        let mut spans = vec![Span::raw("- "), Span::styled(tech.name.as_str(), Style::default().fg(Color::Cyan))];
        if let Some(version) = &tech.version {
            spans.push(Span::styled(format!(" {}", version), Style::default().fg(Color::DarkGray)));
        }
        tech_lines.push(Line::from(spans));
    }
    let tech_block = Block::default().title("TECHNOLOGIES".bold());
    frame.render_widget(Paragraph::new(tech_lines).block(tech_block), summary_chunks[5]);
}
