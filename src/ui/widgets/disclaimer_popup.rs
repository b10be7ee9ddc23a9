// src/ui/widgets/disclaimer_popup.rs

use ratatui::{
    layout::Flex,
    prelude::*,
    widgets::{Block, Borders, Clear, Paragraph, Wrap},
};

const TERMS: [&str; 3] = [
    "1. Only scan domains you own or are authorized in writing to assess.",
    "2. Comply with the laws and regulations of your jurisdiction.",
    "3. The authors accept no liability for misuse or for any damage caused.",
];

/// Renders the usage disclaimer as a centered modal over the rest of the UI.
pub fn render_disclaimer_popup(frame: &mut Frame, area: Rect) {
    let mut lines = vec![
        Line::from("AUTHORIZED USE ONLY".bold().yellow()),
        Line::from(""),
        Line::from(
            "Vanguard Recon is passive: it reads public DNS and certificate transparency logs, \
             sends one HTTP request and completes one TLS handshake per target.",
        ),
        Line::from(""),
        Line::from("Fingerprinting infrastructure without permission may still be unlawful where you are."),
        Line::from(""),
        Line::from("By continuing you agree that:"),
    ];
    lines.extend(TERMS.iter().map(|term| Line::from(*term)));
    lines.push(Line::from(""));
    lines.push(Line::from("Press ".bold() + "Enter".bold().yellow() + " to accept, ".bold() + "Q".bold().yellow() + " to leave.".bold()));

    let popup = Paragraph::new(Text::from(lines))
        .block(
            Block::default()
                .title(" Before you scan ")
                .borders(Borders::ALL)
                .border_style(Style::default().fg(Color::Red)),
        )
        .wrap(Wrap { trim: true })
        .alignment(Alignment::Center);

    let popup_area = centered_rect(70, 80, area);
    frame.render_widget(Clear, popup_area);
    frame.render_widget(popup, popup_area);
}

/// A rectangle of the given percentages, centered within `r`.
fn centered_rect(percent_x: u16, percent_y: u16, r: Rect) -> Rect {
    let [row] = Layout::vertical([Constraint::Percentage(percent_y)]).flex(Flex::Center).areas(r);
    let [cell] = Layout::horizontal([Constraint::Percentage(percent_x)]).flex(Flex::Center).areas(row);
    cell
}
