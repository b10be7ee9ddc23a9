// src/ui/layout.rs

use ratatui::layout::{Constraint, Layout, Rect};

/// Screen areas for one frame.
pub struct AppLayout {
    pub input: Rect,
    pub report: Rect,
    pub summary: Rect,
    /// Only present once the current scan has logged a phase event.
    pub log_panel: Option<Rect>,
    pub footer: Rect,
}

/// Splits the frame into input box, content row and footer.
///
/// The content row holds the report and the summary side by side. When
/// `show_logs` is set, a third column is carved out for the phase log.
pub fn create_layout(area: Rect, show_logs: bool) -> AppLayout {
    let [input, content, footer] =
        Layout::vertical([Constraint::Length(3), Constraint::Min(0), Constraint::Length(1)]).areas(area);

    if show_logs {
        let [report, summary, log_panel] = Layout::horizontal([
            Constraint::Percentage(45),
            Constraint::Percentage(22),
            Constraint::Percentage(33),
        ])
        .areas(content);
        AppLayout { input, report, summary, log_panel: Some(log_panel), footer }
    } else {
        let [report, summary] =
            Layout::horizontal([Constraint::Percentage(70), Constraint::Percentage(30)]).areas(content);
        AppLayout { input, report, summary, log_panel: None, footer }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_column_appears_only_when_requested() {
        let area = Rect::new(0, 0, 100, 30);

        let plain = create_layout(area, false);
        assert!(plain.log_panel.is_none());
        assert_eq!(plain.input.height, 3);
        assert_eq!(plain.footer.height, 1);
        assert_eq!(plain.report.width + plain.summary.width, 100);

        let with_logs = create_layout(area, true);
        let log_panel = with_logs.log_panel.unwrap();
        assert_eq!(with_logs.report.width + with_logs.summary.width + log_panel.width, 100);
        assert!(with_logs.report.width < plain.report.width);
    }
}
