// src/ui/mod.rs

use crate::app::App;
use ratatui::prelude::*;

mod layout;
mod widgets;

/// Draws one frame of the interface.
pub fn render(app: &mut App, frame: &mut Frame) {
    let area = frame.area();
    let layout = layout::create_layout(area, !app.phase_log.is_empty());

    widgets::input::render_input(frame, app, layout.input);
    widgets::report_view::render_report_view(frame, app, layout.report);
    widgets::summary::render_summary(frame, app, layout.summary);
    if let Some(log_area) = layout.log_panel {
        widgets::log_view::render_log_view(frame, app, log_area);
    }
    widgets::footer::render_footer(frame, app, layout.footer);

    if app.show_disclaimer {
        widgets::disclaimer_popup::render_disclaimer_popup(frame, area);
    }
}
