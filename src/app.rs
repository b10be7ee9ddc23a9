// src/app.rs

use std::path::PathBuf;

use chrono::Local;
use ratatui::widgets::ScrollbarState;

use crate::core::knowledge_base::header_score;
use crate::core::models::ScanResult;
use crate::core::observer::ScanEvent;
use crate::output::{self, ReportFormats};

pub const SPINNER_CHARS: [char; 10] = ['⠋', '⠙', '⠹', '⠸', '⠼', '⠴', '⠦', '⠧', '⠇', '⠏'];

pub enum ExportStatus {
    Idle,
    Success(String),
    Error(String),
}

pub enum AppState {
    Idle,
    Scanning,
    Finished,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Info,
    Skip,
    Warn,
}

/// One line of the live phase log.
#[derive(Debug, Clone)]
pub struct LogEntry {
    pub time: String,
    pub level: LogLevel,
    pub message: String,
}

#[derive(Debug, Default)]
pub struct ScanSummary {
    /// Share of audited security headers present, 0-100.
    pub score: u8,
    pub headers_present: usize,
    pub headers_total: usize,
    pub failed_phases: usize,
}

pub struct App {
    pub should_quit: bool,
    pub show_disclaimer: bool,
    pub state: AppState,
    pub input: String,
    pub scan_result: Option<ScanResult>,
    pub scan_error: Option<String>,
    pub report_lines: Vec<String>,
    pub summary: ScanSummary,
    pub displayed_score: u8,
    pub scroll_offset: usize,
    pub report_scroll_state: ScrollbarState,
    pub phase_log: Vec<LogEntry>,
    pub log_horizontal_scroll: usize,
    pub log_horizontal_scroll_state: ScrollbarState,
    pub export_status: ExportStatus,
    pub spinner_frame: usize,
    pub output_dir: PathBuf,
}

impl App {
    pub fn new(output_dir: PathBuf) -> Self {
        Self {
            should_quit: false,
            show_disclaimer: true,
            state: AppState::Idle,
            input: String::new(),
            scan_result: None,
            scan_error: None,
            report_lines: Vec::new(),
            summary: ScanSummary::default(),
            displayed_score: 0,
            scroll_offset: 0,
            report_scroll_state: ScrollbarState::default(),
            phase_log: Vec::new(),
            log_horizontal_scroll: 0,
            log_horizontal_scroll_state: ScrollbarState::default(),
            export_status: ExportStatus::Idle,
            spinner_frame: 0,
            output_dir,
        }
    }

    pub fn start_scan(&mut self) {
        let output_dir = std::mem::take(&mut self.output_dir);
        *self = Self { show_disclaimer: false, input: std::mem::take(&mut self.input), ..Self::new(output_dir) };
        self.state = AppState::Scanning;
    }

    pub fn on_scan_event(&mut self, event: ScanEvent) {
        let (level, message) = match event {
            ScanEvent::Started(phase) => (LogLevel::Info, phase.progress_label().to_string()),
            ScanEvent::Completed { phase, summary } => (LogLevel::Info, format!("{}: {}", phase, summary)),
            ScanEvent::Skipped { phase, reason } => (LogLevel::Skip, format!("{} skipped: {}", phase, reason)),
            ScanEvent::Warning(w) => (LogLevel::Warn, format!("{} failed: {}", w.phase, w.message)),
        };
        self.push_log(level, message);
    }

    fn push_log(&mut self, level: LogLevel, message: String) {
        let time = Local::now().format("%H:%M:%S").to_string();
        self.phase_log.push(LogEntry { time, level, message });
    }

    pub fn on_scan_finished(&mut self, outcome: Result<ScanResult, String>) {
        match outcome {
            Ok(result) => {
                self.report_lines = output::render(&result).lines().map(str::to_string).collect();
                self.report_scroll_state = ScrollbarState::new(self.report_lines.len());
                self.scan_result = Some(result);
                self.update_summary();
            }
            Err(e) => {
                self.push_log(LogLevel::Warn, format!("Scan aborted: {}", e));
                self.scan_error = Some(e);
            }
        }
        self.state = AppState::Finished;
    }

    pub fn update_summary(&mut self) {
        if let Some(result) = &self.scan_result {
            let (present, total) = header_score(&result.security_headers);
            let score = if total == 0 { 0 } else { present * 100 / total };
            self.summary = ScanSummary {
                score: score.min(100) as u8,
                headers_present: present,
                headers_total: total,
                failed_phases: result.warnings.len(),
            };
        }
    }

    pub fn export(&mut self) {
        let Some(result) = &self.scan_result else { return };
        self.export_status = match output::save_reports(result, &self.output_dir, ReportFormats::BOTH) {
            Ok(paths) => ExportStatus::Success(
                paths.iter().map(|p| p.display().to_string()).collect::<Vec<_>>().join(", "),
            ),
            Err(e) => ExportStatus::Error(format!("{:#}", e)),
        };
    }

    pub fn scroll_up(&mut self) {
        self.scroll_offset = self.scroll_offset.saturating_sub(1);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn scroll_down(&mut self) {
        let max = self.report_lines.len().saturating_sub(1);
        self.scroll_offset = self.scroll_offset.saturating_add(1).min(max);
        self.report_scroll_state = self.report_scroll_state.position(self.scroll_offset);
    }

    pub fn scroll_log_left(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_sub(4);
        self.log_horizontal_scroll_state = self.log_horizontal_scroll_state.position(self.log_horizontal_scroll);
    }

    pub fn scroll_log_right(&mut self) {
        self.log_horizontal_scroll = self.log_horizontal_scroll.saturating_add(4);
        self.log_horizontal_scroll_state = self.log_horizontal_scroll_state.position(self.log_horizontal_scroll);
    }

    pub fn on_tick(&mut self) {
        if matches!(self.state, AppState::Scanning) {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER_CHARS.len();
        }
        if self.displayed_score < self.summary.score {
            self.displayed_score = (self.displayed_score + 2).min(self.summary.score);
        }
    }

    pub fn quit(&mut self) {
        self.should_quit = true;
    }

    pub fn reset(&mut self) {
        let output_dir = std::mem::take(&mut self.output_dir);
        *self = Self { show_disclaimer: false, ..Self::new(output_dir) };
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::models::{Phase, PhaseWarning};

    #[test]
    fn scan_events_become_log_lines() {
        let mut app = App::new(PathBuf::from("reports"));
        app.start_scan();
        app.on_scan_event(ScanEvent::Started(Phase::Dns));
        app.on_scan_event(ScanEvent::Warning(PhaseWarning { phase: Phase::Dns, message: "timeout".into() }));

        assert_eq!(app.phase_log.len(), 2);
        assert_eq!(app.phase_log[1].level, LogLevel::Warn);
        assert_eq!(app.phase_log[1].message, "dns failed: timeout");
    }

    #[test]
    fn finished_scan_fills_report_and_summary() {
        let mut app = App::new(PathBuf::from("reports"));
        app.input = "example.com".into();
        app.start_scan();
        assert_eq!(app.input, "example.com");

        let mut result = ScanResult::new("example.com");
        result.security_headers.insert("x-frame-options".into(), "DENY".into());
        app.on_scan_finished(Ok(result));

        assert!(matches!(app.state, AppState::Finished));
        assert!(!app.report_lines.is_empty());
        assert_eq!(app.summary.headers_present, 1);
        assert_eq!(app.summary.score, 14);
    }

    #[test]
    fn reset_keeps_disclaimer_dismissed() {
        let mut app = App::new(PathBuf::from("reports"));
        app.show_disclaimer = false;
        app.on_scan_finished(Err("bad target".into()));
        app.reset();

        assert!(!app.show_disclaimer);
        assert!(app.scan_error.is_none());
        assert!(matches!(app.state, AppState::Idle));
    }
}
