// src/core/observer.rs

use tokio::sync::mpsc::UnboundedSender;

use crate::core::models::{Phase, PhaseWarning};

/// Receives progress notifications while a scan runs.
///
/// Calls arrive in phase order from the task running the scan, so
/// implementations must be cheap and must not block.
pub trait ScanObserver: Send + Sync {
    fn phase_started(&self, phase: Phase);

    fn phase_completed(&self, _phase: Phase, _summary: &str) {}

    fn phase_skipped(&self, _phase: Phase, _reason: &str) {}

    fn phase_warning(&self, warning: &PhaseWarning);
}

/// Discards every notification.
#[derive(Debug, Default, Clone, Copy)]
pub struct NullObserver;

impl ScanObserver for NullObserver {
    fn phase_started(&self, _phase: Phase) {}
    fn phase_warning(&self, _warning: &PhaseWarning) {}
}

/// Prints progress lines to stdout for headless runs.
#[derive(Debug, Default, Clone, Copy)]
pub struct ConsoleObserver;

impl ScanObserver for ConsoleObserver {
    fn phase_started(&self, phase: Phase) {
        println!("[*] {}", phase.progress_label());
    }

    fn phase_skipped(&self, phase: Phase, reason: &str) {
        println!("[-] {} skipped: {}", phase, reason);
    }

    fn phase_warning(&self, warning: &PhaseWarning) {
        println!("[!] {} failed: {}", warning.phase, warning.message);
    }
}

/// A progress notification forwarded to the UI thread.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ScanEvent {
    Started(Phase),
    Completed { phase: Phase, summary: String },
    Skipped { phase: Phase, reason: String },
    Warning(PhaseWarning),
}

/// Forwards notifications over an unbounded channel. A closed receiver is ignored.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    tx: UnboundedSender<ScanEvent>,
}

impl ChannelObserver {
    pub fn new(tx: UnboundedSender<ScanEvent>) -> Self {
        Self { tx }
    }
}

impl ScanObserver for ChannelObserver {
    fn phase_started(&self, phase: Phase) {
        let _ = self.tx.send(ScanEvent::Started(phase));
    }

    fn phase_completed(&self, phase: Phase, summary: &str) {
        let _ = self.tx.send(ScanEvent::Completed { phase, summary: summary.to_string() });
    }

    fn phase_skipped(&self, phase: Phase, reason: &str) {
        let _ = self.tx.send(ScanEvent::Skipped { phase, reason: reason.to_string() });
    }

    fn phase_warning(&self, warning: &PhaseWarning) {
        let _ = self.tx.send(ScanEvent::Warning(warning.clone()));
    }
}
