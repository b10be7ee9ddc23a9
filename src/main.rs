// src/main.rs

use clap::Parser;
use color_eyre::eyre::{Result, WrapErr, eyre};
use crossterm::{
    ExecutableCommand,
    event::{self, DisableMouseCapture, EnableMouseCapture, Event, KeyCode, KeyEventKind},
    terminal::{EnterAlternateScreen, LeaveAlternateScreen, disable_raw_mode, enable_raw_mode},
};
use ratatui::prelude::*;
use std::io::stdout;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::mpsc;
use tracing::{error, info};

mod app;
mod cli;
mod config;
mod core;
mod logging;
mod output;
mod ui;

use crate::app::{App, AppState};
use crate::cli::Cli;
use crate::config::Config;
use crate::core::models::ScanResult;
use crate::core::observer::{ChannelObserver, ConsoleObserver, ScanEvent};
use crate::core::orchestrator::Orchestrator;
use crate::core::scanner::Collaborators;

type ScanOutcome = std::result::Result<ScanResult, String>;

fn main() -> Result<()> {
    color_eyre::install()?;
    let cli = Cli::parse();
    // Logging reads the local UTC offset, so it must run before the runtime starts threads.
    let log_path = logging::initialize_logging()?;
    info!(log = %log_path.display(), version = env!("CARGO_PKG_VERSION"), "Starting.");

    let config = cli.to_config();
    let runtime = tokio::runtime::Runtime::new().wrap_err("Failed to start the async runtime")?;

    if cli.domains.is_empty() {
        runtime.block_on(run_tui(config))
    } else {
        runtime.block_on(run_headless(&cli, &config))
    }
}

/// Scans every domain on the command line in turn, printing and saving each report.
async fn run_headless(cli: &Cli, config: &Config) -> Result<()> {
    let collaborators = Collaborators::live(&config.scanner).wrap_err("Failed to initialize network clients")?;
    let orchestrator = Orchestrator::new(collaborators, config.scanner.clone(), Arc::new(ConsoleObserver));
    let formats = cli.report_formats();
    let mut failures = 0;

    for domain in &cli.domains {
        println!("\n[*] Scanning {}", domain);
        match orchestrator.run_scan(domain).await {
            Ok(result) => {
                output::print_summary(&result);
                if formats.any() {
                    for path in output::save_reports(&result, &config.output.directory, formats)? {
                        println!("[+] Report saved: {}", path.display());
                    }
                }
            }
            Err(e) => {
                error!(domain, error = %e, "Scan aborted.");
                eprintln!("[x] {}: {}", domain, e);
                failures += 1;
            }
        }
    }

    if failures > 0 {
        return Err(eyre!("{} of {} scans failed", failures, cli.domains.len()));
    }
    Ok(())
}

async fn run_tui(config: Config) -> Result<()> {
    let (event_tx, event_rx) = mpsc::unbounded_channel();
    let collaborators = Collaborators::live(&config.scanner).wrap_err("Failed to initialize network clients")?;
    let orchestrator = Arc::new(Orchestrator::new(
        collaborators,
        config.scanner.clone(),
        Arc::new(ChannelObserver::new(event_tx)),
    ));

    stdout().execute(EnterAlternateScreen)?;
    stdout().execute(EnableMouseCapture)?;
    enable_raw_mode()?;

    let result = event_loop(App::new(config.output.directory), orchestrator, event_rx).await;

    stdout().execute(LeaveAlternateScreen)?;
    stdout().execute(DisableMouseCapture)?;
    disable_raw_mode()?;
    result
}

async fn event_loop(
    mut app: App,
    orchestrator: Arc<Orchestrator>,
    mut event_rx: mpsc::UnboundedReceiver<ScanEvent>,
) -> Result<()> {
    let mut terminal = Terminal::new(CrosstermBackend::new(stdout()))?;
    terminal.clear()?;
    let (done_tx, mut done_rx) = mpsc::channel::<ScanOutcome>(1);

    while !app.should_quit {
        terminal.draw(|frame| ui::render(&mut app, frame))?;

        if event::poll(Duration::from_millis(100))? {
            handle_events(&mut app, &orchestrator, &done_tx)?;
        }

        while let Ok(scan_event) = event_rx.try_recv() {
            app.on_scan_event(scan_event);
        }
        if let Ok(outcome) = done_rx.try_recv() {
            app.on_scan_finished(outcome);
        }
        app.on_tick();
    }
    Ok(())
}

fn handle_events(app: &mut App, orchestrator: &Arc<Orchestrator>, done_tx: &mpsc::Sender<ScanOutcome>) -> Result<()> {
    if let Event::Key(key) = event::read()? {
        if key.kind != KeyEventKind::Press {
            return Ok(());
        }
        if app.show_disclaimer {
            match key.code {
                KeyCode::Enter => app.show_disclaimer = false,
                KeyCode::Char('q') | KeyCode::Esc => app.quit(),
                _ => {}
            }
            return Ok(());
        }
        match app.state {
            AppState::Idle => handle_idle_input(app, key.code, orchestrator, done_tx),
            AppState::Finished => handle_finished_input(app, key.code),
            AppState::Scanning => {
                if matches!(key.code, KeyCode::Char('q') | KeyCode::Esc) {
                    app.quit();
                }
            }
        }
    }
    Ok(())
}

fn handle_idle_input(
    app: &mut App,
    key_code: KeyCode,
    orchestrator: &Arc<Orchestrator>,
    done_tx: &mpsc::Sender<ScanOutcome>,
) {
    match key_code {
        KeyCode::Esc => app.quit(),
        KeyCode::Char(c) => app.input.push(c),
        KeyCode::Backspace => {
            app.input.pop();
        }
        KeyCode::Enter => {
            let target = app.input.trim().to_string();
            if target.is_empty() {
                return;
            }
            app.start_scan();

            let orchestrator = Arc::clone(orchestrator);
            let done_tx = done_tx.clone();
            tokio::spawn(async move {
                let outcome = orchestrator.run_scan(&target).await.map_err(|e| e.to_string());
                let _ = done_tx.send(outcome).await;
            });
        }
        _ => {}
    }
}

fn handle_finished_input(app: &mut App, key_code: KeyCode) {
    match key_code {
        KeyCode::Char('q') | KeyCode::Esc => app.quit(),
        KeyCode::Char('n') => app.reset(),
        KeyCode::Char('e') => app.export(),
        KeyCode::Up => app.scroll_up(),
        KeyCode::Down => app.scroll_down(),
        KeyCode::Left => app.scroll_log_left(),
        KeyCode::Right => app.scroll_log_right(),
        _ => {}
    }
}
