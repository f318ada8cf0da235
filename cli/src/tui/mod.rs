//! Interactive terminal session.
//!
//! The session is a single-threaded event loop over a pure state machine:
//! a blocking task polls the keyboard and forwards events over a channel,
//! the loop applies them to [`app::App`] and performs whatever IO the
//! transition asked for, then redraws the whole frame.

mod app;
mod ui;

use std::io::{self, Stdout};
use std::process::Stdio;
use std::time::Duration;

use anyhow::{Context, Result};
use crossterm::event::{self, Event as CrosstermEvent, KeyEvent};
use crossterm::execute;
use crossterm::terminal::{
    disable_raw_mode, enable_raw_mode, EnterAlternateScreen, LeaveAlternateScreen,
};
use devkill_core::{enrich, PortScanner, ProcessInfo, ProcessKiller, ScanRange};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use self::app::{
    handle_key_event, kill_all_message, kill_result_message, Action, App, Mode, StatusMessage,
};

/// Events delivered to the session loop.
enum Event {
    Key(KeyEvent),
    Resize,
}

/// Raw-mode terminal on the alternate screen, restored on drop.
///
/// Restoration has to run exactly once on every exit path, error returns
/// and panics included, so it lives in `Drop` rather than at call sites.
struct TerminalGuard {
    terminal: Terminal<CrosstermBackend<Stdout>>,
}

impl TerminalGuard {
    fn enter() -> Result<Self> {
        enable_raw_mode().context("failed to enable raw mode")?;

        let mut stdout = io::stdout();
        if let Err(e) = execute!(stdout, EnterAlternateScreen) {
            let _ = disable_raw_mode();
            return Err(e).context("failed to enter alternate screen");
        }

        match Terminal::new(CrosstermBackend::new(stdout)) {
            Ok(terminal) => Ok(Self { terminal }),
            Err(e) => {
                let _ = disable_raw_mode();
                let _ = execute!(io::stdout(), LeaveAlternateScreen);
                Err(e).context("failed to create terminal")
            }
        }
    }
}

impl Drop for TerminalGuard {
    fn drop(&mut self) {
        let _ = disable_raw_mode();
        let _ = execute!(self.terminal.backend_mut(), LeaveAlternateScreen);
        let _ = self.terminal.show_cursor();
    }
}

/// Startup gate: the interactive session needs a real terminal on stdin.
fn startup_error(stdin_is_tty: bool) -> Option<&'static str> {
    if stdin_is_tty {
        None
    } else {
        Some("Interactive mode requires a TTY. Use `devkill list` for non-interactive output.")
    }
}

/// Run the interactive session until the user quits.
///
/// Requires stdin to be a TTY and exits with code 1 before touching the
/// terminal otherwise.
pub async fn run(range: ScanRange) -> Result<()> {
    if let Some(message) = startup_error(atty::is(atty::Stream::Stdin)) {
        eprintln!("{message}");
        std::process::exit(1);
    }

    info!(%range, "starting interactive session");

    let mut app = App::new(range);
    refresh(&mut app).await;

    let mut guard = TerminalGuard::enter()?;

    let (event_tx, mut event_rx) = mpsc::unbounded_channel();
    let cancel_token = CancellationToken::new();
    let keyboard_task = spawn_keyboard_task(event_tx, cancel_token.clone());

    let result = run_event_loop(&mut guard.terminal, &mut app, &mut event_rx).await;

    cancel_token.cancel();
    let _ = tokio::time::timeout(Duration::from_millis(200), keyboard_task).await;

    drop(guard);
    info!("interactive session ended");
    result
}

async fn run_event_loop(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    event_rx: &mut mpsc::UnboundedReceiver<Event>,
) -> Result<()> {
    // Ctrl+C arrives as a key event in raw mode; these arms cover signals
    // sent from outside the terminal.
    let mut sigterm = signal(SignalKind::terminate()).context("failed to install SIGTERM handler")?;
    let mut sigint = signal(SignalKind::interrupt()).context("failed to install SIGINT handler")?;

    loop {
        terminal.draw(|f| ui::draw(f, app))?;

        tokio::select! {
            maybe_event = event_rx.recv() => {
                match maybe_event {
                    Some(Event::Key(key)) => {
                        let action = handle_key_event(key, app);
                        if dispatch_action(terminal, app, action).await? {
                            break;
                        }
                    }
                    Some(Event::Resize) => {}
                    None => {
                        warn!("keyboard channel closed");
                        break;
                    }
                }
            }
            _ = sigterm.recv() => {
                info!("received SIGTERM, shutting down");
                break;
            }
            _ = sigint.recv() => {
                info!("received SIGINT, shutting down");
                break;
            }
        }
    }

    Ok(())
}

/// Perform the IO a key transition asked for. Returns `true` to quit.
async fn dispatch_action(
    terminal: &mut Terminal<CrosstermBackend<Stdout>>,
    app: &mut App,
    action: Action,
) -> Result<bool> {
    match action {
        Action::Quit => return Ok(true),
        Action::None => {}
        Action::Refresh => {
            // paint the "Refreshing..." note before blocking on discovery
            terminal.draw(|f| ui::draw(f, app))?;
            if refresh(app).await {
                app.clear_message();
            }
        }
        Action::OpenBrowser { port } => open_browser(port),
        Action::OpenEditor { cwd } => open_editor(&cwd),
        Action::Kill { target } => {
            let result = ProcessKiller::new().kill(target.pid, false);
            app.set_message(kill_result_message(&target, &result));
            refresh(app).await;
        }
        Action::KillAll => {
            let killer = ProcessKiller::new();
            let mut killed = 0;
            let mut failed = 0;
            for proc in &app.processes {
                match killer.kill(proc.pid, false) {
                    Ok(()) => killed += 1,
                    Err(e) => {
                        debug!(pid = proc.pid, error = %e, "kill failed during sweep");
                        failed += 1;
                    }
                }
            }
            app.set_message(kill_all_message(killed, failed));
            refresh(app).await;
        }
    }

    Ok(false)
}

/// Re-run discovery and enrichment, replacing the process list.
///
/// Failures stay inside the session: the previous list is kept, the mode
/// drops back to List, and the error becomes a status message. Returns
/// whether the refresh succeeded.
async fn refresh(app: &mut App) -> bool {
    match discover(app.range).await {
        Ok(processes) => {
            debug!(count = processes.len(), "refreshed process list");
            app.apply_refresh(processes);
            true
        }
        Err(e) => {
            warn!(error = %e, "refresh failed");
            app.set_message(StatusMessage::error(format!("Refresh failed: {e}")));
            app.mode = Mode::List;
            false
        }
    }
}

async fn discover(range: ScanRange) -> devkill_core::Result<Vec<ProcessInfo>> {
    let entries = PortScanner::new(range).scan().await?;
    enrich(entries).await
}

fn open_browser(port: u16) {
    let url = format!("http://localhost:{port}");
    debug!(%url, "opening browser");
    if let Err(e) = webbrowser::open(&url) {
        warn!(error = %e, "failed to open browser");
    }
}

fn open_editor(cwd: &str) {
    debug!(cwd, "opening editor");
    let spawned = tokio::process::Command::new("code")
        .arg(cwd)
        .stdout(Stdio::null())
        .stderr(Stdio::null())
        .spawn();
    if let Err(e) = spawned {
        warn!(error = %e, "failed to launch editor");
    }
}

/// Poll the keyboard on a blocking thread and forward events to the loop.
fn spawn_keyboard_task(
    event_tx: mpsc::UnboundedSender<Event>,
    cancel_token: CancellationToken,
) -> tokio::task::JoinHandle<()> {
    tokio::spawn(async move {
        loop {
            if cancel_token.is_cancelled() {
                debug!("keyboard task shutting down");
                break;
            }

            let polled = tokio::task::spawn_blocking(|| {
                if event::poll(Duration::from_millis(50)).unwrap_or(false) {
                    event::read().ok()
                } else {
                    None
                }
            })
            .await;

            match polled {
                Ok(Some(CrosstermEvent::Key(key))) => {
                    if event_tx.send(Event::Key(key)).is_err() {
                        break;
                    }
                }
                Ok(Some(CrosstermEvent::Resize(_, _))) => {
                    if event_tx.send(Event::Resize).is_err() {
                        break;
                    }
                }
                Ok(_) => {}
                Err(e) => {
                    error!(error = %e, "keyboard polling task failed");
                    break;
                }
            }
        }
    })
}
