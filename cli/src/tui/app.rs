//! Interactive session state.
//!
//! All keyboard handling lives here as pure state transitions so it can be
//! tested without a terminal. Anything that needs IO (killing, refreshing,
//! opening things) is returned as an [`Action`] for the event loop to carry
//! out between draws.

use crossterm::event::{KeyCode, KeyEvent, KeyModifiers};
use devkill_core::{Error, ProcessInfo, ScanRange};

use crate::output::{process_noun, shorten_path};

/// Which keys are live and what gets rendered around the table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Mode {
    List,
    ActionMenu,
    ConfirmKillAll,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MessageKind {
    Success,
    Warning,
    Error,
    Info,
}

/// Transient status line shown under the table until the next navigation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusMessage {
    pub kind: MessageKind,
    pub text: String,
}

impl StatusMessage {
    pub fn success(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Success, text: text.into() }
    }

    pub fn warning(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Warning, text: text.into() }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Error, text: text.into() }
    }

    pub fn info(text: impl Into<String>) -> Self {
        Self { kind: MessageKind::Info, text: text.into() }
    }
}

/// Side effect requested by a key transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Action {
    None,
    Quit,
    Refresh,
    OpenBrowser { port: u16 },
    OpenEditor { cwd: String },
    Kill { target: ProcessInfo },
    KillAll,
}

pub struct App {
    pub processes: Vec<ProcessInfo>,
    pub selected: usize,
    pub mode: Mode,
    pub message: Option<StatusMessage>,
    pub range: ScanRange,
}

impl App {
    pub fn new(range: ScanRange) -> Self {
        Self {
            processes: Vec::new(),
            selected: 0,
            mode: Mode::List,
            message: None,
            range,
        }
    }

    /// Replace the process list wholesale after a refresh.
    ///
    /// The selection is clamped to the new length and the session drops
    /// back to List mode, closing any open menu or confirmation. The
    /// status message is left alone so an action's result stays visible
    /// through the refresh that follows it.
    pub fn apply_refresh(&mut self, processes: Vec<ProcessInfo>) {
        self.processes = processes;
        self.clamp_selection();
        self.mode = Mode::List;
    }

    fn clamp_selection(&mut self) {
        if self.processes.is_empty() {
            self.selected = 0;
        } else if self.selected >= self.processes.len() {
            self.selected = self.processes.len() - 1;
        }
    }

    pub fn selected_process(&self) -> Option<&ProcessInfo> {
        self.processes.get(self.selected)
    }

    pub fn set_message(&mut self, message: StatusMessage) {
        self.message = Some(message);
    }

    pub fn clear_message(&mut self) {
        self.message = None;
    }
}

/// Apply one key event to the session state.
///
/// Mode transitions and status messages happen here; the returned
/// [`Action`] tells the event loop what IO, if any, to perform next.
#[must_use]
pub fn handle_key_event(key: KeyEvent, app: &mut App) -> Action {
    // Ctrl+C quits from any mode, including mid-confirmation
    if key.modifiers.contains(KeyModifiers::CONTROL) && key.code == KeyCode::Char('c') {
        return Action::Quit;
    }

    match app.mode {
        Mode::List => handle_list_key(key, app),
        Mode::ActionMenu => handle_action_menu_key(key, app),
        Mode::ConfirmKillAll => handle_confirm_key(key, app),
    }
}

fn handle_list_key(key: KeyEvent, app: &mut App) -> Action {
    match key.code {
        KeyCode::Char('q') => Action::Quit,
        KeyCode::Up => {
            if !app.processes.is_empty() {
                app.selected = app.selected.saturating_sub(1);
                app.clear_message();
            }
            Action::None
        }
        KeyCode::Down => {
            if !app.processes.is_empty() {
                app.selected = (app.selected + 1).min(app.processes.len() - 1);
                app.clear_message();
            }
            Action::None
        }
        KeyCode::Enter => {
            if !app.processes.is_empty() {
                app.mode = Mode::ActionMenu;
                app.clear_message();
            }
            Action::None
        }
        KeyCode::Char('K') => {
            if !app.processes.is_empty() {
                app.mode = Mode::ConfirmKillAll;
                app.clear_message();
            }
            Action::None
        }
        KeyCode::Char('r') => {
            app.set_message(StatusMessage::info("Refreshing..."));
            Action::Refresh
        }
        _ => Action::None,
    }
}

fn handle_action_menu_key(key: KeyEvent, app: &mut App) -> Action {
    let Some(target) = app.selected_process().cloned() else {
        // the menu only opens with a selection, but the list can have
        // been emptied underneath it
        app.mode = Mode::List;
        return Action::None;
    };

    match key.code {
        KeyCode::Char('o') => {
            app.mode = Mode::List;
            app.set_message(StatusMessage::success(format!(
                "Opened http://localhost:{} in browser",
                target.port
            )));
            Action::OpenBrowser { port: target.port }
        }
        KeyCode::Char('c') => {
            app.mode = Mode::List;
            if target.cwd.is_empty() {
                app.set_message(StatusMessage::warning(
                    "No working directory found for this process",
                ));
                Action::None
            } else {
                app.set_message(StatusMessage::success(format!(
                    "Opened {} in VS Code",
                    shorten_path(&target.cwd)
                )));
                Action::OpenEditor { cwd: target.cwd }
            }
        }
        KeyCode::Char('k') => Action::Kill { target },
        KeyCode::Esc => {
            app.mode = Mode::List;
            app.clear_message();
            Action::None
        }
        _ => Action::None,
    }
}

fn handle_confirm_key(key: KeyEvent, app: &mut App) -> Action {
    match key.code {
        KeyCode::Char('y') | KeyCode::Char('Y') => Action::KillAll,
        KeyCode::Char('n') | KeyCode::Char('N') | KeyCode::Esc => {
            app.mode = Mode::List;
            app.clear_message();
            Action::None
        }
        _ => Action::None,
    }
}

/// Status line for a single kill attempt from the action menu.
pub fn kill_result_message(target: &ProcessInfo, result: &devkill_core::Result<()>) -> StatusMessage {
    match result {
        Ok(()) => StatusMessage::success(format!(
            "Killed {} on port {} (PID {})",
            target.framework, target.port, target.pid
        )),
        Err(Error::ProcessNotFound(_)) => StatusMessage::warning(format!(
            "Process on port {} already exited",
            target.port
        )),
        Err(Error::PermissionDenied(_)) => StatusMessage::error(format!(
            "Permission denied killing PID {}. Try sudo.",
            target.pid
        )),
        Err(Error::KillFailed { reason, .. }) => StatusMessage::error(format!(
            "Failed to kill PID {}: {reason}",
            target.pid
        )),
        Err(e) => StatusMessage::error(format!("Failed to kill PID {}: {e}", target.pid)),
    }
}

/// Summary line for a kill-all sweep.
///
/// Every failure counts here, including processes that were already gone.
/// The single-kill path is more forgiving about those.
pub fn kill_all_message(killed: usize, failed: usize) -> StatusMessage {
    if failed > 0 {
        StatusMessage::success(format!(
            "Killed {killed} {}, {failed} failed",
            process_noun(killed)
        ))
    } else {
        StatusMessage::success(format!("Killed all {killed} {}", process_noun(killed)))
    }
}
