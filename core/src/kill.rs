//! Process termination via POSIX signals.

use nix::errno::Errno;
use nix::sys::signal::{kill, Signal};
use nix::unistd::Pid;
use tracing::{debug, warn};

use crate::error::{Error, Result};

/// Sends termination signals to processes, classifying delivery failures.
#[derive(Debug, Default)]
pub struct ProcessKiller;

impl ProcessKiller {
    /// Create a new process killer.
    pub fn new() -> Self {
        Self
    }

    /// Send a termination signal to a process.
    ///
    /// `force` selects SIGKILL; otherwise SIGTERM is sent and the process
    /// gets the chance to shut down cleanly. Delivery is immediate and not
    /// awaited: the caller refreshes its view of the world afterwards.
    ///
    /// # Errors
    ///
    /// * [`Error::ProcessNotFound`] - the process already exited (ESRCH)
    /// * [`Error::PermissionDenied`] - insufficient privilege (EPERM)
    /// * [`Error::KillFailed`] - any other delivery failure
    pub fn kill(&self, pid: u32, force: bool) -> Result<()> {
        let signal = signal_for(force);
        debug!(pid, signal = %signal, "sending signal");

        match kill(Pid::from_raw(pid as i32), signal) {
            Ok(()) => Ok(()),
            Err(Errno::ESRCH) => {
                debug!(pid, "process not found");
                Err(Error::ProcessNotFound(pid))
            }
            Err(Errno::EPERM) => {
                warn!(pid, "permission denied sending signal");
                Err(Error::PermissionDenied(format!("cannot signal PID {pid}")))
            }
            Err(errno) => Err(Error::KillFailed {
                pid,
                reason: errno.to_string(),
            }),
        }
    }
}

/// Signal selected by the force flag.
pub fn signal_for(force: bool) -> Signal {
    if force {
        Signal::SIGKILL
    } else {
        Signal::SIGTERM
    }
}
