//! Terminal mode and termination signals for one interactive run.

use signal_hook::consts::{SIGINT, SIGTERM};
use std::io;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

pub trait TerminalOps {
    fn enter(&self) -> io::Result<()>;
    fn leave(&self) -> io::Result<()>;
}

#[derive(Debug, Default)]
pub struct CrosstermOps;

impl TerminalOps for CrosstermOps {
    fn enter(&self) -> io::Result<()> {
        use crossterm::{
            cursor, execute,
            terminal::{enable_raw_mode, EnterAlternateScreen},
        };

        enable_raw_mode()?;
        execute!(
            io::stdout(),
            EnterAlternateScreen,
            cursor::SetCursorStyle::SteadyBar
        )
    }

    fn leave(&self) -> io::Result<()> {
        use crossterm::{
            cursor, execute,
            terminal::{disable_raw_mode, LeaveAlternateScreen},
        };

        let screen = execute!(
            io::stdout(),
            LeaveAlternateScreen,
            cursor::Show,
            cursor::SetCursorStyle::DefaultUserShape
        );
        disable_raw_mode().and(screen)
    }
}

/// Owns the raw/alternate-screen mode. Left exactly once: by `close`, or on drop.
pub struct TerminalSession {
    ops: Box<dyn TerminalOps>,
    active: bool,
}

impl TerminalSession {
    /// Enters the mode; a partial enter is undone before the error is returned.
    pub fn enter(ops: Box<dyn TerminalOps>) -> io::Result<Self> {
        if let Err(e) = ops.enter() {
            let _ = ops.leave();
            return Err(e);
        }
        Ok(Self { ops, active: true })
    }

    /// Runs `finish` while the session is still up, then restores the terminal.
    /// Used to exit the running unit before the shell gets the screen back.
    pub fn close(mut self, finish: impl FnOnce()) -> io::Result<()> {
        finish();
        self.leave()
    }

    fn leave(&mut self) -> io::Result<()> {
        if !std::mem::replace(&mut self.active, false) {
            return Ok(());
        }
        self.ops.leave()
    }
}

impl Drop for TerminalSession {
    fn drop(&mut self) {
        if let Err(e) = self.leave() {
            tracing::warn!(error = %e, "failed to restore terminal");
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TerminationSignal {
    SigInt,
    SigTerm,
}

impl TerminationSignal {
    pub fn exit_code(self) -> i32 {
        128 + self.number()
    }

    fn number(self) -> i32 {
        match self {
            TerminationSignal::SigInt => SIGINT,
            TerminationSignal::SigTerm => SIGTERM,
        }
    }
}

/// SIGINT/SIGTERM latched into flags the event loop polls. A second signal while the
/// first is still pending (the loop is stuck inside a unit call) exits immediately.
#[derive(Debug, Clone, Default)]
pub struct ShutdownSignals {
    interrupt: Arc<AtomicBool>,
    terminate: Arc<AtomicBool>,
}

impl ShutdownSignals {
    pub fn install() -> io::Result<Self> {
        use signal_hook::flag;

        let signals = Self::default();
        for (signal, latch) in [
            (TerminationSignal::SigInt, &signals.interrupt),
            (TerminationSignal::SigTerm, &signals.terminate),
        ] {
            flag::register_conditional_shutdown(signal.number(), signal.exit_code(), latch.clone())?;
            flag::register(signal.number(), latch.clone())?;
        }
        Ok(signals)
    }

    pub fn pending(&self) -> Option<TerminationSignal> {
        if self.terminate.load(Ordering::SeqCst) {
            Some(TerminationSignal::SigTerm)
        } else if self.interrupt.load(Ordering::SeqCst) {
            Some(TerminationSignal::SigInt)
        } else {
            None
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tui/session.rs"]
mod tests;
