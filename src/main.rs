use cshowcase::kernel::{OutputSink, ProgramRegistry, Store};
use cshowcase::runtime::{paths, AppMessage, AsyncRuntime, ProcessUnitSource};
use cshowcase::tui::session::{CrosstermOps, ShutdownSignals, TerminalSession, TerminationSignal};
use cshowcase::tui::ShowcaseApp;
use crossterm::event::{self, Event};
use ratatui::backend::CrosstermBackend;
use ratatui::Terminal;
use std::io;
use std::path::{Path, PathBuf};
use std::sync::mpsc;
use std::sync::Arc;
use std::time::Duration;

mod logging;

const POLL_INTERVAL: Duration = Duration::from_millis(50);

fn main() -> io::Result<()> {
    let mut logging = logging::init();
    if let Some(guard) = logging.as_ref() {
        tracing::debug!(log_dir = %guard.log_dir().display(), "logging ready");
    }

    let registry = resolve_registry(std::env::args().nth(1).map(PathBuf::from));
    tracing::info!(programs = registry.len(), "registry loaded");

    let (tx, rx) = mpsc::channel::<AppMessage>();
    let runtime = AsyncRuntime::new(tx, Arc::new(ProcessUnitSource))?;
    let store = Store::new(registry, OutputSink::new());
    let log_rx = logging.as_mut().and_then(|guard| guard.take_log_rx());
    let mut app = ShowcaseApp::new(store, runtime, rx, log_rx);

    let session = TerminalSession::enter(Box::new(CrosstermOps))?;
    let signals = ShutdownSignals::install()
        .map_err(|e| tracing::warn!(error = %e, "failed to install signal handlers"))
        .unwrap_or_default();

    let mut terminal = Terminal::new(CrosstermBackend::new(io::stdout()))?;
    let result = run(&mut app, &mut terminal, &signals);
    drop(terminal);

    if let Err(e) = session.close(|| app.shutdown()) {
        tracing::warn!(error = %e, "failed to restore terminal");
    }

    match result {
        Ok(Some(signal)) => std::process::exit(signal.exit_code()),
        Ok(None) => Ok(()),
        Err(e) => {
            tracing::error!(error = %e, "event loop failed");
            Err(e)
        }
    }
}

fn run(
    app: &mut ShowcaseApp,
    terminal: &mut Terminal<CrosstermBackend<io::Stdout>>,
    signals: &ShutdownSignals,
) -> io::Result<Option<TerminationSignal>> {
    let mut dirty = true;
    loop {
        if let Some(signal) = signals.pending() {
            return Ok(Some(signal));
        }

        dirty |= app.tick();
        if dirty {
            terminal.draw(|frame| app.render(frame))?;
            dirty = false;
        }

        if !event::poll(POLL_INTERVAL)? {
            continue;
        }
        match event::read()? {
            Event::Key(key) => {
                let (quit, changed) = app.handle_key(key);
                if quit {
                    return Ok(None);
                }
                dirty |= changed;
            }
            Event::Resize(_, _) => dirty = true,
            _ => {}
        }
    }
}

/// CLI path, then the per-user registry file, then the bundled programs.
fn resolve_registry(cli_path: Option<PathBuf>) -> ProgramRegistry {
    let configured = cli_path.or_else(|| paths::get_registry_path().filter(|p| p.is_file()));
    if let Some(path) = configured {
        match ProgramRegistry::load(&path) {
            Ok(registry) => {
                tracing::info!(path = %path.display(), "using registry file");
                return registry;
            }
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "registry file rejected, using built-ins");
            }
        }
    }

    let unit_dir = paths::exe_dir().unwrap_or_else(|| Path::new(".").to_path_buf());
    ProgramRegistry::builtin(&unit_dir)
}
