use super::*;
use std::sync::Mutex;

#[derive(Clone, Default)]
struct Journal(Arc<Mutex<Vec<&'static str>>>);

impl Journal {
    fn push(&self, entry: &'static str) {
        self.0.lock().unwrap().push(entry);
    }

    fn entries(&self) -> Vec<&'static str> {
        self.0.lock().unwrap().clone()
    }
}

struct RecordingOps {
    journal: Journal,
    fail_enter: bool,
}

impl TerminalOps for RecordingOps {
    fn enter(&self) -> io::Result<()> {
        self.journal.push("enter");
        if self.fail_enter {
            return Err(io::Error::new(io::ErrorKind::Other, "no tty"));
        }
        Ok(())
    }

    fn leave(&self) -> io::Result<()> {
        self.journal.push("leave");
        Ok(())
    }
}

fn session(journal: &Journal) -> TerminalSession {
    TerminalSession::enter(Box::new(RecordingOps {
        journal: journal.clone(),
        fail_enter: false,
    }))
    .unwrap()
}

#[test]
fn unit_exits_before_the_terminal_is_restored() {
    let journal = Journal::default();
    let session = session(&journal);

    session.close(|| journal.push("unit exit")).unwrap();

    assert_eq!(journal.entries(), vec!["enter", "unit exit", "leave"]);
}

#[test]
fn dropping_an_open_session_restores_once() {
    let journal = Journal::default();
    drop(session(&journal));
    assert_eq!(journal.entries(), vec!["enter", "leave"]);

    let journal = Journal::default();
    session(&journal).close(|| {}).unwrap();
    assert_eq!(journal.entries(), vec!["enter", "leave"]);
}

#[test]
fn failed_setup_is_rolled_back() {
    let journal = Journal::default();
    let result = TerminalSession::enter(Box::new(RecordingOps {
        journal: journal.clone(),
        fail_enter: true,
    }));

    assert!(result.is_err());
    assert_eq!(journal.entries(), vec!["enter", "leave"]);
}

#[test]
fn pending_signal_prefers_terminate() {
    let signals = ShutdownSignals::default();
    assert_eq!(signals.pending(), None);

    signals.interrupt.store(true, Ordering::SeqCst);
    assert_eq!(signals.pending(), Some(TerminationSignal::SigInt));

    signals.terminate.store(true, Ordering::SeqCst);
    assert_eq!(signals.pending(), Some(TerminationSignal::SigTerm));
}

#[test]
fn exit_codes_follow_shell_convention() {
    assert_eq!(TerminationSignal::SigInt.exit_code(), 130);
    assert_eq!(TerminationSignal::SigTerm.exit_code(), 143);
}
