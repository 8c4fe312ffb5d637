use super::*;
use crate::kernel::testing::{descriptor, FakeSource, Script};
use crate::kernel::{ModuleBridge, OutputSink, UnitStatus};
use std::sync::mpsc;
use std::time::Duration;

const WAIT: Duration = Duration::from_secs(5);

fn runtime_with(source: FakeSource) -> (AsyncRuntime, mpsc::Receiver<AppMessage>) {
    let (tx, rx) = mpsc::channel();
    let runtime = AsyncRuntime::new(tx, Arc::new(source)).unwrap();
    (runtime, rx)
}

#[test]
fn load_unit_posts_completion() {
    let source = FakeSource::new().with_unit("units/echo", Script::exporting(&["init_echo"]));
    let (runtime, rx) = runtime_with(source);
    let mut bridge = ModuleBridge::new(OutputSink::new());

    runtime.run_effect(Effect::LoadUnit(bridge.begin_load(&descriptor("echo"))));

    let Ok(AppMessage::UnitLoaded(completion)) = rx.recv_timeout(WAIT) else {
        panic!("expected a load completion");
    };
    assert_eq!(completion.program_id, "echo");
    assert!(bridge.complete_load(completion));
    assert_eq!(bridge.status(), UnitStatus::Ready);
}

#[test]
fn failed_load_is_still_posted() {
    let (runtime, rx) = runtime_with(FakeSource::new());
    let mut bridge = ModuleBridge::new(OutputSink::new());

    runtime.load_unit(bridge.begin_load(&descriptor("gone")));

    let Ok(AppMessage::UnitLoaded(completion)) = rx.recv_timeout(WAIT) else {
        panic!("expected a load completion");
    };
    assert!(completion.result.is_err());
}

#[test]
fn source_listing_is_read_from_disk() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("echo.rs");
    std::fs::write(&path, "fn main() {}\n").unwrap();
    let (runtime, rx) = runtime_with(FakeSource::new());

    runtime.run_effect(Effect::LoadSourceListing {
        program_id: "echo".to_string(),
        location: path.to_string_lossy().to_string(),
    });

    match rx.recv_timeout(WAIT) {
        Ok(AppMessage::SourceLoaded {
            program_id,
            content,
        }) => {
            assert_eq!(program_id, "echo");
            assert_eq!(content, "fn main() {}\n");
        }
        other => panic!("unexpected message: {other:?}"),
    }
}

#[test]
fn missing_source_listing_reports_failure() {
    let dir = tempfile::tempdir().unwrap();
    let (runtime, rx) = runtime_with(FakeSource::new());

    runtime.load_source_listing(
        "echo".to_string(),
        dir.path().join("absent.rs").to_string_lossy().to_string(),
    );

    assert!(matches!(
        rx.recv_timeout(WAIT),
        Ok(AppMessage::SourceFailed { program_id, .. }) if program_id == "echo"
    ));
}

#[test]
fn bundled_listing_is_served_from_the_binary() {
    let (runtime, rx) = runtime_with(FakeSource::new());

    runtime.load_source_listing("jukebox".to_string(), "builtin:jukebox".to_string());

    match rx.recv_timeout(WAIT) {
        Ok(AppMessage::SourceLoaded {
            program_id,
            content,
        }) => {
            assert_eq!(program_id, "jukebox");
            assert_eq!(Some(content.as_str()), builtin_listing("builtin:jukebox"));
        }
        other => panic!("unexpected message: {other:?}"),
    }

    runtime.load_source_listing("jukebox".to_string(), "builtin:nothing".to_string());
    assert!(matches!(
        rx.recv_timeout(WAIT),
        Ok(AppMessage::SourceFailed { error, .. }) if error.contains("builtin:nothing")
    ));
}

struct PanickingSource;

impl UnitSource for PanickingSource {
    fn fetch(
        &self,
        _descriptor: &crate::kernel::ProgramDescriptor,
    ) -> Result<Box<dyn crate::kernel::UnitFactory>, crate::kernel::LoadError> {
        panic!("source blew up");
    }
}

#[test]
fn panicking_load_fails_instead_of_hanging() {
    let (tx, rx) = mpsc::channel();
    let runtime = AsyncRuntime::new(tx, Arc::new(PanickingSource)).unwrap();
    let mut bridge = ModuleBridge::new(OutputSink::new());

    runtime.load_unit(bridge.begin_load(&descriptor("echo")));

    let Ok(AppMessage::UnitLoaded(completion)) = rx.recv_timeout(WAIT) else {
        panic!("expected a load completion");
    };
    assert!(matches!(
        completion.result,
        Err(crate::kernel::LoadError::InstantiationFailure { .. })
    ));
    assert!(bridge.complete_load(completion));
    assert_eq!(bridge.status(), UnitStatus::Failed);
    let rendered = bridge.sink().rendered();
    assert_eq!(rendered.len(), 1);
    assert!(rendered[0].starts_with("FATAL ERROR: Instantiation failed for units/echo."));
}
