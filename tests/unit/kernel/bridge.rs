use super::*;
use crate::kernel::testing::{descriptor, FakeSource, Script};

fn exiting(names: &[&str]) -> Script {
    Script {
        exit: true,
        ..Script::exporting(names)
    }
}

#[test]
fn successful_load_installs_unit() {
    let source = FakeSource::new().with_unit("units/inventory", Script::exporting(&["init_inventory"]));
    let mut bridge = ModuleBridge::new(OutputSink::new());

    let handle = bridge.load(&source, &descriptor("inventory"));

    assert_eq!(handle.status, UnitStatus::Ready);
    assert_eq!(handle.owner.as_deref(), Some("inventory"));
    assert_eq!(bridge.run_state(), RunState::NotStarted);
    assert!(bridge.sink().is_empty());
    assert!(bridge.instance_mut().is_some());
}

#[test]
fn fetch_failure_is_fatal_and_leaves_no_instance() {
    let source = FakeSource::new();
    let mut bridge = ModuleBridge::new(OutputSink::new());

    let handle = bridge.load(&source, &descriptor("jukebox"));

    assert_eq!(handle.status, UnitStatus::Failed);
    assert!(bridge.instance_mut().is_none());
    assert_eq!(
        bridge.sink().rendered(),
        vec!["FATAL ERROR: Failed to load unit units/jukebox. 404 Not Found"]
    );
}

#[test]
fn instantiation_failure_is_reported_once() {
    let source = FakeSource::new().with_failure(
        "units/grades",
        LoadError::instantiation("units/grades", "exited with status 3"),
    );
    let mut bridge = ModuleBridge::new(OutputSink::new());

    bridge.load(&source, &descriptor("grades"));

    assert_eq!(bridge.status(), UnitStatus::Failed);
    assert_eq!(
        bridge.sink().rendered(),
        vec!["FATAL ERROR: Instantiation failed for units/grades. exited with status 3"]
    );
}

#[test]
fn begin_load_moves_to_loading() {
    let mut bridge = ModuleBridge::new(OutputSink::new());
    let request = bridge.begin_load(&descriptor("minigame"));

    assert_eq!(bridge.status(), UnitStatus::Loading);
    assert_eq!(request.generation, bridge.generation());
    assert_eq!(bridge.handle().owner.as_deref(), Some("minigame"));
    assert!(bridge.instance_mut().is_none());
}

#[test]
fn superseded_load_is_discarded_and_shut_down() {
    let source = FakeSource::new()
        .with_unit("units/a", exiting(&["init_a"]))
        .with_unit("units/b", exiting(&["init_b"]));
    let journal = source.journal();
    let mut bridge = ModuleBridge::new(OutputSink::new());

    let first = bridge.begin_load(&descriptor("a"));
    let second = bridge.begin_load(&descriptor("b"));

    let first_done = first.perform(&source);
    let second_done = second.perform(&source);

    assert!(bridge.complete_load(second_done));
    assert!(!bridge.complete_load(first_done));

    assert_eq!(bridge.status(), UnitStatus::Ready);
    assert_eq!(bridge.handle().owner.as_deref(), Some("b"));
    assert_eq!(journal.lock().unwrap().exits, 1);
}

#[test]
fn late_completion_after_teardown_is_ignored() {
    let source = FakeSource::new().with_unit("units/a", exiting(&["init_a"]));
    let journal = source.journal();
    let mut bridge = ModuleBridge::new(OutputSink::new());

    let request = bridge.begin_load(&descriptor("a"));
    bridge.teardown();
    let applied = bridge.complete_load(request.perform(&source));

    assert!(!applied);
    assert_eq!(bridge.status(), UnitStatus::Unloaded);
    assert!(bridge.handle().owner.is_none());
    assert_eq!(journal.lock().unwrap().exits, 1);
}

#[test]
fn failed_superseded_load_writes_nothing() {
    let source = FakeSource::new().with_unit("units/b", Script::exporting(&["init_b"]));
    let mut bridge = ModuleBridge::new(OutputSink::new());

    let stale = bridge.begin_load(&descriptor("missing"));
    let current = bridge.begin_load(&descriptor("b"));
    assert!(!bridge.complete_load(stale.perform(&source)));
    assert!(bridge.complete_load(current.perform(&source)));

    assert!(bridge.sink().is_empty());
}

#[test]
fn output_from_retired_unit_is_dropped() {
    let mut bridge = ModuleBridge::new(OutputSink::new());
    let old = bridge.begin_load(&descriptor("a"));
    let new = bridge.begin_load(&descriptor("b"));

    (old.config.on_standard_output)("from a");
    (new.config.on_standard_output)("from b");
    (new.config.on_error_output)("oops");

    assert_eq!(bridge.sink().rendered(), vec!["from b", "ERROR: oops"]);
}

#[test]
fn replacing_a_ready_unit_exits_it_first() {
    let source = FakeSource::new()
        .with_unit("units/a", exiting(&["init_a"]))
        .with_unit("units/b", Script::exporting(&["init_b"]));
    let journal = source.journal();
    let mut bridge = ModuleBridge::new(OutputSink::new());

    bridge.load(&source, &descriptor("a"));
    bridge.load(&source, &descriptor("b"));

    assert_eq!(journal.lock().unwrap().exits, 1);
    assert_eq!(bridge.handle().owner.as_deref(), Some("b"));
}

#[test]
fn teardown_is_idempotent() {
    let source = FakeSource::new().with_unit("units/a", exiting(&["init_a"]));
    let journal = source.journal();
    let mut bridge = ModuleBridge::new(OutputSink::new());
    bridge.load(&source, &descriptor("a"));

    bridge.teardown();
    let generation = bridge.generation();
    bridge.teardown();

    assert_eq!(bridge.status(), UnitStatus::Unloaded);
    assert_eq!(bridge.run_state(), RunState::NotStarted);
    assert_eq!(bridge.generation(), generation);
    assert_eq!(journal.lock().unwrap().exits, 1);
}

#[test]
fn teardown_on_fresh_bridge_is_a_no_op() {
    let mut bridge = ModuleBridge::new(OutputSink::new());
    bridge.teardown();
    assert_eq!(bridge.status(), UnitStatus::Unloaded);
    assert_eq!(bridge.generation(), 0);
}

#[test]
fn failing_exit_still_unloads() {
    let source = FakeSource::new().with_unit(
        "units/a",
        Script {
            exit_fails: true,
            ..exiting(&["init_a"])
        },
    );
    let mut bridge = ModuleBridge::new(OutputSink::new());
    bridge.load(&source, &descriptor("a"));

    bridge.teardown();

    assert_eq!(bridge.status(), UnitStatus::Unloaded);
    assert!(bridge.sink().is_empty());
}

#[test]
fn units_without_exit_are_just_dropped() {
    let source = FakeSource::new().with_unit("units/a", Script::exporting(&["init_a"]));
    let journal = source.journal();
    let mut bridge = ModuleBridge::new(OutputSink::new());
    bridge.load(&source, &descriptor("a"));

    bridge.teardown();

    assert_eq!(journal.lock().unwrap().exits, 0);
}

#[test]
fn auxiliary_files_resolve_next_to_the_unit() {
    let mut bridge = ModuleBridge::new(OutputSink::new());
    let request = bridge.begin_load(&descriptor("jukebox"));

    assert_eq!(
        (request.config.resolve_auxiliary_file)("song1.txt"),
        "units/song1.txt"
    );
}

#[test]
fn status_labels() {
    assert_eq!(UnitStatus::Loading.label(), "Loading module...");
    assert_eq!(UnitStatus::Ready.label(), "Module Loaded");
    assert_eq!(UnitStatus::Ready.to_string(), "Ready");
}
