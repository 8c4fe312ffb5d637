use super::*;

#[test]
fn load_error_messages_name_the_location() {
    let e = LoadError::network("units/inventory", "404 Not Found");
    assert_eq!(
        e.to_string(),
        "Failed to load unit units/inventory. 404 Not Found"
    );
    assert_eq!(e.kind(), "network_failure");

    let e = LoadError::instantiation("units/jukebox", "spawn failed");
    assert_eq!(
        e.to_string(),
        "Instantiation failed for units/jukebox. spawn failed"
    );
    assert_eq!(e.kind(), "instantiation_failure");

    let e = LoadError::malformed("units/bad", "no exports");
    assert_eq!(e.to_string(), "Unit factory not found for units/bad. no exports");
    assert_eq!(e.kind(), "malformed_factory");
}

#[test]
fn missing_entry_messages_match_user_facing_text() {
    let e = InvocationError::MissingStartEntry {
        program: "grades".to_string(),
        entry: "init_grades".to_string(),
    };
    assert_eq!(
        e.to_string(),
        "[grades] No suitable init function ('init_grades' or 'main') found on unit."
    );
    assert!(e.is_missing_entry_point());

    let e = InvocationError::MissingInputEntry {
        program: "minigame".to_string(),
        entry: "process_minigame_guess".to_string(),
    };
    assert_eq!(
        e.to_string(),
        "[minigame] Input handling function 'process_minigame_guess' not found on unit."
    );
    assert!(e.is_missing_entry_point());
    assert!(!InvocationError::EmptyInput.is_missing_entry_point());
}

#[test]
fn call_exception_prefix_depends_on_entry_kind() {
    let start = InvocationError::CallException {
        kind: EntryKind::Start,
        fault: UnitFault::Raised("boom".to_string()),
    };
    assert_eq!(start.to_string(), "Error: boom");

    let input = InvocationError::CallException {
        kind: EntryKind::Input,
        fault: UnitFault::Disconnected,
    };
    assert_eq!(
        input.to_string(),
        "Error sending input: unit is no longer running"
    );
}

#[test]
fn not_ready_reports_status() {
    let e = InvocationError::NotReady {
        program: "jukebox".to_string(),
        status: "Loading".to_string(),
    };
    assert_eq!(e.to_string(), "[jukebox] Unit not ready. Status: Loading");
}
