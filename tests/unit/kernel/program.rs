use super::*;

#[test]
fn init_entry_follows_program_id() {
    assert_eq!(init_entry_name("inventory", None), "init_inventory");
    assert_eq!(init_entry_name("grades", Some("start_here")), "start_here");
}

#[test]
fn input_entry_uses_convention_and_exceptions() {
    assert_eq!(input_entry_name("minigame", None), "process_minigame_guess");
    assert_eq!(input_entry_name("grades", None), "process_grades_input");
    assert_eq!(input_entry_name("inventory", None), "process_inventory_input");
}

#[test]
fn input_override_wins_over_exception_table() {
    assert_eq!(input_entry_name("minigame", Some("guess")), "guess");
    assert_eq!(input_entry_name("grades", Some("on_line")), "on_line");
}

#[test]
fn descriptor_entry_points_apply_overrides() {
    let plain = ProgramDescriptor::new("minigame", "Minigame", "units/minigame");
    assert_eq!(
        plain.entry_points(),
        EntryPoints {
            init: "init_minigame".to_string(),
            input: "process_minigame_guess".to_string(),
        }
    );

    let custom = ProgramDescriptor::new("grades", "Grades", "units/grades")
        .with_init_entry("boot")
        .with_input_entry("feed");
    let entries = custom.entry_points();
    assert_eq!(entries.init, "boot");
    assert_eq!(entries.input, "feed");
}

#[test]
fn descriptor_defaults_to_sync_mode() {
    let d = ProgramDescriptor::new("inventory", "Inventory", "units/inventory");
    assert_eq!(d.invocation_mode, InvocationMode::Sync);
    assert!(!d.invocation_mode.is_async());
    assert!(d.with_mode(InvocationMode::Async).invocation_mode.is_async());
}

#[test]
fn auxiliary_location_replaces_last_segment() {
    assert_eq!(
        auxiliary_location("/opt/units/jukebox", "song1.txt"),
        "/opt/units/song1.txt"
    );
    assert_eq!(auxiliary_location("units/a/b", ""), "units/a/");
    assert_eq!(auxiliary_location("jukebox", "song1.txt"), "song1.txt");
}

#[test]
fn invocation_mode_reads_lowercase_json() {
    let mode: InvocationMode = serde_json::from_str("\"async\"").unwrap();
    assert_eq!(mode, InvocationMode::Async);
    let mode: InvocationMode = serde_json::from_str("\"sync\"").unwrap();
    assert_eq!(mode, InvocationMode::Sync);
}
