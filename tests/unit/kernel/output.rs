use super::*;

#[test]
fn lines_render_with_kind_prefix() {
    assert_eq!(OutputLine::new(LineKind::Standard, "hi").render(), "hi");
    assert_eq!(OutputLine::new(LineKind::Error, "bad").render(), "ERROR: bad");
    assert_eq!(OutputLine::new(LineKind::Echo, "42").render(), "> 42");
    assert_eq!(OutputLine::new(LineKind::Notice, "note").render(), "note");
    assert_eq!(
        OutputLine::new(LineKind::Fatal, "gone").render(),
        "FATAL ERROR: gone"
    );
}

#[test]
fn sink_appends_in_order() {
    let sink = OutputSink::new();
    sink.notice("--- Initializing Demo ---");
    sink.standard("a");
    sink.echo("b");
    sink.error("c");

    assert_eq!(
        sink.rendered(),
        vec!["--- Initializing Demo ---", "a", "> b", "ERROR: c"]
    );
}

#[test]
fn appends_never_rewrite_earlier_lines() {
    let sink = OutputSink::new();
    sink.standard("first");
    let before = sink.lines();
    sink.standard("second");
    sink.fatal("third");

    let after = sink.lines();
    assert_eq!(&after[..before.len()], &before[..]);
    assert_eq!(after.len(), 3);
}

#[test]
fn version_moves_on_every_mutation() {
    let sink = OutputSink::new();
    let v0 = sink.version();
    sink.standard("x");
    let v1 = sink.version();
    assert_ne!(v0, v1);
    sink.clear();
    assert_ne!(sink.version(), v1);
    assert!(sink.is_empty());
}

#[test]
fn channel_splits_printed_text_into_lines() {
    let sink = OutputSink::new();
    let channel = sink.channel(0);
    channel.standard("one\r\ntwo\n");
    channel.error("three");

    assert_eq!(sink.rendered(), vec!["one", "two", "ERROR: three"]);
}

#[test]
fn channel_keeps_interior_blank_lines() {
    let sink = OutputSink::new();
    sink.channel(0).standard("\nMenu\n\n0: Quit\n");

    assert_eq!(sink.rendered(), vec!["", "Menu", "", "0: Quit"]);
}

#[test]
fn retired_channel_is_silenced() {
    let sink = OutputSink::new();
    let old = sink.channel(1);
    sink.set_active_generation(1);
    old.standard("kept");

    sink.set_active_generation(2);
    let new = sink.channel(2);
    old.standard("dropped");
    new.standard("fresh");

    assert_eq!(sink.rendered(), vec!["kept", "fresh"]);
    assert_eq!(old.generation(), 1);
}

#[test]
fn clones_share_one_log() {
    let sink = OutputSink::new();
    let other = sink.clone();
    other.standard("shared");
    assert_eq!(sink.len(), 1);
    assert_eq!(sink.with_lines(|lines| lines[0].text.clone()), "shared");
}
