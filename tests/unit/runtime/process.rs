use super::*;
use crate::kernel::testing::descriptor;
use serde_json::json;

#[derive(Default, Clone)]
struct Recorded {
    stdout: Arc<Mutex<Vec<String>>>,
    stderr: Arc<Mutex<Vec<String>>>,
}

fn recording_config() -> (UnitConfig, Recorded) {
    let recorded = Recorded::default();
    let stdout = recorded.stdout.clone();
    let stderr = recorded.stderr.clone();
    let config = UnitConfig {
        on_standard_output: Arc::new(move |text: &str| stdout.lock().unwrap().push(text.into())),
        on_error_output: Arc::new(move |text: &str| stderr.lock().unwrap().push(text.into())),
        resolve_auxiliary_file: Arc::new(|name: &str| format!("/assets/{name}")),
    };
    (config, recorded)
}

fn outgoing_pair() -> (Outgoing, mpsc::Receiver<Message>) {
    let (tx, rx) = mpsc::channel();
    (Arc::new(Mutex::new(Some(tx))), rx)
}

#[test]
fn closing_pending_calls_wakes_blocking_waiters() {
    let mut pending = PendingCalls::default();
    let (tx, rx) = mpsc::channel();
    pending.register(RequestId::from(1), Waiter::Blocking(tx)).unwrap();
    pending.register(RequestId::from(2), Waiter::Detached).unwrap();

    pending.close(Closed::Malformed("bad frame".to_string()));

    assert!(matches!(
        rx.try_recv(),
        Ok(Reply::Closed(Closed::Malformed(reason))) if reason == "bad frame"
    ));
    assert!(pending.waiters.is_empty());
}

#[test]
fn registering_after_close_fails_with_first_reason() {
    let mut pending = PendingCalls::default();
    pending.close(Closed::Exited);
    pending.close(Closed::Malformed("later".to_string()));

    let (tx, _rx) = mpsc::channel();
    assert_eq!(
        pending.register(RequestId::from(5), Waiter::Blocking(tx)).err(),
        Some(Closed::Exited)
    );
}

#[test]
fn call_value_reads_value_field() {
    assert_eq!(
        call_value(json!({ "value": "ok" })),
        Some(UnitValue::String("ok".to_string()))
    );
    assert_eq!(call_value(json!({ "value": 2.5 })), Some(UnitValue::Number(2.5)));
    assert_eq!(call_value(json!({ "value": null })), None);
    assert_eq!(call_value(json!({})), None);
}

#[test]
fn print_notifications_reach_config_callbacks() {
    let (config, recorded) = recording_config();
    let (outgoing, _rx) = outgoing_pair();
    let pending = Mutex::new(PendingCalls::default());

    for (method, text) in [
        (wire::METHOD_PRINT, "hello"),
        (wire::METHOD_PRINT_ERR, "oops"),
        ("unit/unknown", "ignored"),
    ] {
        let msg = wire::notification(method, TextParams { text: text.into() });
        handle_message("echo", msg, &outgoing, &pending, &config);
    }

    assert_eq!(*recorded.stdout.lock().unwrap(), vec!["hello".to_string()]);
    assert_eq!(*recorded.stderr.lock().unwrap(), vec!["oops".to_string()]);
}

#[test]
fn locate_requests_are_answered_with_resolved_path() {
    let (config, _recorded) = recording_config();
    let (outgoing, rx) = outgoing_pair();
    let pending = Mutex::new(PendingCalls::default());

    let msg = Message::Request(wire::request(
        9,
        wire::METHOD_LOCATE,
        LocateParams {
            name: "inventory.json".into(),
        },
    ));
    handle_message("inventory", msg, &outgoing, &pending, &config);

    match rx.try_recv() {
        Ok(Message::Response(resp)) => {
            assert_eq!(resp.id, RequestId::from(9));
            assert_eq!(resp.result.unwrap()["path"], "/assets/inventory.json");
        }
        other => panic!("unexpected reply: {other:?}"),
    }
}

#[test]
fn unknown_unit_requests_get_method_not_found() {
    let (config, _recorded) = recording_config();
    let (outgoing, rx) = outgoing_pair();
    let pending = Mutex::new(PendingCalls::default());

    let msg = Message::Request(wire::request(3, "unit/launchMissiles", json!({})));
    handle_message("echo", msg, &outgoing, &pending, &config);

    assert!(matches!(
        rx.try_recv(),
        Ok(Message::Response(Response { error: Some(e), .. }))
            if e.code == wire::ERROR_METHOD_NOT_FOUND
    ));
}

#[test]
fn responses_route_to_their_waiters() {
    let (config, recorded) = recording_config();
    let (outgoing, _rx) = outgoing_pair();
    let pending = Mutex::new(PendingCalls::default());
    let (tx, rx) = mpsc::channel();
    {
        let mut guard = lock_pending(&pending);
        guard.register(RequestId::from(1), Waiter::Blocking(tx)).unwrap();
        guard.register(RequestId::from(2), Waiter::Detached).unwrap();
    }

    handle_message(
        "jukebox",
        Message::Response(Response::new_ok(RequestId::from(1), json!({ "value": null }))),
        &outgoing,
        &pending,
        &config,
    );
    handle_message(
        "jukebox",
        wire::call_failed(RequestId::from(2), "song missing"),
        &outgoing,
        &pending,
        &config,
    );
    handle_message(
        "jukebox",
        Message::Response(Response::new_ok(RequestId::from(77), json!({}))),
        &outgoing,
        &pending,
        &config,
    );

    assert!(matches!(rx.try_recv(), Ok(Reply::Result(_))));
    assert_eq!(
        *recorded.stderr.lock().unwrap(),
        vec!["song missing".to_string()]
    );
    assert!(lock_pending(&pending).waiters.is_empty());
}

#[test]
fn sending_after_outgoing_is_taken_fails() {
    let (outgoing, _rx) = outgoing_pair();
    assert!(send_outgoing(&outgoing, wire::notification(wire::METHOD_EXIT, json!({}))));

    outgoing.lock().unwrap().take();
    assert!(!send_outgoing(&outgoing, wire::notification(wire::METHOD_EXIT, json!({}))));
}

#[test]
fn missing_artifact_is_network_failure() {
    let dir = tempfile::tempdir().unwrap();
    let location = dir.path().join("missing-unit");
    let program = descriptor("echo");
    let program = ProgramDescriptor {
        load_location: location.to_string_lossy().to_string(),
        ..program
    };

    let err = ProcessUnitSource.fetch(&program).err().unwrap();
    assert!(matches!(err, LoadError::NetworkFailure { .. }));
}

#[test]
fn directory_artifact_is_network_failure() {
    let dir = tempfile::tempdir().unwrap();
    let program = ProgramDescriptor {
        load_location: dir.path().to_string_lossy().to_string(),
        ..descriptor("echo")
    };

    let err = ProcessUnitSource.fetch(&program).err().unwrap();
    assert!(matches!(
        err,
        LoadError::NetworkFailure { ref detail, .. } if detail == "not a regular file"
    ));
}

#[cfg(unix)]
#[test]
fn non_executable_artifact_fails_to_instantiate() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("plain.txt");
    std::fs::write(&path, "not a program").unwrap();
    let program = ProgramDescriptor {
        load_location: path.to_string_lossy().to_string(),
        ..descriptor("echo")
    };
    let (config, _recorded) = recording_config();

    let factory = ProcessUnitSource.fetch(&program).ok().unwrap();
    let err = factory.instantiate(config).err().unwrap();

    assert!(matches!(err, LoadError::InstantiationFailure { .. }));
    assert!(err.to_string().contains("spawn failed"));
}
