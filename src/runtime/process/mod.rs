//! External units as child processes speaking the `wire` protocol over stdio, framed
//! with `lsp_server::Message`.
//!
//! Each unit gets a writer thread (owns stdin), a reader thread (owns stdout, routes
//! print notifications into the unit config and responses to waiting callers) and a
//! stderr thread that forwards raw stderr to the log.

pub mod wire;

use crate::kernel::error::{LoadError, UnitFault};
use crate::kernel::program::ProgramDescriptor;
use crate::kernel::unit::{UnitCall, UnitConfig, UnitFactory, UnitInstance, UnitSource, UnitValue};
use lsp_server::{Message, Request, RequestId, Response};
use rustc_hash::FxHashMap;
use serde_json::Value;
use std::io::{BufRead, BufReader, BufWriter};
use std::path::PathBuf;
use std::process::{Child, ChildStderr, ChildStdin, ChildStdout, Command, Stdio};
use std::sync::{mpsc, Arc, Mutex};
use std::time::{Duration, Instant};
use wire::{
    CallParams, CallResult, InstantiateParams, InstantiateResult, LocateParams, LocateResult,
    TextParams,
};

const EXIT_GRACE: Duration = Duration::from_millis(500);
const INSTANTIATE_ID: i32 = 0;

/// Fetches units from the local filesystem.
#[derive(Debug, Default, Clone, Copy)]
pub struct ProcessUnitSource;

impl UnitSource for ProcessUnitSource {
    fn fetch(&self, descriptor: &ProgramDescriptor) -> Result<Box<dyn UnitFactory>, LoadError> {
        let location = descriptor.load_location.clone();
        let path = PathBuf::from(&location);
        let meta = std::fs::metadata(&path).map_err(|e| LoadError::network(&location, e))?;
        if !meta.is_file() {
            return Err(LoadError::network(&location, "not a regular file"));
        }

        Ok(Box::new(ProcessFactory {
            program: descriptor.id.clone(),
            location,
            path,
            args: descriptor.args.clone(),
        }))
    }
}

struct ProcessFactory {
    program: String,
    location: String,
    path: PathBuf,
    args: Vec<String>,
}

impl UnitFactory for ProcessFactory {
    fn instantiate(self: Box<Self>, config: UnitConfig) -> Result<Box<dyn UnitInstance>, LoadError> {
        let ProcessFactory {
            program,
            location,
            path,
            args,
        } = *self;

        let mut child = Command::new(&path)
            .args(&args)
            .stdin(Stdio::piped())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .spawn()
            .map_err(|e| LoadError::instantiation(&location, format!("spawn failed: {e}")))?;

        let pipes = (child.stdin.take(), child.stdout.take(), child.stderr.take());
        let (Some(stdin), Some(stdout), Some(stderr)) = pipes else {
            kill_child(&mut child);
            return Err(LoadError::instantiation(&location, "stdio unavailable"));
        };

        let pending = Arc::new(Mutex::new(PendingCalls::default()));
        let (tx, rx) = mpsc::channel::<Message>();
        let outgoing: Outgoing = Arc::new(Mutex::new(Some(tx)));

        let spawned = spawn_loops(SpawnArgs {
            program: program.clone(),
            stdin,
            stdout,
            stderr,
            rx,
            outgoing: outgoing.clone(),
            pending: pending.clone(),
            config: config.clone(),
        });
        if let Err(e) = spawned {
            kill_child(&mut child);
            return Err(LoadError::instantiation(&location, format!("thread spawn: {e}")));
        }

        let mut unit = ProcessUnit {
            program,
            exports: Vec::new(),
            main: false,
            next_id: INSTANTIATE_ID + 1,
            outgoing,
            pending,
            child,
            exited: false,
        };

        let asset_dir = (config.resolve_auxiliary_file)("");
        let params = InstantiateParams {
            protocol_version: wire::PROTOCOL_VERSION,
            asset_dir: Some(asset_dir),
        };

        let reply = unit.request(wire::request(
            INSTANTIATE_ID,
            wire::METHOD_INSTANTIATE,
            params,
        ));
        let handshake = match reply {
            Reply::Result(value) => serde_json::from_value::<InstantiateResult>(value)
                .map_err(|e| LoadError::malformed(&location, format!("bad factory shape: {e}"))),
            Reply::Error(message) => Err(LoadError::instantiation(&location, message)),
            Reply::Closed(Closed::Malformed(reason)) => Err(LoadError::malformed(&location, reason)),
            Reply::Closed(Closed::Exited) => Err(LoadError::instantiation(
                &location,
                "unit exited before it was instantiated",
            )),
        };

        match handshake {
            Ok(result) => {
                tracing::debug!(
                    program = %unit.program,
                    exports = ?result.exports,
                    main = result.main,
                    "unit instantiated"
                );
                unit.exports = result.exports;
                unit.main = result.main;
                Ok(Box::new(unit))
            }
            Err(e) => {
                unit.kill();
                Err(e)
            }
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Closed {
    Exited,
    Malformed(String),
}

#[derive(Debug)]
enum Reply {
    Result(Value),
    Error(String),
    Closed(Closed),
}

/// Sender side of the writer thread, shared with the reader so it can answer unit
/// requests. Taking it out closes stdin once the writer drains.
type Outgoing = Arc<Mutex<Option<mpsc::Sender<Message>>>>;

enum Waiter {
    Blocking(mpsc::Sender<Reply>),
    Detached,
}

#[derive(Default)]
struct PendingCalls {
    waiters: FxHashMap<RequestId, Waiter>,
    closed: Option<Closed>,
}

impl PendingCalls {
    fn register(&mut self, id: RequestId, waiter: Waiter) -> Result<(), Closed> {
        if let Some(closed) = self.closed.clone() {
            return Err(closed);
        }
        self.waiters.insert(id, waiter);
        Ok(())
    }

    fn close(&mut self, reason: Closed) {
        if self.closed.is_none() {
            self.closed = Some(reason.clone());
        }
        for (_, waiter) in self.waiters.drain() {
            if let Waiter::Blocking(tx) = waiter {
                let _ = tx.send(Reply::Closed(reason.clone()));
            }
        }
    }
}

fn lock_pending(pending: &Mutex<PendingCalls>) -> std::sync::MutexGuard<'_, PendingCalls> {
    match pending.lock() {
        Ok(guard) => guard,
        Err(poisoned) => poisoned.into_inner(),
    }
}

pub struct ProcessUnit {
    program: String,
    exports: Vec<String>,
    main: bool,
    next_id: i32,
    outgoing: Outgoing,
    pending: Arc<Mutex<PendingCalls>>,
    child: Child,
    exited: bool,
}

impl ProcessUnit {
    fn next_id(&mut self) -> RequestId {
        let id = self.next_id;
        self.next_id = self.next_id.wrapping_add(1).max(INSTANTIATE_ID + 1);
        RequestId::from(id)
    }

    fn send(&self, msg: Message) -> bool {
        send_outgoing(&self.outgoing, msg)
    }

    fn close_stdin(&self) {
        if let Ok(mut tx) = self.outgoing.lock() {
            tx.take();
        }
    }

    /// Sends a request and blocks until its response (or the unit going away).
    fn request(&mut self, req: Request) -> Reply {
        let id = req.id.clone();
        let (reply_tx, reply_rx) = mpsc::channel();
        if let Err(closed) =
            lock_pending(&self.pending).register(id.clone(), Waiter::Blocking(reply_tx))
        {
            return Reply::Closed(closed);
        }

        if !self.send(Message::Request(req)) {
            lock_pending(&self.pending).waiters.remove(&id);
            return Reply::Closed(Closed::Exited);
        }

        reply_rx.recv().unwrap_or(Reply::Closed(Closed::Exited))
    }

    fn kill(&mut self) {
        self.close_stdin();
        kill_child(&mut self.child);
        self.exited = true;
    }
}

impl UnitInstance for ProcessUnit {
    fn exports(&self, name: &str) -> bool {
        self.exports.iter().any(|e| e == name)
    }

    fn has_main(&self) -> bool {
        self.main
    }

    fn call(&mut self, call: UnitCall) -> Result<Option<UnitValue>, UnitFault> {
        let id = self.next_id();
        let is_async = call.options.mode.is_async();
        let params = CallParams {
            name: call.name,
            returns: call.returns,
            arg_types: call.arg_kinds,
            args: call.args,
            is_async,
        };
        let req = wire::request(id.clone(), wire::METHOD_CALL, params);

        if is_async {
            if lock_pending(&self.pending)
                .register(id.clone(), Waiter::Detached)
                .is_err()
            {
                return Err(UnitFault::Disconnected);
            }
            if !self.send(Message::Request(req)) {
                lock_pending(&self.pending).waiters.remove(&id);
                return Err(UnitFault::Disconnected);
            }
            return Ok(None);
        }

        match self.request(req) {
            Reply::Result(value) => Ok(call_value(value)),
            Reply::Error(message) => Err(UnitFault::Raised(message)),
            Reply::Closed(_) => Err(UnitFault::Disconnected),
        }
    }

    fn has_exit(&self) -> bool {
        true
    }

    fn exit(&mut self) -> Result<(), UnitFault> {
        if self.exited {
            return Ok(());
        }
        self.exited = true;

        let notified = self.send(wire::notification(wire::METHOD_EXIT, Value::Null));
        self.close_stdin();

        let deadline = Instant::now() + EXIT_GRACE;
        loop {
            match self.child.try_wait() {
                Ok(Some(status)) => {
                    tracing::debug!(program = %self.program, %status, "unit exited");
                    break;
                }
                Ok(None) if Instant::now() < deadline => {
                    std::thread::sleep(Duration::from_millis(10));
                }
                Ok(None) => {
                    tracing::warn!(program = %self.program, "unit ignored exit, killing");
                    kill_child(&mut self.child);
                    break;
                }
                Err(e) => {
                    kill_child(&mut self.child);
                    return Err(UnitFault::Io(e.to_string()));
                }
            }
        }

        if notified {
            Ok(())
        } else {
            Err(UnitFault::Disconnected)
        }
    }
}

impl Drop for ProcessUnit {
    fn drop(&mut self) {
        if !self.exited {
            self.kill();
        }
    }
}

fn call_value(result: Value) -> Option<UnitValue> {
    serde_json::from_value::<CallResult>(result)
        .ok()
        .and_then(|r| r.value)
}

fn send_outgoing(outgoing: &Outgoing, msg: Message) -> bool {
    outgoing
        .lock()
        .ok()
        .and_then(|tx| tx.as_ref().map(|tx| tx.send(msg).is_ok()))
        .unwrap_or(false)
}

fn kill_child(child: &mut Child) {
    let _ = child.kill();
    let _ = child.wait();
}

struct SpawnArgs {
    program: String,
    stdin: ChildStdin,
    stdout: ChildStdout,
    stderr: ChildStderr,
    rx: mpsc::Receiver<Message>,
    outgoing: Outgoing,
    pending: Arc<Mutex<PendingCalls>>,
    config: UnitConfig,
}

fn spawn_loops(args: SpawnArgs) -> std::io::Result<()> {
    let SpawnArgs {
        program,
        stdin,
        stdout,
        stderr,
        rx,
        outgoing,
        pending,
        config,
    } = args;

    std::thread::Builder::new()
        .name(format!("unit-{program}-writer"))
        .spawn({
            let program = program.clone();
            move || writer_loop(program, stdin, rx)
        })?;

    std::thread::Builder::new()
        .name(format!("unit-{program}-reader"))
        .spawn({
            let program = program.clone();
            move || reader_loop(program, stdout, outgoing, pending, config)
        })?;

    std::thread::Builder::new()
        .name(format!("unit-{program}-stderr"))
        .spawn(move || stderr_loop(program, stderr))?;

    Ok(())
}

fn writer_loop(program: String, stdin: ChildStdin, rx: mpsc::Receiver<Message>) {
    let mut writer = BufWriter::new(stdin);
    while let Ok(msg) = rx.recv() {
        if let Err(e) = msg.write(&mut writer) {
            tracing::debug!(program = %program, error = %e, "unit stdin closed");
            break;
        }
    }
    tracing::debug!(program = %program, "unit writer loop ended");
}

fn reader_loop(
    program: String,
    stdout: ChildStdout,
    outgoing: Outgoing,
    pending: Arc<Mutex<PendingCalls>>,
    config: UnitConfig,
) {
    let mut reader = BufReader::new(stdout);

    let closed = loop {
        match Message::read(&mut reader) {
            Ok(Some(msg)) => {
                handle_message(&program, msg, &outgoing, &pending, &config);
            }
            Ok(None) => break Closed::Exited,
            Err(e) if wire::is_protocol_violation(&e) => {
                tracing::warn!(program = %program, error = %e, "unit broke protocol");
                break Closed::Malformed(e.to_string());
            }
            Err(e) => {
                tracing::debug!(program = %program, error = %e, "unit stdout closed");
                break Closed::Exited;
            }
        }
    };

    lock_pending(&pending).close(closed);
    if let Ok(mut tx) = outgoing.lock() {
        tx.take();
    }
    drain(&mut reader);
    tracing::debug!(program = %program, "unit reader loop ended");
}

fn handle_message(
    program: &str,
    msg: Message,
    outgoing: &Outgoing,
    pending: &Mutex<PendingCalls>,
    config: &UnitConfig,
) {
    match msg {
        Message::Notification(not) => match not.method.as_str() {
            wire::METHOD_PRINT => {
                if let Ok(p) = serde_json::from_value::<TextParams>(not.params) {
                    (config.on_standard_output)(&p.text);
                }
            }
            wire::METHOD_PRINT_ERR => {
                if let Ok(p) = serde_json::from_value::<TextParams>(not.params) {
                    (config.on_error_output)(&p.text);
                }
            }
            other => {
                tracing::debug!(program = %program, method = %other, "ignoring unit notification");
            }
        },
        Message::Request(req) => {
            let response = match req.method.as_str() {
                wire::METHOD_LOCATE => match serde_json::from_value::<LocateParams>(req.params) {
                    Ok(p) => Message::Response(Response::new_ok(
                        req.id,
                        LocateResult {
                            path: (config.resolve_auxiliary_file)(&p.name),
                        },
                    )),
                    Err(e) => wire::call_failed(req.id, e.to_string()),
                },
                other => wire::method_not_found(req.id, other),
            };
            if !send_outgoing(outgoing, response) {
                tracing::debug!(program = %program, "dropping reply to unit request");
            }
        }
        Message::Response(resp) => {
            let waiter = lock_pending(pending).waiters.remove(&resp.id);
            let Some(waiter) = waiter else {
                tracing::debug!(program = %program, id = %resp.id, "response for unknown call");
                return;
            };
            match (waiter, resp.error) {
                (Waiter::Blocking(tx), None) => {
                    let _ = tx.send(Reply::Result(resp.result.unwrap_or(Value::Null)));
                }
                (Waiter::Blocking(tx), Some(error)) => {
                    let _ = tx.send(Reply::Error(error.message));
                }
                (Waiter::Detached, None) => {}
                (Waiter::Detached, Some(error)) => {
                    tracing::warn!(program = %program, id = %resp.id, error = %error.message, "async call failed");
                    (config.on_error_output)(&error.message);
                }
            }
        }
    }
}

/// Keeps the pipe drained after a protocol violation so the unit never blocks on a
/// full stdout before it is killed.
fn drain(reader: &mut BufReader<ChildStdout>) {
    loop {
        let len = match reader.fill_buf() {
            Ok([]) | Err(_) => return,
            Ok(buf) => buf.len(),
        };
        reader.consume(len);
    }
}

fn stderr_loop(program: String, stderr: ChildStderr) {
    let reader = BufReader::new(stderr);
    for line in reader.lines() {
        let Ok(line) = line else {
            break;
        };
        tracing::warn!(program = %program, stderr = %line, "unit stderr");
    }
}

#[cfg(test)]
#[path = "../../../tests/unit/runtime/process.rs"]
mod tests;
