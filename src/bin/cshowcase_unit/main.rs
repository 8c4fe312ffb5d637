//! Demo unit: serves one gallery program over the stdio unit protocol.
//!
//! Usage: `cshowcase-unit <program>`. Env: `CSHOWCASE_UNIT_DELAY_MS` (jukebox pacing),
//! `CSHOWCASE_UNIT_SECRET` (minigame code).

mod grades;
mod host;
mod inventory;
mod jukebox;
mod minigame;
mod programs;

use cshowcase::kernel::UnitValue;
use cshowcase::runtime::process::wire::{self, CallParams, CallResult, InstantiateResult};
use host::Host;
use lsp_server::{Message, Request, RequestId, Response};
use programs::{Program, Setup};
use serde_json::json;
use std::io::{BufReader, BufWriter, Write};

fn main() {
    let name = std::env::args().nth(1).unwrap_or_default();
    let setup = match programs::lookup(&name) {
        Some(setup) => setup,
        None => {
            eprintln!("unknown program: {name:?}");
            std::process::exit(2);
        }
    };

    match setup {
        Setup::Crash => {
            eprintln!("crashing before handshake");
            std::process::exit(3);
        }
        Setup::Garbage => {
            let mut out = std::io::stdout();
            let _ = out.write_all(b"hello from a unit that never learned the protocol\r\n\r\n");
            let _ = out.flush();
            std::thread::sleep(std::time::Duration::from_millis(200));
            return;
        }
        Setup::Program(_) | Setup::Malformed => {}
    }

    let stdin = std::io::stdin();
    let stdout = std::io::stdout();
    let mut host = Host::new(BufReader::new(stdin.lock()), BufWriter::new(stdout.lock()));

    let mut program: Option<Box<dyn Program>> = None;

    loop {
        let msg = match host.next_message() {
            Ok(Some(msg)) => msg,
            Ok(None) => break,
            Err(e) => {
                eprintln!("protocol error: {e}");
                std::process::exit(1);
            }
        };

        match msg {
            Message::Request(req) => {
                let reply = match req.method.as_str() {
                    wire::METHOD_INSTANTIATE => instantiate(req.id, &setup, &mut program),
                    wire::METHOD_CALL => match program.as_mut() {
                        Some(program) => call(req, program.as_mut(), &mut host),
                        None => wire::call_failed(req.id, "not instantiated"),
                    },
                    other => wire::method_not_found(req.id, other),
                };
                host.send(reply);
            }
            Message::Notification(not) if not.method == wire::METHOD_EXIT => break,
            Message::Notification(_) | Message::Response(_) => {}
        }
    }
}

fn instantiate(id: RequestId, setup: &Setup, program: &mut Option<Box<dyn Program>>) -> Message {
    match setup {
        Setup::Malformed => Message::Response(Response::new_ok(id, json!({ "exports": 42 }))),
        Setup::Program(make) => {
            let instance = make();
            let result = InstantiateResult {
                exports: instance.exports().iter().map(|s| s.to_string()).collect(),
                main: instance.has_main(),
            };
            *program = Some(instance);
            Message::Response(Response::new_ok(id, result))
        }
        Setup::Crash | Setup::Garbage => wire::call_failed(id, "unreachable"),
    }
}

fn call<C: host::Console>(req: Request, program: &mut dyn Program, host: &mut C) -> Message {
    let params: CallParams = match serde_json::from_value(req.params) {
        Ok(params) => params,
        Err(e) => return wire::call_failed(req.id, e.to_string()),
    };

    let name = params.name.as_str();
    let known = program.exports().contains(&name) || (name == "main" && program.has_main());
    if !known {
        return wire::call_failed(req.id, format!("no such function: {name}"));
    }

    match program.call(host, name, &params.args) {
        Ok(value) => Message::Response(Response::new_ok(req.id, CallResult { value })),
        Err(message) => wire::call_failed(req.id, message),
    }
}

pub(crate) fn text_arg(args: &[UnitValue]) -> &str {
    match args.first() {
        Some(UnitValue::String(s)) => s.as_str(),
        _ => "",
    }
}
