//! Invocation adapter: turns "start" and "send this line" into capability calls on the
//! unit currently installed in a [`ModuleBridge`].
//!
//! Every failure is written to the bridge's sink as one line before it is returned, so
//! callers only need the `Result` for bookkeeping.

use super::bridge::{ModuleBridge, RunState, UnitStatus};
use super::error::{EntryKind, InvocationError};
use super::program::InvocationMode;
use super::unit::{UnitCall, UnitValue};

const MAIN_ENTRY: &str = "main";

pub fn start(bridge: &mut ModuleBridge) -> Result<RunState, InvocationError> {
    let result = try_start(bridge);
    report(bridge, &result);
    result
}

pub fn submit_line(bridge: &mut ModuleBridge, text: &str) -> Result<(), InvocationError> {
    let result = try_submit_line(bridge, text);
    report(bridge, &result);
    result
}

fn try_start(bridge: &mut ModuleBridge) -> Result<RunState, InvocationError> {
    ensure_ready(bridge)?;
    if bridge.run_state() == RunState::Running {
        return Ok(RunState::Running);
    }

    let Some(descriptor) = bridge.descriptor().cloned() else {
        return Err(not_ready(bridge));
    };
    let entry = descriptor.entry_points().init;
    let sink = bridge.sink().clone();
    let Some(instance) = bridge.instance_mut() else {
        return Err(not_ready(bridge));
    };

    let target = if instance.exports(&entry) {
        entry
    } else if instance.has_main() {
        tracing::info!(program = %descriptor.id, missing = %entry, "falling back to main");
        MAIN_ENTRY.to_string()
    } else {
        return Err(InvocationError::MissingStartEntry {
            program: descriptor.id,
            entry,
        });
    };

    sink.notice(format!("--- Initializing {} ---", descriptor.display_name));
    tracing::debug!(program = %descriptor.id, entry = %target, "calling init");
    instance
        .call(UnitCall::void(target))
        .map_err(|fault| InvocationError::CallException {
            kind: EntryKind::Start,
            fault,
        })?;

    bridge.mark_running();
    Ok(bridge.run_state())
}

fn try_submit_line(bridge: &mut ModuleBridge, text: &str) -> Result<(), InvocationError> {
    if text.trim().is_empty() {
        return Err(InvocationError::EmptyInput);
    }
    ensure_ready(bridge)?;

    let Some(descriptor) = bridge.descriptor().cloned() else {
        return Err(not_ready(bridge));
    };
    let entry = descriptor.entry_points().input;
    let mode = descriptor.invocation_mode;
    let sink = bridge.sink().clone();
    let Some(instance) = bridge.instance_mut() else {
        return Err(not_ready(bridge));
    };

    sink.echo(text);
    if !instance.exports(&entry) {
        return Err(InvocationError::MissingInputEntry {
            program: descriptor.id,
            entry,
        });
    }

    tracing::debug!(program = %descriptor.id, entry = %entry, ?mode, "sending input");
    let call = UnitCall::void(entry)
        .with_arg(UnitValue::String(text.to_string()))
        .with_mode(mode);

    match instance.call(call) {
        Ok(_) => Ok(()),
        Err(fault) => {
            if mode == InvocationMode::Async {
                tracing::warn!(program = %descriptor.id, error = %fault, "async input not issued");
            }
            Err(InvocationError::CallException {
                kind: EntryKind::Input,
                fault,
            })
        }
    }
}

fn ensure_ready(bridge: &ModuleBridge) -> Result<(), InvocationError> {
    if bridge.status() == UnitStatus::Ready {
        Ok(())
    } else {
        Err(not_ready(bridge))
    }
}

fn not_ready(bridge: &ModuleBridge) -> InvocationError {
    InvocationError::NotReady {
        program: bridge
            .descriptor()
            .map(|d| d.id.clone())
            .unwrap_or_else(|| "none".to_string()),
        status: bridge.status().to_string(),
    }
}

fn report<T>(bridge: &ModuleBridge, result: &Result<T, InvocationError>) {
    let Err(e) = result else {
        return;
    };
    match e {
        InvocationError::EmptyInput => {}
        InvocationError::CallException { .. } => {
            tracing::error!(error = %e, "unit call raised");
        }
        _ => tracing::warn!(error = %e, "invocation rejected"),
    }
    bridge.sink().notice(e.to_string());
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/invoke.rs"]
mod tests;
