//! Contract between the host and an external executable unit.
//!
//! A `UnitSource` fetches the artifact named by a descriptor and yields a factory; the
//! factory is called once with a `UnitConfig` and produces the instance whose named
//! capabilities the invocation adapter calls.

use super::error::{LoadError, UnitFault};
use super::program::{InvocationMode, ProgramDescriptor};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ValueKind {
    Void,
    Number,
    String,
    Boolean,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum UnitValue {
    Number(f64),
    String(String),
    Boolean(bool),
}

impl UnitValue {
    pub fn kind(&self) -> ValueKind {
        match self {
            UnitValue::Number(_) => ValueKind::Number,
            UnitValue::String(_) => ValueKind::String,
            UnitValue::Boolean(_) => ValueKind::Boolean,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct CallOptions {
    pub mode: InvocationMode,
}

/// One capability call: `(name, returnKind, argumentKinds, argumentValues, options)`.
#[derive(Debug, Clone, PartialEq)]
pub struct UnitCall {
    pub name: String,
    pub returns: ValueKind,
    pub arg_kinds: Vec<ValueKind>,
    pub args: Vec<UnitValue>,
    pub options: CallOptions,
}

impl UnitCall {
    pub fn void(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            returns: ValueKind::Void,
            arg_kinds: Vec::new(),
            args: Vec::new(),
            options: CallOptions::default(),
        }
    }

    pub fn with_arg(mut self, value: UnitValue) -> Self {
        self.arg_kinds.push(value.kind());
        self.args.push(value);
        self
    }

    pub fn with_mode(mut self, mode: InvocationMode) -> Self {
        self.options.mode = mode;
        self
    }
}

pub type OutputCallback = Arc<dyn Fn(&str) + Send + Sync>;
pub type LocateCallback = Arc<dyn Fn(&str) -> String + Send + Sync>;

/// Configuration handed to a unit factory.
#[derive(Clone)]
pub struct UnitConfig {
    pub on_standard_output: OutputCallback,
    pub on_error_output: OutputCallback,
    pub resolve_auxiliary_file: LocateCallback,
}

impl fmt::Debug for UnitConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("UnitConfig").finish_non_exhaustive()
    }
}

pub trait UnitInstance: Send {
    /// Whether a named capability is exported.
    fn exports(&self, name: &str) -> bool;

    /// Whether the conventional program entry (`main`) is exported.
    fn has_main(&self) -> bool;

    /// Calls a capability. In async mode the call returns as soon as it has been issued
    /// and the returned value is always `None`.
    fn call(&mut self, call: UnitCall) -> Result<Option<UnitValue>, UnitFault>;

    fn has_exit(&self) -> bool {
        false
    }

    fn exit(&mut self) -> Result<(), UnitFault> {
        Ok(())
    }
}

pub trait UnitFactory: Send {
    fn instantiate(self: Box<Self>, config: UnitConfig)
        -> Result<Box<dyn UnitInstance>, LoadError>;
}

pub trait UnitSource: Send + Sync {
    fn fetch(&self, descriptor: &ProgramDescriptor) -> Result<Box<dyn UnitFactory>, LoadError>;
}

/// Best-effort shutdown used whenever an instance is retired.
pub(crate) fn shutdown_instance(program: &str, instance: &mut dyn UnitInstance) {
    if !instance.has_exit() {
        return;
    }
    if let Err(e) = instance.exit() {
        tracing::warn!(program = %program, error = %e, "error calling exit on retired unit");
    }
}
