//! In-memory units for exercising the bridge and adapter without processes.

use super::error::{LoadError, UnitFault};
use super::program::{InvocationMode, ProgramDescriptor};
use super::unit::{UnitCall, UnitConfig, UnitFactory, UnitInstance, UnitSource, UnitValue};
use std::collections::HashMap;
use std::sync::{Arc, Mutex};

/// What a fake unit prints when a capability is called.
#[derive(Clone, Default)]
pub struct Script {
    pub exports: Vec<String>,
    pub main: bool,
    pub exit: bool,
    pub exit_fails: bool,
    pub raise_on: Option<String>,
}

impl Script {
    pub fn exporting(names: &[&str]) -> Self {
        Self {
            exports: names.iter().map(|n| n.to_string()).collect(),
            ..Self::default()
        }
    }
}

#[derive(Default)]
pub struct Journal {
    pub calls: Vec<UnitCall>,
    pub exits: usize,
    pub instantiated: usize,
}

pub type SharedJournal = Arc<Mutex<Journal>>;

pub struct FakeUnit {
    script: Script,
    config: UnitConfig,
    journal: SharedJournal,
}

impl UnitInstance for FakeUnit {
    fn exports(&self, name: &str) -> bool {
        self.script.exports.iter().any(|n| n == name)
    }

    fn has_main(&self) -> bool {
        self.script.main
    }

    fn call(&mut self, call: UnitCall) -> Result<Option<UnitValue>, UnitFault> {
        self.journal.lock().unwrap().calls.push(call.clone());
        if self.script.raise_on.as_deref() == Some(call.name.as_str()) {
            return Err(UnitFault::Raised(format!("{} exploded", call.name)));
        }

        if call.options.mode == InvocationMode::Async {
            return Ok(None);
        }

        let detail = match call.args.first() {
            Some(UnitValue::String(text)) => format!("{}({text})", call.name),
            _ => format!("{}()", call.name),
        };
        (self.config.on_standard_output)(&detail);
        Ok(None)
    }

    fn has_exit(&self) -> bool {
        self.script.exit
    }

    fn exit(&mut self) -> Result<(), UnitFault> {
        self.journal.lock().unwrap().exits += 1;
        if self.script.exit_fails {
            return Err(UnitFault::Raised("exit failed".to_string()));
        }
        Ok(())
    }
}

struct FakeFactory {
    outcome: Result<Script, LoadError>,
    journal: SharedJournal,
}

impl UnitFactory for FakeFactory {
    fn instantiate(self: Box<Self>, config: UnitConfig) -> Result<Box<dyn UnitInstance>, LoadError> {
        let FakeFactory { outcome, journal } = *self;
        let script = outcome?;
        journal.lock().unwrap().instantiated += 1;
        Ok(Box::new(FakeUnit {
            script,
            config,
            journal,
        }))
    }
}

/// Source keyed by load location. Unknown locations fail to fetch.
#[derive(Default)]
pub struct FakeSource {
    units: HashMap<String, Result<Script, LoadError>>,
    pub journal: SharedJournal,
}

impl FakeSource {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_unit(mut self, location: &str, script: Script) -> Self {
        self.units.insert(location.to_string(), Ok(script));
        self
    }

    pub fn with_failure(mut self, location: &str, error: LoadError) -> Self {
        self.units.insert(location.to_string(), Err(error));
        self
    }

    pub fn journal(&self) -> SharedJournal {
        self.journal.clone()
    }
}

impl UnitSource for FakeSource {
    fn fetch(&self, descriptor: &ProgramDescriptor) -> Result<Box<dyn UnitFactory>, LoadError> {
        let location = descriptor.load_location.as_str();
        let outcome = self
            .units
            .get(location)
            .cloned()
            .ok_or_else(|| LoadError::network(location, "404 Not Found"))?;
        Ok(Box::new(FakeFactory {
            outcome,
            journal: self.journal.clone(),
        }))
    }
}

pub fn descriptor(id: &str) -> ProgramDescriptor {
    ProgramDescriptor::new(id, format!("{id} program"), format!("units/{id}"))
}
