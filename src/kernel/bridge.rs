//! Module bridge: owns the one external unit a hosting surface may have at a time.
//!
//! Loads are tagged with a generation. Retiring the current unit (a new load or a
//! teardown) advances the generation, so completions and output from anything older
//! are discarded instead of being applied to the current slot.

use super::error::LoadError;
use super::output::OutputSink;
use super::program::{auxiliary_location, ProgramDescriptor};
use super::unit::{shutdown_instance, UnitConfig, UnitInstance, UnitSource};
use std::fmt;
use std::sync::Arc;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum UnitStatus {
    #[default]
    Unloaded,
    Loading,
    Ready,
    Failed,
}

impl UnitStatus {
    pub fn label(self) -> &'static str {
        match self {
            UnitStatus::Unloaded => "Unloaded",
            UnitStatus::Loading => "Loading module...",
            UnitStatus::Ready => "Module Loaded",
            UnitStatus::Failed => "Load failed",
        }
    }
}

impl fmt::Display for UnitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            UnitStatus::Unloaded => "Unloaded",
            UnitStatus::Loading => "Loading",
            UnitStatus::Ready => "Ready",
            UnitStatus::Failed => "Failed",
        };
        f.write_str(name)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RunState {
    #[default]
    NotStarted,
    Running,
}

/// Snapshot of the bridge slot as seen by the UI.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LoadedUnitHandle {
    pub status: UnitStatus,
    pub owner: Option<String>,
    pub generation: u64,
}

/// Work order for fetching and instantiating a unit off the UI thread.
pub struct LoadRequest {
    pub generation: u64,
    pub descriptor: ProgramDescriptor,
    pub config: UnitConfig,
}

impl LoadRequest {
    pub fn perform(self, source: &dyn UnitSource) -> LoadCompletion {
        let LoadRequest {
            generation,
            descriptor,
            config,
        } = self;

        let result = source
            .fetch(&descriptor)
            .and_then(|factory| factory.instantiate(config));

        LoadCompletion {
            generation,
            program_id: descriptor.id,
            result,
        }
    }
}

impl fmt::Debug for LoadRequest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadRequest")
            .field("generation", &self.generation)
            .field("program", &self.descriptor.id)
            .finish()
    }
}

pub struct LoadCompletion {
    pub generation: u64,
    pub program_id: String,
    pub result: Result<Box<dyn UnitInstance>, LoadError>,
}

impl fmt::Debug for LoadCompletion {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("LoadCompletion")
            .field("generation", &self.generation)
            .field("program", &self.program_id)
            .field("ok", &self.result.is_ok())
            .finish()
    }
}

pub struct ModuleBridge {
    sink: OutputSink,
    generation: u64,
    status: UnitStatus,
    descriptor: Option<ProgramDescriptor>,
    instance: Option<Box<dyn UnitInstance>>,
    run_state: RunState,
}

impl ModuleBridge {
    pub fn new(sink: OutputSink) -> Self {
        Self {
            sink,
            generation: 0,
            status: UnitStatus::Unloaded,
            descriptor: None,
            instance: None,
            run_state: RunState::NotStarted,
        }
    }

    pub fn sink(&self) -> &OutputSink {
        &self.sink
    }

    pub fn status(&self) -> UnitStatus {
        self.status
    }

    pub fn run_state(&self) -> RunState {
        self.run_state
    }

    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn descriptor(&self) -> Option<&ProgramDescriptor> {
        self.descriptor.as_ref()
    }

    pub fn handle(&self) -> LoadedUnitHandle {
        LoadedUnitHandle {
            status: self.status,
            owner: self.descriptor.as_ref().map(|d| d.id.clone()),
            generation: self.generation,
        }
    }

    /// Retires whatever is installed, then moves to `Loading` and returns the request
    /// that will produce the new instance.
    pub fn begin_load(&mut self, descriptor: &ProgramDescriptor) -> LoadRequest {
        self.advance_generation();
        self.retire();
        self.status = UnitStatus::Loading;
        self.descriptor = Some(descriptor.clone());

        tracing::info!(
            program = %descriptor.id,
            location = %descriptor.load_location,
            generation = self.generation,
            "loading unit"
        );

        LoadRequest {
            generation: self.generation,
            descriptor: descriptor.clone(),
            config: self.unit_config(descriptor),
        }
    }

    /// Applies a finished load. Returns `false` when the completion is stale.
    pub fn complete_load(&mut self, completion: LoadCompletion) -> bool {
        let LoadCompletion {
            generation,
            program_id,
            result,
        } = completion;

        if generation != self.generation || self.status != UnitStatus::Loading {
            tracing::warn!(
                program = %program_id,
                generation,
                active = self.generation,
                "discarding stale unit load"
            );
            if let Ok(mut instance) = result {
                shutdown_instance(&program_id, instance.as_mut());
            }
            return false;
        }

        match result {
            Ok(instance) => {
                tracing::info!(program = %program_id, generation, "unit ready");
                self.instance = Some(instance);
                self.status = UnitStatus::Ready;
            }
            Err(e) => {
                tracing::error!(
                    program = %program_id,
                    generation,
                    kind = e.kind(),
                    error = %e,
                    "unit load failed"
                );
                self.instance = None;
                self.status = UnitStatus::Failed;
                self.sink.fatal(e.to_string());
            }
        }
        true
    }

    pub fn load(
        &mut self,
        source: &dyn UnitSource,
        descriptor: &ProgramDescriptor,
    ) -> LoadedUnitHandle {
        let request = self.begin_load(descriptor);
        let completion = request.perform(source);
        self.complete_load(completion);
        self.handle()
    }

    /// Idempotent. Shuts the unit down (best-effort) and resets to `Unloaded`.
    pub fn teardown(&mut self) {
        if self.status == UnitStatus::Unloaded && self.instance.is_none() {
            return;
        }
        self.advance_generation();
        self.retire();
        self.descriptor = None;
    }

    pub(crate) fn instance_mut(&mut self) -> Option<&mut (dyn UnitInstance + 'static)> {
        if self.status != UnitStatus::Ready {
            return None;
        }
        self.instance.as_deref_mut()
    }

    pub(crate) fn mark_running(&mut self) {
        if self.status == UnitStatus::Ready {
            self.run_state = RunState::Running;
        }
    }

    /// Fences off the current unit's channel before it is shut down, so nothing it
    /// prints while exiting reaches the log.
    fn advance_generation(&mut self) {
        self.generation = self.generation.wrapping_add(1);
        self.sink.set_active_generation(self.generation);
    }

    fn retire(&mut self) {
        if let Some(mut instance) = self.instance.take() {
            let program = self
                .descriptor
                .as_ref()
                .map(|d| d.id.as_str())
                .unwrap_or("unknown");
            tracing::debug!(program = %program, generation = self.generation, "retiring unit");
            shutdown_instance(program, instance.as_mut());
        }
        self.status = UnitStatus::Unloaded;
        self.run_state = RunState::NotStarted;
    }

    fn unit_config(&self, descriptor: &ProgramDescriptor) -> UnitConfig {
        let stdout = self.sink.channel(self.generation);
        let stderr = stdout.clone();
        let program = descriptor.id.clone();
        let location = descriptor.load_location.clone();

        UnitConfig {
            on_standard_output: Arc::new(move |text: &str| stdout.standard(text)),
            on_error_output: Arc::new(move |text: &str| {
                tracing::warn!(program = %program, stderr = %text, "unit error output");
                stderr.error(text);
            }),
            resolve_auxiliary_file: Arc::new(move |name: &str| auxiliary_location(&location, name)),
        }
    }
}

impl Drop for ModuleBridge {
    fn drop(&mut self) {
        self.retire();
    }
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/bridge.rs"]
mod tests;
