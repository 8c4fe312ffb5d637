//! Headless application core (state/action/effect) and the unit host.

pub mod action;
pub mod bridge;
pub mod effect;
pub mod error;
pub mod invoke;
pub mod output;
pub mod program;
pub mod registry;
pub mod state;
pub mod store;
pub mod unit;

#[cfg(test)]
pub(crate) mod testing;

pub use action::Action;
pub use bridge::{
    LoadCompletion, LoadRequest, LoadedUnitHandle, ModuleBridge, RunState, UnitStatus,
};
pub use effect::Effect;
pub use error::{EntryKind, InvocationError, LoadError, UnitFault};
pub use output::{LineKind, OutputLine, OutputSink, UnitChannel};
pub use program::{EntryPoints, InvocationMode, ProgramDescriptor};
pub use registry::{ProgramRegistry, RegistryError};
pub use state::{AppState, InputLine, ProgramTab, ProgramView, Screen, SourceListing};
pub use store::{DispatchResult, Store};
pub use unit::{
    CallOptions, UnitCall, UnitConfig, UnitFactory, UnitInstance, UnitSource, UnitValue,
    ValueKind,
};
