//! cshowcase - terminal showcase host for externally built program units.
//!
//! Module layout:
//! - kernel: program registry, output sink, module bridge, invocation adapter, store
//! - runtime: process-backed units, wire protocol, async effect runner
//! - tui: terminal front end

pub mod kernel;
pub mod runtime;

#[cfg(feature = "tui")]
pub mod tui;
