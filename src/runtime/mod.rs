//! Async runtime adapter: executes effects off the UI thread and posts results back.

mod async_runtime;
mod message;
pub mod paths;
pub mod process;

pub use async_runtime::AsyncRuntime;
pub use message::AppMessage;
pub use process::ProcessUnitSource;
