//! TUI integration layer (crossterm + ratatui).
//!
//! Kept apart from `kernel` so the bridge and store stay usable without a terminal.

pub mod app;
pub mod input;
pub mod render;
pub mod session;

pub use app::ShowcaseApp;
