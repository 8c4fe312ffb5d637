//! The interactive shell around the headless store: drains background results,
//! maps keys and decides when a redraw is needed.

use super::input::{map_key, KeyOutcome};
use super::render;
use crate::kernel::{Action, Store};
use crate::runtime::{AppMessage, AsyncRuntime};
use crossterm::event::KeyEvent;
use ratatui::Frame;
use std::sync::mpsc::{self, Receiver};

const MAX_MESSAGE_DRAIN_PER_TICK: usize = 64;
const MAX_LOG_DRAIN_PER_TICK: usize = 256;

pub struct ShowcaseApp {
    store: Store,
    runtime: AsyncRuntime,
    rx: Receiver<AppMessage>,
    log_rx: Option<Receiver<String>>,
    last_log: Option<String>,
    drawn_output_version: u64,
}

impl ShowcaseApp {
    pub fn new(
        store: Store,
        runtime: AsyncRuntime,
        rx: Receiver<AppMessage>,
        log_rx: Option<Receiver<String>>,
    ) -> Self {
        Self {
            store,
            runtime,
            rx,
            log_rx,
            last_log: None,
            drawn_output_version: 0,
        }
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    /// Dispatches one action and hands its effects to the runtime.
    pub fn dispatch(&mut self, action: Action) -> bool {
        let result = self.store.dispatch(action);
        for effect in result.effects {
            self.runtime.run_effect(effect);
        }
        result.state_changed
    }

    /// Returns `(quit, changed)`.
    pub fn handle_key(&mut self, key: KeyEvent) -> (bool, bool) {
        match map_key(self.store.state(), key) {
            KeyOutcome::Quit => (true, false),
            KeyOutcome::Action(action) => (false, self.dispatch(action)),
            KeyOutcome::Ignored => (false, false),
        }
    }

    pub fn tick(&mut self) -> bool {
        let mut changed = false;
        changed |= self.poll_messages();
        changed |= self.poll_logs();
        changed |= self.poll_output();
        changed
    }

    pub fn render(&mut self, frame: &mut Frame) {
        self.drawn_output_version = self.store.sink().version();
        render::render(&self.store, self.last_log.as_deref(), frame);
    }

    fn poll_messages(&mut self) -> bool {
        let mut changed = false;
        for _ in 0..MAX_MESSAGE_DRAIN_PER_TICK {
            match self.rx.try_recv() {
                Ok(msg) => changed |= self.dispatch(Action::from(msg)),
                Err(mpsc::TryRecvError::Empty) | Err(mpsc::TryRecvError::Disconnected) => break,
            }
        }
        changed
    }

    fn poll_logs(&mut self) -> bool {
        let Some(rx) = self.log_rx.take() else {
            return false;
        };

        let mut latest = None;
        let mut disconnected = false;
        for _ in 0..MAX_LOG_DRAIN_PER_TICK {
            match rx.try_recv() {
                Ok(line) => latest = Some(line),
                Err(mpsc::TryRecvError::Empty) => break,
                Err(mpsc::TryRecvError::Disconnected) => {
                    disconnected = true;
                    break;
                }
            }
        }

        if !disconnected {
            self.log_rx = Some(rx);
        }

        match latest {
            Some(line) => {
                self.last_log = Some(line);
                true
            }
            None => false,
        }
    }

    /// Unit output lands in the sink from reader threads, outside any dispatch.
    fn poll_output(&self) -> bool {
        self.store.sink().version() != self.drawn_output_version
    }

    /// Tears down the running unit before the terminal is restored.
    pub fn shutdown(&mut self) {
        self.dispatch(Action::Back);
    }
}
