//! Output sink: the single ordered funnel for everything a unit (or the host on its
//! behalf) prints.
//!
//! The log is append-only. The only other mutation is `clear`, which belongs to the
//! caller that selects a new program.

use std::sync::{Arc, Mutex, MutexGuard};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LineKind {
    Standard,
    Error,
    Echo,
    Notice,
    Fatal,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OutputLine {
    pub kind: LineKind,
    pub text: String,
}

impl OutputLine {
    pub fn new(kind: LineKind, text: impl Into<String>) -> Self {
        Self {
            kind,
            text: text.into(),
        }
    }

    pub fn render(&self) -> String {
        match self.kind {
            LineKind::Standard | LineKind::Notice => self.text.clone(),
            LineKind::Error => format!("ERROR: {}", self.text),
            LineKind::Echo => format!("> {}", self.text),
            LineKind::Fatal => format!("FATAL ERROR: {}", self.text),
        }
    }
}

#[derive(Debug, Default)]
struct OutputLog {
    lines: Vec<OutputLine>,
    version: u64,
    active_generation: u64,
}

impl OutputLog {
    fn append(&mut self, line: OutputLine) {
        self.lines.push(line);
        self.version = self.version.wrapping_add(1);
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputSink {
    inner: Arc<Mutex<OutputLog>>,
}

impl OutputSink {
    pub fn new() -> Self {
        Self::default()
    }

    fn log(&self) -> MutexGuard<'_, OutputLog> {
        match self.inner.lock() {
            Ok(guard) => guard,
            Err(poisoned) => poisoned.into_inner(),
        }
    }

    pub fn push(&self, line: OutputLine) {
        self.log().append(line);
    }

    pub fn standard(&self, text: impl Into<String>) {
        self.push(OutputLine::new(LineKind::Standard, text));
    }

    pub fn error(&self, text: impl Into<String>) {
        self.push(OutputLine::new(LineKind::Error, text));
    }

    pub fn echo(&self, text: impl Into<String>) {
        self.push(OutputLine::new(LineKind::Echo, text));
    }

    pub fn notice(&self, text: impl Into<String>) {
        self.push(OutputLine::new(LineKind::Notice, text));
    }

    pub fn fatal(&self, text: impl Into<String>) {
        self.push(OutputLine::new(LineKind::Fatal, text));
    }

    pub fn clear(&self) {
        let mut log = self.log();
        log.lines.clear();
        log.version = log.version.wrapping_add(1);
    }

    pub fn len(&self) -> usize {
        self.log().lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bumped on every mutation; lets a renderer skip frames with no new output.
    pub fn version(&self) -> u64 {
        self.log().version
    }

    pub fn lines(&self) -> Vec<OutputLine> {
        self.log().lines.clone()
    }

    pub fn rendered(&self) -> Vec<String> {
        self.log().lines.iter().map(OutputLine::render).collect()
    }

    pub fn with_lines<R>(&self, f: impl FnOnce(&[OutputLine]) -> R) -> R {
        f(&self.log().lines)
    }

    /// Only channels tagged with the active generation may append.
    pub fn set_active_generation(&self, generation: u64) {
        self.log().active_generation = generation;
    }

    pub fn channel(&self, generation: u64) -> UnitChannel {
        UnitChannel {
            sink: self.clone(),
            generation,
        }
    }
}

/// The write side handed to one loaded unit.
#[derive(Debug, Clone)]
pub struct UnitChannel {
    sink: OutputSink,
    generation: u64,
}

impl UnitChannel {
    pub fn generation(&self) -> u64 {
        self.generation
    }

    pub fn standard(&self, text: &str) {
        self.append(LineKind::Standard, text);
    }

    pub fn error(&self, text: &str) {
        self.append(LineKind::Error, text);
    }

    fn append(&self, kind: LineKind, text: &str) {
        let mut log = self.sink.log();
        if log.active_generation != self.generation {
            tracing::debug!(
                generation = self.generation,
                active = log.active_generation,
                "dropping output from retired unit"
            );
            return;
        }
        for line in split_lines(text) {
            log.append(OutputLine::new(kind, line));
        }
    }
}

fn split_lines(text: &str) -> impl Iterator<Item = &str> {
    let text = text.strip_suffix('\n').unwrap_or(text);
    text.split('\n').map(|line| line.strip_suffix('\r').unwrap_or(line))
}

#[cfg(test)]
#[path = "../../tests/unit/kernel/output.rs"]
mod tests;
