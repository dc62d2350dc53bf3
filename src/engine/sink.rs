//! Log sinks for domain output
//!
//! The host supplies where lines go. Emitting must never fail and must not
//! block the caller for any meaningful time.

use parking_lot::Mutex;
use std::sync::Arc;

/// Destination for engine output lines
pub trait LogSink: Send + Sync {
    fn emit(&self, line: &str);
}

/// Forwards every line to `tracing` at info level
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl LogSink for TracingSink {
    fn emit(&self, line: &str) {
        tracing::info!("{}", line);
    }
}

/// Collects lines in memory
#[derive(Debug, Clone, Default)]
pub struct MemorySink {
    lines: Arc<Mutex<Vec<String>>>,
}

impl MemorySink {
    pub fn new() -> Self {
        Self::default()
    }

    /// Copy of every line emitted so far
    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().clone()
    }

    /// Remove and return every line emitted so far
    pub fn drain(&self) -> Vec<String> {
        std::mem::take(&mut *self.lines.lock())
    }

    /// Number of lines containing `needle`
    pub fn count_containing(&self, needle: &str) -> usize {
        self.lines.lock().iter().filter(|l| l.contains(needle)).count()
    }
}

impl LogSink for MemorySink {
    fn emit(&self, line: &str) {
        self.lines.lock().push(line.to_string());
    }
}

impl<F> LogSink for F
where
    F: Fn(&str) + Send + Sync,
{
    fn emit(&self, line: &str) {
        self(line)
    }
}

/// Prefixes every line with the engine's display name before handing it to the sink
#[derive(Clone)]
pub struct Emitter {
    sink: Arc<dyn LogSink>,
    name: &'static str,
}

impl Emitter {
    pub fn new(sink: Arc<dyn LogSink>, name: &'static str) -> Self {
        Self { sink, name }
    }

    pub fn emit(&self, message: &str) {
        self.sink.emit(&format!("[{}] {}", self.name, message));
    }

    pub fn name(&self) -> &'static str {
        self.name
    }
}
