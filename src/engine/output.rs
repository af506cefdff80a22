//! Sinks for operator-facing output lines.

use std::sync::Mutex;

/// Receives operator-facing output, one line at a time.
pub trait OutputWriter: Send + Sync {
    fn write(&self, line: &str);
}

/// Writes lines to stdout.
#[derive(Debug, Clone, Copy, Default)]
pub struct ConsoleOutput;

impl OutputWriter for ConsoleOutput {
    fn write(&self, line: &str) {
        println!("{line}");
    }
}

/// Keeps lines in memory.
#[derive(Debug, Default)]
pub struct BufferedOutput {
    lines: Mutex<Vec<String>>,
}

impl BufferedOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn lines(&self) -> Vec<String> {
        self.lines.lock().map(|l| l.clone()).unwrap_or_default()
    }

    pub fn contains(&self, needle: &str) -> bool {
        self.lines().iter().any(|l| l.contains(needle))
    }
}

impl OutputWriter for BufferedOutput {
    fn write(&self, line: &str) {
        if let Ok(mut lines) = self.lines.lock() {
            lines.push(line.to_string());
        }
    }
}
