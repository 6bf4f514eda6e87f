//! Diagnostics: subscriber setup plus a bounded buffer of module log lines.

use std::collections::VecDeque;

use tracing_subscriber::EnvFilter;

/// Log lines kept per session before the oldest are dropped.
pub const DEFAULT_LOG_CAPACITY: usize = 256;

/// Install a `fmt` subscriber. `RUST_LOG` wins over `default_filter` when set.
///
/// Safe to call more than once; later calls are ignored.
pub fn init(default_filter: &str) {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_filter));
    let _ = tracing_subscriber::fmt().with_env_filter(filter).try_init();
}

/// Ring buffer of messages the module sent through `js_log`.
#[derive(Debug)]
pub struct LogSink {
    lines: VecDeque<String>,
    capacity: usize,
    dropped: u64,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::with_capacity(DEFAULT_LOG_CAPACITY)
    }
}

impl LogSink {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            lines: VecDeque::with_capacity(capacity.min(DEFAULT_LOG_CAPACITY)),
            capacity,
            dropped: 0,
        }
    }

    pub fn push(&mut self, line: String) {
        if self.capacity == 0 {
            self.dropped += 1;
            return;
        }
        if self.lines.len() == self.capacity {
            self.lines.pop_front();
            self.dropped += 1;
        }
        self.lines.push_back(line);
    }

    /// Retained lines, oldest first.
    pub fn lines(&self) -> impl Iterator<Item = &str> {
        self.lines.iter().map(String::as_str)
    }

    pub fn last(&self) -> Option<&str> {
        self.lines.back().map(String::as_str)
    }

    /// Lines evicted (or refused) because the buffer was full.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }

    pub fn len(&self) -> usize {
        self.lines.len()
    }

    pub fn is_empty(&self) -> bool {
        self.lines.is_empty()
    }

    pub fn drain(&mut self) -> Vec<String> {
        self.lines.drain(..).collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn oldest_lines_are_evicted() {
        let mut sink = LogSink::with_capacity(2);
        sink.push("a".into());
        sink.push("b".into());
        sink.push("c".into());

        assert_eq!(sink.lines().collect::<Vec<_>>(), vec!["b", "c"]);
        assert_eq!(sink.dropped(), 1);
        assert_eq!(sink.last(), Some("c"));
    }

    #[test]
    fn zero_capacity_keeps_nothing() {
        let mut sink = LogSink::with_capacity(0);
        sink.push("x".into());
        assert!(sink.is_empty());
        assert_eq!(sink.dropped(), 1);
    }

    #[test]
    fn drain_empties_the_buffer() {
        let mut sink = LogSink::default();
        sink.push("one".into());
        assert_eq!(sink.drain(), vec!["one".to_string()]);
        assert_eq!(sink.len(), 0);
    }

    #[test]
    fn init_twice_is_harmless() {
        init("warn");
        init("debug");
    }
}
