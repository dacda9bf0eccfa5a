//! Shared logger — serialized, sequence-stamped console output
//!
//! Every line is `[LOG ID: <n>] <message>`. Ids start at 0 and increase by
//! one per call across all tasks, with no gaps. Emission happens inside a
//! critical section, so two lines can never interleave.
//!
//! Author: Moroya Sakamoto

use core::cell::RefCell;
use core::fmt;

use critical_section::Mutex;

/// One log entry, borrowed by the sink for the duration of the write
pub struct LogEntry<'a> {
    /// Sequence id
    pub id: u64,
    /// Message text
    pub text: fmt::Arguments<'a>,
}

impl fmt::Display for LogEntry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "[LOG ID: {}] {}", self.id, self.text)
    }
}

/// Output device behind the shared logger
///
/// Called with the logger lock held.
pub trait LogSink {
    /// Write one complete line
    fn emit(&mut self, entry: &LogEntry<'_>);

    /// Push buffered output to the device
    fn flush(&mut self) {}
}

struct LoggerInner<S> {
    next_id: u64,
    sink: S,
}

/// Process-wide logger shared by every task
pub struct SharedLogger<S: LogSink> {
    inner: Mutex<RefCell<LoggerInner<S>>>,
}

impl<S: LogSink> SharedLogger<S> {
    /// Create a logger whose first entry gets id 0
    pub const fn new(sink: S) -> Self {
        Self {
            inner: Mutex::new(RefCell::new(LoggerInner { next_id: 0, sink })),
        }
    }

    /// Log a message, returning its sequence id
    pub fn log(&self, text: &str) -> u64 {
        self.log_fmt(format_args!("{}", text))
    }

    /// Log pre-formatted arguments, returning the sequence id
    pub fn log_fmt(&self, text: fmt::Arguments<'_>) -> u64 {
        critical_section::with(|cs| {
            let mut inner = self.inner.borrow_ref_mut(cs);
            let id = inner.next_id;
            inner.next_id = id + 1;
            inner.sink.emit(&LogEntry { id, text });
            inner.sink.flush();
            id
        })
    }

    /// Number of sequence ids issued so far
    pub fn entries_logged(&self) -> u64 {
        critical_section::with(|cs| self.inner.borrow_ref(cs).next_id)
    }

    /// Read the sink under the logger lock
    pub fn inspect<R>(&self, f: impl FnOnce(&S) -> R) -> R {
        critical_section::with(|cs| f(&self.inner.borrow_ref(cs).sink))
    }
}

/// Sink that discards every line
#[derive(Debug, Default, Clone, Copy)]
pub struct NullSink;

impl LogSink for NullSink {
    fn emit(&mut self, _entry: &LogEntry<'_>) {}
}

#[cfg(feature = "std")]
pub use self::host::{LoggedLine, MemorySink, StdoutSink};

#[cfg(feature = "std")]
mod host {
    use std::io::Write;
    use std::string::String;
    use std::vec::Vec;

    use super::{LogEntry, LogSink};

    /// Console sink: one line per entry, flushed immediately
    #[derive(Debug, Default, Clone, Copy)]
    pub struct StdoutSink;

    impl LogSink for StdoutSink {
        fn emit(&mut self, entry: &LogEntry<'_>) {
            // Console I/O is treated as reliable.
            let _ = writeln!(std::io::stdout().lock(), "{}", entry);
        }

        fn flush(&mut self) {
            let _ = std::io::stdout().lock().flush();
        }
    }

    /// A captured log line
    #[derive(Debug, Clone, PartialEq, Eq)]
    pub struct LoggedLine {
        /// Sequence id stamped by the logger
        pub id: u64,
        /// Message text without the id prefix
        pub text: String,
    }

    impl LoggedLine {
        /// The line exactly as the console would show it
        pub fn render(&self) -> String {
            format!("[LOG ID: {}] {}", self.id, self.text)
        }
    }

    /// In-memory sink recording every entry in emission order
    #[derive(Debug, Default, Clone)]
    pub struct MemorySink {
        lines: Vec<LoggedLine>,
    }

    impl MemorySink {
        /// Empty sink
        pub fn new() -> Self {
            Self::default()
        }

        /// Every captured line, in emission order
        pub fn lines(&self) -> &[LoggedLine] {
            &self.lines
        }

        /// Message texts only, in order
        pub fn texts(&self) -> Vec<String> {
            self.lines.iter().map(|l| l.text.clone()).collect()
        }

        /// Ids of lines whose text starts with `prefix`
        pub fn ids_starting_with(&self, prefix: &str) -> Vec<u64> {
            self.lines
                .iter()
                .filter(|l| l.text.starts_with(prefix))
                .map(|l| l.id)
                .collect()
        }
    }

    impl LogSink for MemorySink {
        fn emit(&mut self, entry: &LogEntry<'_>) {
            self.lines.push(LoggedLine {
                id: entry.id,
                text: entry.text.to_string(),
            });
        }
    }
}

#[cfg(all(test, feature = "std"))]
mod tests {
    use super::*;

    #[test]
    fn test_first_id_is_zero() {
        let logger = SharedLogger::new(MemorySink::new());
        assert_eq!(logger.log("boot"), 0);
        assert_eq!(logger.entries_logged(), 1);
    }

    #[test]
    fn test_line_format() {
        let logger = SharedLogger::new(MemorySink::new());
        logger.log("TEMP_STABLE sent to queue");
        logger.log_fmt(format_args!("Condition: {}", "PRESS_STABLE"));
        logger.inspect(|sink| {
            assert_eq!(sink.lines()[0].render(), "[LOG ID: 0] TEMP_STABLE sent to queue");
            assert_eq!(sink.lines()[1].render(), "[LOG ID: 1] Condition: PRESS_STABLE");
        });
    }

    #[test]
    fn test_ids_gapless() {
        let logger = SharedLogger::new(MemorySink::new());
        for expected in 0..100 {
            assert_eq!(logger.log("tick"), expected);
        }
        logger.inspect(|sink| {
            for (i, line) in sink.lines().iter().enumerate() {
                assert_eq!(line.id as usize, i);
            }
        });
    }

    #[test]
    fn test_no_deduplication() {
        let logger = SharedLogger::new(MemorySink::new());
        let a = logger.log("Applied brakes successfully.");
        let b = logger.log("Applied brakes successfully.");
        assert_ne!(a, b);
        logger.inspect(|sink| {
            assert_eq!(sink.lines().len(), 2);
            assert_ne!(sink.lines()[0].render(), sink.lines()[1].render());
        });
    }

    #[test]
    fn test_same_text_from_two_tasks_gets_two_ids() {
        let logger = SharedLogger::new(MemorySink::new());
        let barrier = std::sync::Barrier::new(2);
        let ids: Vec<u64> = std::thread::scope(|s| {
            let handles: Vec<_> = (0..2)
                .map(|_| {
                    let (logger, barrier) = (&logger, &barrier);
                    s.spawn(move || {
                        barrier.wait();
                        logger.log("Condition: TEMP_STABLE")
                    })
                })
                .collect();
            handles.into_iter().map(|h| h.join().unwrap()).collect()
        });

        let mut sorted = ids.clone();
        sorted.sort_unstable();
        assert_eq!(sorted, vec![0, 1]);
        logger.inspect(|sink| {
            let lines = sink.lines();
            assert_eq!(lines.len(), 2);
            assert_eq!(lines[0].text, lines[1].text);
            assert_eq!(lines[0].render(), "[LOG ID: 0] Condition: TEMP_STABLE");
            assert_eq!(lines[1].render(), "[LOG ID: 1] Condition: TEMP_STABLE");
        });
    }

    #[test]
    fn test_ids_do_not_wrap_at_u32() {
        let logger = SharedLogger::new(NullSink);
        critical_section::with(|cs| {
            logger.inner.borrow_ref_mut(cs).next_id = u32::MAX as u64;
        });
        assert_eq!(logger.log("a"), u32::MAX as u64);
        assert_eq!(logger.log("b"), u32::MAX as u64 + 1);
    }

    #[test]
    fn test_concurrent_logging_is_serialized() {
        const THREADS: u32 = 4;
        const PER_THREAD: u32 = 250;

        let logger = SharedLogger::new(MemorySink::new());
        std::thread::scope(|s| {
            for t in 0..THREADS {
                let logger = &logger;
                s.spawn(move || {
                    for i in 0..PER_THREAD {
                        logger.log_fmt(format_args!("task {} line {}", t, i));
                    }
                });
            }
        });

        assert_eq!(logger.entries_logged(), (THREADS * PER_THREAD) as u64);
        logger.inspect(|sink| {
            let lines = sink.lines();
            assert_eq!(lines.len() as u32, THREADS * PER_THREAD);
            for (i, line) in lines.iter().enumerate() {
                assert_eq!(line.id as usize, i);
                assert!(line.text.starts_with("task "));
            }
            // Per-thread order survives serialization
            for t in 0..THREADS {
                let prefix = format!("task {} line ", t);
                let seq: Vec<u32> = lines
                    .iter()
                    .filter_map(|l| l.text.strip_prefix(prefix.as_str()))
                    .map(|n| n.parse().unwrap())
                    .collect();
                assert_eq!(seq, (0..PER_THREAD).collect::<Vec<_>>());
            }
        });
    }

    #[test]
    fn test_null_sink_still_counts() {
        let logger = SharedLogger::new(NullSink);
        logger.log("a");
        logger.log("b");
        assert_eq!(logger.entries_logged(), 2);
    }
}
