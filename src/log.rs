//! Injected logging capability.
//!
//! Data structures never log through global state. They hold a [`Logger`],
//! which forwards to a caller-supplied [`LogSink`] or does nothing.
//!
//! ```
//! use std::sync::{Arc, Mutex};
//! use tightpack::log::{LogSink, Severity};
//! use tightpack::int_vectors::RunLengthVec;
//!
//! #[derive(Default)]
//! struct Recorder(Mutex<Vec<String>>);
//!
//! impl LogSink for Recorder {
//!     fn log(&self, _severity: Severity, message: &str) {
//!         self.0.lock().unwrap().push(message.to_string());
//!     }
//! }
//!
//! let recorder = Arc::new(Recorder::default());
//! let mut rl = RunLengthVec::new().with_sink(recorder.clone());
//! rl.push(1).unwrap();
//! rl.push(2).unwrap();
//! rl.set(0, 2).unwrap();
//! assert!(!recorder.0.lock().unwrap().is_empty());
//! ```
use std::fmt;
use std::sync::Arc;

/// Severity attached to a log message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Per-element detail.
    Trace,
    /// Structural events such as run splits or interval merges.
    Debug,
    /// Coarse lifecycle events.
    Info,
    /// Suspicious but handled conditions.
    Warn,
    /// Failures.
    Error,
}

/// Single-operation logging interface.
pub trait LogSink: Send + Sync {
    /// Consumes one message.
    fn log(&self, severity: Severity, message: &str);
}

/// Sink that drops every message.
#[derive(Debug, Default, Clone, Copy)]
pub struct NoopSink;

impl LogSink for NoopSink {
    fn log(&self, _severity: Severity, _message: &str) {}
}

/// Sink forwarding messages to [`tracing`] events under the `tightpack` target.
#[cfg(feature = "tracing")]
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingSink;

#[cfg(feature = "tracing")]
impl LogSink for TracingSink {
    fn log(&self, severity: Severity, message: &str) {
        match severity {
            Severity::Trace => tracing::trace!(target: "tightpack", "{message}"),
            Severity::Debug => tracing::debug!(target: "tightpack", "{message}"),
            Severity::Info => tracing::info!(target: "tightpack", "{message}"),
            Severity::Warn => tracing::warn!(target: "tightpack", "{message}"),
            Severity::Error => tracing::error!(target: "tightpack", "{message}"),
        }
    }
}

/// Handle to an optional [`LogSink`] held by each data structure.
///
/// Two loggers always compare equal so that structures holding one keep
/// value semantics.
#[derive(Clone, Default)]
pub struct Logger {
    sink: Option<Arc<dyn LogSink>>,
}

impl Logger {
    /// Creates a logger forwarding to `sink`.
    pub fn new(sink: Arc<dyn LogSink>) -> Self {
        Self { sink: Some(sink) }
    }

    /// Creates a logger that drops every message.
    pub const fn noop() -> Self {
        Self { sink: None }
    }

    /// Returns `true` if a sink is attached.
    pub const fn is_enabled(&self) -> bool {
        self.sink.is_some()
    }

    /// Formats and forwards a message if a sink is attached.
    ///
    /// Formatting is skipped entirely without a sink.
    #[inline(always)]
    pub fn log(&self, severity: Severity, args: fmt::Arguments<'_>) {
        if let Some(sink) = &self.sink {
            sink.log(severity, &args.to_string());
        }
    }

    /// Shorthand for [`Severity::Debug`] messages.
    #[inline(always)]
    pub fn debug(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Debug, args);
    }

    /// Shorthand for [`Severity::Trace`] messages.
    #[inline(always)]
    pub fn trace(&self, args: fmt::Arguments<'_>) {
        self.log(Severity::Trace, args);
    }
}

impl PartialEq for Logger {
    fn eq(&self, _other: &Self) -> bool {
        true
    }
}

impl Eq for Logger {}

impl fmt::Debug for Logger {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Logger")
            .field("enabled", &self.is_enabled())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    use std::sync::Mutex;

    #[derive(Default)]
    struct Recorder(Mutex<Vec<(Severity, String)>>);

    impl LogSink for Recorder {
        fn log(&self, severity: Severity, message: &str) {
            self.0.lock().unwrap().push((severity, message.to_string()));
        }
    }

    #[test]
    fn test_noop_logger() {
        let logger = Logger::noop();
        assert!(!logger.is_enabled());
        logger.debug(format_args!("dropped {}", 1));
    }

    #[test]
    fn test_forwarding() {
        let recorder = Arc::new(Recorder::default());
        let logger = Logger::new(recorder.clone());
        logger.debug(format_args!("merged {} runs", 2));
        logger.trace(format_args!("pushed {}", 7));
        let got = recorder.0.lock().unwrap().clone();
        assert_eq!(
            got,
            vec![
                (Severity::Debug, "merged 2 runs".to_string()),
                (Severity::Trace, "pushed 7".to_string())
            ]
        );
    }

    #[test]
    fn test_loggers_compare_equal() {
        let with_sink = Logger::new(Arc::new(NoopSink));
        assert_eq!(with_sink, Logger::noop());
    }

    #[cfg(feature = "tracing")]
    #[test]
    fn test_tracing_sink_accepts_all_levels() {
        let logger = Logger::new(Arc::new(TracingSink));
        for severity in [
            Severity::Trace,
            Severity::Debug,
            Severity::Info,
            Severity::Warn,
            Severity::Error,
        ] {
            logger.log(severity, format_args!("{severity:?}"));
        }
    }
}
