//! Diagnostic sink: log and notification callbacks.
//!
//! Nothing in the crate writes to stdout or stderr. Recoverable anomalies
//! (render stack underflow, missing images, clamped caret indices, paint
//! failures caught by the main loop) are reported through the log callback,
//! and lifecycle notifications through the event callback.

use std::sync::{Mutex, OnceLock};

/// Log level for diagnostic callbacks.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Debug,
    Info,
    Warn,
    Error,
}

type EventCallback = Box<dyn Fn(&str, &str) + Send + Sync + 'static>;
type LogCallback = Box<dyn Fn(LogLevel, &str) + Send + Sync + 'static>;

fn event_callback() -> &'static Mutex<Option<EventCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<EventCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

fn log_callback() -> &'static Mutex<Option<LogCallback>> {
    static CALLBACK: OnceLock<Mutex<Option<LogCallback>>> = OnceLock::new();
    CALLBACK.get_or_init(|| Mutex::new(None))
}

/// Set the global notification callback.
///
/// The callback receives a dotted notification name (`"window.close"`) and a
/// short payload.
pub fn set_event_callback<F>(callback: F)
where
    F: Fn(&str, &str) + Send + Sync + 'static,
{
    let mut guard = event_callback().lock().expect("event callback lock");
    *guard = Some(Box::new(callback));
}

/// Remove the global notification callback.
pub fn clear_event_callback() {
    if let Ok(mut guard) = event_callback().lock() {
        *guard = None;
    }
}

/// Emit a notification to the registered callback.
pub fn emit_event(name: &str, data: &str) {
    if let Ok(guard) = event_callback().lock() {
        if let Some(callback) = guard.as_ref() {
            callback(name, data);
        }
    }
}

/// Set the global log callback.
pub fn set_log_callback<F>(callback: F)
where
    F: Fn(LogLevel, &str) + Send + Sync + 'static,
{
    let mut guard = log_callback().lock().expect("log callback lock");
    *guard = Some(Box::new(callback));
}

/// Remove the global log callback.
pub fn clear_log_callback() {
    if let Ok(mut guard) = log_callback().lock() {
        *guard = None;
    }
}

/// Emit a log message.
pub fn emit_log(level: LogLevel, message: &str) {
    if let Ok(guard) = log_callback().lock() {
        if let Some(callback) = guard.as_ref() {
            callback(level, message);
        }
    }
}

/// Emit a warning. Shorthand used by the clamping paths.
pub fn warn(message: &str) {
    emit_log(LogLevel::Warn, message);
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicBool, Ordering};

    #[test]
    fn test_event_callback() {
        let called = Arc::new(AtomicBool::new(false));
        let called_clone = Arc::clone(&called);
        set_event_callback(move |name, _data| {
            if name == "log.test" {
                called_clone.store(true, Ordering::SeqCst);
            }
        });
        emit_event("log.test", "{}");
        assert!(called.load(Ordering::SeqCst));
    }

    #[test]
    fn test_log_callback_levels() {
        let saw_warn = Arc::new(AtomicBool::new(false));
        let flag = Arc::clone(&saw_warn);
        set_log_callback(move |level, msg| {
            if level == LogLevel::Warn && msg == "log-test-warning" {
                flag.store(true, Ordering::SeqCst);
            }
        });
        warn("log-test-warning");
        assert!(saw_warn.load(Ordering::SeqCst));
        assert!(LogLevel::Debug < LogLevel::Error);
    }
}
