//! Error types for paneforge.

use std::fmt;
use std::io;

/// Result type alias for paneforge operations.
pub type Result<T> = std::result::Result<T, Error>;

/// Error type for paneforge operations.
///
/// Only setup-time failures are surfaced as errors. Runtime anomalies (an
/// unmatched `pop_state`, a caret index past the end of the text) are clamped
/// in place and reported through [`crate::log::emit_log`].
#[derive(Debug)]
pub enum Error {
    /// I/O error from a platform backend.
    Io(io::Error),
    /// A platform window, surface or render context could not be created.
    Setup(String),
    /// An operation was attempted in the wrong application lifecycle phase.
    Lifecycle(&'static str),
    /// Surface or window dimension error (e.g., zero width/height).
    InvalidDimensions { width: u32, height: u32 },
    /// Invalid color format (e.g., malformed hex string).
    InvalidColor(String),
    /// A key or key-combination name could not be parsed.
    InvalidKeyName(String),
    /// A rendering backend failed while executing a frame.
    Backend(String),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(e) => write!(f, "I/O error: {e}"),
            Self::Setup(msg) => write!(f, "setup failed: {msg}"),
            Self::Lifecycle(msg) => write!(f, "lifecycle violation: {msg}"),
            Self::InvalidDimensions { width, height } => {
                write!(f, "invalid dimensions: {width}x{height}")
            }
            Self::InvalidColor(s) => write!(f, "invalid color format: {s}"),
            Self::InvalidKeyName(s) => write!(f, "invalid key name: {s}"),
            Self::Backend(msg) => write!(f, "backend error: {msg}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(e) => Some(e),
            _ => None,
        }
    }
}

impl From<io::Error> for Error {
    fn from(e: io::Error) -> Self {
        Self::Io(e)
    }
}
