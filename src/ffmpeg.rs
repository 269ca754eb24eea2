//! FFmpeg process-wide setup.
//!
//! FFmpeg keeps a global log level that is separate from the Rust
//! [`log`](https://crates.io/crates/log) facade used by this crate. By
//! default it prints warnings to stderr, which is noisy when probing many
//! files for thumbnails. [`set_ffmpeg_log_level`] tunes that output without
//! requiring callers to depend on `ffmpeg-next` themselves.
//!
//! # Example
//!
//! ```no_run
//! use media_retriever::{FfmpegLogLevel, MediaSession};
//!
//! media_retriever::set_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let session = MediaSession::open("input.mp4")?;
//! # Ok::<(), media_retriever::RetrieverError>(())
//! ```

use std::{fmt, str::FromStr};

use ffmpeg_next::util::log::Level;

use crate::error::RetrieverError;

/// FFmpeg internal log verbosity level.
///
/// Ordered from quietest to most verbose. Setting a level suppresses every
/// FFmpeg message below that severity.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FfmpegLogLevel {
    /// Print nothing.
    Quiet,
    /// Unrecoverable conditions that abort the process.
    Panic,
    /// Unrecoverable errors.
    Fatal,
    /// Recoverable errors.
    Error,
    /// Warnings (FFmpeg's default).
    Warning,
    /// Informational messages.
    Info,
    /// Verbose informational messages.
    Verbose,
    /// Debugging messages.
    Debug,
    /// Everything.
    Trace,
}

impl FfmpegLogLevel {
    fn into_level(self) -> Level {
        match self {
            FfmpegLogLevel::Quiet => Level::Quiet,
            FfmpegLogLevel::Panic => Level::Panic,
            FfmpegLogLevel::Fatal => Level::Fatal,
            FfmpegLogLevel::Error => Level::Error,
            FfmpegLogLevel::Warning => Level::Warning,
            FfmpegLogLevel::Info => Level::Info,
            FfmpegLogLevel::Verbose => Level::Verbose,
            FfmpegLogLevel::Debug => Level::Debug,
            FfmpegLogLevel::Trace => Level::Trace,
        }
    }

    fn from_level(level: Level) -> Self {
        match level {
            Level::Quiet => FfmpegLogLevel::Quiet,
            Level::Panic => FfmpegLogLevel::Panic,
            Level::Fatal => FfmpegLogLevel::Fatal,
            Level::Error => FfmpegLogLevel::Error,
            Level::Warning => FfmpegLogLevel::Warning,
            Level::Info => FfmpegLogLevel::Info,
            Level::Verbose => FfmpegLogLevel::Verbose,
            Level::Debug => FfmpegLogLevel::Debug,
            Level::Trace => FfmpegLogLevel::Trace,
        }
    }

    /// Lower-case name accepted by [`FromStr`].
    pub fn as_str(self) -> &'static str {
        match self {
            FfmpegLogLevel::Quiet => "quiet",
            FfmpegLogLevel::Panic => "panic",
            FfmpegLogLevel::Fatal => "fatal",
            FfmpegLogLevel::Error => "error",
            FfmpegLogLevel::Warning => "warning",
            FfmpegLogLevel::Info => "info",
            FfmpegLogLevel::Verbose => "verbose",
            FfmpegLogLevel::Debug => "debug",
            FfmpegLogLevel::Trace => "trace",
        }
    }
}

impl fmt::Display for FfmpegLogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for FfmpegLogLevel {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "quiet" => Ok(FfmpegLogLevel::Quiet),
            "panic" => Ok(FfmpegLogLevel::Panic),
            "fatal" => Ok(FfmpegLogLevel::Fatal),
            "error" => Ok(FfmpegLogLevel::Error),
            "warning" | "warn" => Ok(FfmpegLogLevel::Warning),
            "info" => Ok(FfmpegLogLevel::Info),
            "verbose" => Ok(FfmpegLogLevel::Verbose),
            "debug" => Ok(FfmpegLogLevel::Debug),
            "trace" => Ok(FfmpegLogLevel::Trace),
            other => Err(format!("unknown FFmpeg log level: {other}")),
        }
    }
}

/// Set the FFmpeg internal log verbosity level.
///
/// Affects what FFmpeg prints to stderr, not the Rust-side `log` output.
pub fn set_ffmpeg_log_level(level: FfmpegLogLevel) {
    ffmpeg_next::util::log::set_level(level.into_level());
}

/// Get the current FFmpeg internal log verbosity level.
///
/// Returns `None` if FFmpeg reports a level with no matching variant.
pub fn get_ffmpeg_log_level() -> Option<FfmpegLogLevel> {
    ffmpeg_next::util::log::get_level()
        .ok()
        .map(FfmpegLogLevel::from_level)
}

/// Initialise the FFmpeg libraries. Safe to call any number of times.
pub(crate) fn initialize() -> Result<(), RetrieverError> {
    ffmpeg_next::init().map_err(RetrieverError::from)
}
