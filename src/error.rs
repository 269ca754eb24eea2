//! Error types for the `media_retriever` crate.
//!
//! This module defines [`RetrieverError`], the error type returned by the
//! fallible entry points of the crate. Only opening a source is allowed to
//! fail loudly: per-call operations (frame lookup, cover art, metadata keys)
//! report a missing result as `None` and log the underlying error instead.

use std::{io::Error as IoError, path::PathBuf};

use ffmpeg_next::Error as FfmpegError;
use image::ImageError;
use thiserror::Error;

/// The unified error type for `media_retriever` operations.
///
/// Variants carry enough context to diagnose the problem without needing
/// additional logging at the call site.
#[derive(Debug, Error)]
#[non_exhaustive]
pub enum RetrieverError {
    /// The container could not be opened or its streams could not be probed.
    #[error("Failed to open media source at {path}: {reason}")]
    FileOpen {
        /// Path that was passed to [`crate::MediaSession::open`].
        path: PathBuf,
        /// Underlying reason the open failed.
        reason: String,
    },

    /// The decoder for the selected video stream could not be found or opened.
    #[error("Failed to open {codec} decoder for stream {stream_index}: {reason}")]
    DecoderOpen {
        /// Index of the video stream in the container.
        stream_index: usize,
        /// Human-readable codec name.
        codec: String,
        /// Underlying reason the decoder could not be opened.
        reason: String,
    },

    /// The source does not contain a video stream.
    #[error("No video stream found in source")]
    NoVideoStream,

    /// The container refused to seek.
    #[error("Seek to {timestamp} in stream {stream_index} failed: {reason}")]
    SeekFailed {
        /// Index of the stream the seek was issued against.
        stream_index: usize,
        /// Target position in the stream's time base.
        timestamp: i64,
        /// Underlying reason.
        reason: String,
    },

    /// A video packet could not be decoded.
    #[error("Failed to decode video frame: {0}")]
    VideoDecodeError(String),

    /// Pixel data could not be converted to the working RGB format.
    #[error("Failed to rescale frame: {0}")]
    ScalingError(String),

    /// The still-image encoder could not be found, opened, or fed.
    #[error("Failed to encode still image: {0}")]
    ImageEncodeError(String),

    /// An integer seek option did not map to a [`SeekPolicy`](crate::SeekPolicy).
    #[error("Unknown seek option code: {0}")]
    InvalidOption(i32),

    /// An error originating from the FFmpeg libraries.
    #[error("FFmpeg error: {0}")]
    FfmpegError(String),

    /// An I/O error occurred while writing output.
    #[error("I/O error: {0}")]
    IoError(#[from] IoError),

    /// An error from the `image` crate while decoding a returned buffer.
    #[error("Image processing error: {0}")]
    ImageError(#[from] ImageError),
}

impl From<FfmpegError> for RetrieverError {
    fn from(error: FfmpegError) -> Self {
        RetrieverError::FfmpegError(error.to_string())
    }
}

/// Collapse a per-call result into the absent-result convention.
///
/// Errors are logged and mapped to `None`; callers treat "nothing found" and
/// "something failed" the same way.
pub(crate) fn settle<T>(operation: &str, result: Result<Option<T>, RetrieverError>) -> Option<T> {
    match result {
        Ok(value) => {
            if value.is_none() {
                log::debug!("{operation}: no result");
            }
            value
        }
        Err(error) => {
            log::warn!("{operation} failed: {error}");
            None
        }
    }
}
