//! Session configuration.
//!
//! [`SessionOptions`] is a small builder passed to
//! [`MediaSession::open_with_options`](crate::MediaSession::open_with_options).
//! The defaults reproduce what [`MediaSession::open`](crate::MediaSession::open)
//! does.
//!
//! # Example
//!
//! ```no_run
//! use media_retriever::{FfmpegLogLevel, MediaSession, ScalingAlgorithm, SessionOptions};
//!
//! let options = SessionOptions::new()
//!     .with_scaling_algorithm(ScalingAlgorithm::Bicubic)
//!     .with_ffmpeg_log_level(FfmpegLogLevel::Error);
//! let session = MediaSession::open_with_options("input.mp4", &options)?;
//! # Ok::<(), media_retriever::RetrieverError>(())
//! ```

use std::str::FromStr;

use ffmpeg_next::software::scaling::Flags as ScalingFlags;

use crate::ffmpeg::FfmpegLogLevel;

/// Interpolation used when converting decoded pixels to RGB.
///
/// Output resolution always equals input resolution; the algorithm only
/// affects chroma upsampling quality and speed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ScalingAlgorithm {
    /// Fast bilinear. The default.
    #[default]
    FastBilinear,
    /// Bilinear.
    Bilinear,
    /// Bicubic.
    Bicubic,
    /// Lanczos.
    Lanczos,
    /// Nearest neighbour.
    Point,
}

impl ScalingAlgorithm {
    pub(crate) fn to_flags(self) -> ScalingFlags {
        match self {
            ScalingAlgorithm::FastBilinear => ScalingFlags::FAST_BILINEAR,
            ScalingAlgorithm::Bilinear => ScalingFlags::BILINEAR,
            ScalingAlgorithm::Bicubic => ScalingFlags::BICUBIC,
            ScalingAlgorithm::Lanczos => ScalingFlags::LANCZOS,
            ScalingAlgorithm::Point => ScalingFlags::POINT,
        }
    }
}

impl FromStr for ScalingAlgorithm {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "fast-bilinear" | "fast_bilinear" | "fast" => Ok(ScalingAlgorithm::FastBilinear),
            "bilinear" => Ok(ScalingAlgorithm::Bilinear),
            "bicubic" => Ok(ScalingAlgorithm::Bicubic),
            "lanczos" => Ok(ScalingAlgorithm::Lanczos),
            "point" | "nearest" => Ok(ScalingAlgorithm::Point),
            other => Err(format!("unknown scaling algorithm: {other}")),
        }
    }
}

/// Options applied when a session opens.
#[derive(Debug, Clone, Default)]
pub struct SessionOptions {
    pub(crate) scaling_algorithm: ScalingAlgorithm,
    pub(crate) ffmpeg_log_level: Option<FfmpegLogLevel>,
}

impl SessionOptions {
    /// Default options: fast bilinear scaling, FFmpeg log level untouched.
    pub fn new() -> Self {
        Self::default()
    }

    /// Set the interpolation used by the image normalizer.
    #[must_use]
    pub fn with_scaling_algorithm(mut self, algorithm: ScalingAlgorithm) -> Self {
        self.scaling_algorithm = algorithm;
        self
    }

    /// Set FFmpeg's process-wide log level when the session opens.
    #[must_use]
    pub fn with_ffmpeg_log_level(mut self, level: FfmpegLogLevel) -> Self {
        self.ffmpeg_log_level = Some(level);
        self
    }

    /// The configured scaling algorithm.
    pub fn scaling_algorithm(&self) -> ScalingAlgorithm {
        self.scaling_algorithm
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_match_plain_open() {
        let options = SessionOptions::new();
        assert_eq!(options.scaling_algorithm(), ScalingAlgorithm::FastBilinear);
        assert!(options.ffmpeg_log_level.is_none());
    }

    #[test]
    fn builder_overrides() {
        let options = SessionOptions::new()
            .with_scaling_algorithm(ScalingAlgorithm::Lanczos)
            .with_ffmpeg_log_level(FfmpegLogLevel::Quiet);
        assert_eq!(options.scaling_algorithm(), ScalingAlgorithm::Lanczos);
        assert_eq!(options.ffmpeg_log_level, Some(FfmpegLogLevel::Quiet));
    }

    #[test]
    fn parses_algorithm_names() {
        assert_eq!("fast".parse(), Ok(ScalingAlgorithm::FastBilinear));
        assert_eq!("Bicubic".parse(), Ok(ScalingAlgorithm::Bicubic));
        assert_eq!("nearest".parse(), Ok(ScalingAlgorithm::Point));
        assert!("sinc-ish".parse::<ScalingAlgorithm>().is_err());
    }
}
