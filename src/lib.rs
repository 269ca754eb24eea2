//! # media_retriever
//!
//! Retrieve metadata, still frames, and embedded cover art from media files.
//!
//! `media_retriever` opens one container per [`MediaSession`], probes its
//! streams, and answers three kinds of question about it:
//!
//! - **Metadata**: container tags plus `duration` (milliseconds),
//!   `audio_codec` and `video_codec`, looked up by exact key.
//! - **Frames**: a still frame near a timestamp, located with one of four
//!   [`SeekPolicy`] variants, returned as an encoded [`ImageBuffer`].
//! - **Cover art**: the stream flagged as an attached picture, if any.
//!
//! Images always come back in a format a caller can display directly:
//! streams already coded as PNG, Motion-JPEG or BMP are passed through
//! untouched, everything else is decoded and re-encoded as PNG. Demuxing,
//! decoding, scaling and encoding are done by FFmpeg via
//! [`ffmpeg-next`](https://crates.io/crates/ffmpeg-next).
//!
//! ## Quick Start
//!
//! ```no_run
//! use std::time::Duration;
//!
//! use media_retriever::{MediaSession, SeekPolicy, metadata};
//!
//! let mut session = MediaSession::open("input.mp4")?;
//! println!("duration: {:?} ms", session.metadata(metadata::DURATION));
//!
//! if let Some(frame) = session.frame_at(Duration::from_secs(3), SeekPolicy::PreviousSync) {
//!     frame.save("thumbnail.png")?;
//! }
//! if let Some(cover) = session.embedded_picture() {
//!     cover.save(format!("cover.{}", cover.format().extension()))?;
//! }
//! session.release();
//! # Ok::<(), media_retriever::RetrieverError>(())
//! ```
//!
//! ## Errors
//!
//! Only opening a source returns `Err`. Frame and picture lookups return
//! `None` for anything that goes wrong after that (failed seek, end of
//! stream, decode failure) and log the cause through the `log` crate.
//!
//! ## Requirements
//!
//! FFmpeg development libraries must be installed on your system.

mod conversion;
pub mod configuration;
pub mod error;
pub mod ffmpeg;
pub mod image_buffer;
pub mod metadata;
mod normalize;
pub mod picture;
pub mod retriever;
pub mod seek;
pub mod session;
pub mod stream;
pub mod video;

pub use configuration::{ScalingAlgorithm, SessionOptions};
pub use error::RetrieverError;
pub use ffmpeg::{FfmpegLogLevel, get_ffmpeg_log_level, set_ffmpeg_log_level};
pub use image_buffer::{ImageBuffer, StillImageFormat};
pub use metadata::MetadataDictionary;
pub use retriever::{ANY_TIME, MetadataRetriever};
pub use seek::SeekPolicy;
pub use session::MediaSession;
pub use stream::{MediaKind, StreamDescriptor, StreamSelection, select_streams};
