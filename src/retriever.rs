//! Reusable retriever slot.
//!
//! [`MetadataRetriever`] wraps an optional [`MediaSession`] so a host can
//! keep one long-lived object and point it at successive files, the way
//! platform media retrievers are usually driven. Every query on an empty or
//! released slot returns `None`.
//!
//! # Example
//!
//! ```no_run
//! use media_retriever::{MetadataRetriever, SeekPolicy, metadata};
//!
//! let mut retriever = MetadataRetriever::new();
//! retriever.set_data_source("clip.mp4")?;
//! let duration = retriever.extract_metadata(metadata::DURATION);
//! let frame = retriever.frame_at_time(1_000_000, SeekPolicy::ClosestSync);
//! retriever.release();
//! assert!(retriever.frame().is_none());
//! # Ok::<(), media_retriever::RetrieverError>(())
//! ```

use std::path::Path;

use crate::{
    configuration::SessionOptions,
    error::RetrieverError,
    image_buffer::ImageBuffer,
    seek::SeekPolicy,
    session::MediaSession,
};

/// Time value meaning "no particular time" in
/// [`frame_at_time`](MetadataRetriever::frame_at_time).
pub const ANY_TIME: i64 = -1;

/// A reusable slot holding at most one open [`MediaSession`].
#[derive(Debug, Default)]
pub struct MetadataRetriever {
    session: Option<MediaSession>,
    options: SessionOptions,
}

impl MetadataRetriever {
    /// Create an empty retriever.
    pub fn new() -> Self {
        Self::default()
    }

    /// Create an empty retriever that opens sources with `options`.
    pub fn with_options(options: SessionOptions) -> Self {
        Self {
            session: None,
            options,
        }
    }

    /// Open `path`, replacing whatever was open before.
    ///
    /// The previous session is released first. If opening fails the slot
    /// is left empty.
    ///
    /// # Errors
    ///
    /// Propagates [`MediaSession::open_with_options`] errors.
    pub fn set_data_source<P: AsRef<Path>>(&mut self, path: P) -> Result<(), RetrieverError> {
        if let Some(previous) = self.session.take() {
            previous.release();
        }
        self.session = Some(MediaSession::open_with_options(path, &self.options)?);
        Ok(())
    }

    /// Whether a source is currently open.
    pub fn is_open(&self) -> bool {
        self.session.is_some()
    }

    /// The open session, if any.
    pub fn session(&self) -> Option<&MediaSession> {
        self.session.as_ref()
    }

    /// Mutable access to the open session, if any.
    pub fn session_mut(&mut self) -> Option<&mut MediaSession> {
        self.session.as_mut()
    }

    /// Look up a metadata value. `None` when empty or the key is unset.
    pub fn extract_metadata(&self, key: &str) -> Option<String> {
        self.session.as_ref()?.metadata(key).map(str::to_string)
    }

    /// Retrieve a frame near `time_us` microseconds.
    ///
    /// [`ANY_TIME`] skips seeking and returns the next available frame.
    pub fn frame_at_time(&mut self, time_us: i64, policy: SeekPolicy) -> Option<ImageBuffer> {
        let microseconds = (time_us != ANY_TIME).then_some(time_us);
        self.session.as_mut()?.frame(microseconds, policy)
    }

    /// Retrieve a frame using an integer seek option code.
    ///
    /// Unknown codes yield `None`.
    pub fn frame_at_time_with_option(&mut self, time_us: i64, option: i32) -> Option<ImageBuffer> {
        match SeekPolicy::try_from(option) {
            Ok(policy) => self.frame_at_time(time_us, policy),
            Err(error) => {
                log::warn!("{error}");
                None
            }
        }
    }

    /// Retrieve the next available frame without seeking.
    pub fn frame(&mut self) -> Option<ImageBuffer> {
        self.frame_at_time(ANY_TIME, SeekPolicy::default())
    }

    /// Retrieve the embedded cover picture.
    pub fn embedded_picture(&mut self) -> Option<ImageBuffer> {
        self.session.as_mut()?.embedded_picture()
    }

    /// Release the open session. Does nothing if the slot is empty.
    pub fn release(&mut self) {
        if let Some(session) = self.session.take() {
            session.release();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn empty_slot_answers_none() {
        let mut retriever = MetadataRetriever::new();

        assert!(!retriever.is_open());
        assert_eq!(retriever.extract_metadata("duration"), None);
        assert!(retriever.frame().is_none());
        assert!(retriever.frame_at_time(1_000_000, SeekPolicy::Closest).is_none());
        assert!(retriever.embedded_picture().is_none());
    }

    #[test]
    fn release_is_idempotent() {
        let mut retriever = MetadataRetriever::new();
        retriever.release();
        retriever.release();
        assert!(!retriever.is_open());
    }

    #[test]
    fn failed_open_leaves_slot_empty() {
        let mut retriever = MetadataRetriever::new();
        let result = retriever.set_data_source("definitely/not/here.mp4");

        assert!(matches!(result, Err(RetrieverError::FileOpen { .. })));
        assert!(!retriever.is_open());
        assert!(retriever.frame().is_none());
    }

    #[test]
    fn unknown_option_code_yields_none() {
        let mut retriever = MetadataRetriever::new();
        assert!(retriever.frame_at_time_with_option(0, 42).is_none());
    }
}
