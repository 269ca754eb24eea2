//! Metadata dictionary.
//!
//! A [`MetadataDictionary`] is built once when a [`MediaSession`](crate::MediaSession)
//! opens and never changes afterwards. It holds the container's own tags
//! plus three reserved keys written by the crate: [`DURATION`],
//! [`AUDIO_CODEC`] and [`VIDEO_CODEC`].
//!
//! # Example
//!
//! ```no_run
//! use media_retriever::{MediaSession, metadata};
//!
//! let session = MediaSession::open("input.mp4")?;
//! let millis = session.metadata(metadata::DURATION).unwrap_or("0");
//! println!("{millis} ms");
//! # Ok::<(), media_retriever::RetrieverError>(())
//! ```

use std::collections::HashMap;

/// Duration of the container in whole milliseconds, as a decimal string.
pub const DURATION: &str = "duration";
/// Codec name of the last audio stream in the container.
pub const AUDIO_CODEC: &str = "audio_codec";
/// Codec name of the last video stream in the container.
pub const VIDEO_CODEC: &str = "video_codec";

/// String-to-string metadata with exact, case-sensitive lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MetadataDictionary {
    entries: HashMap<String, String>,
}

impl MetadataDictionary {
    /// Look up `key`. Returns `None` when the key is unset.
    pub fn get(&self, key: &str) -> Option<&str> {
        self.entries.get(key).map(String::as_str)
    }

    /// Whether `key` is present.
    pub fn contains_key(&self, key: &str) -> bool {
        self.entries.contains_key(key)
    }

    /// Number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the dictionary is empty.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Iterate over all entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&str, &str)> {
        self.entries
            .iter()
            .map(|(key, value)| (key.as_str(), value.as_str()))
    }

    /// The parsed [`DURATION`] entry, if present and numeric.
    pub fn duration_milliseconds(&self) -> Option<u64> {
        self.get(DURATION)?.parse().ok()
    }

    pub(crate) fn insert(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.entries.insert(key.into(), value.into());
    }
}

impl<K: Into<String>, V: Into<String>> FromIterator<(K, V)> for MetadataDictionary {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut dictionary = MetadataDictionary::default();
        for (key, value) in iter {
            dictionary.insert(key, value);
        }
        dictionary
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn lookup_is_exact_and_case_sensitive() {
        let dictionary: MetadataDictionary =
            [("title", "Big Buck Bunny"), (VIDEO_CODEC, "h264")].into_iter().collect();

        assert_eq!(dictionary.get("title"), Some("Big Buck Bunny"));
        assert_eq!(dictionary.get("Title"), None);
        assert_eq!(dictionary.get("tit"), None);
        assert_eq!(dictionary.get(VIDEO_CODEC), Some("h264"));
        assert_eq!(dictionary.get(AUDIO_CODEC), None);
    }

    #[test]
    fn later_insert_wins() {
        let mut dictionary = MetadataDictionary::default();
        dictionary.insert(VIDEO_CODEC, "h264");
        dictionary.insert(VIDEO_CODEC, "mjpeg");
        assert_eq!(dictionary.get(VIDEO_CODEC), Some("mjpeg"));
        assert_eq!(dictionary.len(), 1);
    }

    #[test]
    fn duration_parses_when_numeric() {
        let mut dictionary = MetadataDictionary::default();
        assert_eq!(dictionary.duration_milliseconds(), None);
        dictionary.insert(DURATION, "10000");
        assert_eq!(dictionary.duration_milliseconds(), Some(10_000));
    }
}
