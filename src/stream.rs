//! Stream descriptors and role selection.
//!
//! When a source opens, every demuxed stream is described once by a
//! [`StreamDescriptor`]. [`select_streams`] then picks the first audio and
//! first video stream and records a codec tag for every stream it sees.

use ffmpeg_next::{
    Rational,
    codec::Id,
    format::stream::{Disposition, Stream},
    media::Type,
};

use crate::conversion::NO_TIMESTAMP;
use crate::metadata::{AUDIO_CODEC, MetadataDictionary, VIDEO_CODEC};

/// Media type of a stream, reduced to what the retriever cares about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MediaKind {
    /// An audio stream.
    Audio,
    /// A video stream, including attached cover pictures.
    Video,
    /// Subtitles, data, attachments, or anything unknown.
    Other,
}

impl From<Type> for MediaKind {
    fn from(medium: Type) -> Self {
        match medium {
            Type::Audio => MediaKind::Audio,
            Type::Video => MediaKind::Video,
            _ => MediaKind::Other,
        }
    }
}

/// Read-only view of one demuxed stream.
#[derive(Debug, Clone, PartialEq)]
pub struct StreamDescriptor {
    /// Position in the container's stream list.
    pub index: usize,
    /// Media type.
    pub kind: MediaKind,
    /// FFmpeg codec identifier.
    pub codec_id: Id,
    /// Human-readable codec name (e.g. `"h264"`, `"mjpeg"`).
    pub codec_name: String,
    /// Whether the stream carries the "attached picture" disposition.
    pub attached_picture: bool,
    /// Unit in which the stream's timestamps are expressed.
    pub time_base: Rational,
    /// Stream duration in `time_base` units, if the container reports one.
    pub duration: Option<i64>,
}

impl StreamDescriptor {
    pub(crate) fn from_stream(stream: &Stream<'_>) -> Self {
        let parameters = stream.parameters();
        let codec_id = parameters.id();
        let duration = stream.duration();

        Self {
            index: stream.index(),
            kind: MediaKind::from(parameters.medium()),
            codec_id,
            codec_name: codec_id.name().to_string(),
            attached_picture: stream.disposition().contains(Disposition::ATTACHED_PIC),
            time_base: stream.time_base(),
            duration: (duration != NO_TIMESTAMP && duration >= 0).then_some(duration),
        }
    }
}

/// Outcome of scanning a source's streams.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct StreamSelection {
    /// First video stream in source order.
    pub video: Option<StreamDescriptor>,
    /// First audio stream in source order.
    pub audio: Option<StreamDescriptor>,
}

/// Pick the first video and first audio stream, tagging codecs as we go.
///
/// Every audio or video stream writes its codec name under
/// [`AUDIO_CODEC`]/[`VIDEO_CODEC`], so with several streams of one type the
/// last one scanned owns the tag. Streams of any other type add nothing.
pub fn select_streams(
    streams: &[StreamDescriptor],
    metadata: &mut MetadataDictionary,
) -> StreamSelection {
    let mut selection = StreamSelection::default();

    for stream in streams {
        match stream.kind {
            MediaKind::Video => {
                if selection.video.is_none() {
                    selection.video = Some(stream.clone());
                }
                metadata.insert(VIDEO_CODEC, stream.codec_name.as_str());
            }
            MediaKind::Audio => {
                if selection.audio.is_none() {
                    selection.audio = Some(stream.clone());
                }
                metadata.insert(AUDIO_CODEC, stream.codec_name.as_str());
            }
            MediaKind::Other => {}
        }
    }

    log::debug!(
        "Selected streams: video={:?}, audio={:?}",
        selection.video.as_ref().map(|stream| stream.index),
        selection.audio.as_ref().map(|stream| stream.index),
    );

    selection
}
