//! Core [`MediaSession`] implementation.
//!
//! A `MediaSession` owns one opened media source. Opening probes every
//! stream, picks the first audio and video stream, builds the metadata
//! dictionary, and opens a decoder for the video stream. The session is then
//! queried for metadata, frames ([`crate::video`]) and cover art
//! ([`crate::picture`]) until it is released or dropped.

use std::{
    fmt::{Debug, Formatter, Result as FmtResult},
    path::{Path, PathBuf},
};

use ffmpeg_next::{
    codec::{context::Context as CodecContext, decoder::Video as VideoDecoder},
    format::context::Input,
};

use crate::{
    configuration::SessionOptions,
    conversion::container_duration_to_milliseconds,
    error::RetrieverError,
    metadata::{DURATION, MetadataDictionary},
    normalize::EncoderHints,
    stream::{StreamDescriptor, select_streams},
};

/// The selected video stream and its open decoder.
pub(crate) struct VideoTrack {
    pub(crate) descriptor: StreamDescriptor,
    pub(crate) decoder: VideoDecoder,
    pub(crate) hints: EncoderHints,
}

/// One opened media source.
///
/// Created by [`MediaSession::open`]; resources are freed by
/// [`release`](MediaSession::release) or by dropping the value. Operations
/// take `&mut self` where they move the demuxer, so a session cannot be used
/// from two places at once. Distinct sessions share nothing and can live on
/// different threads.
///
/// # Example
///
/// ```no_run
/// use media_retriever::{MediaSession, SeekPolicy, metadata};
///
/// let mut session = MediaSession::open("input.mp4")?;
/// println!("{:?}", session.metadata(metadata::VIDEO_CODEC));
///
/// if let Some(image) = session.frame_at_micros(2_000_000, SeekPolicy::PreviousSync) {
///     image.save("frame.png")?;
/// }
/// session.release();
/// # Ok::<(), media_retriever::RetrieverError>(())
/// ```
pub struct MediaSession {
    /// The opened FFmpeg demuxer.
    pub(crate) input_context: Input,
    /// First video stream, with its decoder.
    pub(crate) video: Option<VideoTrack>,
    /// First audio stream. Never decoded.
    pub(crate) audio: Option<StreamDescriptor>,
    /// Every stream in source order.
    pub(crate) streams: Vec<StreamDescriptor>,
    /// Tags and reserved keys captured at open.
    pub(crate) metadata: MetadataDictionary,
    pub(crate) options: SessionOptions,
    pub(crate) file_path: PathBuf,
}

impl Debug for MediaSession {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        f.debug_struct("MediaSession")
            .field("file_path", &self.file_path)
            .field("video", &self.video.as_ref().map(|track| &track.descriptor))
            .field("audio", &self.audio)
            .field("metadata", &self.metadata)
            .finish_non_exhaustive()
    }
}

impl MediaSession {
    /// Open a media source with default options.
    ///
    /// # Errors
    ///
    /// - [`RetrieverError::FileOpen`] if the container cannot be opened or
    ///   its streams cannot be probed.
    /// - [`RetrieverError::DecoderOpen`] if the source has a video stream but
    ///   no usable decoder for it.
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self, RetrieverError> {
        Self::open_with_options(path, &SessionOptions::default())
    }

    /// Open a media source with explicit [`SessionOptions`].
    ///
    /// # Errors
    ///
    /// Same as [`open`](MediaSession::open).
    pub fn open_with_options<P: AsRef<Path>>(
        path: P,
        options: &SessionOptions,
    ) -> Result<Self, RetrieverError> {
        let path = path.as_ref();
        let file_path = path.to_path_buf();

        log::debug!("Opening media source: {}", file_path.display());

        crate::ffmpeg::initialize().map_err(|error| RetrieverError::FileOpen {
            path: file_path.clone(),
            reason: format!("FFmpeg initialisation failed: {error}"),
        })?;
        if let Some(level) = options.ffmpeg_log_level {
            crate::ffmpeg::set_ffmpeg_log_level(level);
        }

        // Opens the container and probes stream information.
        let input_context =
            ffmpeg_next::format::input(&path).map_err(|error| RetrieverError::FileOpen {
                path: file_path.clone(),
                reason: error.to_string(),
            })?;

        let streams: Vec<StreamDescriptor> = input_context
            .streams()
            .map(|stream| StreamDescriptor::from_stream(&stream))
            .collect();

        let mut metadata: MetadataDictionary = input_context
            .metadata()
            .iter()
            .map(|(key, value)| (key.to_string(), value.to_string()))
            .collect();

        let selection = select_streams(&streams, &mut metadata);

        let duration_milliseconds = container_duration_to_milliseconds(input_context.duration());
        metadata.insert(DURATION, duration_milliseconds.to_string());

        let video = match selection.video {
            Some(descriptor) => Some(open_video_track(&input_context, descriptor)?),
            None => None,
        };

        log::info!(
            "Opened media source: {} (format={}, duration={}ms, streams={}, video={:?}, audio={:?})",
            file_path.display(),
            input_context.format().name(),
            duration_milliseconds,
            streams.len(),
            video.as_ref().map(|track| track.descriptor.codec_name.as_str()),
            selection.audio.as_ref().map(|stream| stream.codec_name.as_str()),
        );

        Ok(Self {
            input_context,
            video,
            audio: selection.audio,
            streams,
            metadata,
            options: options.clone(),
            file_path,
        })
    }

    /// Look up a metadata value by exact key.
    ///
    /// Reserved keys are [`DURATION`](crate::metadata::DURATION),
    /// [`AUDIO_CODEC`](crate::metadata::AUDIO_CODEC) and
    /// [`VIDEO_CODEC`](crate::metadata::VIDEO_CODEC); any container tag is
    /// available under its own name. Returns `None` for unset keys.
    pub fn metadata(&self, key: &str) -> Option<&str> {
        self.metadata.get(key)
    }

    /// The whole metadata dictionary.
    pub fn metadata_dictionary(&self) -> &MetadataDictionary {
        &self.metadata
    }

    /// Every stream in the source, in container order.
    pub fn streams(&self) -> &[StreamDescriptor] {
        &self.streams
    }

    /// The selected video stream, if any.
    pub fn video_stream(&self) -> Option<&StreamDescriptor> {
        self.video.as_ref().map(|track| &track.descriptor)
    }

    /// The selected audio stream, if any.
    pub fn audio_stream(&self) -> Option<&StreamDescriptor> {
        self.audio.as_ref()
    }

    /// Path the session was opened from.
    pub fn path(&self) -> &Path {
        &self.file_path
    }

    /// Close the source and free its decoder.
    ///
    /// Equivalent to dropping the session; provided so that the end of a
    /// session's life is explicit at the call site.
    pub fn release(self) {
        log::debug!("Releasing media source: {}", self.file_path.display());
    }
}

fn open_video_track(
    input_context: &Input,
    descriptor: StreamDescriptor,
) -> Result<VideoTrack, RetrieverError> {
    let decoder_error = |reason: String| RetrieverError::DecoderOpen {
        stream_index: descriptor.index,
        codec: descriptor.codec_name.clone(),
        reason,
    };

    let stream = input_context
        .stream(descriptor.index)
        .ok_or_else(|| decoder_error("stream disappeared after probing".to_string()))?;

    let decoder = CodecContext::from_parameters(stream.parameters())
        .map_err(|error| decoder_error(format!("cannot read codec parameters: {error}")))?
        .decoder()
        .video()
        .map_err(|error| decoder_error(error.to_string()))?;

    let hints = EncoderHints {
        bit_rate: decoder.bit_rate(),
        time_base: descriptor.time_base,
    };

    log::debug!(
        "Opened {} decoder for stream {} ({}x{}, {:?})",
        descriptor.codec_name,
        descriptor.index,
        decoder.width(),
        decoder.height(),
        decoder.format(),
    );

    Ok(VideoTrack {
        descriptor,
        decoder,
        hints,
    })
}
