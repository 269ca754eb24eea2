//! Still-frame retrieval.
//!
//! Adds the frame lookups to [`MediaSession`]. A lookup optionally seeks the
//! selected video stream according to a [`SeekPolicy`], then reads packets
//! until the video stream yields something to return:
//!
//! - streams already coded as PNG, Motion-JPEG or BMP hand back the packet
//!   payload untouched;
//! - anything else is decoded and the frame normalized to PNG.
//!
//! Nothing found is `None`, never an error.

use std::time::Duration;

use ffmpeg_next::{Error as FfmpegError, Packet, frame::Video as VideoFrame};

use crate::{
    error::{RetrieverError, settle},
    image_buffer::{ImageBuffer, StillImageFormat},
    normalize::normalize_frame,
    seek::{SeekDirection, SeekPlan, SeekPolicy},
    session::MediaSession,
};

impl MediaSession {
    /// Retrieve a still frame.
    ///
    /// With `microseconds = None` no seek happens and the next frame from
    /// the current position is returned, which on a fresh session is the
    /// first frame. Otherwise the time is converted to the video stream's
    /// time base, clamped to the stream duration, and resolved with
    /// `policy`. Negative times yield `None`.
    ///
    /// Returns `None` if the source has no video stream, the seek fails,
    /// the stream ends first, or decoding or encoding fails.
    pub fn frame(&mut self, microseconds: Option<i64>, policy: SeekPolicy) -> Option<ImageBuffer> {
        settle("frame", self.retrieve_frame(microseconds, policy))
    }

    /// Retrieve the frame at `microseconds` using `policy`.
    pub fn frame_at_micros(&mut self, microseconds: i64, policy: SeekPolicy) -> Option<ImageBuffer> {
        self.frame(Some(microseconds), policy)
    }

    /// Retrieve the frame at `timestamp` using `policy`.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use std::time::Duration;
    ///
    /// use media_retriever::{MediaSession, SeekPolicy};
    ///
    /// let mut session = MediaSession::open("input.mp4")?;
    /// let thumbnail = session.frame_at(Duration::from_secs(5), SeekPolicy::ClosestSync);
    /// # Ok::<(), media_retriever::RetrieverError>(())
    /// ```
    pub fn frame_at(&mut self, timestamp: Duration, policy: SeekPolicy) -> Option<ImageBuffer> {
        let microseconds = i64::try_from(timestamp.as_micros()).unwrap_or(i64::MAX);
        self.frame(Some(microseconds), policy)
    }

    /// Retrieve the next frame without seeking.
    pub fn next_frame(&mut self) -> Option<ImageBuffer> {
        self.frame(None, SeekPolicy::default())
    }

    fn retrieve_frame(
        &mut self,
        microseconds: Option<i64>,
        policy: SeekPolicy,
    ) -> Result<Option<ImageBuffer>, RetrieverError> {
        let Some(video) = self.video.as_ref() else {
            log::debug!("No video stream in {}", self.file_path.display());
            return Ok(None);
        };
        let stream_index = video.descriptor.index;
        let time_base = video.descriptor.time_base;
        let stream_duration = video.descriptor.duration;

        let mut target_ordinal = None;
        if let Some(microseconds) = microseconds {
            let Some(plan) = SeekPlan::resolve(microseconds, policy, time_base, stream_duration)
            else {
                log::debug!("Rejected frame request at {microseconds}us ({policy})");
                return Ok(None);
            };

            log::debug!(
                "Seeking stream {stream_index} to {} ({:?}) for {microseconds}us ({policy})",
                plan.timestamp,
                plan.direction,
            );
            self.seek_video(stream_index, plan)?;
            target_ordinal = plan.target_ordinal;
        }

        self.decode_next_frame(target_ordinal)
    }

    /// Seek the video stream and drop any frames buffered before the seek.
    fn seek_video(&mut self, stream_index: usize, plan: SeekPlan) -> Result<(), RetrieverError> {
        let mut result = self.seek_stream(stream_index, plan.timestamp, plan.direction);

        // A forward seek at the very end of a stream has no sync point to
        // land on; fall back to the last one before it.
        if result.is_err() && plan.direction == SeekDirection::Forward {
            log::debug!("Forward seek failed, retrying backward");
            result = self.seek_stream(stream_index, plan.timestamp, SeekDirection::Backward);
        }
        result?;

        // Only the video decoder is ever opened, so it is the only one with
        // buffered state.
        if let Some(video) = self.video.as_mut() {
            video.decoder.flush();
        }
        Ok(())
    }

    fn seek_stream(
        &mut self,
        stream_index: usize,
        timestamp: i64,
        direction: SeekDirection,
    ) -> Result<(), RetrieverError> {
        let stream_index_raw = i32::try_from(stream_index).map_err(|_| RetrieverError::SeekFailed {
            stream_index,
            timestamp,
            reason: "stream index out of range".to_string(),
        })?;

        // SAFETY: the pointer comes from the live input context owned by
        // this session, and `stream_index` was taken from its stream list.
        let status = unsafe {
            ffmpeg_sys_next::av_seek_frame(
                self.input_context.as_mut_ptr(),
                stream_index_raw,
                timestamp,
                direction.flags(),
            )
        };

        if status < 0 {
            return Err(RetrieverError::SeekFailed {
                stream_index,
                timestamp,
                reason: FfmpegError::from(status).to_string(),
            });
        }
        Ok(())
    }

    /// Read packets until the video stream produces an image.
    ///
    /// With a `target_ordinal`, decoded frames are counted and the first
    /// frame whose count reaches the target is returned; if the stream ends
    /// first, the last decoded frame is returned instead.
    fn decode_next_frame(
        &mut self,
        target_ordinal: Option<i64>,
    ) -> Result<Option<ImageBuffer>, RetrieverError> {
        let scaling = self.options.scaling_algorithm.to_flags();
        let Some(video) = self.video.as_mut() else {
            return Ok(None);
        };
        let stream_index = video.descriptor.index;
        let hints = video.hints;
        let passthrough = StillImageFormat::from_codec_id(video.descriptor.codec_id);
        let reached = |count: i64| target_ordinal.is_none_or(|target| count >= target);

        let mut packet = Packet::empty();
        let mut decoded = VideoFrame::empty();
        let mut previous = VideoFrame::empty();
        let mut have_previous = false;
        let mut frames_decoded: i64 = 0;

        // Frames still queued from an earlier call come before new packets.
        if passthrough.is_none() {
            while video.decoder.receive_frame(&mut decoded).is_ok() {
                frames_decoded += 1;
                if reached(frames_decoded) {
                    log::debug!("Emitting buffered frame #{frames_decoded}");
                    return normalize_frame(&decoded, hints, scaling);
                }
                std::mem::swap(&mut decoded, &mut previous);
                have_previous = true;
            }
        }

        loop {
            match packet.read(&mut self.input_context) {
                Ok(()) => {}
                Err(FfmpegError::Eof) => break,
                Err(error) => {
                    log::debug!("Stopped reading packets: {error}");
                    break;
                }
            }

            if packet.stream() != stream_index {
                continue;
            }

            if let Some(format) = passthrough {
                let bytes = packet.data().map(<[u8]>::to_vec).unwrap_or_default();
                if let Some(image) = ImageBuffer::new(bytes, format) {
                    log::debug!("Passing through {} byte {:?} packet", image.len(), format);
                    return Ok(Some(image));
                }
                continue;
            }

            video
                .decoder
                .send_packet(&packet)
                .map_err(|error| RetrieverError::VideoDecodeError(error.to_string()))?;

            while video.decoder.receive_frame(&mut decoded).is_ok() {
                frames_decoded += 1;
                if reached(frames_decoded) {
                    log::debug!("Emitting decoded frame #{frames_decoded}");
                    return normalize_frame(&decoded, hints, scaling);
                }
                std::mem::swap(&mut decoded, &mut previous);
                have_previous = true;
            }
        }

        // End of stream: drain whatever the decoder is still holding.
        let mut found = false;
        if video.decoder.send_eof().is_ok() {
            while video.decoder.receive_frame(&mut decoded).is_ok() {
                frames_decoded += 1;
                if reached(frames_decoded) {
                    found = true;
                    break;
                }
                std::mem::swap(&mut decoded, &mut previous);
                have_previous = true;
            }
        }

        let result = if found {
            normalize_frame(&decoded, hints, scaling)
        } else if target_ordinal.is_some() && have_previous {
            log::debug!(
                "Stream ended after {frames_decoded} frames, before ordinal {target_ordinal:?}; using the last one"
            );
            normalize_frame(&previous, hints, scaling)
        } else {
            Ok(None)
        };

        // Leave the decoder usable after end of stream.
        video.decoder.flush();
        result
    }
}
