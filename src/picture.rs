//! Embedded cover art.
//!
//! Containers such as MP3, M4A and MKV store album or poster art as a
//! stream flagged with the "attached picture" disposition. The picture is
//! parsed with the container header when the session opens, so retrieving
//! it never moves the demuxer.

use ffmpeg_next::{
    Packet,
    codec::{Id, context::Context as CodecContext, decoder::Video as VideoDecoder},
    format::stream::Disposition,
    frame::Video as VideoFrame,
};
use image::ImageFormat;

use crate::{
    error::{RetrieverError, settle},
    image_buffer::{ImageBuffer, StillImageFormat},
    normalize::{EncoderHints, normalize_frame},
    session::MediaSession,
};

/// An attached picture copied out of its stream.
struct AttachedPicture {
    stream_index: usize,
    /// Stream the picture packet claims to belong to.
    packet_stream_index: Option<usize>,
    codec_id: Id,
    payload: Vec<u8>,
}

impl MediaSession {
    /// Retrieve the embedded cover picture, if the source has one.
    ///
    /// Every attached-picture stream is examined and the last one that
    /// yields an image wins. Pictures already in a passthrough format come
    /// back byte for byte.
    ///
    /// # Example
    ///
    /// ```no_run
    /// use media_retriever::MediaSession;
    ///
    /// let mut session = MediaSession::open("album.mp3")?;
    /// if let Some(cover) = session.embedded_picture() {
    ///     cover.save(format!("cover.{}", cover.format().extension()))?;
    /// }
    /// # Ok::<(), media_retriever::RetrieverError>(())
    /// ```
    pub fn embedded_picture(&mut self) -> Option<ImageBuffer> {
        settle("embedded_picture", self.retrieve_embedded_picture())
    }

    fn retrieve_embedded_picture(&mut self) -> Result<Option<ImageBuffer>, RetrieverError> {
        let pictures = self.attached_pictures();
        if pictures.is_empty() {
            log::debug!("No attached picture in {}", self.file_path.display());
            return Ok(None);
        }

        let mut result = None;
        for picture in pictures {
            log::debug!(
                "Found attached picture in stream {} ({} bytes, {:?})",
                picture.stream_index,
                picture.payload.len(),
                picture.codec_id,
            );
            match self.picture_to_image(picture) {
                Ok(Some(image)) => result = Some(image),
                Ok(None) => {}
                Err(error) => {
                    log::warn!("Could not convert attached picture: {error}");
                    break;
                }
            }
        }
        Ok(result)
    }

    fn attached_pictures(&self) -> Vec<AttachedPicture> {
        self.input_context
            .streams()
            .filter(|stream| stream.disposition().contains(Disposition::ATTACHED_PIC))
            .filter_map(|stream| {
                // SAFETY: `attached_pic` is owned by the stream, which lives as
                // long as the input context; the payload is copied out before
                // the borrow ends.
                let (packet_stream_index, payload) = unsafe {
                    let packet = &(*stream.as_ptr()).attached_pic;
                    if packet.data.is_null() || packet.size <= 0 {
                        return None;
                    }
                    (
                        usize::try_from(packet.stream_index).ok(),
                        std::slice::from_raw_parts(packet.data, packet.size as usize).to_vec(),
                    )
                };

                Some(AttachedPicture {
                    stream_index: stream.index(),
                    packet_stream_index,
                    codec_id: stream.parameters().id(),
                    payload,
                })
            })
            .collect()
    }

    fn picture_to_image(
        &mut self,
        picture: AttachedPicture,
    ) -> Result<Option<ImageBuffer>, RetrieverError> {
        let scaling = self.options.scaling_algorithm.to_flags();

        let selected_video = self.video.as_mut().filter(|video| {
            picture.packet_stream_index == Some(video.descriptor.index)
        });

        if let Some(video) = selected_video {
            if let Some(format) = StillImageFormat::from_codec_id(video.descriptor.codec_id) {
                return Ok(ImageBuffer::new(picture.payload, format));
            }

            let hints = video.hints;
            video.decoder.flush();
            let frame = decode_picture(&mut video.decoder, &picture.payload);
            video.decoder.flush();
            return match frame? {
                Some(frame) => normalize_frame(&frame, hints, scaling),
                None => Ok(None),
            };
        }

        if let Some(format) = StillImageFormat::from_codec_id(picture.codec_id).or_else(|| {
            image::guess_format(&picture.payload)
                .ok()
                .and_then(still_format_from_image_format)
        }) {
            return Ok(ImageBuffer::new(picture.payload, format));
        }

        // Not a format callers can display and not the selected stream:
        // decode it with a throwaway decoder.
        let stream = self
            .input_context
            .stream(picture.stream_index)
            .ok_or(RetrieverError::NoVideoStream)?;
        let hints = EncoderHints {
            bit_rate: 0,
            time_base: stream.time_base(),
        };
        let mut decoder = CodecContext::from_parameters(stream.parameters())?
            .decoder()
            .video()
            .map_err(|error| RetrieverError::DecoderOpen {
                stream_index: picture.stream_index,
                codec: picture.codec_id.name().to_string(),
                reason: error.to_string(),
            })?;

        match decode_picture(&mut decoder, &picture.payload)? {
            Some(frame) => normalize_frame(&frame, hints, scaling),
            None => Ok(None),
        }
    }
}

/// Decode a single self-contained picture packet.
fn decode_picture(
    decoder: &mut VideoDecoder,
    payload: &[u8],
) -> Result<Option<VideoFrame>, RetrieverError> {
    let packet = Packet::copy(payload);
    decoder
        .send_packet(&packet)
        .map_err(|error| RetrieverError::VideoDecodeError(error.to_string()))?;

    let mut frame = VideoFrame::empty();
    if decoder.receive_frame(&mut frame).is_ok() {
        return Ok(Some(frame));
    }

    decoder
        .send_eof()
        .map_err(|error| RetrieverError::VideoDecodeError(error.to_string()))?;
    Ok(decoder.receive_frame(&mut frame).ok().map(|()| frame))
}

fn still_format_from_image_format(format: ImageFormat) -> Option<StillImageFormat> {
    match format {
        ImageFormat::Png => Some(StillImageFormat::Png),
        ImageFormat::Jpeg => Some(StillImageFormat::Jpeg),
        ImageFormat::Bmp => Some(StillImageFormat::Bmp),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use ffmpeg_next::software::scaling::Flags as ScalingFlags;

    use super::*;

    #[test]
    fn sniffed_formats_map_to_passthrough_formats() {
        let png = image::guess_format(b"\x89PNG\r\n\x1a\n\0\0\0\rIHDR").ok();
        assert_eq!(png.and_then(still_format_from_image_format), Some(StillImageFormat::Png));

        let jpeg = image::guess_format(&[0xff, 0xd8, 0xff, 0xe0, 0, 0x10]).ok();
        assert_eq!(jpeg.and_then(still_format_from_image_format), Some(StillImageFormat::Jpeg));

        assert_eq!(still_format_from_image_format(ImageFormat::Gif), None);
    }

    #[test]
    fn gif_picture_decodes_and_normalizes_to_png() {
        use std::io::Cursor;

        use ffmpeg_next::Rational;
        use image::{Rgba, RgbaImage};

        ffmpeg_next::init().expect("ffmpeg init");

        let mut gif = Vec::new();
        RgbaImage::from_pixel(8, 4, Rgba([200, 40, 90, 255]))
            .write_to(&mut Cursor::new(&mut gif), ImageFormat::Gif)
            .expect("encode gif");

        let codec = ffmpeg_next::decoder::find(Id::GIF).expect("gif decoder");
        let mut decoder = CodecContext::new_with_codec(codec)
            .decoder()
            .video()
            .expect("open gif decoder");

        let frame = decode_picture(&mut decoder, &gif)
            .expect("decode")
            .expect("one frame");
        let hints = EncoderHints {
            bit_rate: 0,
            time_base: Rational::new(1, 90_000),
        };
        let image = normalize_frame(&frame, hints, ScalingFlags::FAST_BILINEAR)
            .expect("normalize")
            .expect("png bytes");

        assert_eq!(image.format(), StillImageFormat::Png);
        let decoded = image.decode().expect("valid png");
        assert_eq!((decoded.width(), decoded.height()), (8, 4));
    }
}
