//! Still-image normalization.
//!
//! Turns a decoded video frame into PNG bytes: rescale to RGB24 at the
//! frame's own resolution, then run it through FFmpeg's PNG encoder. The
//! scaler and encoder are created per call and dropped on every exit path,
//! so a failed conversion never leaks a context or hands back a partial
//! image.

use ffmpeg_next::{
    Packet, Rational,
    codec::{Id, context::Context as CodecContext},
    format::Pixel,
    frame::Video as VideoFrame,
    software::scaling::{Context as ScalingContext, Flags as ScalingFlags},
};

use crate::error::RetrieverError;
use crate::image_buffer::{ImageBuffer, StillImageFormat};

/// Codec every decoded frame is encoded with.
const TARGET_CODEC: Id = Id::PNG;
/// Working pixel format fed to the encoder.
const TARGET_PIXEL_FORMAT: Pixel = Pixel::RGB24;

/// Encoder hints carried over from the source decoder.
#[derive(Debug, Clone, Copy)]
pub(crate) struct EncoderHints {
    /// Source bit rate in bits per second (0 when unknown).
    pub bit_rate: usize,
    /// Source time base.
    pub time_base: Rational,
}

impl EncoderHints {
    fn time_base_or_default(&self) -> Rational {
        if self.time_base.numerator() > 0 && self.time_base.denominator() > 0 {
            self.time_base
        } else {
            Rational::new(1, 25)
        }
    }
}

/// Convert a decoded frame into an encoded PNG.
///
/// Returns `Ok(None)` if the encoder accepted the frame but produced no
/// bytes.
pub(crate) fn normalize_frame(
    frame: &VideoFrame,
    hints: EncoderHints,
    scaling: ScalingFlags,
) -> Result<Option<ImageBuffer>, RetrieverError> {
    let width = frame.width();
    let height = frame.height();

    log::debug!(
        "Normalizing {}x{} {:?} frame to {:?}",
        width,
        height,
        frame.format(),
        TARGET_CODEC,
    );

    let codec = ffmpeg_next::encoder::find(TARGET_CODEC).ok_or_else(|| {
        RetrieverError::ImageEncodeError(format!("no encoder available for {TARGET_CODEC:?}"))
    })?;

    let mut encoder = CodecContext::new_with_codec(codec)
        .encoder()
        .video()
        .map_err(|error| {
            RetrieverError::ImageEncodeError(format!("cannot create encoder context: {error}"))
        })?;

    encoder.set_bit_rate(hints.bit_rate);
    encoder.set_width(width);
    encoder.set_height(height);
    encoder.set_format(TARGET_PIXEL_FORMAT);
    encoder.set_time_base(hints.time_base_or_default());

    let mut encoder = encoder.open_as(codec).map_err(|error| {
        RetrieverError::ImageEncodeError(format!("cannot open encoder: {error}"))
    })?;

    let mut scaler = ScalingContext::get(
        frame.format(),
        width,
        height,
        TARGET_PIXEL_FORMAT,
        width,
        height,
        scaling,
    )
    .map_err(|error| RetrieverError::ScalingError(format!("cannot create scaler: {error}")))?;

    let mut rgb_frame = VideoFrame::empty();
    scaler
        .run(frame, &mut rgb_frame)
        .map_err(|error| RetrieverError::ScalingError(error.to_string()))?;
    rgb_frame.set_pts(frame.pts());

    encoder.send_frame(&rgb_frame).map_err(|error| {
        RetrieverError::ImageEncodeError(format!("send_frame failed: {error}"))
    })?;

    let mut packet = Packet::empty();
    if encoder.receive_packet(&mut packet).is_err() {
        // Some encoders hold the picture until they see end of stream.
        encoder.send_eof().map_err(|error| {
            RetrieverError::ImageEncodeError(format!("send_eof failed: {error}"))
        })?;
        encoder.receive_packet(&mut packet).map_err(|error| {
            RetrieverError::ImageEncodeError(format!("receive_packet failed: {error}"))
        })?;
    }

    let bytes = packet.data().map(<[u8]>::to_vec).unwrap_or_default();
    Ok(ImageBuffer::new(bytes, StillImageFormat::NORMALIZED))
}
