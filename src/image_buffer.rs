//! Encoded still images handed back to callers.
//!
//! Every frame or cover picture leaves the crate as an [`ImageBuffer`]: an
//! owned byte vector already encoded in one of the [`StillImageFormat`]s a
//! caller can display directly. Frames are never returned raw.

use std::path::Path;

use ffmpeg_next::codec::Id;
use image::{DynamicImage, ImageFormat};

use crate::error::RetrieverError;

/// Still-image encodings that leave the crate without re-encoding.
///
/// Streams already coded in one of these are passed through byte for byte;
/// everything else is normalized to [`StillImageFormat::Png`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum StillImageFormat {
    /// Portable Network Graphics. The normalization target.
    Png,
    /// JPEG, as carried by Motion-JPEG streams and most cover art.
    Jpeg,
    /// Windows bitmap.
    Bmp,
}

impl StillImageFormat {
    /// The format every decoded frame is normalized to.
    pub const NORMALIZED: StillImageFormat = StillImageFormat::Png;

    /// Map a codec to a passthrough format, or `None` if it needs decoding.
    pub fn from_codec_id(codec_id: Id) -> Option<Self> {
        match codec_id {
            Id::PNG => Some(StillImageFormat::Png),
            Id::MJPEG => Some(StillImageFormat::Jpeg),
            Id::BMP => Some(StillImageFormat::Bmp),
            _ => None,
        }
    }

    /// Conventional file extension, without the dot.
    pub fn extension(self) -> &'static str {
        match self {
            StillImageFormat::Png => "png",
            StillImageFormat::Jpeg => "jpg",
            StillImageFormat::Bmp => "bmp",
        }
    }

    /// MIME type.
    pub fn mime_type(self) -> &'static str {
        match self {
            StillImageFormat::Png => "image/png",
            StillImageFormat::Jpeg => "image/jpeg",
            StillImageFormat::Bmp => "image/bmp",
        }
    }

    fn image_format(self) -> ImageFormat {
        match self {
            StillImageFormat::Png => ImageFormat::Png,
            StillImageFormat::Jpeg => ImageFormat::Jpeg,
            StillImageFormat::Bmp => ImageFormat::Bmp,
        }
    }
}

/// An encoded still image owned by the caller.
///
/// Never empty: a retrieval that produced no bytes yields `None` instead.
#[derive(Clone, PartialEq, Eq)]
pub struct ImageBuffer {
    bytes: Vec<u8>,
    format: StillImageFormat,
}

impl std::fmt::Debug for ImageBuffer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ImageBuffer")
            .field("format", &self.format)
            .field("len", &self.bytes.len())
            .finish()
    }
}

impl ImageBuffer {
    /// Wrap encoded bytes, rejecting an empty payload.
    pub(crate) fn new(bytes: Vec<u8>, format: StillImageFormat) -> Option<Self> {
        if bytes.is_empty() {
            None
        } else {
            Some(Self { bytes, format })
        }
    }

    /// Encoding of the bytes.
    pub fn format(&self) -> StillImageFormat {
        self.format
    }

    /// Borrow the encoded bytes.
    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Take ownership of the encoded bytes.
    pub fn into_bytes(self) -> Vec<u8> {
        self.bytes
    }

    /// Length in bytes.
    pub fn len(&self) -> usize {
        self.bytes.len()
    }

    /// Always `false`; present for API symmetry with `len`.
    pub fn is_empty(&self) -> bool {
        self.bytes.is_empty()
    }

    /// Write the encoded bytes verbatim to `path`.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::IoError`] if the file cannot be written.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<(), RetrieverError> {
        std::fs::write(path, &self.bytes)?;
        Ok(())
    }

    /// Decode the bytes into pixels with the `image` crate.
    ///
    /// # Errors
    ///
    /// Returns [`RetrieverError::ImageError`] if the bytes are not a valid
    /// image of the recorded format.
    pub fn decode(&self) -> Result<DynamicImage, RetrieverError> {
        Ok(image::load_from_memory_with_format(
            &self.bytes,
            self.format.image_format(),
        )?)
    }
}

impl AsRef<[u8]> for ImageBuffer {
    fn as_ref(&self) -> &[u8] {
        &self.bytes
    }
}

#[cfg(test)]
mod tests {
    use std::io::Cursor;

    use image::{Rgb, RgbImage};

    use super::*;

    #[test]
    fn passthrough_allow_list() {
        assert_eq!(StillImageFormat::from_codec_id(Id::PNG), Some(StillImageFormat::Png));
        assert_eq!(StillImageFormat::from_codec_id(Id::MJPEG), Some(StillImageFormat::Jpeg));
        assert_eq!(StillImageFormat::from_codec_id(Id::BMP), Some(StillImageFormat::Bmp));
        assert_eq!(StillImageFormat::from_codec_id(Id::H264), None);
        assert_eq!(StillImageFormat::from_codec_id(Id::GIF), None);
    }

    #[test]
    fn empty_payload_is_absent() {
        assert!(ImageBuffer::new(Vec::new(), StillImageFormat::Png).is_none());
    }

    #[test]
    fn decodes_png_bytes() {
        let mut bytes = Vec::new();
        RgbImage::from_pixel(4, 2, Rgb([10, 20, 30]))
            .write_to(&mut Cursor::new(&mut bytes), ImageFormat::Png)
            .expect("encode png");

        let buffer = ImageBuffer::new(bytes, StillImageFormat::Png).expect("non-empty");
        let decoded = buffer.decode().expect("decode");

        assert_eq!((decoded.width(), decoded.height()), (4, 2));
        assert_eq!(decoded.to_rgb8().get_pixel(3, 1), &Rgb([10, 20, 30]));
    }

    #[test]
    fn garbage_bytes_fail_to_decode() {
        let buffer = ImageBuffer::new(b"not an image".to_vec(), StillImageFormat::Jpeg)
            .expect("non-empty");
        assert!(buffer.decode().is_err());
    }

    #[test]
    fn save_writes_bytes_verbatim() {
        let directory = tempfile::tempdir().expect("tempdir");
        let path = directory.path().join("cover.bmp");
        let buffer =
            ImageBuffer::new(vec![0x42, 0x4d, 1, 2, 3], StillImageFormat::Bmp).expect("non-empty");

        buffer.save(&path).expect("save");

        assert_eq!(std::fs::read(&path).expect("read back"), buffer.as_bytes());
    }
}
