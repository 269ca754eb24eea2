//! Embedded cover art integration tests.

use std::path::Path;

use media_retriever::{MediaSession, StillImageFormat};

#[test]
fn mp3_cover_is_returned_verbatim() {
    let path = "tests/fixtures/sample_with_cover.mp3";
    if !Path::new(path).exists() {
        return;
    }

    let mut session = MediaSession::open(path).expect("open");
    let cover = session.embedded_picture().expect("cover");

    assert_eq!(cover.format(), StillImageFormat::Jpeg);
    assert!(cover.as_bytes().starts_with(&[0xFF, 0xD8]));

    let image = cover.decode().expect("decode jpeg");
    assert_eq!((image.width(), image.height()), (64, 64));
}

#[test]
fn m4a_png_cover_is_returned_verbatim() {
    let path = "tests/fixtures/sample_with_cover.m4a";
    if !Path::new(path).exists() {
        return;
    }

    let mut session = MediaSession::open(path).expect("open");
    let cover = session.embedded_picture().expect("cover");

    assert_eq!(cover.format(), StillImageFormat::Png);
    assert!(cover.as_bytes().starts_with(b"\x89PNG"));
}

#[test]
fn cover_can_be_read_repeatedly() {
    let path = "tests/fixtures/sample_with_cover.mp3";
    if !Path::new(path).exists() {
        return;
    }

    let mut session = MediaSession::open(path).expect("open");
    let first = session.embedded_picture().expect("first read");
    let second = session.embedded_picture().expect("second read");
    assert_eq!(first.as_bytes(), second.as_bytes());
}

#[test]
fn cover_stream_is_flagged() {
    let path = "tests/fixtures/sample_with_cover.mp3";
    if !Path::new(path).exists() {
        return;
    }

    let session = MediaSession::open(path).expect("open");
    assert!(session.streams().iter().any(|stream| stream.attached_picture));
}

#[test]
fn no_cover_yields_none() {
    for path in [
        "tests/fixtures/sample_video.mp4",
        "tests/fixtures/sample_audio_only.mp4",
    ] {
        if !Path::new(path).exists() {
            continue;
        }

        let mut session = MediaSession::open(path).expect("open");
        assert!(session.embedded_picture().is_none(), "{path} has no cover");
    }
}

#[test]
fn video_with_cover_keeps_both() {
    let path = "tests/fixtures/sample_with_cover.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let mut session = MediaSession::open(path).expect("open");
    let duration: u64 = session
        .metadata(media_retriever::metadata::DURATION)
        .expect("duration")
        .parse()
        .expect("integer duration");
    assert!((9_950..=10_050).contains(&duration), "unexpected duration: {duration}ms");
    assert_eq!(session.metadata(media_retriever::metadata::VIDEO_CODEC), Some("png"));

    let cover = session.embedded_picture().expect("cover");
    assert_eq!(cover.format(), StillImageFormat::Png);
    assert!(cover.as_bytes().starts_with(b"\x89PNG"));

    // The H.264 stream is the one selected for frames.
    let video = session.video_stream().expect("video stream");
    assert!(!video.attached_picture);
    let frame = session.next_frame().expect("frame");
    let image = frame.decode().expect("decode frame");
    assert_eq!((image.width(), image.height()), (320, 240));

    session.release();
}

#[test]
fn gif_cover_on_selected_stream_is_normalized() {
    let path = "tests/fixtures/sample_with_gif_cover.mp3";
    if !Path::new(path).exists() {
        return;
    }

    let mut session = MediaSession::open(path).expect("open");
    let video = session.video_stream().expect("cover is the video stream");
    assert!(video.attached_picture);

    let cover = session.embedded_picture().expect("cover");
    assert_eq!(cover.format(), StillImageFormat::Png);
    assert!(cover.as_bytes().starts_with(b"\x89PNG"));

    let image = cover.decode().expect("decode png");
    assert_eq!((image.width(), image.height()), (64, 64));

    // The session decoder is left usable for a second pass.
    let again = session.embedded_picture().expect("second read");
    assert_eq!(again.as_bytes(), cover.as_bytes());
}

#[test]
fn gif_cover_on_other_stream_is_normalized() {
    let path = "tests/fixtures/sample_with_gif_cover.mkv";
    if !Path::new(path).exists() {
        return;
    }

    let mut session = MediaSession::open(path).expect("open");
    let video = session.video_stream().expect("video stream");
    assert!(!video.attached_picture);

    let cover = session.embedded_picture().expect("cover");
    assert_eq!(cover.format(), StillImageFormat::Png);

    let image = cover.decode().expect("decode png");
    assert_eq!((image.width(), image.height()), (64, 64));
}
