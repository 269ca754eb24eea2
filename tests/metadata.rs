//! Metadata integration tests.

use std::path::Path;

use media_retriever::{MediaSession, metadata};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

#[test]
fn duration_is_milliseconds() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let session = MediaSession::open(path).expect("open");
    let duration = session.metadata(metadata::DURATION).expect("duration");
    let milliseconds: u64 = duration.parse().expect("duration should be an integer");

    // The fixture is five seconds long.
    assert!(
        (4_900..=5_100).contains(&milliseconds),
        "unexpected duration: {milliseconds}ms",
    );
    assert_eq!(
        session.metadata_dictionary().duration_milliseconds(),
        Some(milliseconds)
    );
}

#[test]
fn codec_names_are_reported() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let session = MediaSession::open(path).expect("open");
    assert_eq!(session.metadata(metadata::VIDEO_CODEC), Some("h264"));
    assert_eq!(session.metadata(metadata::AUDIO_CODEC), Some("aac"));
}

#[test]
fn container_tags_are_exposed() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let session = MediaSession::open(path).expect("open");
    // Set by the fixture generator.
    assert_eq!(session.metadata("title"), Some("Sample Video"));
}

#[test]
fn unknown_keys_are_none() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let session = MediaSession::open(path).expect("open");
    assert_eq!(session.metadata("no_such_key"), None);
    assert_eq!(session.metadata("Duration"), None);
}

#[test]
fn audio_only_has_no_video_codec() {
    let path = "tests/fixtures/sample_audio_only.mp4";
    if !Path::new(path).exists() {
        return;
    }

    let session = MediaSession::open(path).expect("open");
    assert!(session.metadata(metadata::AUDIO_CODEC).is_some());
    assert_eq!(session.metadata(metadata::VIDEO_CODEC), None);
    assert!(session.metadata(metadata::DURATION).is_some());
}
