//! Retriever slot integration tests.

use std::path::Path;

use media_retriever::{ANY_TIME, MetadataRetriever, SeekPolicy, metadata};

fn sample_video_path() -> &'static str {
    "tests/fixtures/sample_video.mp4"
}

#[test]
fn queries_follow_the_open_source() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut retriever = MetadataRetriever::new();
    retriever.set_data_source(path).expect("set data source");

    assert!(retriever.is_open());
    assert!(retriever.extract_metadata(metadata::DURATION).is_some());
    assert!(retriever.frame_at_time(ANY_TIME, SeekPolicy::ClosestSync).is_some());
    assert!(retriever.frame_at_time(1_000_000, SeekPolicy::Closest).is_some());

    retriever.release();
    assert!(!retriever.is_open());
    assert_eq!(retriever.extract_metadata(metadata::DURATION), None);
    assert!(retriever.frame().is_none());
}

#[test]
fn option_codes_select_policies() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut retriever = MetadataRetriever::new();
    retriever.set_data_source(path).expect("set data source");

    for code in 0..4 {
        assert!(
            retriever.frame_at_time_with_option(2_000_000, code).is_some(),
            "no frame for option {code}",
        );
    }
    assert!(retriever.frame_at_time_with_option(2_000_000, 4).is_none());
}

#[test]
fn switching_sources_replaces_the_session() {
    let video = sample_video_path();
    let audio = "tests/fixtures/sample_audio_only.mp4";
    if !Path::new(video).exists() || !Path::new(audio).exists() {
        return;
    }

    let mut retriever = MetadataRetriever::new();
    retriever.set_data_source(video).expect("open video");
    assert!(retriever.extract_metadata(metadata::VIDEO_CODEC).is_some());

    retriever.set_data_source(audio).expect("open audio");
    assert_eq!(retriever.extract_metadata(metadata::VIDEO_CODEC), None);
    assert!(retriever.frame().is_none());
}

#[test]
fn failed_switch_leaves_slot_empty() {
    let path = sample_video_path();
    if !Path::new(path).exists() {
        return;
    }

    let mut retriever = MetadataRetriever::new();
    retriever.set_data_source(path).expect("open video");
    assert!(retriever.set_data_source("missing.mp4").is_err());
    assert!(!retriever.is_open());
}
