//! Seek policies and seek planning.
//!
//! A [`SeekPolicy`] says which frame a caller wants relative to a requested
//! time. [`SeekPlan::resolve`] turns the request into the concrete seek the
//! frame engine issues: a position in the stream's time base, a direction
//! flag, and (for [`SeekPolicy::Closest`]) a target frame ordinal to decode
//! up to.

use std::fmt;

use ffmpeg_next::Rational;

use crate::conversion::{microseconds_to_stream_timestamp, stream_timestamp_to_milliseconds};
use crate::error::RetrieverError;

/// How to resolve a requested time to a frame.
///
/// [`ClosestSync`](SeekPolicy::ClosestSync) and
/// [`NextSync`](SeekPolicy::NextSync) currently resolve identically: both
/// seek forward to the nearest sync point.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum SeekPolicy {
    /// Sync point at or before the requested time.
    PreviousSync,
    /// Sync point at or after the requested time.
    NextSync,
    /// Nearest sync point, searched forward.
    #[default]
    ClosestSync,
    /// Any frame, found by decoding forward from the start of the stream.
    /// Latency grows with the requested time.
    Closest,
}

impl SeekPolicy {
    /// Integer code used by the retriever's host API.
    pub fn code(self) -> i32 {
        match self {
            SeekPolicy::PreviousSync => 0,
            SeekPolicy::NextSync => 1,
            SeekPolicy::ClosestSync => 2,
            SeekPolicy::Closest => 3,
        }
    }
}

impl TryFrom<i32> for SeekPolicy {
    type Error = RetrieverError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        match code {
            0 => Ok(SeekPolicy::PreviousSync),
            1 => Ok(SeekPolicy::NextSync),
            2 => Ok(SeekPolicy::ClosestSync),
            3 => Ok(SeekPolicy::Closest),
            other => Err(RetrieverError::InvalidOption(other)),
        }
    }
}

impl fmt::Display for SeekPolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            SeekPolicy::PreviousSync => "previous-sync",
            SeekPolicy::NextSync => "next-sync",
            SeekPolicy::ClosestSync => "closest-sync",
            SeekPolicy::Closest => "closest",
        })
    }
}

impl std::str::FromStr for SeekPolicy {
    type Err = String;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().replace('_', "-").as_str() {
            "previous-sync" | "previous" => Ok(SeekPolicy::PreviousSync),
            "next-sync" | "next" => Ok(SeekPolicy::NextSync),
            "closest-sync" | "sync" => Ok(SeekPolicy::ClosestSync),
            "closest" | "exact" => Ok(SeekPolicy::Closest),
            other => Err(format!("unknown seek policy: {other}")),
        }
    }
}

/// Direction flag passed to the container seek.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum SeekDirection {
    /// Land on a sync point at or after the target.
    Forward,
    /// Land on a sync point at or before the target.
    Backward,
    /// Land on any frame, sync point or not.
    AnyFrame,
}

impl SeekDirection {
    pub(crate) fn flags(self) -> i32 {
        match self {
            SeekDirection::Forward => 0,
            SeekDirection::Backward => ffmpeg_sys_next::AVSEEK_FLAG_BACKWARD as i32,
            SeekDirection::AnyFrame => ffmpeg_sys_next::AVSEEK_FLAG_ANY as i32,
        }
    }
}

/// A resolved seek request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct SeekPlan {
    /// Position to seek to, in the stream's time base.
    pub timestamp: i64,
    /// Seek direction flag.
    pub direction: SeekDirection,
    /// Decode until this many frames have been produced.
    pub target_ordinal: Option<i64>,
}

impl SeekPlan {
    /// Resolve a request against a stream.
    ///
    /// The requested time is rescaled into `time_base`, clamped to
    /// `stream_duration` when one is known, and rejected if negative.
    pub(crate) fn resolve(
        microseconds: i64,
        policy: SeekPolicy,
        time_base: Rational,
        stream_duration: Option<i64>,
    ) -> Option<Self> {
        let mut timestamp = microseconds_to_stream_timestamp(microseconds, time_base)?;

        if let Some(duration) = stream_duration {
            if timestamp > duration {
                log::debug!("Clamping seek target {timestamp} to stream duration {duration}");
                timestamp = duration;
            }
        }

        if timestamp < 0 {
            return None;
        }

        let plan = match policy {
            SeekPolicy::Closest => SeekPlan {
                timestamp: 0,
                direction: SeekDirection::AnyFrame,
                target_ordinal: Some(stream_timestamp_to_milliseconds(timestamp, time_base)?),
            },
            SeekPolicy::ClosestSync | SeekPolicy::NextSync => SeekPlan {
                timestamp,
                direction: SeekDirection::Forward,
                target_ordinal: None,
            },
            SeekPolicy::PreviousSync => SeekPlan {
                timestamp,
                direction: SeekDirection::Backward,
                target_ordinal: None,
            },
        };

        Some(plan)
    }
}
