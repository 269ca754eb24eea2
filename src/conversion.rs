//! Timestamp arithmetic.
//!
//! Callers express positions in microseconds (FFmpeg's `AV_TIME_BASE`);
//! streams keep theirs in their own time base. Everything here is exact
//! integer math so that a requested time lands on the same tick FFmpeg's
//! `av_rescale_q` would pick.

use ffmpeg_next::Rational;

/// Microseconds per second, FFmpeg's global time base.
pub(crate) const MICROSECONDS_PER_SECOND: i64 = 1_000_000;

/// FFmpeg's "no timestamp" sentinel (`AV_NOPTS_VALUE`).
pub(crate) const NO_TIMESTAMP: i64 = i64::MIN;

/// Rescale `value` from one time base to another, rounding half away from zero.
///
/// Returns `None` if either time base is degenerate.
pub(crate) fn rescale(value: i64, from: Rational, to: Rational) -> Option<i64> {
    let numerator =
        value as i128 * from.numerator() as i128 * to.denominator() as i128;
    let denominator = from.denominator() as i128 * to.numerator() as i128;
    if denominator == 0 {
        return None;
    }

    let half = denominator.abs() / 2;
    let magnitude = (numerator.abs() + half) / denominator.abs();
    let signed = if (numerator < 0) != (denominator < 0) {
        -magnitude
    } else {
        magnitude
    };

    i64::try_from(signed).ok()
}

/// Convert a caller-supplied time in microseconds to a stream timestamp.
pub(crate) fn microseconds_to_stream_timestamp(
    microseconds: i64,
    time_base: Rational,
) -> Option<i64> {
    rescale(
        microseconds,
        Rational::new(1, MICROSECONDS_PER_SECOND as i32),
        time_base,
    )
}

/// Convert a stream timestamp to whole milliseconds, truncating.
pub(crate) fn stream_timestamp_to_milliseconds(timestamp: i64, time_base: Rational) -> Option<i64> {
    let numerator = timestamp as i128 * time_base.numerator() as i128 * 1000;
    let denominator = time_base.denominator() as i128;
    if denominator == 0 {
        return None;
    }
    i64::try_from(numerator / denominator).ok()
}

/// Container duration (microseconds) to whole milliseconds, truncating.
///
/// Unknown or negative durations become zero.
pub(crate) fn container_duration_to_milliseconds(duration: i64) -> i64 {
    if duration == NO_TIMESTAMP || duration < 0 {
        0
    } else {
        duration / 1000
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rescales_microseconds_into_common_time_bases() {
        let mp4 = Rational::new(1, 15_360);
        assert_eq!(microseconds_to_stream_timestamp(1_000_000, mp4), Some(15_360));

        let mpegts = Rational::new(1, 90_000);
        assert_eq!(microseconds_to_stream_timestamp(2_500_000, mpegts), Some(225_000));

        let millis = Rational::new(1, 1000);
        assert_eq!(microseconds_to_stream_timestamp(1_499, millis), Some(1));
        assert_eq!(microseconds_to_stream_timestamp(1_500, millis), Some(2));
    }

    #[test]
    fn rounds_negative_values_away_from_zero() {
        let millis = Rational::new(1, 1000);
        assert_eq!(microseconds_to_stream_timestamp(-1_500, millis), Some(-2));
        assert_eq!(microseconds_to_stream_timestamp(-1, millis), Some(0));
        assert_eq!(microseconds_to_stream_timestamp(-600, millis), Some(-1));
    }

    #[test]
    fn degenerate_time_base_yields_none() {
        assert_eq!(microseconds_to_stream_timestamp(1_000, Rational::new(0, 1)), None);
        assert_eq!(stream_timestamp_to_milliseconds(10, Rational::new(1, 0)), None);
    }

    #[test]
    fn stream_timestamps_truncate_to_milliseconds() {
        let time_base = Rational::new(1, 90_000);
        assert_eq!(stream_timestamp_to_milliseconds(90_000, time_base), Some(1000));
        assert_eq!(stream_timestamp_to_milliseconds(89, time_base), Some(0));
        assert_eq!(stream_timestamp_to_milliseconds(180, time_base), Some(2));
    }

    #[test]
    fn container_duration_handles_unknown_values() {
        assert_eq!(container_duration_to_milliseconds(10_000_000), 10_000);
        assert_eq!(container_duration_to_milliseconds(10_004_999), 10_004);
        assert_eq!(container_duration_to_milliseconds(NO_TIMESTAMP), 0);
        assert_eq!(container_duration_to_milliseconds(-5), 0);
    }
}
