//! Presentation timestamps.

use std::fmt;

/// A presentation timestamp, measured in ticks of a 90 kHz clock (1/90 of
/// a millisecond). This is the clock used by MPEG-2 streams, and therefore
/// by DVD subtitles.
///
/// ```
/// use subtitle_ocr::Pts;
///
/// let pts = Pts::from_seconds(1.5);
/// assert_eq!(pts.ticks(), 135_000);
/// assert_eq!(pts.millis(), 1_500);
/// ```
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Pts(u32);

impl Pts {
    /// Ticks per millisecond.
    pub const TICKS_PER_MS: u32 = 90;

    /// Sentinel end time used by decoders which don't know when a subtitle
    /// stops being displayed. It gets replaced by the start of the next
    /// subtitle during reconciliation.
    pub const UNKNOWN: Pts = Pts(u32::MAX);

    /// Construct a timestamp from raw 90 kHz ticks.
    pub const fn from_ticks(ticks: u32) -> Pts {
        Pts(ticks)
    }

    /// Construct a timestamp from a time in seconds, rounding to the
    /// nearest tick. Negative and out-of-range values saturate.
    pub fn from_seconds(seconds: f64) -> Pts {
        let ticks = (seconds * 90_000.0).round();
        if ticks <= 0.0 {
            Pts(0)
        } else if ticks >= f64::from(u32::MAX - 1) {
            Pts(u32::MAX - 1)
        } else {
            Pts(ticks as u32)
        }
    }

    /// The raw number of ticks.
    pub const fn ticks(self) -> u32 {
        self.0
    }

    /// Whole milliseconds, discarding any fractional remainder.
    pub const fn millis(self) -> u32 {
        self.0 / Pts::TICKS_PER_MS
    }

    /// Is this the "unknown end" sentinel?
    pub fn is_unknown(self) -> bool {
        self == Pts::UNKNOWN
    }
}

impl fmt::Display for Pts {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        if self.is_unknown() {
            write!(f, "unknown")
        } else {
            write!(f, "{}", self.0)
        }
    }
}

#[test]
fn from_seconds_rounds_and_saturates() {
    assert_eq!(Pts::from_seconds(0.1).ticks(), 9_000);
    assert_eq!(Pts::from_seconds(-3.0).ticks(), 0);
    assert!(!Pts::from_seconds(1e12).is_unknown());
}
