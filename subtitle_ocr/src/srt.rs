//! SRT-format output.

use std::io::Write;

use crate::errors::*;
use crate::reconcile::Cue;
use crate::time::Pts;

/// Format a timestamp using the standard SRT time format. Fractions of a
/// millisecond are dropped.
///
/// ```
/// use subtitle_ocr::{srt::format_time, Pts};
///
/// assert_eq!(format_time(Pts::from_ticks(9_000)), "00:00:00,100");
/// assert_eq!(format_time(Pts::from_seconds(3723.004)), "01:02:03,004");
/// ```
pub fn format_time(pts: Pts) -> String {
    let (h, m, s, ms) = split_millis(pts.millis());
    format!("{:02}:{:02}:{:02},{:03}", h, m, s, ms)
}

/// Split milliseconds into hours, minutes, seconds and milliseconds.
fn split_millis(total: u32) -> (u32, u32, u32, u32) {
    let h = total / 3_600_000;
    let m = total % 3_600_000 / 60_000;
    let s = total % 60_000 / 1_000;
    let ms = total % 1_000;
    (h, m, s, ms)
}

/// Write `cues` as an SRT file.
pub fn write_srt<W: Write>(out: &mut W, cues: &[Cue]) -> Result<()> {
    for cue in cues {
        write!(
            out,
            "{}\n{} --> {}\n{}\n\n",
            cue.index,
            format_time(cue.start),
            format_time(cue.end),
            cue.text
        )
        .map_err(Error::Write)?;
    }
    out.flush().map_err(Error::Write)?;
    Ok(())
}
