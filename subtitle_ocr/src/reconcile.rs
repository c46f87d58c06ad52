//! Putting OCR results back in order and fixing their end times.

use crate::aggregator::OcrResult;
use crate::time::Pts;

/// A finished subtitle, ready to be written out.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Cue {
    /// The SRT index of this subtitle.
    pub index: u32,
    /// When the subtitle appears.
    pub start: Pts,
    /// When it disappears.
    pub end: Pts,
    /// The recognized text, which is empty if recognition failed.
    pub text: String,
}

/// Sort `results` by counter, and replace unknown end times with the start
/// of the following subtitle. If `force_next_start` is set, every subtitle
/// except the last ends when the next one starts.
///
/// The last subtitle has nothing after it, so an unknown end time is left
/// as `Pts::UNKNOWN`.
pub fn reconcile(mut results: Vec<OcrResult>, force_next_start: bool) -> Vec<Cue> {
    results.sort_by_key(|r| r.counter);
    let next_starts: Vec<Option<Pts>> = results
        .iter()
        .skip(1)
        .map(|r| Some(r.start))
        .chain(Some(None))
        .collect();
    results
        .into_iter()
        .zip(next_starts)
        .map(|(result, next_start)| {
            let end = match next_start {
                Some(next) if force_next_start || result.end.is_unknown() => next,
                _ => result.end,
            };
            Cue {
                index: result.counter,
                start: result.start,
                end,
                text: result.text.unwrap_or_default(),
            }
        })
        .collect()
}
