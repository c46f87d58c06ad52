//! Collecting OCR results from worker threads.

use std::{
    mem,
    sync::{Arc, Mutex, PoisonError},
};

use crate::time::Pts;

/// The outcome of recognizing one subtitle.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct OcrResult {
    /// The subtitle's place in the output.
    pub counter: u32,
    /// When the subtitle appears.
    pub start: Pts,
    /// When it disappears, or `Pts::UNKNOWN`.
    pub end: Pts,
    /// The recognized text, or `None` if recognition failed.
    pub text: Option<String>,
}

/// Results in the order that workers finished them. Workers only ever
/// append, and the lock is never held while recognizing.
#[derive(Debug, Default)]
pub struct Aggregator {
    results: Mutex<Vec<OcrResult>>,
}

impl Aggregator {
    /// Create an empty aggregator.
    pub fn new() -> Aggregator {
        Aggregator::default()
    }

    /// Record a finished result.
    pub fn push(&self, result: OcrResult) {
        // A worker which panicked can't have left a half-pushed `Vec`
        // behind, so a poisoned lock is still safe to use.
        self.results
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(result);
    }

    /// Take all results. Call this only after every worker has been joined.
    pub fn into_results(this: Arc<Aggregator>) -> Vec<OcrResult> {
        match Arc::try_unwrap(this) {
            Ok(aggregator) => aggregator
                .results
                .into_inner()
                .unwrap_or_else(PoisonError::into_inner),
            Err(shared) => mem::take(
                &mut *shared.results.lock().unwrap_or_else(PoisonError::into_inner),
            ),
        }
    }
}

#[test]
fn results_keep_completion_order() {
    let aggregator = Arc::new(Aggregator::new());
    for counter in [3, 1, 2] {
        aggregator.push(OcrResult {
            counter,
            start: Pts::from_ticks(counter * 100),
            end: Pts::UNKNOWN,
            text: None,
        });
    }
    let counters: Vec<u32> = Aggregator::into_results(aggregator)
        .iter()
        .map(|r| r.counter)
        .collect();
    assert_eq!(counters, vec![3, 1, 2]);
}
