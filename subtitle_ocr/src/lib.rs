//! This crate turns bitmap subtitles into an SRT text track using an
//! ordinary OCR engine such as Tesseract.
//!
//! OCR is slow, and engines like Tesseract can't be shared between
//! threads. So we build several independent engines, send each subtitle
//! to whichever engine is free, and then put the results back in order
//! once everything has finished.
//!
//! ## Example code
//!
//! ```
//! use subtitle_ocr::{Bitmap, OcrConfig, OcrContext, Pts, RawFrame, TesseractFactory};
//!
//! let mut ctx = OcrContext::new(OcrConfig::default(), TesseractFactory);
//! let frame = RawFrame {
//!     start: Pts::from_seconds(1.0),
//!     end: Pts::UNKNOWN,
//!     packet_pts: None,
//!     bitmap: Bitmap::from_rows(vec![0; 4], 2, 2).unwrap(),
//! };
//! // Too small to be worth recognizing, so it's skipped.
//! assert_eq!(ctx.add(frame).unwrap(), None);
//! let transcript = ctx.finish().unwrap();
//! assert!(transcript.cues.is_empty());
//! ```
//!
//! ## Design notes
//!
//! 1. Duplicate packets and tiny images are dropped, and each remaining
//!    subtitle is numbered in stream order.
//! 2. Images are inverted to dark-on-light and handed to a
//!    [`WorkerPool`](pool::WorkerPool), which runs at most N engines at
//!    once. Results arrive in any order.
//! 3. Once every worker has been joined, [`reconcile`](reconcile::reconcile)
//!    sorts the results and fills in missing end times from the start of
//!    the following subtitle.
//! 4. [`srt::write_srt`] formats the final track.
//!
//! Build with the `tesseract` feature to link against Tesseract. Other
//! engines can be plugged in by implementing [`EngineFactory`] and
//! [`Recognizer`].

#![warn(missing_docs)]

pub mod aggregator;
pub mod config;
mod ctx;
pub mod engine;
mod errors;
mod frame;
pub mod pool;
pub mod preprocess;
pub mod reconcile;
pub mod srt;
#[cfg(feature = "tesseract")]
mod tesseract;
#[cfg(not(feature = "tesseract"))]
#[path = "tesseract_stub.rs"]
mod tesseract;
#[cfg(test)]
mod test_util;
mod time;

pub use self::aggregator::OcrResult;
pub use self::config::{EngineConfig, EngineMode, OcrConfig};
pub use self::ctx::{OcrContext, OcrStats, Transcript};
pub use self::engine::{EngineFactory, EngineHandle, Recognizer};
pub use self::errors::{Error, Result};
pub use self::frame::{Bitmap, Frame, RawFrame};
pub use self::reconcile::Cue;
pub use self::tesseract::{TesseractEngine, TesseractFactory};
pub use self::time::Pts;
