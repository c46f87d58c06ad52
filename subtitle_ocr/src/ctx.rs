//! The main OCR driver.

use std::io::Write;

use log::{debug, info, trace, warn};

use crate::config::OcrConfig;
use crate::engine::EngineFactory;
use crate::errors::*;
use crate::frame::{Frame, RawFrame};
use crate::pool::WorkerPool;
use crate::preprocess::{dump_pgm, invert, SizeGate};
use crate::reconcile::{reconcile, Cue};
use crate::srt::write_srt;
use crate::time::Pts;

/// Counts of what happened to the frames we were given.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct OcrStats {
    /// Frames passed to `OcrContext::add`.
    pub frames_seen: usize,
    /// Extra packets belonging to a subtitle we'd already seen.
    pub duplicates: usize,
    /// Frames skipped because they were too small.
    pub too_small: usize,
    /// Frames sent to an OCR engine.
    pub dispatched: usize,
    /// Frames the engine couldn't recognize.
    pub failed: usize,
}

/// The result of a complete OCR run.
#[derive(Clone, Debug)]
pub struct Transcript {
    /// Subtitles in output order.
    pub cues: Vec<Cue>,
    /// What happened along the way.
    pub stats: OcrStats,
}

impl Transcript {
    /// Write this transcript as an SRT file.
    pub fn write_srt<W: Write>(&self, out: &mut W) -> Result<()> {
        write_srt(out, &self.cues)
    }
}

/// An `OcrContext` represents a single movie's or episode's worth of
/// subtitles that we want to OCR. To use it, create a new context, add
/// each subtitle image in stream order, and then call `finish`.
pub struct OcrContext<F: EngineFactory> {
    config: OcrConfig,
    gate: SizeGate,
    pool: WorkerPool<F>,
    last_start: Option<Pts>,
    next_counter: u32,
    stats: OcrStats,
}

impl<F: EngineFactory> OcrContext<F> {
    /// Create a new `OcrContext`. No engines are built until the first
    /// subtitle arrives.
    pub fn new(config: OcrConfig, factory: F) -> OcrContext<F> {
        let pool_size = config.effective_pool_size();
        debug!("using up to {} OCR engines", pool_size);
        let pool = WorkerPool::new(factory, config.engine.clone(), pool_size, config.verbose);
        OcrContext {
            gate: SizeGate {
                min_width: config.min_width,
                min_height: config.min_height,
            },
            config,
            pool,
            last_start: None,
            next_counter: 1,
            stats: OcrStats::default(),
        }
    }

    /// Add a single subtitle to this `OcrContext`. Returns the subtitle's
    /// counter if it was sent for recognition, or `None` if it was skipped.
    ///
    /// Errors from this function are fatal to the whole run.
    pub fn add(&mut self, raw: RawFrame) -> Result<Option<u32>> {
        self.stats.frames_seen += 1;

        // Decoders may hand us one subtitle spread across several packets.
        if self.last_start == Some(raw.start) {
            trace!("skipping another packet for subtitle at {}", raw.start);
            self.stats.duplicates += 1;
            return Ok(None);
        }
        self.last_start = Some(raw.start);

        let counter = self.next_counter;
        if !self.gate.accepts(&raw.bitmap) {
            warn!(
                "Image too small {}, size: {} bytes, {}x{} pixels, expected at least {}x{}",
                counter,
                raw.bitmap.pixels().len(),
                raw.bitmap.width(),
                raw.bitmap.height(),
                self.gate.min_width,
                self.gate.min_height,
            );
            self.stats.too_small += 1;
            return Ok(None);
        }

        if let Some(packet_pts) = raw.packet_pts {
            if packet_pts != raw.start {
                let message = format!(
                    "{}: time stamp from index ({}) doesn't match time stamp from stream ({})",
                    counter, packet_pts, raw.start
                );
                if self.config.verbose {
                    warn!("{}", message);
                } else {
                    debug!("{}", message);
                }
            }
        }

        if let Some(base) = &self.config.dump_images {
            match dump_pgm(base, counter, &raw.bitmap) {
                Ok(path) => trace!("dumped {}", path.display()),
                Err(err) => warn!("could not dump image {}: {}", counter, err),
            }
        }

        let frame = Frame {
            counter,
            start: raw.start,
            end: raw.end,
            bitmap: invert(&raw.bitmap),
        };
        drop(raw);
        self.next_counter += 1;
        self.pool.dispatch(frame)?;
        self.stats.dispatched += 1;
        Ok(Some(counter))
    }

    /// What's happened so far.
    pub fn stats(&self) -> OcrStats {
        self.stats
    }

    /// Wait for all outstanding recognition, and assemble the subtitles in
    /// order with their end times repaired.
    pub fn finish(self) -> Result<Transcript> {
        let mut stats = self.stats;
        let results = self.pool.finish()?;
        stats.failed = results.iter().filter(|r| r.text.is_none()).count();
        let cues = reconcile(results, self.config.force_next_start);
        info!(
            "recognized {} subtitles ({} failed, {} too small, {} duplicate packets)",
            cues.len(),
            stats.failed,
            stats.too_small,
            stats.duplicates
        );
        Ok(Transcript { cues, stats })
    }
}

#[cfg(test)]
mod test {
    use std::time::Duration;

    use super::*;
    use crate::frame::Bitmap;
    use crate::srt::format_time;
    use crate::test_util::{raw_frame, ScriptedFactory, TEST_WIDTH};

    fn config(pool_size: usize) -> OcrConfig {
        let _ = env_logger::builder().is_test(true).try_init();
        OcrConfig {
            pool_size,
            ..OcrConfig::default()
        }
    }

    #[test]
    fn three_frames_end_to_end() {
        let factory = ScriptedFactory::new(&[(1, "One"), (2, "Two"), (3, "Three")])
            .with_variable_delay(Duration::from_millis(2));
        let mut ctx = OcrContext::new(config(3), factory);
        ctx.add(raw_frame(1, 0, Pts::UNKNOWN)).unwrap();
        ctx.add(raw_frame(2, 9_000, Pts::UNKNOWN)).unwrap();
        ctx.add(raw_frame(3, 18_000, Pts::from_ticks(27_000))).unwrap();
        let transcript = ctx.finish().unwrap();

        let ends: Vec<u32> = transcript.cues.iter().map(|c| c.end.ticks()).collect();
        assert_eq!(ends, vec![9_000, 18_000, 27_000]);
        assert_eq!(format_time(transcript.cues[1].start), "00:00:00,100");

        let mut out = vec![];
        transcript.write_srt(&mut out).unwrap();
        let srt = String::from_utf8(out).unwrap();
        assert!(srt.starts_with("1\n00:00:00,000 --> 00:00:00,100\nOne\n\n2\n"));
        assert!(srt.ends_with("3\n00:00:00,200 --> 00:00:00,300\nThree\n\n"));
    }

    #[test]
    fn duplicate_starts_are_processed_once() {
        let factory = ScriptedFactory::new(&[]);
        let probe = factory.probe();
        let mut ctx = OcrContext::new(config(2), factory);
        assert_eq!(ctx.add(raw_frame(1, 0, Pts::UNKNOWN)).unwrap(), Some(1));
        assert_eq!(ctx.add(raw_frame(1, 0, Pts::UNKNOWN)).unwrap(), None);
        assert_eq!(ctx.add(raw_frame(2, 500, Pts::UNKNOWN)).unwrap(), Some(2));
        let transcript = ctx.finish().unwrap();
        assert_eq!(transcript.cues.len(), 2);
        assert_eq!(transcript.stats.duplicates, 1);
        assert_eq!(probe.call_order().len(), 2);
    }

    #[test]
    fn narrow_frames_never_produce_results() {
        let factory = ScriptedFactory::new(&[]);
        let probe = factory.probe();
        let mut ctx = OcrContext::new(
            OcrConfig {
                min_width: TEST_WIDTH + 1,
                ..config(2)
            },
            factory,
        );
        let mut narrow = raw_frame(1, 0, Pts::UNKNOWN);
        narrow.bitmap = Bitmap::from_rows(vec![0; TEST_WIDTH], TEST_WIDTH, 1).unwrap();
        assert_eq!(ctx.add(narrow).unwrap(), None);
        let mut wide = raw_frame(2, 100, Pts::UNKNOWN);
        wide.bitmap = Bitmap::from_rows(vec![0; 2 * (TEST_WIDTH + 1)], TEST_WIDTH + 1, 2).unwrap();
        assert_eq!(ctx.add(wide).unwrap(), Some(1));

        let transcript = ctx.finish().unwrap();
        assert_eq!(transcript.stats.too_small, 1);
        assert_eq!(transcript.cues.len(), 1);
        assert_eq!(transcript.cues[0].index, 1);
        assert_eq!(transcript.cues[0].text, "subtitle 2");
        assert_eq!(probe.call_order(), vec![2]);
    }

    #[test]
    fn engines_see_inverted_images() {
        let factory = ScriptedFactory::new(&[]);
        let probe = factory.probe();
        let mut ctx = OcrContext::new(config(1), factory);
        let mut light = raw_frame(1, 0, Pts::UNKNOWN);
        light.bitmap = Bitmap::from_rows(vec![0xff; TEST_WIDTH], TEST_WIDTH, 1).unwrap();
        ctx.add(light).unwrap();
        let mut dark = raw_frame(2, 10, Pts::UNKNOWN);
        dark.bitmap = Bitmap::from_rows(vec![0x00; TEST_WIDTH * 2], TEST_WIDTH, 2).unwrap();
        ctx.add(dark).unwrap();
        assert_eq!(ctx.stats().dispatched, 2);
        ctx.finish().unwrap();
        assert_eq!(probe.first_pixels(), vec![0x00, 0xff]);
    }

    #[test]
    fn failures_are_counted_and_emitted_empty() {
        let factory = ScriptedFactory::new(&[(2, ScriptedFactory::FAIL)]);
        let mut ctx = OcrContext::new(config(2), factory);
        for tag in 1..=3 {
            ctx.add(raw_frame(tag, tag * 1_000, Pts::UNKNOWN)).unwrap();
        }
        let transcript = ctx.finish().unwrap();
        assert_eq!(transcript.stats.failed, 1);
        assert_eq!(transcript.cues[1].text, "");
        assert_eq!(transcript.cues[1].end, Pts::from_ticks(3_000));
    }

    #[test]
    fn dumps_images_when_asked() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = OcrContext::new(
            OcrConfig {
                dump_images: Some(dir.path().join("movie")),
                ..config(1)
            },
            ScriptedFactory::new(&[]),
        );
        ctx.add(raw_frame(1, 0, Pts::UNKNOWN)).unwrap();
        ctx.add(raw_frame(2, 10, Pts::UNKNOWN)).unwrap();
        ctx.finish().unwrap();
        assert!(dir.path().join("movie-0001.pgm").exists());
        assert!(dir.path().join("movie-0002.pgm").exists());
    }

    #[test]
    fn failed_dumps_do_not_stop_the_run() {
        let dir = tempfile::tempdir().unwrap();
        let mut ctx = OcrContext::new(
            OcrConfig {
                dump_images: Some(dir.path().join("missing").join("movie")),
                ..config(2)
            },
            ScriptedFactory::new(&[]),
        );
        assert_eq!(ctx.add(raw_frame(1, 0, Pts::UNKNOWN)).unwrap(), Some(1));
        assert_eq!(ctx.add(raw_frame(2, 10, Pts::UNKNOWN)).unwrap(), Some(2));
        assert_eq!(ctx.stats().dispatched, 2);
        let transcript = ctx.finish().unwrap();
        let texts: Vec<&str> = transcript.cues.iter().map(|c| c.text.as_str()).collect();
        assert_eq!(texts, vec!["subtitle 1", "subtitle 2"]);
        assert!(!dir.path().join("missing").exists());
    }

    #[test]
    fn mismatched_packet_times_are_still_recognized() {
        for verbose in [false, true] {
            let mut ctx = OcrContext::new(
                OcrConfig {
                    verbose,
                    ..config(1)
                },
                ScriptedFactory::new(&[(1, "Hello")]),
            );
            let mut frame = raw_frame(1, 9_000, Pts::from_ticks(18_000));
            frame.packet_pts = Some(Pts::from_ticks(9_090));
            assert_eq!(ctx.add(frame).unwrap(), Some(1));
            let transcript = ctx.finish().unwrap();
            assert_eq!(transcript.cues.len(), 1);
            assert_eq!(transcript.cues[0].text, "Hello");
            assert_eq!(transcript.cues[0].start, Pts::from_ticks(9_000));
            assert_eq!(transcript.cues[0].end, Pts::from_ticks(18_000));
        }
    }

    #[test]
    fn engine_failure_stops_the_run() {
        let mut ctx = OcrContext::new(config(4), ScriptedFactory::failing_init());
        assert!(ctx.add(raw_frame(1, 0, Pts::UNKNOWN)).is_err());
    }
}
