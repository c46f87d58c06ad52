//! Test-only utilities: a fake OCR engine which we can script, slow down,
//! and watch.

use std::{
    collections::{HashMap, HashSet},
    sync::{
        atomic::{AtomicUsize, Ordering},
        Arc, Mutex,
    },
    thread::{self, ThreadId},
    time::Duration,
};

use crate::config::EngineConfig;
use crate::engine::{EngineFactory, Recognizer};
use crate::errors::*;
use crate::frame::{Bitmap, Frame, RawFrame};
use crate::time::Pts;

/// Width of every test bitmap. Wide enough for the default size gate.
pub const TEST_WIDTH: usize = 16;

/// A bitmap whose height is `tag`, which is how our fake engine tells
/// images apart. Inversion doesn't change the height.
pub fn tagged_bitmap(tag: u32) -> Bitmap {
    let height = tag as usize;
    Bitmap::from_rows(vec![0x20; TEST_WIDTH * height], TEST_WIDTH, height).unwrap()
}

/// A frame ready for the pool, starting `counter` tenths of a second in.
pub fn frame(counter: u32) -> Frame {
    Frame {
        counter,
        start: Pts::from_ticks(counter * 9_000),
        end: Pts::UNKNOWN,
        bitmap: tagged_bitmap(counter),
    }
}

/// A decoder frame tagged with `tag`.
pub fn raw_frame(tag: u32, start: u32, end: Pts) -> RawFrame {
    RawFrame {
        start: Pts::from_ticks(start),
        end,
        packet_pts: None,
        bitmap: tagged_bitmap(tag),
    }
}

/// Everything our fake engines have been up to.
#[derive(Debug, Default)]
pub struct Probe {
    created: AtomicUsize,
    running: AtomicUsize,
    max_running: AtomicUsize,
    calls: Mutex<Vec<(u32, ThreadId)>>,
    first_pixels: Mutex<Vec<u8>>,
    test_thread: Mutex<Option<ThreadId>>,
}

impl Probe {
    /// How many engines were built.
    pub fn engines_created(&self) -> usize {
        self.created.load(Ordering::SeqCst)
    }

    /// The most recognitions we ever saw running at once.
    pub fn max_running(&self) -> usize {
        self.max_running.load(Ordering::SeqCst)
    }

    /// Tags in the order recognition started.
    pub fn call_order(&self) -> Vec<u32> {
        self.calls.lock().unwrap().iter().map(|c| c.0).collect()
    }

    /// The first pixel of every image the engines were given.
    pub fn first_pixels(&self) -> Vec<u8> {
        self.first_pixels.lock().unwrap().clone()
    }

    /// How many distinct threads ran recognitions.
    pub fn threads_used(&self) -> usize {
        let calls = self.calls.lock().unwrap();
        calls.iter().map(|c| c.1).collect::<HashSet<_>>().len()
    }

    /// Did every recognition run on the thread which built the factory?
    pub fn ran_on_current_thread(&self) -> bool {
        let test_thread = *self.test_thread.lock().unwrap();
        let calls = self.calls.lock().unwrap();
        calls.iter().all(|c| Some(c.1) == test_thread)
    }

    fn enter(&self, bitmap: &Bitmap) {
        let tag = bitmap.height() as u32;
        self.calls
            .lock()
            .unwrap()
            .push((tag, thread::current().id()));
        if let Some(&pixel) = bitmap.pixels().first() {
            self.first_pixels.lock().unwrap().push(pixel);
        }
        let now = self.running.fetch_add(1, Ordering::SeqCst) + 1;
        self.max_running.fetch_max(now, Ordering::SeqCst);
    }

    fn exit(&self) {
        self.running.fetch_sub(1, Ordering::SeqCst);
    }
}

/// Builds `ScriptedEngine`s.
#[derive(Debug)]
pub struct ScriptedFactory {
    script: Arc<HashMap<u32, String>>,
    delay: Duration,
    variable_delay: bool,
    fail_init: bool,
    probe: Arc<Probe>,
}

impl ScriptedFactory {
    /// Script entry which makes recognition fail.
    pub const FAIL: &'static str = "!fail";
    /// Script entry which makes recognition panic.
    pub const PANIC: &'static str = "!panic";

    /// Engines will return the scripted text for each tag, and
    /// `"subtitle <tag>"` for anything unscripted.
    pub fn new(script: &[(u32, &str)]) -> ScriptedFactory {
        let probe = Probe::default();
        *probe.test_thread.lock().unwrap() = Some(thread::current().id());
        ScriptedFactory {
            script: Arc::new(
                script
                    .iter()
                    .map(|&(tag, text)| (tag, text.to_owned()))
                    .collect(),
            ),
            delay: Duration::ZERO,
            variable_delay: false,
            fail_init: false,
            probe: Arc::new(probe),
        }
    }

    /// A factory which can't build anything.
    pub fn failing_init() -> ScriptedFactory {
        ScriptedFactory {
            fail_init: true,
            ..ScriptedFactory::new(&[])
        }
    }

    /// Make every recognition take `delay`.
    pub fn with_delay(mut self, delay: Duration) -> ScriptedFactory {
        self.delay = delay;
        self
    }

    /// Make recognition take between 0 and 4 times `delay`, depending on
    /// the tag, so that workers finish out of order.
    pub fn with_variable_delay(mut self, delay: Duration) -> ScriptedFactory {
        self.delay = delay;
        self.variable_delay = true;
        self
    }

    /// Watch what our engines do.
    pub fn probe(&self) -> Arc<Probe> {
        Arc::clone(&self.probe)
    }
}

impl EngineFactory for ScriptedFactory {
    type Engine = ScriptedEngine;

    fn name(&self) -> &'static str {
        "scripted"
    }

    fn create(&self, config: &EngineConfig) -> Result<ScriptedEngine> {
        if self.fail_init {
            return Err(Error::engine_init(&config.language, "scripted failure"));
        }
        self.probe.created.fetch_add(1, Ordering::SeqCst);
        Ok(ScriptedEngine {
            script: Arc::clone(&self.script),
            delay: self.delay,
            variable_delay: self.variable_delay,
            probe: Arc::clone(&self.probe),
        })
    }
}

/// A fake engine.
#[derive(Debug)]
pub struct ScriptedEngine {
    script: Arc<HashMap<u32, String>>,
    delay: Duration,
    variable_delay: bool,
    probe: Arc<Probe>,
}

impl Recognizer for ScriptedEngine {
    fn recognize(&mut self, bitmap: &Bitmap) -> Result<String> {
        let tag = bitmap.height() as u32;
        self.probe.enter(bitmap);
        let delay = if self.variable_delay {
            self.delay * ((tag * 7) % 5)
        } else {
            self.delay
        };
        thread::sleep(delay);
        self.probe.exit();
        match self.script.get(&tag).map(|s| s.as_str()) {
            Some(ScriptedFactory::FAIL) => Err(Error::recognition("scripted failure")),
            Some(ScriptedFactory::PANIC) => panic!("scripted panic"),
            Some(text) => Ok(text.to_owned()),
            None => Ok(format!("subtitle {}", tag)),
        }
    }
}
