//! A fixed-size pool of OCR engines, each running on its own thread.
//!
//! Each slot owns one [`EngineHandle`]. To recognize a frame, the handle
//! is moved into a fresh worker thread, and the thread hands it back when
//! it's joined. A slot therefore moves through the states:
//!
//! - **Idle**: the slot holds its engine (only when the pool runs inline).
//! - **Busy**: a worker thread owns the engine.
//! - **Done**: the worker has reported completion on our channel, but
//!   hasn't been joined yet.
//!
//! When every slot is busy, [`WorkerPool::dispatch`] blocks on the
//! completion channel until some worker finishes, joins it to get the
//! engine back, and reuses that slot. Workers finish in whatever order
//! they like; nothing here tries to preserve the order of frames.

use std::{
    mem,
    sync::Arc,
    thread::{self, JoinHandle},
};

use crossbeam_channel::{unbounded, Receiver, Sender};
use log::{debug, error, info};

use crate::aggregator::{Aggregator, OcrResult};
use crate::config::EngineConfig;
use crate::engine::{EngineFactory, EngineHandle, Recognizer};
use crate::errors::*;
use crate::frame::Frame;

/// What a slot is currently doing.
enum Slot<E: Recognizer> {
    /// We hold the engine.
    Idle(EngineHandle<E>),
    /// A worker thread holds the engine, and will return it when joined.
    Busy(JoinHandle<EngineHandle<E>>),
    /// The engine is in transit between the slot and a worker.
    Vacant,
}

/// Tells the pool that a slot's worker is finished, even if it panics.
struct CompletionGuard {
    slot: usize,
    done_tx: Sender<usize>,
}

impl Drop for CompletionGuard {
    fn drop(&mut self) {
        // The pool may already be gone if the run was aborted.
        let _ = self.done_tx.send(self.slot);
    }
}

/// A bounded set of OCR engines.
pub struct WorkerPool<F: EngineFactory> {
    factory: F,
    engine_config: EngineConfig,
    capacity: usize,
    slots: Vec<Slot<F::Engine>>,
    aggregator: Arc<Aggregator>,
    done_tx: Sender<usize>,
    done_rx: Receiver<usize>,
    verbose: bool,
}

impl<F: EngineFactory> WorkerPool<F> {
    /// Create a pool which will run at most `capacity` engines. Engines are
    /// only built once we have frames for them. A `capacity` of 1 means
    /// that frames are recognized on the calling thread.
    pub fn new(factory: F, engine_config: EngineConfig, capacity: usize, verbose: bool) -> Self {
        let (done_tx, done_rx) = unbounded();
        WorkerPool {
            factory,
            engine_config,
            capacity: capacity.max(1),
            slots: Vec::new(),
            aggregator: Arc::new(Aggregator::new()),
            done_tx,
            done_rx,
            verbose,
        }
    }

    /// The maximum number of engines.
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// The number of engines built so far.
    pub fn engines_started(&self) -> usize {
        self.slots.len()
    }

    /// Recognize `frame` using the first available engine, waiting for one
    /// if necessary. The only errors are fatal ones: being unable to build
    /// an engine, or losing a worker to a panic.
    pub fn dispatch(&mut self, frame: Frame) -> Result<()> {
        if self.slots.len() < self.capacity {
            let id = self.slots.len();
            let handle = EngineHandle::create(&self.factory, &self.engine_config, id)?;
            if self.capacity == 1 {
                self.slots.push(Slot::Idle(handle));
                return self.run_inline(frame);
            }
            self.slots.push(Slot::Vacant);
            return self.spawn(id, handle, frame);
        }

        if self.capacity == 1 {
            return self.run_inline(frame);
        }

        let Ok(id) = self.done_rx.recv() else {
            unreachable!("pool holds its own completion sender");
        };
        let handle = self.reclaim(id)?;
        self.spawn(id, handle, frame)
    }

    /// Wait for every worker, release all engines, and return the results
    /// in completion order.
    pub fn finish(self) -> Result<Vec<OcrResult>> {
        let WorkerPool {
            slots, aggregator, ..
        } = self;
        let mut panicked = None;
        for (id, slot) in slots.into_iter().enumerate() {
            if let Slot::Busy(worker) = slot {
                if worker.join().is_err() {
                    error!("OCR worker {} panicked", id);
                    panicked.get_or_insert(id);
                }
            }
        }
        if let Some(slot) = panicked {
            return Err(Error::WorkerPanicked { slot });
        }
        Ok(Aggregator::into_results(aggregator))
    }

    /// Recognize `frame` on this thread, using slot 0.
    fn run_inline(&mut self, frame: Frame) -> Result<()> {
        match &mut self.slots[0] {
            Slot::Idle(handle) => {
                recognize_frame(handle, frame, &self.aggregator, self.verbose);
                Ok(())
            }
            _ => unreachable!("inline slot is always idle"),
        }
    }

    /// Join the finished worker in slot `id` and take back its engine.
    fn reclaim(&mut self, id: usize) -> Result<EngineHandle<F::Engine>> {
        match mem::replace(&mut self.slots[id], Slot::Vacant) {
            Slot::Busy(worker) => worker.join().map_err(|_| {
                error!("OCR worker {} panicked", id);
                Error::WorkerPanicked { slot: id }
            }),
            Slot::Idle(handle) => Ok(handle),
            Slot::Vacant => unreachable!("slot {} finished without a worker", id),
        }
    }

    /// Start a worker in slot `id`, giving it `handle` and `frame`.
    fn spawn(&mut self, id: usize, handle: EngineHandle<F::Engine>, frame: Frame) -> Result<()> {
        let aggregator = Arc::clone(&self.aggregator);
        let guard = CompletionGuard {
            slot: id,
            done_tx: self.done_tx.clone(),
        };
        let verbose = self.verbose;
        debug!("slot {}: starting subtitle {}", id, frame.counter);
        let worker = thread::Builder::new()
            .name(format!("ocr-{}", id))
            .spawn(move || {
                let _guard = guard;
                let mut handle = handle;
                recognize_frame(&mut handle, frame, &aggregator, verbose);
                handle
            })
            .map_err(Error::SpawnWorker)?;
        self.slots[id] = Slot::Busy(worker);
        Ok(())
    }
}

/// Recognize a single frame and record the result. Recognition errors only
/// affect this frame, which is recorded with no text.
fn recognize_frame<E: Recognizer>(
    handle: &mut EngineHandle<E>,
    frame: Frame,
    aggregator: &Aggregator,
    verbose: bool,
) {
    let Frame {
        counter,
        start,
        end,
        bitmap,
    } = frame;
    let text = match handle.recognize(&bitmap) {
        Ok(text) => {
            if verbose {
                info!("{} Text: {}", counter, text);
            } else {
                debug!("{} Text: {}", counter, text);
            }
            Some(text)
        }
        Err(err) => {
            error!("OCR failed for {}: {}", counter, err);
            None
        }
    };
    drop(bitmap);
    aggregator.push(OcrResult {
        counter,
        start,
        end,
        text,
    });
}
