//! OCR engines, and the handles which own them.
//!
//! Engines such as Tesseract are not safe to call from several threads at
//! once, so an engine is only ever reachable through a single
//! [`EngineHandle`], and `recognize` takes `&mut self`. To recognize
//! several subtitles at once, we build several engines.

use log::debug;

use crate::config::EngineConfig;
use crate::errors::*;
use crate::frame::Bitmap;

/// A single OCR engine instance.
pub trait Recognizer: Send + 'static {
    /// Recognize the text in `bitmap`, which contains dark text on a light
    /// background. Blocks until recognition finishes.
    fn recognize(&mut self, bitmap: &Bitmap) -> Result<String>;
}

/// Something which knows how to build OCR engines.
pub trait EngineFactory {
    /// The type of engine we build.
    type Engine: Recognizer;

    /// A short name for log messages.
    fn name(&self) -> &'static str;

    /// Build a new engine using `config`.
    fn create(&self, config: &EngineConfig) -> Result<Self::Engine>;
}

/// Exclusive ownership of one engine, plus the configuration used to
/// build it. Not `Clone`: to use the engine on another thread, move the
/// whole handle there.
#[derive(Debug)]
pub struct EngineHandle<E: Recognizer> {
    id: usize,
    engine: E,
    config: EngineConfig,
}

impl<E: Recognizer> EngineHandle<E> {
    /// Build a new engine. An error here means we can't do any OCR at all.
    pub fn create<F>(factory: &F, config: &EngineConfig, id: usize) -> Result<EngineHandle<E>>
    where
        F: EngineFactory<Engine = E>,
    {
        debug!(
            "creating {} engine {} for language {:?}",
            factory.name(),
            id,
            config.language
        );
        let engine = factory.create(config)?;
        Ok(EngineHandle {
            id,
            engine,
            config: config.to_owned(),
        })
    }

    /// Which engine this is, for log messages.
    pub fn id(&self) -> usize {
        self.id
    }

    /// The configuration used to build this engine.
    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    /// Recognize the text in `bitmap`, stripping trailing whitespace and
    /// control characters.
    pub fn recognize(&mut self, bitmap: &Bitmap) -> Result<String> {
        let mut text = self.engine.recognize(bitmap)?;
        let trimmed_len = text
            .trim_end_matches(|c: char| c.is_whitespace() || c.is_control())
            .len();
        text.truncate(trimmed_len);
        Ok(text)
    }
}

impl<E: Recognizer> Drop for EngineHandle<E> {
    fn drop(&mut self) {
        debug!("releasing OCR engine {}", self.id);
    }
}
