//! Stand-in for the Tesseract engine when built without the `tesseract`
//! feature. Every attempt to build an engine fails.

use crate::config::EngineConfig;
use crate::engine::{EngineFactory, Recognizer};
use crate::errors::*;
use crate::frame::Bitmap;

/// Builds Tesseract engines, or would, if this build supported them.
#[derive(Clone, Copy, Debug, Default)]
pub struct TesseractFactory;

impl EngineFactory for TesseractFactory {
    type Engine = TesseractEngine;

    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn create(&self, _config: &EngineConfig) -> Result<TesseractEngine> {
        Err(Error::EngineUnavailable { name: "tesseract" })
    }
}

/// A Tesseract engine. No values of this type can exist.
#[derive(Debug)]
pub enum TesseractEngine {}

impl Recognizer for TesseractEngine {
    fn recognize(&mut self, _bitmap: &Bitmap) -> Result<String> {
        match *self {}
    }
}

#[test]
fn stub_factory_always_fails() {
    let err = TesseractFactory.create(&EngineConfig::default()).unwrap_err();
    assert!(matches!(err, Error::EngineUnavailable { .. }));
}
