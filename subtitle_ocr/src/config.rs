//! Run configuration. Everything a component needs is passed to it here;
//! there is no global state.

use std::{num::NonZeroUsize, path::PathBuf, thread};

/// Which recognizer a Tesseract-style engine should use. The numeric
/// values match Tesseract's `--oem` option.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum EngineMode {
    /// The original pattern-matching recognizer.
    TesseractOnly,
    /// The neural network recognizer.
    LstmOnly,
    /// Both recognizers combined.
    Combined,
    /// Whatever the engine considers best.
    #[default]
    Default,
}

impl EngineMode {
    /// Look up a mode by its numeric Tesseract value.
    pub fn from_number(n: u8) -> Option<EngineMode> {
        match n {
            0 => Some(EngineMode::TesseractOnly),
            1 => Some(EngineMode::LstmOnly),
            2 => Some(EngineMode::Combined),
            3 => Some(EngineMode::Default),
            _ => None,
        }
    }

    /// The numeric Tesseract value of this mode.
    pub fn number(self) -> u8 {
        match self {
            EngineMode::TesseractOnly => 0,
            EngineMode::LstmOnly => 1,
            EngineMode::Combined => 2,
            EngineMode::Default => 3,
        }
    }
}

/// Settings used to construct every OCR engine in a run.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EngineConfig {
    /// Where the engine's language data lives. `None` means the engine's
    /// built-in default.
    pub data_path: Option<PathBuf>,
    /// The engine's language code (ISO 639-3 for Tesseract, e.g. `"eng"`).
    pub language: String,
    /// Which recognizer to use.
    pub mode: EngineMode,
    /// Characters which should never be recognized.
    pub blacklist: String,
    /// Resolution of the subtitle images, in dots per inch.
    pub dpi: u32,
}

impl Default for EngineConfig {
    fn default() -> EngineConfig {
        EngineConfig {
            data_path: None,
            language: "eng".to_owned(),
            mode: EngineMode::Default,
            blacklist: String::new(),
            dpi: 72,
        }
    }
}

/// Settings for a complete OCR run.
#[derive(Clone, Debug)]
pub struct OcrConfig {
    /// How to build each engine.
    pub engine: EngineConfig,
    /// Images narrower than this are skipped as noise.
    pub min_width: usize,
    /// Images shorter than this are skipped as noise.
    pub min_height: usize,
    /// Maximum number of engines running at once. 0 means one per CPU.
    pub pool_size: usize,
    /// If set, write every accepted image to `<base>-<counter>.pgm`.
    pub dump_images: Option<PathBuf>,
    /// Always end each subtitle where the next one starts, instead of only
    /// when the end time is unknown.
    pub force_next_start: bool,
    /// Log recognized text and timestamp problems at a higher level.
    pub verbose: bool,
}

impl Default for OcrConfig {
    fn default() -> OcrConfig {
        OcrConfig {
            engine: EngineConfig::default(),
            min_width: 9,
            min_height: 1,
            pool_size: 0,
            dump_images: None,
            force_next_start: false,
            verbose: false,
        }
    }
}

impl OcrConfig {
    /// The number of engines we'll actually run, resolving 0 to the
    /// available hardware parallelism.
    pub fn effective_pool_size(&self) -> usize {
        match self.pool_size {
            0 => thread::available_parallelism()
                .map(NonZeroUsize::get)
                .unwrap_or(1),
            n => n,
        }
    }
}
