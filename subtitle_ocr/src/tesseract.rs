//! OCR using Tesseract, by way of `leptess`.

use std::ffi::{CStr, CString};

use leptess::{capi, tesseract::TessApi};
use tesseract_plumbing::TessBaseApi;

use crate::config::{EngineConfig, EngineMode};
use crate::engine::{EngineFactory, Recognizer};
use crate::errors::*;
use crate::frame::Bitmap;

/// Builds Tesseract engines.
#[derive(Clone, Copy, Debug, Default)]
pub struct TesseractFactory;

impl EngineFactory for TesseractFactory {
    type Engine = TesseractEngine;

    fn name(&self) -> &'static str {
        "tesseract"
    }

    fn create(&self, config: &EngineConfig) -> Result<TesseractEngine> {
        let init_err = |msg: String| Error::engine_init(&config.language, msg);
        let c_string = |s: &str| CString::new(s).map_err(|err| init_err(err.to_string()));

        let data_path = config
            .data_path
            .as_ref()
            .map(|p| c_string(&p.to_string_lossy()))
            .transpose()?;
        let language = c_string(&config.language)?;

        // The engine mode decides which models get loaded, so it has to be
        // passed to init.
        let mut api = TessApi {
            raw: TessBaseApi::create(),
        };
        api.raw
            .init_4(
                data_path.as_deref(),
                Some(language.as_c_str()),
                ocr_engine_mode(config.mode),
            )
            .map_err(|_| init_err("could not initialize Tesseract".to_owned()))?;

        if !config.blacklist.is_empty() {
            let name = c_string("tessedit_char_blacklist")?;
            let value = c_string(&config.blacklist)?;
            api.raw
                .set_variable(&name, &value)
                .map_err(|_| init_err("could not set character blacklist".to_owned()))?;
        }
        Ok(TesseractEngine {
            api,
            dpi: i32::try_from(config.dpi).unwrap_or(i32::MAX),
        })
    }
}

/// Tesseract's value for `mode`.
fn ocr_engine_mode(mode: EngineMode) -> capi::TessOcrEngineMode {
    match mode {
        EngineMode::TesseractOnly => capi::TessOcrEngineMode_OEM_TESSERACT_ONLY,
        EngineMode::LstmOnly => capi::TessOcrEngineMode_OEM_LSTM_ONLY,
        EngineMode::Combined => capi::TessOcrEngineMode_OEM_TESSERACT_LSTM_COMBINED,
        EngineMode::Default => capi::TessOcrEngineMode_OEM_DEFAULT,
    }
}

/// A single Tesseract instance.
pub struct TesseractEngine {
    api: TessApi,
    dpi: i32,
}

impl Recognizer for TesseractEngine {
    fn recognize(&mut self, bitmap: &Bitmap) -> Result<String> {
        let dimension = |n: usize| {
            i32::try_from(n).map_err(|_| Error::recognition(format!("image too large: {}", n)))
        };
        // Tesseract wants every row padded out to the stride, including
        // the last one.
        let compact: Vec<u8>;
        let (pixels, stride) = if bitmap.pixels().len() >= bitmap.stride() * bitmap.height() {
            (bitmap.pixels(), bitmap.stride())
        } else {
            compact = bitmap.rows().flatten().copied().collect();
            (&compact[..], bitmap.width())
        };
        self.api
            .raw
            .set_image(
                pixels,
                dimension(bitmap.width())?,
                dimension(bitmap.height())?,
                1,
                dimension(stride)?,
            )
            .map_err(|err| Error::recognition(format!("{:?}", err)))?;
        self.api.set_source_resolution(self.dpi);
        let text = self
            .api
            .raw
            .get_utf8_text()
            .map_err(|_| Error::recognition("Tesseract returned no text"))?;
        let text: &CStr = text.as_ref();
        Ok(text.to_string_lossy().into_owned())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[test]
    fn engine_modes_match_tesseract_numbers() {
        for n in 0..=3 {
            let mode = EngineMode::from_number(n).unwrap();
            assert_eq!(ocr_engine_mode(mode) as u8, n);
        }
    }

    #[test]
    fn engines_can_move_between_threads() {
        fn assert_send<T: Send>() {}
        assert_send::<TesseractEngine>();
    }
}
