//! Preparing subtitle images for the OCR engine.

use std::{
    fs,
    path::{Path, PathBuf},
};

use image::{
    codecs::pnm::{PnmEncoder, PnmSubtype, SampleEncoding},
    ColorType, ImageEncoder,
};

use crate::errors::*;
use crate::frame::Bitmap;

/// Inverted values above this become white, everything else black.
const INVERT_THRESHOLD: u8 = 0x80;

/// Rejects images too small to contain any real text. DVD subtitle
/// streams are full of tiny blank images used to clear the screen.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SizeGate {
    /// Minimum width in pixels.
    pub min_width: usize,
    /// Minimum height in pixels.
    pub min_height: usize,
}

impl SizeGate {
    /// Is `bitmap` large enough to be worth recognizing?
    pub fn accepts(&self, bitmap: &Bitmap) -> bool {
        bitmap.width() >= self.min_width && bitmap.height() >= self.min_height
    }
}

/// Return an inverted, black-and-white copy of `bitmap`.
///
/// Subtitles are light text on a dark (or transparent) background, but
/// current Tesseract releases want dark text on a light background.
pub fn invert(bitmap: &Bitmap) -> Bitmap {
    bitmap.map_pixels(|p| {
        if 255 - p > INVERT_THRESHOLD {
            0xff
        } else {
            0
        }
    })
}

/// The path used when dumping image number `counter`.
pub fn dump_path(base: &Path, counter: u32) -> PathBuf {
    let mut name = base.as_os_str().to_owned();
    name.push(format!("-{:04}.pgm", counter));
    PathBuf::from(name)
}

/// Encode `bitmap` as a binary PGM image, dropping any row padding.
pub fn encode_pgm(bitmap: &Bitmap) -> Result<Vec<u8>> {
    let mut data = Vec::with_capacity(bitmap.width() * bitmap.height());
    for row in bitmap.rows() {
        data.extend_from_slice(row);
    }
    let mut out = vec![];
    // Subtitle images are at most a few thousand pixels wide.
    PnmEncoder::new(&mut out)
        .with_subtype(PnmSubtype::Graymap(SampleEncoding::Binary))
        .write_image(
            &data,
            bitmap.width() as u32,
            bitmap.height() as u32,
            ColorType::L8,
        )?;
    Ok(out)
}

/// Write `bitmap` to `<base>-<counter>.pgm` for debugging.
pub fn dump_pgm(base: &Path, counter: u32, bitmap: &Bitmap) -> Result<PathBuf> {
    let path = dump_path(base, counter);
    let pgm = encode_pgm(bitmap)?;
    fs::write(&path, pgm).map_err(|err| Error::io(&path, err))?;
    Ok(path)
}
