//! Reading subtitle images from a frame directory, as written by
//! `vobsub2png`: an `index.json` file plus one PNG per subtitle.

use std::{
    fs,
    path::{Path, PathBuf},
};

use anyhow::{anyhow, Context, Result};
use image::Pixel;
use serde::Deserialize;
use subtitle_ocr::{Bitmap, Pts, RawFrame};

/// The contents of `index.json`.
#[derive(Debug, Deserialize)]
struct IndexInfo {
    /// ISO 639-1 code of the subtitle language, if the extractor knew it.
    #[serde(default)]
    lang: Option<String>,
    subtitles: Vec<SubInfo>,
}

/// One entry in `index.json`. Positioning information is ignored.
#[derive(Debug, Deserialize)]
struct SubInfo {
    /// Start time in seconds.
    start: f64,
    /// End time in seconds, or `null` if the stream didn't say.
    #[serde(default)]
    end: Option<f64>,
    /// Start time recorded in the stream itself, if it differs from the
    /// index.
    #[serde(default)]
    packet_start: Option<f64>,
    /// Image file name, relative to the directory.
    path: String,
}

/// A directory of subtitle images.
#[derive(Debug)]
pub struct FrameDirectory {
    dir: PathBuf,
    info: IndexInfo,
}

impl FrameDirectory {
    /// Open a frame directory. `path` may name either the directory or the
    /// `index.json` file inside it.
    pub fn open(path: &Path) -> Result<FrameDirectory> {
        let (dir, index_path) = if path.is_dir() {
            (path.to_owned(), path.join("index.json"))
        } else {
            let dir = match path.parent() {
                Some(parent) if !parent.as_os_str().is_empty() => parent.to_owned(),
                _ => PathBuf::from("."),
            };
            (dir, path.to_owned())
        };
        let json = fs::read_to_string(&index_path)
            .with_context(|| format!("could not read {}", index_path.display()))?;
        let info: IndexInfo = serde_json::from_str(&json)
            .with_context(|| format!("could not parse {}", index_path.display()))?;
        Ok(FrameDirectory { dir, info })
    }

    /// The directory containing our images.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// The subtitle language recorded in the index.
    pub fn language(&self) -> Option<&str> {
        self.info.lang.as_deref()
    }

    /// How many subtitles are listed in the index.
    pub fn len(&self) -> usize {
        self.info.subtitles.len()
    }

    /// Load each subtitle in index order.
    pub fn frames(&self) -> impl Iterator<Item = Result<RawFrame>> + '_ {
        self.info.subtitles.iter().map(move |sub| {
            let image_path = self.dir.join(&sub.path);
            let bitmap = load_bitmap(&image_path)?;
            Ok(RawFrame {
                start: Pts::from_seconds(sub.start),
                end: sub.end.map_or(Pts::UNKNOWN, Pts::from_seconds),
                packet_pts: sub.packet_start.map(Pts::from_seconds),
                bitmap,
            })
        })
    }
}

/// Load an image as 8-bit grayscale. Transparent pixels become black, the
/// same as the background of a decoded subtitle.
pub fn load_bitmap(path: &Path) -> Result<Bitmap> {
    let image = image::open(path)
        .with_context(|| format!("could not load {}", path.display()))?
        .into_rgba8();
    let (width, height) = image.dimensions();
    let pixels = image
        .pixels()
        .map(|px| if px[3] == 0 { 0 } else { px.to_luma()[0] })
        .collect();
    Bitmap::from_rows(pixels, width as usize, height as usize)
        .ok_or_else(|| anyhow!("bad image dimensions in {}", path.display()))
}
