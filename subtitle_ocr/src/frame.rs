//! Decoded subtitle bitmaps and their timing.

use std::fmt;

use crate::time::Pts;

/// An 8-bit grayscale image, stored row by row. Rows may be padded, so
/// each row starts `stride` bytes after the previous one.
#[derive(Clone, PartialEq, Eq)]
pub struct Bitmap {
    pixels: Vec<u8>,
    width: usize,
    height: usize,
    stride: usize,
}

impl Bitmap {
    /// Wrap a pixel buffer. Returns `None` if `stride` is smaller than
    /// `width`, or if `pixels` is too short to hold every row.
    pub fn new(pixels: Vec<u8>, width: usize, height: usize, stride: usize) -> Option<Bitmap> {
        if stride < width {
            return None;
        }
        let needed = match height {
            0 => 0,
            h => stride * (h - 1) + width,
        };
        if pixels.len() < needed {
            return None;
        }
        Some(Bitmap {
            pixels,
            width,
            height,
            stride,
        })
    }

    /// Wrap an unpadded buffer of `width * height` pixels.
    pub fn from_rows(pixels: Vec<u8>, width: usize, height: usize) -> Option<Bitmap> {
        if pixels.len() != width * height {
            return None;
        }
        Bitmap::new(pixels, width, height, width)
    }

    /// Width in pixels.
    pub fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> usize {
        self.height
    }

    /// Bytes between the start of one row and the start of the next.
    pub fn stride(&self) -> usize {
        self.stride
    }

    /// The raw buffer, including any row padding.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// Iterate over rows, with padding removed.
    pub fn rows(&self) -> impl Iterator<Item = &[u8]> + '_ {
        (0..self.height).map(move |y| {
            let start = y * self.stride;
            &self.pixels[start..start + self.width]
        })
    }

    /// Build a new bitmap of the same shape by mapping every byte of the
    /// buffer (padding included).
    pub(crate) fn map_pixels<F: Fn(u8) -> u8>(&self, f: F) -> Bitmap {
        Bitmap {
            pixels: self.pixels.iter().map(|&p| f(p)).collect(),
            width: self.width,
            height: self.height,
            stride: self.stride,
        }
    }
}

impl fmt::Debug for Bitmap {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        f.debug_struct("Bitmap")
            .field("width", &self.width)
            .field("height", &self.height)
            .field("stride", &self.stride)
            .field("bytes", &self.pixels.len())
            .finish()
    }
}

/// A subtitle as handed to us by a decoder, before we've decided whether
/// to process it.
#[derive(Clone, Debug)]
pub struct RawFrame {
    /// When the subtitle appears.
    pub start: Pts,
    /// When it disappears, or `Pts::UNKNOWN`.
    pub end: Pts,
    /// The timestamp recorded for this packet by the container's index, if
    /// any. This should match `start`, but broken files disagree.
    pub packet_pts: Option<Pts>,
    /// The subtitle image.
    pub bitmap: Bitmap,
}

/// A subtitle which has been accepted for recognition, and assigned its
/// place in the output.
#[derive(Clone, Debug)]
pub struct Frame {
    /// 1-based position in the output track.
    pub counter: u32,
    /// When the subtitle appears.
    pub start: Pts,
    /// When it disappears, or `Pts::UNKNOWN`.
    pub end: Pts,
    /// The image to recognize (already preprocessed).
    pub bitmap: Bitmap,
}
