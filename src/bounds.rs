// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Ink bounds detection
//!
//! Finds the tight bounding box of "ink" pixels within a region, where ink
//! is any pixel that is neither the background color nor the sentinel color.
//! The scanner is decoupled from any particular buffer layout via the
//! [`PixelSource`] trait: a canvas region, a strided buffer or a synthetic
//! grid all work.

use crate::conv::to_i32;
use crate::{PixelRect, Rgb};

/// Read-only access to a rectangular pixel grid
pub trait PixelSource {
    /// Region width in pixels
    fn width(&self) -> u32;
    /// Region height in pixels
    fn height(&self) -> u32;
    /// Read the pixel at `(x, y)`; requires `x < width()` and `y < height()`
    fn pixel(&self, x: u32, y: u32) -> Rgb;
}

/// A pixel grid borrowed from a row-major slice, for tests and synthetic data
pub struct SliceSource<'a> {
    width: u32,
    height: u32,
    pixels: &'a [Rgb],
}

impl<'a> SliceSource<'a> {
    /// Construct; requires `pixels.len() == width * height`
    pub fn new(width: u32, height: u32, pixels: &'a [Rgb]) -> Self {
        assert_eq!(pixels.len(), (width * height) as usize);
        SliceSource {
            width,
            height,
            pixels,
        }
    }
}

impl<'a> PixelSource for SliceSource<'a> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[(y * self.width + x) as usize]
    }
}

/// Find the tight bounding box of ink pixels
///
/// Scans independently from each of the four edges until the first pixel
/// that is neither `background` nor `sentinel` is found along that edge's
/// sweep axis; the four scans yield the inclusive extents of the result.
///
/// Returns `None` when the region contains no ink at all (for example the
/// space character, or a glyph whose ink never got drawn). Callers must
/// handle this before using the rectangle.
pub fn ink_bounds<S: PixelSource>(src: &S, background: Rgb, sentinel: Rgb) -> Option<PixelRect> {
    let (w, h) = (src.width(), src.height());
    if w == 0 || h == 0 {
        return None;
    }
    let is_ink = |x: u32, y: u32| {
        let px = src.pixel(x, y);
        px != background && px != sentinel
    };

    let x_min = (0..w).find(|&x| (0..h).any(|y| is_ink(x, y)))?;
    // Ink exists, so the remaining three scans cannot fail.
    let x_max = (0..w).rev().find(|&x| (0..h).any(|y| is_ink(x, y)))?;
    let y_min = (0..h).find(|&y| (0..w).any(|x| is_ink(x, y)))?;
    let y_max = (0..h).rev().find(|&y| (0..w).any(|x| is_ink(x, y)))?;

    Some(PixelRect::from_extents(
        to_i32(x_min as usize),
        to_i32(x_max as usize),
        to_i32(y_min as usize),
        to_i32(y_max as usize),
    ))
}
