// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! The atlas canvas
//!
//! A [`Canvas`] is the pixel buffer all glyphs are measured on and packed
//! into. During a build it is owned exclusively by the packer; a display
//! layer may share it through [`SharedCanvas`], which enforces the locking
//! contract: a rebuild holds the lock for its whole duration while a display
//! read holds it only for a single blit.

use crate::bounds::PixelSource;
use crate::conv::to_usize;
use crate::{PixelRect, Rgb};
use std::sync::{Mutex, MutexGuard};
use thiserror::Error;

/// Canvas dimension out of range
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("canvas dimension {0} out of range {min}..={max}", min = Canvas::MIN_DIM, max = Canvas::MAX_DIM)]
pub struct InvalidDimensions(pub u32);

/// A fixed-size RGB pixel buffer
///
/// Pixels are stored in row-major order. Coordinates passed to the accessors
/// must lie within bounds; violations are programming errors and panic.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Canvas {
    width: u32,
    height: u32,
    background: Rgb,
    pixels: Vec<Rgb>,
}

impl Canvas {
    /// Minimum canvas side length
    pub const MIN_DIM: u32 = 32;
    /// Maximum canvas side length
    pub const MAX_DIM: u32 = 4096;

    /// Construct a canvas filled with `background`
    ///
    /// Each dimension must lie in `MIN_DIM ..= MAX_DIM`.
    pub fn new(width: u32, height: u32, background: Rgb) -> Result<Self, InvalidDimensions> {
        for dim in [width, height] {
            if !(Self::MIN_DIM..=Self::MAX_DIM).contains(&dim) {
                return Err(InvalidDimensions(dim));
            }
        }
        let pixels = vec![background; to_usize(width) * to_usize(height)];
        Ok(Canvas {
            width,
            height,
            background,
            pixels,
        })
    }

    /// Canvas width in pixels
    #[inline]
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Canvas height in pixels
    #[inline]
    pub fn height(&self) -> u32 {
        self.height
    }

    /// The fill color the canvas was constructed with
    #[inline]
    pub fn background(&self) -> Rgb {
        self.background
    }

    #[inline]
    fn index(&self, x: u32, y: u32) -> usize {
        assert!(x < self.width && y < self.height, "Canvas: ({x}, {y}) out of bounds");
        to_usize(y) * to_usize(self.width) + to_usize(x)
    }

    /// Read one pixel
    #[inline]
    pub fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.pixels[self.index(x, y)]
    }

    /// Write one pixel
    #[inline]
    pub fn set_pixel(&mut self, x: u32, y: u32, color: Rgb) {
        let i = self.index(x, y);
        self.pixels[i] = color;
    }

    /// Fill the whole canvas with the background color
    pub fn clear(&mut self) {
        let bg = self.background;
        self.pixels.fill(bg);
    }

    /// Hard-fill a rectangle
    ///
    /// This is a non-anti-aliased fill: every covered pixel is set to exactly
    /// `color`, leaving no blended pixels at the fill boundary. The rectangle
    /// is clamped to the canvas.
    pub fn fill_rect(&mut self, rect: PixelRect, color: Rgb) {
        let x0 = (rect.x.max(0) as u32).min(self.width);
        let y0 = (rect.y.max(0) as u32).min(self.height);
        let x1 = (rect.right().max(0) as u32).min(self.width);
        let y1 = (rect.bottom().max(0) as u32).min(self.height);
        if x0 >= x1 {
            return;
        }
        for y in y0..y1 {
            let row = to_usize(y) * to_usize(self.width);
            self.pixels[row + to_usize(x0)..row + to_usize(x1)].fill(color);
        }
    }

    /// Blend `ink` over the existing pixel with anti-aliasing coverage
    ///
    /// `coverage` is clamped to `0.0 ..= 1.0`; out-of-bounds coordinates are
    /// ignored so anti-aliasing halos cannot write past the canvas edge.
    pub fn blend_pixel(&mut self, x: i32, y: i32, ink: Rgb, coverage: f32) {
        if x < 0 || y < 0 || x as u32 >= self.width || y as u32 >= self.height {
            return;
        }
        let c = coverage.clamp(0.0, 1.0);
        let i = self.index(x as u32, y as u32);
        let base = self.pixels[i];
        let mix = |a: u8, b: u8| -> u8 {
            (f32::from(a) + (f32::from(b) - f32::from(a)) * c + 0.5) as u8
        };
        self.pixels[i] = Rgb(mix(base.0, ink.0), mix(base.1, ink.1), mix(base.2, ink.2));
    }

    /// A read-only view of a sub-region, clamped to the canvas
    pub fn region(&self, rect: PixelRect) -> Region<'_> {
        let x = rect.x.max(0) as u32;
        let y = rect.y.max(0) as u32;
        let width = (rect.right().max(0) as u32).min(self.width).saturating_sub(x);
        let height = (rect.bottom().max(0) as u32).min(self.height).saturating_sub(y);
        Region {
            canvas: self,
            x,
            y,
            width,
            height,
        }
    }

    /// Copy out the raw pixel data as `R, G, B` byte triples, row-major
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let mut out = Vec::with_capacity(self.pixels.len() * 3);
        for px in &self.pixels {
            out.extend_from_slice(&[px.0, px.1, px.2]);
        }
        out
    }
}

/// A rectangular view into a [`Canvas`]
///
/// Implements [`PixelSource`] for the bounds scanner; coordinates are local
/// to the region's origin.
#[derive(Clone, Copy)]
pub struct Region<'a> {
    canvas: &'a Canvas,
    x: u32,
    y: u32,
    width: u32,
    height: u32,
}

impl<'a> PixelSource for Region<'a> {
    fn width(&self) -> u32 {
        self.width
    }

    fn height(&self) -> u32 {
        self.height
    }

    fn pixel(&self, x: u32, y: u32) -> Rgb {
        self.canvas.pixel(self.x + x, self.y + y)
    }
}

/// The canvas as a shared, mutually-exclusive resource
///
/// A rebuild (writer) and a display blit (reader) synchronize on the same
/// lock. Lock granularity is whole-canvas, whole-build: [`SharedCanvas::lock`]
/// is held by the packer for its entire measurement + layout duration, so an
/// intermediate build state is never observable by a concurrent reader.
#[derive(Debug)]
pub struct SharedCanvas {
    inner: Mutex<Canvas>,
}

impl SharedCanvas {
    /// Wrap a canvas for shared access
    pub fn new(canvas: Canvas) -> Self {
        SharedCanvas {
            inner: Mutex::new(canvas),
        }
    }

    /// Acquire exclusive access for the duration of the guard
    pub fn lock(&self) -> MutexGuard<'_, Canvas> {
        self.inner.lock().unwrap()
    }

    /// Read under the lock for the duration of a single blit
    pub fn read<R>(&self, f: impl FnOnce(&Canvas) -> R) -> R {
        let canvas = self.inner.lock().unwrap();
        f(&canvas)
    }

    /// Replace the canvas wholesale, returning the previous one
    ///
    /// Used on resize: the old buffer is discarded, never partially mutated.
    pub fn replace(&self, canvas: Canvas) -> Canvas {
        std::mem::replace(&mut self.inner.lock().unwrap(), canvas)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BG: Rgb = Rgb(255, 0, 255);
    const INK: Rgb = Rgb(0, 0, 0);

    #[test]
    fn dimension_limits() {
        assert!(Canvas::new(32, 32, BG).is_ok());
        assert!(Canvas::new(4096, 32, BG).is_ok());
        assert_eq!(Canvas::new(31, 64, BG), Err(InvalidDimensions(31)));
        assert_eq!(Canvas::new(64, 4097, BG), Err(InvalidDimensions(4097)));
    }

    #[test]
    fn fill_rect_is_hard() {
        let mut canvas = Canvas::new(32, 32, BG).unwrap();
        canvas.fill_rect(PixelRect::new(4, 5, 3, 2), INK);
        assert_eq!(canvas.pixel(4, 5), INK);
        assert_eq!(canvas.pixel(6, 6), INK);
        // the boundary carries no blended values
        assert_eq!(canvas.pixel(3, 5), BG);
        assert_eq!(canvas.pixel(7, 5), BG);
        assert_eq!(canvas.pixel(4, 4), BG);
        assert_eq!(canvas.pixel(4, 7), BG);
    }

    #[test]
    fn fill_rect_clamps() {
        let mut canvas = Canvas::new(32, 32, BG).unwrap();
        canvas.fill_rect(PixelRect::new(-5, 30, 100, 100), INK);
        assert_eq!(canvas.pixel(0, 31), INK);
        assert_eq!(canvas.pixel(31, 30), INK);
        assert_eq!(canvas.pixel(0, 29), BG);
    }

    #[test]
    fn blend_endpoints() {
        let mut canvas = Canvas::new(32, 32, BG).unwrap();
        canvas.blend_pixel(1, 1, INK, 0.0);
        assert_eq!(canvas.pixel(1, 1), BG);
        canvas.blend_pixel(1, 1, INK, 1.0);
        assert_eq!(canvas.pixel(1, 1), INK);
        // out of bounds is a no-op
        canvas.blend_pixel(-1, 0, INK, 1.0);
        canvas.blend_pixel(0, 32, INK, 1.0);
    }

    #[test]
    fn shared_read_and_replace() {
        let shared = SharedCanvas::new(Canvas::new(32, 32, BG).unwrap());
        shared.lock().set_pixel(3, 3, INK);
        assert_eq!(shared.read(|c| c.pixel(3, 3)), INK);

        let old = shared.replace(Canvas::new(64, 64, INK).unwrap());
        assert_eq!(old.width(), 32);
        assert_eq!(shared.read(|c| c.width()), 64);
    }
}
