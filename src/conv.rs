// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Type conversion utilities
//!
//! Atlas coordinates and counts are represented as `u32`/`i32` instead of
//! `usize` by this library since the canvas is bounded well below `u32::MAX`
//! pixels per side and the on-disk format stores 32-bit fields.

use easy_cast::Cast;

/// Convert `usize` → `u32`
///
/// This is a "safer" wrapper around `as` ensuring (on debug builds) that the
/// input value may be represented correctly by `u32`.
#[inline]
pub fn to_u32(x: usize) -> u32 {
    x.cast()
}

/// Convert `u32` → `usize`
///
/// This is a "safer" wrapper around `as` ensuring that the operation is
/// zero-extension.
#[inline]
pub fn to_usize(x: u32) -> usize {
    x.cast()
}

/// Convert `usize` → `i32`
///
/// Checked on debug builds, like [`to_u32`].
#[inline]
pub fn to_i32(x: usize) -> i32 {
    x.cast()
}

/// Scale factor: pixels per font unit
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct DPU(pub f32);

impl DPU {
    pub(crate) fn i16_to_px(self, x: i16) -> f32 {
        f32::from(x) * self.0
    }
    pub(crate) fn u16_to_px(self, x: u16) -> f32 {
        f32::from(x) * self.0
    }
}
