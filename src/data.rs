// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Simple data types

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// An RGB pixel color
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct Rgb(pub u8, pub u8, pub u8);

/// The reserved sentinel color
///
/// During bounds detection this value is classified as "definitely not ink"
/// alongside the build's background color. It must never be used as a
/// legitimate background or ink color: if a caller-chosen background happens
/// to equal it, ink pixels matching the sentinel are silently misclassified.
/// The scanner cannot detect this condition.
pub const SENTINEL: Rgb = Rgb(255, 0, 254);

/// A pixel-aligned rectangle in atlas coordinates
///
/// Fields are `i32` to match the serialized representation (four 32-bit
/// signed integers). A rectangle produced by the bounds scanner or the
/// packer always has `width ≥ 1` and `height ≥ 1`; the "no ink found" case
/// is represented by `Option::None`, never by a degenerate rectangle.
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PixelRect {
    pub x: i32,
    pub y: i32,
    pub width: i32,
    pub height: i32,
}

impl PixelRect {
    /// Construct from position and size
    pub fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        PixelRect {
            x,
            y,
            width,
            height,
        }
    }

    /// Construct from inclusive edge extents
    ///
    /// Requires `x_min ≤ x_max` and `y_min ≤ y_max`; the resulting size is
    /// `x_max - x_min + 1` by `y_max - y_min + 1`.
    pub fn from_extents(x_min: i32, x_max: i32, y_min: i32, y_max: i32) -> Self {
        debug_assert!(x_min <= x_max && y_min <= y_max);
        PixelRect {
            x: x_min,
            y: y_min,
            width: x_max - x_min + 1,
            height: y_max - y_min + 1,
        }
    }

    /// One past the right-most column
    #[inline]
    pub fn right(&self) -> i32 {
        self.x + self.width
    }

    /// One past the bottom-most row
    #[inline]
    pub fn bottom(&self) -> i32 {
        self.y + self.height
    }

    /// Whether two rectangles share any pixel
    pub fn intersects(&self, other: &PixelRect) -> bool {
        self.x < other.right()
            && other.x < self.right()
            && self.y < other.bottom()
            && other.y < self.bottom()
    }
}
