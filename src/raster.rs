// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Glyph rastering onto the atlas canvas
//!
//! One glyph at a time is drawn anti-aliased into a scratch region of the
//! canvas, its tight ink bounds measured, and the region erased again with a
//! hard fill. The measured bounds are draw-local: placement re-renders the
//! same outline at a translated integer origin, which shifts the rendered
//! pixels exactly (no sub-pixel drift), so the ink lands in the recorded
//! rectangle.

use crate::bounds::ink_bounds;
use crate::fonts::ScaledFaceRef;
use crate::{Canvas, PixelRect, Rgb, SENTINEL};
use ab_glyph::Font;
use easy_cast::*;

/// Safe offset of the scratch region from the canvas origin
///
/// Wide enough that anti-aliasing halos cannot touch the canvas edge.
pub(crate) const MARGIN: u32 = 4;

/// Renders glyphs of one scaled face
#[derive(Clone, Copy)]
pub(crate) struct GlyphPen {
    pub face: ScaledFaceRef,
    pub font: &'static ab_glyph::FontRef<'static>,
    pub dpem: f32,
    pub ink: Rgb,
}

impl GlyphPen {
    /// Measure one character's tight ink bounds
    ///
    /// Draws the character at the safe margin, scans the scratch region and
    /// erases it again, leaving the canvas as found. The returned rectangle
    /// is draw-local (relative to the render origin passed to
    /// [`GlyphPen::draw`]); `None` means no ink was detected.
    pub fn measure(&self, canvas: &mut Canvas, c: char) -> Option<PixelRect> {
        let id = self.face.face().glyph_index(c);

        // The region is computed from conservative metrics, doubled in both
        // dimensions so descenders and overshoot are fully contained.
        let advance: u32 = (2.0 * self.face.h_advance(id)).cast_ceil();
        let height: u32 = (2.0 * self.face.height()).cast_ceil();
        let region = PixelRect::new(
            0,
            0,
            (advance + 2 * MARGIN).min(canvas.width()).cast(),
            (height + 2 * MARGIN).min(canvas.height()).cast(),
        );

        self.render(canvas, c, (MARGIN.cast(), MARGIN.cast()));
        let found = ink_bounds(&canvas.region(region), canvas.background(), SENTINEL);

        // Erase with a hard fill: an anti-aliased repaint would leave faint
        // blended pixels at the boundary that a later scan could misread.
        canvas.fill_rect(region, canvas.background());

        let margin: i32 = MARGIN.cast();
        found.map(|r| PixelRect::new(r.x - margin, r.y - margin, r.width, r.height))
    }

    /// Draw one character with its draw-local origin at `origin`
    ///
    /// Ink appears at `origin` offset by the rectangle measured by
    /// [`GlyphPen::measure`].
    pub fn draw(&self, canvas: &mut Canvas, c: char, origin: (i32, i32)) {
        self.render(canvas, c, (origin.0.cast(), origin.1.cast()));
    }

    fn render(&self, canvas: &mut Canvas, c: char, origin: (f32, f32)) {
        let id = self.face.face().glyph_index(c);
        let scale = self.dpem * self.font.height_unscaled() / self.font.units_per_em().unwrap();
        let glyph = ab_glyph::Glyph {
            id: ab_glyph::GlyphId(id.0),
            scale: scale.into(),
            // pen origin is the region's top-left; the baseline sits one
            // ascent below it
            position: ab_glyph::point(origin.0, origin.1 + self.face.ascent()),
        };
        let Some(outline) = self.font.outline_glyph(glyph) else {
            return; // nothing to draw (e.g. whitespace)
        };

        let bounds = outline.px_bounds();
        let x0: i32 = bounds.min.x.cast_trunc();
        let y0: i32 = bounds.min.y.cast_trunc();
        let ink = self.ink;
        outline.draw(|x, y, coverage| {
            canvas.blend_pixel(x0 + i32::conv(x), y0 + i32::conv(y), ink, coverage);
        });
    }
}
