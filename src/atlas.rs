// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Atlas building
//!
//! [`build_atlas`] produces a complete [`FontAsset`] and a finished canvas
//! from a typeface, colors and canvas dimensions. The build runs two passes
//! under a single canvas lock: a measurement pass rasterizing every
//! character of the active set to find its tight bounds, then a layout pass
//! placing the measured glyphs in shelf rows and drawing them at their final
//! positions.
//!
//! Packing order is an explicit total order: ascending code point. Glyphs
//! that do not fit the canvas are dropped from the asset; the drop is
//! reported through [`AtlasBuild::dropped`] and a warning, never silently.

use crate::canvas::InvalidDimensions;
use crate::charset::{alias_source, Charset};
use crate::conv::to_i32;
use crate::fonts::{library, FaceSelector, NoFaceMatch};
use crate::raster::GlyphPen;
use crate::{Canvas, FontAsset, PixelRect, Rgb, SharedCanvas};
use std::collections::BTreeMap;
use thiserror::Error;

/// Inputs to an atlas build
#[derive(Clone, Debug, PartialEq)]
pub struct BuildParams {
    /// The typeface to rasterize
    pub face: FaceSelector,
    /// Font size, dots (pixels) per Em
    pub dpem: f32,
    /// Glyph ink color
    pub ink: Rgb,
    /// Canvas background color
    pub background: Rgb,
    /// Canvas width, `Canvas::MIN_DIM ..= Canvas::MAX_DIM`
    pub width: u32,
    /// Canvas height, `Canvas::MIN_DIM ..= Canvas::MAX_DIM`
    pub height: u32,
    /// Exclude lowercase letters and alias them to their uppercase glyphs
    pub caps_only: bool,
    /// Caller-supplied linkage key to the saved atlas bitmap
    pub image_resource_id: u32,
}

/// Atlas build failure
///
/// Any failure aborts generation before the shared canvas is touched, so a
/// previously built asset and canvas remain intact.
#[derive(Error, Debug)]
pub enum BuildError {
    #[error(transparent)]
    Dimensions(#[from] InvalidDimensions),
    #[error(transparent)]
    Face(#[from] NoFaceMatch),
}

/// The products of one build invocation
#[derive(Clone, Debug, PartialEq)]
pub struct AtlasBuild {
    /// The completed asset; the matching pixels are in the shared canvas
    pub asset: FontAsset,
    /// Characters that did not fit the canvas, in packing order
    ///
    /// Dropping is the documented overflow policy; callers wanting a loud
    /// failure instead can reject a build with a non-empty list.
    pub dropped: Vec<char>,
}

/// Build a font atlas into `shared`, returning the asset describing it
///
/// The canvas is replaced wholesale (it takes the requested dimensions and
/// background) and the lock is held for the entire build, so a concurrent
/// display reader never observes an intermediate state. A new build fully
/// supersedes the previous asset; nothing is mutated across builds.
pub fn build_atlas(params: &BuildParams, shared: &SharedCanvas) -> Result<AtlasBuild, BuildError> {
    let fresh = Canvas::new(params.width, params.height, params.background)?;

    let face_id = library().select_face(&params.face)?;
    let store = library().get_face_store(face_id);
    let pen = GlyphPen {
        face: store.face_ref().scale_by_dpem(params.dpem),
        font: store.ab_glyph(),
        dpem: params.dpem,
        ink: params.ink,
    };

    let charset = Charset::new(params.caps_only);

    let mut canvas = shared.lock();
    *canvas = fresh;

    // Pass 1: measurement. BTreeMap fixes the packing order by code point.
    let mut measured = BTreeMap::new();
    for c in charset.iter() {
        let local = pen.measure(&mut canvas, c);
        if local.is_none() {
            log::warn!("No ink detected for {c:?}");
        }
        measured.insert(c, local);
    }
    canvas.clear();

    // Pass 2: layout, then draw each glyph at its final position.
    let layout = lay_out(&measured, params.width, params.height);
    for (&c, &rect) in layout.placements.iter() {
        if let Some(local) = measured[&c] {
            pen.draw(&mut canvas, c, (rect.x - local.x, rect.y - local.y));
        }
    }
    drop(canvas);

    if !layout.dropped.is_empty() {
        log::warn!(
            "Atlas canvas {}x{} full: {} of {} glyphs dropped",
            params.width,
            params.height,
            layout.dropped.len(),
            measured.len()
        );
    }

    let mut glyphs = layout.placements;
    if charset.caps_only() {
        synthesize_aliases(&mut glyphs);
    }

    let asset = FontAsset {
        name: store.family().to_string(),
        image_resource_id: params.image_resource_id,
        char_height: layout.row_height,
        glyphs,
    };
    Ok(AtlasBuild {
        asset,
        dropped: layout.dropped,
    })
}

/// Copy each placed uppercase glyph's rectangle to its lowercase letter
///
/// Only letters whose uppercase counterpart survived packing get an entry.
pub(crate) fn synthesize_aliases(glyphs: &mut BTreeMap<char, PixelRect>) {
    for lc in 'a'..='z' {
        let rect = alias_source(lc).and_then(|uc| glyphs.get(&uc)).copied();
        if let Some(rect) = rect {
            glyphs.insert(lc, rect);
        }
    }
}

pub(crate) struct Layout {
    pub placements: BTreeMap<char, PixelRect>,
    pub row_height: i32,
    pub dropped: Vec<char>,
}

/// Shelf/row layout over measured glyph bounds
///
/// Walks the measured map in key order, placing glyphs left-to-right in rows
/// of uniform height (the maximum measured glyph height), bottom-aligned so
/// visual baselines coincide. The cursor starts at `(1, 1)`; horizontal
/// advance is width + 1. A glyph that would exceed the canvas width wraps to
/// the next row; once a row would exceed the canvas height, layout stops and
/// the remaining glyphs are reported dropped. A glyph with no measured ink
/// still reserves a 1×1 slot so the cursor cannot overlap the next glyph.
pub(crate) fn lay_out(
    measured: &BTreeMap<char, Option<PixelRect>>,
    canvas_width: u32,
    canvas_height: u32,
) -> Layout {
    let width = to_i32(canvas_width as usize);
    let height = to_i32(canvas_height as usize);
    let row_height = measured
        .values()
        .flatten()
        .map(|r| r.height)
        .max()
        .unwrap_or(1)
        .max(1);

    let mut placements = BTreeMap::new();
    let mut dropped = Vec::new();
    let (mut cx, mut cy) = (1, 1);
    let mut full = false;

    for (&c, local) in measured.iter() {
        if full {
            dropped.push(c);
            continue;
        }
        // minimum slot for a glyph with no detected ink
        let (w, h) = match local {
            Some(r) => (r.width.max(1), r.height.max(1)),
            None => (1, 1),
        };

        if 1 + w > width {
            // wider than the canvas itself; wrapping would not help
            log::warn!("Glyph {c:?} ({w}px) is wider than the canvas");
            dropped.push(c);
            continue;
        }
        if cx + w > width {
            cx = 1;
            cy += row_height + 1;
        }
        if cy + row_height > height {
            full = true;
            dropped.push(c);
            continue;
        }

        // bottom-align within the row: baselines sit at cy + row_height
        let y = cy + (row_height - h);
        placements.insert(c, PixelRect::new(cx, y, w, h));
        cx += w + 1;
    }

    Layout {
        placements,
        row_height,
        dropped,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn measured(glyphs: &[(char, Option<(i32, i32)>)]) -> BTreeMap<char, Option<PixelRect>> {
        glyphs
            .iter()
            .map(|&(c, size)| (c, size.map(|(w, h)| PixelRect::new(0, 0, w, h))))
            .collect()
    }

    #[test]
    fn two_glyph_scenario() {
        let m = measured(&[('A', Some((10, 10))), ('B', Some((10, 10)))]);
        let layout = lay_out(&m, 64, 16);
        assert_eq!(layout.row_height, 10);
        assert_eq!(layout.placements[&'A'], PixelRect::new(1, 1, 10, 10));
        assert_eq!(layout.placements[&'B'], PixelRect::new(12, 1, 10, 10));
        assert!(layout.dropped.is_empty());
    }

    #[test]
    fn rows_are_bottom_aligned() {
        let m = measured(&[('A', Some((4, 10))), ('B', Some((4, 6))), ('C', Some((4, 1)))]);
        let layout = lay_out(&m, 64, 32);
        assert_eq!(layout.row_height, 10);
        // baselines coincide at y = 11
        assert_eq!(layout.placements[&'A'].bottom(), 11);
        assert_eq!(layout.placements[&'B'].bottom(), 11);
        assert_eq!(layout.placements[&'C'].bottom(), 11);
        assert_eq!(layout.placements[&'B'].y, 5);
    }

    #[test]
    fn wrap_to_next_row() {
        let m = measured(&[
            ('A', Some((20, 8))),
            ('B', Some((20, 8))),
            ('C', Some((20, 8))),
        ]);
        let layout = lay_out(&m, 48, 48);
        assert_eq!(layout.placements[&'A'], PixelRect::new(1, 1, 20, 8));
        assert_eq!(layout.placements[&'B'], PixelRect::new(22, 1, 20, 8));
        // 43 + 20 > 48: wrap; next row starts at cy = 1 + 8 + 1
        assert_eq!(layout.placements[&'C'], PixelRect::new(1, 10, 20, 8));
    }

    #[test]
    fn overflow_drops_code_point_tail() {
        // 64×16 fits a single row of five 10px glyphs (at x = 1, 12, ..., 45)
        let chars: Vec<char> = ('A'..='H').collect();
        let m = measured(
            &chars
                .iter()
                .map(|&c| (c, Some((10, 10))))
                .collect::<Vec<_>>(),
        );
        let layout = lay_out(&m, 64, 16);
        assert_eq!(layout.placements.len(), 5);
        assert_eq!(layout.dropped, vec!['F', 'G', 'H']);
        assert!(layout.placements.len() < m.len());
    }

    #[test]
    fn no_overlap_and_in_bounds() {
        let sizes: Vec<(char, Option<(i32, i32)>)> = ('A'..='Z')
            .enumerate()
            .map(|(i, c)| (c, Some((1 + (i as i32 * 7) % 13, 1 + (i as i32 * 5) % 11))))
            .collect();
        let m = measured(&sizes);
        let layout = lay_out(&m, 96, 64);

        let rects: Vec<PixelRect> = layout.placements.values().copied().collect();
        for (i, a) in rects.iter().enumerate() {
            assert!(a.x >= 0 && a.y >= 0 && a.right() <= 96 && a.bottom() <= 64, "{a:?}");
            for b in &rects[i + 1..] {
                assert!(!a.intersects(b), "{a:?} overlaps {b:?}");
            }
        }
    }

    #[test]
    fn empty_bounds_reserve_slot() {
        let m = measured(&[('A', None), ('B', Some((5, 5)))]);
        let layout = lay_out(&m, 32, 32);
        // the empty glyph holds a 1×1 bottom-aligned slot and advances the cursor
        assert_eq!(layout.placements[&'A'], PixelRect::new(1, 5, 1, 1));
        assert_eq!(layout.placements[&'B'], PixelRect::new(3, 1, 5, 5));
    }

    #[test]
    fn oversized_glyph_is_dropped_not_looped() {
        let m = measured(&[('A', Some((100, 5))), ('B', Some((5, 5)))]);
        let layout = lay_out(&m, 32, 32);
        assert_eq!(layout.dropped, vec!['A']);
        assert_eq!(layout.placements[&'B'], PixelRect::new(1, 1, 5, 5));
    }

    #[test]
    fn aliases_copy_uppercase_rects() {
        let mut glyphs = BTreeMap::new();
        glyphs.insert('A', PixelRect::new(1, 1, 8, 9));
        glyphs.insert('Q', PixelRect::new(10, 1, 7, 9));
        synthesize_aliases(&mut glyphs);
        assert_eq!(glyphs[&'a'], glyphs[&'A']);
        assert_eq!(glyphs[&'q'], glyphs[&'Q']);
        // 'B' was not placed, so 'b' gets no alias
        assert!(!glyphs.contains_key(&'b'));
    }
}
