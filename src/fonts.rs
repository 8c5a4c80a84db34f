// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Typeface selection and loading
//!
//! Installed typefaces are discovered through [`fontdb`] and managed by the
//! [`FontLibrary`], of which a static singleton exists and can be accessed
//! via [`library()`]. Each loaded face is stored once and kept for the
//! lifetime of the process; both a [`ttf_parser::Face`] (metrics) and an
//! [`ab_glyph::FontRef`] (outlines) are built over the same font bytes.
//!
//! Selection is exact: a request for an unavailable family is an error, not
//! a fallback to some similar face. The atlas generator treats this as
//! invalid input and leaves any previously built asset untouched.

use crate::conv::{to_u32, to_usize, DPU};
use std::sync::{LazyLock, Mutex, RwLock};
use thiserror::Error;
use ttf_parser::Face;

pub use fontdb::{Stretch, Style, Weight};

/// Font face loading errors
#[derive(Error, Debug)]
enum FontError {
    #[error("font load error")]
    TtfParser(#[from] ttf_parser::FaceParsingError),
    #[error("font load error")]
    AbGlyph(#[from] ab_glyph::InvalidFont),
    #[error("font load error")]
    Io(#[from] std::io::Error),
}

/// No matching typeface installed
///
/// The requested family (with weight and style) could not be resolved
/// against the system font database.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("no installed typeface matches '{0}'")]
pub struct NoFaceMatch(pub String);

/// Glyph identifier within a font face
#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, Hash)]
pub struct GlyphId(pub u16);

impl From<GlyphId> for ttf_parser::GlyphId {
    fn from(id: GlyphId) -> Self {
        ttf_parser::GlyphId(id.0)
    }
}

/// Font face identifier
///
/// Identifies a loaded font face within the [`FontLibrary`] by index.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash)]
pub struct FaceId(pub(crate) u32);

impl FaceId {
    /// Get as `usize`
    pub fn get(self) -> usize {
        to_usize(self.0)
    }
}

/// Describes the typeface to build an atlas from
///
/// `family` is matched by name against the installed font families.
#[derive(Clone, Debug, PartialEq)]
pub struct FaceSelector {
    pub family: String,
    pub weight: Weight,
    pub style: Style,
}

impl FaceSelector {
    /// Select a regular face of the named family
    pub fn named(family: impl Into<String>) -> Self {
        FaceSelector {
            family: family.into(),
            weight: Weight::NORMAL,
            style: Style::Normal,
        }
    }
}

/// A store of data for a loaded font face
pub struct FaceStore {
    // Safety: `face` and `ab_glyph` borrow from the heap allocation behind
    // `blob`, which is stable under moves and never freed (stores live in
    // the static FontLibrary until program exit).
    #[allow(unused)]
    blob: std::sync::Arc<[u8]>,
    family: String,
    face: Face<'static>,
    ab_glyph: ab_glyph::FontRef<'static>,
}

impl FaceStore {
    fn new(blob: std::sync::Arc<[u8]>, index: u32, family: String) -> Result<Self, FontError> {
        // Safety: see the field note above; this is a private fn used only to
        // construct stores held by the never-deallocated FontLibrary.
        let data = unsafe { extend_lifetime(&blob[..]) };
        let face = Face::parse(data, index)?;
        let ab_glyph = ab_glyph::FontRef::try_from_slice_and_index(data, index)?;
        Ok(FaceStore {
            blob,
            family,
            face,
            ab_glyph,
        })
    }

    /// The face's primary family name
    pub fn family(&self) -> &str {
        &self.family
    }

    /// Access a [`FaceRef`] object
    pub fn face_ref(&'static self) -> FaceRef {
        FaceRef(&self.face)
    }

    /// Access the [`ab_glyph`] font
    pub fn ab_glyph(&self) -> &ab_glyph::FontRef<'static> {
        &self.ab_glyph
    }
}

#[derive(Default)]
struct FaceList {
    // Safety: unsafe code depends on entries never moving (hence the
    // otherwise redundant use of Box). See FontLibrary::get_face_store.
    #[allow(clippy::vec_box)]
    faces: Vec<Box<FaceStore>>,
    // This is a vec-map keyed on the fontdb face id. Why? Because length
    // should be short.
    loaded: Vec<(fontdb::ID, FaceId)>,
}

impl FaceList {
    fn push(&mut self, face: Box<FaceStore>, source: fontdb::ID) -> FaceId {
        let id = FaceId(to_u32(self.faces.len()));
        self.faces.push(face);
        self.loaded.push((source, id));
        id
    }
}

/// Library of loaded font faces
///
/// This is the type of the global singleton accessible via the [`library()`]
/// function. Thread-safety is handled via internal locks.
pub struct FontLibrary {
    db: Mutex<fontdb::Database>,
    faces: RwLock<FaceList>,
}

impl FontLibrary {
    /// Resolve a selector to a loaded face
    ///
    /// Already-loaded faces are returned from cache; otherwise the face's
    /// source is read and parsed. An unresolvable family yields
    /// [`NoFaceMatch`] and loads nothing.
    pub fn select_face(&self, selector: &FaceSelector) -> Result<FaceId, NoFaceMatch> {
        let no_match = || NoFaceMatch(selector.family.clone());

        let db = self.db.lock().unwrap();
        let query = fontdb::Query {
            families: &[fontdb::Family::Name(&selector.family)],
            weight: selector.weight,
            stretch: Stretch::Normal,
            style: selector.style,
        };
        let id = db.query(&query).ok_or_else(no_match)?;

        let faces = self.faces.read().unwrap();
        for (source, face_id) in faces.loaded.iter() {
            if *source == id {
                return Ok(*face_id);
            }
        }
        drop(faces);

        let info = db.face(id).ok_or_else(no_match)?;
        let family = info
            .families
            .first()
            .map(|(name, _)| name.clone())
            .unwrap_or_else(|| selector.family.clone());
        let index = info.index;
        let blob: std::sync::Arc<[u8]> = match &info.source {
            fontdb::Source::Binary(data) => data.as_ref().as_ref().into(),
            fontdb::Source::File(path) | fontdb::Source::SharedFile(path, _) => {
                match std::fs::read(path) {
                    Ok(data) => data.into(),
                    Err(err) => {
                        log::error!("Failed to read font file {}: {err}", path.display());
                        return Err(no_match());
                    }
                }
            }
        };
        drop(db);

        log::debug!("match: {family}");
        match FaceStore::new(blob, index, family) {
            Ok(store) => Ok(self.faces.write().unwrap().push(Box::new(store), id)),
            Err(err) => {
                log::error!("Failed to load font: {err}");
                Err(no_match())
            }
        }
    }

    /// Get access to the [`FaceStore`]
    ///
    /// Panics if `id` is not valid (required: `id` was returned by
    /// [`FontLibrary::select_face`] on this library).
    pub fn get_face_store(&self, id: FaceId) -> &'static FaceStore {
        let faces = self.faces.read().unwrap();
        assert!(id.get() < faces.faces.len(), "FontLibrary: invalid {id:?}!");
        let store: &FaceStore = &faces.faces[id.get()];
        // Safety: elements of self.faces are never dropped or modified
        unsafe { extend_lifetime(store) }
    }

    /// Get a metrics handle for a face
    pub fn get_face(&self, id: FaceId) -> FaceRef {
        self.get_face_store(id).face_ref()
    }
}

pub(crate) unsafe fn extend_lifetime<'b, T: ?Sized>(r: &'b T) -> &'static T {
    std::mem::transmute::<&'b T, &'static T>(r)
}

static LIBRARY: LazyLock<FontLibrary> = LazyLock::new(|| {
    let mut db = fontdb::Database::new();
    db.load_system_fonts();
    log::info!("Found {} fonts", db.len());
    FontLibrary {
        db: Mutex::new(db),
        faces: Default::default(),
    }
});

/// Access the [`FontLibrary`] singleton
pub fn library() -> &'static FontLibrary {
    &LIBRARY
}

/// Handle to a loaded font face
#[derive(Copy, Clone, Debug)]
pub struct FaceRef(pub(crate) &'static Face<'static>);

impl FaceRef {
    /// Get glyph identifier for a char
    ///
    /// If the char is not found, `GlyphId(0)` is returned (the 'missing
    /// glyph' representation).
    #[inline]
    pub fn glyph_index(&self, c: char) -> GlyphId {
        GlyphId(self.0.glyph_index(c).map(|id| id.0).unwrap_or(0))
    }

    /// Convert `dpem` (dots per Em) to `dpu` (dots per font unit)
    #[inline]
    pub fn dpu(self, dpem: f32) -> DPU {
        DPU(dpem / f32::from(self.0.units_per_em()))
    }

    /// Get a scaled reference
    ///
    /// Units: `dpem` is dots (pixels) per Em.
    #[inline]
    pub fn scale_by_dpem(self, dpem: f32) -> ScaledFaceRef {
        ScaledFaceRef(self.0, self.dpu(dpem))
    }
}

/// Handle to a loaded font face with scale
#[derive(Copy, Clone, Debug)]
pub struct ScaledFaceRef(&'static Face<'static>, DPU);

impl ScaledFaceRef {
    /// Unscaled face
    #[inline]
    pub fn face(&self) -> FaceRef {
        FaceRef(self.0)
    }

    /// Horizontal advancement after this glyph, without shaping or kerning
    #[inline]
    pub fn h_advance(&self, id: GlyphId) -> f32 {
        let x = self.0.glyph_hor_advance(id.into()).unwrap_or(0);
        self.1.u16_to_px(x)
    }

    /// Ascender
    #[inline]
    pub fn ascent(&self) -> f32 {
        self.1.i16_to_px(self.0.ascender())
    }

    /// Descender (negative below the baseline)
    #[inline]
    pub fn descent(&self) -> f32 {
        self.1.i16_to_px(self.0.descender())
    }

    /// Ascent to descent distance
    #[inline]
    pub fn height(&self) -> f32 {
        self.ascent() - self.descent()
    }
}
