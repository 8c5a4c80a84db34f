// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Bitmap font atlas generation
//!
//! This library builds a packed bitmap font atlas from an installed typeface
//! and describes it with a compact binary asset a runtime renderer can
//! consume. A build rasterizes each character of a fixed Latin set, measures
//! its tight ink bounds, packs the glyphs into shelf rows on a shared canvas
//! and records their rectangles in a [`FontAsset`]. The asset persists
//! through the symmetric primitive codec in [`codec`]; the canvas saves as
//! an uncompressed bitmap via [`save_bitmap`].
//!
//! ```no_run
//! use bitfont::{build_atlas, fonts::FaceSelector, save_bitmap};
//! use bitfont::{BuildParams, Canvas, Rgb, SharedCanvas};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let params = BuildParams {
//!     face: FaceSelector::named("DejaVu Sans"),
//!     dpem: 24.0,
//!     ink: Rgb(0, 0, 0),
//!     background: Rgb(255, 0, 255),
//!     width: 256,
//!     height: 256,
//!     caps_only: false,
//!     image_resource_id: 1001,
//! };
//! let shared = SharedCanvas::new(Canvas::new(params.width, params.height, params.background)?);
//! let build = build_atlas(&params, &shared)?;
//!
//! build.asset.save("example.fnt".as_ref())?;
//! shared.read(|canvas| save_bitmap(canvas, "example.bmp".as_ref()))?;
//! # Ok(()) }
//! ```

mod conv;
pub use conv::{to_u32, to_usize, DPU};

mod data;
pub use data::*;

mod charset;
pub use charset::*;

mod canvas;
pub use canvas::*;

pub mod bounds;
pub mod codec;
pub mod fonts;

pub(crate) mod raster;

mod atlas;
pub use atlas::*;

mod asset;
pub use asset::*;

mod bitmap;
pub use bitmap::*;
