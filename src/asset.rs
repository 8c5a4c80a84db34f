// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! The font asset model
//!
//! A [`FontAsset`] is the in-memory record of one atlas build: the font
//! name, the caller-supplied image resource id linking to the saved atlas
//! bitmap, the uniform row height and the per-character glyph rectangles.
//! It is produced together with the canvas by one build invocation and
//! superseded in full by the next; it is persisted only on explicit save.
//!
//! On disk the asset is framed by a magic word and a format version and
//! always encoded in the codec's network-safe variant, so files move
//! between hosts of differing byte order.

use crate::codec::{Codec, Order};
use crate::conv::to_i32;
use crate::PixelRect;
use std::collections::BTreeMap;
use std::io::{self, Read, Write};
use std::path::Path;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// File identification word
pub const MAGIC: u32 = 0x4246_4E54; // "BFNT"
/// Current file format version
pub const VERSION: i32 = 1;

/// Font asset file loading errors
#[derive(Error, Debug)]
pub enum LoadError {
    #[error("not a font asset file")]
    BadMagic,
    #[error("unsupported font asset version {0}")]
    BadVersion(i32),
    #[error(transparent)]
    Io(#[from] io::Error),
}

/// Malformed image resource identifier
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("malformed resource id '{0}'")]
pub struct InvalidResourceId(pub String);

/// Parse a caller-supplied numeric resource id string
///
/// The id is embedded verbatim in the asset; resolving it to a bitmap path
/// is the consuming runtime's concern.
pub fn parse_resource_id(s: &str) -> Result<u32, InvalidResourceId> {
    s.trim()
        .parse()
        .map_err(|_| InvalidResourceId(s.to_string()))
}

/// The in-memory description of a packed font atlas
#[derive(Clone, Debug, Default, PartialEq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct FontAsset {
    /// Resolved family name of the rasterized typeface
    pub name: String,
    /// Caller-supplied linkage key a runtime uses to locate the atlas bitmap
    pub image_resource_id: u32,
    /// Maximum glyph height across the set; the packing row height
    pub char_height: i32,
    /// Placed glyph rectangles in atlas pixel coordinates, keyed by character
    pub glyphs: BTreeMap<char, PixelRect>,
}

impl FontAsset {
    /// Look up a character's placed rectangle
    pub fn glyph(&self, c: char) -> Option<PixelRect> {
        self.glyphs.get(&c).copied()
    }

    /// Serialize or deserialize through `codec`, depending on its mode
    ///
    /// All fields are visited in a fixed order: name, image resource id,
    /// char height, then the glyph mapping as a count followed by repeated
    /// (character, rect) records.
    pub fn transcode(&mut self, codec: &mut Codec) -> io::Result<()> {
        codec.string(&mut self.name)?;
        codec.u32(&mut self.image_resource_id)?;
        codec.i32(&mut self.char_height)?;

        let mut count = to_i32(self.glyphs.len());
        codec.i32(&mut count)?;
        if codec.is_reading() {
            if count < 0 {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidData,
                    "negative glyph count",
                ));
            }
            self.glyphs.clear();
            for _ in 0..count {
                let mut c = '\0';
                let mut rect = PixelRect::default();
                codec.chr(&mut c)?;
                transcode_rect(codec, &mut rect)?;
                self.glyphs.insert(c, rect);
            }
        } else {
            for (&c, rect) in self.glyphs.iter_mut() {
                let mut c = c;
                codec.chr(&mut c)?;
                transcode_rect(codec, rect)?;
            }
        }
        Ok(())
    }

    /// Write the framed asset file to a byte sink
    pub fn save_to(&self, sink: &mut dyn Write) -> io::Result<()> {
        let mut codec = Codec::writer(sink, Order::Network);
        let mut magic = MAGIC;
        codec.u32(&mut magic)?;
        let mut version = VERSION;
        codec.i32(&mut version)?;
        self.clone().transcode(&mut codec)
    }

    /// Read a framed asset file from a byte cursor
    pub fn load_from(source: &mut dyn Read) -> Result<FontAsset, LoadError> {
        let mut codec = Codec::reader(source, Order::Network);
        let mut magic = 0;
        codec.u32(&mut magic)?;
        if magic != MAGIC {
            return Err(LoadError::BadMagic);
        }
        let mut version = 0;
        codec.i32(&mut version)?;
        if version != VERSION {
            return Err(LoadError::BadVersion(version));
        }

        let mut asset = FontAsset::default();
        asset.transcode(&mut codec)?;
        Ok(asset)
    }

    /// Save to a file
    ///
    /// Synchronous and single-shot: an error is reported to the caller, not
    /// retried, and may leave no file or a truncated one behind.
    pub fn save(&self, path: &Path) -> io::Result<()> {
        let mut file = io::BufWriter::new(std::fs::File::create(path)?);
        self.save_to(&mut file)?;
        file.flush()
    }

    /// Load from a file
    pub fn load(path: &Path) -> Result<FontAsset, LoadError> {
        let mut file = io::BufReader::new(std::fs::File::open(path)?);
        FontAsset::load_from(&mut file)
    }
}

fn transcode_rect(codec: &mut Codec, rect: &mut PixelRect) -> io::Result<()> {
    codec.i32(&mut rect.x)?;
    codec.i32(&mut rect.y)?;
    codec.i32(&mut rect.width)?;
    codec.i32(&mut rect.height)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn resource_ids() {
        assert_eq!(parse_resource_id("1001"), Ok(1001));
        assert_eq!(parse_resource_id(" 42 "), Ok(42));
        assert!(parse_resource_id("").is_err());
        assert!(parse_resource_id("-3").is_err());
        assert!(parse_resource_id("12ab").is_err());
    }
}
