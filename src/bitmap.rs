// Licensed under the Apache License, Version 2.0 (the "License");
// you may not use this file except in compliance with the License.
// You may obtain a copy of the License in the LICENSE-APACHE file or at:
//     https://www.apache.org/licenses/LICENSE-2.0

//! Atlas bitmap output

use crate::Canvas;
use std::path::Path;
use thiserror::Error;

/// Bitmap save errors
#[derive(Error, Debug)]
pub enum BitmapError {
    #[error("canvas does not form a valid image")]
    BadBuffer,
    #[error("bitmap encoding error: {0}")]
    Image(#[from] image::ImageError),
}

/// Save the finished canvas as an uncompressed BMP image
///
/// The saved bitmap is the runtime-consumable counterpart of the font asset
/// file; the asset's `image_resource_id` is the caller's linkage key to it.
pub fn save_bitmap(canvas: &Canvas, path: &Path) -> Result<(), BitmapError> {
    let img = image::RgbImage::from_raw(canvas.width(), canvas.height(), canvas.to_rgb_bytes())
        .ok_or(BitmapError::BadBuffer)?;
    img.save_with_format(path, image::ImageFormat::Bmp)?;
    Ok(())
}
