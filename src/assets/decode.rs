use anyhow::Context;
use image::RgbaImage;

use crate::foundation::error::LayertuberResult;

/// Decode an encoded raster (PNG and the other formats enabled on `image`) to straight RGBA8.
pub fn decode_image(bytes: &[u8]) -> LayertuberResult<RgbaImage> {
    let dyn_img = image::load_from_memory(bytes).context("decode image from memory")?;
    Ok(dyn_img.to_rgba8())
}

#[cfg(test)]
#[path = "../../tests/unit/assets/decode.rs"]
mod tests;
