use std::str::FromStr;

use crate::foundation::error::{LayertuberError, LayertuberResult};

pub use kurbo::{Affine, Point, Vec2};

/// Head and feature orientation relative to a reference pose.
pub type Rotation = nalgebra::UnitQuaternion<f64>;

/// Pixel dimensions of an asset, a layer raster or the output frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
pub struct Canvas {
    /// Width in pixels.
    pub width: u32,
    /// Height in pixels.
    pub height: u32,
}

impl Canvas {
    /// Create a canvas size.
    pub const fn new(width: u32, height: u32) -> Self {
        Self { width, height }
    }

    /// Length of the shorter side, the common length scale for follow offsets.
    pub fn min_dimension(self) -> u32 {
        self.width.min(self.height)
    }

    /// Number of RGBA8 bytes needed for a tightly packed buffer of this size.
    pub fn byte_len(self) -> usize {
        (self.width as usize)
            .saturating_mul(self.height as usize)
            .saturating_mul(4)
    }

    /// Return `true` when either side is zero.
    pub fn is_empty(self) -> bool {
        self.width == 0 || self.height == 0
    }

    /// Scale `self` (the source) down to fit inside `max`, keeping the aspect ratio.
    ///
    /// Never scales up and never exceeds either bound; the floor may underrun by a pixel.
    pub fn fit_within(self, max: Canvas) -> Canvas {
        fit_within_bounds(max, self)
    }
}

/// Scale `source` down to fit inside `max`, preserving aspect ratio.
///
/// A source that already fits is returned unchanged. Otherwise the constraining axis is scaled to
/// exactly its bound and the other axis is floored.
pub fn fit_within_bounds(max: Canvas, source: Canvas) -> Canvas {
    if source.width <= max.width && source.height <= max.height {
        return source;
    }
    if source.is_empty() || max.is_empty() {
        return Canvas::new(
            source.width.min(max.width),
            source.height.min(max.height),
        );
    }

    let (sw, sh) = (u64::from(source.width), u64::from(source.height));
    let (mw, mh) = (u64::from(max.width), u64::from(max.height));

    // Aspect comparison `sw/sh > mw/mh` cross-multiplied to stay in integers.
    if sw * mh > mw * sh {
        Canvas {
            width: max.width,
            height: (sh * mw / sw) as u32,
        }
    } else {
        Canvas {
            width: (sw * mh / sh) as u32,
            height: max.height,
        }
    }
}

/// Convert a pixel coordinate into a center-relative image fraction (`0` = center, `0.5` = edge).
pub fn px_to_center_offset(px: f64, canvas: f64) -> f64 {
    (px / canvas) - 0.5
}

/// Two-dimensional [`px_to_center_offset`].
pub fn px_to_center_offset_2d(px: Vec2, canvas: Vec2) -> Vec2 {
    Vec2::new(
        px_to_center_offset(px.x, canvas.x),
        px_to_center_offset(px.y, canvas.y),
    )
}

/// Swap a `(y, x)` pair into `(x, y)` order.
pub fn flip(y: f64, x: f64) -> Vec2 {
    Vec2::new(x, y)
}

/// Premultiplied RGBA8 (r,g,b already multiplied by a).
#[derive(Clone, Copy, Debug, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
pub struct Rgba8Premul {
    /// Red channel premultiplied by alpha.
    pub r: u8,
    /// Green channel premultiplied by alpha.
    pub g: u8,
    /// Blue channel premultiplied by alpha.
    pub b: u8,
    /// Alpha channel.
    pub a: u8,
}

impl Rgba8Premul {
    /// Fully transparent black.
    pub fn transparent() -> Self {
        Self {
            r: 0,
            g: 0,
            b: 0,
            a: 0,
        }
    }

    /// Opaque chroma-key green, the default frame background.
    pub fn chroma_green() -> Self {
        Self {
            r: 0,
            g: 255,
            b: 0,
            a: 255,
        }
    }

    /// Convert straight-alpha RGBA8 into premultiplied RGBA8.
    pub fn from_straight_rgba(r: u8, g: u8, b: u8, a: u8) -> Self {
        fn premul(c: u8, a: u8) -> u8 {
            let c = u16::from(c);
            let a = u16::from(a);
            (((c * a) + 127) / 255) as u8
        }

        Self {
            r: premul(r, a),
            g: premul(g, a),
            b: premul(b, a),
            a,
        }
    }

    /// Channels as a `[r, g, b, a]` array.
    pub fn to_array(self) -> [u8; 4] {
        [self.r, self.g, self.b, self.a]
    }
}

impl FromStr for Rgba8Premul {
    type Err = LayertuberError;

    /// Parse `#rrggbb` or `#rrggbbaa` (straight alpha).
    fn from_str(s: &str) -> LayertuberResult<Self> {
        let hex = s.trim().trim_start_matches('#');
        if !hex.is_ascii() || (hex.len() != 6 && hex.len() != 8) {
            return Err(LayertuberError::invalid_config(format!(
                "color '{s}' must be #rrggbb or #rrggbbaa"
            )));
        }
        let channel = |i: usize| {
            u8::from_str_radix(&hex[i..i + 2], 16).map_err(|e| {
                LayertuberError::invalid_config(format!("color '{s}' is not hex: {e}"))
            })
        };
        let a = if hex.len() == 8 { channel(6)? } else { 255 };
        Ok(Self::from_straight_rgba(channel(0)?, channel(2)?, channel(4)?, a))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/core.rs"]
mod tests;
