use image::RgbaImage;
use image::imageops::{self, FilterType};

use crate::foundation::core::{Affine, Canvas, Point, Rgba8Premul};
use crate::foundation::error::{LayertuberError, LayertuberResult};
use crate::foundation::math::mul_div255_u8;
use crate::render::composite::{PremulRgba8, over};

/// Owned premultiplied RGBA8 raster, tightly packed and row-major.
#[derive(Clone, PartialEq, Eq)]
pub struct Surface {
    width: u32,
    height: u32,
    data: Vec<u8>,
}

impl std::fmt::Debug for Surface {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Surface")
            .field("width", &self.width)
            .field("height", &self.height)
            .finish_non_exhaustive()
    }
}

impl Surface {
    /// Fully transparent surface.
    pub fn transparent(size: Canvas) -> Self {
        Self {
            width: size.width,
            height: size.height,
            data: vec![0; size.byte_len()],
        }
    }

    /// Surface filled with one color.
    pub fn filled(size: Canvas, color: Rgba8Premul) -> Self {
        let px = color.to_array();
        let mut data = Vec::with_capacity(size.byte_len());
        for _ in 0..(size.byte_len() / 4) {
            data.extend_from_slice(&px);
        }
        Self {
            width: size.width,
            height: size.height,
            data,
        }
    }

    /// Wrap premultiplied bytes.
    pub fn from_premul_bytes(size: Canvas, data: Vec<u8>) -> LayertuberResult<Self> {
        if data.len() != size.byte_len() {
            return Err(LayertuberError::Other(anyhow::anyhow!(
                "surface {}x{} expects {} bytes, got {}",
                size.width,
                size.height,
                size.byte_len(),
                data.len()
            )));
        }
        Ok(Self {
            width: size.width,
            height: size.height,
            data,
        })
    }

    /// Premultiply a straight-alpha image.
    pub fn from_straight_rgba(img: &RgbaImage) -> Self {
        let mut data = img.as_raw().clone();
        for px in data.chunks_exact_mut(4) {
            let a = u16::from(px[3]);
            for c in &mut px[..3] {
                *c = mul_div255_u8(u16::from(*c), a);
            }
        }
        Self {
            width: img.width(),
            height: img.height(),
            data,
        }
    }

    /// Un-premultiply into a straight-alpha image.
    pub fn to_straight_rgba(&self) -> LayertuberResult<RgbaImage> {
        let mut data = self.data.clone();
        unpremultiply_in_place(&mut data);
        RgbaImage::from_raw(self.width, self.height, data).ok_or_else(|| {
            LayertuberError::Other(anyhow::anyhow!("surface buffer does not match its size"))
        })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.width
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.height
    }

    /// Pixel dimensions.
    pub fn size(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// Raw premultiplied bytes.
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    /// Mutable raw premultiplied bytes.
    pub fn data_mut(&mut self) -> &mut [u8] {
        &mut self.data
    }

    /// Take the raw premultiplied bytes.
    pub fn into_data(self) -> Vec<u8> {
        self.data
    }

    /// Pixel at `(x, y)`; transparent outside the surface.
    pub fn pixel(&self, x: i64, y: i64) -> PremulRgba8 {
        if x < 0 || y < 0 || x >= i64::from(self.width) || y >= i64::from(self.height) {
            return [0; 4];
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        [
            self.data[i],
            self.data[i + 1],
            self.data[i + 2],
            self.data[i + 3],
        ]
    }

    /// `true` when every pixel is fully transparent.
    pub fn is_blank(&self) -> bool {
        self.data.chunks_exact(4).all(|px| px[3] == 0)
    }

    /// Resample to `target` with Catmull-Rom filtering.
    pub fn resized(&self, target: Canvas) -> LayertuberResult<Self> {
        if target == self.size() {
            return Ok(self.clone());
        }
        if target.is_empty() || self.size().is_empty() {
            return Ok(Self::transparent(target));
        }
        let src = RgbaImage::from_raw(self.width, self.height, self.data.clone()).ok_or_else(
            || LayertuberError::Other(anyhow::anyhow!("surface buffer does not match its size")),
        )?;
        let mut data =
            imageops::resize(&src, target.width, target.height, FilterType::CatmullRom).into_raw();
        // Ringing can push color above alpha, which is not a valid premultiplied pixel.
        for px in data.chunks_exact_mut(4) {
            let a = px[3];
            for c in &mut px[..3] {
                *c = (*c).min(a);
            }
        }
        Self::from_premul_bytes(target, data)
    }

    /// Source-over `src` onto `self` with its top-left corner at `(dx, dy)`, clipped.
    pub fn draw_over(&mut self, src: &Surface, dx: i64, dy: i64) {
        let (dw, dh) = (i64::from(self.width), i64::from(self.height));
        let x0 = dx.max(0);
        let y0 = dy.max(0);
        let x1 = dx.saturating_add(i64::from(src.width)).min(dw);
        let y1 = dy.saturating_add(i64::from(src.height)).min(dh);
        if x0 >= x1 || y0 >= y1 {
            return;
        }
        let run = (x1 - x0) as usize * 4;
        for y in y0..y1 {
            let d_start = (y as usize * self.width as usize + x0 as usize) * 4;
            let s_start = ((y - dy) as usize * src.width as usize + (x0 - dx) as usize) * 4;
            let d_row = &mut self.data[d_start..d_start + run];
            let s_row = &src.data[s_start..s_start + run];
            for (d, s) in d_row.chunks_exact_mut(4).zip(s_row.chunks_exact(4)) {
                let out = over([d[0], d[1], d[2], d[3]], [s[0], s[1], s[2], s[3]]);
                d.copy_from_slice(&out);
            }
        }
    }

    /// Rotate about the center by `degrees`, counter-clockwise as displayed.
    ///
    /// The output canvas grows to hold the whole rotated raster and shares the source's center.
    pub fn rotated(&self, degrees: f64) -> Self {
        if degrees == 0.0 || !degrees.is_finite() || self.size().is_empty() {
            return self.clone();
        }
        let rad = degrees.to_radians();
        let (w, h) = (f64::from(self.width), f64::from(self.height));
        let (sin, cos) = (rad.sin().abs(), rad.cos().abs());
        // Trim float noise so that e.g. 90 degrees does not grow by a pixel.
        let out_w = (w * cos + h * sin - 1e-9).ceil().max(1.0) as u32;
        let out_h = (w * sin + h * cos - 1e-9).ceil().max(1.0) as u32;

        // y points down, so a counter-clockwise turn on screen is a negative kurbo angle.
        let forward = Affine::translate((f64::from(out_w) / 2.0, f64::from(out_h) / 2.0))
            * Affine::rotate(-rad)
            * Affine::translate((-w / 2.0, -h / 2.0));
        let inverse = forward.inverse();

        let mut out = Self::transparent(Canvas::new(out_w, out_h));
        for oy in 0..out_h {
            for ox in 0..out_w {
                let p = inverse * Point::new(f64::from(ox) + 0.5, f64::from(oy) + 0.5);
                let px = self.sample_bilinear(p.x - 0.5, p.y - 0.5);
                let i = (oy as usize * out_w as usize + ox as usize) * 4;
                out.data[i..i + 4].copy_from_slice(&px);
            }
        }
        out
    }

    fn sample_bilinear(&self, x: f64, y: f64) -> PremulRgba8 {
        let (fx, fy) = (x.floor(), y.floor());
        let (tx, ty) = (x - fx, y - fy);
        let (x0, y0) = (fx as i64, fy as i64);
        let corners = [
            (self.pixel(x0, y0), (1.0 - tx) * (1.0 - ty)),
            (self.pixel(x0 + 1, y0), tx * (1.0 - ty)),
            (self.pixel(x0, y0 + 1), (1.0 - tx) * ty),
            (self.pixel(x0 + 1, y0 + 1), tx * ty),
        ];
        let mut acc = [0.0f64; 4];
        for (px, weight) in corners {
            for (a, c) in acc.iter_mut().zip(px) {
                *a += f64::from(c) * weight;
            }
        }
        acc.map(|v| v.round().clamp(0.0, 255.0) as u8)
    }
}

/// Convert premultiplied RGBA8 bytes to straight alpha in place.
pub fn unpremultiply_in_place(data: &mut [u8]) {
    for px in data.chunks_exact_mut(4) {
        let a = u16::from(px[3]);
        if a == 0 {
            px[..3].fill(0);
            continue;
        }
        for c in &mut px[..3] {
            *c = ((u16::from(*c) * 255 + a / 2) / a).min(255) as u8;
        }
    }
}

#[cfg(test)]
#[path = "../../tests/unit/render/surface.rs"]
mod tests;
