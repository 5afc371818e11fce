use image::RgbaImage;

use crate::foundation::core::Canvas;
use crate::foundation::error::{LayertuberError, LayertuberResult};
use crate::render::surface::{Surface, unpremultiply_in_place};
use crate::rig::tree::Rig;
use crate::tracking::report::TrackingReport;

/// A rendered frame as RGBA8 pixels.
///
/// Frames are premultiplied alpha; the flag makes that explicit at API boundaries.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct FrameBuffer {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
    /// RGBA8 bytes, tightly packed, row-major.
    pub data: Vec<u8>,
    /// Whether `data` is premultiplied alpha.
    pub premultiplied: bool,
}

impl FrameBuffer {
    /// Pixel dimensions.
    pub fn size(&self) -> Canvas {
        Canvas::new(self.width, self.height)
    }

    /// Pixel at `(x, y)`.
    pub fn pixel(&self, x: u32, y: u32) -> Option<[u8; 4]> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let i = (y as usize * self.width as usize + x as usize) * 4;
        self.data.get(i..i + 4).map(|p| [p[0], p[1], p[2], p[3]])
    }

    /// Straight-alpha copy for encoders and viewers.
    pub fn to_rgba_image(&self) -> LayertuberResult<RgbaImage> {
        let mut data = self.data.clone();
        if self.premultiplied {
            unpremultiply_in_place(&mut data);
        }
        RgbaImage::from_raw(self.width, self.height, data).ok_or_else(|| {
            LayertuberError::Other(anyhow::anyhow!(
                "frame buffer length does not match {}x{}",
                self.width,
                self.height
            ))
        })
    }
}

impl From<Surface> for FrameBuffer {
    fn from(s: Surface) -> Self {
        Self {
            width: s.width(),
            height: s.height(),
            data: s.into_data(),
            premultiplied: true,
        }
    }
}

/// Composite one frame: the background, then every visible top-level node, last-declared first.
///
/// Deterministic for a given rig and report.
pub fn render_frame(rig: &Rig, report: &TrackingReport) -> FrameBuffer {
    let geometry = rig.geometry();
    let mut canvas = Surface::filled(geometry.target_size, rig.background());
    for node in rig.layers().iter().rev() {
        if let Some(img) = node.render(geometry, report) {
            canvas.draw_over(&img, 0, 0);
        } else {
            tracing::trace!(layer = %node.name, "hidden this frame");
        }
    }
    canvas.into()
}

#[cfg(test)]
#[path = "../../tests/unit/render/compositor.rs"]
mod tests;
