use std::path::{Path, PathBuf};

use anyhow::Context as _;

use crate::foundation::error::{LayertuberError, LayertuberResult};
use crate::render::compositor::FrameBuffer;

/// Configuration provided to a [`FrameSink`] before the first frame.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SinkConfig {
    /// Frame width in pixels.
    pub width: u32,
    /// Frame height in pixels.
    pub height: u32,
}

/// Presentation seam: receives rendered frames.
///
/// Ordering contract: `push_frame` is called with strictly increasing report indices. Indices
/// of reports without a face are skipped.
pub trait FrameSink: Send {
    /// Called once before any frames are pushed.
    fn begin(&mut self, cfg: SinkConfig) -> LayertuberResult<()>;
    /// Push one frame, tagged with the index of the report it was rendered from.
    fn push_frame(&mut self, idx: u64, frame: &FrameBuffer) -> LayertuberResult<()>;
    /// Called once after the last frame is pushed.
    fn end(&mut self) -> LayertuberResult<()>;
}

/// In-memory sink for tests and debugging.
#[derive(Debug, Default)]
pub struct InMemorySink {
    cfg: Option<SinkConfig>,
    frames: Vec<(u64, FrameBuffer)>,
    finished: bool,
}

impl InMemorySink {
    /// Create a new in-memory sink.
    pub fn new() -> Self {
        Self::default()
    }

    /// The configuration captured in `begin`, if any.
    pub fn config(&self) -> Option<SinkConfig> {
        self.cfg
    }

    /// Captured frames in push order.
    pub fn frames(&self) -> &[(u64, FrameBuffer)] {
        &self.frames
    }

    /// `true` once `end` was called.
    pub fn is_finished(&self) -> bool {
        self.finished
    }
}

impl FrameSink for InMemorySink {
    fn begin(&mut self, cfg: SinkConfig) -> LayertuberResult<()> {
        self.cfg = Some(cfg);
        self.frames.clear();
        self.finished = false;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameBuffer) -> LayertuberResult<()> {
        self.frames.push((idx, frame.clone()));
        Ok(())
    }

    fn end(&mut self) -> LayertuberResult<()> {
        self.finished = true;
        Ok(())
    }
}

/// Writes each frame as `frame_<index>.png` (six-digit, zero-padded) into a directory.
#[derive(Debug)]
pub struct PngSequenceSink {
    dir: PathBuf,
    cfg: Option<SinkConfig>,
    written: u64,
}

impl PngSequenceSink {
    /// Write into `dir`, creating it on `begin` if needed.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self {
            dir: dir.into(),
            cfg: None,
            written: 0,
        }
    }

    /// Output directory.
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Number of files written so far.
    pub fn written(&self) -> u64 {
        self.written
    }

    /// File name used for report index `idx`.
    pub fn file_name(idx: u64) -> String {
        format!("frame_{idx:06}.png")
    }
}

impl FrameSink for PngSequenceSink {
    fn begin(&mut self, cfg: SinkConfig) -> LayertuberResult<()> {
        if cfg.width == 0 || cfg.height == 0 {
            return Err(LayertuberError::invalid_rig(
                "png sink width/height must be non-zero",
            ));
        }
        std::fs::create_dir_all(&self.dir)
            .with_context(|| format!("create output dir '{}'", self.dir.display()))?;
        self.cfg = Some(cfg);
        self.written = 0;
        Ok(())
    }

    fn push_frame(&mut self, idx: u64, frame: &FrameBuffer) -> LayertuberResult<()> {
        let cfg = self
            .cfg
            .ok_or_else(|| LayertuberError::Other(anyhow::anyhow!("png sink used before begin")))?;
        if frame.width != cfg.width || frame.height != cfg.height {
            return Err(LayertuberError::Other(anyhow::anyhow!(
                "frame {idx} is {}x{}, sink expects {}x{}",
                frame.width,
                frame.height,
                cfg.width,
                cfg.height
            )));
        }
        let path = self.dir.join(Self::file_name(idx));
        frame
            .to_rgba_image()?
            .save_with_format(&path, image::ImageFormat::Png)
            .with_context(|| format!("write '{}'", path.display()))?;
        self.written += 1;
        Ok(())
    }

    fn end(&mut self) -> LayertuberResult<()> {
        tracing::debug!(dir = %self.dir.display(), frames = self.written, "png sequence written");
        Ok(())
    }
}

#[cfg(test)]
#[path = "../../tests/unit/encode/sink.rs"]
mod tests;
