//! Rasters and frame composition.

/// Premultiplied pixel blending.
pub mod composite;
/// Per-frame rig compositing.
pub mod compositor;
/// Batch and streaming drivers.
pub mod pipeline;
/// Owned premultiplied rasters and their transforms.
pub mod surface;
