//! Loading layered assets from disk.

/// Raster decoding.
pub mod decode;
/// JSON asset manifests and rig loading.
pub mod manifest;
