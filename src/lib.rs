//! Layertuber drives a layered character image from per-frame face tracking reports.
//!
//! The flow is:
//!
//! - Load an asset manifest and its per-layer rules into a [`Rig`] ([`load_rig`] or [`assemble`])
//! - Obtain raw [`TrackingReport`]s from a [`Tracker`] and normalize them with a [`Calibration`]
//! - Render single frames with [`render_frame`] or stream reports into a [`FrameSink`]
#![forbid(unsafe_code)]
#![warn(missing_docs)]

/// Asset manifests and raster decoding.
pub mod assets;
/// Frame sinks.
pub mod encode;
/// Shared geometry, color and error types.
pub mod foundation;
/// Per-frame compositing and the streaming render pipeline.
pub mod render;
/// Rig configuration, assembly and the runtime node tree.
pub mod rig;
/// Tracking reports, trackers and calibration.
pub mod tracking;

pub use crate::foundation::core::{Affine, Canvas, Point, Rgba8Premul, Rotation, Vec2};
pub use crate::foundation::error::{LayertuberError, LayertuberResult};

pub use crate::assets::manifest::{AssetManifest, ManifestEntry, load_asset, load_rig};
pub use crate::encode::sink::{FrameSink, InMemorySink, PngSequenceSink, SinkConfig};
pub use crate::render::compositor::{FrameBuffer, render_frame};
pub use crate::render::pipeline::{
    RenderStats, RenderThreading, render_frames, render_reports, render_reports_with,
};
pub use crate::rig::assemble::{Diagnostic, Diagnostics, RigOptions, assemble};
pub use crate::rig::asset::{AssetKind, AssetNode, AssetTree};
pub use crate::rig::config::{LayerConfig, RigConfig, default_config_path};
pub use crate::rig::node::{GroupTransforms, Node, NodeKind};
pub use crate::rig::tree::Rig;
pub use crate::tracking::calibration::Calibration;
pub use crate::tracking::features::{FaceMeasurements, LandmarkSource, LandmarkTracker};
pub use crate::tracking::report::{FloatField, RotationField, TrackingReport, Vec2Field};
pub use crate::tracking::session::{ControlMessage, TrackerSession, TrackerSessionOpts};
pub use crate::tracking::tracker::{ReplayTracker, ScriptedTracker, Tracker};
pub use crate::tracking::wire::{ReportLine, decode_line, encode_line, write_line};
