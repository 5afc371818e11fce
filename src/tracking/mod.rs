//! Per-frame tracking data and the plumbing that produces it.
//!
//! A [`tracker::Tracker`] yields raw reports, [`calibration::Calibration`] makes them relative to
//! a captured neutral pose, and [`session::TrackerSession`] runs both on their own thread.

/// Neutral-baseline capture and report normalization.
pub mod calibration;
/// Landmark-model output to raw report conversion.
pub mod features;
/// The per-frame report and its closed field vocabulary.
pub mod report;
/// Threaded tracker driver with a control channel.
pub mod session;
/// The tracker seam and replay implementations.
pub mod tracker;
/// JSON Lines encoding of reports.
pub mod wire;
