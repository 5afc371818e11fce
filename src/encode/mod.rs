//! Frame sinks.
//!
//! Sinks consume rendered frames in report order and are used by
//! [`crate::render::pipeline::render_reports`].

/// Frame sink trait and built-in sinks.
pub mod sink;
