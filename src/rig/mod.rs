//! Rig model: configuration, asset input, the renderable node tree and its assembly.

/// Building a rig from an asset tree and configuration.
pub mod assemble;
/// Raw layered asset input.
pub mod asset;
/// Per-layer behavior rules.
pub mod config;
/// Renderable nodes.
pub mod node;
/// The assembled rig.
pub mod tree;
