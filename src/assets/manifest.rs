//! JSON asset manifests.
//!
//! A manifest describes a layered character image as a tree of rasters stored next to it:
//!
//! ```json
//! {
//!   "width": 800,
//!   "height": 600,
//!   "stack": [
//!     { "type": "layer", "name": "blink", "src": "blink.png", "x": 310, "y": 220 },
//!     { "type": "group", "name": "head", "children": [
//!       { "type": "layer", "name": "face", "src": "parts/face.png" }
//!     ] }
//!   ]
//! }
//! ```
//!
//! Entries are listed top-most first. `src` paths are relative to the manifest directory.

use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::assets::decode::decode_image;
use crate::foundation::core::Canvas;
use crate::foundation::error::{LayertuberError, LayertuberResult};
use crate::rig::assemble::{Diagnostics, RigOptions, assemble};
use crate::rig::asset::{AssetKind, AssetNode, AssetTree};
use crate::rig::config::{RigConfig, default_config_path};
use crate::rig::tree::Rig;

/// Parsed manifest document.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AssetManifest {
    /// Asset width in pixels.
    pub width: u32,
    /// Asset height in pixels.
    pub height: u32,
    /// Top-level entries, top-most first.
    #[serde(default)]
    pub stack: Vec<ManifestEntry>,
}

/// One manifest entry.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case", deny_unknown_fields)]
pub enum ManifestEntry {
    /// A raster layer.
    Layer {
        /// Display name.
        name: String,
        /// Image path relative to the manifest.
        src: String,
        /// Horizontal placement in asset pixels.
        #[serde(default)]
        x: i64,
        /// Vertical placement in asset pixels.
        #[serde(default)]
        y: i64,
        /// Optional stable identifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uuid: Option<String>,
    },
    /// A group of entries.
    Group {
        /// Display name.
        name: String,
        /// Optional stable identifier.
        #[serde(default, skip_serializing_if = "Option::is_none")]
        uuid: Option<String>,
        /// Children, top-most first.
        #[serde(default)]
        children: Vec<ManifestEntry>,
    },
}

impl AssetManifest {
    /// Parse a manifest from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> LayertuberResult<Self> {
        serde_json::from_reader(r)
            .map_err(|e| LayertuberError::invalid_rig(format!("parse asset manifest JSON: {e}")))
    }

    /// Parse a manifest from a JSON file on disk.
    pub fn from_path(path: impl AsRef<Path>) -> LayertuberResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LayertuberError::invalid_rig(format!("open asset manifest '{}': {e}", path.display()))
        })?;
        Self::from_reader(BufReader::new(f))
    }

    /// Decode every referenced raster relative to `root` and build the asset tree.
    pub fn load(&self, root: &Path) -> LayertuberResult<AssetTree> {
        let mut roots = Vec::with_capacity(self.stack.len());
        for (i, entry) in self.stack.iter().enumerate() {
            roots.push(load_entry(entry, root, &format!("node-{i}"))?);
        }
        Ok(AssetTree::new(Canvas::new(self.width, self.height), roots))
    }
}

fn load_entry(entry: &ManifestEntry, root: &Path, id: &str) -> LayertuberResult<AssetNode> {
    match entry {
        ManifestEntry::Layer {
            name,
            src,
            x,
            y,
            uuid,
        } => {
            let rel = normalize_rel_path(src)?;
            let path = root.join(&rel);
            let bytes = std::fs::read(&path).map_err(|e| {
                LayertuberError::invalid_rig(format!(
                    "read layer '{name}' image '{}': {e}",
                    path.display()
                ))
            })?;
            let image = decode_image(&bytes).map_err(|e| {
                LayertuberError::invalid_rig(format!("decode layer '{name}' image '{rel}': {e}"))
            })?;
            Ok(AssetNode {
                uuid: uuid.clone().unwrap_or_else(|| id.to_string()),
                name: name.clone(),
                kind: AssetKind::Layer {
                    image,
                    x: *x,
                    y: *y,
                },
            })
        }
        ManifestEntry::Group {
            name,
            uuid,
            children,
        } => {
            let mut built = Vec::with_capacity(children.len());
            for (i, child) in children.iter().enumerate() {
                built.push(load_entry(child, root, &format!("{id}-{i}"))?);
            }
            Ok(AssetNode {
                uuid: uuid.clone().unwrap_or_else(|| id.to_string()),
                name: name.clone(),
                kind: AssetKind::Group(built),
            })
        }
    }
}

/// Normalize a manifest-relative path: `/` separators, no empty or `.` segments. Absolute paths
/// and `..` are rejected.
pub fn normalize_rel_path(source: &str) -> LayertuberResult<String> {
    let s = source.replace('\\', "/");
    if s.starts_with('/') {
        return Err(LayertuberError::invalid_rig("asset paths must be relative"));
    }
    if s.is_empty() {
        return Err(LayertuberError::invalid_rig("asset path must be non-empty"));
    }

    let mut out = Vec::<&str>::new();
    for part in s.split('/') {
        if part.is_empty() || part == "." {
            continue;
        }
        if part == ".." {
            return Err(LayertuberError::invalid_rig(
                "asset paths must not contain '..'",
            ));
        }
        out.push(part);
    }

    if out.is_empty() {
        return Err(LayertuberError::invalid_rig(
            "asset path must contain a file name",
        ));
    }

    Ok(out.join("/"))
}

/// Load a manifest from disk and decode its rasters.
pub fn load_asset(manifest: impl AsRef<Path>) -> LayertuberResult<AssetTree> {
    let manifest = manifest.as_ref();
    let root = manifest.parent().unwrap_or_else(|| Path::new("."));
    AssetManifest::from_path(manifest)?.load(root)
}

/// Load a manifest and its configuration and assemble the rig.
///
/// `config` defaults to [`default_config_path`]. Any failure, including a configuration that
/// does not parse, is reported as [`LayertuberError::InvalidRig`].
#[tracing::instrument(skip_all, fields(manifest = %manifest.display()))]
pub fn load_rig(
    manifest: &Path,
    config: Option<&Path>,
    opts: &RigOptions,
) -> LayertuberResult<(Rig, Diagnostics)> {
    let config_path: PathBuf = config
        .map(Path::to_path_buf)
        .unwrap_or_else(|| default_config_path(manifest));
    let cfg = RigConfig::from_path(&config_path).map_err(|e| match e {
        LayertuberError::InvalidRig(_) => e,
        other => LayertuberError::invalid_rig(format!(
            "config '{}': {other}",
            config_path.display()
        )),
    })?;
    let asset = load_asset(manifest)?;
    assemble(&asset, &cfg, opts)
}

#[cfg(test)]
#[path = "../../tests/unit/assets/manifest.rs"]
mod tests;
