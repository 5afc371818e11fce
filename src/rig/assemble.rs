use std::collections::{BTreeMap, BTreeSet};

use crate::foundation::core::{Canvas, Rgba8Premul, fit_within_bounds};
use crate::foundation::error::{LayertuberError, LayertuberResult};
use crate::render::surface::Surface;
use crate::rig::asset::{AssetKind, AssetNode, AssetTree};
use crate::rig::config::{LayerConfig, RigConfig};
use crate::rig::node::{GroupTransforms, Node, NodeKind, RigGeometry};
use crate::rig::tree::Rig;

/// Options for [`assemble`].
#[derive(Clone, Debug)]
pub struct RigOptions {
    /// Output bounds; the asset is scaled down to fit, never up.
    pub max_size: Canvas,
    /// Opaque frame background.
    pub background: Rgba8Premul,
    /// Whether group transform rules move their children.
    pub group_transforms: GroupTransforms,
}

impl Default for RigOptions {
    fn default() -> Self {
        Self {
            max_size: Canvas::new(1024, 1024),
            background: Rgba8Premul::chroma_green(),
            group_transforms: GroupTransforms::default(),
        }
    }
}

/// Non-fatal findings from [`assemble`].
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Diagnostic {
    /// Configured layer names that match no asset node, sorted.
    UnusedConfig {
        /// The unmatched names.
        names: Vec<String>,
    },
    /// Asset node without a configuration entry; it renders with defaults.
    Unconfigured {
        /// Node display name.
        name: String,
    },
    /// Several asset nodes share one display name and therefore one configuration entry.
    DuplicateName {
        /// The shared name.
        name: String,
    },
}

impl std::fmt::Display for Diagnostic {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnusedConfig { names } => {
                write!(f, "configured layers not found in asset: {}", names.join(", "))
            }
            Self::Unconfigured { name } => write!(f, "layer '{name}' has no configuration"),
            Self::DuplicateName { name } => {
                write!(f, "layer name '{name}' is used by more than one node")
            }
        }
    }
}

/// Diagnostics collected during assembly, in discovery order.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct Diagnostics(Vec<Diagnostic>);

impl Diagnostics {
    /// `true` when nothing was reported.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Number of findings.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Iterate findings.
    pub fn iter(&self) -> std::slice::Iter<'_, Diagnostic> {
        self.0.iter()
    }

    /// Names listed by [`Diagnostic::UnusedConfig`], if any.
    pub fn unused_config(&self) -> &[String] {
        self.0
            .iter()
            .find_map(|d| match d {
                Diagnostic::UnusedConfig { names } => Some(names.as_slice()),
                _ => None,
            })
            .unwrap_or(&[])
    }

    fn push(&mut self, d: Diagnostic) {
        self.0.push(d);
    }
}

impl<'a> IntoIterator for &'a Diagnostics {
    type Item = &'a Diagnostic;
    type IntoIter = std::slice::Iter<'a, Diagnostic>;

    fn into_iter(self) -> Self::IntoIter {
        self.0.iter()
    }
}

struct Walk<'a> {
    config: &'a RigConfig,
    source_size: Canvas,
    target_size: Canvas,
    used: BTreeSet<&'a str>,
    seen: BTreeMap<&'a str, usize>,
    diagnostics: Diagnostics,
}

impl<'a> Walk<'a> {
    /// Build `node` when `attach` is set; otherwise only record bookkeeping for its subtree.
    fn visit(&mut self, node: &'a AssetNode, attach: bool) -> LayertuberResult<Option<Node>> {
        let name = node.name.as_str();
        let count = self.seen.entry(name).or_insert(0);
        *count += 1;
        if *count == 2 {
            self.diagnostics.push(Diagnostic::DuplicateName {
                name: name.to_string(),
            });
        }

        let config = match self.config.layer(name) {
            Some(c) => {
                self.used.insert(name);
                c.clone()
            }
            None => {
                // Nodes under a pruned parent never render.
                if attach {
                    self.diagnostics.push(Diagnostic::Unconfigured {
                        name: name.to_string(),
                    });
                }
                LayerConfig::default()
            }
        };

        let attach = attach && config.visible;
        if !config.visible {
            tracing::debug!(layer = name, "pruned by static visibility");
        }

        let kind = match &node.kind {
            AssetKind::Layer { image, x, y } => {
                if !attach {
                    return Ok(None);
                }
                let mut placed = Surface::transparent(self.source_size);
                placed.draw_over(&Surface::from_straight_rgba(image), *x, *y);
                NodeKind::Layer(placed.resized(self.target_size)?)
            }
            AssetKind::Group(children) => {
                let mut built = Vec::with_capacity(children.len());
                for child in children {
                    if let Some(n) = self.visit(child, attach)? {
                        built.push(n);
                    }
                }
                if !attach {
                    return Ok(None);
                }
                NodeKind::Group(built)
            }
        };

        Ok(Some(Node {
            uuid: node.uuid.clone(),
            name: node.name.clone(),
            config,
            kind,
        }))
    }
}

/// Build a [`Rig`] from an asset tree and its configuration.
///
/// Nodes configured `visible: false` are dropped together with their subtrees. Every layer
/// raster is scaled once to the target size. Configuration that cannot be validated is an
/// [`LayertuberError::InvalidRig`].
#[tracing::instrument(skip_all, fields(nodes = asset.node_count(), configured = config.layers.len()))]
pub fn assemble(
    asset: &AssetTree,
    config: &RigConfig,
    opts: &RigOptions,
) -> LayertuberResult<(Rig, Diagnostics)> {
    config
        .validate()
        .map_err(|e| LayertuberError::invalid_rig(format!("configuration rejected: {e}")))?;
    if asset.size.is_empty() {
        return Err(LayertuberError::invalid_rig("asset has zero width or height"));
    }
    let target_size = fit_within_bounds(opts.max_size, asset.size);
    if target_size.is_empty() {
        return Err(LayertuberError::invalid_rig(format!(
            "asset {}x{} does not fit a {}x{} frame",
            asset.size.width, asset.size.height, opts.max_size.width, opts.max_size.height
        )));
    }

    let mut walk = Walk {
        config,
        source_size: asset.size,
        target_size,
        used: BTreeSet::new(),
        seen: BTreeMap::new(),
        diagnostics: Diagnostics::default(),
    };
    let mut layers = Vec::with_capacity(asset.roots.len());
    for root in &asset.roots {
        if let Some(n) = walk.visit(root, true)? {
            layers.push(n);
        }
    }

    let unused: Vec<String> = config
        .layers
        .keys()
        .filter(|k| !walk.used.contains(k.as_str()))
        .cloned()
        .collect();
    let mut diagnostics = walk.diagnostics;
    if !unused.is_empty() {
        diagnostics.push(Diagnostic::UnusedConfig { names: unused });
    }

    let geometry = RigGeometry::new(target_size, opts.group_transforms);
    tracing::debug!(
        width = target_size.width,
        height = target_size.height,
        top_level = layers.len(),
        diagnostics = diagnostics.len(),
        "rig assembled"
    );
    Ok((Rig::new(layers, geometry, opts.background), diagnostics))
}

#[cfg(test)]
#[path = "../../tests/unit/rig/assemble.rs"]
mod tests;
