use image::RgbaImage;

use crate::foundation::core::Canvas;

/// Raw layered asset as handed over by an asset loader: a tree of named rasters and groups.
#[derive(Clone, Debug, PartialEq)]
pub struct AssetTree {
    /// Pixel dimensions of the whole asset.
    pub size: Canvas,
    /// Top-level nodes, top-most first.
    pub roots: Vec<AssetNode>,
}

/// One node of an [`AssetTree`].
#[derive(Clone, Debug, PartialEq)]
pub struct AssetNode {
    /// Stable identifier. Loaders fill this in when the source has none.
    pub uuid: String,
    /// Display name, matched against configuration keys.
    pub name: String,
    /// Leaf raster or children.
    pub kind: AssetKind,
}

/// Payload of an [`AssetNode`].
#[derive(Clone, Debug, PartialEq)]
pub enum AssetKind {
    /// Straight-alpha raster drawn with its top-left corner at `(x, y)` on the asset canvas.
    Layer {
        /// Pixel data.
        image: RgbaImage,
        /// Horizontal placement in asset pixels.
        x: i64,
        /// Vertical placement in asset pixels.
        y: i64,
    },
    /// Children, top-most first.
    Group(Vec<AssetNode>),
}

impl AssetTree {
    /// Create an asset of `size` with the given top-level nodes.
    pub fn new(size: Canvas, roots: Vec<AssetNode>) -> Self {
        Self { size, roots }
    }

    /// Total number of nodes.
    pub fn node_count(&self) -> usize {
        fn count(nodes: &[AssetNode]) -> usize {
            nodes
                .iter()
                .map(|n| match &n.kind {
                    AssetKind::Layer { .. } => 1,
                    AssetKind::Group(children) => 1 + count(children),
                })
                .sum()
        }
        count(&self.roots)
    }
}

impl AssetNode {
    /// Leaf layer placed at the origin.
    pub fn layer(name: impl Into<String>, image: RgbaImage) -> Self {
        let name = name.into();
        Self {
            uuid: name.clone(),
            name,
            kind: AssetKind::Layer { image, x: 0, y: 0 },
        }
    }

    /// Group of children, top-most first.
    pub fn group(name: impl Into<String>, children: Vec<AssetNode>) -> Self {
        let name = name.into();
        Self {
            uuid: name.clone(),
            name,
            kind: AssetKind::Group(children),
        }
    }

    /// Move a layer to `(x, y)`. No effect on groups.
    pub fn at(mut self, x: i64, y: i64) -> Self {
        if let AssetKind::Layer { x: lx, y: ly, .. } = &mut self.kind {
            *lx = x;
            *ly = y;
        }
        self
    }

    /// Replace the identifier.
    pub fn with_uuid(mut self, uuid: impl Into<String>) -> Self {
        self.uuid = uuid.into();
        self
    }
}
