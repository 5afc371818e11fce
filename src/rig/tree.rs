use crate::foundation::core::{Canvas, Rgba8Premul};
use crate::rig::node::{GroupTransforms, Node, RigGeometry};

/// An assembled rig: the node tree plus the sizing it was built for.
///
/// Immutable once built and safe to share across render threads.
#[derive(Clone, Debug)]
pub struct Rig {
    layers: Vec<Node>,
    geometry: RigGeometry,
    background: Rgba8Premul,
}

impl Rig {
    pub(crate) fn new(layers: Vec<Node>, geometry: RigGeometry, background: Rgba8Premul) -> Self {
        Self {
            layers,
            geometry,
            background,
        }
    }

    /// Top-level nodes, top-most first.
    pub fn layers(&self) -> &[Node] {
        &self.layers
    }

    /// Output frame size.
    pub fn target_size(&self) -> Canvas {
        self.geometry.target_size
    }

    /// `min(target_size)`.
    pub fn minimum_dimension(&self) -> u32 {
        self.geometry.minimum_dimension
    }

    /// Shared sizing constants.
    pub fn geometry(&self) -> &RigGeometry {
        &self.geometry
    }

    /// Group transform policy the rig was assembled with.
    pub fn group_transforms(&self) -> GroupTransforms {
        self.geometry.group_transforms
    }

    /// Opaque color behind all layers.
    pub fn background(&self) -> Rgba8Premul {
        self.background
    }

    /// First node with display name `name`, searching depth-first.
    pub fn find(&self, name: &str) -> Option<&Node> {
        fn search<'a>(nodes: &'a [Node], name: &str) -> Option<&'a Node> {
            nodes.iter().find_map(|n| {
                if n.name == name {
                    Some(n)
                } else {
                    search(n.children(), name)
                }
            })
        }
        search(&self.layers, name)
    }

    /// Total number of nodes in the tree.
    pub fn node_count(&self) -> usize {
        let mut n = 0;
        for root in &self.layers {
            root.walk(&mut |_, _| n += 1);
        }
        n
    }

    /// Human-readable outline, one node per line, indented by depth.
    pub fn outline(&self) -> String {
        let mut out = String::new();
        for root in &self.layers {
            root.walk(&mut |node, depth| {
                let kind = if node.is_layer() { "layer" } else { "group" };
                let dynamic = if node.config.is_dynamic() { " *" } else { "" };
                out.push_str(&format!(
                    "{:indent$}{kind} {}{dynamic}\n",
                    "",
                    node.name,
                    indent = depth * 2
                ));
            });
        }
        out
    }
}
