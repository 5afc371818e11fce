use crate::foundation::core::{Canvas, Vec2};
use crate::render::surface::Surface;
use crate::rig::config::LayerConfig;
use crate::tracking::report::TrackingReport;

/// How a group's own follow and rotation rules affect its children.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum GroupTransforms {
    /// Children place themselves independently; the group's transform rules are not applied.
    #[default]
    Ignore,
    /// The group's offset and rotation are applied to its composited children.
    ApplyToComposite,
}

/// Sizing constants shared by every node of a rig.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RigGeometry {
    /// Output frame size.
    pub target_size: Canvas,
    /// `min(target_size)`, the length scale for follow offsets.
    pub minimum_dimension: u32,
    /// Group transform policy.
    pub group_transforms: GroupTransforms,
}

impl RigGeometry {
    /// Geometry for a rig rendered at `target_size`.
    pub fn new(target_size: Canvas, group_transforms: GroupTransforms) -> Self {
        Self {
            target_size,
            minimum_dimension: target_size.min_dimension(),
            group_transforms,
        }
    }
}

/// Node payload: a leaf raster or an ordered list of children.
#[derive(Clone, Debug, PartialEq)]
pub enum NodeKind {
    /// Leaf layer with its raster pre-scaled to the rig's target size.
    Layer(Surface),
    /// Children, top-most first.
    Group(Vec<Node>),
}

/// One renderable node of an assembled rig.
#[derive(Clone, Debug, PartialEq)]
pub struct Node {
    /// Stable identifier from the asset.
    pub uuid: String,
    /// Display name; the configuration key.
    pub name: String,
    /// Behavior rules.
    pub config: LayerConfig,
    /// Payload.
    pub kind: NodeKind,
}

impl Node {
    /// `true` for leaf layers.
    pub fn is_layer(&self) -> bool {
        matches!(self.kind, NodeKind::Layer(_))
    }

    /// Children of a group; empty for layers.
    pub fn children(&self) -> &[Node] {
        match &self.kind {
            NodeKind::Layer(_) => &[],
            NodeKind::Group(children) => children,
        }
    }

    /// Dynamic visibility for this frame.
    pub fn is_currently_visible(&self, report: &TrackingReport) -> bool {
        self.config.is_visible(report)
    }

    /// Follow offset in pixels.
    pub fn compute_offset(&self, geometry: &RigGeometry, report: &TrackingReport) -> Vec2 {
        self.config.offset_fraction(report) * f64::from(geometry.minimum_dimension)
    }

    /// In-plane rotation in degrees.
    pub fn compute_rotation_degrees(&self, report: &TrackingReport) -> f64 {
        self.config.rotation_degrees(report)
    }

    /// Render onto a fresh transparent canvas of the rig's target size, or `None` when hidden.
    pub fn render(&self, geometry: &RigGeometry, report: &TrackingReport) -> Option<Surface> {
        if !self.is_currently_visible(report) {
            return None;
        }
        match &self.kind {
            NodeKind::Layer(raster) => Some(place(
                raster,
                geometry.target_size,
                self.compute_offset(geometry, report),
                self.compute_rotation_degrees(report),
            )),
            NodeKind::Group(children) => {
                let mut canvas = Surface::transparent(geometry.target_size);
                // First child ends up on top.
                for child in children.iter().rev() {
                    if let Some(img) = child.render(geometry, report) {
                        canvas.draw_over(&img, 0, 0);
                    }
                }
                match geometry.group_transforms {
                    GroupTransforms::Ignore => Some(canvas),
                    GroupTransforms::ApplyToComposite => Some(place(
                        &canvas,
                        geometry.target_size,
                        self.compute_offset(geometry, report),
                        self.compute_rotation_degrees(report),
                    )),
                }
            }
        }
    }

    /// Depth-first visit of this node and its descendants.
    pub fn walk<'a>(&'a self, visit: &mut impl FnMut(&'a Node, usize)) {
        self.walk_at(0, visit);
    }

    fn walk_at<'a>(&'a self, depth: usize, visit: &mut impl FnMut(&'a Node, usize)) {
        visit(self, depth);
        for child in self.children() {
            child.walk_at(depth + 1, visit);
        }
    }
}

/// Rotate `raster` about its own center and draw it, shifted by `offset`, onto a transparent
/// canvas of `target` size.
fn place(raster: &Surface, target: Canvas, offset: Vec2, degrees: f64) -> Surface {
    let rounded = (offset.x.round() as i64, offset.y.round() as i64);
    if degrees == 0.0 && rounded == (0, 0) && raster.size() == target {
        return raster.clone();
    }
    let rotated = raster.rotated(degrees);
    // Keep the rotated raster centered where the original was.
    let dx = offset.x + (f64::from(raster.width()) - f64::from(rotated.width())) / 2.0;
    let dy = offset.y + (f64::from(raster.height()) - f64::from(rotated.height())) / 2.0;
    let mut canvas = Surface::transparent(target);
    canvas.draw_over(&rotated, dx.round() as i64, dy.round() as i64);
    canvas
}

#[cfg(test)]
#[path = "../../tests/unit/rig/node.rs"]
mod tests;
