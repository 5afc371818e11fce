use std::collections::BTreeMap;
use std::fs::File;
use std::io::BufReader;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::foundation::core::Vec2;
use crate::foundation::error::{LayertuberError, LayertuberResult};
use crate::foundation::math::{FACING_POINT, apply_rotation, in_plane_degrees};
use crate::tracking::report::{FloatField, RotationField, TrackingReport, Vec2Field};

/// File name suffix of the configuration stored next to an asset manifest.
pub const CONFIG_SUFFIX: &str = ".layertuber.yaml";

/// Where the configuration for `asset` lives by default: `<asset file name>.layertuber.yaml` in
/// the same directory.
pub fn default_config_path(asset: &Path) -> PathBuf {
    let name = asset
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    asset.with_file_name(format!("{name}{CONFIG_SUFFIX}"))
}

/// A per-frame rule evaluated against a normalized report.
pub trait Rule<T> {
    /// Evaluate the rule for one frame.
    fn apply(&self, report: &TrackingReport) -> T;
}

fn default_scale() -> f64 {
    1.0
}

/// `report.floats[option] > greater_than`.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ThresholdRule {
    /// Scalar field to test.
    pub option: FloatField,
    /// Strict lower bound.
    pub greater_than: f64,
}

impl Rule<bool> for ThresholdRule {
    fn apply(&self, report: &TrackingReport) -> bool {
        report.float(self.option) > self.greater_than
    }
}

/// Planar follow of a 2D report offset. Yields image-fraction units.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FollowVec2Rule {
    /// Offset field to follow.
    pub option: Vec2Field,
    /// Multiplier applied to the offset.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Rule<Vec2> for FollowVec2Rule {
    fn apply(&self, report: &TrackingReport) -> Vec2 {
        report.vec2(self.option) * self.scale
    }
}

/// Single-axis follow of a scalar report field.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FollowFloatRule {
    /// Scalar field to follow.
    pub option: FloatField,
    /// Multiplier applied to the value.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl Rule<f64> for FollowFloatRule {
    fn apply(&self, report: &TrackingReport) -> f64 {
        report.float(self.option) * self.scale
    }
}

/// Binding to a report rotation. Used both for the facing-point projection and for in-plane
/// rotation.
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct FollowRotationRule {
    /// Rotation field to follow.
    pub option: RotationField,
    /// Multiplier applied to the derived offset or angle.
    #[serde(default = "default_scale")]
    pub scale: f64,
}

impl FollowRotationRule {
    /// The forward vector rotated by the report rotation, projected onto the image plane and
    /// scaled. Image-fraction units.
    pub fn facing_point(&self, report: &TrackingReport) -> Vec2 {
        let [x, y, _] = apply_rotation(&report.rotation(self.option), FACING_POINT);
        Vec2::new(x, y) * self.scale
    }

    /// In-plane rotation in degrees, scaled.
    pub fn degrees(&self, report: &TrackingReport) -> f64 {
        in_plane_degrees(&report.rotation(self.option)) * self.scale
    }
}

/// Behavior of one asset node, keyed by the node's display name in [`RigConfig::layers`].
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct LayerConfig {
    /// Static visibility; `false` prunes the node (and its subtree) at assembly.
    #[serde(default = "default_visible")]
    pub visible: bool,
    /// Show the node only while the threshold holds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub visible_when: Option<ThresholdRule>,
    /// Hide the node while the threshold holds. Wins over `visible_when`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub invisible_when: Option<ThresholdRule>,
    /// Move with a 2D report offset.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow: Option<FollowVec2Rule>,
    /// Move horizontally with a scalar field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_x: Option<FollowFloatRule>,
    /// Move vertically with a scalar field.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_y: Option<FollowFloatRule>,
    /// Move toward where the rotated forward vector points.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub follow_facing_point: Option<FollowRotationRule>,
    /// Rotate in the image plane with a report rotation.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub rotate_with: Option<FollowRotationRule>,
}

fn default_visible() -> bool {
    true
}

impl Default for LayerConfig {
    fn default() -> Self {
        Self {
            visible: true,
            visible_when: None,
            invisible_when: None,
            follow: None,
            follow_x: None,
            follow_y: None,
            follow_facing_point: None,
            rotate_with: None,
        }
    }
}

impl LayerConfig {
    /// Effective per-frame visibility: `visible_when` (if any) must hold and `invisible_when`
    /// (if any) must not.
    pub fn is_visible(&self, report: &TrackingReport) -> bool {
        let shown = self.visible_when.is_none_or(|rule| rule.apply(report));
        let hidden = self.invisible_when.is_some_and(|rule| rule.apply(report));
        shown && !hidden
    }

    /// Summed follow contributions in image-fraction units; multiply by the rig's minimum
    /// dimension to get pixels.
    pub fn offset_fraction(&self, report: &TrackingReport) -> Vec2 {
        let mut offset = Vec2::ZERO;
        if let Some(rule) = &self.follow {
            offset += rule.apply(report);
        }
        if let Some(rule) = &self.follow_x {
            offset.x += rule.apply(report);
        }
        if let Some(rule) = &self.follow_y {
            offset.y += rule.apply(report);
        }
        if let Some(rule) = &self.follow_facing_point {
            offset += rule.facing_point(report);
        }
        offset
    }

    /// In-plane rotation in degrees; `0` without `rotate_with`.
    pub fn rotation_degrees(&self, report: &TrackingReport) -> f64 {
        self.rotate_with.map_or(0.0, |rule| rule.degrees(report))
    }

    /// `true` when any rule depends on the per-frame report.
    pub fn is_dynamic(&self) -> bool {
        self.visible_when.is_some()
            || self.invisible_when.is_some()
            || self.follow.is_some()
            || self.follow_x.is_some()
            || self.follow_y.is_some()
            || self.follow_facing_point.is_some()
            || self.rotate_with.is_some()
    }

    fn validate(&self, name: &str) -> LayertuberResult<()> {
        let finite = |what: &str, v: f64| {
            if v.is_finite() {
                Ok(())
            } else {
                Err(LayertuberError::invalid_config(format!(
                    "layer '{name}': {what} must be finite"
                )))
            }
        };
        for rule in [&self.visible_when, &self.invisible_when].into_iter().flatten() {
            finite("greater_than", rule.greater_than)?;
        }
        if let Some(rule) = &self.follow {
            finite("follow.scale", rule.scale)?;
        }
        for rule in [&self.follow_x, &self.follow_y].into_iter().flatten() {
            finite("follow_x/follow_y scale", rule.scale)?;
        }
        for rule in [&self.follow_facing_point, &self.rotate_with]
            .into_iter()
            .flatten()
        {
            finite("rotation scale", rule.scale)?;
        }
        Ok(())
    }
}

/// Parsed rig configuration: layer display name to behavior.
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RigConfig {
    /// Per-layer behavior, keyed by asset node display name.
    #[serde(default)]
    pub layers: BTreeMap<String, LayerConfig>,
}

impl RigConfig {
    /// Parse from a JSON string. Unknown field names and unknown keys are rejected.
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(s: &str) -> LayertuberResult<Self> {
        let cfg: Self = serde_json::from_str(s)
            .map_err(|e| LayertuberError::invalid_config(format!("parse rig config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse from a JSON reader.
    pub fn from_reader<R: std::io::Read>(r: R) -> LayertuberResult<Self> {
        let cfg: Self = serde_json::from_reader(r)
            .map_err(|e| LayertuberError::invalid_config(format!("parse rig config JSON: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse from an already-decoded document (any serde front end can produce one).
    pub fn from_value(value: serde_json::Value) -> LayertuberResult<Self> {
        let cfg: Self = serde_json::from_value(value)
            .map_err(|e| LayertuberError::invalid_config(format!("decode rig config: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse from a YAML string.
    pub fn from_yaml_str(s: &str) -> LayertuberResult<Self> {
        let cfg: Self = serde_yaml::from_str(s)
            .map_err(|e| LayertuberError::invalid_config(format!("parse rig config YAML: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Parse from a YAML reader.
    pub fn from_yaml_reader<R: std::io::Read>(r: R) -> LayertuberResult<Self> {
        let cfg: Self = serde_yaml::from_reader(r)
            .map_err(|e| LayertuberError::invalid_config(format!("parse rig config YAML: {e}")))?;
        cfg.validate()?;
        Ok(cfg)
    }

    /// Serialize as YAML.
    pub fn to_yaml_string(&self) -> LayertuberResult<String> {
        serde_yaml::to_string(self)
            .map_err(|e| LayertuberError::serde(format!("write rig config YAML: {e}")))
    }

    /// Load a file, YAML for `.yaml`/`.yml` and JSON otherwise. A missing or unreadable file is an
    /// [`LayertuberError::InvalidRig`].
    pub fn from_path(path: impl AsRef<Path>) -> LayertuberResult<Self> {
        let path = path.as_ref();
        let f = File::open(path).map_err(|e| {
            LayertuberError::invalid_rig(format!("open rig config '{}': {e}", path.display()))
        })?;
        let yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));
        if yaml {
            Self::from_yaml_reader(BufReader::new(f))
        } else {
            Self::from_reader(BufReader::new(f))
        }
    }

    /// Check numeric fields.
    pub fn validate(&self) -> LayertuberResult<()> {
        for (name, layer) in &self.layers {
            layer.validate(name)?;
        }
        Ok(())
    }

    /// Behavior for `name`, if configured.
    pub fn layer(&self, name: &str) -> Option<&LayerConfig> {
        self.layers.get(name)
    }
}

#[cfg(test)]
#[path = "../../tests/unit/rig/config.rs"]
mod tests;
