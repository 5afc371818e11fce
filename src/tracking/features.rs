//! Turning landmark-model output into raw tracking reports.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::foundation::core::{Canvas, Vec2, flip, px_to_center_offset_2d};
use crate::foundation::error::LayertuberResult;
use crate::foundation::math::{average, rotation_from_xyzw};
use crate::tracking::report::{FloatField, RotationField, TrackingReport, Vec2Field};
use crate::tracking::tracker::Tracker;

/// Named facial features read from [`FaceMeasurements::features`]. Missing entries count as `0`.
pub mod feature_keys {
    /// Left eyebrow quirk.
    pub const EYEBROW_QUIRK_LEFT: &str = "eyebrow_quirk_l";
    /// Right eyebrow quirk.
    pub const EYEBROW_QUIRK_RIGHT: &str = "eyebrow_quirk_r";
    /// Left eyebrow steepness.
    pub const EYEBROW_STEEPNESS_LEFT: &str = "eyebrow_steepness_l";
    /// Right eyebrow steepness.
    pub const EYEBROW_STEEPNESS_RIGHT: &str = "eyebrow_steepness_r";
    /// Left eyebrow height.
    pub const EYEBROW_UPDOWN_LEFT: &str = "eyebrow_updown_l";
    /// Right eyebrow height.
    pub const EYEBROW_UPDOWN_RIGHT: &str = "eyebrow_updown_r";
    /// Mouth opening.
    pub const MOUTH_OPEN: &str = "mouth_open";
    /// Mouth width.
    pub const MOUTH_WIDE: &str = "mouth_wide";
}

/// One detected face, as reported by the landmark model.
///
/// Pixel coordinates follow the model's row-major `(y, x)` convention.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct FaceMeasurements {
    /// Size of the captured frame the coordinates refer to.
    pub frame_size: Canvas,
    /// Per-eye openness `(left, right)`; absent means both eyes fully open.
    #[serde(default)]
    pub eye_blink: Option<[f64; 2]>,
    /// Per-eye pupil position `[(y, x) left, (y, x) right]` in pixels.
    pub eye_gaze_px: [[f64; 2]; 2],
    /// Face center `(y, x)` in pixels.
    pub face_coord_px: [f64; 2],
    /// Head orientation as a scalar-last quaternion `[x, y, z, w]`.
    pub quaternion: [f64; 4],
    /// Named feature scalars (see [`feature_keys`]).
    #[serde(default)]
    pub features: BTreeMap<String, f64>,
}

impl FaceMeasurements {
    fn feature(&self, key: &str) -> f64 {
        self.features.get(key).copied().unwrap_or(0.0)
    }

    fn px_offset(&self, yx: [f64; 2]) -> Vec2 {
        let size = Vec2::new(
            f64::from(self.frame_size.width),
            f64::from(self.frame_size.height),
        );
        px_to_center_offset_2d(flip(yx[0], yx[1]), size)
    }

    /// Build the raw (not yet baseline-relative) report.
    pub fn to_raw_report(&self) -> LayertuberResult<TrackingReport> {
        use feature_keys::*;

        let [blink_left, blink_right] = self.eye_blink.unwrap_or([1.0, 1.0]);
        let left_gaze = self.px_offset(self.eye_gaze_px[0]);
        let right_gaze = self.px_offset(self.eye_gaze_px[1]);

        let mut report = TrackingReport::neutral();
        report
            .set_float(FloatField::BlinkLeft, blink_left)
            .set_float(FloatField::BlinkRight, blink_right)
            .set_float(FloatField::Blink, (blink_left + blink_right) / 2.0);

        let pairs = [
            (
                FloatField::EyebrowQuirkLeft,
                FloatField::EyebrowQuirkRight,
                FloatField::EyebrowQuirk,
                EYEBROW_QUIRK_LEFT,
                EYEBROW_QUIRK_RIGHT,
            ),
            (
                FloatField::EyebrowSteepnessLeft,
                FloatField::EyebrowSteepnessRight,
                FloatField::EyebrowSteepness,
                EYEBROW_STEEPNESS_LEFT,
                EYEBROW_STEEPNESS_RIGHT,
            ),
            (
                FloatField::EyebrowUpdownLeft,
                FloatField::EyebrowUpdownRight,
                FloatField::EyebrowUpdown,
                EYEBROW_UPDOWN_LEFT,
                EYEBROW_UPDOWN_RIGHT,
            ),
        ];
        for (left, right, both, left_key, right_key) in pairs {
            let (l, r) = (self.feature(left_key), self.feature(right_key));
            report
                .set_float(left, l)
                .set_float(right, r)
                .set_float(both, (l + r) / 2.0);
        }
        report
            .set_float(FloatField::MouthOpen, self.feature(MOUTH_OPEN))
            .set_float(FloatField::MouthWide, self.feature(MOUTH_WIDE));

        report
            .set_vec2(Vec2Field::FacePosition, self.px_offset(self.face_coord_px))
            .set_vec2(Vec2Field::LeftGaze, left_gaze)
            .set_vec2(Vec2Field::RightGaze, right_gaze)
            .set_vec2(Vec2Field::Gaze, average([left_gaze, right_gaze])?);

        report.set_rotation(
            RotationField::HeadRotation,
            rotation_from_xyzw(self.quaternion)?,
        );
        Ok(report)
    }
}

/// Per-frame access to a landmark model.
pub trait LandmarkSource {
    /// The single detected face for the next captured frame, or `None` when no face was found.
    fn next_face(&mut self) -> LayertuberResult<Option<FaceMeasurements>>;
}

/// Adapts a [`LandmarkSource`] into a [`Tracker`] producing raw reports.
#[derive(Debug)]
pub struct LandmarkTracker<S> {
    source: S,
}

impl<S: LandmarkSource> LandmarkTracker<S> {
    /// Wrap a landmark source.
    pub fn new(source: S) -> Self {
        Self { source }
    }

    /// Unwrap the landmark source.
    pub fn into_inner(self) -> S {
        self.source
    }
}

impl<S: LandmarkSource> Tracker for LandmarkTracker<S> {
    fn next_report(&mut self) -> LayertuberResult<Option<TrackingReport>> {
        self.source
            .next_face()?
            .map(|face| face.to_raw_report())
            .transpose()
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/features.rs"]
mod tests;
