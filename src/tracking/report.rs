use std::fmt;
use std::str::FromStr;

use crate::foundation::core::{Rotation, Vec2};
use crate::foundation::error::LayertuberError;

macro_rules! report_fields {
    (
        $(#[$meta:meta])*
        $name:ident { $($variant:ident => $key:literal),+ $(,)? }
    ) => {
        $(#[$meta])*
        #[derive(
            Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash,
            serde::Serialize, serde::Deserialize,
        )]
        pub enum $name {
            $(
                #[doc = concat!("`", $key, "`")]
                #[serde(rename = $key)]
                $variant,
            )+
        }

        impl $name {
            /// Every field of this kind, in storage order.
            pub const ALL: &'static [Self] = &[$(Self::$variant),+];

            /// Number of fields of this kind.
            pub const COUNT: usize = Self::ALL.len();

            /// Serialized key name.
            pub fn name(self) -> &'static str {
                match self {
                    $(Self::$variant => $key,)+
                }
            }

            pub(crate) fn index(self) -> usize {
                self as usize
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                f.write_str(self.name())
            }
        }

        impl FromStr for $name {
            type Err = LayertuberError;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s {
                    $($key => Ok(Self::$variant),)+
                    other => Err(LayertuberError::invalid_config(format!(
                        concat!("unknown ", stringify!($name), " '{}'"),
                        other
                    ))),
                }
            }
        }
    };
}

report_fields! {
    /// Scalar report fields: blink, eyebrow and mouth measurements.
    FloatField {
        BlinkLeft => "blink_left",
        BlinkRight => "blink_right",
        Blink => "blink",
        EyebrowQuirkLeft => "eyebrow_quirk_left",
        EyebrowQuirkRight => "eyebrow_quirk_right",
        EyebrowQuirk => "eyebrow_quirk",
        EyebrowSteepnessLeft => "eyebrow_steepness_left",
        EyebrowSteepnessRight => "eyebrow_steepness_right",
        EyebrowSteepness => "eyebrow_steepness",
        EyebrowUpdownLeft => "eyebrow_updown_left",
        EyebrowUpdownRight => "eyebrow_updown_right",
        EyebrowUpdown => "eyebrow_updown",
        MouthOpen => "mouth_open",
        MouthWide => "mouth_wide",
    }
}

report_fields! {
    /// Center-relative 2D offsets in image-fraction units.
    Vec2Field {
        FacePosition => "face_position",
        LeftGaze => "left_gaze",
        RightGaze => "right_gaze",
        Gaze => "gaze",
    }
}

report_fields! {
    /// 3D orientations relative to a reference pose.
    RotationField {
        HeadRotation => "head_rotation",
    }
}

/// One frame's facial measurement snapshot.
///
/// Storage is indexed by the closed field enums, so every lookup is infallible. Whether the
/// values are raw tracker output or baseline-relative depends on where the report came from;
/// [`crate::Calibration::normalize`] is the only producer of baseline-relative reports.
#[derive(Clone, Debug, PartialEq)]
pub struct TrackingReport {
    floats: [f64; FloatField::COUNT],
    vec2s: [Vec2; Vec2Field::COUNT],
    rotations: [Rotation; RotationField::COUNT],
}

impl Default for TrackingReport {
    fn default() -> Self {
        Self::neutral()
    }
}

impl TrackingReport {
    /// Zero floats, zero offsets and identity rotations.
    pub fn neutral() -> Self {
        Self {
            floats: [0.0; FloatField::COUNT],
            vec2s: [Vec2::ZERO; Vec2Field::COUNT],
            rotations: [Rotation::identity(); RotationField::COUNT],
        }
    }

    /// Scalar value of `field`.
    pub fn float(&self, field: FloatField) -> f64 {
        self.floats[field.index()]
    }

    /// Offset value of `field`.
    pub fn vec2(&self, field: Vec2Field) -> Vec2 {
        self.vec2s[field.index()]
    }

    /// Rotation value of `field`.
    pub fn rotation(&self, field: RotationField) -> Rotation {
        self.rotations[field.index()]
    }

    /// Set a scalar value.
    pub fn set_float(&mut self, field: FloatField, value: f64) -> &mut Self {
        self.floats[field.index()] = value;
        self
    }

    /// Set an offset value.
    pub fn set_vec2(&mut self, field: Vec2Field, value: Vec2) -> &mut Self {
        self.vec2s[field.index()] = value;
        self
    }

    /// Set a rotation value.
    pub fn set_rotation(&mut self, field: RotationField, value: Rotation) -> &mut Self {
        self.rotations[field.index()] = value;
        self
    }

    /// Builder-style [`TrackingReport::set_float`].
    pub fn with_float(mut self, field: FloatField, value: f64) -> Self {
        self.set_float(field, value);
        self
    }

    /// Builder-style [`TrackingReport::set_vec2`].
    pub fn with_vec2(mut self, field: Vec2Field, value: Vec2) -> Self {
        self.set_vec2(field, value);
        self
    }

    /// Builder-style [`TrackingReport::set_rotation`].
    pub fn with_rotation(mut self, field: RotationField, value: Rotation) -> Self {
        self.set_rotation(field, value);
        self
    }

    /// Iterate `(field, value)` over every scalar.
    pub fn floats(&self) -> impl Iterator<Item = (FloatField, f64)> + '_ {
        FloatField::ALL.iter().map(|&f| (f, self.float(f)))
    }

    /// Iterate `(field, value)` over every offset.
    pub fn vec2s(&self) -> impl Iterator<Item = (Vec2Field, Vec2)> + '_ {
        Vec2Field::ALL.iter().map(|&f| (f, self.vec2(f)))
    }

    /// Iterate `(field, value)` over every rotation.
    pub fn rotations(&self) -> impl Iterator<Item = (RotationField, Rotation)> + '_ {
        RotationField::ALL.iter().map(|&f| (f, self.rotation(f)))
    }
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/report.rs"]
mod tests;
