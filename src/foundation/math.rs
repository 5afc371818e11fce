use nalgebra::{Quaternion, Vector3};

use crate::foundation::core::{Rotation, Vec2};
use crate::foundation::error::{LayertuberError, LayertuberResult};

/// Forward unit vector out of the image plane, toward the viewer.
pub const FACING_POINT: [f64; 3] = [0.0, 0.0, 1.0];

/// Componentwise sum. An empty input sums to `(0, 0)`.
pub fn add<I>(vecs: I) -> Vec2
where
    I: IntoIterator<Item = Vec2>,
{
    vecs.into_iter().fold(Vec2::ZERO, |acc, v| acc + v)
}

/// `a - b`.
pub fn subtract(a: Vec2, b: Vec2) -> Vec2 {
    a - b
}

/// Componentwise mean; fails on empty input.
pub fn average<I>(vecs: I) -> LayertuberResult<Vec2>
where
    I: IntoIterator<Item = Vec2>,
{
    let mut n = 0usize;
    let sum = add(vecs.into_iter().inspect(|_| n += 1));
    if n == 0 {
        return Err(LayertuberError::divide_by_zero(
            "average of an empty set of vectors",
        ));
    }
    Ok(sum / n as f64)
}

/// Express `r` relative to `baseline`: `r * baseline⁻¹`.
pub fn relative(r: Rotation, baseline: Rotation) -> Rotation {
    r * baseline.inverse()
}

/// Rotate a point, returning the rotated 3-vector.
pub fn apply_rotation(r: &Rotation, point: [f64; 3]) -> [f64; 3] {
    let v = r.transform_vector(&Vector3::new(point[0], point[1], point[2]));
    [v.x, v.y, v.z]
}

/// Z component of the rotation vector (axis * angle), in degrees.
///
/// A pure roll about the viewing axis yields exactly the roll angle.
pub fn in_plane_degrees(r: &Rotation) -> f64 {
    r.scaled_axis().z.to_degrees()
}

/// Build a rotation from a scalar-last quaternion `[x, y, z, w]`, normalizing it.
pub fn rotation_from_xyzw(q: [f64; 4]) -> LayertuberResult<Rotation> {
    if q.iter().any(|c| !c.is_finite()) {
        return Err(LayertuberError::serde("quaternion components must be finite"));
    }
    let raw = Quaternion::new(q[3], q[0], q[1], q[2]);
    if raw.norm() <= f64::EPSILON {
        return Err(LayertuberError::serde("quaternion must be non-zero"));
    }
    Ok(Rotation::from_quaternion(raw))
}

/// Scalar-last `[x, y, z, w]` components of a rotation.
pub fn rotation_to_xyzw(r: &Rotation) -> [f64; 4] {
    let c = r.quaternion().coords;
    [c.x, c.y, c.z, c.w]
}

pub(crate) fn mul_div255_u16(x: u16, y: u16) -> u16 {
    (((u32::from(x) * u32::from(y)) + 127) / 255) as u16
}

pub(crate) fn mul_div255_u8(x: u16, y: u16) -> u8 {
    mul_div255_u16(x, y) as u8
}

#[cfg(test)]
#[path = "../../tests/unit/foundation/math.rs"]
mod tests;
