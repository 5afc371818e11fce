//! JSON Lines report stream.
//!
//! Each line is one flat JSON object mapping field names to values: floats as numbers, offsets
//! as `[x, y]` and rotations as scalar-last quaternions `[x, y, z, w]`. A frame without a face is
//! always written as a literal `null` line. Replay input may also carry the JSON string
//! `"calibrate"` as a control line.

use std::io::Write;

use anyhow::Context as _;
use serde_json::{Map, Value};

use crate::foundation::core::Vec2;
use crate::foundation::error::{LayertuberError, LayertuberResult};
use crate::foundation::math::{rotation_from_xyzw, rotation_to_xyzw};
use crate::tracking::report::{FloatField, RotationField, TrackingReport, Vec2Field};

/// Control keyword accepted on replay input.
pub const CALIBRATE_LINE: &str = "calibrate";

/// One decoded line of a report stream.
#[derive(Clone, Debug, PartialEq)]
pub enum ReportLine {
    /// A report, or `None` when no face was found that frame.
    Report(Option<TrackingReport>),
    /// Request to recapture the neutral baseline.
    Calibrate,
}

/// Flatten a report into a single JSON object.
pub fn report_to_value(report: &TrackingReport) -> Value {
    let mut map = Map::new();
    for (field, v) in report.floats() {
        map.insert(field.name().to_string(), Value::from(v));
    }
    for (field, v) in report.vec2s() {
        map.insert(field.name().to_string(), Value::from(vec![v.x, v.y]));
    }
    for (field, r) in report.rotations() {
        map.insert(
            field.name().to_string(),
            Value::from(rotation_to_xyzw(&r).to_vec()),
        );
    }
    Value::Object(map)
}

/// Rebuild a report from a flattened JSON object. `null` decodes to `None`.
///
/// Every vocabulary key must be present; unknown keys are ignored.
pub fn report_from_value(value: &Value) -> LayertuberResult<Option<TrackingReport>> {
    let map = match value {
        Value::Null => return Ok(None),
        Value::Object(map) => map,
        other => {
            return Err(LayertuberError::serde(format!(
                "report must be an object or null, got {other}"
            )));
        }
    };

    let mut report = TrackingReport::neutral();
    for &field in FloatField::ALL {
        let v = lookup(map, field.name())?;
        let x = v.as_f64().ok_or_else(|| {
            LayertuberError::serde(format!("field '{field}' must be a number"))
        })?;
        report.set_float(field, x);
    }
    for &field in Vec2Field::ALL {
        let [x, y] = numbers::<2>(lookup(map, field.name())?, field.name())?;
        report.set_vec2(field, Vec2::new(x, y));
    }
    for &field in RotationField::ALL {
        let q = numbers::<4>(lookup(map, field.name())?, field.name())?;
        let r = rotation_from_xyzw(q)
            .map_err(|e| LayertuberError::serde(format!("field '{field}': {e}")))?;
        report.set_rotation(field, r);
    }
    Ok(Some(report))
}

/// Encode one line (without the trailing newline).
pub fn encode_line(report: Option<&TrackingReport>) -> String {
    match report {
        Some(r) => report_to_value(r).to_string(),
        None => Value::Null.to_string(),
    }
}

/// Decode one line. Blank lines are rejected so that frame indices stay aligned with lines.
pub fn decode_line(line: &str) -> LayertuberResult<ReportLine> {
    let trimmed = line.trim();
    if trimmed.is_empty() {
        return Err(LayertuberError::serde("empty report line"));
    }
    let value: Value = serde_json::from_str(trimmed)
        .map_err(|e| LayertuberError::serde(format!("parse report line: {e}")))?;
    if value.as_str() == Some(CALIBRATE_LINE) {
        return Ok(ReportLine::Calibrate);
    }
    report_from_value(&value).map(ReportLine::Report)
}

/// Write one report line followed by `\n`.
pub fn write_line<W: Write + ?Sized>(
    w: &mut W,
    report: Option<&TrackingReport>,
) -> LayertuberResult<()> {
    writeln!(w, "{}", encode_line(report)).context("write report line")?;
    Ok(())
}

fn lookup<'a>(map: &'a Map<String, Value>, key: &str) -> LayertuberResult<&'a Value> {
    map.get(key)
        .ok_or_else(|| LayertuberError::missing_report_field(key))
}

fn numbers<const N: usize>(v: &Value, key: &str) -> LayertuberResult<[f64; N]> {
    let shape_err = || {
        LayertuberError::serde(format!("field '{key}' must be an array of {} numbers", N))
    };
    let arr = v.as_array().ok_or_else(shape_err)?;
    if arr.len() != N {
        return Err(shape_err());
    }
    let mut out = [0.0; N];
    for (slot, item) in out.iter_mut().zip(arr) {
        *slot = item.as_f64().ok_or_else(shape_err)?;
    }
    Ok(out)
}

#[cfg(test)]
#[path = "../../tests/unit/tracking/wire.rs"]
mod tests;
