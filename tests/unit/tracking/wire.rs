use approx::assert_relative_eq;
use nalgebra::Vector3;

use super::*;
use crate::foundation::core::Rotation;

fn sample_report() -> TrackingReport {
    TrackingReport::neutral()
        .with_float(FloatField::BlinkLeft, 0.9)
        .with_float(FloatField::MouthOpen, 0.25)
        .with_vec2(Vec2Field::FacePosition, Vec2::new(-0.1, 0.05))
        .with_rotation(
            RotationField::HeadRotation,
            Rotation::from_axis_angle(&Vector3::z_axis(), 0.3),
        )
}

#[test]
fn absent_report_is_a_null_line() {
    assert_eq!(encode_line(None), "null");
    assert_eq!(decode_line("null").unwrap(), ReportLine::Report(None));
}

#[test]
fn line_is_a_flat_object_with_array_shapes() {
    let line = encode_line(Some(&sample_report()));
    let v: Value = serde_json::from_str(&line).unwrap();
    let obj = v.as_object().unwrap();
    assert_eq!(
        obj.len(),
        FloatField::COUNT + Vec2Field::COUNT + RotationField::COUNT
    );
    assert_eq!(obj["blink_left"].as_f64(), Some(0.9));
    assert_eq!(obj["face_position"].as_array().unwrap().len(), 2);
    assert_eq!(obj["head_rotation"].as_array().unwrap().len(), 4);
}

#[test]
fn decoded_line_matches_encoded_report() {
    let original = sample_report();
    let ReportLine::Report(Some(decoded)) =
        decode_line(&encode_line(Some(&original))).unwrap()
    else {
        panic!("expected a report");
    };
    assert_eq!(decoded.float(FloatField::BlinkLeft), 0.9);
    assert_eq!(
        decoded.vec2(Vec2Field::FacePosition),
        Vec2::new(-0.1, 0.05)
    );
    let angle = decoded
        .rotation(RotationField::HeadRotation)
        .angle_to(&original.rotation(RotationField::HeadRotation));
    assert_relative_eq!(angle, 0.0, epsilon = 1e-6);
}

#[test]
fn missing_key_is_missing_report_field() {
    let mut v = report_to_value(&sample_report());
    v.as_object_mut().unwrap().remove("mouth_wide");
    let err = report_from_value(&v).unwrap_err();
    assert!(matches!(err, LayertuberError::MissingReportField(ref k) if k == "mouth_wide"));
}

#[test]
fn extra_keys_are_ignored_and_bad_shapes_rejected() {
    let mut v = report_to_value(&sample_report());
    v.as_object_mut()
        .unwrap()
        .insert("tongue_out".to_string(), Value::from(1.0));
    assert!(report_from_value(&v).unwrap().is_some());

    v.as_object_mut()
        .unwrap()
        .insert("gaze".to_string(), Value::from(vec![1.0]));
    assert!(matches!(
        report_from_value(&v).unwrap_err(),
        LayertuberError::Serde(_)
    ));
}

#[test]
fn calibrate_control_line_and_garbage() {
    assert_eq!(decode_line("\"calibrate\"").unwrap(), ReportLine::Calibrate);
    assert!(decode_line("").is_err());
    assert!(decode_line("{not json").is_err());
    assert!(decode_line("42").is_err());
}

#[test]
fn write_line_appends_newline() {
    let mut out = Vec::new();
    write_line(&mut out, None).unwrap();
    write_line(&mut out, Some(&TrackingReport::neutral())).unwrap();
    let text = String::from_utf8(out).unwrap();
    let lines: Vec<&str> = text.lines().collect();
    assert_eq!(lines.len(), 2);
    assert_eq!(lines[0], "null");
}
