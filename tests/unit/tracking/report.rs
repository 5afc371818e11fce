use super::*;

#[test]
fn field_names_round_trip_through_from_str() {
    for &f in FloatField::ALL {
        assert_eq!(f.name().parse::<FloatField>().unwrap(), f);
    }
    for &f in Vec2Field::ALL {
        assert_eq!(f.name().parse::<Vec2Field>().unwrap(), f);
    }
    for &f in RotationField::ALL {
        assert_eq!(f.name().parse::<RotationField>().unwrap(), f);
    }
}

#[test]
fn unknown_field_names_are_config_errors() {
    let err = "blink_middle".parse::<FloatField>().unwrap_err();
    assert!(matches!(err, LayertuberError::InvalidConfig(_)));
    assert!(err.to_string().contains("blink_middle"));
    // A vec2 name is not a float name.
    assert!("gaze".parse::<FloatField>().is_err());
}

#[test]
fn vocabulary_sizes_are_closed() {
    assert_eq!(FloatField::COUNT, 14);
    assert_eq!(Vec2Field::COUNT, 4);
    assert_eq!(RotationField::COUNT, 1);
}

#[test]
fn serde_uses_snake_case_keys() {
    assert_eq!(
        serde_json::to_string(&FloatField::EyebrowUpdownLeft).unwrap(),
        "\"eyebrow_updown_left\""
    );
    let f: Vec2Field = serde_json::from_str("\"face_position\"").unwrap();
    assert_eq!(f, Vec2Field::FacePosition);
}

#[test]
fn setters_only_touch_their_field() {
    let report = TrackingReport::neutral()
        .with_float(FloatField::MouthOpen, 0.7)
        .with_vec2(Vec2Field::Gaze, Vec2::new(0.1, -0.2));

    assert_eq!(report.float(FloatField::MouthOpen), 0.7);
    assert_eq!(report.float(FloatField::MouthWide), 0.0);
    assert_eq!(report.vec2(Vec2Field::Gaze), Vec2::new(0.1, -0.2));
    assert_eq!(report.vec2(Vec2Field::LeftGaze), Vec2::ZERO);
    assert_eq!(
        report.rotation(RotationField::HeadRotation),
        Rotation::identity()
    );
    assert_eq!(report.floats().count(), FloatField::COUNT);
}
