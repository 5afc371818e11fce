use nalgebra::Vector3;

use super::*;
use crate::foundation::core::{Rgba8Premul, Rotation};
use crate::rig::config::{FollowFloatRule, FollowRotationRule, ThresholdRule};
use crate::tracking::report::{FloatField, RotationField};

const SIZE: Canvas = Canvas::new(8, 4);

fn geometry(policy: GroupTransforms) -> RigGeometry {
    RigGeometry::new(SIZE, policy)
}

fn dot(x: u32, y: u32, color: [u8; 4]) -> Surface {
    let mut s = Surface::transparent(SIZE);
    let i = ((y * SIZE.width + x) * 4) as usize;
    s.data_mut()[i..i + 4].copy_from_slice(&color);
    s
}

fn layer(name: &str, raster: Surface, config: LayerConfig) -> Node {
    Node {
        uuid: format!("uuid-{name}"),
        name: name.to_string(),
        config,
        kind: NodeKind::Layer(raster),
    }
}

fn slide_x(scale: f64) -> LayerConfig {
    LayerConfig {
        follow_x: Some(FollowFloatRule {
            option: FloatField::MouthWide,
            scale,
        }),
        ..LayerConfig::default()
    }
}

const RED: [u8; 4] = [255, 0, 0, 255];
const BLUE: [u8; 4] = [0, 0, 255, 255];

#[test]
fn geometry_uses_the_short_side() {
    assert_eq!(geometry(GroupTransforms::Ignore).minimum_dimension, 4);
}

#[test]
fn hidden_layer_renders_nothing() {
    let node = layer(
        "blink",
        dot(0, 0, RED),
        LayerConfig {
            visible_when: Some(ThresholdRule {
                option: FloatField::BlinkLeft,
                greater_than: 0.8,
            }),
            ..LayerConfig::default()
        },
    );
    let g = geometry(GroupTransforms::Ignore);
    let open = TrackingReport::neutral().with_float(FloatField::BlinkLeft, 0.2);
    let closed = TrackingReport::neutral().with_float(FloatField::BlinkLeft, 0.9);
    assert!(node.render(&g, &open).is_none());
    assert_eq!(node.render(&g, &closed).unwrap().pixel(0, 0), RED);
}

#[test]
fn offset_is_scaled_by_minimum_dimension() {
    // 0.5 * 4 px = 2 px to the right.
    let node = layer("a", dot(1, 1, RED), slide_x(1.0));
    let g = geometry(GroupTransforms::Ignore);
    let report = TrackingReport::neutral().with_float(FloatField::MouthWide, 0.5);
    assert_eq!(node.compute_offset(&g, &report), Vec2::new(2.0, 0.0));

    let out = node.render(&g, &report).unwrap();
    assert_eq!(out.size(), SIZE);
    assert_eq!(out.pixel(3, 1), RED);
    assert_eq!(out.pixel(1, 1), [0; 4]);
}

#[test]
fn group_paints_first_child_on_top() {
    let group = Node {
        uuid: "g".into(),
        name: "face".into(),
        config: LayerConfig::default(),
        kind: NodeKind::Group(vec![
            layer("top", dot(2, 2, RED), LayerConfig::default()),
            layer("bottom", dot(2, 2, BLUE), LayerConfig::default()),
        ]),
    };
    let out = group
        .render(&geometry(GroupTransforms::Ignore), &TrackingReport::neutral())
        .unwrap();
    assert_eq!(out.pixel(2, 2), RED);
}

#[test]
fn group_transform_policy() {
    let group = Node {
        uuid: "g".into(),
        name: "face".into(),
        config: slide_x(1.0),
        kind: NodeKind::Group(vec![layer("eye", dot(0, 0, RED), LayerConfig::default())]),
    };
    let report = TrackingReport::neutral().with_float(FloatField::MouthWide, 0.25);

    let ignored = group
        .render(&geometry(GroupTransforms::Ignore), &report)
        .unwrap();
    assert_eq!(ignored.pixel(0, 0), RED);

    let applied = group
        .render(&geometry(GroupTransforms::ApplyToComposite), &report)
        .unwrap();
    assert_eq!(applied.pixel(0, 0), [0; 4]);
    assert_eq!(applied.pixel(1, 0), RED);
}

#[test]
fn hidden_group_hides_children() {
    let group = Node {
        uuid: "g".into(),
        name: "mouth".into(),
        config: LayerConfig {
            invisible_when: Some(ThresholdRule {
                option: FloatField::MouthOpen,
                greater_than: 0.0,
            }),
            ..LayerConfig::default()
        },
        kind: NodeKind::Group(vec![layer("lips", dot(0, 0, RED), LayerConfig::default())]),
    };
    let report = TrackingReport::neutral().with_float(FloatField::MouthOpen, 0.5);
    assert!(group
        .render(&geometry(GroupTransforms::Ignore), &report)
        .is_none());
}

#[test]
fn rotation_keeps_the_layer_centered() {
    let full = Surface::filled(SIZE, Rgba8Premul::from_straight_rgba(0, 0, 255, 255));
    let node = layer(
        "head",
        full,
        LayerConfig {
            rotate_with: Some(FollowRotationRule {
                option: RotationField::HeadRotation,
                scale: 1.0,
            }),
            ..LayerConfig::default()
        },
    );
    let roll = Rotation::from_axis_angle(&Vector3::z_axis(), 90f64.to_radians());
    let report = TrackingReport::neutral().with_rotation(RotationField::HeadRotation, roll);
    let g = geometry(GroupTransforms::Ignore);
    assert!((node.compute_rotation_degrees(&report) - 90.0).abs() < 1e-9);

    // An 8x4 block turned upright becomes 4x8 centered on the 8x4 canvas: columns 2..6.
    let out = node.render(&g, &report).unwrap();
    assert_eq!(out.size(), SIZE);
    for y in 0..4 {
        assert_eq!(out.pixel(1, y)[3], 0);
        assert_eq!(out.pixel(2, y)[3], 255);
        assert_eq!(out.pixel(5, y)[3], 255);
        assert_eq!(out.pixel(6, y)[3], 0);
    }
}

#[test]
fn walk_visits_depth_first() {
    let group = Node {
        uuid: "g".into(),
        name: "g".into(),
        config: LayerConfig::default(),
        kind: NodeKind::Group(vec![
            layer("a", dot(0, 0, RED), LayerConfig::default()),
            layer("b", dot(0, 0, RED), LayerConfig::default()),
        ]),
    };
    let mut seen = Vec::new();
    group.walk(&mut |n, depth| seen.push((n.name.clone(), depth)));
    assert_eq!(
        seen,
        vec![("g".into(), 0), ("a".into(), 1), ("b".into(), 1)]
    );
    assert!(!group.is_layer());
    assert!(group.children()[0].is_layer());
}
