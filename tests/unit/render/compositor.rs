use image::{Rgba, RgbaImage};

use super::*;
use crate::foundation::core::Rgba8Premul;
use crate::rig::assemble::{RigOptions, assemble};
use crate::rig::asset::{AssetNode, AssetTree};
use crate::rig::config::RigConfig;
use crate::tracking::report::FloatField;

fn solid(rgba: [u8; 4]) -> RgbaImage {
    RgbaImage::from_pixel(4, 4, Rgba(rgba))
}

fn rig(nodes: Vec<AssetNode>, config: &str) -> Rig {
    let asset = AssetTree::new(Canvas::new(4, 4), nodes);
    assemble(
        &asset,
        &RigConfig::from_str(config).unwrap(),
        &RigOptions::default(),
    )
    .unwrap()
    .0
}

#[test]
fn empty_rig_is_background() {
    let rig = rig(Vec::new(), "{}");
    let frame = render_frame(&rig, &TrackingReport::neutral());
    assert!(frame.premultiplied);
    assert_eq!(frame.size(), Canvas::new(4, 4));
    assert_eq!(frame.pixel(3, 3), Some(Rgba8Premul::chroma_green().to_array()));
    assert_eq!(frame.pixel(4, 0), None);
}

#[test]
fn first_declared_node_is_on_top() {
    let rig = rig(
        vec![
            AssetNode::layer("a", solid([255, 0, 0, 255])),
            AssetNode::layer("b", solid([0, 0, 255, 255])),
            AssetNode::layer("c", solid([255, 255, 255, 255])),
        ],
        "{}",
    );
    let frame = render_frame(&rig, &TrackingReport::neutral());
    assert_eq!(frame.pixel(0, 0), Some([255, 0, 0, 255]));
}

#[test]
fn hidden_top_layer_reveals_the_one_below() {
    let rig = rig(
        vec![
            AssetNode::layer("mouth_open", solid([255, 0, 0, 255])),
            AssetNode::layer("mouth_closed", solid([0, 0, 255, 255])),
        ],
        r#"{"layers": {"mouth_open": {"visible_when": {"option": "mouth_open", "greater_than": 0.3}}}}"#,
    );
    let open = TrackingReport::neutral().with_float(FloatField::MouthOpen, 0.6);
    let closed = TrackingReport::neutral();
    assert_eq!(render_frame(&rig, &open).pixel(1, 1), Some([255, 0, 0, 255]));
    assert_eq!(render_frame(&rig, &closed).pixel(1, 1), Some([0, 0, 255, 255]));
}

#[test]
fn rendering_is_deterministic() {
    let rig = rig(
        vec![AssetNode::layer("a", solid([10, 200, 30, 128]))],
        r#"{"layers": {"a": {"follow_x": {"option": "mouth_wide", "scale": 0.3}}}}"#,
    );
    let report = TrackingReport::neutral().with_float(FloatField::MouthWide, 0.7);
    assert_eq!(render_frame(&rig, &report), render_frame(&rig, &report));
}

#[test]
fn straight_alpha_export_matches_opaque_frame() {
    let rig = rig(vec![AssetNode::layer("a", solid([10, 20, 30, 255]))], "{}");
    let frame = render_frame(&rig, &TrackingReport::neutral());
    let img = frame.to_rgba_image().unwrap();
    assert_eq!(img.get_pixel(2, 2).0, [10, 20, 30, 255]);
}

#[test]
fn huge_follow_values_move_the_layer_off_canvas() {
    let rig = rig(
        vec![AssetNode::layer("a", solid([255, 0, 0, 255]))],
        r#"{"layers": {"a": {"follow_x": {"option": "mouth_wide"}, "follow_y": {"option": "mouth_open"}}}}"#,
    );
    for (wide, open) in [(1e300, 0.0), (-1e300, 0.0), (0.0, 1e300), (f64::MAX, -f64::MAX)] {
        let report = TrackingReport::neutral()
            .with_float(FloatField::MouthWide, wide)
            .with_float(FloatField::MouthOpen, open);
        let frame = render_frame(&rig, &report);
        assert_eq!(frame.pixel(1, 1), Some(Rgba8Premul::chroma_green().to_array()));
    }
}
