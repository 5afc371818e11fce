use image::{Rgba, RgbaImage};

use super::*;

fn temp_dir(name: &str) -> PathBuf {
    let dir = std::env::temp_dir().join(format!(
        "layertuber_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ));
    std::fs::create_dir_all(&dir).unwrap();
    dir
}

fn write_png(path: &Path, w: u32, h: u32, rgba: [u8; 4]) {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).unwrap();
    }
    RgbaImage::from_pixel(w, h, Rgba(rgba)).save(path).unwrap();
}

#[test]
fn normalize_rel_path_rules() {
    assert_eq!(normalize_rel_path("a/./b.png").unwrap(), "a/b.png");
    assert_eq!(normalize_rel_path("a\\b.png").unwrap(), "a/b.png");
    assert!(normalize_rel_path("/etc/passwd").is_err());
    assert!(normalize_rel_path("../x.png").is_err());
    assert!(normalize_rel_path("").is_err());
    assert!(normalize_rel_path("./").is_err());
}

#[test]
fn manifest_parses_nested_entries() {
    let m = AssetManifest::from_reader(
        r#"{
            "width": 10, "height": 5,
            "stack": [
                {"type": "layer", "name": "blink", "src": "blink.png", "x": 2, "y": 1},
                {"type": "group", "name": "head", "uuid": "h1", "children": [
                    {"type": "layer", "name": "face", "src": "face.png"}
                ]}
            ]
        }"#
        .as_bytes(),
    )
    .unwrap();
    assert_eq!((m.width, m.height), (10, 5));
    assert!(matches!(&m.stack[0], ManifestEntry::Layer { x: 2, y: 1, .. }));
    let ManifestEntry::Group { children, uuid, .. } = &m.stack[1] else {
        panic!("expected a group");
    };
    assert_eq!(uuid.as_deref(), Some("h1"));
    assert_eq!(children.len(), 1);

    let bad = AssetManifest::from_reader(r#"{"width": 1, "height": 1, "stack": [{"type": "mask"}]}"#.as_bytes());
    assert!(matches!(bad.unwrap_err(), LayertuberError::InvalidRig(_)));
}

#[test]
fn load_decodes_rasters_and_assigns_ids() {
    let dir = temp_dir("manifest_load");
    write_png(&dir.join("parts/face.png"), 4, 4, [255, 0, 0, 255]);
    write_png(&dir.join("blink.png"), 2, 1, [0, 0, 255, 255]);
    let manifest = dir.join("fox.json");
    std::fs::write(
        &manifest,
        r#"{"width": 4, "height": 4, "stack": [
            {"type": "layer", "name": "blink", "src": "blink.png", "x": 1, "y": 2},
            {"type": "group", "name": "head", "children": [
                {"type": "layer", "name": "face", "src": "parts/face.png"}
            ]}
        ]}"#,
    )
    .unwrap();

    let tree = load_asset(&manifest).unwrap();
    assert_eq!(tree.size, Canvas::new(4, 4));
    assert_eq!(tree.node_count(), 3);
    assert_eq!(tree.roots[0].uuid, "node-0");
    let AssetKind::Group(children) = &tree.roots[1].kind else {
        panic!("expected a group");
    };
    assert_eq!(children[0].uuid, "node-1-0");
    let AssetKind::Layer { image, x, y } = &tree.roots[0].kind else {
        panic!("expected a layer");
    };
    assert_eq!((image.width(), *x, *y), (2, 1, 2));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn load_rig_uses_the_default_config_path() {
    let dir = temp_dir("manifest_rig");
    write_png(&dir.join("base.png"), 8, 8, [9, 9, 9, 255]);
    let manifest = dir.join("fox.json");
    std::fs::write(
        &manifest,
        r#"{"width": 8, "height": 8, "stack": [{"type": "layer", "name": "base", "src": "base.png"}]}"#,
    )
    .unwrap();

    // No config yet.
    let err = load_rig(&manifest, None, &RigOptions::default()).unwrap_err();
    assert!(matches!(err, LayertuberError::InvalidRig(_)));

    std::fs::write(
        dir.join("fox.json.layertuber.yaml"),
        "layers:\n  base: {}\n  ghost: {}\n",
    )
    .unwrap();
    let (rig, diags) = load_rig(&manifest, None, &RigOptions::default()).unwrap();
    assert_eq!(rig.target_size(), Canvas::new(8, 8));
    assert_eq!(diags.unused_config(), ["ghost".to_string()]);

    // A config naming an unknown field surfaces as an invalid rig.
    let bad = dir.join("bad.json");
    std::fs::write(
        &bad,
        r#"{"layers": {"base": {"follow": {"option": "nose"}}}}"#,
    )
    .unwrap();
    let err = load_rig(&manifest, Some(&bad), &RigOptions::default()).unwrap_err();
    assert!(matches!(err, LayertuberError::InvalidRig(_)));

    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn missing_image_is_invalid_rig() {
    let dir = temp_dir("manifest_missing");
    let manifest = AssetManifest {
        width: 2,
        height: 2,
        stack: vec![ManifestEntry::Layer {
            name: "gone".into(),
            src: "gone.png".into(),
            x: 0,
            y: 0,
            uuid: None,
        }],
    };
    assert!(matches!(
        manifest.load(&dir).unwrap_err(),
        LayertuberError::InvalidRig(_)
    ));
    std::fs::remove_dir_all(&dir).unwrap();
}
