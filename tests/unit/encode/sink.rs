use super::*;

fn frame(w: u32, h: u32, px: [u8; 4]) -> FrameBuffer {
    FrameBuffer {
        width: w,
        height: h,
        data: px.repeat((w * h) as usize),
        premultiplied: true,
    }
}

fn temp_dir(name: &str) -> PathBuf {
    std::env::temp_dir().join(format!(
        "layertuber_{name}_{}_{}",
        std::process::id(),
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos()
    ))
}

#[test]
fn in_memory_sink_records_frames() {
    let mut sink = InMemorySink::new();
    sink.begin(SinkConfig {
        width: 2,
        height: 1,
    })
    .unwrap();
    sink.push_frame(0, &frame(2, 1, [0, 255, 0, 255])).unwrap();
    sink.push_frame(3, &frame(2, 1, [255, 0, 0, 255])).unwrap();
    sink.end().unwrap();

    assert!(sink.is_finished());
    assert_eq!(sink.config().unwrap().width, 2);
    let idx: Vec<u64> = sink.frames().iter().map(|(i, _)| *i).collect();
    assert_eq!(idx, vec![0, 3]);
}

#[test]
fn png_sequence_writes_numbered_files() {
    let dir = temp_dir("png_seq");
    let mut sink = PngSequenceSink::new(&dir);
    sink.begin(SinkConfig {
        width: 2,
        height: 2,
    })
    .unwrap();
    sink.push_frame(7, &frame(2, 2, [0, 0, 255, 255])).unwrap();
    sink.end().unwrap();

    assert_eq!(sink.written(), 1);
    let path = dir.join("frame_000007.png");
    let img = image::open(&path).unwrap().to_rgba8();
    assert_eq!(img.get_pixel(1, 1).0, [0, 0, 255, 255]);
    std::fs::remove_dir_all(&dir).unwrap();
}

#[test]
fn png_sequence_rejects_mismatched_frames() {
    let dir = temp_dir("png_seq_mismatch");
    let mut sink = PngSequenceSink::new(&dir);
    assert!(sink.push_frame(0, &frame(1, 1, [0; 4])).is_err());
    assert!(
        sink.begin(SinkConfig {
            width: 0,
            height: 2
        })
        .is_err()
    );
    sink.begin(SinkConfig {
        width: 2,
        height: 2,
    })
    .unwrap();
    assert!(sink.push_frame(0, &frame(1, 1, [0; 4])).is_err());
    std::fs::remove_dir_all(&dir).unwrap();
}
