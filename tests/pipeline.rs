// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// 流水线集成测试 (使用模拟推理引擎)

use std::cell::{Cell, RefCell};
use std::rc::Rc;

use image::{DynamicImage, Rgba, RgbaImage};
use yolo_rs::{Configuration, Engine, Error, LetterboxTransform, ModelFamily, Result, YOLO};

/// 返回预设输出, 并记录最近一次输入
struct MockEngine {
    expected_input: usize,
    output: Vec<f32>,
    last_input: Rc<RefCell<Vec<f32>>>,
    fail: bool,
    dropped: Rc<Cell<bool>>,
}

impl MockEngine {
    fn new(expected_input: usize, output: Vec<f32>) -> Self {
        Self {
            expected_input,
            output,
            last_input: Rc::new(RefCell::new(vec![])),
            fail: false,
            dropped: Rc::new(Cell::new(false)),
        }
    }
}

impl Engine for MockEngine {
    fn set_input(&mut self, input: &[f32]) -> Result<()> {
        if input.len() != self.expected_input {
            return Err(Error::ConfigurationMismatch(format!(
                "input buffer length: expected {}, got {}",
                self.expected_input,
                input.len()
            )));
        }
        *self.last_input.borrow_mut() = input.to_vec();
        Ok(())
    }

    fn run(&mut self) -> Result<()> {
        if self.fail {
            return Err(Error::EngineExecution("device lost".to_string()));
        }
        Ok(())
    }

    fn output(&self) -> &[f32] {
        &self.output
    }
}

impl Drop for MockEngine {
    fn drop(&mut self) {
        self.dropped.set(true);
    }
}

fn solid(w: u32, h: u32, px: [u8; 4]) -> DynamicImage {
    DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(px)))
}

fn two_class_grid() -> Configuration {
    Configuration {
        classes: vec!["Head".into(), "Enemy".into()],
        family: ModelFamily::YOLOv8,
        output_shape: vec![1, 6, 2],
        ..Default::default()
    }
}

// 2 anchors, 2 classes: [cx; cy; w; h; class0; class1]
const GRID_RAW: [f32; 12] = [
    100.0, 200.0, 50.0, 60.0, 0.9, 0.1, 300.0, 400.0, 70.0, 80.0, 0.2, 0.8,
];

fn close(a: f32, b: f32) -> bool {
    (a - b).abs() < 1e-3
}

#[test]
fn grid_predict_end_to_end() {
    let engine = MockEngine::new(3 * 640 * 640, GRID_RAW.to_vec());
    let mut yolo = YOLO::with_engine(two_class_grid(), engine).unwrap();

    let ys = yolo.predict(&solid(640, 640, [0, 0, 0, 255]), 0.5, 0.45).unwrap();
    assert_eq!(ys.len(), 2);

    // 分数高者在前
    assert_eq!(ys[0].label, "Head");
    assert_eq!(ys[0].confidence, 80.0);
    assert!(close(ys[0].x1, 199.95) && close(ys[0].x2, 200.05));
    assert_eq!((ys[0].y1, ys[0].y2), (0.0, 260.0));

    assert_eq!(ys[1].confidence, 70.0);
    assert!(close(ys[1].x1, 99.55) && close(ys[1].x2, 100.45));
    assert_eq!((ys[1].y1, ys[1].y2), (0.0, 200.0));
}

#[test]
fn grid_postprocess_with_explicit_transform() {
    let yolo = YOLO::with_engine(two_class_grid(), MockEngine::new(0, vec![])).unwrap();
    let t = LetterboxTransform {
        scale: 1.0,
        pad_x: 0,
        pad_y: 0,
    };
    let ys = yolo.postprocess(&GRID_RAW, &t, 640, 480, 0.5, 0.45);
    assert_eq!(ys.len(), 2);
    assert_eq!(ys[0].confidence, 80.0);
    assert_eq!(ys[0].y2, 260.0);

    // 阈值高于所有分数
    assert!(yolo.postprocess(&GRID_RAW, &t, 640, 480, 100.0, 0.45).is_empty());
}

#[test]
fn engine_receives_letterboxed_planar_input() {
    let engine = MockEngine::new(3 * 640 * 640, GRID_RAW.to_vec());
    let input = engine.last_input.clone();
    let mut yolo = YOLO::with_engine(two_class_grid(), engine).unwrap();

    // 320x160 → scale 2, 640x320, pad_y 160
    yolo.predict(&solid(320, 160, [255, 0, 0, 255]), 0.5, 0.45).unwrap();

    let xs = input.borrow();
    let plane = 640 * 640;
    let pad = 114.0 / 255.0;
    assert_eq!(xs.len(), 3 * plane);
    assert_eq!(xs[0], pad);
    assert_eq!(xs[159 * 640], pad);
    assert_eq!(xs[160 * 640], 1.0);
    assert_eq!(xs[plane + 160 * 640], 0.0);
    assert_eq!(xs[2 * plane + 160 * 640], 0.0);
    assert_eq!(xs[479 * 640 + 639], 1.0);
    assert_eq!(xs[480 * 640], pad);
}

#[test]
fn pre_decoded_predict_end_to_end() {
    let config = Configuration {
        family: ModelFamily::YOLOv10,
        output_shape: vec![1, 2, 6],
        apply_nms: false,
        ..Default::default()
    };
    let raw = vec![
        100.0, 240.0, 300.0, 440.0, 0.9, 0.0, //
        0.0, 0.0, 10.0, 10.0, 0.1, 5.0,
    ];
    let mut yolo = YOLO::with_engine(config, MockEngine::new(3 * 640 * 640, raw)).unwrap();

    // 1280x720 → scale 0.5, pad_y 140
    let ys = yolo.predict(&solid(1280, 720, [1, 2, 3, 255]), 0.25, 0.45).unwrap();
    assert_eq!(ys.len(), 1);
    assert_eq!(ys[0].label, "person");
    assert_eq!((ys[0].x1, ys[0].y1, ys[0].x2, ys[0].y2), (200.0, 200.0, 600.0, 600.0));
    assert_eq!(
        ys[0].to_string(),
        "Object person (confidence 0.900000): (200.000000, 200.000000), (600.000000, 600.000000)"
    );
}

#[test]
fn input_length_mismatch_is_reported() {
    let engine = MockEngine::new(3 * 320 * 320, GRID_RAW.to_vec());
    let mut yolo = YOLO::with_engine(two_class_grid(), engine).unwrap();
    let err = yolo
        .predict(&solid(64, 64, [0, 0, 0, 255]), 0.5, 0.45)
        .unwrap_err();
    assert!(matches!(err, Error::ConfigurationMismatch(_)));
}

#[test]
fn engine_failure_is_propagated() {
    let mut engine = MockEngine::new(3 * 640 * 640, GRID_RAW.to_vec());
    engine.fail = true;
    let mut yolo = YOLO::with_engine(two_class_grid(), engine).unwrap();
    let err = yolo
        .predict(&solid(64, 64, [0, 0, 0, 255]), 0.5, 0.45)
        .unwrap_err();
    assert!(matches!(err, Error::EngineExecution(ref m) if m == "device lost"));
}

#[test]
fn zero_sized_image_is_rejected() {
    let engine = MockEngine::new(3 * 640 * 640, GRID_RAW.to_vec());
    let mut yolo = YOLO::with_engine(two_class_grid(), engine).unwrap();
    let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 0));
    assert!(matches!(
        yolo.predict(&img, 0.5, 0.45),
        Err(Error::InvalidImage { .. })
    ));
}

#[test]
fn short_output_yields_no_detections() {
    let engine = MockEngine::new(3 * 640 * 640, GRID_RAW[..7].to_vec());
    let mut yolo = YOLO::with_engine(two_class_grid(), engine).unwrap();
    let ys = yolo.predict(&solid(64, 64, [0, 0, 0, 255]), 0.5, 0.45).unwrap();
    assert!(ys.is_empty());
}

#[test]
fn overflowing_model_output_does_not_panic() {
    // anchor 0: 无穷大宽度, anchor 1: 超大但有限的框
    let raw = vec![
        100.0, 200.0, // cx
        50.0, 60.0, // cy
        f32::INFINITY, 1e10, // w
        300.0, 1e10, // h
        70.0, 80.0, // class 0
        0.2, 0.8, // class 1
    ];
    let engine = MockEngine::new(3 * 640 * 640, raw);
    let mut yolo = YOLO::with_engine(two_class_grid(), engine).unwrap();
    let ys = yolo.predict(&solid(640, 640, [0, 0, 0, 255]), 0.5, 0.45).unwrap();
    assert_eq!(ys.len(), 1);
    assert_eq!(ys[0].confidence, 80.0);
    assert_eq!((ys[0].x1, ys[0].y1, ys[0].x2, ys[0].y2), (0.0, 0.0, 640.0, 640.0));
    assert_eq!(yolo.configuration().family, ModelFamily::YOLOv8);
}

#[test]
fn destroy_releases_engine() {
    let engine = MockEngine::new(3 * 640 * 640, vec![]);
    let dropped = engine.dropped.clone();
    let yolo = YOLO::with_engine(two_class_grid(), engine).unwrap();
    assert!(!dropped.get());
    yolo.destroy();
    assert!(dropped.get());
}

#[test]
fn detections_serialize_to_json() {
    let engine = MockEngine::new(3 * 640 * 640, GRID_RAW.to_vec());
    let mut yolo = YOLO::with_engine(two_class_grid(), engine).unwrap();
    let ys = yolo.predict(&solid(640, 640, [0, 0, 0, 255]), 0.5, 0.45).unwrap();
    let json = serde_json::to_value(&ys).unwrap();
    assert_eq!(json[0]["label"], "Head");
    assert_eq!(json[1]["y2"], 200.0);
}
