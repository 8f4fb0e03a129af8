// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// 图片检测命令行程序
// cargo run --bin yolov8 -- --model yolo11n.onnx --source bus.jpg --output bus-out.jpg

use anyhow::{Context, Result};
use clap::Parser;
use image::{Rgba, RgbaImage};
use imageproc::drawing::draw_hollow_rect_mut;
use imageproc::rect::Rect;
use tracing_subscriber::EnvFilter;

use yolo_rs::{Args, BoundingBox, YOLO};

// 检测框颜色
const BRIGHT_COLORS: [[u8; 3]; 12] = [
    [255, 0, 0],     // 红色
    [0, 255, 0],     // 绿色
    [0, 0, 255],     // 蓝色
    [255, 255, 0],   // 黄色
    [255, 0, 255],   // 品红
    [0, 255, 255],   // 青色
    [255, 128, 0],   // 橙色
    [255, 0, 128],   // 粉红
    [128, 255, 0],   // 黄绿
    [0, 128, 255],   // 天蓝
    [255, 255, 255], // 白色
    [128, 0, 255],   // 紫色
];

fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
        .init();

    let args = Args::parse();
    let config = args.configuration();
    let classes = config.classes.clone();

    let image = image::open(&args.source)
        .with_context(|| format!("failed to open image {}", args.source))?;

    let mut model = YOLO::with_configuration(config)
        .with_context(|| format!("failed to load model {}", args.model))?;
    let ys = model.predict(&image, args.conf(), args.iou())?;
    model.destroy();

    tracing::info!(source = %args.source, detections = ys.len(), "done");

    if args.json {
        println!("{}", serde_json::to_string_pretty(&ys)?);
    } else {
        for y in &ys {
            println!("{y}");
        }
    }

    if let Some(output) = &args.output {
        let mut canvas = image.to_rgba8();
        annotate(&mut canvas, &ys, &classes);
        canvas
            .save(output)
            .with_context(|| format!("failed to save annotated image {output}"))?;
        tracing::info!(output = %output, "annotated image saved");
    }

    Ok(())
}

/// 在图片上绘制检测框 (每个类别一种颜色)
fn annotate(canvas: &mut RgbaImage, ys: &[BoundingBox], classes: &[String]) {
    for y in ys {
        let w = y.width().round() as u32;
        let h = y.height().round() as u32;
        if w == 0 || h == 0 {
            continue;
        }
        let id = classes.iter().position(|c| *c == y.label).unwrap_or(0);
        let [r, g, b] = BRIGHT_COLORS[id % BRIGHT_COLORS.len()];
        let rect = Rect::at(y.x1.round() as i32, y.y1.round() as i32).of_size(w, h);
        draw_hollow_rect_mut(canvas, rect, Rgba([r, g, b, 255]));
    }
}
