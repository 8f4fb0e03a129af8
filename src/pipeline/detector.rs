// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// 检测流水线
// letterbox → 打包 → 推理 → 解码 → NMS → 坐标还原

use std::path::PathBuf;
use std::time::Instant;

use image::{DynamicImage, GenericImageView};

use crate::detection::{non_max_suppression, BoundingBox};
use crate::models::{Decode, OutputDecoder};
use crate::utils::{letterbox, pack_into, LetterboxTransform};
use crate::{Configuration, Engine, ModelFamily, OrtBackend, Result};

/// YOLO 检测器
///
/// 一个实例同一时刻只处理一次 `predict` 调用; 需要并发时为每个线程创建独立实例。
pub struct YOLO<E: Engine = OrtBackend> {
    config: Configuration,
    engine: E,
    decoder: OutputDecoder,
    input: Vec<f32>,
}

impl YOLO<OrtBackend> {
    /// 校验配置并加载 ONNX 模型
    pub fn with_configuration(config: Configuration) -> Result<Self> {
        let engine = OrtBackend::build(&config)?;
        Self::with_engine(config, engine)
    }

    pub fn yolov5(model: impl Into<PathBuf>) -> Result<Self> {
        Self::with_configuration(Configuration::for_family(model, ModelFamily::YOLOv5))
    }

    pub fn yolov8(model: impl Into<PathBuf>) -> Result<Self> {
        Self::with_configuration(Configuration::for_family(model, ModelFamily::YOLOv8))
    }

    /// 输入 `[1, 3, 640, 640]`, 输出 `[1, 300, 6]`, 不做 NMS
    pub fn yolov10(model: impl Into<PathBuf>) -> Result<Self> {
        Self::with_configuration(Configuration::for_family(model, ModelFamily::YOLOv10))
    }

    pub fn yolov11(model: impl Into<PathBuf>) -> Result<Self> {
        Self::with_configuration(Configuration::for_family(model, ModelFamily::YOLOv11))
    }
}

impl<E: Engine> YOLO<E> {
    /// 使用任意推理引擎构建流水线
    pub fn with_engine(config: Configuration, engine: E) -> Result<Self> {
        config.validate()?;
        let decoder = OutputDecoder::from_configuration(&config);
        let input = vec![0.0; config.input_len()];
        tracing::debug!(family = ?config.family, nms = config.apply_nms, "pipeline ready");
        Ok(Self {
            config,
            engine,
            decoder,
            input,
        })
    }

    pub fn configuration(&self) -> &Configuration {
        &self.config
    }

    /// 单张图片推理, 返回原图坐标下的检测框 (按 NMS 保留顺序)
    pub fn predict(
        &mut self,
        image: &DynamicImage,
        score_threshold: f32,
        nms_threshold: f32,
    ) -> Result<Vec<BoundingBox>> {
        let (width, height) = image.dimensions();

        let t = Instant::now();
        let (padded, transform) = letterbox(image, self.config.input_size())?;
        pack_into(&DynamicImage::ImageRgba8(padded), &mut self.input)?;
        tracing::debug!(elapsed = ?t.elapsed(), "preprocess");

        let t = Instant::now();
        self.engine.set_input(&self.input)?;
        self.engine.run()?;
        tracing::debug!(elapsed = ?t.elapsed(), "inference");

        let t = Instant::now();
        let ys = self.postprocess(
            self.engine.output(),
            &transform,
            width,
            height,
            score_threshold,
            nms_threshold,
        );
        tracing::debug!(elapsed = ?t.elapsed(), detections = ys.len(), "postprocess");
        Ok(ys)
    }

    /// 解码 → NMS (模型坐标) → 还原到原图
    pub fn postprocess(
        &self,
        raw: &[f32],
        transform: &LetterboxTransform,
        width: u32,
        height: u32,
        score_threshold: f32,
        nms_threshold: f32,
    ) -> Vec<BoundingBox> {
        let candidates = self.decoder.decode(raw, score_threshold);
        let keep: Vec<usize> = if self.config.apply_nms {
            non_max_suppression(&candidates, score_threshold, nms_threshold)
        } else {
            (0..candidates.len()).collect()
        };

        keep.into_iter()
            .filter_map(|i| {
                let c = &candidates[i];
                let label = self.config.classes.get(c.class_id)?;
                let (x1, y1, x2, y2) = c.corners();
                let (x1, y1) = transform.to_original(x1, y1, width, height);
                let (x2, y2) = transform.to_original(x2, y2, width, height);
                Some(BoundingBox {
                    label: label.clone(),
                    confidence: c.score,
                    x1,
                    y1,
                    x2,
                    y2,
                })
            })
            .collect()
    }

    /// 释放推理引擎
    pub fn destroy(self) {
        self.engine.destroy();
    }
}
