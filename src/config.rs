// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// 模型配置参数 (Model configuration)

use std::path::PathBuf;

use clap::{Parser, ValueEnum};
use serde::{Deserialize, Serialize};

use crate::{Error, OrtEP, Result};

/// COCO 数据集类别名称
pub const COCO_CLASSES: [&str; 80] = [
    "person",
    "bicycle",
    "car",
    "motorcycle",
    "airplane",
    "bus",
    "train",
    "truck",
    "boat",
    "traffic light",
    "fire hydrant",
    "stop sign",
    "parking meter",
    "bench",
    "bird",
    "cat",
    "dog",
    "horse",
    "sheep",
    "cow",
    "elephant",
    "bear",
    "zebra",
    "giraffe",
    "backpack",
    "umbrella",
    "handbag",
    "tie",
    "suitcase",
    "frisbee",
    "skis",
    "snowboard",
    "sports ball",
    "kite",
    "baseball bat",
    "baseball glove",
    "skateboard",
    "surfboard",
    "tennis racket",
    "bottle",
    "wine glass",
    "cup",
    "fork",
    "knife",
    "spoon",
    "bowl",
    "banana",
    "apple",
    "sandwich",
    "orange",
    "broccoli",
    "carrot",
    "hot dog",
    "pizza",
    "donut",
    "cake",
    "chair",
    "couch",
    "potted plant",
    "bed",
    "dining table",
    "toilet",
    "tv",
    "laptop",
    "mouse",
    "remote",
    "keyboard",
    "cell phone",
    "microwave",
    "oven",
    "toaster",
    "sink",
    "refrigerator",
    "book",
    "clock",
    "vase",
    "scissors",
    "teddy bear",
    "hair drier",
    "toothbrush",
];

/// 端到端模型每行检测结果的长度: `[x1, y1, x2, y2, score, class_id]`
pub const PRE_DECODED_ROW: usize = 6;

/// 模型系列 (决定输出张量的解码方式)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ValueEnum)]
pub enum ModelFamily {
    /// YOLOv5 模型 (与v8相同的 [1, 4+nc, anchors] 输出)
    #[value(name = "yolov5")]
    YOLOv5,
    /// YOLOv8 标准模型
    #[value(name = "yolov8")]
    YOLOv8,
    /// YOLOv10 端到端模型 (NMS-Free), 输出 [1, N, 6]
    #[value(name = "yolov10")]
    YOLOv10,
    /// YOLOv11 改进模型
    #[value(name = "yolov11")]
    YOLOv11,
}

impl ModelFamily {
    /// 从模型路径推断模型类型
    pub fn from_path(path: &str) -> Self {
        let path = path.to_lowercase();
        if path.contains("yolov10") || path.contains("v10") {
            ModelFamily::YOLOv10
        } else if path.contains("yolov11") || path.contains("yolo11") || path.contains("v11") {
            ModelFamily::YOLOv11
        } else if path.contains("v5") {
            ModelFamily::YOLOv5
        } else {
            ModelFamily::YOLOv8
        }
    }

    /// 输出是否已经是逐行的检测结果 (无需 argmax)
    pub fn is_pre_decoded(&self) -> bool {
        matches!(self, ModelFamily::YOLOv10)
    }

    /// 获取模型推荐的置信度阈值
    pub fn default_conf_threshold(&self) -> f32 {
        match self {
            ModelFamily::YOLOv10 => 0.20,
            ModelFamily::YOLOv5 => 0.25,
            ModelFamily::YOLOv8 | ModelFamily::YOLOv11 => 0.15,
        }
    }

    /// 获取模型推荐的IOU阈值
    pub fn default_iou_threshold(&self) -> f32 {
        0.45
    }
}

/// 推理流水线配置
///
/// 构造后不可变, 由 [`crate::YOLO`] 持有。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Configuration {
    pub model_path: PathBuf,
    pub input_name: String,
    pub output_name: String,
    /// `[batch, channels, height, width]`
    pub input_shape: Vec<i64>,
    pub output_shape: Vec<i64>,
    /// 类别名称, 下标即类别ID
    pub classes: Vec<String>,
    pub family: ModelFamily,
    /// 解码后是否执行NMS
    pub apply_nms: bool,
    /// 构建 ONNX Runtime 会话时使用的执行后端
    pub provider: OrtEP,
}

impl Default for Configuration {
    fn default() -> Self {
        Self {
            model_path: PathBuf::from("model.onnx"),
            input_name: "images".to_string(),
            output_name: "output0".to_string(),
            input_shape: vec![1, 3, 640, 640],
            output_shape: vec![1, 84, 8400],
            classes: COCO_CLASSES.iter().map(|s| s.to_string()).collect(),
            family: ModelFamily::YOLOv11,
            apply_nms: true,
            provider: OrtEP::CPU,
        }
    }
}

impl Configuration {
    /// 按模型系列生成默认配置 (COCO 官方导出形状)
    pub fn for_family(model_path: impl Into<PathBuf>, family: ModelFamily) -> Self {
        let mut config = Self {
            model_path: model_path.into(),
            family,
            ..Default::default()
        };
        if family.is_pre_decoded() {
            config.output_shape = vec![1, 300, PRE_DECODED_ROW as i64];
            config.apply_nms = false;
        }
        config
    }

    /// 检查形状与类别数量是否一致
    pub fn validate(&self) -> Result<()> {
        if self.input_shape.len() != 4 {
            return Err(Error::mismatch("input shape rank", 4, self.input_shape.len()));
        }
        if self.input_shape[0] != 1 {
            return Err(Error::mismatch(
                "input batch",
                1,
                self.input_shape[0].max(0) as usize,
            ));
        }
        if self.input_shape[1] != 3 {
            return Err(Error::mismatch(
                "input channels",
                3,
                self.input_shape[1].max(0) as usize,
            ));
        }
        let (h, w) = (self.input_shape[2], self.input_shape[3]);
        if h <= 0 || h != w {
            return Err(Error::ConfigurationMismatch(format!(
                "input must be a non-empty square, got {}x{}",
                w, h
            )));
        }
        if self.output_shape.len() != 3 || self.output_shape.iter().any(|&d| d <= 0) {
            return Err(Error::ConfigurationMismatch(format!(
                "output shape must be [1, rows, cols] with positive dims, got {:?}",
                self.output_shape
            )));
        }
        if self.classes.is_empty() {
            return Err(Error::ConfigurationMismatch("no class labels".to_string()));
        }

        if self.family.is_pre_decoded() {
            if self.output_shape[2] as usize != PRE_DECODED_ROW {
                return Err(Error::mismatch(
                    "pre-decoded row width",
                    PRE_DECODED_ROW,
                    self.output_shape[2] as usize,
                ));
            }
        } else if self.output_shape[1] as usize != 4 + self.classes.len() {
            return Err(Error::mismatch(
                "output features (4 + classes)",
                4 + self.classes.len(),
                self.output_shape[1] as usize,
            ));
        }
        Ok(())
    }

    /// 模型输入边长 (正方形)
    pub fn input_size(&self) -> u32 {
        self.input_shape.get(2).copied().unwrap_or(0).max(0) as u32
    }

    /// 平面输入缓冲区长度 `3 * size * size`
    pub fn input_len(&self) -> usize {
        self.input_shape.iter().map(|&d| d.max(0) as usize).product()
    }

    pub fn output_len(&self) -> usize {
        self.output_shape.iter().map(|&d| d.max(0) as usize).product()
    }
}

/// 命令行参数
#[derive(Parser, Debug, Clone)]
#[command(author, version, about = "YOLO 目标检测 (ONNX Runtime)", long_about = None)]
pub struct Args {
    /// ONNX 模型文件路径
    #[arg(long, required = true)]
    pub model: String,

    /// 输入图片
    #[arg(long, required = true)]
    pub source: String,

    /// 模型系列 (缺省时根据文件名推断)
    #[arg(long, value_enum)]
    pub family: Option<ModelFamily>,

    /// 输入尺寸 (正方形)
    #[arg(long, default_value_t = 640)]
    pub size: u32,

    /// 候选框数量 (YOLOv10 为检测行数)
    #[arg(long)]
    pub anchors: Option<u32>,

    /// 置信度阈值 (缺省时使用模型推荐值)
    #[arg(long)]
    pub conf: Option<f32>,

    /// NMS IOU 阈值
    #[arg(long)]
    pub iou: Option<f32>,

    /// 逗号分隔的类别名称 (缺省为 COCO 80 类)
    #[arg(long, value_delimiter = ',')]
    pub classes: Option<Vec<String>>,

    /// 强制开启/关闭 NMS (缺省: YOLOv10 关闭, 其他开启)
    #[arg(long)]
    pub nms: Option<bool>,

    /// device id
    #[arg(long, default_value_t = 0)]
    pub device_id: u32,

    /// using TensorRT EP
    #[arg(long)]
    pub trt: bool,

    /// using CUDA EP
    #[arg(long)]
    pub cuda: bool,

    /// using TensorRT EP FP16
    #[arg(long)]
    pub fp16: bool,

    /// using OpenVINO EP
    #[arg(long)]
    pub openvino: bool,

    /// using DirectML EP
    #[arg(long)]
    pub directml: bool,

    /// using CoreML EP
    #[arg(long)]
    pub coreml: bool,

    /// 以JSON格式输出结果
    #[arg(long)]
    pub json: bool,

    /// 保存带检测框的图片
    #[arg(long)]
    pub output: Option<String>,
}

impl Args {
    pub fn model_family(&self) -> ModelFamily {
        self.family.unwrap_or_else(|| ModelFamily::from_path(&self.model))
    }

    /// 命令行参数 → 流水线配置
    pub fn configuration(&self) -> Configuration {
        let family = self.model_family();
        let mut config = Configuration::for_family(&self.model, family);

        // execution provider
        config.provider = if self.trt {
            OrtEP::Trt {
                device_id: self.device_id,
                fp16: self.fp16,
            }
        } else if self.cuda {
            OrtEP::CUDA(self.device_id)
        } else if self.openvino {
            OrtEP::OpenVINO
        } else if self.directml {
            OrtEP::DirectML(self.device_id)
        } else if self.coreml {
            OrtEP::CoreML
        } else {
            OrtEP::CPU
        };

        if let Some(classes) = &self.classes {
            config.classes = classes.iter().map(|c| c.trim().to_string()).collect();
        }

        let size = self.size as i64;
        config.input_shape = vec![1, 3, size, size];
        if family.is_pre_decoded() {
            let rows = self.anchors.map(|a| a as i64).unwrap_or(config.output_shape[1]);
            config.output_shape = vec![1, rows, PRE_DECODED_ROW as i64];
        } else {
            // 640 → 8400 = 80² + 40² + 20²
            let anchors = self.anchors.map(|a| a as i64).unwrap_or_else(|| {
                [8, 16, 32].iter().map(|s| (size / s) * (size / s)).sum()
            });
            config.output_shape = vec![1, 4 + config.classes.len() as i64, anchors];
        }

        if let Some(nms) = self.nms {
            config.apply_nms = nms;
        }
        config
    }

    pub fn conf(&self) -> f32 {
        self.conf.unwrap_or_else(|| self.model_family().default_conf_threshold())
    }

    pub fn iou(&self) -> f32 {
        self.iou.unwrap_or_else(|| self.model_family().default_iou_threshold())
    }
}
