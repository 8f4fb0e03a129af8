// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
pub mod config; // 模型配置参数
pub mod detection; // 检测框 / NMS
pub mod engine; // 推理引擎接口
pub mod error; // 错误类型
pub mod models; // 输出解码
pub mod ort_backend; // ONNX Runtime 后端
pub mod pipeline; // 检测流水线
pub mod utils; // letterbox / 张量打包

pub use crate::config::{Args, Configuration, ModelFamily, COCO_CLASSES, PRE_DECODED_ROW};
pub use crate::detection::{non_max_suppression, BoundingBox, Candidate};
pub use crate::engine::Engine;
pub use crate::error::{Error, Result};
pub use crate::models::{Decode, OutputDecoder};
pub use crate::ort_backend::{OrtBackend, OrtEP};
pub use crate::pipeline::YOLO;
pub use crate::utils::{letterbox, pack, LetterboxTransform};
