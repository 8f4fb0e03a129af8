/// 模型输出解码
///
/// # 架构说明
///
/// 不同 YOLO 系列的输出张量布局不同:
/// - **Grid** (`yolov8.rs`): YOLOv5/v8/v11, 输出 `[1, 4+nc, anchors]`,
///   每个 anchor 对类别分数取 argmax, 需要 NMS
/// - **PreDecoded** (`yolov10.rs`): YOLOv10 端到端模型, 输出 `[1, N, 6]`,
///   每行 `[x1, y1, x2, y2, score, class_id]`
///
/// ## 使用示例
/// ```rust,ignore
/// let decoder = OutputDecoder::from_configuration(&config);
/// let candidates = decoder.decode(engine.output(), 0.25);
/// ```
pub mod yolov10;
pub mod yolov8;

pub use yolov10::PreDecodedDecoder;
pub use yolov8::GridDecoder;

use crate::detection::Candidate;
use crate::Configuration;

/// 原始输出 → 候选框 (模型输入坐标)
pub trait Decode {
    /// 解码不会失败: 格式不完整时返回空或部分结果
    fn decode(&self, raw: &[f32], score_threshold: f32) -> Vec<Candidate>;
}

/// 按模型系列选择的解码器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OutputDecoder {
    Grid(GridDecoder),
    PreDecoded(PreDecodedDecoder),
}

impl OutputDecoder {
    pub fn from_configuration(config: &Configuration) -> Self {
        let dim = |i: usize| config.output_shape.get(i).copied().unwrap_or(0).max(0) as usize;
        if config.family.is_pre_decoded() {
            OutputDecoder::PreDecoded(PreDecodedDecoder::new(dim(1), config.classes.len()))
        } else {
            OutputDecoder::Grid(GridDecoder::new(config.classes.len(), dim(2)))
        }
    }
}

impl Decode for OutputDecoder {
    fn decode(&self, raw: &[f32], score_threshold: f32) -> Vec<Candidate> {
        match self {
            OutputDecoder::Grid(d) => d.decode(raw, score_threshold),
            OutputDecoder::PreDecoded(d) => d.decode(raw, score_threshold),
        }
    }
}
