/// 检测系统 (Detection System)
///
/// - types: 候选框 / 检测框 / 整数矩形
/// - nms:   非极大值抑制
pub mod nms;
pub mod types;

pub use nms::non_max_suppression;
pub use types::{BoundingBox, Candidate, Rect};
