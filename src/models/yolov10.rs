// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// YOLOv10 端到端输出解码 (NMS-Free)

use super::Decode;
use crate::detection::Candidate;
use crate::PRE_DECODED_ROW;

/// YOLOv10 输出解码器
///
/// 输出格式: `[1, num_boxes, 6]`, 每行 `[x1, y1, x2, y2, confidence, class_id]`。
/// 与 YOLOv8 不同, 框已经在模型内部去重, 不需要 argmax。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PreDecodedDecoder {
    rows: usize,
    nc: usize,
}

impl PreDecodedDecoder {
    pub fn new(rows: usize, nc: usize) -> Self {
        Self { rows, nc }
    }
}

impl Decode for PreDecodedDecoder {
    fn decode(&self, raw: &[f32], score_threshold: f32) -> Vec<Candidate> {
        if raw.len() < self.rows * PRE_DECODED_ROW {
            tracing::warn!(
                expected = self.rows * PRE_DECODED_ROW,
                got = raw.len(),
                "output buffer too short, decoding complete rows only"
            );
        }

        let mut ys = Vec::new();
        for pred in raw.chunks_exact(PRE_DECODED_ROW).take(self.rows) {
            let confidence = pred[4];
            if confidence < score_threshold {
                continue;
            }

            // 非法类别 (负数, NaN 或超出标签范围) 直接跳过
            if pred[5].is_nan() || pred[5] < 0.0 || pred[5] as usize >= self.nc {
                continue;
            }

            let candidate = Candidate::from_corners(
                pred[5] as usize,
                confidence,
                pred[0],
                pred[1],
                pred[2],
                pred[3],
            );
            if !candidate.is_finite() {
                continue;
            }
            ys.push(candidate);
        }
        ys
    }
}
