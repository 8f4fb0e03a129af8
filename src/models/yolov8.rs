// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// YOLOv5 / YOLOv8 / YOLOv11 输出解码
// 输出格式: [1, 4 + nc, anchors], 前4行为 cx, cy, w, h

use ndarray::{s, ArrayView2, Axis};

use super::Decode;
use crate::detection::Candidate;

const CXYWH_OFFSET: usize = 4;

/// Anchor 网格解码器
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct GridDecoder {
    nc: usize,
    anchors: usize,
}

impl GridDecoder {
    pub fn new(nc: usize, anchors: usize) -> Self {
        Self { nc, anchors }
    }

    pub fn nc(&self) -> usize {
        self.nc
    }

    pub fn anchors(&self) -> usize {
        self.anchors
    }
}

impl Decode for GridDecoder {
    fn decode(&self, raw: &[f32], score_threshold: f32) -> Vec<Candidate> {
        let len = (CXYWH_OFFSET + self.nc) * self.anchors;
        if raw.len() < len {
            tracing::warn!(expected = len, got = raw.len(), "output buffer too short");
            return vec![];
        }
        let preds = match ArrayView2::from_shape((CXYWH_OFFSET + self.nc, self.anchors), &raw[..len])
        {
            Ok(preds) => preds,
            Err(e) => {
                tracing::warn!("failed to view output as grid: {e}");
                return vec![];
            }
        };

        let mut ys = Vec::new();
        for pred in preds.axis_iter(Axis(1)) {
            let clss = pred.slice(s![CXYWH_OFFSET..]);
            // 同分时取下标较小的类别
            let Some((id, &confidence)) = clss
                .into_iter()
                .enumerate()
                .reduce(|max, x| if x.1 > max.1 { x } else { max })
            else {
                continue;
            };

            if confidence < score_threshold {
                continue;
            }

            let candidate = Candidate {
                class_id: id,
                score: confidence,
                cx: pred[0],
                cy: pred[1],
                w: pred[2],
                h: pred[3],
            };
            // inf/NaN (例如 fp16 溢出)
            if !candidate.is_finite() {
                continue;
            }
            ys.push(candidate);
        }
        ys
    }
}
