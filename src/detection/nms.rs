// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// 非极大值抑制 (Non-Max Suppression)

use super::types::{Candidate, Rect};

/// 贪心 NMS (不区分类别)
///
/// 1. 只保留 `score > score_threshold` 且坐标有限的候选框
/// 2. 反复选出剩余中分数最高者 (同分时靠前者优先), 并移除与其 `IoU >= iou_threshold` 的候选框
///
/// 返回保留的候选框下标 (指向输入切片), 按选中顺序排列。
pub fn non_max_suppression(
    candidates: &[Candidate],
    score_threshold: f32,
    iou_threshold: f32,
) -> Vec<usize> {
    let rects: Vec<Rect> = candidates.iter().map(Rect::from).collect();
    let mut remaining: Vec<usize> = (0..candidates.len())
        .filter(|&i| candidates[i].score > score_threshold && candidates[i].is_finite())
        .collect();
    let mut keep = Vec::with_capacity(remaining.len());

    while !remaining.is_empty() {
        let mut pos = 0;
        for (k, &i) in remaining.iter().enumerate().skip(1) {
            if candidates[i].score > candidates[remaining[pos]].score {
                pos = k;
            }
        }
        let best = remaining.remove(pos);
        keep.push(best);

        let r = rects[best];
        remaining.retain(|&i| r.iou(&rects[i]) < iou_threshold);
    }

    keep
}
