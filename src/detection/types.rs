/// 检测结果数据结构
/// Data structures for detection results
use std::fmt;

use serde::{Deserialize, Serialize};

// ========== 数据结构 ==========

/// 候选框 (模型输入坐标, 中心点 + 宽高)
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Candidate {
    pub class_id: usize,
    pub score: f32,
    pub cx: f32,
    pub cy: f32,
    pub w: f32,
    pub h: f32,
}

impl Candidate {
    /// 由左上/右下角点构造
    pub fn from_corners(class_id: usize, score: f32, x1: f32, y1: f32, x2: f32, y2: f32) -> Self {
        Self {
            class_id,
            score,
            cx: (x1 + x2) / 2.0,
            cy: (y1 + y2) / 2.0,
            w: x2 - x1,
            h: y2 - y1,
        }
    }

    /// 分数与坐标均为有限值
    pub fn is_finite(&self) -> bool {
        self.score.is_finite()
            && self.cx.is_finite()
            && self.cy.is_finite()
            && self.w.is_finite()
            && self.h.is_finite()
    }

    /// `(x1, y1, x2, y2)`
    pub fn corners(&self) -> (f32, f32, f32, f32) {
        (
            self.cx - self.w / 2.0,
            self.cy - self.h / 2.0,
            self.cx + self.w / 2.0,
            self.cy + self.h / 2.0,
        )
    }
}

/// 检测框 (原图坐标)
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct BoundingBox {
    pub label: String,
    pub confidence: f32,
    pub x1: f32,
    pub y1: f32,
    pub x2: f32,
    pub y2: f32,
}

impl BoundingBox {
    pub fn width(&self) -> f32 {
        self.x2 - self.x1
    }

    pub fn height(&self) -> f32 {
        self.y2 - self.y1
    }
}

impl fmt::Display for BoundingBox {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Object {} (confidence {:.6}): ({:.6}, {:.6}), ({:.6}, {:.6})",
            self.label, self.confidence, self.x1, self.y1, self.x2, self.y2
        )
    }
}

/// 整数像素矩形, 用于 IoU 计算
///
/// 坐标向零截断, 构造时保证 `x0 <= x1`, `y0 <= y1`。
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Rect {
    pub x0: i64,
    pub y0: i64,
    pub x1: i64,
    pub y1: i64,
}

impl Rect {
    pub fn new(x0: i64, y0: i64, x1: i64, y1: i64) -> Self {
        Self {
            x0: x0.min(x1),
            y0: y0.min(y1),
            x1: x0.max(x1),
            y1: y0.max(y1),
        }
    }

    /// 面积 (f64, 坐标跨度可达 i64 全范围)
    pub fn area(&self) -> f64 {
        (self.x1 as f64 - self.x0 as f64) * (self.y1 as f64 - self.y0 as f64)
    }

    /// 交集面积 (无重叠时为 0)
    pub fn intersection_area(&self, another: &Rect) -> f64 {
        let l = self.x0.max(another.x0);
        let r = self.x1.min(another.x1);
        let t = self.y0.max(another.y0);
        let b = self.y1.min(another.y1);
        if l >= r || t >= b {
            0.0
        } else {
            (r as f64 - l as f64) * (b as f64 - t as f64)
        }
    }

    pub fn iou(&self, another: &Rect) -> f32 {
        let inter = self.intersection_area(another);
        if inter <= 0.0 {
            return 0.0;
        }
        let union = self.area() + another.area() - inter;
        (inter / union) as f32
    }
}

impl From<&Candidate> for Rect {
    fn from(c: &Candidate) -> Self {
        let (x1, y1, x2, y2) = c.corners();
        Rect::new(x1 as i64, y1 as i64, x2 as i64, y2 as i64)
    }
}
