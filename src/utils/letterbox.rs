// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// Letterbox 预处理与坐标还原
// 保持宽高比缩放到正方形画布, 并记录缩放/偏移用于把检测框映射回原图

use image::imageops::{self, FilterType};
use image::{DynamicImage, GenericImageView, Rgba, RgbaImage};

use crate::{Error, Result};

/// 填充颜色 (与 Ultralytics 训练时一致)
pub const PAD_COLOR: Rgba<u8> = Rgba([114, 114, 114, 255]);

/// 一次 letterbox 的几何参数
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LetterboxTransform {
    /// 原图 → 模型输入 的缩放比例
    pub scale: f32,
    /// 水平填充 (左侧)
    pub pad_x: u32,
    /// 垂直填充 (上侧)
    pub pad_y: u32,
}

impl LetterboxTransform {
    /// 原图坐标 → 模型输入坐标
    pub fn to_model(&self, x: f32, y: f32) -> (f32, f32) {
        (
            x * self.scale + self.pad_x as f32,
            y * self.scale + self.pad_y as f32,
        )
    }

    /// 模型输入坐标 → 原图坐标, 结果截断到 `[0, width] × [0, height]`
    pub fn to_original(&self, mx: f32, my: f32, width: u32, height: u32) -> (f32, f32) {
        let x = (mx - self.pad_x as f32) / self.scale;
        let y = (my - self.pad_y as f32) / self.scale;
        (x.clamp(0.0, width as f32), y.clamp(0.0, height as f32))
    }
}

/// 保持宽高比缩放到 `target × target` 的 RGBA 画布, 剩余区域以灰色填充
///
/// 最近邻插值; 缩放后的图像居中放置 (奇数余量时多出的一像素在右/下侧)。
pub fn letterbox(image: &DynamicImage, target: u32) -> Result<(RgbaImage, LetterboxTransform)> {
    let (w0, h0) = image.dimensions();
    if w0 == 0 || h0 == 0 || target == 0 {
        return Err(Error::InvalidImage {
            width: w0,
            height: h0,
        });
    }

    let scale = (target as f64 / w0 as f64).min(target as f64 / h0 as f64);
    let w_new = ((w0 as f64 * scale).round() as u32).clamp(1, target);
    let h_new = ((h0 as f64 * scale).round() as u32).clamp(1, target);
    let pad_x = (target - w_new) / 2;
    let pad_y = (target - h_new) / 2;

    let resized = image.resize_exact(w_new, h_new, FilterType::Nearest).to_rgba8();
    let mut canvas = RgbaImage::from_pixel(target, target, PAD_COLOR);
    imageops::replace(&mut canvas, &resized, pad_x as i64, pad_y as i64);

    Ok((
        canvas,
        LetterboxTransform {
            scale: scale as f32,
            pad_x,
            pad_y,
        },
    ))
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    fn solid(w: u32, h: u32, px: [u8; 4]) -> DynamicImage {
        DynamicImage::ImageRgba8(RgbaImage::from_pixel(w, h, Rgba(px)))
    }

    #[test]
    fn test_letterbox_landscape() {
        let (canvas, t) = letterbox(&solid(1280, 720, [255, 0, 0, 255]), 640).unwrap();
        assert_eq!(canvas.dimensions(), (640, 640));
        assert_eq!(t.scale, 0.5);
        assert_eq!((t.pad_x, t.pad_y), (0, 140));

        // 填充区域与图像区域
        assert_eq!(*canvas.get_pixel(320, 139), PAD_COLOR);
        assert_eq!(*canvas.get_pixel(320, 140), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(320, 499), Rgba([255, 0, 0, 255]));
        assert_eq!(*canvas.get_pixel(320, 500), PAD_COLOR);
    }

    #[test]
    fn test_letterbox_upscale() {
        let (canvas, t) = letterbox(&solid(200, 100, [0, 0, 255, 255]), 300).unwrap();
        assert_eq!(canvas.dimensions(), (300, 300));
        assert_eq!(t.scale, 1.5);
        assert_eq!((t.pad_x, t.pad_y), (0, 75));
    }

    #[test]
    fn test_letterbox_square_has_no_padding() {
        let (_, t) = letterbox(&solid(320, 320, [1, 2, 3, 255]), 640).unwrap();
        assert_eq!(t.scale, 2.0);
        assert_eq!((t.pad_x, t.pad_y), (0, 0));
    }

    #[test]
    fn test_letterbox_does_not_mutate_input() {
        let img = solid(40, 20, [9, 8, 7, 255]);
        let before = img.clone();
        let _ = letterbox(&img, 64).unwrap();
        assert_eq!(img, before);
    }

    #[test]
    fn test_zero_sized_image() {
        let img = DynamicImage::ImageRgba8(RgbaImage::new(0, 10));
        assert!(matches!(
            letterbox(&img, 640),
            Err(Error::InvalidImage { width: 0, height: 10 })
        ));
    }

    #[test]
    fn test_to_original_clamps() {
        let t = LetterboxTransform {
            scale: 0.5,
            pad_x: 0,
            pad_y: 140,
        };
        assert_eq!(t.to_original(320.0, 320.0, 1280, 720), (640.0, 360.0));
        assert_eq!(t.to_original(-10.0, 100.0, 1280, 720), (0.0, 0.0));
        assert_eq!(t.to_original(700.0, 600.0, 1280, 720), (1280.0, 720.0));
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]

        #[test]
        fn letterbox_fills_target(w in 1u32..200, h in 1u32..200, target in 1u32..160) {
            let (canvas, t) = letterbox(&solid(w, h, [10, 20, 30, 255]), target).unwrap();
            prop_assert_eq!(canvas.dimensions(), (target, target));

            let scale = (target as f64 / w as f64).min(target as f64 / h as f64);
            prop_assert_eq!(t.scale, scale as f32);
            let w_new = ((w as f64 * scale).round() as u32).clamp(1, target);
            let h_new = ((h as f64 * scale).round() as u32).clamp(1, target);
            prop_assert!(w_new + 2 * t.pad_x <= target);
            prop_assert!(h_new + 2 * t.pad_y <= target);
            prop_assert!(target - (w_new + 2 * t.pad_x) <= 1);
            prop_assert!(target - (h_new + 2 * t.pad_y) <= 1);
            // 长边贴满画布
            prop_assert!(t.pad_x == 0 || t.pad_y == 0);
        }

        #[test]
        fn model_space_round_trip(
            w in 1u32..4000,
            h in 1u32..4000,
            fx in 0.0f32..=1.0,
            fy in 0.0f32..=1.0,
        ) {
            let target = 640u32;
            let scale = (target as f64 / w as f64).min(target as f64 / h as f64);
            let t = LetterboxTransform {
                scale: scale as f32,
                pad_x: (target - ((w as f64 * scale).round() as u32).clamp(1, target)) / 2,
                pad_y: (target - ((h as f64 * scale).round() as u32).clamp(1, target)) / 2,
            };
            let (x, y) = (fx * w as f32, fy * h as f32);
            let (mx, my) = t.to_model(x, y);
            let (rx, ry) = t.to_original(mx, my, w, h);
            let tol = 1e-3 * (w.max(h) as f32).max(1.0);
            prop_assert!((rx - x).abs() <= tol, "x: {} vs {}", rx, x);
            prop_assert!((ry - y).abs() <= tol, "y: {} vs {}", ry, y);
        }
    }
}
