// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// 图像 → 平面 (CHW) f32 张量

use image::{DynamicImage, GenericImageView};

use crate::{Error, Result};

/// 把图像打包为 `[R平面, G平面, B平面]`, 每个值为 `byte / 255.0`
pub fn pack(image: &DynamicImage) -> Vec<f32> {
    let (w, h) = image.dimensions();
    let mut out = vec![0.0f32; 3 * w as usize * h as usize];
    fill(image, &mut out);
    out
}

/// 与 [`pack`] 相同, 但写入调用方提供的缓冲区
pub fn pack_into(image: &DynamicImage, out: &mut [f32]) -> Result<()> {
    let (w, h) = image.dimensions();
    let expected = 3 * w as usize * h as usize;
    if out.len() != expected {
        return Err(Error::mismatch("packed tensor length", expected, out.len()));
    }
    fill(image, out);
    Ok(())
}

fn fill(image: &DynamicImage, out: &mut [f32]) {
    let plane = out.len() / 3;
    let (r, rest) = out.split_at_mut(plane);
    let (g, b) = rest.split_at_mut(plane);

    match image {
        // 连续内存快速路径
        DynamicImage::ImageRgba8(buf) => {
            for (i, px) in buf.as_raw().chunks_exact(4).enumerate() {
                r[i] = px[0] as f32 / 255.0;
                g[i] = px[1] as f32 / 255.0;
                b[i] = px[2] as f32 / 255.0;
            }
        }
        DynamicImage::ImageRgb8(buf) => {
            for (i, px) in buf.as_raw().chunks_exact(3).enumerate() {
                r[i] = px[0] as f32 / 255.0;
                g[i] = px[1] as f32 / 255.0;
                b[i] = px[2] as f32 / 255.0;
            }
        }
        _ => {
            let w = image.width() as usize;
            for (x, y, rgba) in image.pixels() {
                let i = y as usize * w + x as usize;
                let [cr, cg, cb, _] = rgba.0;
                r[i] = cr as f32 / 255.0;
                g[i] = cg as f32 / 255.0;
                b[i] = cb as f32 / 255.0;
            }
        }
    }
}
