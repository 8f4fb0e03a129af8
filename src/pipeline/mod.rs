/// 检测流水线 (Detection Pipeline)
///
/// 单线程同步执行:
/// - Letterbox: 等比缩放 + 灰色填充
/// - Pack:      HWC u8 → CHW f32
/// - Engine:    ONNX Runtime (或任意 `Engine` 实现)
/// - Decode/NMS/Unmap: 输出张量 → 原图坐标检测框
pub mod detector;

pub use detector::YOLO;
