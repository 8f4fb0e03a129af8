// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// 推理引擎接口 (Inference engine boundary)

use crate::Result;

/// 推理引擎能力接口
///
/// 引擎独占其输入/输出缓冲区:
/// ```text
/// set_input(planar) → run() → output()
/// ```
/// 一个引擎实例同一时刻只能服务一次推理调用 (`&mut self` 保证),
/// 多个独立实例可以在不同线程中并行运行。
pub trait Engine {
    /// 拷贝平面格式 (CHW) 输入到引擎的输入缓冲区
    ///
    /// 长度与输入张量尺寸不一致时返回 `Error::ConfigurationMismatch`
    fn set_input(&mut self, input: &[f32]) -> Result<()>;

    /// 同步执行模型, 成功后 `output()` 可读
    fn run(&mut self) -> Result<()>;

    /// 当前输出张量的扁平数据 (仅在 `run` 成功后有效)
    fn output(&self) -> &[f32];

    /// 释放后端资源
    fn destroy(self)
    where
        Self: Sized,
    {
        drop(self);
    }
}
