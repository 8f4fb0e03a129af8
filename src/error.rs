// Ultralytics 🚀 AGPL-3.0 License - https://ultralytics.com/license
//
// 错误类型 (Error types)

/// 推理流水线错误
#[derive(thiserror::Error, Debug)]
pub enum Error {
    /// 缓冲区长度/张量形状/类别数量不一致
    #[error("configuration mismatch: {0}")]
    ConfigurationMismatch(String),

    /// 推理引擎执行失败 (附带后端错误信息)
    #[error("engine execution failed: {0}")]
    EngineExecution(String),

    /// 模型加载失败
    #[error("failed to load model: {0}")]
    ModelLoad(String),

    #[error("invalid image dimensions: {width}x{height}")]
    InvalidImage { width: u32, height: u32 },

    #[error(transparent)]
    Image(#[from] image::ImageError),
}

impl Error {
    pub(crate) fn mismatch(what: &str, expected: usize, got: usize) -> Self {
        Error::ConfigurationMismatch(format!("{what}: expected {expected}, got {got}"))
    }
}

pub type Result<T> = std::result::Result<T, Error>;
