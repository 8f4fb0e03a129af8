/// 工具模块
/// Utility modules
pub mod letterbox;
pub mod tensor;

pub use letterbox::{letterbox, LetterboxTransform, PAD_COLOR};
pub use tensor::{pack, pack_into};
