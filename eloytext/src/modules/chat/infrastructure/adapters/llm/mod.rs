// Model Adapters
// 生成式模型提供商的适配器实现

mod gemini;
mod scripted;

pub use gemini::*;
pub use scripted::*;
