// Chat Ports Layer
// 端口定义了模块与外部世界的接口

mod llm_port;
mod subscription;

pub use llm_port::*;
pub use subscription::*;
