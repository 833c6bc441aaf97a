// Config Infrastructure Layer
//
// 配置来源的具体实现

mod env_source;
mod memory_source;

pub use env_source::EnvConfigSource;
pub use memory_source::InMemoryConfigSource;
