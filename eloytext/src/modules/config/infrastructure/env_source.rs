// Environment Config Source
//
// 从进程环境变量读取配置

use crate::modules::config::ports::ConfigSource;

/// 环境变量配置来源
#[derive(Debug, Default, Clone, Copy)]
pub struct EnvConfigSource;

impl EnvConfigSource {
    pub fn new() -> Self {
        Self
    }
}

impl ConfigSource for EnvConfigSource {
    fn get(&self, key: &str) -> Option<String> {
        std::env::var(key).ok()
    }
}
