// Chat Queries - 查询定义和处理器

mod get_snapshot;

pub use get_snapshot::*;
