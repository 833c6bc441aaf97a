// Chat Domain - Services
// 领域服务包含不属于单个实体的业务逻辑

mod persona;

pub use persona::*;
