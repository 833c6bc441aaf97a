// Modules Layer - 业务模块
//
// 按照六边形架构组织的业务模块：
// - chat: 聊天模块，管理会话和流式回复
// - config: 配置模块，从环境加载站点配置
// - contact: 联系表单模块，校验并提交表单
// - page: 页面模块，区块显现和聊天启动按钮

pub mod chat;
pub mod config;
pub mod contact;
pub mod page;

pub use chat::ChatModule;
pub use config::ConfigModule;
pub use contact::ContactModule;
pub use page::PageModule;
