// Chat Commands - 命令定义和处理器

mod cancel_generation;
mod open_session;
mod send_message;

pub use cancel_generation::*;
pub use open_session::*;
pub use send_message::*;
