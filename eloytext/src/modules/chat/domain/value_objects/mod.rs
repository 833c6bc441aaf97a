// Chat Domain - Value Objects
// 值对象是不可变的，通过值而非标识来比较

mod ids;
mod session_state;

pub use ids::*;
pub use session_state::*;
