pub mod event_bus;
pub mod state;

pub use event_bus::{AppEvent, EventBus};
pub use state::AppState;
