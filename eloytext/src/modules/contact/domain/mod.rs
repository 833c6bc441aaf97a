// Contact Domain Layer

pub mod entities;
pub mod events;
pub mod services;

pub use entities::*;
pub use events::ContactEvent;
pub use services::{FormEncoder, FormValidator};
