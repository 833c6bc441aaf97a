// Page Domain Layer

pub mod entities;
pub mod events;
pub mod value_objects;

pub use entities::{ChatLauncher, PageVisibility};
pub use events::PageEvent;
pub use value_objects::{RevealSchedule, Section};
