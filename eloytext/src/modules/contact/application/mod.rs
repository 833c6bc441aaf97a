// Contact Application Layer

mod controller;

pub use controller::{ContactError, ContactFormController};
