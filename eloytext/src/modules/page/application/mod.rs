// Page Application Layer

mod visibility;

pub use visibility::VisibilityController;
