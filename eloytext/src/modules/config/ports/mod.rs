// Config Ports Layer

mod config_source;

pub use config_source::*;
