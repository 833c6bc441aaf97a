// Contact Ports Layer

mod form_endpoint;

pub use form_endpoint::*;
