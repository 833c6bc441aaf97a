// Contact Infrastructure Layer

mod http_endpoint;

pub use http_endpoint::HttpFormEndpoint;
