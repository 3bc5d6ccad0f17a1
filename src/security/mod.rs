//! Security utilities for HTTP replies

pub mod headers;

pub use headers::api_security_headers;
