//! Security headers for HTTP responses
//!
//! Added to every reply of the JSON API, including error replies.

use warp::http::header::{HeaderMap, HeaderName, HeaderValue};

/// Strict Content Security Policy for API endpoints
const STRICT_CSP: &str = "default-src 'none'; connect-src 'self'; frame-ancestors 'none';";

const PERMISSIONS_POLICY: &str = "geolocation=(), microphone=(), camera=(), payment=(), usb=(), magnetometer=(), gyroscope=(), accelerometer=()";

/// Headers attached to every API reply
pub fn api_security_headers() -> HeaderMap {
    let pairs: [(&'static str, &'static str); 7] = [
        // Prevent clickjacking
        ("x-frame-options", "DENY"),
        // Prevent MIME type sniffing
        ("x-content-type-options", "nosniff"),
        ("x-xss-protection", "1; mode=block"),
        ("referrer-policy", "no-referrer"),
        ("content-security-policy", STRICT_CSP),
        // Replies may carry tokens or personal data
        ("cache-control", "no-cache, no-store, must-revalidate"),
        ("permissions-policy", PERMISSIONS_POLICY),
    ];

    let mut headers = HeaderMap::new();
    for (name, value) in pairs {
        headers.insert(
            HeaderName::from_static(name),
            HeaderValue::from_static(value),
        );
    }
    headers
}
