// File: gzsurvey-core/src/api/cors.rs

use std::sync::Arc;
use std::time::Duration;
use axum::http::{header, request::Parts, HeaderName, HeaderValue, Method};
use tower_http::cors::{AllowOrigin, CorsLayer};
use crate::config::CorsConfig;

/// Credentialed CORS restricted to the configured origins.
///
/// The allowed origin is echoed back only when it matches. The literal
/// `null` origin (file:// pages, sandboxed frames) is never echoed.
pub fn cors_layer(config: &CorsConfig) -> CorsLayer {
    let config = Arc::new(config.clone());
    CorsLayer::new()
        .allow_origin(AllowOrigin::predicate(move |origin: &HeaderValue, _: &Parts| {
            origin
                .to_str()
                .map(|o| is_origin_allowed(&config, o))
                .unwrap_or(false)
        }))
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([
            header::AUTHORIZATION,
            header::CONTENT_TYPE,
            HeaderName::from_static("x-client-info"),
            HeaderName::from_static("apikey"),
        ])
        .allow_credentials(true)
        .max_age(Duration::from_secs(60 * 60))
}

pub fn is_origin_allowed(config: &CorsConfig, origin: &str) -> bool {
    if origin == "null" || origin.is_empty() {
        return false;
    }
    if config.allowed_origins.iter().any(|o| o == origin) {
        return true;
    }
    config.allow_localhost && is_loopback_origin(origin)
}

/// `http(s)://localhost[:port]` or `http(s)://127.0.0.1[:port]`, nothing else.
fn is_loopback_origin(origin: &str) -> bool {
    let Some(rest) = origin
        .strip_prefix("http://")
        .or_else(|| origin.strip_prefix("https://"))
    else {
        return false;
    };
    let (host, port) = match rest.split_once(':') {
        Some((host, port)) => (host, Some(port)),
        None => (rest, None),
    };
    let port_ok = port.is_none_or(|p| !p.is_empty() && p.len() <= 5 && p.bytes().all(|b| b.is_ascii_digit()));
    (host == "localhost" || host == "127.0.0.1") && port_ok
}
