//! Fixed-window rate limiting backed by Redis.

use std::net::SocketAddr;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

use common::AppError;

use crate::state::AppState;

/// Rate limit middleware for general endpoints.
pub async fn rate_limit_middleware(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let max_requests = state.rate_limit.max_requests;
    let window_seconds = state.rate_limit.window_seconds;
    limit(state, connect_info, request, next, max_requests, window_seconds).await
}

/// Rate limit middleware for auth endpoints (stricter).
pub async fn rate_limit_auth_middleware(
    State(state): State<AppState>,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
) -> Response {
    let max_requests = state.rate_limit.auth_max_requests;
    let window_seconds = state.rate_limit.auth_window_seconds;
    limit(state, connect_info, request, next, max_requests, window_seconds).await
}

async fn limit(
    state: AppState,
    connect_info: Option<ConnectInfo<SocketAddr>>,
    request: Request,
    next: Next,
    max_requests: u64,
    window_seconds: u64,
) -> Response {
    let Some(cache) = state.cache.as_ref() else {
        return next.run(request).await;
    };

    let ip = client_ip(request.headers(), connect_info.map(|ConnectInfo(addr)| addr))
        .unwrap_or_else(|| "unknown".to_string());
    let identifier = format!("{}:{}", request.uri().path(), ip);

    // Fail closed when Redis is unreachable
    let (count, allowed) = match cache
        .check_rate_limit(&identifier, max_requests, window_seconds)
        .await
    {
        Ok(result) => result,
        Err(e) => {
            warn!(error = %e, "Rate limiter unavailable, rejecting request");
            return too_many_requests(max_requests, window_seconds);
        }
    };

    if !allowed {
        warn!(ip = %ip, path = %request.uri().path(), "Rate limit exceeded");
        return too_many_requests(max_requests, window_seconds);
    }

    let mut response = next.run(request).await;
    let headers = response.headers_mut();
    headers.insert("X-RateLimit-Limit", HeaderValue::from(max_requests));
    headers.insert(
        "X-RateLimit-Remaining",
        HeaderValue::from(max_requests.saturating_sub(count)),
    );

    response
}

/// Client address: `X-Forwarded-For`, then `X-Real-IP`, then the socket peer.
pub fn client_ip(headers: &HeaderMap, peer: Option<SocketAddr>) -> Option<String> {
    let forwarded = headers
        .get("X-Forwarded-For")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.split(',').next())
        .map(str::trim)
        .filter(|ip| !ip.is_empty());
    if let Some(ip) = forwarded {
        return Some(ip.to_string());
    }

    if let Some(real_ip) = headers.get("X-Real-IP").and_then(|h| h.to_str().ok()) {
        return Some(real_ip.to_string());
    }

    peer.map(|addr| addr.ip().to_string())
}

fn too_many_requests(max_requests: u64, window_seconds: u64) -> Response {
    let mut response = AppError::TooManyRequests.into_response();

    let headers = response.headers_mut();
    headers.insert("Retry-After", HeaderValue::from(window_seconds));
    headers.insert("X-RateLimit-Remaining", HeaderValue::from_static("0"));
    headers.insert("X-RateLimit-Limit", HeaderValue::from(max_requests));

    response
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    #[test]
    fn test_client_ip_prefers_forwarded_for() {
        let mut headers = HeaderMap::new();
        headers.insert("X-Forwarded-For", HeaderValue::from_static("203.0.113.7, 10.0.0.1"));
        headers.insert("X-Real-IP", HeaderValue::from_static("10.0.0.2"));
        let peer: SocketAddr = "127.0.0.1:4000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer)).as_deref(), Some("203.0.113.7"));
    }

    #[test]
    fn test_client_ip_falls_back_to_peer() {
        let headers = HeaderMap::new();
        let peer: SocketAddr = "192.0.2.10:4000".parse().unwrap();

        assert_eq!(client_ip(&headers, Some(peer)).as_deref(), Some("192.0.2.10"));
        assert_eq!(client_ip(&headers, None), None);
    }

    #[test]
    fn test_rejection_headers() {
        let response = too_many_requests(10, 60);
        assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
        assert_eq!(response.headers()["Retry-After"], "60");
        assert_eq!(response.headers()["X-RateLimit-Remaining"], "0");
    }
}
