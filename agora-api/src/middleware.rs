//! Per-client, per-route rate limiting.

use std::net::SocketAddr;
use std::sync::Arc;

use axum::{
    extract::{ConnectInfo, Request, State},
    http::{HeaderMap, HeaderName, HeaderValue},
    middleware::Next,
    response::{IntoResponse, Response},
};

use agora_ratelimit::RateLimitDecision;

use crate::error::ApiError;
use crate::state::AppState;

/// Only paths under this prefix are counted.
pub const RATE_LIMITED_PREFIX: &str = "/api/";

/// Client key used when no address is known.
pub const ANONYMOUS_CLIENT: &str = "anonymous";

const X_RATELIMIT_LIMIT: HeaderName = HeaderName::from_static("x-ratelimit-limit");
const X_RATELIMIT_REMAINING: HeaderName = HeaderName::from_static("x-ratelimit-remaining");
const X_RATELIMIT_RESET: HeaderName = HeaderName::from_static("x-ratelimit-reset");
const X_FORWARDED_FOR: HeaderName = HeaderName::from_static("x-forwarded-for");

/// Counts the request against its route's policy.
///
/// Allowed requests pass through; denied ones get 429 with `Retry-After`.
/// Both carry the `X-RateLimit-*` headers.
pub async fn rate_limit(State(state): State<Arc<AppState>>, request: Request, next: Next) -> Response {
    if !request.uri().path().starts_with(RATE_LIMITED_PREFIX) {
        return next.run(request).await;
    }

    let client = client_id(&request, state.config.trust_forwarded_for);
    let (route, policy) = state.policies.resolve(request.uri().path());
    let decision = state.limiter.check(&client, route, policy);

    let mut response = if decision.allowed {
        next.run(request).await
    } else {
        let retry_after = decision.retry_after_secs().unwrap_or(1);
        ApiError::too_many_requests(
            format!("Too many requests, retry in {} seconds", retry_after),
            retry_after,
        )
        .into_response()
    };

    apply_headers(response.headers_mut(), &decision);
    response
}

/// Identifies the caller.
///
/// Uses the first `X-Forwarded-For` hop when trusted, then the peer
/// address, then [`ANONYMOUS_CLIENT`].
pub fn client_id(request: &Request, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = request
            .headers()
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|ip| !ip.is_empty());
        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    request
        .extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| ANONYMOUS_CLIENT.to_string())
}

fn apply_headers(headers: &mut HeaderMap, decision: &RateLimitDecision) {
    headers.insert(X_RATELIMIT_LIMIT, HeaderValue::from(decision.limit));
    headers.insert(X_RATELIMIT_REMAINING, HeaderValue::from(decision.remaining));
    headers.insert(X_RATELIMIT_RESET, HeaderValue::from(decision.reset_after_secs()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;

    fn request_with(forwarded: Option<&str>, peer: Option<&str>) -> Request {
        let mut builder = axum::http::Request::builder().uri("/api/v1/translate");
        if let Some(value) = forwarded {
            builder = builder.header("x-forwarded-for", value);
        }
        let mut request = builder.body(Body::empty()).unwrap();
        if let Some(addr) = peer {
            request
                .extensions_mut()
                .insert(ConnectInfo(addr.parse::<SocketAddr>().unwrap()));
        }
        request
    }

    #[test]
    fn test_uses_first_forwarded_hop_when_trusted() {
        let request = request_with(Some(" 203.0.113.7 , 10.0.0.1"), Some("10.0.0.1:4000"));
        assert_eq!(client_id(&request, true), "203.0.113.7");
    }

    #[test]
    fn test_ignores_forwarded_when_untrusted() {
        let request = request_with(Some("203.0.113.7"), Some("10.0.0.1:4000"));
        assert_eq!(client_id(&request, false), "10.0.0.1");
    }

    #[test]
    fn test_empty_forwarded_falls_back_to_peer() {
        let request = request_with(Some(""), Some("[::1]:4000"));
        assert_eq!(client_id(&request, true), "::1");
    }

    #[test]
    fn test_anonymous_without_address() {
        assert_eq!(client_id(&request_with(None, None), true), ANONYMOUS_CLIENT);
    }
}
