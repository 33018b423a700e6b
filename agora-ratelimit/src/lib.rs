//! # Agora Rate Limiting
//!
//! Fixed-window request counters keyed by client and route.
//!
//! A window opens on a client's first request to a route and lasts for the
//! policy's interval. Requests inside the window are counted against the
//! policy's maximum; once the interval has elapsed the next request opens a
//! fresh window. Expired windows are swept periodically.
//!
//! ## Example
//!
//! ```rust
//! use std::time::Duration;
//! use agora_ratelimit::{RateLimiter, RateLimitPolicy};
//!
//! let limiter = RateLimiter::new();
//! let policy = RateLimitPolicy::new(2, Duration::from_secs(60));
//!
//! assert!(limiter.check("10.0.0.1", "/api/v1/translate", &policy).allowed);
//! assert!(limiter.check("10.0.0.1", "/api/v1/translate", &policy).allowed);
//! assert!(!limiter.check("10.0.0.1", "/api/v1/translate", &policy).allowed);
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs, rust_2018_idioms)]

mod limiter;
mod policy;

pub use limiter::{RateLimitDecision, RateLimiter};
pub use policy::{RateLimitPolicy, RoutePolicies, DEFAULT_ROUTE_KEY};
