//! Rate-limit policies and their assignment to routes.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use agora_core::constants::{DEFAULT_RATE_LIMIT_MAX_REQUESTS, DEFAULT_RATE_LIMIT_WINDOW_SECONDS};

/// Route key used when no prefix override matches.
pub const DEFAULT_ROUTE_KEY: &str = "*";

/// Maximum requests allowed in one fixed window.
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct RateLimitPolicy {
    /// Requests allowed per window (0 denies everything)
    pub max_requests: u32,
    /// Window length; deserializing rejects zero
    #[serde(rename = "window_seconds", with = "duration_secs")]
    pub window: Duration,
}

impl RateLimitPolicy {
    /// Creates a policy.
    pub fn new(max_requests: u32, window: Duration) -> Self {
        Self {
            max_requests,
            window,
        }
    }
}

impl Default for RateLimitPolicy {
    fn default() -> Self {
        Self::new(
            DEFAULT_RATE_LIMIT_MAX_REQUESTS,
            Duration::from_secs(DEFAULT_RATE_LIMIT_WINDOW_SECONDS),
        )
    }
}

mod duration_secs {
    use std::time::Duration;

    use serde::de::Error;
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(d: &Duration, s: S) -> Result<S::Ok, S::Error> {
        s.serialize_u64(d.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(d: D) -> Result<Duration, D::Error> {
        match u64::deserialize(d)? {
            0 => Err(D::Error::custom("window_seconds must be at least 1")),
            secs => Ok(Duration::from_secs(secs)),
        }
    }
}

/// Default policy plus per-path-prefix overrides.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct RoutePolicies {
    default: RateLimitPolicy,
    overrides: Vec<(String, RateLimitPolicy)>,
}

impl RoutePolicies {
    /// Creates a table with only a default policy.
    pub fn new(default: RateLimitPolicy) -> Self {
        Self {
            default,
            overrides: Vec::new(),
        }
    }

    /// Adds (or replaces) the policy for a path prefix.
    pub fn with_route(mut self, prefix: impl Into<String>, policy: RateLimitPolicy) -> Self {
        let prefix = prefix.into();
        self.overrides.retain(|(p, _)| *p != prefix);
        self.overrides.push((prefix, policy));
        self
    }

    /// Returns the default policy.
    pub fn default_policy(&self) -> &RateLimitPolicy {
        &self.default
    }

    /// Finds the policy for a request path.
    ///
    /// Returns the route key (the longest matching prefix, or
    /// [`DEFAULT_ROUTE_KEY`]) together with its policy. Prefixes match on
    /// whole path segments: `/api/v1/translate` covers
    /// `/api/v1/translate/batch` but not `/api/v1/translated`.
    pub fn resolve(&self, path: &str) -> (&str, &RateLimitPolicy) {
        self.overrides
            .iter()
            .filter(|(prefix, _)| Self::covers(prefix, path))
            .max_by_key(|(prefix, _)| prefix.len())
            .map(|(prefix, policy)| (prefix.as_str(), policy))
            .unwrap_or((DEFAULT_ROUTE_KEY, &self.default))
    }

    fn covers(prefix: &str, path: &str) -> bool {
        match path.strip_prefix(prefix) {
            Some(rest) => rest.is_empty() || rest.starts_with('/') || prefix.ends_with('/'),
            None => false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use test_case::test_case;

    fn policies() -> RoutePolicies {
        RoutePolicies::new(RateLimitPolicy::new(100, Duration::from_secs(900)))
            .with_route("/api/v1/translate", RateLimitPolicy::new(30, Duration::from_secs(900)))
            .with_route("/api/v1/translate/batch", RateLimitPolicy::new(5, Duration::from_secs(900)))
    }

    #[test_case("/api/v1/translate", "/api/v1/translate", 30 ; "exact")]
    #[test_case("/api/v1/translate/languages", "/api/v1/translate", 30 ; "child path")]
    #[test_case("/api/v1/translate/batch", "/api/v1/translate/batch", 5 ; "longest prefix wins")]
    #[test_case("/api/v1/translated", "*", 100 ; "segment boundary")]
    #[test_case("/api/v1/cache/stats", "*", 100 ; "default")]
    fn test_resolve(path: &str, key: &str, max: u32) {
        let table = policies();
        let (route, policy) = table.resolve(path);
        assert_eq!(route, key);
        assert_eq!(policy.max_requests, max);
    }

    #[test]
    fn test_with_route_replaces() {
        let table = policies().with_route("/api/v1/translate", RateLimitPolicy::new(1, Duration::from_secs(1)));
        assert_eq!(table.resolve("/api/v1/translate").1.max_requests, 1);
    }

    #[test]
    fn test_policy_serde_uses_seconds() {
        let policy = RateLimitPolicy::new(10, Duration::from_secs(60));
        let json = serde_json::to_value(&policy).unwrap();
        assert_eq!(json["window_seconds"], 60);
        let back: RateLimitPolicy = serde_json::from_value(json).unwrap();
        assert_eq!(back, policy);
    }

    #[test]
    fn test_policy_serde_rejects_zero_window() {
        let json = serde_json::json!({ "max_requests": 10, "window_seconds": 0 });
        assert!(serde_json::from_value::<RateLimitPolicy>(json).is_err());
    }
}
