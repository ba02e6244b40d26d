//! Environment-driven settings.
//!
//! Implementation selection (durable vs. in-memory) happens once at
//! process startup based on these values; nothing re-reads the
//! environment after that.

use std::collections::HashMap;
use std::env;
use std::time::Duration;

use tracing::warn;

const DEFAULT_KV_SERVICE_URL: &str = "http://localhost:8786";
const DEFAULT_WEB_APP_URL: &str = "http://localhost:8787";
const DEFAULT_HTTP_TIMEOUT_MS: u64 = 5_000;

#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the kv-service read endpoint (read-back verification).
    pub kv_service_url: String,
    /// Base URL of the web worker (cache purge).
    pub web_app_url: String,
    /// Shared secret for HMAC-signed requests.
    pub secret: String,
    /// Fixed timeout for every outbound HTTP call.
    pub http_timeout: Duration,
    /// Whether the web worker caches pages at all.
    pub with_web_cache: bool,
    /// Use the ephemeral in-memory repository instead of the durable store.
    pub use_in_memory: bool,
}

impl Settings {
    pub fn from_env() -> Self {
        let vars: HashMap<String, String> = env::vars().collect();
        Self::from_lookup(&vars)
    }

    fn from_lookup(vars: &HashMap<String, String>) -> Self {
        let get = |key: &str| vars.get(key).filter(|v| !v.is_empty()).cloned();

        let secret = get("KV_SECRET").unwrap_or_default();
        if secret.is_empty() {
            warn!("KV_SECRET is not set, verification and cache purge will fail");
        }

        let http_timeout = get("HTTP_TIMEOUT_MS")
            .and_then(|v| v.parse::<u64>().ok())
            .unwrap_or(DEFAULT_HTTP_TIMEOUT_MS);

        Self {
            kv_service_url: get("KV_SERVICE_URL")
                .unwrap_or_else(|| DEFAULT_KV_SERVICE_URL.to_string()),
            web_app_url: get("WEB_APP_URL").unwrap_or_else(|| DEFAULT_WEB_APP_URL.to_string()),
            secret,
            http_timeout: Duration::from_millis(http_timeout),
            with_web_cache: get("WITH_WEB_CACHE").is_some_and(|v| v == "true"),
            use_in_memory: get("USE_IN_MEMORY_KV").is_some_and(|v| v == "true"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn lookup(pairs: &[(&str, &str)]) -> HashMap<String, String> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect()
    }

    #[test]
    fn defaults_apply_when_nothing_is_set() {
        let settings = Settings::from_lookup(&lookup(&[]));
        assert_eq!(settings.kv_service_url, DEFAULT_KV_SERVICE_URL);
        assert_eq!(settings.web_app_url, DEFAULT_WEB_APP_URL);
        assert_eq!(settings.secret, "");
        assert_eq!(settings.http_timeout, Duration::from_millis(5_000));
        assert!(!settings.with_web_cache);
        assert!(!settings.use_in_memory);
    }

    #[test]
    fn explicit_values_override_defaults() {
        let settings = Settings::from_lookup(&lookup(&[
            ("KV_SERVICE_URL", "https://kv.example.com"),
            ("KV_SECRET", "s3cret"),
            ("HTTP_TIMEOUT_MS", "250"),
            ("WITH_WEB_CACHE", "true"),
            ("USE_IN_MEMORY_KV", "true"),
        ]));
        assert_eq!(settings.kv_service_url, "https://kv.example.com");
        assert_eq!(settings.secret, "s3cret");
        assert_eq!(settings.http_timeout, Duration::from_millis(250));
        assert!(settings.with_web_cache);
        assert!(settings.use_in_memory);
    }

    #[test]
    fn unparseable_timeout_falls_back_to_default() {
        let settings = Settings::from_lookup(&lookup(&[("HTTP_TIMEOUT_MS", "soon")]));
        assert_eq!(settings.http_timeout, Duration::from_millis(5_000));
    }
}
