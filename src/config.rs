use serde::Deserialize;

// ------------------------------------------------------------
// Root configuration
// ------------------------------------------------------------
//
// This is the top-level configuration structure loaded from
// `config.json`.
//
// It defines:
// - The broker management endpoint and its credentials
// - The scrape schedule
// - The list of collection targets (filter pairs)
// - Optional debug configuration
//
#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    /// Connection settings for the broker management endpoint
    pub broker: BrokerConfig,

    /// Scrape scheduling
    pub scrape: ScrapeConfig,

    /// Collection targets; each runs its own sequential pass
    pub targets: Vec<TargetConfig>,

    /// Optional debug configuration
    pub debug: Option<DebugConfig>,
}

// ------------------------------------------------------------
// Broker configuration
// ------------------------------------------------------------
//
// Defines how this collector reaches the broker's management
// interface.
//
// Notes:
// - `url` is the base URL; the management path is appended by
//   the transport.
// - Credentials are security-sensitive and must never be
//   committed with the config file.
//
#[derive(Debug, Deserialize, Clone)]
pub struct BrokerConfig {
    /// Base URL of the broker, e.g. "http://broker:8080"
    pub url: String,

    /// Management username (basic auth)
    pub username: String,

    /// Management password (basic auth)
    pub password: String,

    /// Per-request timeout in seconds
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    5
}

// ------------------------------------------------------------
// Scrape configuration
// ------------------------------------------------------------
#[derive(Debug, Deserialize, Clone)]
pub struct ScrapeConfig {
    /// Seconds between scheduled collection rounds
    pub interval_secs: u64,
}

// ------------------------------------------------------------
// Target configuration
// ------------------------------------------------------------
//
// One entry per collection target. A target is a pair of broker
// filters; each target is walked independently and sequentially.
//
// IMPORTANT:
// - Filters are broker-side expressions ("*" matches all).
// - A broad filter can page through a large number of endpoints
//   and put noticeable load on the broker.
//
#[derive(Debug, Deserialize, Clone)]
pub struct TargetConfig {
    /// Scope (VPN) filter expression
    #[serde(default = "default_filter")]
    pub vpn_filter: String,

    /// Endpoint name filter expression
    #[serde(default = "default_filter")]
    pub endpoint_filter: String,
}

fn default_filter() -> String {
    "*".to_string()
}

// ------------------------------------------------------------
// Debug configuration
// ------------------------------------------------------------
//
// Optional debug flags used during development and testing.
//
#[derive(Debug, Deserialize, Clone)]
pub struct DebugConfig {
    /// Dumps the rendered metric registry after each round
    pub log: Option<bool>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn minimal_config_gets_defaults() {
        let raw = r#"{
            "broker": {"url": "http://broker:8080", "username": "admin", "password": "admin"},
            "scrape": {"interval_secs": 60},
            "targets": [{}]
        }"#;

        let cfg: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.broker.timeout_secs, 5);
        assert_eq!(cfg.targets[0].vpn_filter, "*");
        assert_eq!(cfg.targets[0].endpoint_filter, "*");
        assert!(cfg.debug.is_none());
    }

    #[test]
    fn explicit_values_are_kept() {
        let raw = r#"{
            "broker": {"url": "http://broker:8080", "username": "admin", "password": "admin", "timeout_secs": 30},
            "scrape": {"interval_secs": 10},
            "targets": [{"vpn_filter": "prod", "endpoint_filter": "orders*"}]
        }"#;

        let cfg: Config = serde_json::from_str(raw).unwrap();
        assert_eq!(cfg.broker.timeout_secs, 30);
        assert_eq!(cfg.targets[0].vpn_filter, "prod");
        assert_eq!(cfg.targets[0].endpoint_filter, "orders*");
    }
}
