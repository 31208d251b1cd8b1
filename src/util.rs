/// Utility helpers used across the collector.
///
/// This module contains:
/// - Record key building
/// - Time helpers
///
/// IMPORTANT:
/// - No wire or broker-specific business logic should live here.
/// - This module must remain lightweight and deterministic.
///
use std::time::{SystemTime, UNIX_EPOCH};

/// Separator between scope and endpoint name in a record key.
///
/// Chosen so it cannot collide with characters the broker allows in
/// either component; changing it changes boundary-dedup behavior for
/// every pass.
pub const KEY_SEPARATOR: &str = "___";

/// Builds the dedup key of a record.
///
/// The same scope/name pair always yields the same key, and two
/// different pairs never collide, so comparing keys is equivalent to
/// comparing record identities.
pub fn record_key(vpn_name: &str, endpoint_name: &str) -> String {
    format!("{}{}{}", vpn_name, KEY_SEPARATOR, endpoint_name)
}

/// Returns the current Unix timestamp in milliseconds.
///
/// PANIC:
/// - Panics if system time is before UNIX_EPOCH (should never happen).
///
pub fn now_ms() -> i64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .expect("System time is before UNIX_EPOCH")
        .as_millis() as i64
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn key_is_deterministic() {
        assert_eq!(record_key("default", "orders"), "default___orders");
        assert_eq!(record_key("default", "orders"), record_key("default", "orders"));
    }

    #[test]
    fn distinct_pairs_yield_distinct_keys() {
        assert_ne!(record_key("a", "b"), record_key("b", "a"));
        assert_ne!(record_key("", "x"), record_key("x", ""));
    }
}
