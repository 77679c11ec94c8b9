//! Field names producers are expected to emit.
//!
//! The vocabulary documents the shape of a log line and backs optional
//! validation. Encoders stay key-agnostic and accept any string.

pub const ACCID: &str = "accid";
pub const CLUSTER: &str = "cluster";
pub const ENVNAME: &str = "envname";
pub const FILE: &str = "file";
/// Nested identity record.
pub const ID: &str = "id";
pub const MARKER: &str = "marker";
pub const NODE: &str = "node";
pub const PRODUCT: &str = "product";
pub const STRIPE: &str = "stripe";

pub const CONTEXT: &str = "context";
pub const EXCEPTION: &str = "exception";
/// Message with arguments substituted.
pub const FORMATTED_MESSAGE: &str = "message";
pub const LEVEL: &str = "level";
pub const LOGGER: &str = "logger";
/// Nested string-to-string context map.
pub const MDC: &str = "mdc";
/// Message template before argument substitution.
pub const MESSAGE: &str = "raw-message";
pub const THREAD: &str = "thread";
pub const TIMESTAMP: &str = "timestamp";

/// Every recognized key, sorted.
pub const SUPPORTED: &[&str] = &[
    ACCID,
    CLUSTER,
    CONTEXT,
    ENVNAME,
    EXCEPTION,
    FILE,
    ID,
    LEVEL,
    LOGGER,
    MARKER,
    MDC,
    FORMATTED_MESSAGE,
    NODE,
    PRODUCT,
    MESSAGE,
    STRIPE,
    THREAD,
    TIMESTAMP,
];

pub fn is_supported(key: &str) -> bool {
    SUPPORTED.binary_search(&key).is_ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn supported_is_a_sorted_set() {
        let unique: HashSet<_> = SUPPORTED.iter().collect();
        assert_eq!(unique.len(), SUPPORTED.len());
        assert!(SUPPORTED.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn lookup() {
        assert!(is_supported("marker"));
        assert!(is_supported("raw-message"));
        assert!(!is_supported("other"));
        assert!(!is_supported("Marker"));
    }
}
