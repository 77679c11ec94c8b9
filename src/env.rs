//! Environment variable names used by this crate for configuring the
//! layout and identity fields from deployment environments.
//!
//! These are purely helpers; the layout and enricher themselves take
//! explicit configuration and an injected identity source.

/// Required source file identifier written as `file`.
pub const JSON_LOGGING_FILE_ENV: &str = "JSON_LOGGING_FILE";

/// Required product identifier written as `id.product`.
pub const JSON_LOGGING_PRODUCT_ENV: &str = "JSON_LOGGING_PRODUCT";

/// When `true` and no timezone is configured, timestamps are written in UTC.
pub const JSON_LOGGING_UTC_ENV: &str = "JSON_LOGGING_UTC";

/// Optional timezone: `UTC`, `local` or a fixed offset such as `+02:00`.
pub const JSON_LOGGING_TIMEZONE_ENV: &str = "JSON_LOGGING_TIMEZONE";

/// Optional chrono strftime pattern for the `timestamp` field.
pub const JSON_LOGGING_TIMESTAMP_FORMAT_ENV: &str = "JSON_LOGGING_TIMESTAMP_FORMAT";

/// Optional logging context name written as `context`.
pub const JSON_LOGGING_CONTEXT_ENV: &str = "JSON_LOGGING_CONTEXT";

/// Account identifier written as `accid`.
pub const JSON_LOGGING_ACCID_ENV: &str = "JSON_LOGGING_ACCID";

/// Environment name written as `envname`.
pub const JSON_LOGGING_ENVNAME_ENV: &str = "JSON_LOGGING_ENVNAME";

/// Node identifier written as `id.node`.
pub const JSON_LOGGING_NODE_ENV: &str = "JSON_LOGGING_NODE";

/// Stripe identifier written as `id.stripe`.
pub const JSON_LOGGING_STRIPE_ENV: &str = "JSON_LOGGING_STRIPE";

/// Cluster identifier written as `id.cluster`.
pub const JSON_LOGGING_CLUSTER_ENV: &str = "JSON_LOGGING_CLUSTER";

/// Read an environment variable or fall back to a provided default.
pub fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

/// Read an environment variable, treating unset and empty as absent.
pub fn env_opt(key: &str) -> Option<String> {
    std::env::var(key).ok().filter(|v| !v.is_empty())
}

/// `true` only when the variable is exactly `true`.
pub fn env_flag(key: &str) -> bool {
    env_or(key, "false") == "true"
}
