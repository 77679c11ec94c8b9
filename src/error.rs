/// Error type returned when building or using a layout.
///
/// Construction errors are fatal: a layout that fails validation must not
/// be installed. Encoding only fails for a null top-level value.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
pub enum LayoutError {
    #[error("missing required configuration: {0}")]
    MissingConfiguration(&'static str),

    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    #[error("invalid timezone: {0:?}")]
    InvalidTimezone(String),

    #[error("invalid timestamp format: {0:?}")]
    InvalidTimestampFormat(String),
}
