use crate::encoder::{JsonEncoder, JsonFormatter};
use crate::enricher::{Enricher, EnricherConfig};
use crate::env;
use crate::error::LayoutError;
use crate::event::LogEvent;
use crate::identity::IdentitySource;
use crate::key;
use crate::record::Record;
use chrono::format::{Item, StrftimeItems};
use chrono::{DateTime, FixedOffset, Local, SecondsFormat, TimeZone, Utc};
use chrono_tz::Tz;
use serde::Deserialize;
use std::fmt;
use std::str::FromStr;
use std::sync::Arc;

/// Layout settings, typically loaded by the host's configuration layer.
///
/// `file` and `product` are optional here so a partially filled config
/// can be deserialized; [`JsonLayout::new`] rejects a config without them.
///
/// **Fields**
/// - `timestamp_format`: chrono strftime pattern. Defaults to ISO-8601
///   with milliseconds and a numeric offset (`Z` for UTC).
/// - `timezone`: `UTC`, `local`, a fixed offset such as `+02:00` or an
///   IANA name such as `America/New_York`. When
///   unset, UTC is used if `JSON_LOGGING_UTC=true`, the local zone
///   otherwise.
/// - `context_name`: written as `context` when set.
/// - `include_raw_message`: also write the message template as
///   `raw-message`.
/// - `append_line_separator`: terminate each line with `\n`.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct LayoutConfig {
    pub file: Option<String>,
    pub product: Option<String>,
    pub timestamp_format: Option<String>,
    pub timezone: Option<String>,
    pub context_name: Option<String>,
    pub include_raw_message: bool,
    pub append_line_separator: bool,
}

impl Default for LayoutConfig {
    fn default() -> Self {
        Self {
            file: None,
            product: None,
            timestamp_format: None,
            timezone: None,
            context_name: None,
            include_raw_message: false,
            // 1 log line per line
            append_line_separator: true,
        }
    }
}

impl LayoutConfig {
    pub fn new(file: impl Into<String>, product: impl Into<String>) -> Self {
        Self {
            file: Some(file.into()),
            product: Some(product.into()),
            ..Self::default()
        }
    }

    /// Build a config from `JSON_LOGGING_*` environment variables.
    pub fn from_env() -> Self {
        Self {
            file: env::env_opt(env::JSON_LOGGING_FILE_ENV),
            product: env::env_opt(env::JSON_LOGGING_PRODUCT_ENV),
            timestamp_format: env::env_opt(env::JSON_LOGGING_TIMESTAMP_FORMAT_ENV),
            timezone: env::env_opt(env::JSON_LOGGING_TIMEZONE_ENV),
            context_name: env::env_opt(env::JSON_LOGGING_CONTEXT_ENV),
            ..Self::default()
        }
    }
}

/// Timezone used to render the `timestamp` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimestampZone {
    Utc,
    Local,
    Fixed(FixedOffset),
    /// IANA zone such as `Europe/Paris`, daylight saving applied.
    Named(Tz),
}

impl TimestampZone {
    /// Pick the configured zone, or fall back to UTC / local depending on
    /// `prefer_utc`.
    pub fn resolve(configured: Option<&str>, prefer_utc: bool) -> Result<Self, LayoutError> {
        match configured {
            Some(tz) => tz.parse(),
            None if prefer_utc => Ok(TimestampZone::Utc),
            None => Ok(TimestampZone::Local),
        }
    }
}

impl FromStr for TimestampZone {
    type Err = LayoutError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || LayoutError::InvalidTimezone(s.to_string());
        let trimmed = s.trim();
        if trimmed.eq_ignore_ascii_case("utc") || trimmed == "Z" {
            return Ok(TimestampZone::Utc);
        }
        if trimmed.eq_ignore_ascii_case("local") {
            return Ok(TimestampZone::Local);
        }

        // [+-]HH[:MM] or [+-]HHMM, anything else must be an IANA name
        let (sign, rest) = match trimmed.as_bytes().first() {
            Some(b'+') => (1, &trimmed[1..]),
            Some(b'-') => (-1, &trimmed[1..]),
            _ => return trimmed.parse::<Tz>().map(TimestampZone::Named).map_err(|_| invalid()),
        };
        let digits: String = rest.chars().filter(|c| *c != ':').collect();
        if !digits.chars().all(|c| c.is_ascii_digit()) || !matches!(digits.len(), 2 | 4) {
            return Err(invalid());
        }
        let hours: i32 = digits[..2].parse().map_err(|_| invalid())?;
        let minutes: i32 = if digits.len() == 4 { digits[2..].parse().map_err(|_| invalid())? } else { 0 };
        if minutes >= 60 {
            return Err(invalid());
        }
        FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .map(TimestampZone::Fixed)
            .ok_or_else(invalid)
    }
}

/// Turns [`LogEvent`]s into single-line JSON.
///
/// Base fields come from the event, the [`Enricher`] adds the
/// deployment fields, and the [`JsonFormatter`] renders the result.
pub struct JsonLayout {
    enricher: Enricher,
    formatter: Arc<dyn JsonFormatter>,
    zone: TimestampZone,
    timestamp_format: Option<String>,
    context_name: Option<String>,
    include_raw_message: bool,
    append_line_separator: bool,
}

impl JsonLayout {
    /// Validate `config` and build a layout that renders with
    /// [`JsonEncoder`].
    ///
    /// **Errors**
    /// - [`LayoutError::MissingConfiguration`] if `file` or `product` is
    ///   missing.
    /// - [`LayoutError::InvalidTimezone`] / [`LayoutError::InvalidTimestampFormat`]
    ///   for settings that cannot be applied.
    pub fn new(config: LayoutConfig, identity: Arc<dyn IdentitySource>) -> Result<Self, LayoutError> {
        let enricher = Enricher::new(
            EnricherConfig { file: config.file, product: config.product },
            identity,
        )?;

        let zone = TimestampZone::resolve(
            config.timezone.as_deref(),
            env::env_flag(env::JSON_LOGGING_UTC_ENV),
        )?;

        if let Some(pattern) = &config.timestamp_format {
            if StrftimeItems::new(pattern).any(|item| matches!(item, Item::Error)) {
                return Err(LayoutError::InvalidTimestampFormat(pattern.clone()));
            }
        }

        Ok(JsonLayout {
            enricher,
            formatter: Arc::new(JsonEncoder),
            zone,
            timestamp_format: config.timestamp_format,
            context_name: config.context_name,
            include_raw_message: config.include_raw_message,
            append_line_separator: config.append_line_separator,
        })
    }

    /// Replace the formatter, e.g. with the `serde_json` reference one.
    pub fn with_formatter(mut self, formatter: Arc<dyn JsonFormatter>) -> Self {
        self.formatter = formatter;
        self
    }

    pub fn zone(&self) -> TimestampZone {
        self.zone
    }

    /// Fields contributed by the host event itself.
    pub fn base_record(&self, event: &LogEvent) -> Record {
        let mut record = Record::with_capacity(12);
        record.insert(key::TIMESTAMP, self.format_timestamp(event.timestamp));
        record.insert(key::LEVEL, event.level.as_str());
        record.insert(key::THREAD, event.thread.as_str());
        record.insert(key::LOGGER, event.logger.as_str());
        record.insert(key::FORMATTED_MESSAGE, event.message.as_str());
        if self.include_raw_message {
            if let Some(raw) = &event.raw_message {
                record.insert(key::MESSAGE, raw.as_str());
            }
        }
        if !event.mdc.is_empty() {
            record.insert(key::MDC, event.mdc.clone());
        }
        if let Some(exception) = &event.exception {
            record.insert(key::EXCEPTION, exception.as_str());
        }
        if let Some(context) = &self.context_name {
            record.insert(key::CONTEXT, context.as_str());
        }
        record
    }

    /// Base fields plus enrichment, ready for encoding.
    pub fn to_record(&self, event: &LogEvent) -> Record {
        self.enricher.enrich(event, self.base_record(event))
    }

    /// Render `event` as one JSON line.
    pub fn format(&self, event: &LogEvent) -> String {
        let mut line = self.formatter.to_json_string(&self.to_record(event));
        if self.append_line_separator {
            line.push('\n');
        }
        line
    }

    fn format_timestamp(&self, ts: DateTime<Utc>) -> String {
        match self.zone {
            TimestampZone::Utc => self.format_in(ts),
            TimestampZone::Local => self.format_in(ts.with_timezone(&Local)),
            TimestampZone::Fixed(offset) => self.format_in(ts.with_timezone(&offset)),
            TimestampZone::Named(tz) => self.format_in(ts.with_timezone(&tz)),
        }
    }

    fn format_in<Z: TimeZone>(&self, ts: DateTime<Z>) -> String
    where
        Z::Offset: fmt::Display,
    {
        match &self.timestamp_format {
            Some(pattern) => ts.format(pattern).to_string(),
            None => ts.to_rfc3339_opts(SecondsFormat::Millis, true),
        }
    }
}
