use crate::error::LayoutError;
use crate::record::{Record, Value};
use std::borrow::Cow;

/// Turns a [`Record`] into a single-line JSON object.
///
/// Implementations must emit keys in ascending code-point order at every
/// nesting level and must not insert whitespace or a trailing newline.
pub trait JsonFormatter: Send + Sync {
    fn to_json_string(&self, record: &Record) -> String;
}

/// Escapes for U+0000..=U+001F, uppercase hex where no short form exists.
const CONTROL_ESCAPES: [&str; 0x20] = [
    "\\u0000", "\\u0001", "\\u0002", "\\u0003", "\\u0004", "\\u0005", "\\u0006", "\\u0007",
    "\\b", "\\t", "\\n", "\\u000B", "\\f", "\\r", "\\u000E", "\\u000F",
    "\\u0010", "\\u0011", "\\u0012", "\\u0013", "\\u0014", "\\u0015", "\\u0016", "\\u0017",
    "\\u0018", "\\u0019", "\\u001A", "\\u001B", "\\u001C", "\\u001D", "\\u001E", "\\u001F",
];

#[inline]
fn escape_of(b: u8) -> Option<&'static str> {
    match b {
        0x00..=0x1F => Some(CONTROL_ESCAPES[b as usize]),
        b'"' => Some("\\\""),
        b'\\' => Some("\\\\"),
        _ => None,
    }
}

/// Escape the body of a JSON string (without the surrounding quotes).
///
/// Single pass over the bytes. Every character that needs escaping is
/// ASCII, so multi-byte UTF-8 sequences are never split and pass through
/// untouched. When nothing needs escaping the input is returned borrowed;
/// otherwise the scanned prefix is copied once and only the remainder is
/// rebuilt.
pub fn escape(s: &str) -> Cow<'_, str> {
    let mut replacement: Option<String> = None;
    let mut last = 0;

    for (i, &b) in s.as_bytes().iter().enumerate() {
        if let Some(escaped) = escape_of(b) {
            let buf = replacement.get_or_insert_with(|| String::with_capacity(s.len() + 8));
            buf.push_str(&s[last..i]);
            buf.push_str(escaped);
            last = i + 1;
        }
    }

    match replacement {
        None => Cow::Borrowed(s),
        Some(mut buf) => {
            buf.push_str(&s[last..]);
            Cow::Owned(buf)
        }
    }
}

/// Quote and escape `s` as a JSON string literal.
pub fn quote(s: &str) -> String {
    let mut out = String::with_capacity(s.len() + 2);
    write_str(&mut out, s);
    out
}

fn write_str(out: &mut String, s: &str) {
    out.push('"');
    out.push_str(&escape(s));
    out.push('"');
}

fn write_value(out: &mut String, value: &Value) {
    match value {
        Value::Null => out.push_str("null"),
        Value::Text(s) => write_str(out, s),
        Value::Object(r) => write_record(out, r),
    }
}

fn write_record(out: &mut String, record: &Record) {
    out.push('{');
    for (i, (key, value)) in record.sorted_entries().into_iter().enumerate() {
        if i > 0 {
            out.push(',');
        }
        write_str(out, key);
        out.push(':');
        write_value(out, value);
    }
    out.push('}');
}

/// Hand-rolled encoder used on the logging hot path.
///
/// Output is identical to a general-purpose JSON serializer configured to
/// sort map keys, with `\u00XX` escapes written in uppercase hex.
#[derive(Debug, Clone, Copy, Default)]
pub struct JsonEncoder;

impl JsonEncoder {
    pub fn new() -> Self {
        JsonEncoder
    }

    pub fn encode(&self, record: &Record) -> String {
        let mut out = String::with_capacity(64 * (record.len() + 1));
        write_record(&mut out, record);
        out
    }

    /// Encode a top-level value.
    ///
    /// A record yields an object literal and text yields a string literal.
    /// A null top-level value is rejected since every log line must
    /// resolve to an object.
    pub fn encode_value(&self, value: &Value) -> Result<String, LayoutError> {
        match value {
            Value::Null => Err(LayoutError::InvalidArgument("cannot encode a null record")),
            Value::Text(s) => Ok(quote(s)),
            Value::Object(r) => Ok(self.encode(r)),
        }
    }
}

impl JsonFormatter for JsonEncoder {
    fn to_json_string(&self, record: &Record) -> String {
        self.encode(record)
    }
}

/// Encode `record` with the default [`JsonEncoder`].
pub fn encode(record: &Record) -> String {
    JsonEncoder.encode(record)
}

/// Reference formatter delegating to `serde_json`.
///
/// Keys are sorted by [`Record`]'s `Serialize` impl. The only difference
/// from [`JsonEncoder`] is that `serde_json` writes `\u00xx` escapes in
/// lowercase hex.
#[cfg(feature = "serde-json")]
#[derive(Debug, Clone, Copy, Default)]
pub struct SerdeJsonFormatter;

#[cfg(feature = "serde-json")]
impl JsonFormatter for SerdeJsonFormatter {
    fn to_json_string(&self, record: &Record) -> String {
        serde_json::to_string(record).unwrap_or_else(|_| "{}".to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record<const N: usize>(pairs: [(&str, Value); N]) -> Record {
        pairs.into_iter().collect()
    }

    #[test]
    fn keys_are_sorted() {
        let r = record([("b", "x".into()), ("a", "y".into())]);
        assert_eq!(encode(&r), r#"{"a":"y","b":"x"}"#);
    }

    #[test]
    fn newline_and_quote_are_escaped() {
        let r = record([("msg", "a\nb\"c".into())]);
        assert_eq!(encode(&r), r#"{"msg":"a\nb\"c"}"#);
    }

    #[test]
    fn null_value() {
        let r = record([("m", Value::Null)]);
        assert_eq!(encode(&r), r#"{"m":null}"#);
    }

    #[test]
    fn empty_record_and_empty_string() {
        assert_eq!(encode(&Record::new()), "{}");
        assert_eq!(encode(&record([("", "".into())])), r#"{"":""}"#);
    }

    #[test]
    fn nested_records_are_sorted_at_every_level() {
        let inner = record([("z", "1".into()), ("b", Value::Null), ("a", Record::new().into())]);
        let r = record([("outer", inner.into()), ("first", "f".into())]);
        assert_eq!(encode(&r), r#"{"first":"f","outer":{"a":{},"b":null,"z":"1"}}"#);
    }

    #[test]
    fn short_escapes() {
        assert_eq!(quote("\"\\\u{8}\u{c}\n\r\t"), r#""\"\\\b\f\n\r\t""#);
    }

    #[test]
    fn other_controls_use_uppercase_hex() {
        assert_eq!(quote("\u{0}"), r#""\u0000""#);
        assert_eq!(quote("azerty\u{0}"), r#""azerty\u0000""#);
        assert_eq!(quote("\u{0}azerty"), r#""\u0000azerty""#);
        assert_eq!(quote("\u{b}\u{1a}\u{1f}"), r#""\u000B\u001A\u001F""#);
    }

    #[test]
    fn every_control_character_is_escaped() {
        for c in 0u8..0x20 {
            let s = (c as char).to_string();
            let escaped = escape(&s);
            assert!(escaped.starts_with('\\'), "U+{:04X} not escaped", c);
            assert!(matches!(escaped, Cow::Owned(_)));
        }
    }

    #[test]
    fn non_ascii_passes_through() {
        let s = " <>&/azAZ09\u{7f}\u{9f}\u{100}\u{2000}\u{20ff}лицтя😀";
        assert_eq!(quote(s), format!("\"{}\"", s));
    }

    #[test]
    fn unescaped_text_is_borrowed() {
        let s = "plain text, with ünïcödé";
        match escape(s) {
            Cow::Borrowed(b) => assert!(std::ptr::eq(b, s)),
            Cow::Owned(_) => panic!("expected borrowed"),
        }
    }

    #[test]
    fn escape_keeps_surrounding_text() {
        assert_eq!(escape("ab\tcd\\ef"), "ab\\tcd\\\\ef");
        assert_eq!(escape("\n"), "\\n");
    }

    #[test]
    fn encode_value_rejects_null() {
        assert_eq!(
            JsonEncoder.encode_value(&Value::Null),
            Err(LayoutError::InvalidArgument("cannot encode a null record"))
        );
    }

    #[test]
    fn encode_value_text_and_object() {
        assert_eq!(JsonEncoder.encode_value(&"a\nb".into()).unwrap(), r#""a\nb""#);
        let r = record([("k", "v".into())]);
        assert_eq!(JsonEncoder.encode_value(&r.into()).unwrap(), r#"{"k":"v"}"#);
    }

    #[test]
    fn coerced_values_are_quoted() {
        let r = record([("n", 7u64.into()), ("ok", false.into())]);
        assert_eq!(encode(&r), r#"{"n":"7","ok":"false"}"#);
    }

    #[cfg(feature = "serde-json")]
    #[test]
    fn serde_formatter_matches_without_hex_escapes() {
        let r = record([("b", "x\ny\"z\\".into()), ("a", Value::Null), ("c", record([("d", "é".into())]).into())]);
        assert_eq!(SerdeJsonFormatter.to_json_string(&r), JsonEncoder.to_json_string(&r));
    }
}
