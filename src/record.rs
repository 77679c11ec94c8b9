use serde::ser::{Serialize, SerializeMap, Serializer};
use std::collections::{BTreeMap, HashMap};
use std::fmt;

/// Field values a [`Record`] can hold.
///
/// Only null, text and nested records are modeled. Everything else is
/// coerced to its text form on the way in so that no field is ever dropped
/// from a log line because of its type.
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Text(String),
    Object(Record),
}

impl Value {
    /// Coerce any displayable value into [`Value::Text`].
    pub fn display<T: fmt::Display + ?Sized>(value: &T) -> Self {
        Value::Text(value.to_string())
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_object(&self) -> Option<&Record> {
        match self {
            Value::Object(r) => Some(r),
            _ => None,
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&String> for Value {
    fn from(s: &String) -> Self {
        Value::Text(s.clone())
    }
}

impl From<Record> for Value {
    fn from(r: Record) -> Self {
        Value::Object(r)
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(v: Option<T>) -> Self {
        v.map(Into::into).unwrap_or(Value::Null)
    }
}

macro_rules! coerce_to_text {
    ($($t:ty),*) => {
        $(
            impl From<$t> for Value {
                fn from(v: $t) -> Self {
                    Value::display(&v)
                }
            }
        )*
    };
}

coerce_to_text!(bool, char, i32, i64, u32, u64, usize, f32, f64);

impl From<BTreeMap<String, String>> for Value {
    fn from(map: BTreeMap<String, String>) -> Self {
        Value::Object(map.into_iter().collect())
    }
}

#[cfg(feature = "serde-json")]
impl From<serde_json::Value> for Value {
    fn from(v: serde_json::Value) -> Self {
        match v {
            serde_json::Value::Null => Value::Null,
            serde_json::Value::String(s) => Value::Text(s),
            serde_json::Value::Object(map) => Value::Object(map.into_iter().collect()),
            // numbers, booleans and arrays keep their JSON text form
            other => Value::Text(other.to_string()),
        }
    }
}

/// One log event's fields right before JSON encoding.
///
/// Insertion order carries no meaning: encoders emit keys sorted, so two
/// records with the same entries always produce the same text.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Record {
    fields: HashMap<String, Value>,
}

impl Record {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_capacity(capacity: usize) -> Self {
        Record { fields: HashMap::with_capacity(capacity) }
    }

    /// Insert a field, returning the previous value for that key if any.
    pub fn insert(&mut self, key: impl Into<String>, value: impl Into<Value>) -> Option<Value> {
        self.fields.insert(key.into(), value.into())
    }

    pub fn get(&self, key: &str) -> Option<&Value> {
        self.fields.get(key)
    }

    pub fn remove(&mut self, key: &str) -> Option<Value> {
        self.fields.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.fields.contains_key(key)
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Entries in unspecified order.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.fields.iter()
    }

    /// Entries sorted by key in code-point order.
    pub fn sorted_entries(&self) -> Vec<(&String, &Value)> {
        let mut entries: Vec<_> = self.fields.iter().collect();
        // UTF-8 byte order is code-point order
        entries.sort_unstable_by(|a, b| a.0.cmp(b.0));
        entries
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Record {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut record = Record::new();
        for (k, v) in iter {
            record.insert(k, v);
        }
        record
    }
}

impl<K: Into<String>, V: Into<Value>> Extend<(K, V)> for Record {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (k, v) in iter {
            self.insert(k, v);
        }
    }
}

impl Serialize for Value {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Value::Null => serializer.serialize_unit(),
            Value::Text(s) => serializer.serialize_str(s),
            Value::Object(r) => r.serialize(serializer),
        }
    }
}

impl Serialize for Record {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let entries = self.sorted_entries();
        let mut map = serializer.serialize_map(Some(entries.len()))?;
        for (k, v) in entries {
            map.serialize_entry(k, v)?;
        }
        map.end()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn unsupported_types_become_text() {
        assert_eq!(Value::from(42i64), Value::Text("42".into()));
        assert_eq!(Value::from(true), Value::Text("true".into()));
        assert_eq!(Value::from(1.5f64), Value::Text("1.5".into()));
        assert_eq!(Value::from(None::<String>), Value::Null);
    }

    #[test]
    fn sorted_entries_ignore_insertion_order() {
        let mut r = Record::new();
        r.insert("zeta", "1");
        r.insert("alpha", "2");
        r.insert("Mid", "3");
        let keys: Vec<_> = r.sorted_entries().into_iter().map(|(k, _)| k.as_str()).collect();
        assert_eq!(keys, vec!["Mid", "alpha", "zeta"]);
    }

    #[test]
    fn insert_replaces_previous_value() {
        let mut r = Record::new();
        assert!(r.insert("k", "a").is_none());
        assert_eq!(r.insert("k", "b"), Some(Value::from("a")));
        assert_eq!(r.len(), 1);
    }

    #[cfg(feature = "serde-json")]
    #[test]
    fn serde_json_values_degrade_to_text() {
        let v: Value = serde_json::json!({"n": 3, "b": false, "a": [1, "x"], "o": {"s": "t"}, "z": null}).into();
        let r = v.as_object().unwrap();
        assert_eq!(r.get("n"), Some(&Value::from("3")));
        assert_eq!(r.get("b"), Some(&Value::from("false")));
        assert_eq!(r.get("a"), Some(&Value::from("[1,\"x\"]")));
        assert_eq!(r.get("o").and_then(Value::as_object).and_then(|o| o.get("s")), Some(&Value::from("t")));
        assert!(r.get("z").unwrap().is_null());
    }
}
