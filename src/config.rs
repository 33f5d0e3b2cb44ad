//! Ordered attribute/children trees.
//!
//! A [`Config`] is the in-memory shape of every declarative input the filter
//! engine consumes: unit filters, side and location filters, stored variables
//! and unit snapshots. Attributes are kept sorted by key; children keep their
//! document order across differing tag names, which matters for `[and]`,
//! `[or]` and `[not]` folding.

use std::collections::BTreeMap;
use std::fmt;

/// A scalar attribute value.
///
/// `Blank` is the value of an absent key. It is distinct from an empty string:
/// `x=""` is present-but-empty, while a missing `x` is blank.
#[derive(Debug, Clone, Default)]
pub enum AttributeValue {
    #[default]
    Blank,
    Bool(bool),
    Int(i64),
    Real(f64),
    Str(String),
}

impl AttributeValue {
    /// True when the key was absent.
    pub fn blank(&self) -> bool {
        matches!(self, AttributeValue::Blank)
    }

    /// True when blank or when the printed form is the empty string.
    pub fn empty(&self) -> bool {
        match self {
            AttributeValue::Blank => true,
            AttributeValue::Str(s) => s.is_empty(),
            _ => false,
        }
    }

    /// Printed form. Blank prints as the empty string, bools as `yes`/`no`.
    pub fn str(&self) -> String {
        match self {
            AttributeValue::Blank => String::new(),
            AttributeValue::Bool(b) => if *b { "yes" } else { "no" }.to_string(),
            AttributeValue::Int(n) => n.to_string(),
            AttributeValue::Real(r) => r.to_string(),
            AttributeValue::Str(s) => s.clone(),
        }
    }

    pub fn to_bool(&self, default: bool) -> bool {
        match self {
            AttributeValue::Bool(b) => *b,
            AttributeValue::Int(n) => *n != 0,
            AttributeValue::Str(s) => match s.trim() {
                "yes" | "true" | "on" | "1" => true,
                "no" | "false" | "off" | "0" => false,
                _ => default,
            },
            AttributeValue::Blank | AttributeValue::Real(_) => default,
        }
    }

    pub fn to_int(&self, default: i64) -> i64 {
        match self {
            AttributeValue::Int(n) => *n,
            AttributeValue::Real(r) if r.fract() == 0.0 => *r as i64,
            AttributeValue::Str(s) => s.trim().parse().unwrap_or(default),
            _ => default,
        }
    }

    /// Compare against a literal token, the way the host format does
    /// (`x == "recall"`).
    pub fn is(&self, token: &str) -> bool {
        !self.blank() && self.str() == token
    }
}

impl PartialEq for AttributeValue {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (AttributeValue::Blank, AttributeValue::Blank) => true,
            (AttributeValue::Blank, _) | (_, AttributeValue::Blank) => false,
            _ => self.str() == other.str(),
        }
    }
}

impl fmt::Display for AttributeValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.str())
    }
}

impl From<&str> for AttributeValue {
    fn from(value: &str) -> Self {
        AttributeValue::Str(value.to_string())
    }
}

impl From<String> for AttributeValue {
    fn from(value: String) -> Self {
        AttributeValue::Str(value)
    }
}

impl From<bool> for AttributeValue {
    fn from(value: bool) -> Self {
        AttributeValue::Bool(value)
    }
}

impl From<i64> for AttributeValue {
    fn from(value: i64) -> Self {
        AttributeValue::Int(value)
    }
}

impl From<i32> for AttributeValue {
    fn from(value: i32) -> Self {
        AttributeValue::Int(i64::from(value))
    }
}

impl From<f64> for AttributeValue {
    fn from(value: f64) -> Self {
        AttributeValue::Real(value)
    }
}

static BLANK: AttributeValue = AttributeValue::Blank;

/// An ordered attribute/children tree.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Config {
    attributes: BTreeMap<String, AttributeValue>,
    children: Vec<(String, Config)>,
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// A config with no attributes and no children.
    ///
    /// Filters built from a null config match everything.
    pub fn is_null(&self) -> bool {
        self.attributes.is_empty() && self.children.is_empty()
    }

    /// Builder-style attribute setter.
    pub fn with(mut self, key: impl Into<String>, value: impl Into<AttributeValue>) -> Self {
        self.set(key, value);
        self
    }

    /// Builder-style child appender.
    pub fn with_child(mut self, key: impl Into<String>, child: Config) -> Self {
        self.add_child(key, child);
        self
    }

    pub fn set(&mut self, key: impl Into<String>, value: impl Into<AttributeValue>) {
        let value = value.into();
        let key = key.into();
        if value.blank() {
            self.attributes.remove(&key);
        } else {
            self.attributes.insert(key, value);
        }
    }

    pub fn add_child(&mut self, key: impl Into<String>, child: Config) -> &mut Config {
        self.children.push((key.into(), child));
        let last = self.children.len() - 1;
        &mut self.children[last].1
    }

    /// Attribute lookup; absent keys yield [`AttributeValue::Blank`].
    pub fn get(&self, key: &str) -> &AttributeValue {
        self.attributes.get(key).unwrap_or(&BLANK)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    pub fn attributes(&self) -> impl Iterator<Item = (&str, &AttributeValue)> {
        self.attributes.iter().map(|(k, v)| (k.as_str(), v))
    }

    pub fn attribute_count(&self) -> usize {
        self.attributes.len()
    }

    /// All children in document order.
    pub fn all_children(&self) -> impl Iterator<Item = (&str, &Config)> {
        self.children.iter().map(|(k, c)| (k.as_str(), c))
    }

    pub fn child_count(&self) -> usize {
        self.children.len()
    }

    /// Children with the given tag, in document order.
    pub fn child_range<'a, 'k>(
        &'a self,
        key: &'k str,
    ) -> impl Iterator<Item = &'a Config> + use<'a, 'k> {
        self.children
            .iter()
            .filter(move |(k, _)| k == key)
            .map(|(_, c)| c)
    }

    /// First child with the given tag.
    pub fn child(&self, key: &str) -> Option<&Config> {
        self.child_range(key).next()
    }

    /// Structural match against a pattern tree.
    ///
    /// Every pattern attribute must be present here with an equal value. Every
    /// pattern child must be matched by at least one same-named child here,
    /// except `[not]` children, which must not match this config as a whole.
    /// Keys present here but absent from the pattern are unconstrained.
    pub fn matches(&self, pattern: &Config) -> bool {
        for (key, expected) in pattern.attributes() {
            match self.attributes.get(key) {
                Some(actual) if actual == expected => {}
                _ => return false,
            }
        }

        for (key, sub) in pattern.all_children() {
            if key == "not" {
                if self.matches(sub) {
                    return false;
                }
                continue;
            }
            if !self.child_range(key).any(|child| child.matches(sub)) {
                return false;
            }
        }
        true
    }
}

#[cfg(feature = "serialization")]
mod json {
    use std::fmt;

    use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
    use serde_json::{Map, Number, Value};

    use super::{AttributeValue, Config};

    /// Errors converting between JSON documents and config trees.
    #[derive(Debug, thiserror::Error)]
    pub enum ConfigError {
        #[error("config must be a JSON object or an array of objects, found {0}")]
        NotAnObject(&'static str),
        #[error("unsupported value for key `{key}`: {kind}")]
        UnsupportedValue { key: String, kind: &'static str },
        #[error("malformed JSON: {0}")]
        Json(#[from] serde_json::Error),
    }

    fn kind_of(value: &Value) -> &'static str {
        match value {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Array(_) => "array",
            Value::Object(_) => "object",
        }
    }

    /// A JSON value whose objects never repeat a key.
    struct UniqueKeys(Value);

    impl<'de> Deserialize<'de> for UniqueKeys {
        fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
            deserializer.deserialize_any(UniqueKeysVisitor).map(UniqueKeys)
        }
    }

    struct UniqueKeysVisitor;

    impl<'de> Visitor<'de> for UniqueKeysVisitor {
        type Value = Value;

        fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
            f.write_str("a JSON value without duplicate object keys")
        }

        fn visit_unit<E: de::Error>(self) -> Result<Value, E> {
            Ok(Value::Null)
        }

        fn visit_bool<E: de::Error>(self, v: bool) -> Result<Value, E> {
            Ok(Value::Bool(v))
        }

        fn visit_i64<E: de::Error>(self, v: i64) -> Result<Value, E> {
            Ok(Value::Number(v.into()))
        }

        fn visit_u64<E: de::Error>(self, v: u64) -> Result<Value, E> {
            Ok(Value::Number(v.into()))
        }

        fn visit_f64<E: de::Error>(self, v: f64) -> Result<Value, E> {
            Ok(Number::from_f64(v).map_or(Value::Null, Value::Number))
        }

        fn visit_str<E: de::Error>(self, v: &str) -> Result<Value, E> {
            Ok(Value::String(v.to_string()))
        }

        fn visit_string<E: de::Error>(self, v: String) -> Result<Value, E> {
            Ok(Value::String(v))
        }

        fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Value, A::Error> {
            let mut items = Vec::new();
            while let Some(UniqueKeys(item)) = seq.next_element::<UniqueKeys>()? {
                items.push(item);
            }
            Ok(Value::Array(items))
        }

        fn visit_map<A: MapAccess<'de>>(self, mut access: A) -> Result<Value, A::Error> {
            let mut map = Map::new();
            while let Some(key) = access.next_key::<String>()? {
                if map.contains_key(&key) {
                    return Err(de::Error::custom(format!(
                        "duplicate key `{key}`; use an array of objects to repeat a tag"
                    )));
                }
                let UniqueKeys(value) = access.next_value::<UniqueKeys>()?;
                map.insert(key, value);
            }
            Ok(Value::Object(map))
        }
    }

    impl Config {
        /// Build a config from JSON.
        ///
        /// An object maps scalars to attributes, `null` to blank, objects to a
        /// child with the key as tag, and arrays to repeated children. An array
        /// of objects at any config position is the ordered form: each object
        /// is merged in turn, so `[{"and": {..}}, {"or": {..}}, {"and": {..}}]`
        /// keeps interleaved tags in document order.
        pub fn from_json(value: &Value) -> Result<Config, ConfigError> {
            let mut cfg = Config::new();
            match value {
                Value::Object(map) => cfg.merge_json_object(map)?,
                Value::Array(segments) => {
                    for segment in segments {
                        let Value::Object(map) = segment else {
                            return Err(ConfigError::NotAnObject(kind_of(segment)));
                        };
                        cfg.merge_json_object(map)?;
                    }
                }
                other => return Err(ConfigError::NotAnObject(kind_of(other))),
            }
            Ok(cfg)
        }

        fn merge_json_object(&mut self, map: &Map<String, Value>) -> Result<(), ConfigError> {
            for (key, value) in map {
                match value {
                    Value::Null => {}
                    Value::Bool(b) => self.set(key.clone(), *b),
                    Value::Number(n) => {
                        if let Some(i) = n.as_i64() {
                            self.set(key.clone(), i);
                        } else if let Some(f) = n.as_f64() {
                            self.set(key.clone(), f);
                        }
                    }
                    Value::String(s) => self.set(key.clone(), s.as_str()),
                    Value::Object(_) => {
                        self.add_child(key.clone(), Config::from_json(value)?);
                    }
                    Value::Array(items) => {
                        for item in items {
                            if !(item.is_object() || item.is_array()) {
                                return Err(ConfigError::UnsupportedValue {
                                    key: key.clone(),
                                    kind: kind_of(item),
                                });
                            }
                            self.add_child(key.clone(), Config::from_json(item)?);
                        }
                    }
                }
            }
            Ok(())
        }

        /// Parse JSON text into a config. Unlike [`Config::from_json`], this
        /// sees the raw text, so an object that repeats a key is rejected
        /// instead of silently keeping the last value.
        pub fn from_json_str(text: &str) -> Result<Config, ConfigError> {
            let UniqueKeys(value) = serde_json::from_str::<UniqueKeys>(text)?;
            Config::from_json(&value)
        }

        /// Convert back to JSON. Repeated tags collapse into arrays, so the
        /// relative order of differing tags is not preserved.
        pub fn to_json(&self) -> Value {
            let mut map = Map::new();
            for (key, value) in self.attributes() {
                let json = match value {
                    AttributeValue::Blank => continue,
                    AttributeValue::Bool(b) => Value::Bool(*b),
                    AttributeValue::Int(n) => Value::Number((*n).into()),
                    AttributeValue::Real(r) => {
                        Number::from_f64(*r).map(Value::Number).unwrap_or(Value::Null)
                    }
                    AttributeValue::Str(s) => Value::String(s.clone()),
                };
                map.insert(key.to_string(), json);
            }
            for (key, child) in self.all_children() {
                let count = self.child_range(key).count();
                let json = child.to_json();
                if count == 1 {
                    map.insert(key.to_string(), json);
                } else if let Value::Array(items) = map
                    .entry(key.to_string())
                    .or_insert_with(|| Value::Array(Vec::new()))
                {
                    items.push(json);
                }
            }
            Value::Object(map)
        }
    }
}

#[cfg(feature = "serialization")]
pub use json::ConfigError;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_blank_and_empty_are_distinct() {
        let cfg = Config::new().with("x", "");
        assert!(!cfg.get("x").blank());
        assert!(cfg.get("x").empty());
        assert!(cfg.get("y").blank());
        assert!(cfg.get("y").empty());
    }

    #[test]
    fn test_attribute_conversions() {
        assert!(AttributeValue::from("yes").to_bool(false));
        assert!(!AttributeValue::from("off").to_bool(true));
        assert!(AttributeValue::from("maybe").to_bool(true));
        assert_eq!(AttributeValue::from(" 12 ").to_int(-1), 12);
        assert_eq!(AttributeValue::from("twelve").to_int(-1), -1);
        assert_eq!(AttributeValue::Blank.to_int(-1), -1);
        assert_eq!(AttributeValue::from(true).str(), "yes");
    }

    #[test]
    fn test_values_compare_by_printed_form() {
        assert_eq!(AttributeValue::from(3), AttributeValue::from("3"));
        assert_eq!(AttributeValue::from(true), AttributeValue::from("yes"));
        assert_ne!(AttributeValue::Blank, AttributeValue::from(""));
    }

    #[test]
    fn test_children_keep_document_order() {
        let cfg = Config::new()
            .with_child("and", Config::new().with("a", 1))
            .with_child("filter_adjacent", Config::new())
            .with_child("or", Config::new().with("b", 2))
            .with_child("and", Config::new().with("c", 3));
        let keys: Vec<&str> = cfg.all_children().map(|(k, _)| k).collect();
        assert_eq!(keys, vec!["and", "filter_adjacent", "or", "and"]);
        assert_eq!(cfg.child_range("and").count(), 2);
    }

    #[test]
    fn test_structural_match() {
        let unit = Config::new()
            .with("id", "Delfador")
            .with("level", 5)
            .with_child("attack", Config::new().with("name", "staff"))
            .with_child("attack", Config::new().with("name", "lightbeam"));

        assert!(unit.matches(&Config::new().with("level", "5")));
        assert!(unit.matches(
            &Config::new().with_child("attack", Config::new().with("name", "lightbeam"))
        ));
        assert!(!unit.matches(&Config::new().with("race", "human")));
        assert!(!unit.matches(
            &Config::new().with_child("attack", Config::new().with("name", "sword"))
        ));
        assert!(!unit.matches(
            &Config::new().with_child("not", Config::new().with("id", "Delfador"))
        ));
    }

    #[cfg(feature = "serialization")]
    #[test]
    fn test_from_json() {
        let cfg = Config::from_json_str(
            r#"{"type": "Elvish Archer", "side": 2, "canrecruit": false,
                "and": {"race": "elf"},
                "filter_adjacent": [{"is_enemy": true}, {"count": "2-6"}]}"#,
        )
        .expect("valid filter json");
        assert_eq!(cfg.get("type").str(), "Elvish Archer");
        assert_eq!(cfg.get("side").to_int(0), 2);
        assert!(!cfg.get("canrecruit").to_bool(true));
        assert_eq!(cfg.child_range("filter_adjacent").count(), 2);
        assert_eq!(cfg.child("and").map(|c| c.get("race").str()), Some("elf".into()));
    }

    #[cfg(feature = "serialization")]
    #[test]
    fn test_from_json_str_rejects_repeated_keys() {
        let err = Config::from_json_str(
            r#"{"race": "x", "and": {"side": 1}, "or": {"side": 1}, "and": {"side": 2}}"#,
        )
        .unwrap_err();
        assert!(matches!(err, ConfigError::Json(_)));
        assert!(err.to_string().contains("duplicate key `and`"), "{err}");

        let nested = Config::from_json_str(r#"{"filter_side": {"side": 1, "side": 2}}"#);
        assert!(nested.is_err());
    }

    #[cfg(feature = "serialization")]
    #[test]
    fn test_ordered_form_keeps_interleaved_tags() {
        let cfg = Config::from_json_str(
            r#"[{"race": "x"},
                {"and": {"side": 1}},
                {"or": {"side": 1}},
                {"and": {"side": 2}}]"#,
        )
        .expect("ordered form parses");
        assert_eq!(cfg.get("race").str(), "x");
        let tags: Vec<(&str, i64)> = cfg
            .all_children()
            .map(|(tag, child)| (tag, child.get("side").to_int(0)))
            .collect();
        assert_eq!(tags, vec![("and", 1), ("or", 1), ("and", 2)]);

        // The ordered form also works for a nested child.
        let cfg = Config::from_json_str(
            r#"{"not": [[{"side": 3}, {"or": {"side": 4}}, {"and": {"level": 2}}]]}"#,
        )
        .expect("nested ordered form parses");
        let not = cfg.child("not").expect("not child");
        let tags: Vec<&str> = not.all_children().map(|(tag, _)| tag).collect();
        assert_eq!(tags, vec!["or", "and"]);
        assert_eq!(not.get("side").to_int(0), 3);

        assert!(matches!(
            Config::from_json_str(r#"[{"side": 1}, 2]"#),
            Err(ConfigError::NotAnObject("number"))
        ));
    }

    #[test]
    fn test_child_outlives_temporary_key() {
        let cfg = Config::new().with_child("filter_side", Config::new().with("side", 2));
        let found = {
            let key = String::from("filter_side");
            cfg.child(&key)
        };
        assert_eq!(found.map(|c| c.get("side").to_int(0)), Some(2));
        let all: Vec<&Config> = {
            let key = format!("filter_{}", "side");
            cfg.child_range(&key).collect()
        };
        assert_eq!(all.len(), 1);
    }

    #[cfg(feature = "serialization")]
    #[test]
    fn test_from_json_rejects_scalar_arrays() {
        let err = Config::from_json_str(r#"{"x": [1, 2]}"#).unwrap_err();
        assert!(matches!(err, ConfigError::UnsupportedValue { .. }));
    }
}
