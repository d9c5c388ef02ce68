//! Values visible to templates.

use crate::template_utils::{Html, ToHtml};
use itertools::Itertools;
use std::collections::BTreeMap;
use std::io::{self, Write};

/// A value in a render context.
///
/// Values are plain data: the controller layer converts its domain
/// objects (a user, a package, a resource) to maps of values before
/// rendering, usually via `serde_json`.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum Value {
    /// Missing or explicitly empty.
    #[default]
    Null,
    Bool(bool),
    Int(i64),
    Float(f64),
    /// Plain text, html-escaped on output.
    String(String),
    /// Pre-rendered html, written verbatim.
    Safe(String),
    List(Vec<Value>),
    Map(BTreeMap<String, Value>),
}

impl Value {
    /// Truthiness as used by `@if`.
    ///
    /// Null, false, zero and empty strings, lists and maps are false,
    /// everything else is true.
    pub fn is_truthy(&self) -> bool {
        match self {
            Value::Null => false,
            Value::Bool(b) => *b,
            Value::Int(n) => *n != 0,
            Value::Float(f) => *f != 0.0,
            Value::String(s) | Value::Safe(s) => !s.is_empty(),
            Value::List(items) => !items.is_empty(),
            Value::Map(map) => !map.is_empty(),
        }
    }

    /// Follow a path of map keys from this value.
    pub fn get_path<S: AsRef<str>>(&self, path: &[S]) -> Option<&Value> {
        match path.split_first() {
            None => Some(self),
            Some((first, rest)) => match self {
                Value::Map(map) => {
                    map.get(first.as_ref()).and_then(|v| v.get_path(rest))
                }
                _ => None,
            },
        }
    }

    /// Get a field of a map value.
    pub fn get(&self, key: &str) -> Option<&Value> {
        match self {
            Value::Map(map) => map.get(key),
            _ => None,
        }
    }

    /// The value as plain text, as passed to helpers.
    ///
    /// Lists are joined by `", "`, maps have no text representation
    /// and give an empty string.
    pub fn text(&self) -> String {
        match self {
            Value::Null | Value::Map(_) => String::new(),
            Value::Bool(b) => b.to_string(),
            Value::Int(n) => n.to_string(),
            Value::Float(f) => f.to_string(),
            Value::String(s) | Value::Safe(s) => s.clone(),
            Value::List(items) => items.iter().map(Value::text).join(", "),
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) | Value::Safe(s) => Some(s),
            _ => None,
        }
    }

    pub fn is_map(&self) -> bool {
        matches!(self, Value::Map(_))
    }

    /// Build a map value from key/value pairs.
    pub fn map<K, V>(pairs: impl IntoIterator<Item = (K, V)>) -> Value
    where
        K: Into<String>,
        V: Into<Value>,
    {
        Value::Map(
            pairs
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        )
    }
}

impl ToHtml for Value {
    fn to_html(&self, out: &mut dyn Write) -> io::Result<()> {
        match self {
            Value::Null | Value::Map(_) => Ok(()),
            Value::Bool(b) => b.to_html(out),
            Value::Int(n) => n.to_html(out),
            Value::Float(f) => f.to_html(out),
            Value::String(s) => s.to_html(out),
            Value::Safe(s) => Html(s).to_html(out),
            Value::List(items) => {
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        out.write_all(b", ")?;
                    }
                    item.to_html(out)?;
                }
                Ok(())
            }
        }
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Value {
        Value::String(s.to_string())
    }
}

impl From<String> for Value {
    fn from(s: String) -> Value {
        Value::String(s)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Value {
        Value::Bool(b)
    }
}

impl From<i64> for Value {
    fn from(n: i64) -> Value {
        Value::Int(n)
    }
}

impl From<i32> for Value {
    fn from(n: i32) -> Value {
        Value::Int(n.into())
    }
}

impl From<f64> for Value {
    fn from(f: f64) -> Value {
        Value::Float(f)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Value {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Value {
        value.map_or(Value::Null, Into::into)
    }
}

impl From<serde_json::Value> for Value {
    fn from(json: serde_json::Value) -> Value {
        use serde_json::Value as Json;
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match n.as_i64() {
                Some(i) => Value::Int(i),
                None => Value::Float(n.as_f64().unwrap_or(f64::NAN)),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => {
                Value::List(items.into_iter().map(Value::from).collect())
            }
            Json::Object(map) => Value::Map(
                map.into_iter().map(|(k, v)| (k, Value::from(v))).collect(),
            ),
        }
    }
}
