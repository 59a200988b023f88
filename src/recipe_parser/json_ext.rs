//! Typed accessors over `serde_json::Value`.
//!
//! Model output rarely matches the shape we ask for, so every accessor here
//! returns an empty default on a type mismatch instead of failing.

use serde_json::{Map, Value};

static EMPTY_LIST: Vec<Value> = Vec::new();

pub trait JsonValueExt {
    /// Coerces a scalar to text. Strings are returned verbatim, numbers and
    /// booleans use their JSON spelling, null becomes empty. Arrays and
    /// objects are not scalars and also yield an empty string.
    fn as_text(&self) -> String;

    /// Like [`as_text`](Self::as_text), but keeps arrays and objects as their
    /// compact JSON text. Used for list items, where dropping the content
    /// would lose a whole entry.
    fn as_item_text(&self) -> String;

    /// The array elements, or an empty slice for any other type.
    fn as_list(&self) -> &[Value];

    /// The object entries, or `None` for any other type.
    fn as_map(&self) -> Option<&Map<String, Value>>;
}

impl JsonValueExt for Value {
    fn as_text(&self) -> String {
        match self {
            Value::String(s) => s.clone(),
            Value::Number(n) => n.to_string(),
            Value::Bool(b) => b.to_string(),
            Value::Null | Value::Array(_) | Value::Object(_) => String::new(),
        }
    }

    fn as_item_text(&self) -> String {
        match self {
            Value::Array(_) | Value::Object(_) => self.to_string(),
            _ => self.as_text(),
        }
    }

    fn as_list(&self) -> &[Value] {
        match self {
            Value::Array(items) => items,
            _ => &EMPTY_LIST,
        }
    }

    fn as_map(&self) -> Option<&Map<String, Value>> {
        self.as_object()
    }
}

/// Returns the value of the first key in `keys` that is present and not null.
pub fn first_present<'a>(obj: &'a Map<String, Value>, keys: &[&str]) -> Option<&'a Value> {
    keys.iter()
        .filter_map(|key| obj.get(*key))
        .find(|value| !value.is_null())
}

/// Text of the first present synonym, empty when none is present.
pub fn text_field(obj: &Map<String, Value>, keys: &[&str]) -> String {
    first_present(obj, keys)
        .map(JsonValueExt::as_text)
        .unwrap_or_default()
}

/// Items of the first present synonym, each coerced to text. A non-array
/// value yields an empty list.
pub fn text_list_field(obj: &Map<String, Value>, keys: &[&str]) -> Vec<String> {
    first_present(obj, keys)
        .map(|value| value.as_list().iter().map(JsonValueExt::as_item_text).collect())
        .unwrap_or_default()
}
