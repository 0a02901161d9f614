//! JSON value wrapper
//!
//! Wraps a parsed `serde_json::Value` with the member access and rendering
//! operations the shell needs. Strings render without quotes in compact
//! form, so a variable holding `"abc"` interpolates as `abc`.

use crate::error::ShellError;
use serde::Serialize;
use std::fmt;

/// Content that looks like the start of a JSON document (optionally
/// indented object or parenthesized expression).
pub fn looks_like_json_doc(text: &str) -> bool {
    text.trim_start_matches([' ', '\t', '\n', '\r'])
        .starts_with(['(', '{'])
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(transparent)]
pub struct JsonValue(serde_json::Value);

impl JsonValue {
    pub fn new(value: serde_json::Value) -> Self {
        JsonValue(value)
    }

    /// Parse any JSON value, not only an object or array document.
    pub fn parse(text: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(text).map(JsonValue)
    }

    pub fn raw(&self) -> &serde_json::Value {
        &self.0
    }

    pub fn is_object(&self) -> bool {
        self.0.is_object()
    }

    pub fn is_array(&self) -> bool {
        self.0.is_array()
    }

    pub fn is_null(&self) -> bool {
        self.0.is_null()
    }

    /// Array length, `None` for non-arrays.
    pub fn len(&self) -> Option<usize> {
        self.0.as_array().map(Vec::len)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == Some(0)
    }

    /// Object member by name.
    pub fn member(&self, name: &str) -> Option<JsonValue> {
        self.0.get(name).cloned().map(JsonValue)
    }

    /// Array element by index.
    pub fn element(&self, index: usize) -> Option<JsonValue> {
        self.0.get(index).cloned().map(JsonValue)
    }

    /// Object member by name, `None` for non-objects too.
    pub fn attr_or_nil(&self, name: &str) -> Option<JsonValue> {
        if self.is_object() {
            self.member(name)
        } else {
            None
        }
    }

    pub fn set_attr(&mut self, name: &str, value: JsonValue) -> Result<(), ShellError> {
        match self.0.as_object_mut() {
            Some(map) => {
                map.insert(name.to_string(), value.0);
                Ok(())
            }
            None => Err(ShellError::user("not a JSON object")),
        }
    }

    pub fn delete_attr(&mut self, name: &str) -> Result<(), ShellError> {
        match self.0.as_object_mut() {
            Some(map) => {
                map.remove(name);
                Ok(())
            }
            None => Err(ShellError::user("not a JSON object")),
        }
    }

    /// Pretty-printed rendering.
    pub fn format_string(&self) -> String {
        serde_json::to_string_pretty(&self.0).unwrap_or_else(|_| self.to_string())
    }
}

impl fmt::Display for JsonValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.0 {
            serde_json::Value::String(s) => f.write_str(s),
            serde_json::Value::Null => f.write_str("null"),
            other => match serde_json::to_string(other) {
                Ok(s) => f.write_str(&s),
                Err(_) => Err(fmt::Error),
            },
        }
    }
}

impl From<serde_json::Value> for JsonValue {
    fn from(value: serde_json::Value) -> Self {
        JsonValue(value)
    }
}
