//! Runtime values produced by shell variables

use crate::json::JsonValue;
use crate::response::Response;
use std::fmt;
use std::rc::Rc;

/// Runtime value in settee
#[derive(Debug, Clone)]
pub enum Value {
    Text(String),
    Json(JsonValue),
    Response(Rc<Response>),
    Null,
}

impl Value {
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Value::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_json(&self) -> Option<&JsonValue> {
        match self {
            Value::Json(j) => Some(j),
            _ => None,
        }
    }

    pub fn as_response(&self) -> Option<&Response> {
        match self {
            Value::Response(r) => Some(r),
            _ => None,
        }
    }

    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Type name for error messages
    pub fn type_name(&self) -> &'static str {
        match self {
            Value::Text(_) => "Text",
            Value::Json(_) => "Json",
            Value::Response(_) => "Response",
            Value::Null => "Null",
        }
    }

    /// Member access for the embedded expression language. JSON values
    /// expose members and (for numeric keys) array elements; responses
    /// expose their record fields.
    pub fn get(&self, key: &str) -> Option<Value> {
        match self {
            Value::Json(json) => {
                if let Ok(index) = key.parse::<usize>() {
                    json.element(index).map(Value::Json)
                } else {
                    json.member(key).map(Value::Json)
                }
            }
            Value::Response(res) => match key {
                "code" | "status" => Some(Value::Text(res.code())),
                "message" | "reason" => Some(Value::Text(res.reason().to_string())),
                "body" => res.body().map(|b| Value::Text(b.to_string())),
                "content_type" => res.content_type().map(|c| Value::Text(c.to_string())),
                "json" => res.json().cloned().map(Value::Json),
                "ok" => Some(Value::Text(res.ok().to_string())),
                _ => None,
            },
            _ => None,
        }
    }

    /// Pretty rendering, used by the `format` command.
    pub fn format_string(&self) -> String {
        match self {
            Value::Json(json) => json.format_string(),
            other => other.to_string(),
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Text(s) => f.write_str(s),
            Value::Json(json) => write!(f, "{json}"),
            Value::Response(res) => write!(f, "{} {}", res.code(), res.reason()),
            Value::Null => Ok(()),
        }
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::Text(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::Text(s.to_string())
    }
}

impl From<JsonValue> for Value {
    fn from(json: JsonValue) -> Self {
        Value::Json(json)
    }
}

impl From<Rc<Response>> for Value {
    fn from(res: Rc<Response>) -> Self {
        Value::Response(res)
    }
}
