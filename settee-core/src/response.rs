//! HTTP response record
//!
//! Created once per request, pushed into the response history, never
//! mutated. The JSON body is parsed at construction time when the content
//! type allows one, so the derived facts are fixed for the record's
//! lifetime.

use crate::json::JsonValue;

/// Content types whose bodies are tried as JSON.
pub const JSON_CONTENT_TYPES: [&str; 2] = ["application/json", "text/plain"];

#[derive(Debug, Clone)]
pub struct Response {
    status: u16,
    reason: String,
    content_type: Option<String>,
    body: Option<String>,
    json: Option<JsonValue>,
}

impl Response {
    pub fn new(
        status: u16,
        reason: impl Into<String>,
        content_type: Option<String>,
        body: Option<String>,
    ) -> Self {
        let content_type = content_type.map(|raw| strip_parameters(&raw));
        let json = match (&content_type, &body) {
            (Some(ct), Some(text)) if !text.is_empty() => {
                if JSON_CONTENT_TYPES.contains(&ct.as_str()) {
                    JsonValue::parse(text).ok()
                } else {
                    None
                }
            }
            _ => None,
        };
        Self {
            status,
            reason: reason.into(),
            content_type,
            body,
            json,
        }
    }

    pub fn status(&self) -> u16 {
        self.status
    }

    /// Status code as printed in the response line.
    pub fn code(&self) -> String {
        self.status.to_string()
    }

    pub fn reason(&self) -> &str {
        &self.reason
    }

    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    pub fn body(&self) -> Option<&str> {
        self.body.as_deref()
    }

    /// Content type with parameters stripped.
    pub fn content_type(&self) -> Option<&str> {
        self.content_type.as_deref()
    }

    /// Body parsed as JSON, when the content type permits and parsing
    /// succeeded.
    pub fn json(&self) -> Option<&JsonValue> {
        self.json.as_ref()
    }

    /// JSON body member by `name`, falling back to `altname`.
    pub fn attr(&self, name: &str, altname: Option<&str>) -> Option<JsonValue> {
        let json = self.json()?;
        json.attr_or_nil(name)
            .or_else(|| altname.and_then(|alt| json.attr_or_nil(alt)))
    }
}

fn strip_parameters(content_type: &str) -> String {
    match content_type.rfind(';') {
        Some(pos) => content_type[..pos].trim_end().to_string(),
        None => content_type.to_string(),
    }
}
