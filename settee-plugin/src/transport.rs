//! Transport seam
//!
//! The shell core never talks HTTP itself; it hands a fully formed
//! [`HttpRequest`] to the injected [`Transport`] and gets back a
//! [`Response`] record. The binary wires a real client here, tests wire a
//! scripted one.

use settee_core::{Response, ShellError};
use std::fmt;
use thiserror::Error;
use url::Url;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Put,
    Post,
    Delete,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Method::Get => "GET",
            Method::Put => "PUT",
            Method::Post => "POST",
            Method::Delete => "DELETE",
        })
    }
}

#[derive(Debug, Clone)]
pub enum RequestBody {
    Text(String),
    /// Upload the file at `path`; content type defaults to
    /// application/octet-stream.
    File {
        path: String,
        content_type: Option<String>,
    },
}

#[derive(Debug)]
pub struct HttpRequest {
    pub method: Method,
    pub url: Url,
    pub body: Option<RequestBody>,
    /// Content type hint derived from the body shape.
    pub content_type: Option<&'static str>,
    pub auth: Option<(String, String)>,
}

#[derive(Debug, Error)]
pub enum TransportError {
    #[error("request failed: {0}")]
    Request(String),
    #[error(transparent)]
    Io(#[from] std::io::Error),
}

impl From<TransportError> for ShellError {
    fn from(err: TransportError) -> Self {
        ShellError::Transport(err.to_string())
    }
}

/// Synchronous HTTP transport. Every request runs to completion before
/// the next input line is read.
pub trait Transport {
    fn send(&mut self, request: &HttpRequest) -> Result<Response, TransportError>;
}
