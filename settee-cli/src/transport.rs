//! Blocking HTTP transport over reqwest

use std::fs;

use reqwest::blocking::Client;
use settee::{HttpRequest, Method, RequestBody, Response, Transport, TransportError};

pub struct HttpTransport {
    client: Client,
}

impl HttpTransport {
    pub fn new() -> Result<Self, reqwest::Error> {
        Ok(Self {
            client: Client::builder().build()?,
        })
    }
}

impl Transport for HttpTransport {
    fn send(&mut self, request: &HttpRequest) -> Result<Response, TransportError> {
        let method = match request.method {
            Method::Get => reqwest::Method::GET,
            Method::Put => reqwest::Method::PUT,
            Method::Post => reqwest::Method::POST,
            Method::Delete => reqwest::Method::DELETE,
        };
        let mut builder = self.client.request(method, request.url.clone());
        if let Some((user, password)) = &request.auth {
            builder = builder.basic_auth(user, Some(password));
        }
        match &request.body {
            Some(RequestBody::Text(text)) => {
                if let Some(content_type) = request.content_type {
                    builder = builder.header(reqwest::header::CONTENT_TYPE, content_type);
                }
                builder = builder.body(text.clone());
            }
            Some(RequestBody::File { path, content_type }) => {
                let bytes = fs::read(path)?;
                let content_type = content_type
                    .as_deref()
                    .unwrap_or("application/octet-stream")
                    .to_string();
                builder = builder
                    .header(reqwest::header::CONTENT_TYPE, content_type)
                    .body(bytes);
            }
            None => {}
        }

        let response = builder
            .send()
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let status = response.status();
        let content_type = response
            .headers()
            .get(reqwest::header::CONTENT_TYPE)
            .and_then(|value| value.to_str().ok())
            .map(str::to_string);
        let body = response
            .text()
            .map_err(|err| TransportError::Request(err.to_string()))?;
        let body = if body.is_empty() { None } else { Some(body) };
        Ok(Response::new(
            status.as_u16(),
            status.canonical_reason().unwrap_or(""),
            content_type,
            body,
        ))
    }
}
