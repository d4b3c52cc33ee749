//! Request transport
//!
//! [`HttpTransport`] wraps a `reqwest::Client`. Anything that fails before a
//! status line is received (DNS, refused connection, timeout, a body cut
//! short) surfaces as [`Error::Transport`] with the underlying cause.

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use futures_util::StreamExt;
use reqwest::header::CONTENT_TYPE;
use reqwest::multipart::{Form, Part};
use serde_json::{Map, Value};

use crate::common::{Error, Result};

/// HTTP methods used by the platform API
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Method {
    Get,
    Post,
}

impl fmt::Display for Method {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Method::Get => f.write_str("GET"),
            Method::Post => f.write_str("POST"),
        }
    }
}

/// A file sent as one part of a multipart form
#[derive(Debug, Clone)]
pub struct FilePart {
    /// Form field name
    pub field: String,
    pub file_name: String,
    pub content_type: String,
    pub data: Vec<u8>,
}

/// Request body variants
#[derive(Debug, Clone, Default)]
pub enum RequestBody {
    #[default]
    Empty,
    /// JSON-encoded body with a JSON content type
    Json(Value),
    /// Multipart form; no JSON content type is set in this mode
    Multipart {
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    },
}

/// A fully resolved request
#[derive(Debug, Clone)]
pub struct ApiRequest {
    pub method: Method,
    pub url: String,
    pub body: RequestBody,
}

impl ApiRequest {
    pub fn get(url: impl Into<String>) -> Self {
        Self {
            method: Method::Get,
            url: url.into(),
            body: RequestBody::Empty,
        }
    }

    pub fn post_json(url: impl Into<String>, body: Value) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: RequestBody::Json(body),
        }
    }

    pub fn post_multipart(
        url: impl Into<String>,
        fields: Vec<(String, String)>,
        files: Vec<FilePart>,
    ) -> Self {
        Self {
            method: Method::Post,
            url: url.into(),
            body: RequestBody::Multipart { fields, files },
        }
    }
}

/// A received response
#[derive(Debug, Clone)]
pub struct ApiResponse {
    pub status: u16,
    pub content_type: Option<String>,
    pub body: Vec<u8>,
}

impl ApiResponse {
    /// Decode the body as JSON, if it is JSON
    pub fn json(&self) -> Option<Value> {
        serde_json::from_slice(&self.body).ok()
    }

    /// Body as text, lossily decoded
    pub fn text(&self) -> String {
        String::from_utf8_lossy(&self.body).into_owned()
    }

    /// Decoded body, or an empty object when the body is not JSON
    pub fn payload(&self) -> Value {
        self.json().unwrap_or_else(empty_payload)
    }

    pub fn content_length(&self) -> usize {
        self.body.len()
    }
}

/// The empty JSON object returned in place of an undecodable body
pub fn empty_payload() -> Value {
    Value::Object(Map::new())
}

/// Sends requests to the platform
#[async_trait]
pub trait Transport: Send + Sync {
    /// Send a request and read the full response
    ///
    /// Any HTTP status is a successful send; only transport failures are
    /// returned as errors.
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse>;
}

/// reqwest-backed transport
pub struct HttpTransport {
    client: reqwest::Client,
}

impl HttpTransport {
    /// Build a transport, optionally bounding every request by `timeout`
    pub fn new(timeout: Option<Duration>) -> Result<Self> {
        let mut builder = reqwest::Client::builder()
            .user_agent(concat!("ml-api-tester/", env!("CARGO_PKG_VERSION")));
        if let Some(timeout) = timeout {
            builder = builder.timeout(timeout);
        }

        let client = builder
            .build()
            .map_err(|e| Error::Config(format!("Failed to build HTTP client: {}", e)))?;

        Ok(Self { client })
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: ApiRequest) -> Result<ApiResponse> {
        let ApiRequest { method, url, body } = request;

        let builder = match (method, body) {
            (Method::Get, _) => self.client.get(&url),
            (Method::Post, RequestBody::Empty) => self.client.post(&url),
            (Method::Post, RequestBody::Json(value)) => self.client.post(&url).json(&value),
            (Method::Post, RequestBody::Multipart { fields, files }) => {
                let form = build_form(fields, files).map_err(|e| Error::transport(&url, e))?;
                self.client.post(&url).multipart(form)
            }
        };

        let response = builder
            .send()
            .await
            .map_err(|e| Error::transport(&url, e))?;

        let status = response.status().as_u16();
        let content_type = response
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);

        // the advertised length is untrusted; grow with what actually arrives
        let mut body = Vec::new();
        let mut stream = response.bytes_stream();
        while let Some(chunk) = stream.next().await {
            let chunk = chunk.map_err(|e| Error::transport(&url, e))?;
            body.extend_from_slice(&chunk);
        }

        tracing::trace!(%method, %url, status, bytes = body.len(), "response received");

        Ok(ApiResponse {
            status,
            content_type,
            body,
        })
    }
}

fn build_form(fields: Vec<(String, String)>, files: Vec<FilePart>) -> reqwest::Result<Form> {
    let mut form = Form::new();
    for (name, value) in fields {
        form = form.text(name, value);
    }
    for file in files {
        let part = Part::bytes(file.data)
            .file_name(file.file_name)
            .mime_str(&file.content_type)?;
        form = form.part(file.field, part);
    }
    Ok(form)
}
