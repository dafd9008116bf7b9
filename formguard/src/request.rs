//! Request and response types consumed by the guard.
//!
//! The guard only needs the method and the parsed form fields of a request.
//! [`FormRequest`] captures that; [`HttpRequest`] is a small owned request
//! type implementing it for hosts that have no request type of their own.

use serde_json::Value;
use std::collections::HashMap;
use std::sync::OnceLock;

/// Parsed form fields of a request body
pub type FormBody = HashMap<String, String>;

/// What the guard reads from an incoming request.
pub trait FormRequest {
    /// Request method, e.g. `"POST"`.
    fn method(&self) -> &str;

    /// Parsed body fields, or `None` when the request has no parsed body.
    fn parsed_body(&self) -> Option<&FormBody>;

    /// Header value by name.
    fn header(&self, _name: &str) -> Option<&str> {
        None
    }
}

impl<R: FormRequest + ?Sized> FormRequest for &R {
    fn method(&self) -> &str {
        (**self).method()
    }

    fn parsed_body(&self) -> Option<&FormBody> {
        (**self).parsed_body()
    }

    fn header(&self, name: &str) -> Option<&str> {
        (**self).header(name)
    }
}

/// HTTP request
#[derive(Debug, Clone, Default)]
pub struct HttpRequest {
    pub method: String,
    pub path: String,
    pub headers: HashMap<String, String>,
    body: Vec<u8>,
    form: Option<FormBody>,
    parsed: OnceLock<Option<FormBody>>,
}

impl HttpRequest {
    pub fn new(method: impl Into<String>, path: impl Into<String>) -> Self {
        Self {
            method: method.into(),
            path: path.into(),
            ..Default::default()
        }
    }

    pub fn with_header(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(name.into(), value.into());
        self
    }

    /// Set a raw body; it is parsed on first access.
    pub fn with_body(mut self, body: impl Into<Vec<u8>>) -> Self {
        self.body = body.into();
        self.parsed = OnceLock::new();
        self
    }

    /// Set already parsed form fields, bypassing body parsing.
    pub fn with_form<K, V>(mut self, fields: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        self.form = Some(
            fields
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        );
        self
    }

    /// Raw body bytes. Replace them with [`with_body`](Self::with_body),
    /// which also drops the cached parse.
    pub fn body(&self) -> &[u8] {
        &self.body
    }

    /// Get a header value, ignoring ASCII case of the name
    pub fn header_value(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(key, _)| key.eq_ignore_ascii_case(name))
            .map(|(_, value)| value.as_str())
    }

    fn parse_body(&self) -> Option<FormBody> {
        if self.body.is_empty() {
            return None;
        }

        // JSON objects first. Non-string fields stay present as their JSON
        // text, which never has the shape of an issued token.
        match serde_json::from_slice::<Value>(&self.body) {
            Ok(Value::Object(map)) => {
                return Some(
                    map.into_iter()
                        .map(|(key, value)| match value {
                            Value::String(s) => (key, s),
                            other => (key, other.to_string()),
                        })
                        .collect(),
                );
            }
            Ok(_) => return None,
            Err(_) => {}
        }

        serde_urlencoded::from_bytes::<Vec<(String, String)>>(&self.body)
            .ok()
            .map(|pairs| pairs.into_iter().collect())
    }
}

impl FormRequest for HttpRequest {
    fn method(&self) -> &str {
        &self.method
    }

    fn parsed_body(&self) -> Option<&FormBody> {
        if let Some(form) = &self.form {
            return Some(form);
        }
        self.parsed.get_or_init(|| self.parse_body()).as_ref()
    }

    fn header(&self, name: &str) -> Option<&str> {
        self.header_value(name)
    }
}

/// HTTP response
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: HashMap<String, String>,
    pub body: Vec<u8>,
}

impl HttpResponse {
    pub fn new(status: u16) -> Self {
        Self {
            status,
            headers: HashMap::new(),
            body: Vec::new(),
        }
    }

    pub fn ok() -> Self {
        Self::new(200)
    }

    pub fn forbidden() -> Self {
        Self::new(403)
    }

    pub fn with_body(mut self, body: Vec<u8>) -> Self {
        self.body = body;
        self
    }

    pub fn with_header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }
}
