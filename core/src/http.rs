//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe requests as plain data. The core builds an
//! `HttpRequest` and never touches the network; the caller (host) sends it
//! and hands the raw response body back to a `parse_*` function.
//!
//! `dorequest.php` takes most arguments in the query string. Free text and
//! batch payloads travel as `multipart/form-data`, kept here as an ordered
//! list of named string parts so the host can either hand them to its own
//! multipart encoder or use `Multipart::encode` directly.

/// HTTP method for a request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Get,
    Post,
}

/// An HTTP request described as plain data.
///
/// Built by the `build_*` functions in [`crate::request`]. Requests that
/// carry a form are `Post`, all others `Get`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub url: String,
    pub form: Option<Multipart>,
}

/// A single named part of a multipart form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FormPart {
    pub name: String,
    pub value: String,
}

/// An ordered multipart form body. Part order is preserved on the wire.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Multipart {
    parts: Vec<FormPart>,
}

impl Multipart {
    pub fn new() -> Self {
        Self::default()
    }

    /// Append a part, keeping insertion order.
    pub fn part(mut self, name: &str, value: impl Into<String>) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            value: value.into(),
        });
        self
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    /// Value of the first part called `name`.
    pub fn get(&self, name: &str) -> Option<&str> {
        self.parts
            .iter()
            .find(|p| p.name == name)
            .map(|p| p.value.as_str())
    }

    /// A fresh boundary token. Hex digits only, so it never needs quoting.
    pub fn random_boundary() -> String {
        format!("ra-{}", uuid::Uuid::new_v4().simple())
    }

    /// `Content-Type` header value for a body encoded with `boundary`.
    pub fn content_type(boundary: &str) -> String {
        format!("multipart/form-data; boundary={boundary}")
    }

    /// Encode the form as a `multipart/form-data` body (RFC 7578).
    pub fn encode(&self, boundary: &str) -> String {
        let mut body = String::new();
        for part in &self.parts {
            body.push_str("--");
            body.push_str(boundary);
            body.push_str("\r\n");
            body.push_str(&format!(
                "Content-Disposition: form-data; name=\"{}\"\r\n",
                part.name
            ));
            body.push_str("Content-Type: text/plain; charset=utf-8\r\n\r\n");
            body.push_str(&part.value);
            body.push_str("\r\n");
        }
        body.push_str("--");
        body.push_str(boundary);
        body.push_str("--\r\n");
        body
    }
}
