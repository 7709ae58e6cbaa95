//! HTTP transport types for the host-does-IO pattern.
//!
//! # Design
//! These types describe HTTP requests and responses as plain data. The
//! client builds `HttpRequest` values and parses `HttpResponse` values
//! without touching the network; a `Transport` (or any other host code)
//! executes the actual I/O.
//!
//! Bodies are either a JSON document or a multipart form. The form keeps its
//! parts structured so tests can inspect them. `MultipartForm::into_reader`
//! streams the wire bytes without duplicating file contents.

use std::collections::VecDeque;
use std::io::{self, Cursor, Read};

/// HTTP method for a request. Both live detect endpoints only accept POST.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HttpMethod {
    Post,
}

impl HttpMethod {
    pub fn as_str(self) -> &'static str {
        match self {
            HttpMethod::Post => "POST",
        }
    }
}

/// An HTTP request described as plain data.
#[derive(Debug, Clone)]
pub struct HttpRequest {
    pub method: HttpMethod,
    pub path: String,
    pub headers: Vec<(String, String)>,
    pub body: Option<HttpBody>,
}

impl HttpRequest {
    /// First header value matching `name`, compared case-insensitively.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// The JSON body text, if this request carries one.
    pub fn json_body(&self) -> Option<&str> {
        match &self.body {
            Some(HttpBody::Json(text)) => Some(text),
            _ => None,
        }
    }

    /// The multipart form, if this request carries one.
    pub fn multipart_body(&self) -> Option<&MultipartForm> {
        match &self.body {
            Some(HttpBody::Multipart(form)) => Some(form),
            _ => None,
        }
    }
}

/// Request payload.
#[derive(Debug, Clone, PartialEq)]
pub enum HttpBody {
    Json(String),
    Multipart(MultipartForm),
}

impl HttpBody {
    /// Short label used in log events.
    pub fn kind(&self) -> &'static str {
        match self {
            HttpBody::Json(_) => "json",
            HttpBody::Multipart(_) => "multipart",
        }
    }
}

/// A `multipart/form-data` body.
#[derive(Debug, Clone, PartialEq)]
pub struct MultipartForm {
    boundary: String,
    parts: Vec<FormPart>,
}

/// One named field of a multipart form.
#[derive(Debug, Clone, PartialEq)]
pub struct FormPart {
    pub name: String,
    pub value: PartValue,
}

#[derive(Debug, Clone, PartialEq)]
pub enum PartValue {
    Text(String),
    File {
        filename: String,
        content_type: String,
        bytes: Vec<u8>,
    },
}

pub const OCTET_STREAM: &str = "application/octet-stream";

impl MultipartForm {
    /// Empty form with a random boundary.
    pub fn new() -> Self {
        Self::with_boundary(format!("frs-{}", uuid::Uuid::new_v4().simple()))
    }

    pub fn with_boundary(boundary: impl Into<String>) -> Self {
        Self {
            boundary: boundary.into(),
            parts: Vec::new(),
        }
    }

    pub fn text(mut self, name: &str, value: &str) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            value: PartValue::Text(value.to_string()),
        });
        self
    }

    pub fn file(mut self, name: &str, filename: &str, bytes: Vec<u8>) -> Self {
        self.parts.push(FormPart {
            name: name.to_string(),
            value: PartValue::File {
                filename: filename.to_string(),
                content_type: OCTET_STREAM.to_string(),
                bytes,
            },
        });
        self
    }

    pub fn boundary(&self) -> &str {
        &self.boundary
    }

    pub fn parts(&self) -> &[FormPart] {
        &self.parts
    }

    pub fn part(&self, name: &str) -> Option<&FormPart> {
        self.parts.iter().find(|p| p.name == name)
    }

    /// Value of the `Content-Type` header announcing this form.
    pub fn content_type(&self) -> String {
        format!("multipart/form-data; boundary={}", self.boundary)
    }

    /// Render the form as RFC 7578 bytes.
    pub fn encode(&self) -> Vec<u8> {
        self.clone().into_segments().concat()
    }

    /// Exact length of the encoded form.
    pub fn encoded_len(&self) -> u64 {
        let framing: usize = self
            .parts
            .iter()
            .map(|part| {
                let payload = match &part.value {
                    PartValue::Text(text) => text.len(),
                    PartValue::File { bytes, .. } => bytes.len(),
                };
                self.part_header(part).len() + payload + 2
            })
            .sum();
        (framing + self.closing().len()) as u64
    }

    /// Consume the form into a reader over its encoded bytes. File contents
    /// are moved, not copied.
    pub fn into_reader(self) -> MultipartReader {
        MultipartReader {
            segments: self.into_segments().into_iter().map(Cursor::new).collect(),
        }
    }

    fn into_segments(self) -> Vec<Vec<u8>> {
        let headers: Vec<String> = self.parts.iter().map(|p| self.part_header(p)).collect();
        let closing = self.closing();
        let mut segments = Vec::with_capacity(self.parts.len() * 3 + 1);
        for (header, part) in headers.into_iter().zip(self.parts) {
            segments.push(header.into_bytes());
            segments.push(match part.value {
                PartValue::Text(text) => text.into_bytes(),
                PartValue::File { bytes, .. } => bytes,
            });
            segments.push(b"\r\n".to_vec());
        }
        segments.push(closing.into_bytes());
        segments
    }

    fn part_header(&self, part: &FormPart) -> String {
        match &part.value {
            PartValue::Text(_) => format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"\r\n\r\n",
                self.boundary,
                escape_quoted(&part.name)
            ),
            PartValue::File {
                filename,
                content_type,
                ..
            } => format!(
                "--{}\r\nContent-Disposition: form-data; name=\"{}\"; filename=\"{}\"\r\n\
                 Content-Type: {content_type}\r\n\r\n",
                self.boundary,
                escape_quoted(&part.name),
                escape_quoted(filename)
            ),
        }
    }

    fn closing(&self) -> String {
        format!("--{}--\r\n", self.boundary)
    }
}

/// Streams an encoded multipart form segment by segment.
#[derive(Debug)]
pub struct MultipartReader {
    segments: VecDeque<Cursor<Vec<u8>>>,
}

impl Read for MultipartReader {
    fn read(&mut self, buf: &mut [u8]) -> io::Result<usize> {
        while let Some(segment) = self.segments.front_mut() {
            let n = segment.read(buf)?;
            if n > 0 || buf.is_empty() {
                return Ok(n);
            }
            self.segments.pop_front();
        }
        Ok(0)
    }
}

impl Default for MultipartForm {
    fn default() -> Self {
        Self::new()
    }
}

/// Quoted-string escaping for header parameters: `"` and line breaks only.
fn escape_quoted(s: &str) -> String {
    s.replace('"', "%22").replace('\r', "%0D").replace('\n', "%0A")
}

/// An HTTP response described as plain data.
///
/// Constructed by the transport after executing an `HttpRequest`, then
/// passed to `LiveDetectClient::parse_*` methods for deserialization.
#[derive(Debug, Clone)]
pub struct HttpResponse {
    pub status: u16,
    pub headers: Vec<(String, String)>,
    pub body: String,
}

impl HttpResponse {
    pub fn is_success(&self) -> bool {
        (200..300).contains(&self.status)
    }
}
