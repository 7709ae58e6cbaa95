//! The seam between request building and the network.
//!
//! # Design
//! A `Transport` executes one `HttpRequest` and hands back the response as
//! data. Non-2xx statuses are *not* errors at this layer; status
//! interpretation belongs to `LiveDetectClient::parse_*`. Only failures that
//! prevent a response from arriving map to `FrsError::Transport`.
//!
//! Timeouts, proxies and TLS are configured on the `ureq::Agent` passed to
//! `UreqTransport::with_agent`.

use tracing::debug;

use crate::error::FrsError;
use ureq::SendBody;

use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse};

/// Default cap on response body size. Result bodies carry a base64 frame,
/// so this sits well above ureq's own 10 MB default.
pub const DEFAULT_RESPONSE_LIMIT: u64 = 32 * 1024 * 1024;

/// Executes HTTP requests on behalf of `LiveDetectService`.
pub trait Transport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FrsError>;
}

impl<T: Transport + ?Sized> Transport for &T {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FrsError> {
        (**self).execute(request)
    }
}

/// Blocking transport backed by `ureq`.
#[derive(Clone)]
pub struct UreqTransport {
    agent: ureq::Agent,
    default_headers: Vec<(String, String)>,
    response_limit: u64,
}

impl UreqTransport {
    pub fn new() -> Self {
        let agent = ureq::Agent::config_builder()
            .http_status_as_error(false)
            .build()
            .new_agent();
        Self::with_agent(agent)
    }

    /// Use a caller-configured agent. It must be built with
    /// `http_status_as_error(false)` so error statuses reach the parser.
    pub fn with_agent(agent: ureq::Agent) -> Self {
        Self {
            agent,
            default_headers: Vec::new(),
            response_limit: DEFAULT_RESPONSE_LIMIT,
        }
    }

    /// Largest response body accepted, in bytes. Bigger bodies fail with
    /// `FrsError::Transport`.
    pub fn with_response_limit(mut self, limit: u64) -> Self {
        self.response_limit = limit;
        self
    }

    /// Attach a header to every request, e.g. `X-Auth-Token`.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.default_headers.push((name.to_string(), value.to_string()));
        self
    }
}

impl Default for UreqTransport {
    fn default() -> Self {
        Self::new()
    }
}

impl Transport for UreqTransport {
    fn execute(&self, request: HttpRequest) -> Result<HttpResponse, FrsError> {
        debug!(
            method = request.method.as_str(),
            path = %request.path,
            body = request.body.as_ref().map(HttpBody::kind),
            "sending request"
        );
        let mut builder = match request.method {
            HttpMethod::Post => self.agent.post(&request.path),
        };
        for (name, value) in self.default_headers.iter().chain(request.headers.iter()) {
            builder = builder.header(name.as_str(), value.as_str());
        }

        let sent = match request.body {
            Some(HttpBody::Json(text)) => builder.send(text.as_bytes()),
            Some(HttpBody::Multipart(form)) => builder
                .header("content-length", form.encoded_len().to_string())
                .send(SendBody::from_owned_reader(form.into_reader())),
            None => builder.send_empty(),
        };
        let mut response = sent.map_err(|e| FrsError::Transport(e.to_string()))?;

        let status = response.status().as_u16();
        let headers = response
            .headers()
            .iter()
            .filter_map(|(name, value)| {
                value
                    .to_str()
                    .ok()
                    .map(|v| (name.as_str().to_string(), v.to_string()))
            })
            .collect();
        let bytes = response
            .body_mut()
            .with_config()
            .limit(self.response_limit)
            .read_to_vec()
            .map_err(|e| FrsError::Transport(e.to_string()))?;
        // Invalid UTF-8 still reaches the parser: a 2xx becomes
        // MalformedResponse, anything else a Service error with the status.
        let body = String::from_utf8_lossy(&bytes).into_owned();
        debug!(status, "received response");

        Ok(HttpResponse {
            status,
            headers,
            body,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::{BufRead, BufReader, Read, Write};
    use std::net::{SocketAddr, TcpListener};

    use crate::config::FrsConfig;
    use crate::service::LiveDetectService;

    /// Answer exactly one request with `status` and the raw `body` bytes.
    /// The received request body is sent back through the join handle.
    fn serve_once(status: &'static str, body: &'static [u8]) -> (SocketAddr, std::thread::JoinHandle<Vec<u8>>) {
        let listener = TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        let handle = std::thread::spawn(move || {
            let (stream, _) = listener.accept().unwrap();
            let mut reader = BufReader::new(stream.try_clone().unwrap());
            let mut content_length = 0usize;
            loop {
                let mut line = String::new();
                reader.read_line(&mut line).unwrap();
                if line == "\r\n" || line.is_empty() {
                    break;
                }
                if let Some((name, value)) = line.split_once(':') {
                    if name.eq_ignore_ascii_case("content-length") {
                        content_length = value.trim().parse().unwrap();
                    }
                }
            }
            let mut received = vec![0u8; content_length];
            reader.read_exact(&mut received).unwrap();

            let mut stream = stream;
            write!(
                stream,
                "HTTP/1.1 {status}\r\ncontent-length: {}\r\nconnection: close\r\n\r\n",
                body.len()
            )
            .unwrap();
            stream.write_all(body).unwrap();
            stream.flush().unwrap();
            received
        });
        (addr, handle)
    }

    fn service(addr: SocketAddr) -> LiveDetectService<UreqTransport> {
        LiveDetectService::new(FrsConfig::new(&format!("http://{addr}"), "p"), UreqTransport::new())
    }

    #[test]
    fn non_utf8_success_body_is_malformed() {
        let (addr, server) = serve_once("200 OK", b"\xff\xfe not json");
        let err = service(addr).live_detect_silent_by_base64("BBBB").unwrap_err();
        assert!(matches!(err, FrsError::MalformedResponse(_)), "got {err:?}");
        server.join().unwrap();
    }

    #[test]
    fn non_utf8_error_body_is_service_error() {
        let (addr, server) = serve_once("400 Bad Request", b"\xff\xfe error");
        let err = service(addr).live_detect_silent_by_base64("BBBB").unwrap_err();
        match err {
            FrsError::Service { status, body } => {
                assert_eq!(status, 400);
                assert!(body.ends_with(" error"), "body: {body}");
            }
            other => panic!("expected Service, got {other:?}"),
        }
        server.join().unwrap();
    }

    #[test]
    fn body_over_limit_is_transport_error() {
        let (addr, server) = serve_once("200 OK", b"{\"result\":{\"alive\":true}}");
        let svc = LiveDetectService::new(
            FrsConfig::new(&format!("http://{addr}"), "p"),
            UreqTransport::new().with_response_limit(4),
        );
        let err = svc.live_detect_silent_by_base64("BBBB").unwrap_err();
        assert!(matches!(err, FrsError::Transport(_)), "got {err:?}");
        server.join().unwrap();
    }

    #[test]
    fn multipart_upload_is_streamed_with_exact_length() {
        let (addr, server) = serve_once("200 OK", b"{}");
        let upload = crate::media::UploadFile {
            filename: "face.jpg".to_string(),
            bytes: vec![0xAB; 4096],
        };
        let result = service(addr).live_detect_silent_by_upload(upload).unwrap();
        assert!(!result.result.alive);

        let received = server.join().unwrap();
        let head = String::from_utf8_lossy(&received[..200]);
        assert!(head.contains("name=\"image_file\"; filename=\"face.jpg\""), "{head}");
        assert!(received.windows(4096).any(|w| w.iter().all(|b| *b == 0xAB)));
        assert!(received.ends_with(b"--\r\n"));
    }

    #[test]
    fn connection_refused_is_transport_error() {
        let listener = std::net::TcpListener::bind("127.0.0.1:0").unwrap();
        let addr = listener.local_addr().unwrap();
        drop(listener);

        let request = HttpRequest {
            method: HttpMethod::Post,
            path: format!("http://{addr}/v1/p/live-detect"),
            headers: Vec::new(),
            body: None,
        };
        let err = UreqTransport::new().execute(request).unwrap_err();
        assert!(matches!(err, FrsError::Transport(_)));
    }

    #[test]
    fn default_headers_accumulate() {
        let transport = UreqTransport::default()
            .with_header("X-Auth-Token", "t")
            .with_header("X-Language", "en-us");
        assert_eq!(transport.default_headers.len(), 2);
        assert_eq!(transport.default_headers[0].0, "X-Auth-Token");
    }
}
