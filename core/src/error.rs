//! Error types for the live detect client.
//!
//! # Design
//! Every public operation returns `FrsError`. Non-2xx responses land in
//! `Service` with the raw status code and body; the body is exposed verbatim
//! because the service's error envelope (`error_code` / `error_msg`) is not
//! parsed here. File problems are reported before any request is sent.

use std::path::PathBuf;

/// Errors returned by the live detect client, transport and facade.
#[derive(Debug, thiserror::Error)]
pub enum FrsError {
    /// A local upload file is missing or could not be read.
    #[error("cannot read {}: {source}", .path.display())]
    FileAccess {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The transport failed before a response was received.
    #[error("transport failed: {0}")]
    Transport(String),

    /// The service answered with a non-2xx status.
    #[error("HTTP {status}: {body}")]
    Service { status: u16, body: String },

    /// A 2xx response body was not valid JSON for the expected result.
    #[error("malformed response: {0}")]
    MalformedResponse(String),

    /// The request payload could not be serialized to JSON.
    #[error("serialization failed: {0}")]
    Serialization(String),

    /// Client configuration is missing or invalid.
    #[error("invalid configuration: {0}")]
    Config(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn service_error_displays_status_and_body() {
        let err = FrsError::Service {
            status: 400,
            body: r#"{"error_code":"FRS.0001"}"#.to_string(),
        };
        assert_eq!(err.to_string(), r#"HTTP 400: {"error_code":"FRS.0001"}"#);
    }

    #[test]
    fn file_access_error_names_the_path() {
        let err = FrsError::FileAccess {
            path: PathBuf::from("/nope/video.mp4"),
            source: std::io::Error::new(std::io::ErrorKind::NotFound, "not found"),
        };
        assert!(err.to_string().starts_with("cannot read /nope/video.mp4"));
    }
}
