//! Client SDK for the Face Recognition Service live detect endpoints.
//!
//! # Overview
//! Builds `HttpRequest` values and parses `HttpResponse` values without
//! touching the network (host-does-IO pattern). `LiveDetectService` wires
//! the two halves together through a `Transport`, with `UreqTransport` as
//! the blocking default.
//!
//! # Design
//! - `LiveDetectClient` is stateless; it holds only `FrsConfig`.
//! - Each operation is split into `build_*` (produces request) and
//!   `parse_*` (consumes response), so the I/O boundary is explicit.
//! - Inline payloads (base64 or OBS URL) go out as JSON, local files as
//!   multipart forms.
//! - Result types are plain serde records, lenient on missing and unknown
//!   fields.

pub mod client;
pub mod config;
pub mod error;
pub mod http;
pub mod media;
pub mod service;
pub mod transport;
pub mod types;

pub use client::LiveDetectClient;
pub use config::FrsConfig;
pub use error::FrsError;
pub use http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm, PartValue};
pub use media::{ImageType, MediaSource, UploadFile};
pub use service::LiveDetectService;
pub use transport::{Transport, UreqTransport};
pub use types::{
    ActionDetail, LiveDetectResult, LiveDetectSilentResult, SilentResult, VideoResult, Warning,
};
