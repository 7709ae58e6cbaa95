//! Stateless HTTP request builder and response parser for live detect.
//!
//! # Design
//! `LiveDetectClient` holds only a `FrsConfig` and carries no mutable state
//! between calls. Each operation is split into a `build_*` method that
//! produces an `HttpRequest` and a `parse_*` method that consumes an
//! `HttpResponse`. The caller (or `LiveDetectService`) executes the actual
//! round-trip, keeping this layer deterministic and free of network I/O.
//!
//! Inline payloads are sent as JSON, local files as multipart forms.

use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use tracing::{debug, warn};

use crate::config::FrsConfig;
use crate::error::FrsError;
use crate::http::{HttpBody, HttpMethod, HttpRequest, HttpResponse, MultipartForm};
use crate::media::{ImageType, UploadFile};
use crate::types::{LiveDetectResult, LiveDetectSilentResult};

pub const JSON_CONTENT_TYPE: &str = "application/json; charset=utf-8";
pub const PROJECT_ID_HEADER: &str = "X-Project-Id";

/// Synchronous, stateless client for the live detect endpoints.
#[derive(Debug, Clone)]
pub struct LiveDetectClient {
    config: FrsConfig,
}

impl LiveDetectClient {
    pub fn new(config: FrsConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FrsConfig {
        &self.config
    }

    /// Video live detect with an inline payload. `action_time` is omitted
    /// from the body when `None`.
    pub fn build_live_detect(
        &self,
        video: &str,
        encoding: ImageType,
        actions: &str,
        action_time: Option<&str>,
    ) -> Result<HttpRequest, FrsError> {
        let mut body = Map::new();
        body.insert(encoding.json_key("video"), Value::from(video));
        body.insert("actions".to_string(), Value::from(actions));
        if let Some(action_time) = action_time {
            body.insert("action_time".to_string(), Value::from(action_time));
        }
        self.json_request(self.config.live_detect_url(), &body)
    }

    /// Video live detect with an uploaded file.
    pub fn build_live_detect_file(
        &self,
        video: UploadFile,
        actions: &str,
        action_time: Option<&str>,
    ) -> HttpRequest {
        let mut form = MultipartForm::new()
            .file("video_file", &video.filename, video.bytes)
            .text("actions", actions);
        if let Some(action_time) = action_time {
            form = form.text("action_time", action_time);
        }
        self.multipart_request(self.config.live_detect_url(), form)
    }

    /// Silent live detect with an inline payload.
    pub fn build_live_detect_silent(
        &self,
        image: &str,
        encoding: ImageType,
    ) -> Result<HttpRequest, FrsError> {
        let mut body = Map::new();
        body.insert(encoding.json_key("image"), Value::from(image));
        self.json_request(self.config.live_detect_silent_url(), &body)
    }

    /// Silent live detect with an uploaded file.
    pub fn build_live_detect_silent_file(&self, image: UploadFile) -> HttpRequest {
        let form = MultipartForm::new().file("image_file", &image.filename, image.bytes);
        self.multipart_request(self.config.live_detect_silent_url(), form)
    }

    pub fn parse_live_detect(&self, response: HttpResponse) -> Result<LiveDetectResult, FrsError> {
        parse_json(response)
    }

    pub fn parse_live_detect_silent(
        &self,
        response: HttpResponse,
    ) -> Result<LiveDetectSilentResult, FrsError> {
        parse_json(response)
    }

    fn json_request(&self, path: String, body: &Map<String, Value>) -> Result<HttpRequest, FrsError> {
        let body = serde_json::to_string(body).map_err(|e| FrsError::Serialization(e.to_string()))?;
        debug!(%path, kind = "json", "built live detect request");
        Ok(HttpRequest {
            method: HttpMethod::Post,
            path,
            headers: vec![
                ("content-type".to_string(), JSON_CONTENT_TYPE.to_string()),
                (PROJECT_ID_HEADER.to_string(), self.config.project_id().to_string()),
            ],
            body: Some(HttpBody::Json(body)),
        })
    }

    fn multipart_request(&self, path: String, form: MultipartForm) -> HttpRequest {
        debug!(%path, kind = "multipart", parts = form.parts().len(), "built live detect request");
        HttpRequest {
            method: HttpMethod::Post,
            path,
            headers: vec![
                ("content-type".to_string(), form.content_type()),
                (PROJECT_ID_HEADER.to_string(), self.config.project_id().to_string()),
            ],
            body: Some(HttpBody::Multipart(form)),
        }
    }
}

/// Map a response onto `T`: non-2xx becomes `Service`, unparseable bodies
/// become `MalformedResponse`.
fn parse_json<T: DeserializeOwned>(response: HttpResponse) -> Result<T, FrsError> {
    if !response.is_success() {
        warn!(status = response.status, "live detect service returned an error");
        return Err(FrsError::Service {
            status: response.status,
            body: response.body,
        });
    }
    let parsed = serde_json::from_str(&response.body).map_err(|e| {
        warn!(status = response.status, error = %e, "live detect response is not valid JSON");
        FrsError::MalformedResponse(e.to_string())
    })?;
    debug!(status = response.status, "parsed live detect response");
    Ok(parsed)
}
