use std::collections::HashMap;

use axum::{
    extract::{FromRequest, Multipart, Path, Request},
    http::{header, HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use tokio::net::TcpListener;
use tracing::{info, warn};

pub const PROJECT_ID_HEADER: &str = "x-project-id";

/// Marker that makes the mock report a spoof: any inline payload or upload
/// filename containing it is judged not alive.
pub const SPOOF_MARKER: &str = "spoof";

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LiveDetectResult {
    #[serde(rename = "video-result")]
    pub video_result: VideoResult,
    #[serde(rename = "warning-list")]
    pub warning_list: Vec<Warning>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct VideoResult {
    pub alive: bool,
    pub actions: Vec<ActionDetail>,
    pub picture: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ActionDetail {
    pub action: i32,
    pub confidence: f64,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct LiveDetectSilentResult {
    pub result: SilentResult,
    #[serde(rename = "warning-list")]
    pub warning_list: Vec<Warning>,
}

#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct SilentResult {
    pub alive: bool,
    pub confidence: f64,
    pub picture: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Warning {
    pub warning_code: i32,
    pub warning_msg: String,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error_code: String,
    pub error_msg: String,
}

/// Text fields and uploaded files of one request, whatever its encoding.
#[derive(Debug, Default)]
struct DetectInput {
    fields: HashMap<String, String>,
    files: HashMap<String, String>,
}

impl DetectInput {
    /// The media payload under exactly one of `keys`, as the value used for
    /// spoof detection (inline text, or the upload filename).
    fn media(&self, keys: [&str; 3]) -> Result<&str, Response> {
        let present: Vec<&str> = keys
            .iter()
            .filter_map(|key| {
                self.fields
                    .get(*key)
                    .or_else(|| self.files.get(*key))
                    .map(String::as_str)
            })
            .collect();
        match present.as_slice() {
            [one] => Ok(*one),
            [] => Err(reject(
                StatusCode::BAD_REQUEST,
                "FRS.0201",
                &format!("one of {} is required", keys.join(", ")),
            )),
            _ => Err(reject(
                StatusCode::BAD_REQUEST,
                "FRS.0201",
                &format!("only one of {} may be given", keys.join(", ")),
            )),
        }
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/v1/{project_id}/live-detect", post(live_detect))
        .route("/v1/{project_id}/live-detect-face", post(live_detect_silent))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

fn reject(status: StatusCode, code: &str, msg: &str) -> Response {
    warn!(%status, code, msg, "rejecting request");
    let body = ErrorBody {
        error_code: code.to_string(),
        error_msg: msg.to_string(),
    };
    (status, Json(body)).into_response()
}

fn check_project(project_id: &str, headers: &HeaderMap) -> Result<(), Response> {
    match headers.get(PROJECT_ID_HEADER).and_then(|v| v.to_str().ok()) {
        Some(header) if header != project_id => Err(reject(
            StatusCode::FORBIDDEN,
            "FRS.0002",
            "project id does not match the request path",
        )),
        _ => Ok(()),
    }
}

async fn read_input(request: Request) -> Result<DetectInput, Response> {
    let is_multipart = request
        .headers()
        .get(header::CONTENT_TYPE)
        .and_then(|v| v.to_str().ok())
        .is_some_and(|ct| ct.starts_with("multipart/form-data"));

    let mut input = DetectInput::default();
    if is_multipart {
        let mut multipart = Multipart::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        while let Some(field) = multipart
            .next_field()
            .await
            .map_err(IntoResponse::into_response)?
        {
            let name = field.name().unwrap_or_default().to_string();
            match field.file_name().map(str::to_string) {
                Some(filename) => {
                    field.bytes().await.map_err(IntoResponse::into_response)?;
                    input.files.insert(name, filename);
                }
                None => {
                    let text = field.text().await.map_err(IntoResponse::into_response)?;
                    input.fields.insert(name, text);
                }
            }
        }
    } else {
        let Json(body) = Json::<Map<String, Value>>::from_request(request, &())
            .await
            .map_err(IntoResponse::into_response)?;
        for (key, value) in body {
            if let Value::String(text) = value {
                input.fields.insert(key, text);
            }
        }
    }
    Ok(input)
}

/// Parse `"1,2,3"` into action codes. Codes are 1..=4.
fn parse_actions(actions: &str) -> Option<Vec<i32>> {
    let codes: Vec<i32> = actions
        .split(',')
        .map(|code| code.trim().parse::<i32>().ok().filter(|c| (1..=4).contains(c)))
        .collect::<Option<_>>()?;
    (!codes.is_empty()).then_some(codes)
}

async fn live_detect(Path(project_id): Path<String>, request: Request) -> Response {
    if let Err(rejection) = check_project(&project_id, request.headers()) {
        return rejection;
    }
    let input = match read_input(request).await {
        Ok(input) => input,
        Err(rejection) => return rejection,
    };
    let media = match input.media(["video_base64", "video_url", "video_file"]) {
        Ok(media) => media,
        Err(rejection) => return rejection,
    };
    let Some(actions) = input.fields.get("actions").and_then(|a| parse_actions(a)) else {
        return reject(StatusCode::BAD_REQUEST, "FRS.0202", "actions is missing or invalid");
    };

    let alive = !media.contains(SPOOF_MARKER);
    let confidence = if alive { 0.9 } else { 0.1 };
    let result = LiveDetectResult {
        video_result: VideoResult {
            alive,
            actions: actions
                .into_iter()
                .map(|action| ActionDetail { action, confidence })
                .collect(),
            picture: String::new(),
        },
        warning_list: Vec::new(),
    };
    info!(%project_id, alive, "live detect");
    (StatusCode::OK, Json(result)).into_response()
}

async fn live_detect_silent(Path(project_id): Path<String>, request: Request) -> Response {
    if let Err(rejection) = check_project(&project_id, request.headers()) {
        return rejection;
    }
    let input = match read_input(request).await {
        Ok(input) => input,
        Err(rejection) => return rejection,
    };
    let media = match input.media(["image_base64", "image_url", "image_file"]) {
        Ok(media) => media,
        Err(rejection) => return rejection,
    };

    let alive = !media.contains(SPOOF_MARKER);
    let result = LiveDetectSilentResult {
        result: SilentResult {
            alive,
            confidence: if alive { 0.97 } else { 0.12 },
            picture: String::new(),
        },
        warning_list: if alive {
            Vec::new()
        } else {
            vec![Warning {
                warning_code: 1001,
                warning_msg: "suspected spoof".to_string(),
            }]
        },
    };
    info!(%project_id, alive, "silent live detect");
    (StatusCode::OK, Json(result)).into_response()
}
