//! Endpoint and project settings shared by every call.

use crate::error::FrsError;

pub const ENDPOINT_VAR: &str = "FRS_ENDPOINT";
pub const PROJECT_ID_VAR: &str = "FRS_PROJECT_ID";

const LIVE_DETECT_URI: &str = "/v1/{project_id}/live-detect";
const LIVE_DETECT_SILENT_URI: &str = "/v1/{project_id}/live-detect-face";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FrsConfig {
    endpoint: String,
    project_id: String,
}

impl FrsConfig {
    pub fn new(endpoint: &str, project_id: &str) -> Self {
        Self {
            endpoint: endpoint.trim_end_matches('/').to_string(),
            project_id: project_id.to_string(),
        }
    }

    /// Read `FRS_ENDPOINT` and `FRS_PROJECT_ID`.
    pub fn from_env() -> Result<Self, FrsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, FrsError> {
        let require = |key: &str| {
            lookup(key)
                .filter(|value| !value.is_empty())
                .ok_or_else(|| FrsError::Config(format!("{key} is not set")))
        };
        let endpoint = require(ENDPOINT_VAR)?;
        let project_id = require(PROJECT_ID_VAR)?;
        Ok(Self::new(&endpoint, &project_id))
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    pub fn project_id(&self) -> &str {
        &self.project_id
    }

    /// Full URL of the video live detect endpoint.
    pub fn live_detect_url(&self) -> String {
        self.resolve(LIVE_DETECT_URI)
    }

    /// Full URL of the silent live detect endpoint.
    pub fn live_detect_silent_url(&self) -> String {
        self.resolve(LIVE_DETECT_SILENT_URI)
    }

    fn resolve(&self, template: &str) -> String {
        format!(
            "{}{}",
            self.endpoint,
            template.replace("{project_id}", &self.project_id)
        )
    }
}
