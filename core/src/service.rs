//! Blocking facade: build a request, run it through a transport, parse.
//!
//! Each operation is a straight line with no retries. File-based calls read
//! the whole file before the transport is touched, so a missing file fails
//! with `FrsError::FileAccess` and no request is sent.

use std::path::Path;

use tracing::instrument;

use crate::client::LiveDetectClient;
use crate::config::FrsConfig;
use crate::error::FrsError;
use crate::media::{ImageType, MediaSource, UploadFile};
use crate::transport::Transport;
use crate::types::{LiveDetectResult, LiveDetectSilentResult};

/// Live detect service bound to one project and one transport.
///
/// Holds no mutable state, so a shared reference can be used from several
/// threads when the transport allows it.
#[derive(Debug, Clone)]
pub struct LiveDetectService<T> {
    client: LiveDetectClient,
    transport: T,
}

impl<T: Transport> LiveDetectService<T> {
    pub fn new(config: FrsConfig, transport: T) -> Self {
        Self {
            client: LiveDetectClient::new(config),
            transport,
        }
    }

    pub fn client(&self) -> &LiveDetectClient {
        &self.client
    }

    pub fn transport(&self) -> &T {
        &self.transport
    }

    /// Video live detect, dispatching on where the video comes from.
    pub fn live_detect(
        &self,
        video: &MediaSource,
        actions: &str,
        action_time: Option<&str>,
    ) -> Result<LiveDetectResult, FrsError> {
        match video {
            MediaSource::Inline { data, encoding } => {
                let request = self.client.build_live_detect(data, *encoding, actions, action_time)?;
                self.client.parse_live_detect(self.transport.execute(request)?)
            }
            MediaSource::LocalFile(path) => self.live_detect_by_file(path, actions, action_time),
        }
    }

    #[instrument(skip_all, fields(actions = %actions))]
    pub fn live_detect_by_base64(
        &self,
        video_base64: &str,
        actions: &str,
        action_time: Option<&str>,
    ) -> Result<LiveDetectResult, FrsError> {
        let request =
            self.client
                .build_live_detect(video_base64, ImageType::Base64, actions, action_time)?;
        self.client.parse_live_detect(self.transport.execute(request)?)
    }

    #[instrument(skip_all, fields(path = %video_path.display(), actions = %actions))]
    pub fn live_detect_by_file(
        &self,
        video_path: &Path,
        actions: &str,
        action_time: Option<&str>,
    ) -> Result<LiveDetectResult, FrsError> {
        let video = UploadFile::from_path(video_path)?;
        self.live_detect_by_upload(video, actions, action_time)
    }

    /// Video live detect from bytes already read, e.g. via
    /// `UploadFile::from_reader` on an open file handle.
    pub fn live_detect_by_upload(
        &self,
        video: UploadFile,
        actions: &str,
        action_time: Option<&str>,
    ) -> Result<LiveDetectResult, FrsError> {
        let request = self.client.build_live_detect_file(video, actions, action_time);
        self.client.parse_live_detect(self.transport.execute(request)?)
    }

    #[instrument(skip_all, fields(url = %url_for_log(video_url), actions = %actions))]
    pub fn live_detect_by_obs_url(
        &self,
        video_url: &str,
        actions: &str,
        action_time: Option<&str>,
    ) -> Result<LiveDetectResult, FrsError> {
        let request =
            self.client
                .build_live_detect(video_url, ImageType::ObsUrl, actions, action_time)?;
        self.client.parse_live_detect(self.transport.execute(request)?)
    }

    /// Silent live detect, dispatching on where the photo comes from.
    pub fn live_detect_silent(&self, image: &MediaSource) -> Result<LiveDetectSilentResult, FrsError> {
        match image {
            MediaSource::Inline { data, encoding } => {
                let request = self.client.build_live_detect_silent(data, *encoding)?;
                self.client.parse_live_detect_silent(self.transport.execute(request)?)
            }
            MediaSource::LocalFile(path) => self.live_detect_silent_by_file(path),
        }
    }

    #[instrument(skip_all, fields(path = %image_path.display()))]
    pub fn live_detect_silent_by_file(
        &self,
        image_path: &Path,
    ) -> Result<LiveDetectSilentResult, FrsError> {
        let image = UploadFile::from_path(image_path)?;
        self.live_detect_silent_by_upload(image)
    }

    pub fn live_detect_silent_by_upload(
        &self,
        image: UploadFile,
    ) -> Result<LiveDetectSilentResult, FrsError> {
        let request = self.client.build_live_detect_silent_file(image);
        self.client.parse_live_detect_silent(self.transport.execute(request)?)
    }

    #[instrument(skip_all)]
    pub fn live_detect_silent_by_base64(
        &self,
        image_base64: &str,
    ) -> Result<LiveDetectSilentResult, FrsError> {
        let request = self.client.build_live_detect_silent(image_base64, ImageType::Base64)?;
        self.client.parse_live_detect_silent(self.transport.execute(request)?)
    }

    #[instrument(skip_all, fields(url = %url_for_log(image_url)))]
    pub fn live_detect_silent_by_obs_url(
        &self,
        image_url: &str,
    ) -> Result<LiveDetectSilentResult, FrsError> {
        let request = self.client.build_live_detect_silent(image_url, ImageType::ObsUrl)?;
        self.client.parse_live_detect_silent(self.transport.execute(request)?)
    }
}

/// Scheme, host and path of an OBS URL. Query strings of presigned URLs
/// carry credentials and never reach a span.
fn url_for_log(url: &str) -> String {
    let end = url.find(['?', '#']).unwrap_or(url.len());
    let url = &url[..end];
    match (url.find("://"), url.find('@')) {
        (Some(scheme), Some(at)) if at > scheme => format!("{}{}", &url[..scheme + 3], &url[at + 1..]),
        _ => url.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn log_url_drops_presigned_query() {
        assert_eq!(
            url_for_log("https://bucket.obs.example.com/v.mp4?AccessKeyId=AK&Signature=abc&Expires=1"),
            "https://bucket.obs.example.com/v.mp4"
        );
        assert_eq!(url_for_log("obs://bucket/face.jpg#frag"), "obs://bucket/face.jpg");
    }

    #[test]
    fn log_url_drops_userinfo() {
        assert_eq!(url_for_log("https://ak:sk@bucket.obs.example.com/a.jpg"), "https://bucket.obs.example.com/a.jpg");
    }

    #[test]
    fn log_url_keeps_plain_reference() {
        assert_eq!(url_for_log("obs://bucket/a.jpg"), "obs://bucket/a.jpg");
    }
}
