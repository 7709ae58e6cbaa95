//! Input modalities for photos and videos.
//!
//! Inline payloads (base64 text or an OBS reference) travel in a JSON body;
//! local files travel as bytes in a multipart form.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use crate::error::FrsError;

/// How an inline payload is encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ImageType {
    /// Base64 of the media bytes.
    Base64,
    /// URL of an object already stored in OBS.
    ObsUrl,
}

impl ImageType {
    /// JSON key for this encoding, e.g. `video_base64` or `image_url`.
    pub(crate) fn json_key(self, prefix: &str) -> String {
        match self {
            ImageType::Base64 => format!("{prefix}_base64"),
            ImageType::ObsUrl => format!("{prefix}_url"),
        }
    }
}

/// Where the media for a call comes from.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MediaSource {
    Inline { data: String, encoding: ImageType },
    LocalFile(PathBuf),
}

impl MediaSource {
    pub fn base64(data: impl Into<String>) -> Self {
        MediaSource::Inline {
            data: data.into(),
            encoding: ImageType::Base64,
        }
    }

    pub fn obs_url(url: impl Into<String>) -> Self {
        MediaSource::Inline {
            data: url.into(),
            encoding: ImageType::ObsUrl,
        }
    }

    pub fn file(path: impl Into<PathBuf>) -> Self {
        MediaSource::LocalFile(path.into())
    }
}

/// File contents ready for a multipart upload.
///
/// The file is opened, read and closed inside `from_path`, so no handle
/// outlives the call that builds the request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub filename: String,
    pub bytes: Vec<u8>,
}

impl UploadFile {
    pub fn from_path(path: &Path) -> Result<Self, FrsError> {
        let file_access = |source| FrsError::FileAccess {
            path: path.to_path_buf(),
            source,
        };
        let mut file = File::open(path).map_err(file_access)?;
        let mut bytes = Vec::new();
        file.read_to_end(&mut bytes).map_err(file_access)?;
        let filename = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_default();
        Ok(Self { filename, bytes })
    }

    /// Drain an already open handle. The reader is consumed and dropped
    /// before this returns.
    pub fn from_reader<R: Read>(mut reader: R, filename: &str) -> Result<Self, FrsError> {
        let mut bytes = Vec::new();
        reader
            .read_to_end(&mut bytes)
            .map_err(|source| FrsError::FileAccess {
                path: PathBuf::from(filename),
                source,
            })?;
        Ok(Self {
            filename: filename.to_string(),
            bytes,
        })
    }
}
