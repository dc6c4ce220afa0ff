use std::fmt;
use std::path::PathBuf;

use serde::Deserialize;
use thiserror::Error;

/// Mirrors the core's submission ticket; every result is tagged with it.
pub type SubmissionId = u64;

/// Body of a successful `POST /api/generate`.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct CreatedJob {
    #[serde(rename = "jobId")]
    pub job_id: String,
}

/// Body of `GET /api/jobs/{id}`. Every field is optional on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct JobStatusReport {
    pub status: Option<String>,
    pub scene_url: Option<String>,
    pub video_url: Option<String>,
    pub error: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Default, Deserialize)]
pub struct HealthReport {
    #[serde(default)]
    pub ok: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AssetKind {
    Scene,
    Video,
}

impl AssetKind {
    pub fn label(self) -> &'static str {
        match self {
            AssetKind::Scene => "scene",
            AssetKind::Video => "video",
        }
    }

    pub(crate) fn default_extension(self) -> &'static str {
        match self {
            AssetKind::Scene => "png",
            AssetKind::Video => "mp4",
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum EngineEvent {
    Submitted {
        submission: SubmissionId,
        result: Result<CreatedJob, ApiError>,
    },
    StatusFetched {
        submission: SubmissionId,
        job_id: String,
        result: Result<JobStatusReport, ApiError>,
    },
    AssetSaved {
        job_id: String,
        kind: AssetKind,
        result: Result<PathBuf, ApiError>,
    },
    HealthChecked {
        result: Result<HealthReport, ApiError>,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind}: {message}")]
pub struct ApiError {
    pub kind: FailureKind,
    pub message: String,
}

impl ApiError {
    pub(crate) fn new(kind: FailureKind, message: impl Into<String>) -> Self {
        Self {
            kind,
            message: message.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FailureKind {
    InvalidUrl,
    HttpStatus(u16),
    Timeout,
    Network,
    Decode,
    UnsupportedFile { extension: Option<String> },
    TooLarge { max_bytes: u64, actual: Option<u64> },
    Io,
}

impl fmt::Display for FailureKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            FailureKind::InvalidUrl => write!(f, "invalid url"),
            FailureKind::HttpStatus(code) => write!(f, "http status {code}"),
            FailureKind::Timeout => write!(f, "timeout"),
            FailureKind::Network => write!(f, "network error"),
            FailureKind::Decode => write!(f, "malformed response body"),
            FailureKind::UnsupportedFile { extension } => match extension {
                Some(ext) => write!(f, "unsupported file type .{ext}"),
                None => write!(f, "unsupported file type"),
            },
            FailureKind::TooLarge { max_bytes, actual } => {
                write!(f, "payload too large (max {max_bytes}, actual {actual:?})")
            }
            FailureKind::Io => write!(f, "io error"),
        }
    }
}

#[derive(Debug, Error)]
pub enum EngineError {
    #[error("failed to start async runtime: {0}")]
    Runtime(#[from] std::io::Error),
    #[error("failed to build http client: {0}")]
    Client(#[from] ApiError),
}
