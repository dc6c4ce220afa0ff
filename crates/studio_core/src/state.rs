use std::fmt;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::view_model::{AppViewModel, BadgeTone, IDLE_BADGE, SUBMIT_LABEL, UPLOADING_LABEL};

/// Delay between two status requests for the same job.
pub const POLL_INTERVAL: Duration = Duration::from_millis(1500);

pub const SUBMIT_FAILED_MESSAGE: &str = "Failed to submit floorplan";
pub const STATUS_FAILED_MESSAGE: &str = "Failed to fetch job status";

/// Client-side ticket identifying one submission. Results carrying any other
/// ticket than the live one are ignored.
pub type SubmissionId = u64;

/// Opaque server-issued job identifier.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct JobId(String);

impl JobId {
    pub fn new(id: impl Into<String>) -> Self {
        Self(id.into())
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for JobId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum JobStatus {
    Queued,
    Running,
    Done,
    Failed,
    /// A status string this client does not know; treated as in progress.
    Other(String),
}

impl JobStatus {
    /// Parses a server status string. Blank input means "no status".
    pub fn parse(raw: &str) -> Option<Self> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return None;
        }
        let status = match trimmed.to_ascii_lowercase().as_str() {
            "queued" => Self::Queued,
            "running" => Self::Running,
            "done" => Self::Done,
            "failed" => Self::Failed,
            _ => Self::Other(trimmed.to_string()),
        };
        Some(status)
    }

    pub fn as_str(&self) -> &str {
        match self {
            Self::Queued => "queued",
            Self::Running => "running",
            Self::Done => "done",
            Self::Failed => "failed",
            Self::Other(raw) => raw,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Done | Self::Failed)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SelectedFile {
    pub path: PathBuf,
    pub name: String,
}

impl SelectedFile {
    pub fn from_path(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        let name = path
            .file_name()
            .map(|name| name.to_string_lossy().into_owned())
            .unwrap_or_else(|| path.display().to_string());
        Self {
            path: path.to_path_buf(),
            name,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Job {
    pub id: Option<JobId>,
    pub status: Option<JobStatus>,
    pub scene_url: Option<String>,
    pub video_url: Option<String>,
    pub error: Option<String>,
}

/// One status response, as received. Empty strings count as absent.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct StatusUpdate {
    pub status: Option<String>,
    pub scene_url: Option<String>,
    pub video_url: Option<String>,
    pub error: Option<String>,
}

pub(crate) struct Submission {
    pub id: SubmissionId,
    pub path: PathBuf,
    pub replaced: Option<SubmissionId>,
}

pub(crate) enum PollOutcome {
    Continue(JobId),
    Finished,
    Stale,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AppState {
    file: Option<SelectedFile>,
    job: Job,
    uploading: bool,
    live: Option<SubmissionId>,
    last_submission: SubmissionId,
    poll_interval: Duration,
    dirty: bool,
}

impl Default for AppState {
    fn default() -> Self {
        Self {
            file: None,
            job: Job::default(),
            uploading: false,
            live: None,
            last_submission: 0,
            poll_interval: POLL_INTERVAL,
            dirty: false,
        }
    }
}

impl AppState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_poll_interval(poll_interval: Duration) -> Self {
        Self {
            poll_interval,
            ..Self::default()
        }
    }

    pub fn view(&self) -> AppViewModel {
        let status = self.job.status.as_ref();
        let badge_tone = match status {
            Some(JobStatus::Done) => BadgeTone::Done,
            Some(JobStatus::Failed) => BadgeTone::Failed,
            Some(JobStatus::Running) => BadgeTone::Running,
            _ => BadgeTone::Neutral,
        };
        let badge_text = status
            .map(|status| status.as_str().to_uppercase())
            .unwrap_or_else(|| IDLE_BADGE.to_string());

        AppViewModel {
            file_name: self.file.as_ref().map(|file| file.name.clone()),
            badge_text,
            badge_tone,
            submit_enabled: self.file.is_some() && !self.uploading,
            submit_label: if self.uploading {
                UPLOADING_LABEL
            } else {
                SUBMIT_LABEL
            },
            job_id: self.job.id.as_ref().map(|id| id.to_string()),
            error: self.job.error.clone(),
            scene_url: self.job.scene_url.clone(),
            video_url: self.job.video_url.clone(),
            is_terminal: status.is_some_and(JobStatus::is_terminal),
        }
    }

    pub fn consume_dirty(&mut self) -> bool {
        std::mem::take(&mut self.dirty)
    }

    pub fn file(&self) -> Option<&SelectedFile> {
        self.file.as_ref()
    }

    pub fn job(&self) -> &Job {
        &self.job
    }

    pub fn is_uploading(&self) -> bool {
        self.uploading
    }

    /// The submission whose upload or polling is still in progress.
    pub fn live_submission(&self) -> Option<SubmissionId> {
        self.live
    }

    pub fn poll_interval(&self) -> Duration {
        self.poll_interval
    }

    fn mark_dirty(&mut self) {
        self.dirty = true;
    }

    /// Replaces the selection and resets the job. Returns the submission that
    /// was live, if any, so its pending work can be cancelled.
    pub(crate) fn select_file(&mut self, file: Option<SelectedFile>) -> Option<SubmissionId> {
        self.file = file;
        self.job = Job::default();
        self.uploading = false;
        self.mark_dirty();
        self.live.take()
    }

    pub(crate) fn begin_submission(&mut self) -> Option<Submission> {
        if self.uploading {
            return None;
        }
        let path = self.file.as_ref()?.path.clone();

        self.last_submission += 1;
        let id = self.last_submission;
        let replaced = self.live.replace(id);
        self.uploading = true;
        self.job = Job {
            status: Some(JobStatus::Queued),
            ..Job::default()
        };
        self.mark_dirty();
        Some(Submission { id, path, replaced })
    }

    pub(crate) fn apply_created(&mut self, submission: SubmissionId, job_id: JobId) -> bool {
        if self.live != Some(submission) || !self.uploading {
            return false;
        }
        self.uploading = false;
        self.job.id = Some(job_id);
        self.job.status = Some(JobStatus::Running);
        self.mark_dirty();
        true
    }

    pub(crate) fn apply_submit_failed(&mut self, submission: SubmissionId) -> bool {
        if self.live != Some(submission) || !self.uploading {
            return false;
        }
        self.uploading = false;
        self.live = None;
        self.job = Job {
            status: Some(JobStatus::Failed),
            error: Some(SUBMIT_FAILED_MESSAGE.to_string()),
            ..Job::default()
        };
        self.mark_dirty();
        true
    }

    pub(crate) fn apply_status(
        &mut self,
        submission: SubmissionId,
        update: StatusUpdate,
    ) -> PollOutcome {
        if self.live != Some(submission) || self.uploading {
            return PollOutcome::Stale;
        }
        let Some(job_id) = self.job.id.clone() else {
            return PollOutcome::Stale;
        };

        if let Some(status) = update.status.as_deref().and_then(JobStatus::parse) {
            self.job.status = Some(status);
        }
        self.job.scene_url = non_empty(update.scene_url);
        self.job.video_url = non_empty(update.video_url);
        self.job.error = non_empty(update.error);
        self.mark_dirty();

        if self.job.status.as_ref().is_some_and(JobStatus::is_terminal) {
            self.live = None;
            PollOutcome::Finished
        } else {
            PollOutcome::Continue(job_id)
        }
    }

    pub(crate) fn apply_status_failed(&mut self, submission: SubmissionId) -> bool {
        if self.live != Some(submission) || self.uploading {
            return false;
        }
        self.live = None;
        self.job.error = Some(STATUS_FAILED_MESSAGE.to_string());
        self.mark_dirty();
        true
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|text| !text.is_empty())
}
