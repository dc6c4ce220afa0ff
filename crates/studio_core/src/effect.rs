use std::path::PathBuf;
use std::time::Duration;

use crate::{JobId, SubmissionId};

/// Side effects requested by [`crate::update`]; executed by the app's effect runner.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Effect {
    /// Upload the file at `path` to the job-creation endpoint.
    SubmitFile {
        submission: SubmissionId,
        path: PathBuf,
    },
    /// Fetch the job status once after `after` has elapsed.
    SchedulePoll {
        submission: SubmissionId,
        job_id: JobId,
        after: Duration,
    },
    /// The submission is no longer live; cancel anything still pending for it.
    EndSubmission { submission: SubmissionId },
}
