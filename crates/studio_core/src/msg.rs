use crate::{JobId, SelectedFile, StatusUpdate, SubmissionId};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Msg {
    /// User picked a file (or cleared the selection).
    FileSelected(Option<SelectedFile>),
    /// User pressed the convert button.
    SubmitClicked,
    /// Job-creation endpoint accepted the upload.
    SubmitSucceeded {
        submission: SubmissionId,
        job_id: JobId,
    },
    /// Upload failed: network, non-2xx, or unreadable file.
    SubmitFailed { submission: SubmissionId },
    /// Status endpoint answered.
    StatusReceived {
        submission: SubmissionId,
        update: StatusUpdate,
    },
    /// Status request failed.
    StatusFailed { submission: SubmissionId },
    /// Fallback for placeholder wiring.
    NoOp,
}
