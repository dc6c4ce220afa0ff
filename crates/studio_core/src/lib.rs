//! Studio core: pure job-submission state machine and view-model helpers.
mod effect;
mod msg;
mod state;
mod update;
mod view_model;

pub use effect::Effect;
pub use msg::Msg;
pub use state::{
    AppState, Job, JobId, JobStatus, SelectedFile, StatusUpdate, SubmissionId, POLL_INTERVAL,
    STATUS_FAILED_MESSAGE, SUBMIT_FAILED_MESSAGE,
};
pub use update::update;
pub use view_model::{AppViewModel, BadgeTone, IDLE_BADGE, SUBMIT_LABEL, UPLOADING_LABEL};
