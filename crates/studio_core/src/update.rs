use std::time::Duration;

use crate::state::PollOutcome;
use crate::{AppState, Effect, Msg};

/// Pure update function: applies a message to state and returns any effects.
pub fn update(mut state: AppState, msg: Msg) -> (AppState, Vec<Effect>) {
    let effects = match msg {
        Msg::FileSelected(file) => state
            .select_file(file)
            .map(|submission| Effect::EndSubmission { submission })
            .into_iter()
            .collect(),
        Msg::SubmitClicked => match state.begin_submission() {
            Some(submission) => {
                let mut effects = Vec::with_capacity(2);
                if let Some(replaced) = submission.replaced {
                    effects.push(Effect::EndSubmission {
                        submission: replaced,
                    });
                }
                effects.push(Effect::SubmitFile {
                    submission: submission.id,
                    path: submission.path,
                });
                effects
            }
            None => Vec::new(),
        },
        Msg::SubmitSucceeded { submission, job_id } => {
            if state.apply_created(submission, job_id.clone()) {
                // First status request goes out right away.
                vec![Effect::SchedulePoll {
                    submission,
                    job_id,
                    after: Duration::ZERO,
                }]
            } else {
                Vec::new()
            }
        }
        Msg::SubmitFailed { submission } => {
            if state.apply_submit_failed(submission) {
                vec![Effect::EndSubmission { submission }]
            } else {
                Vec::new()
            }
        }
        Msg::StatusReceived { submission, update } => {
            match state.apply_status(submission, update) {
                PollOutcome::Continue(job_id) => vec![Effect::SchedulePoll {
                    submission,
                    job_id,
                    after: state.poll_interval(),
                }],
                PollOutcome::Finished => vec![Effect::EndSubmission { submission }],
                PollOutcome::Stale => Vec::new(),
            }
        }
        Msg::StatusFailed { submission } => {
            if state.apply_status_failed(submission) {
                vec![Effect::EndSubmission { submission }]
            } else {
                Vec::new()
            }
        }
        Msg::NoOp => Vec::new(),
    };

    (state, effects)
}
