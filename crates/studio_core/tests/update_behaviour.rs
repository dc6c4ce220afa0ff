use std::path::PathBuf;
use std::sync::Once;

use pretty_assertions::assert_eq;
use studio_core::{
    update, AppState, BadgeTone, Effect, JobId, Msg, SelectedFile, StatusUpdate, IDLE_BADGE,
    SUBMIT_FAILED_MESSAGE, SUBMIT_LABEL, UPLOADING_LABEL,
};

fn init_logging() {
    static INIT: Once = Once::new();
    INIT.call_once(studio_logging::initialize_for_tests);
}

fn select(state: AppState, path: &str) -> (AppState, Vec<Effect>) {
    update(state, Msg::FileSelected(Some(SelectedFile::from_path(path))))
}

#[test]
fn initial_view_is_idle_with_disabled_button() {
    init_logging();
    let view = AppState::new().view();

    assert_eq!(view.badge_text, IDLE_BADGE);
    assert_eq!(view.badge_tone, BadgeTone::Neutral);
    assert!(!view.submit_enabled);
    assert_eq!(view.submit_label, SUBMIT_LABEL);
    assert_eq!(view.file_name, None);
}

#[test]
fn submit_without_file_is_noop() {
    init_logging();
    let state = AppState::new();
    let (next, effects) = update(state.clone(), Msg::SubmitClicked);

    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn selecting_file_enables_submit() {
    init_logging();
    let (mut state, effects) = select(AppState::new(), "/plans/house.png");
    let view = state.view();

    assert!(effects.is_empty());
    assert!(view.submit_enabled);
    assert_eq!(view.file_name.as_deref(), Some("house.png"));
    assert_eq!(view.badge_text, IDLE_BADGE);
    assert!(state.consume_dirty());
    assert!(!state.consume_dirty());
}

#[test]
fn submit_marks_queued_and_emits_upload() {
    init_logging();
    let (state, _) = select(AppState::new(), "/plans/house.png");
    let (state, effects) = update(state, Msg::SubmitClicked);
    let view = state.view();

    assert_eq!(
        effects,
        vec![Effect::SubmitFile {
            submission: 1,
            path: PathBuf::from("/plans/house.png"),
        }]
    );
    assert_eq!(view.badge_text, "QUEUED");
    assert_eq!(view.badge_tone, BadgeTone::Neutral);
    assert!(!view.submit_enabled);
    assert_eq!(view.submit_label, UPLOADING_LABEL);
    assert_eq!(view.job_id, None);
    assert!(state.is_uploading());
}

#[test]
fn second_click_while_uploading_is_ignored() {
    init_logging();
    let (state, _) = select(AppState::new(), "/plans/house.png");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (next, effects) = update(state.clone(), Msg::SubmitClicked);

    assert_eq!(next, state);
    assert!(effects.is_empty());
}

#[test]
fn successful_create_moves_to_running_and_polls_immediately() {
    init_logging();
    let (state, _) = select(AppState::new(), "/plans/house.png");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, effects) = update(
        state,
        Msg::SubmitSucceeded {
            submission: 1,
            job_id: JobId::new("ab12cd34"),
        },
    );
    let view = state.view();

    assert_eq!(view.badge_text, "RUNNING");
    assert_eq!(view.badge_tone, BadgeTone::Running);
    assert_eq!(view.job_id.as_deref(), Some("ab12cd34"));
    assert!(view.submit_enabled);
    assert_eq!(
        effects,
        vec![Effect::SchedulePoll {
            submission: 1,
            job_id: JobId::new("ab12cd34"),
            after: std::time::Duration::ZERO,
        }]
    );
}

#[test]
fn create_failure_sets_failed_with_generic_error() {
    init_logging();
    let (state, _) = select(AppState::new(), "/plans/house.png");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, effects) = update(state, Msg::SubmitFailed { submission: 1 });
    let view = state.view();

    assert_eq!(view.badge_text, "FAILED");
    assert_eq!(view.badge_tone, BadgeTone::Failed);
    assert_eq!(view.error.as_deref(), Some(SUBMIT_FAILED_MESSAGE));
    assert_eq!(view.job_id, None);
    assert!(view.is_terminal);
    assert!(view.submit_enabled);
    assert_eq!(state.live_submission(), None);
    assert_eq!(effects, vec![Effect::EndSubmission { submission: 1 }]);
}

#[test]
fn selecting_new_file_resets_job_and_ends_live_submission() {
    init_logging();
    let (state, _) = select(AppState::new(), "/plans/house.png");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            submission: 1,
            job_id: JobId::new("job-1"),
        },
    );

    let (state, effects) = select(state, "/plans/office.jpg");
    let view = state.view();

    assert_eq!(effects, vec![Effect::EndSubmission { submission: 1 }]);
    assert_eq!(view.badge_text, IDLE_BADGE);
    assert_eq!(view.job_id, None);
    assert_eq!(view.error, None);
    assert_eq!(view.scene_url, None);
    assert_eq!(view.file_name.as_deref(), Some("office.jpg"));
    assert_eq!(state.live_submission(), None);
}

#[test]
fn selecting_file_mid_upload_clears_uploading_flag() {
    init_logging();
    let (state, _) = select(AppState::new(), "/plans/house.png");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, effects) = select(state, "/plans/office.jpg");

    assert_eq!(effects, vec![Effect::EndSubmission { submission: 1 }]);
    assert!(!state.is_uploading());
    assert!(state.view().submit_enabled);

    // The orphaned upload finishing later must not resurrect the old job.
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::SubmitSucceeded {
            submission: 1,
            job_id: JobId::new("late"),
        },
    );
    assert_eq!(state, before);
    assert!(effects.is_empty());
}

#[test]
fn clearing_selection_disables_submit() {
    init_logging();
    let (state, _) = select(AppState::new(), "/plans/house.png");
    let (state, effects) = update(state, Msg::FileSelected(None));

    assert!(effects.is_empty());
    assert!(!state.view().submit_enabled);
    assert_eq!(state.view().file_name, None);
}

#[test]
fn resubmitting_ends_previous_submission() {
    init_logging();
    let (state, _) = select(AppState::new(), "/plans/house.png");
    let (state, _) = update(state, Msg::SubmitClicked);
    let (state, _) = update(
        state,
        Msg::SubmitSucceeded {
            submission: 1,
            job_id: JobId::new("job-1"),
        },
    );
    let (state, effects) = update(state, Msg::SubmitClicked);

    assert_eq!(
        effects,
        vec![
            Effect::EndSubmission { submission: 1 },
            Effect::SubmitFile {
                submission: 2,
                path: PathBuf::from("/plans/house.png"),
            },
        ]
    );
    assert_eq!(state.view().badge_text, "QUEUED");
    assert_eq!(state.live_submission(), Some(2));

    // Status for the replaced job is dropped.
    let before = state.clone();
    let (state, effects) = update(
        state,
        Msg::StatusReceived {
            submission: 1,
            update: StatusUpdate {
                status: Some("done".into()),
                ..StatusUpdate::default()
            },
        },
    );
    assert_eq!(state, before);
    assert!(effects.is_empty());
}
