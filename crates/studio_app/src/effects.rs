use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use studio_core::{AppViewModel, Effect, JobId, Msg, StatusUpdate};
use studio_engine::{AssetKind, EngineEvent, EngineEvents, EngineHandle, JobStatusReport};
use studio_logging::{studio_debug, studio_info, studio_warn};

use crate::app::AppEvent;

/// Executes core effects on the engine and feeds engine results back as events.
pub struct EffectRunner {
    engine: EngineHandle,
    download_dir: Option<PathBuf>,
}

impl EffectRunner {
    pub fn new(
        engine: EngineHandle,
        events: EngineEvents,
        event_tx: mpsc::Sender<AppEvent>,
        download_dir: Option<PathBuf>,
    ) -> Self {
        spawn_event_loop(events, event_tx);
        Self {
            engine,
            download_dir,
        }
    }

    pub fn enqueue(&self, effects: Vec<Effect>) {
        for effect in effects {
            match effect {
                Effect::SubmitFile { submission, path } => {
                    studio_info!("SubmitFile submission={} path={:?}", submission, path);
                    self.engine.submit(submission, path);
                }
                Effect::SchedulePoll {
                    submission,
                    job_id,
                    after,
                } => {
                    studio_debug!(
                        "SchedulePoll submission={} job_id={} after_ms={}",
                        submission,
                        job_id,
                        after.as_millis()
                    );
                    self.engine.schedule_poll(submission, job_id.as_str(), after);
                }
                Effect::EndSubmission { submission } => {
                    studio_debug!("EndSubmission submission={}", submission);
                    self.engine.end(submission);
                }
            }
        }
    }

    /// Starts downloading whichever result assets the view carries.
    /// Returns how many downloads were started.
    pub fn save_assets(&self, view: &AppViewModel) -> usize {
        let (Some(dir), Some(job_id)) = (&self.download_dir, &view.job_id) else {
            return 0;
        };
        let assets = [
            (AssetKind::Scene, view.scene_url.as_deref()),
            (AssetKind::Video, view.video_url.as_deref()),
        ];
        let mut started = 0;
        for (kind, url) in assets {
            if let Some(url) = url {
                studio_info!("Downloading {} for job {} from {}", kind.label(), job_id, url);
                self.engine.save_asset(job_id.as_str(), kind, url, dir.clone());
                started += 1;
            }
        }
        started
    }

    pub fn check_health(&self) {
        self.engine.check_health();
    }
}

fn spawn_event_loop(events: EngineEvents, event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        while let Some(event) = events.recv() {
            if event_tx.send(map_event(event)).is_err() {
                break;
            }
        }
    });
}

fn map_event(event: EngineEvent) -> AppEvent {
    match event {
        EngineEvent::Submitted { submission, result } => match result {
            Ok(created) => AppEvent::Core(Msg::SubmitSucceeded {
                submission,
                job_id: JobId::new(created.job_id),
            }),
            Err(err) => {
                studio_warn!("Submission {} failed: {}", submission, err);
                AppEvent::Core(Msg::SubmitFailed { submission })
            }
        },
        EngineEvent::StatusFetched {
            submission,
            job_id,
            result,
        } => match result {
            Ok(report) => AppEvent::Core(Msg::StatusReceived {
                submission,
                update: map_report(report),
            }),
            Err(err) => {
                studio_warn!("Status for job {} failed: {}", job_id, err);
                AppEvent::Core(Msg::StatusFailed { submission })
            }
        },
        EngineEvent::AssetSaved {
            job_id,
            kind,
            result,
        } => {
            if let Err(err) = &result {
                studio_warn!("Saving {} for job {} failed: {}", kind.label(), job_id, err);
            }
            AppEvent::AssetSaved { kind, result }
        }
        EngineEvent::HealthChecked { result } => AppEvent::Health(result),
    }
}

fn map_report(report: JobStatusReport) -> StatusUpdate {
    StatusUpdate {
        status: report.status,
        scene_url: report.scene_url,
        video_url: report.video_url,
        error: report.error,
    }
}
