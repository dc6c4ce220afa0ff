use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::sync::mpsc;
use std::thread;

use anyhow::Context;
use chrono::Local;
use studio_core::{update, AppState, JobStatus, Msg, SelectedFile};
use studio_engine::{ApiError, AssetKind, EngineHandle, HealthReport};
use studio_logging::{studio_info, studio_warn};

use crate::config::{AppConfig, RunMode};
use crate::effects::EffectRunner;
use crate::ui;

const PROMPT: &str = "Floorplan path (PNG/JPEG), or `quit`:";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunOutcome {
    Success,
    Failure,
}

#[derive(Debug, PartialEq)]
pub enum AppEvent {
    Core(Msg),
    AssetSaved {
        kind: AssetKind,
        result: Result<PathBuf, ApiError>,
    },
    Health(Result<HealthReport, ApiError>),
    /// Stdin reached EOF; finish the current job, then exit.
    InputClosed,
    Quit,
}

pub fn run(config: AppConfig) -> anyhow::Result<RunOutcome> {
    let (engine, events) =
        EngineHandle::new(config.api.clone()).context("failed to start the job engine")?;
    let (event_tx, event_rx) = mpsc::channel::<AppEvent>();
    let runner = EffectRunner::new(engine, events, event_tx.clone(), config.download_dir.clone());

    let stdout = io::stdout();
    let mut session = Session::new(
        AppState::with_poll_interval(config.poll_interval),
        runner,
        stdout.lock(),
    );

    match &config.mode {
        RunMode::Check => {
            drop(event_tx);
            session.runner.check_health();
            return session.await_health(&event_rx, &config.api.base_url);
        }
        RunMode::Single(path) => {
            studio_info!("Submitting {:?} to {}", path, config.api.base_url);
            for msg in select_and_submit(path.clone()) {
                session.dispatch_msg(msg)?;
            }
            session.exit_when_settled = true;
        }
        RunMode::Interactive => {
            session.print(&[PROMPT.to_string()])?;
            spawn_stdin_reader(event_tx.clone());
        }
    }
    drop(event_tx);

    session.run(&event_rx)
}

fn select_and_submit(path: PathBuf) -> [Msg; 2] {
    [
        Msg::FileSelected(Some(SelectedFile::from_path(path))),
        Msg::SubmitClicked,
    ]
}

fn spawn_stdin_reader(event_tx: mpsc::Sender<AppEvent>) {
    thread::spawn(move || {
        let stdin = io::stdin();
        for line in stdin.lock().lines() {
            let Ok(line) = line else { break };
            let input = line.trim();
            let events = match input {
                "" => continue,
                "quit" | "exit" => vec![AppEvent::Quit],
                path => select_and_submit(PathBuf::from(path))
                    .into_iter()
                    .map(AppEvent::Core)
                    .collect(),
            };
            for event in events {
                if event_tx.send(event).is_err() {
                    return;
                }
            }
        }
        let _ = event_tx.send(AppEvent::InputClosed);
    });
}

struct Session<W: Write> {
    state: AppState,
    runner: EffectRunner,
    out: W,
    last_frame: Vec<String>,
    downloaded_job: Option<String>,
    pending_downloads: usize,
    exit_when_settled: bool,
}

impl<W: Write> Session<W> {
    fn new(state: AppState, runner: EffectRunner, out: W) -> Self {
        Self {
            state,
            runner,
            out,
            last_frame: Vec::new(),
            downloaded_job: None,
            pending_downloads: 0,
            exit_when_settled: false,
        }
    }

    fn run(&mut self, event_rx: &mpsc::Receiver<AppEvent>) -> anyhow::Result<RunOutcome> {
        while let Ok(event) = event_rx.recv() {
            match event {
                AppEvent::Core(msg) => self.dispatch_msg(msg)?,
                AppEvent::AssetSaved { kind, result } => {
                    self.pending_downloads = self.pending_downloads.saturating_sub(1);
                    let line = match result {
                        Ok(path) => format!("  saved {}: {}", kind.label(), path.display()),
                        Err(err) => format!("  could not save {}: {}", kind.label(), err),
                    };
                    self.print(&[line])?;
                }
                AppEvent::InputClosed => self.exit_when_settled = true,
                AppEvent::Quit => break,
                AppEvent::Health(_) => {}
            }

            if self.exit_when_settled && self.is_settled() {
                break;
            }
        }
        Ok(self.outcome())
    }

    fn dispatch_msg(&mut self, msg: Msg) -> io::Result<()> {
        let state = std::mem::take(&mut self.state);
        let (mut state, effects) = update(state, msg);
        self.runner.enqueue(effects);
        let was_dirty = state.consume_dirty();
        let view = state.view();
        self.state = state;

        if !was_dirty {
            return Ok(());
        }

        let frame = ui::render::render(&view);
        if frame != self.last_frame {
            self.print(&frame)?;
            self.last_frame = frame;
        }

        let done = self.state.job().status == Some(JobStatus::Done);
        if done && self.downloaded_job != view.job_id {
            self.downloaded_job = view.job_id.clone();
            self.pending_downloads += self.runner.save_assets(&view);
        }
        Ok(())
    }

    /// Nothing is uploading, polling or downloading.
    fn is_settled(&self) -> bool {
        self.state.live_submission().is_none() && self.pending_downloads == 0
    }

    fn outcome(&self) -> RunOutcome {
        match &self.state.job().status {
            Some(JobStatus::Done) | None => RunOutcome::Success,
            Some(_) => RunOutcome::Failure,
        }
    }

    fn await_health(
        &mut self,
        event_rx: &mpsc::Receiver<AppEvent>,
        base_url: &str,
    ) -> anyhow::Result<RunOutcome> {
        while let Ok(event) = event_rx.recv() {
            if let AppEvent::Health(result) = event {
                return match result {
                    Ok(report) if report.ok => {
                        self.print(&[format!("API at {base_url} is reachable")])?;
                        Ok(RunOutcome::Success)
                    }
                    Ok(_) => {
                        self.print(&[format!("API at {base_url} answered but is not ok")])?;
                        Ok(RunOutcome::Failure)
                    }
                    Err(err) => {
                        studio_warn!("Health check against {} failed: {}", base_url, err);
                        self.print(&[format!("API at {base_url} is not reachable: {err}")])?;
                        Ok(RunOutcome::Failure)
                    }
                };
            }
        }
        anyhow::bail!("engine stopped before the health check finished")
    }

    fn print(&mut self, lines: &[String]) -> io::Result<()> {
        let stamp = Local::now().format("%H:%M:%S");
        for line in lines {
            writeln!(self.out, "{stamp} {line}")?;
        }
        self.out.flush()
    }
}

#[cfg(test)]
mod tests {
    use std::sync::{Arc, Mutex};
    use std::time::Duration;

    use studio_engine::{CreatedJob, FailureKind, JobApi, JobStatusReport, UploadFile};
    use tempfile::TempDir;

    use super::*;

    struct ScriptedApi {
        statuses: Mutex<Vec<JobStatusReport>>,
        reject_upload: bool,
    }

    impl ScriptedApi {
        fn new(statuses: Vec<JobStatusReport>) -> Self {
            Self {
                statuses: Mutex::new(statuses),
                reject_upload: false,
            }
        }
    }

    #[async_trait::async_trait]
    impl JobApi for ScriptedApi {
        async fn create_job(&self, _upload: UploadFile) -> Result<CreatedJob, ApiError> {
            if self.reject_upload {
                return Err(ApiError {
                    kind: FailureKind::HttpStatus(500),
                    message: "boom".into(),
                });
            }
            Ok(CreatedJob {
                job_id: "job-1".into(),
            })
        }

        async fn job_status(&self, _job_id: &str) -> Result<JobStatusReport, ApiError> {
            let mut statuses = self.statuses.lock().unwrap();
            if statuses.is_empty() {
                Ok(JobStatusReport {
                    status: Some("running".into()),
                    ..JobStatusReport::default()
                })
            } else {
                Ok(statuses.remove(0))
            }
        }

        async fn health(&self) -> Result<HealthReport, ApiError> {
            Ok(HealthReport { ok: true })
        }

        async fn fetch_asset(&self, url: &str) -> Result<Vec<u8>, ApiError> {
            Ok(url.as_bytes().to_vec())
        }
    }

    fn session_for(
        api: ScriptedApi,
        download_dir: Option<PathBuf>,
    ) -> (Session<Vec<u8>>, mpsc::Receiver<AppEvent>) {
        let (engine, events) = EngineHandle::with_api(Arc::new(api), 1024).unwrap();
        let (event_tx, event_rx) = mpsc::channel();
        let runner = EffectRunner::new(engine, events, event_tx, download_dir);
        let mut session = Session::new(
            AppState::with_poll_interval(Duration::from_millis(5)),
            runner,
            Vec::new(),
        );
        session.exit_when_settled = true;
        (session, event_rx)
    }

    fn plan_file(dir: &TempDir) -> PathBuf {
        let path = dir.path().join("plan.png");
        std::fs::write(&path, b"png").unwrap();
        path
    }

    #[test]
    fn single_job_runs_to_done_and_saves_assets() {
        let dir = TempDir::new().unwrap();
        let out_dir = dir.path().join("out");
        let api = ScriptedApi::new(vec![
            JobStatusReport {
                status: Some("queued".into()),
                ..JobStatusReport::default()
            },
            JobStatusReport {
                status: Some("running".into()),
                ..JobStatusReport::default()
            },
            JobStatusReport {
                status: Some("done".into()),
                scene_url: Some("http://localhost:8000/files/job-1_preview.png".into()),
                video_url: Some("http://localhost:8000/files/sample.mp4".into()),
                error: None,
            },
        ]);
        let (mut session, event_rx) = session_for(api, Some(out_dir.clone()));

        for msg in select_and_submit(plan_file(&dir)) {
            session.dispatch_msg(msg).unwrap();
        }
        let outcome = session.run(&event_rx).unwrap();

        assert_eq!(outcome, RunOutcome::Success);
        let output = String::from_utf8(session.out.clone()).unwrap();
        let queued = output.find("Job status: QUEUED").expect("queued line");
        let running = output.find("Job status: RUNNING").expect("running line");
        let done = output.find("Job status: DONE").expect("done line");
        assert!(queued < running && running < done);
        assert!(output.contains("3D preview: http://localhost:8000/files/job-1_preview.png"));
        assert_eq!(std::fs::read_dir(&out_dir).unwrap().count(), 2);
    }

    #[test]
    fn rejected_upload_ends_in_failure() {
        let dir = TempDir::new().unwrap();
        let api = ScriptedApi {
            reject_upload: true,
            ..ScriptedApi::new(Vec::new())
        };
        let (mut session, event_rx) = session_for(api, None);

        for msg in select_and_submit(plan_file(&dir)) {
            session.dispatch_msg(msg).unwrap();
        }
        let outcome = session.run(&event_rx).unwrap();

        assert_eq!(outcome, RunOutcome::Failure);
        let output = String::from_utf8(session.out.clone()).unwrap();
        assert!(output.contains("Job status: FAILED"));
        assert!(output.contains("error: Failed to submit floorplan"));
    }

    #[test]
    fn stdin_style_input_is_split_into_select_and_submit() {
        let [select, submit] = select_and_submit(PathBuf::from("/plans/a.jpg"));
        assert_eq!(
            select,
            Msg::FileSelected(Some(SelectedFile::from_path("/plans/a.jpg")))
        );
        assert_eq!(submit, Msg::SubmitClicked);
    }
}
