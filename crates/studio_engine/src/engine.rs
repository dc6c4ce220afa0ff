use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::Duration;

use studio_logging::{studio_debug, studio_warn};
use tokio_util::sync::CancellationToken;

use crate::api::{ApiSettings, JobApi, ReqwestJobApi};
use crate::download::save_asset;
use crate::upload::load_upload;
use crate::{AssetKind, EngineError, EngineEvent, SubmissionId};

enum EngineCommand {
    Submit {
        submission: SubmissionId,
        path: PathBuf,
    },
    Poll {
        submission: SubmissionId,
        job_id: String,
        after: Duration,
    },
    End {
        submission: SubmissionId,
    },
    SaveAsset {
        job_id: String,
        kind: AssetKind,
        url: String,
        dir: PathBuf,
    },
    CheckHealth,
}

/// Sends work to the engine thread. Dropping every handle stops the thread
/// and aborts whatever is still in flight.
#[derive(Clone)]
pub struct EngineHandle {
    cmd_tx: mpsc::Sender<EngineCommand>,
}

/// Receiving side for results produced by the engine thread.
pub struct EngineEvents {
    event_rx: mpsc::Receiver<EngineEvent>,
}

impl EngineEvents {
    pub fn recv(&self) -> Option<EngineEvent> {
        self.event_rx.recv().ok()
    }

    pub fn recv_timeout(&self, timeout: Duration) -> Option<EngineEvent> {
        self.event_rx.recv_timeout(timeout).ok()
    }
}

impl EngineHandle {
    /// Starts the engine against the real HTTP API.
    pub fn new(settings: ApiSettings) -> Result<(Self, EngineEvents), EngineError> {
        let max_upload_bytes = settings.max_upload_bytes;
        let api = Arc::new(ReqwestJobApi::new(settings)?);
        Self::with_api(api, max_upload_bytes)
    }

    pub fn with_api(
        api: Arc<dyn JobApi>,
        max_upload_bytes: u64,
    ) -> Result<(Self, EngineEvents), EngineError> {
        let (cmd_tx, cmd_rx) = mpsc::channel();
        let (event_tx, event_rx) = mpsc::channel();
        let runtime = tokio::runtime::Runtime::new()?;

        thread::spawn(move || {
            let mut live: HashMap<SubmissionId, CancellationToken> = HashMap::new();
            let task = || Task {
                api: api.clone(),
                event_tx: event_tx.clone(),
                max_upload_bytes,
            };
            while let Ok(command) = cmd_rx.recv() {
                match command {
                    EngineCommand::End { submission } => {
                        if let Some(token) = live.remove(&submission) {
                            studio_debug!("Ending submission {}", submission);
                            token.cancel();
                        }
                    }
                    EngineCommand::Submit { submission, path } => {
                        let token = live
                            .entry(submission)
                            .or_insert_with(CancellationToken::new);
                        runtime.spawn(task().submit(submission, path, token.clone()));
                    }
                    EngineCommand::Poll {
                        submission,
                        job_id,
                        after,
                    } => {
                        let token = live
                            .entry(submission)
                            .or_insert_with(CancellationToken::new);
                        runtime.spawn(task().poll(submission, job_id, after, token.clone()));
                    }
                    EngineCommand::SaveAsset {
                        job_id,
                        kind,
                        url,
                        dir,
                    } => {
                        runtime.spawn(task().save_asset(job_id, kind, url, dir));
                    }
                    EngineCommand::CheckHealth => {
                        runtime.spawn(task().check_health());
                    }
                }
            }
        });

        Ok((Self { cmd_tx }, EngineEvents { event_rx }))
    }

    pub fn submit(&self, submission: SubmissionId, path: impl Into<PathBuf>) {
        self.send(EngineCommand::Submit {
            submission,
            path: path.into(),
        });
    }

    /// Fetches the job status once, `after` from now, unless the submission
    /// is ended first.
    pub fn schedule_poll(
        &self,
        submission: SubmissionId,
        job_id: impl Into<String>,
        after: Duration,
    ) {
        self.send(EngineCommand::Poll {
            submission,
            job_id: job_id.into(),
            after,
        });
    }

    pub fn end(&self, submission: SubmissionId) {
        self.send(EngineCommand::End { submission });
    }

    pub fn save_asset(
        &self,
        job_id: impl Into<String>,
        kind: AssetKind,
        url: impl Into<String>,
        dir: impl Into<PathBuf>,
    ) {
        self.send(EngineCommand::SaveAsset {
            job_id: job_id.into(),
            kind,
            url: url.into(),
            dir: dir.into(),
        });
    }

    pub fn check_health(&self) {
        self.send(EngineCommand::CheckHealth);
    }

    fn send(&self, command: EngineCommand) {
        if self.cmd_tx.send(command).is_err() {
            studio_warn!("Engine thread is gone; command dropped");
        }
    }
}

struct Task {
    api: Arc<dyn JobApi>,
    event_tx: mpsc::Sender<EngineEvent>,
    max_upload_bytes: u64,
}

impl Task {
    async fn submit(self, submission: SubmissionId, path: PathBuf, token: CancellationToken) {
        let work = async {
            let upload = load_upload(&path, self.max_upload_bytes).await?;
            self.api.create_job(upload).await
        };
        tokio::select! {
            _ = token.cancelled() => {
                studio_debug!("Upload for submission {} cancelled", submission);
            }
            result = work => {
                self.emit(EngineEvent::Submitted { submission, result });
            }
        }
    }

    async fn poll(
        self,
        submission: SubmissionId,
        job_id: String,
        after: Duration,
        token: CancellationToken,
    ) {
        let work = async {
            tokio::time::sleep(after).await;
            self.api.job_status(&job_id).await
        };
        tokio::select! {
            _ = token.cancelled() => {
                studio_debug!("Poll for job {} (submission {}) cancelled", job_id, submission);
            }
            result = work => {
                self.emit(EngineEvent::StatusFetched {
                    submission,
                    job_id: job_id.clone(),
                    result,
                });
            }
        }
    }

    async fn save_asset(self, job_id: String, kind: AssetKind, url: String, dir: PathBuf) {
        let result = save_asset(self.api.as_ref(), &job_id, kind, &url, dir).await;
        self.emit(EngineEvent::AssetSaved {
            job_id,
            kind,
            result,
        });
    }

    async fn check_health(self) {
        let result = self.api.health().await;
        self.emit(EngineEvent::HealthChecked { result });
    }

    fn emit(&self, event: EngineEvent) {
        let _ = self.event_tx.send(event);
    }
}
