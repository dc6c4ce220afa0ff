//! Studio engine: HTTP job API, cancellable poll scheduling and asset storage.
mod api;
mod download;
mod engine;
mod filename;
mod persist;
mod types;
mod upload;

pub use api::{ApiSettings, JobApi, ReqwestJobApi, DEFAULT_API_BASE};
pub use download::save_asset;
pub use engine::{EngineEvents, EngineHandle};
pub use filename::asset_filename;
pub use persist::{ensure_output_dir, AtomicFileWriter, PersistError};
pub use types::{
    ApiError, AssetKind, CreatedJob, EngineError, EngineEvent, FailureKind, HealthReport,
    JobStatusReport, SubmissionId,
};
pub use upload::{load_upload, media_type_for, UploadFile};
