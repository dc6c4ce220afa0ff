use std::path::PathBuf;

use studio_logging::studio_info;

use crate::api::JobApi;
use crate::filename::asset_filename;
use crate::persist::AtomicFileWriter;
use crate::{ApiError, AssetKind, FailureKind};

/// Fetches one result asset and stores it under `dir` with a deterministic name.
pub async fn save_asset(
    api: &dyn JobApi,
    job_id: &str,
    kind: AssetKind,
    url: &str,
    dir: PathBuf,
) -> Result<PathBuf, ApiError> {
    let bytes = api.fetch_asset(url).await?;
    let filename = asset_filename(job_id, kind, url);
    let byte_len = bytes.len();

    let written = tokio::task::spawn_blocking(move || {
        AtomicFileWriter::new(dir).write(&filename, &bytes)
    })
    .await
    .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?
    .map_err(|err| ApiError::new(FailureKind::Io, err.to_string()))?;

    studio_info!(
        "Saved {} asset for job {} ({} bytes) to {:?}",
        kind.label(),
        job_id,
        byte_len,
        written
    );
    Ok(written)
}
