use std::path::Path;

use crate::{ApiError, FailureKind};

/// A floorplan image read from disk, ready to be sent as multipart form data.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UploadFile {
    pub file_name: String,
    pub mime: &'static str,
    pub bytes: Vec<u8>,
}

/// MIME type for the accepted floorplan formats, keyed by file extension.
pub fn media_type_for(path: &Path) -> Option<&'static str> {
    let ext = path.extension()?.to_str()?.to_ascii_lowercase();
    match ext.as_str() {
        "png" => Some("image/png"),
        "jpg" | "jpeg" => Some("image/jpeg"),
        _ => None,
    }
}

pub async fn load_upload(path: &Path, max_bytes: u64) -> Result<UploadFile, ApiError> {
    let mime = media_type_for(path).ok_or_else(|| {
        ApiError::new(
            FailureKind::UnsupportedFile {
                extension: path
                    .extension()
                    .map(|ext| ext.to_string_lossy().into_owned()),
            },
            format!("{} is not a PNG or JPEG image", path.display()),
        )
    })?;

    let meta = tokio::fs::metadata(path)
        .await
        .map_err(|err| io_error(path, err))?;
    if !meta.is_file() {
        return Err(ApiError::new(
            FailureKind::Io,
            format!("{} is not a regular file", path.display()),
        ));
    }
    if meta.len() > max_bytes {
        return Err(ApiError::new(
            FailureKind::TooLarge {
                max_bytes,
                actual: Some(meta.len()),
            },
            "floorplan image too large",
        ));
    }

    let bytes = tokio::fs::read(path)
        .await
        .map_err(|err| io_error(path, err))?;
    let file_name = path
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .unwrap_or_else(|| "floorplan".to_string());

    Ok(UploadFile {
        file_name,
        mime,
        bytes,
    })
}

fn io_error(path: &Path, err: std::io::Error) -> ApiError {
    ApiError::new(FailureKind::Io, format!("{}: {err}", path.display()))
}
