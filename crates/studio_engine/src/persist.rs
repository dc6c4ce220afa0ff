use std::fs;
use std::io::{self, Write};
use std::path::{Path, PathBuf};

use tempfile::NamedTempFile;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum PersistError {
    #[error("{} is not a directory", .0.display())]
    NotADirectory(PathBuf),
    #[error("cannot create {}: {source}", path.display())]
    Create { path: PathBuf, source: io::Error },
    #[error("cannot write into {}: {source}", path.display())]
    NotWritable { path: PathBuf, source: io::Error },
    #[error("writing {}: {source}", path.display())]
    Write { path: PathBuf, source: io::Error },
}

/// Makes sure downloads can land in `dir`, creating it when missing.
/// Meant to run once, before any job is submitted.
pub fn ensure_output_dir(dir: &Path) -> Result<(), PersistError> {
    match fs::metadata(dir) {
        Ok(meta) if !meta.is_dir() => return Err(PersistError::NotADirectory(dir.to_path_buf())),
        Ok(_) => {}
        Err(err) if err.kind() == io::ErrorKind::NotFound => {
            fs::create_dir_all(dir).map_err(|source| PersistError::Create {
                path: dir.to_path_buf(),
                source,
            })?;
        }
        Err(source) => {
            return Err(PersistError::NotWritable {
                path: dir.to_path_buf(),
                source,
            })
        }
    }
    NamedTempFile::new_in(dir)
        .map(drop)
        .map_err(|source| PersistError::NotWritable {
            path: dir.to_path_buf(),
            source,
        })
}

/// Stores result assets as `{dir}/{filename}`. The bytes go to a temp file
/// first and are renamed into place, replacing an earlier download.
pub struct AtomicFileWriter {
    dir: PathBuf,
}

impl AtomicFileWriter {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn write(&self, filename: &str, content: &[u8]) -> Result<PathBuf, PersistError> {
        // The directory may have been removed while the job ran.
        fs::create_dir_all(&self.dir).map_err(|source| PersistError::Create {
            path: self.dir.clone(),
            source,
        })?;

        let target = self.dir.join(filename);
        let write_err = |source| PersistError::Write {
            path: target.clone(),
            source,
        };
        let mut tmp = NamedTempFile::new_in(&self.dir).map_err(write_err)?;
        tmp.write_all(content).map_err(write_err)?;
        tmp.as_file_mut().sync_all().map_err(write_err)?;
        tmp.persist(&target).map_err(|err| write_err(err.error))?;
        Ok(target)
    }
}
