use std::ffi::OsStr;
use std::path::{Path, PathBuf};

use tokio::fs::{self, File};
use tokio::io::AsyncWriteExt;

use crate::error::{FetchError, Result};

const STAGING_PREFIX: &str = ".";
const STAGING_SUFFIX: &str = ".part";

/// Hidden sibling used while a body is in flight: `dir/.name.part`.
pub fn staging_path(destination: &Path) -> Result<PathBuf> {
    let file_name = destination
        .file_name()
        .ok_or_else(|| FetchError::InvalidDestination(destination.to_path_buf()))?;
    let parent = destination.parent().unwrap_or(Path::new(""));

    let mut staged = std::ffi::OsString::from(STAGING_PREFIX);
    staged.push(file_name);
    staged.push(STAGING_SUFFIX);
    Ok(parent.join(staged))
}

/// Whether `file_name` has the shape of a staging file, `.name.part`.
pub fn is_staging_name(file_name: &OsStr) -> bool {
    file_name.to_str().is_some_and(|name| {
        name.len() > STAGING_PREFIX.len() + STAGING_SUFFIX.len()
            && name.starts_with(STAGING_PREFIX)
            && name.ends_with(STAGING_SUFFIX)
    })
}

/// A body being written to its staging path.
pub(crate) struct StagedFile {
    staging:     PathBuf,
    destination: PathBuf,
    file:        File,
}

impl StagedFile {
    /// Create the destination's parent directory and open the staging file.
    pub(crate) async fn create(destination: &Path) -> Result<Self> {
        let staging = staging_path(destination)?;
        if let Some(parent) = destination.parent().filter(|p| !p.as_os_str().is_empty()) {
            fs::create_dir_all(parent)
                .await
                .map_err(|source| FetchError::CreateDir {
                    path: parent.to_path_buf(),
                    source,
                })?;
        }

        let file = File::create(&staging)
            .await
            .map_err(|source| FetchError::Write {
                path: staging.clone(),
                source,
            })?;

        Ok(Self {
            staging,
            destination: destination.to_path_buf(),
            file,
        })
    }

    pub(crate) async fn write(&mut self, chunk: &[u8]) -> Result<()> {
        self.file
            .write_all(chunk)
            .await
            .map_err(|source| FetchError::Write {
                path: self.staging.clone(),
                source,
            })
    }

    /// Flush to disk and rename over the destination.
    pub(crate) async fn commit(mut self) -> Result<()> {
        let write_err = |source| FetchError::Write {
            path: self.staging.clone(),
            source,
        };
        self.file.flush().await.map_err(write_err)?;
        self.file.sync_all().await.map_err(write_err)?;
        drop(self.file);

        if let Err(source) = fs::rename(&self.staging, &self.destination).await {
            let _ = fs::remove_file(&self.staging).await;
            return Err(FetchError::Commit {
                from: self.staging,
                to: self.destination,
                source,
            });
        }
        Ok(())
    }

    /// Drop whatever was written so far.
    pub(crate) async fn discard(self) {
        drop(self.file);
        if let Err(e) = fs::remove_file(&self.staging).await {
            tracing::debug!(path = %self.staging.display(), error = %e, "could not remove staging file");
        }
    }
}
