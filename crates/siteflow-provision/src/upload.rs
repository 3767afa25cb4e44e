//! Asset upload
//!
//! Mirrors a local directory tree into a bucket. Object keys are the paths
//! relative to the root, joined with `/` whatever the host separator is.
//! A failed file never stops the walk; the run fails afterwards if any file
//! did.

use crate::accepted;
use crate::error::{ProvisionError, Result};
use crate::report::{UploadFailure, UploadReport, UploadTask};
use futures_util::StreamExt;
use futures_util::stream;
use siteflow_cloud::ResourceClient;
use std::path::{Component, Path};
use std::time::Instant;
use walkdir::WalkDir;

/// Why a local path has no object key
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("path is outside the asset root")]
    OutsideRoot,

    #[error("path is not valid UTF-8")]
    NonUtf8,
}

/// Object key for `path` below `root`.
///
/// Components are taken verbatim. A name that is not valid UTF-8 has no key,
/// since any lossy conversion would let two files share one object.
pub fn object_key(root: &Path, path: &Path) -> std::result::Result<String, KeyError> {
    let relative = path.strip_prefix(root).map_err(|_| KeyError::OutsideRoot)?;
    let mut parts = Vec::new();
    for component in relative.components() {
        if let Component::Normal(part) = component {
            parts.push(part.to_str().ok_or(KeyError::NonUtf8)?);
        }
    }

    if parts.is_empty() {
        Err(KeyError::OutsideRoot)
    } else {
        Ok(parts.join("/"))
    }
}

/// Lazily walk `root` and yield one task per regular file.
///
/// Symlinked directories are never entered, so the walk stays inside the
/// initial tree and cannot loop. A symlink to a regular file is uploaded like
/// the file itself. Unreadable entries are yielded as failures.
pub fn upload_tasks(
    root: &Path,
) -> impl Iterator<Item = std::result::Result<UploadTask, UploadFailure>> + '_ {
    WalkDir::new(root)
        .follow_links(false)
        .sort_by_file_name()
        .into_iter()
        .filter_map(move |entry| match entry {
            Ok(entry) => {
                let file_type = entry.file_type();
                let is_file = file_type.is_file()
                    || (file_type.is_symlink()
                        && std::fs::metadata(entry.path()).is_ok_and(|m| m.is_file()));
                if !is_file {
                    return None;
                }

                let path = entry.into_path();
                match object_key(root, &path) {
                    Ok(object_key) => Some(Ok(UploadTask {
                        local_path: path,
                        object_key,
                    })),
                    Err(e) => Some(Err(UploadFailure {
                        path,
                        object_key: None,
                        status: None,
                        error: e.to_string(),
                    })),
                }
            }
            Err(e) => Some(Err(UploadFailure {
                path: e.path().unwrap_or(root).to_path_buf(),
                object_key: None,
                status: None,
                error: e.to_string(),
            })),
        })
}

pub struct AssetUploader<'a> {
    client: &'a dyn ResourceClient,
    concurrency: usize,
}

impl<'a> AssetUploader<'a> {
    pub fn new(client: &'a dyn ResourceClient) -> Self {
        Self {
            client,
            concurrency: 1,
        }
    }

    /// Number of files in flight at once (1 = strictly sequential)
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.max(1);
        self
    }

    /// Upload every file below `root` into `bucket`
    pub async fn upload(&self, root: &Path, bucket: &str) -> Result<UploadReport> {
        if !root.is_dir() {
            return Err(ProvisionError::AssetRoot {
                path: root.to_path_buf(),
                message: "ディレクトリではありません".to_string(),
            });
        }

        let start = Instant::now();
        let mut report = UploadReport::new(bucket);

        tracing::info!(
            "Uploading {} to bucket {} ({} at a time)",
            root.display(),
            bucket,
            self.concurrency
        );

        let results: Vec<_> = stream::iter(upload_tasks(root))
            .map(move |task| async move {
                match task {
                    Ok(task) => self.upload_one(bucket, task).await,
                    Err(failure) => {
                        tracing::error!("Cannot read {}: {}", failure.path.display(), failure.error);
                        Err(failure)
                    }
                }
            })
            .buffer_unordered(self.concurrency)
            .collect()
            .await;

        for result in results {
            match result {
                Ok(task) => report.add_success(task),
                Err(failure) => report.add_failure(failure),
            }
        }
        report.uploaded.sort_by(|a, b| a.object_key.cmp(&b.object_key));
        report.failed.sort_by(|a, b| a.path.cmp(&b.path));
        report.duration_ms = start.elapsed().as_millis() as u64;

        if report.is_success() {
            tracing::info!(
                "Uploaded {} file(s) to {} in {}ms",
                report.uploaded.len(),
                bucket,
                report.duration_ms
            );
            Ok(report)
        } else {
            tracing::error!(
                "{} of {} file(s) failed to upload to {}",
                report.failed.len(),
                report.total(),
                bucket
            );
            Err(ProvisionError::PartialUpload(report))
        }
    }

    async fn upload_one(
        &self,
        bucket: &str,
        task: UploadTask,
    ) -> std::result::Result<UploadTask, UploadFailure> {
        tracing::debug!(
            "Uploading {} to {}/{}",
            task.local_path.display(),
            bucket,
            task.object_key
        );

        match accepted(
            self.client
                .put_file(bucket, &task.object_key, &task.local_path)
                .await,
        ) {
            Ok(()) => {
                tracing::info!("Uploaded {}/{}", bucket, task.object_key);
                Ok(task)
            }
            Err(e) => {
                tracing::error!(
                    "Upload of {} to {}/{} failed: {}",
                    task.local_path.display(),
                    bucket,
                    task.object_key,
                    e
                );
                Err(UploadFailure {
                    status: e.status(),
                    error: e.to_string(),
                    path: task.local_path,
                    object_key: Some(task.object_key),
                })
            }
        }
    }
}
