use axum::body::Bytes;
use futures::{Stream, StreamExt};
use std::io;
use std::path::Path;
use tempfile::TempPath;
use tokio::io::{AsyncReadExt, AsyncWriteExt};
use crate::error::AppError;

const PREFIX: &str = "vbk-";

/// A temporary file owned by a single request.
///
/// The file is removed when the artifact is dropped, which covers early
/// returns, panics and cancellation of the request future alike.
#[derive(Debug)]
pub struct StagedArtifact {
    path: TempPath,
}

impl StagedArtifact {
    /// Creates an empty artifact in `dir`, e.g. as the output of a tool.
    pub fn create(dir: &Path, suffix: &str) -> io::Result<Self> {
        let file = tempfile::Builder::new()
            .prefix(PREFIX)
            .suffix(suffix)
            .tempfile_in(dir)?;
        Ok(Self {
            path: file.into_temp_path(),
        })
    }

    /// Streams `body` into a new artifact, failing once more than `limit`
    /// bytes have arrived. Nothing beyond the current chunk is held in memory.
    pub async fn capture<S>(dir: &Path, suffix: &str, mut body: S, limit: u64) -> Result<Self, AppError>
    where
        S: Stream<Item = Result<Bytes, AppError>> + Unpin,
    {
        let (file, path) = tempfile::Builder::new()
            .prefix(PREFIX)
            .suffix(suffix)
            .tempfile_in(dir)?
            .into_parts();
        let artifact = Self { path };
        // Declared after `artifact` so the handle is closed before the file is removed.
        let mut file = tokio::fs::File::from_std(file);

        let mut written: u64 = 0;
        while let Some(chunk) = body.next().await {
            let chunk = chunk?;
            written += chunk.len() as u64;
            if written > limit {
                tracing::warn!(limit, "Upload exceeded size limit, aborting");
                return Err(AppError::PayloadTooLarge { limit });
            }
            file.write_all(&chunk).await?;
        }
        file.flush().await?;

        tracing::debug!(path = %artifact.path().display(), size_bytes = written, "Upload staged");
        Ok(artifact)
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Reads up to `len` leading bytes, for content sniffing.
    pub async fn read_head(&self, len: u64) -> io::Result<Vec<u8>> {
        let file = tokio::fs::File::open(self.path()).await?;
        let mut head = Vec::new();
        file.take(len).read_to_end(&mut head).await?;
        Ok(head)
    }

    /// Moves the artifact to `dest`, after which it is no longer cleaned up.
    pub fn persist(self, dest: &Path) -> io::Result<()> {
        self.path.persist(dest).map_err(|e| e.error)
    }

    /// Removes artifacts a previous process left in `dir` when it did not
    /// exit cleanly. Returns how many were removed.
    pub async fn sweep(dir: &Path) -> io::Result<usize> {
        let mut entries = match tokio::fs::read_dir(dir).await {
            Ok(entries) => entries,
            Err(e) if e.kind() == io::ErrorKind::NotFound => return Ok(0),
            Err(e) => return Err(e),
        };

        let mut removed = 0;
        while let Some(entry) = entries.next_entry().await? {
            let is_artifact = entry
                .file_name()
                .to_str()
                .is_some_and(|name| name.starts_with(PREFIX));
            if is_artifact && entry.file_type().await?.is_file() {
                tokio::fs::remove_file(entry.path()).await?;
                removed += 1;
            }
        }
        Ok(removed)
    }
}
