use async_trait::async_trait;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use crate::error::AppError;
use crate::services::command::run_tool;

/// Produces a fast-start copy of a media file.
///
/// `output` already exists (it is a staged artifact owned by the caller) and
/// is overwritten.
#[async_trait]
pub trait Transcoder: Send + Sync {
    async fn fast_start(&self, input: &Path, output: &Path) -> Result<(), AppError>;
}

/// Lossless remux with ffmpeg that moves the `moov` atom to the front.
pub struct FfmpegTranscoder {
    program: String,
    timeout: Duration,
}

impl FfmpegTranscoder {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl Transcoder for FfmpegTranscoder {
    #[tracing::instrument(skip(self), fields(program = %self.program))]
    async fn fast_start(&self, input: &Path, output: &Path) -> Result<(), AppError> {
        let start = std::time::Instant::now();
        let args = [
            OsStr::new("-y"),
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-i"),
            input.as_os_str(),
            OsStr::new("-c"),
            OsStr::new("copy"),
            OsStr::new("-movflags"),
            OsStr::new("faststart"),
            OsStr::new("-f"),
            OsStr::new("mp4"),
            output.as_os_str(),
        ];
        run_tool(&self.program, args, self.timeout)
            .await
            .map_err(|e| AppError::TranscodeFailed(e.to_string()))?;

        let size = tokio::fs::metadata(output)
            .await
            .map_err(|e| AppError::TranscodeFailed(format!("missing output: {}", e)))?
            .len();
        if size == 0 {
            return Err(AppError::TranscodeFailed("ffmpeg produced an empty file".to_string()));
        }

        tracing::info!(
            size_bytes = size,
            duration_ms = start.elapsed().as_millis() as u64,
            "Fast-start remux completed"
        );
        Ok(())
    }
}
