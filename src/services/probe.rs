use async_trait::async_trait;
use serde::Deserialize;
use std::ffi::OsStr;
use std::path::Path;
use std::time::Duration;
use crate::error::AppError;
use crate::models::media::Geometry;
use crate::services::command::run_tool;

/// Reads stream geometry from a local media file.
#[async_trait]
pub trait MediaProbe: Send + Sync {
    async fn probe(&self, path: &Path) -> Result<Geometry, AppError>;
}

pub struct FfprobeProbe {
    program: String,
    timeout: Duration,
}

impl FfprobeProbe {
    pub fn new(program: impl Into<String>, timeout: Duration) -> Self {
        Self {
            program: program.into(),
            timeout,
        }
    }
}

#[async_trait]
impl MediaProbe for FfprobeProbe {
    #[tracing::instrument(skip(self), fields(program = %self.program))]
    async fn probe(&self, path: &Path) -> Result<Geometry, AppError> {
        let args = [
            OsStr::new("-v"),
            OsStr::new("error"),
            OsStr::new("-print_format"),
            OsStr::new("json"),
            OsStr::new("-show_streams"),
            OsStr::new("-select_streams"),
            OsStr::new("v:0"),
            path.as_os_str(),
        ];
        let stdout = run_tool(&self.program, args, self.timeout)
            .await
            .map_err(|e| AppError::ProbeFailed(e.to_string()))?;

        let geometry = parse_geometry(&stdout)?;
        tracing::info!(width = geometry.width, height = geometry.height, "Video probe completed");
        Ok(geometry)
    }
}

#[derive(Deserialize)]
struct ProbeOutput {
    #[serde(default)]
    streams: Vec<ProbeStream>,
}

#[derive(Deserialize)]
struct ProbeStream {
    width: Option<u32>,
    height: Option<u32>,
}

/// Extracts the first stream carrying both dimensions from ffprobe's JSON.
pub fn parse_geometry(stdout: &[u8]) -> Result<Geometry, AppError> {
    let output: ProbeOutput = serde_json::from_slice(stdout)
        .map_err(|e| AppError::ProbeFailed(format!("malformed ffprobe output: {}", e)))?;

    output
        .streams
        .iter()
        .find_map(|stream| match (stream.width, stream.height) {
            (Some(width), Some(height)) => Some(Geometry { width, height }),
            _ => None,
        })
        .ok_or_else(|| AppError::ProbeFailed("no video stream with width and height".to_string()))
}
