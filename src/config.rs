use std::env;
use std::fmt::Display;
use std::path::PathBuf;
use std::str::FromStr;
use std::time::Duration;
use thiserror::Error;
use url::Url;

const DEFAULT_PORT: u16 = 8091;
const DEFAULT_TOOL_TIMEOUT_SECS: u64 = 600;
const DEFAULT_MAX_VIDEO_BYTES: u64 = 1 << 30;
const DEFAULT_MAX_THUMBNAIL_BYTES: u64 = 10 << 20;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("{0} must be set")]
    Missing(&'static str),
    #[error("{name} has an invalid value: {reason}")]
    Invalid { name: &'static str, reason: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub database_url: String,
    pub jwt_secret: String,
    pub port: u16,
    /// Address this service is reachable at; thumbnail URLs hang off it.
    pub public_base_url: String,
    pub assets_root: PathBuf,
    pub temp_dir: PathBuf,
    pub s3_bucket: String,
    pub s3_region: String,
    pub s3_endpoint: Option<String>,
    pub aws_access_key_id: Option<String>,
    pub aws_secret_access_key: Option<String>,
    /// CDN distribution in front of the bucket, e.g. `https://d111111abcdef8.cloudfront.net`.
    pub s3_cf_distribution: Option<String>,
    pub ffmpeg_path: String,
    pub ffprobe_path: String,
    pub tool_timeout: Duration,
    pub max_video_bytes: u64,
    pub max_thumbnail_bytes: u64,
}

impl Config {
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|value| !value.trim().is_empty());
        let required = |name: &'static str| get(name).ok_or(ConfigError::Missing(name));

        let port = match get("PORT") {
            Some(value) => parse_number("PORT", &value)?,
            None => DEFAULT_PORT,
        };

        let public_base_url = match get("PUBLIC_BASE_URL") {
            Some(value) => parse_url("PUBLIC_BASE_URL", &value)?,
            None => format!("http://localhost:{}", port),
        };

        let s3_endpoint = get("S3_ENDPOINT")
            .map(|value| parse_url("S3_ENDPOINT", &value))
            .transpose()?;
        let s3_cf_distribution = get("S3_CF_DISTRIBUTION")
            .map(|value| parse_url("S3_CF_DISTRIBUTION", &value))
            .transpose()?;

        let tool_timeout_secs: u64 = match get("TOOL_TIMEOUT_SECS") {
            Some(value) => parse_number("TOOL_TIMEOUT_SECS", &value)?,
            None => DEFAULT_TOOL_TIMEOUT_SECS,
        };
        if tool_timeout_secs == 0 {
            return Err(ConfigError::Invalid {
                name: "TOOL_TIMEOUT_SECS",
                reason: "must be greater than zero".to_string(),
            });
        }

        let max_video_bytes = match get("MAX_VIDEO_BYTES") {
            Some(value) => parse_number("MAX_VIDEO_BYTES", &value)?,
            None => DEFAULT_MAX_VIDEO_BYTES,
        };
        let max_thumbnail_bytes = match get("MAX_THUMBNAIL_BYTES") {
            Some(value) => parse_number("MAX_THUMBNAIL_BYTES", &value)?,
            None => DEFAULT_MAX_THUMBNAIL_BYTES,
        };

        Ok(Self {
            database_url: required("DATABASE_URL")?,
            jwt_secret: required("JWT_SECRET")?,
            port,
            public_base_url,
            assets_root: get("ASSETS_ROOT")
                .map(PathBuf::from)
                .unwrap_or_else(|| PathBuf::from("./assets")),
            temp_dir: get("UPLOAD_TEMP_DIR")
                .map(PathBuf::from)
                .unwrap_or_else(env::temp_dir),
            s3_bucket: required("S3_BUCKET")?,
            s3_region: get("S3_REGION").unwrap_or_else(|| "us-east-1".to_string()),
            s3_endpoint,
            aws_access_key_id: get("AWS_ACCESS_KEY_ID"),
            aws_secret_access_key: get("AWS_SECRET_ACCESS_KEY"),
            s3_cf_distribution,
            ffmpeg_path: get("FFMPEG_PATH").unwrap_or_else(|| "ffmpeg".to_string()),
            ffprobe_path: get("FFPROBE_PATH").unwrap_or_else(|| "ffprobe".to_string()),
            tool_timeout: Duration::from_secs(tool_timeout_secs),
            max_video_bytes,
            max_thumbnail_bytes,
        })
    }

    /// Base address that playback URLs are built from.
    ///
    /// Prefers the CDN distribution; otherwise falls back to path-style URLs
    /// for S3-compatible endpoints and virtual-hosted style for AWS.
    pub fn store_base_url(&self) -> String {
        if let Some(distribution) = &self.s3_cf_distribution {
            distribution.clone()
        } else if let Some(endpoint) = &self.s3_endpoint {
            format!("{}/{}", endpoint, self.s3_bucket)
        } else {
            format!("https://{}.s3.{}.amazonaws.com", self.s3_bucket, self.s3_region)
        }
    }
}

fn parse_number<T>(name: &'static str, value: &str) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: Display,
{
    value.trim().parse().map_err(|e: T::Err| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })
}

// Stored without a trailing slash so keys can be appended with a single `/`.
fn parse_url(name: &'static str, value: &str) -> Result<String, ConfigError> {
    let value = value.trim();
    Url::parse(value).map_err(|e| ConfigError::Invalid {
        name,
        reason: e.to_string(),
    })?;
    Ok(value.trim_end_matches('/').to_string())
}
