use std::env;
use std::str::FromStr;

use thiserror::Error;
use tracing::warn;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("missing required environment variable {0}")]
    Missing(&'static str),

    #[error("invalid value for {key}: {reason}")]
    Invalid { key: &'static str, reason: String },
}

#[derive(Debug, Clone, Copy)]
pub enum EnvKey {
    ServerPort,
    FrontendUrl,
    MediaApiBaseUrl,
    MediaApiKey,
    MediaApiTimeoutSecs,
    PollIntervalMs,
    PollMaxFailures,
    MinioEndpoint,
    MinioPort,
    MinioUseSsl,
    MinioAccessKey,
    MinioSecretKey,
    MinioBucket,
    MinioRegion,
    UploadUrlTtlSecs,
    UploadMaxBytes,
    SettingsAdminToken,
}

impl EnvKey {
    pub fn as_str(&self) -> &'static str {
        match self {
            EnvKey::ServerPort => "APP_PORT",
            EnvKey::FrontendUrl => "FRONTEND_URL",
            EnvKey::MediaApiBaseUrl => "MEDIA_API_BASE_URL",
            EnvKey::MediaApiKey => "MEDIA_API_KEY",
            EnvKey::MediaApiTimeoutSecs => "MEDIA_API_TIMEOUT_SECS",
            EnvKey::PollIntervalMs => "POLL_INTERVAL_MS",
            EnvKey::PollMaxFailures => "POLL_MAX_FAILURES",
            EnvKey::MinioEndpoint => "MINIO_ENDPOINT",
            EnvKey::MinioPort => "MINIO_PORT",
            EnvKey::MinioUseSsl => "MINIO_USE_SSL",
            EnvKey::MinioAccessKey => "MINIO_ACCESS_KEY",
            EnvKey::MinioSecretKey => "MINIO_SECRET_KEY",
            EnvKey::MinioBucket => "MINIO_BUCKET_NAME",
            EnvKey::MinioRegion => "MINIO_REGION",
            EnvKey::UploadUrlTtlSecs => "UPLOAD_URL_TTL_SECS",
            EnvKey::UploadMaxBytes => "UPLOAD_MAX_BYTES",
            EnvKey::SettingsAdminToken => "SETTINGS_ADMIN_TOKEN",
        }
    }
}

/// Reads configuration values by key name. The process environment is the
/// production source; tests pass a map.
pub trait Lookup {
    fn lookup(&self, name: &str) -> Option<String>;
}

pub struct ProcessEnv;

impl Lookup for ProcessEnv {
    fn lookup(&self, name: &str) -> Option<String> {
        env::var(name).ok()
    }
}

impl<F> Lookup for F
where
    F: Fn(&str) -> Option<String>,
{
    fn lookup(&self, name: &str) -> Option<String> {
        self(name)
    }
}

/// Blank values count as unset.
pub fn get_opt(source: &impl Lookup, key: EnvKey) -> Option<String> {
    source
        .lookup(key.as_str())
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

pub fn get(source: &impl Lookup, key: EnvKey) -> Result<String, ConfigError> {
    get_opt(source, key).ok_or(ConfigError::Missing(key.as_str()))
}

pub fn get_or(source: &impl Lookup, key: EnvKey, default: &str) -> String {
    get_opt(source, key).unwrap_or_else(|| default.to_string())
}

pub fn get_parsed<T: FromStr>(source: &impl Lookup, key: EnvKey, default: T) -> T {
    match get_opt(source, key) {
        Some(val) => val.parse::<T>().unwrap_or_else(|_| {
            warn!("Ignoring unparsable {}={:?}, using default", key.as_str(), val);
            default
        }),
        None => default,
    }
}

/// Only the literal `true` enables a flag.
pub fn get_flag(source: &impl Lookup, key: EnvKey) -> bool {
    get_opt(source, key).is_some_and(|v| v == "true")
}

#[cfg(test)]
mod tests {
    use super::*;

    fn source(name: &str) -> Option<String> {
        match name {
            "APP_PORT" => Some("8080".to_string()),
            "POLL_MAX_FAILURES" => Some("lots".to_string()),
            "MINIO_USE_SSL" => Some("true".to_string()),
            "FRONTEND_URL" => Some("TRUE".to_string()),
            "MINIO_ENDPOINT" => Some("   ".to_string()),
            _ => None,
        }
    }

    #[test]
    fn test_parsed_value_and_fallback() {
        assert_eq!(get_parsed(&source, EnvKey::ServerPort, 5000u16), 8080);
        assert_eq!(get_parsed(&source, EnvKey::PollMaxFailures, 3u32), 3);
        assert_eq!(get_parsed(&source, EnvKey::PollIntervalMs, 1000u64), 1000);
    }

    #[test]
    fn test_blank_counts_as_missing() {
        assert!(matches!(
            get(&source, EnvKey::MinioEndpoint),
            Err(ConfigError::Missing("MINIO_ENDPOINT"))
        ));
    }

    #[test]
    fn test_flag_parsing() {
        assert!(get_flag(&source, EnvKey::MinioUseSsl));
        assert!(!get_flag(&source, EnvKey::FrontendUrl));
        assert!(!get_flag(&source, EnvKey::UploadMaxBytes));
    }
}
