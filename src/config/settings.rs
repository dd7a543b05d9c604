use std::time::Duration;

use url::Url;

use crate::config::env::{self, ConfigError, EnvKey, Lookup, ProcessEnv};

/// SigV4 presigned URLs expire after at most seven days.
pub const MAX_UPLOAD_URL_TTL_SECS: u64 = 7 * 24 * 60 * 60;

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub server_port: u16,
    pub frontend_url: Option<String>,
    pub media_api_base_url: String,
    pub media_api_key: Option<String>,
    pub media_api_timeout_secs: u64,
    pub poll_interval_ms: u64,
    pub poll_max_failures: u32,
    pub minio_endpoint: String,
    pub minio_port: u16,
    pub minio_use_ssl: bool,
    pub minio_access_key: String,
    pub minio_secret_key: String,
    pub minio_bucket: String,
    pub minio_region: String,
    pub upload_url_ttl_secs: u64,
    pub upload_max_bytes: usize,
    /// Required by writes to the stored API key when set.
    pub settings_admin_token: Option<String>,
}

impl AppConfig {
    pub fn new() -> Result<Self, ConfigError> {
        Self::from_lookup(&ProcessEnv)
    }

    pub fn from_lookup(source: &impl Lookup) -> Result<Self, ConfigError> {
        let media_api_base_url = env::get(source, EnvKey::MediaApiBaseUrl)?;
        Url::parse(&media_api_base_url).map_err(|e| ConfigError::Invalid {
            key: EnvKey::MediaApiBaseUrl.as_str(),
            reason: e.to_string(),
        })?;

        let poll_interval_ms = env::get_parsed(source, EnvKey::PollIntervalMs, 1000u64);
        if poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                key: EnvKey::PollIntervalMs.as_str(),
                reason: "must be greater than zero".to_string(),
            });
        }

        let upload_url_ttl_secs = env::get_parsed(source, EnvKey::UploadUrlTtlSecs, 24 * 60 * 60u64);
        if !(1..=MAX_UPLOAD_URL_TTL_SECS).contains(&upload_url_ttl_secs) {
            return Err(ConfigError::Invalid {
                key: EnvKey::UploadUrlTtlSecs.as_str(),
                reason: format!("must be between 1 and {} seconds", MAX_UPLOAD_URL_TTL_SECS),
            });
        }

        Ok(Self {
            server_port: env::get_parsed(source, EnvKey::ServerPort, 5000),
            frontend_url: env::get_opt(source, EnvKey::FrontendUrl),
            media_api_base_url: media_api_base_url.trim_end_matches('/').to_string(),
            media_api_key: env::get_opt(source, EnvKey::MediaApiKey),
            media_api_timeout_secs: env::get_parsed(source, EnvKey::MediaApiTimeoutSecs, 30),
            poll_interval_ms,
            poll_max_failures: env::get_parsed(source, EnvKey::PollMaxFailures, 3u32).max(1),
            minio_endpoint: env::get(source, EnvKey::MinioEndpoint)?,
            minio_port: env::get_parsed(source, EnvKey::MinioPort, 9000),
            minio_use_ssl: env::get_flag(source, EnvKey::MinioUseSsl),
            minio_access_key: env::get(source, EnvKey::MinioAccessKey)?,
            minio_secret_key: env::get(source, EnvKey::MinioSecretKey)?,
            minio_bucket: env::get(source, EnvKey::MinioBucket)?,
            minio_region: env::get_or(source, EnvKey::MinioRegion, "us-east-1"),
            upload_url_ttl_secs,
            upload_max_bytes: env::get_parsed(source, EnvKey::UploadMaxBytes, 100 * 1024 * 1024),
            settings_admin_token: env::get_opt(source, EnvKey::SettingsAdminToken),
        })
    }

    /// `MINIO_ENDPOINT` may be a bare host or already carry a scheme.
    pub fn storage_endpoint_url(&self) -> String {
        if self.minio_endpoint.starts_with("http://") || self.minio_endpoint.starts_with("https://") {
            return self.minio_endpoint.trim_end_matches('/').to_string();
        }

        let scheme = if self.minio_use_ssl { "https" } else { "http" };
        format!("{}://{}:{}", scheme, self.minio_endpoint, self.minio_port)
    }

    pub fn poll_interval(&self) -> Duration {
        Duration::from_millis(self.poll_interval_ms)
    }

    pub fn media_api_timeout(&self) -> Duration {
        Duration::from_secs(self.media_api_timeout_secs)
    }

    pub fn upload_url_ttl(&self) -> Duration {
        Duration::from_secs(self.upload_url_ttl_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn base_vars() -> HashMap<&'static str, String> {
        HashMap::from([
            ("MEDIA_API_BASE_URL", "https://api.example.com/".to_string()),
            ("MINIO_ENDPOINT", "minio.internal".to_string()),
            ("MINIO_ACCESS_KEY", "access".to_string()),
            ("MINIO_SECRET_KEY", "secret".to_string()),
            ("MINIO_BUCKET_NAME", "uploads".to_string()),
        ])
    }

    fn load(vars: &HashMap<&'static str, String>) -> Result<AppConfig, ConfigError> {
        AppConfig::from_lookup(&|name: &str| vars.get(name).cloned())
    }

    #[test]
    fn test_defaults() {
        let config = load(&base_vars()).unwrap();

        assert_eq!(config.server_port, 5000);
        assert_eq!(config.media_api_base_url, "https://api.example.com");
        assert_eq!(config.media_api_key, None);
        assert_eq!(config.poll_interval(), Duration::from_secs(1));
        assert_eq!(config.poll_max_failures, 3);
        assert_eq!(config.upload_url_ttl(), Duration::from_secs(86_400));
        assert_eq!(config.storage_endpoint_url(), "http://minio.internal:9000");
        assert_eq!(config.settings_admin_token, None);
    }

    #[test]
    fn test_ssl_flag_is_case_sensitive() {
        let mut vars = base_vars();
        vars.insert("MINIO_USE_SSL", "TRUE".to_string());

        let config = load(&vars).unwrap();
        assert!(!config.minio_use_ssl);
        assert_eq!(config.storage_endpoint_url(), "http://minio.internal:9000");
    }

    #[test]
    fn test_ssl_endpoint() {
        let mut vars = base_vars();
        vars.insert("MINIO_USE_SSL", "true".to_string());
        vars.insert("MINIO_PORT", "443".to_string());

        let config = load(&vars).unwrap();
        assert_eq!(config.storage_endpoint_url(), "https://minio.internal:443");
    }

    #[test]
    fn test_endpoint_with_scheme_is_kept() {
        let mut vars = base_vars();
        vars.insert("MINIO_ENDPOINT", "http://localhost:9100/".to_string());

        let config = load(&vars).unwrap();
        assert_eq!(config.storage_endpoint_url(), "http://localhost:9100");
    }

    #[test]
    fn test_missing_bucket() {
        let mut vars = base_vars();
        vars.remove("MINIO_BUCKET_NAME");

        assert!(matches!(load(&vars), Err(ConfigError::Missing("MINIO_BUCKET_NAME"))));
    }

    #[test]
    fn test_zero_poll_interval_is_rejected() {
        let mut vars = base_vars();
        vars.insert("POLL_INTERVAL_MS", "0".to_string());

        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "POLL_INTERVAL_MS", .. })
        ));
    }

    #[test]
    fn test_upload_url_ttl_is_capped_at_seven_days() {
        let mut vars = base_vars();
        vars.insert("UPLOAD_URL_TTL_SECS", "604800".to_string());
        assert_eq!(load(&vars).unwrap().upload_url_ttl(), Duration::from_secs(604_800));

        vars.insert("UPLOAD_URL_TTL_SECS", "604801".to_string());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "UPLOAD_URL_TTL_SECS", .. })
        ));

        vars.insert("UPLOAD_URL_TTL_SECS", "0".to_string());
        assert!(matches!(
            load(&vars),
            Err(ConfigError::Invalid { key: "UPLOAD_URL_TTL_SECS", .. })
        ));
    }

    #[test]
    fn test_invalid_base_url() {
        let mut vars = base_vars();
        vars.insert("MEDIA_API_BASE_URL", "not a url".to_string());

        assert!(matches!(load(&vars), Err(ConfigError::Invalid { .. })));
    }
}
