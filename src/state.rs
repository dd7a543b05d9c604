use std::sync::Arc;

use crate::config::credentials::CredentialStore;
use crate::config::settings::AppConfig;
use crate::infrastructure::storage::s3::StorageService;
use crate::modules::jobs::client::{JobClient, JobClientConfig};
use crate::modules::jobs::error::JobResult;
use crate::modules::jobs::poller::{PollerConfig, ProgressPoller};

#[derive(Clone)]
pub struct AppState {
    pub config: AppConfig,
    pub credentials: CredentialStore,
    pub jobs: JobClient,
    pub poller: ProgressPoller,
    pub storage: StorageService,
}

impl AppState {
    pub fn new(config: AppConfig, storage: StorageService) -> JobResult<Self> {
        let credentials = CredentialStore::new(config.media_api_key.clone());

        let jobs = JobClient::new(
            JobClientConfig {
                base_url: config.media_api_base_url.clone(),
                timeout: config.media_api_timeout(),
            },
            credentials.clone(),
        )?;

        let poller = ProgressPoller::new(
            Arc::new(jobs.clone()),
            PollerConfig {
                interval: config.poll_interval(),
                max_consecutive_failures: config.poll_max_failures,
            },
        );

        Ok(Self {
            config,
            credentials,
            jobs,
            poller,
            storage,
        })
    }
}
