use std::fmt;
use std::sync::{Arc, PoisonError, RwLock};

use thiserror::Error;
use tracing::info;

/// Keys at or below this length are stored but not considered valid.
const MIN_VALID_KEY_LEN: usize = 10;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum CredentialError {
    #[error("API Key is required")]
    Empty,
}

/// API key for the media processing service. Never printed.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(raw: impl Into<String>) -> Result<Self, CredentialError> {
        let raw = raw.into().trim().to_string();
        if raw.is_empty() {
            return Err(CredentialError::Empty);
        }
        Ok(Self(raw))
    }

    pub fn expose(&self) -> &str {
        &self.0
    }

    pub fn is_valid(&self) -> bool {
        self.0.len() > MIN_VALID_KEY_LEN
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(****)")
    }
}

/// Holds the credential handed to the job client. Seeded at startup and
/// only changed through [`CredentialStore::replace`] or [`CredentialStore::clear`].
#[derive(Clone, Default)]
pub struct CredentialStore {
    inner: Arc<RwLock<Option<ApiKey>>>,
}

impl CredentialStore {
    pub fn new(initial: Option<String>) -> Self {
        let key = initial.and_then(|raw| ApiKey::new(raw).ok());
        Self {
            inner: Arc::new(RwLock::new(key)),
        }
    }

    pub fn current(&self) -> Option<ApiKey> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    pub fn replace(&self, raw: impl Into<String>) -> Result<(), CredentialError> {
        let key = ApiKey::new(raw)?;
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(key);
        info!("API key updated");
        Ok(())
    }

    pub fn clear(&self) {
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = None;
        info!("API key cleared");
    }

    pub fn is_configured(&self) -> bool {
        self.current().is_some()
    }

    pub fn is_authenticated(&self) -> bool {
        self.current().is_some_and(|key| key.is_valid())
    }
}

impl fmt::Debug for CredentialStore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("CredentialStore")
            .field("configured", &self.is_configured())
            .finish()
    }
}
