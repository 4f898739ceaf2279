use crate::error::StoreError;
use crate::types::Credentials;
use std::sync::RwLock;

/// Where the API key pair and template list live between runs.
///
/// Recognition only ever calls `get`; `set` is reserved for an explicit
/// settings save and must replace the stored value as a whole.
pub trait CredentialStore: Send + Sync {
    fn get(&self) -> Result<Option<Credentials>, StoreError>;
    fn set(&self, credentials: &Credentials) -> Result<(), StoreError>;
}

/// Settings for display: stored value, or empty fields when nothing was saved yet.
pub fn load_settings(store: &dyn CredentialStore) -> Result<Credentials, StoreError> {
    Ok(store.get()?.unwrap_or_default())
}

/// Process-local store; nothing survives the process.
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    inner: RwLock<Option<Credentials>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credentials(credentials: Credentials) -> Self {
        Self {
            inner: RwLock::new(Some(credentials)),
        }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn get(&self) -> Result<Option<Credentials>, StoreError> {
        let guard = self.inner.read().map_err(|_| StoreError::Poisoned)?;
        Ok(guard.clone())
    }

    fn set(&self, credentials: &Credentials) -> Result<(), StoreError> {
        let mut guard = self.inner.write().map_err(|_| StoreError::Poisoned)?;
        *guard = Some(credentials.clone());
        Ok(())
    }
}
