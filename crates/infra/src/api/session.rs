//! Session and credential handling
//!
//! Each client owns its credential; there is no process-wide token. The
//! credential is mirrored to a [`CredentialStore`] so it survives restarts.
//! When a call is classified as session-expired the credential is dropped
//! from memory and from the store, and a [`SessionEvent::Expired`] is
//! published. Reacting to it (sending the user to sign-in) is up to the
//! host application.

use std::fmt;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use chrono::{DateTime, Utc};
use courier_domain::{CourierError, Credential, Result};
use keyring::Entry;
use parking_lot::{Mutex, RwLock};
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Durable storage for the client credential
pub trait CredentialStore: Send + Sync + fmt::Debug {
    /// `Ok(None)` when nothing is stored.
    fn load(&self) -> Result<Option<Credential>>;

    fn save(&self, credential: &Credential) -> Result<()>;

    /// Idempotent.
    fn clear(&self) -> Result<()>;
}

/// Process-local store; nothing survives a restart
#[derive(Debug, Default)]
pub struct MemoryCredentialStore {
    slot: Mutex<Option<Credential>>,
}

impl MemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_credential(credential: Credential) -> Self {
        Self { slot: Mutex::new(Some(credential)) }
    }
}

impl CredentialStore for MemoryCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        Ok(self.slot.lock().clone())
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        *self.slot.lock() = Some(credential.clone());
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        *self.slot.lock() = None;
        Ok(())
    }
}

#[derive(Serialize, Deserialize)]
struct StoredCredential {
    token: Credential,
    saved_at: DateTime<Utc>,
}

/// JSON file store
///
/// A missing file means no credential. Parent directories are created on
/// save.
#[derive(Debug, Clone)]
pub struct FileCredentialStore {
    path: PathBuf,
}

impl FileCredentialStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }
}

impl CredentialStore for FileCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        let contents = match std::fs::read_to_string(&self.path) {
            Ok(contents) => contents,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(e) => {
                return Err(CourierError::Storage(format!(
                    "Failed to read credential file {}: {e}",
                    self.path.display()
                )))
            }
        };

        let stored: StoredCredential = serde_json::from_str(&contents)?;
        Ok(Some(stored.token).filter(|c| !c.is_blank()))
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        if let Some(parent) = self.path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(|e| {
                CourierError::Storage(format!("Failed to create {}: {e}", parent.display()))
            })?;
        }

        let stored = StoredCredential { token: credential.clone(), saved_at: Utc::now() };
        let json = serde_json::to_string_pretty(&stored)?;
        std::fs::write(&self.path, json).map_err(|e| {
            CourierError::Storage(format!(
                "Failed to write credential file {}: {e}",
                self.path.display()
            ))
        })?;

        debug!(path = %self.path.display(), "Credential saved");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match std::fs::remove_file(&self.path) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(CourierError::Storage(format!(
                "Failed to remove credential file {}: {e}",
                self.path.display()
            ))),
        }
    }
}

/// Platform keychain store (macOS Keychain, Windows Credential Manager,
/// Secret Service)
#[derive(Debug, Clone)]
pub struct KeychainCredentialStore {
    service: String,
    account: String,
}

impl KeychainCredentialStore {
    /// # Arguments
    /// * `service` - Keychain service name (e.g., "Courier.api")
    /// * `account` - Keychain account name (e.g., "default")
    pub fn new(service: impl Into<String>, account: impl Into<String>) -> Self {
        Self { service: service.into(), account: account.into() }
    }

    fn entry(&self) -> Result<Entry> {
        Entry::new(&self.service, &self.account).map_err(|e| {
            CourierError::Storage(format!("Invalid keychain entry {}: {e}", self.service))
        })
    }
}

impl CredentialStore for KeychainCredentialStore {
    fn load(&self) -> Result<Option<Credential>> {
        match self.entry()?.get_password() {
            Ok(secret) => Ok(Some(Credential::new(secret)).filter(|c| !c.is_blank())),
            Err(keyring::Error::NoEntry) => Ok(None),
            Err(e) => Err(CourierError::Storage(format!("Failed to read keychain: {e}"))),
        }
    }

    fn save(&self, credential: &Credential) -> Result<()> {
        self.entry()?
            .set_password(credential.expose())
            .map_err(|e| CourierError::Storage(format!("Failed to write keychain: {e}")))?;
        debug!(service = %self.service, "Credential stored in keychain");
        Ok(())
    }

    fn clear(&self) -> Result<()> {
        match self.entry()?.delete_credential() {
            Ok(()) | Err(keyring::Error::NoEntry) => Ok(()),
            Err(e) => Err(CourierError::Storage(format!("Failed to clear keychain: {e}"))),
        }
    }
}

/// Published on the session channel
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionEvent {
    /// A call on `endpoint` was rejected with 401; the credential is gone.
    Expired { endpoint: String, at: DateTime<Utc> },
    /// The credential was set or cleared through the client.
    CredentialChanged { present: bool },
}

/// The client's credential, its store and the session event channel
#[derive(Debug)]
pub struct SessionState {
    credential: RwLock<Option<Credential>>,
    store: Arc<dyn CredentialStore>,
    tx: broadcast::Sender<SessionEvent>,
}

impl SessionState {
    /// Restore the stored credential, if any.
    ///
    /// # Errors
    ///
    /// Returns the store's error when it cannot be read.
    pub fn restore(store: Arc<dyn CredentialStore>, capacity: usize) -> Result<Self> {
        let credential = store.load()?;
        if credential.is_some() {
            info!("Restored stored credential");
        }

        let (tx, _) = broadcast::channel(capacity.max(1));
        Ok(Self { credential: RwLock::new(credential), store, tx })
    }

    pub fn credential(&self) -> Option<Credential> {
        self.credential.read().clone()
    }

    /// Replace or clear the credential, in memory and in the store.
    ///
    /// A blank token clears.
    ///
    /// # Errors
    ///
    /// Returns the store's error; the in-memory value is updated regardless.
    pub fn set(&self, credential: Option<Credential>) -> Result<()> {
        let credential = credential.filter(|c| !c.is_blank());
        let present = credential.is_some();
        *self.credential.write() = credential.clone();
        let _ = self.tx.send(SessionEvent::CredentialChanged { present });

        match credential {
            Some(credential) => self.store.save(&credential),
            None => self.store.clear(),
        }
    }

    /// Drop the credential after a 401 on `endpoint` and announce it.
    pub fn expire(&self, endpoint: &str) {
        let had_credential = self.credential.write().take().is_some();
        if let Err(e) = self.store.clear() {
            warn!(error = %e, "Failed to clear stored credential after session expiry");
        }

        warn!(endpoint, had_credential, "Session expired");
        let _ = self
            .tx
            .send(SessionEvent::Expired { endpoint: endpoint.to_string(), at: Utc::now() });
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.tx.subscribe()
    }
}
