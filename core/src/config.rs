// ABOUTME: Reads the signing daemon's local configuration store
// ABOUTME: Surfaces the configured hardware device URL, failing loudly on missing or corrupt config

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

/// Entry name under which the daemon records the hardware device URL.
pub const DEVICE_URL_ENTRY: &str = "ledger_tezos";

/// Default location of the daemon's key configuration file.
pub const DEFAULT_SECRET_KEYS_PATH: &str = "/home/tezos/.tezos-signer/secret_keys";

/// One name/value entry from the daemon's key configuration list.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SignerKeyEntry {
    pub name: String,
    pub value: String,
}

/// A missing or corrupt configuration is itself a safety-relevant
/// condition; both variants are surfaced, never defaulted.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("signer configuration has no \"{entry}\" entry")]
    Missing { entry: String },
    #[error("signer configuration could not be read: {0}")]
    Unreadable(String),
}

/// Access to the locally configured device URL.
#[async_trait]
pub trait ConfigReader: Send + Sync {
    async fn configured_device_url(&self) -> Result<String, ConfigError>;
}

pub fn find_entry(entries: &[SignerKeyEntry], name: &str) -> Option<String> {
    entries
        .iter()
        .find(|entry| entry.name == name)
        .map(|entry| entry.value.clone())
}

/// Reads the daemon's `secret_keys` JSON list. The file is re-read on
/// every call; an immutable snapshot per request, never cached.
pub struct SecretKeysFile {
    path: PathBuf,
    entry_name: String,
}

impl SecretKeysFile {
    pub fn new(path: impl Into<PathBuf>, entry_name: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            entry_name: entry_name.into(),
        }
    }
}

#[async_trait]
impl ConfigReader for SecretKeysFile {
    async fn configured_device_url(&self) -> Result<String, ConfigError> {
        let raw = tokio::fs::read(&self.path)
            .await
            .map_err(|err| ConfigError::Unreadable(err.to_string()))?;
        let entries: Vec<SignerKeyEntry> = serde_json::from_slice(&raw)
            .map_err(|err| ConfigError::Unreadable(err.to_string()))?;
        find_entry(&entries, &self.entry_name).ok_or_else(|| ConfigError::Missing {
            entry: self.entry_name.clone(),
        })
    }
}
