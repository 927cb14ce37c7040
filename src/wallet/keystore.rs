//! Named key pairs on disk
//!
//! Each key lives in `<label>.json` under the keystore directory so commands
//! can refer to signers by name.

use crate::crypto::{Identity, KeyError, KeyPair};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum KeystoreError {
    #[error("Key not found: {0}")]
    NotFound(String),
    #[error("Key already exists: {0}")]
    AlreadyExists(String),
    #[error("Invalid label: {0}")]
    InvalidLabel(String),
    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Crypto error: {0}")]
    CryptoError(#[from] KeyError),
}

/// On-disk key file
#[derive(Debug, Serialize, Deserialize)]
struct KeyFile {
    label: String,
    identity: Identity,
    private_key_hex: String,
}

/// Public key information (safe to share)
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyInfo {
    pub label: String,
    pub identity: Identity,
    pub public_key: String,
}

pub struct Keystore {
    dir: PathBuf,
}

impl Keystore {
    pub fn new(dir: &Path) -> Result<Self, KeystoreError> {
        fs::create_dir_all(dir)?;
        Ok(Self {
            dir: dir.to_path_buf(),
        })
    }

    fn path(&self, label: &str) -> Result<PathBuf, KeystoreError> {
        let valid = !label.is_empty()
            && label
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || c == '-' || c == '_');
        if !valid {
            return Err(KeystoreError::InvalidLabel(label.to_string()));
        }
        Ok(self.dir.join(format!("{}.json", label)))
    }

    /// Generate and save a new key
    pub fn create(&self, label: &str) -> Result<KeyPair, KeystoreError> {
        let key_pair = KeyPair::generate();
        self.store(label, &key_pair)?;
        Ok(key_pair)
    }

    /// Save an existing private key under `label`
    pub fn import(&self, label: &str, private_key_hex: &str) -> Result<KeyPair, KeystoreError> {
        let key_pair = KeyPair::from_private_key_hex(private_key_hex)?;
        self.store(label, &key_pair)?;
        Ok(key_pair)
    }

    fn store(&self, label: &str, key_pair: &KeyPair) -> Result<(), KeystoreError> {
        let path = self.path(label)?;
        if path.exists() {
            return Err(KeystoreError::AlreadyExists(label.to_string()));
        }

        let file = KeyFile {
            label: label.to_string(),
            identity: key_pair.identity(),
            private_key_hex: key_pair.private_key_hex(),
        };
        fs::write(&path, serde_json::to_string_pretty(&file)?)?;
        log::info!("Stored key {} ({})", label, file.identity);
        Ok(())
    }

    pub fn load(&self, label: &str) -> Result<KeyPair, KeystoreError> {
        let path = self.path(label)?;
        if !path.exists() {
            return Err(KeystoreError::NotFound(label.to_string()));
        }

        let file: KeyFile = serde_json::from_str(&fs::read_to_string(&path)?)?;
        Ok(KeyPair::from_private_key_hex(&file.private_key_hex)?)
    }

    /// Resolve a label to its identity, or accept an identity as given
    pub fn resolve(&self, label_or_identity: &str) -> Result<Identity, KeystoreError> {
        match self.load(label_or_identity) {
            Ok(key_pair) => Ok(key_pair.identity()),
            Err(KeystoreError::NotFound(_)) | Err(KeystoreError::InvalidLabel(_)) => {
                Ok(Identity::new(label_or_identity))
            }
            Err(e) => Err(e),
        }
    }

    /// All stored keys, sorted by label
    pub fn list(&self) -> Result<Vec<KeyInfo>, KeystoreError> {
        let mut keys = Vec::new();

        for entry in fs::read_dir(&self.dir)? {
            let path = entry?.path();
            if path.extension().map(|e| e == "json").unwrap_or(false) {
                let file: KeyFile = match fs::read_to_string(&path)
                    .ok()
                    .and_then(|json| serde_json::from_str(&json).ok())
                {
                    Some(file) => file,
                    None => {
                        log::warn!("Skipping unreadable key file {}", path.display());
                        continue;
                    }
                };
                let key_pair = KeyPair::from_private_key_hex(&file.private_key_hex)?;
                keys.push(KeyInfo {
                    label: file.label,
                    identity: key_pair.identity(),
                    public_key: key_pair.public_key_hex(),
                });
            }
        }

        keys.sort_by(|a, b| a.label.cmp(&b.label));
        Ok(keys)
    }

    pub fn delete(&self, label: &str) -> Result<(), KeystoreError> {
        let path = self.path(label)?;
        if !path.exists() {
            return Err(KeystoreError::NotFound(label.to_string()));
        }
        fs::remove_file(path)?;
        Ok(())
    }
}
