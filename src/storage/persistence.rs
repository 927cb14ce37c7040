//! Ledger persistence layer
//!
//! Keeps the whole ledger as one JSON file with rotating backups.

use crate::crypto::Identity;
use crate::ledger::Ledger;
use std::fs;
use std::io::{self, BufReader, BufWriter};
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Storage errors
#[derive(Error, Debug)]
pub enum StorageError {
    #[error("IO error: {0}")]
    IoError(#[from] io::Error),
    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),
    #[error("Invalid data: {0}")]
    InvalidData(String),
}

/// Storage configuration
#[derive(Debug, Clone)]
pub struct StorageConfig {
    pub data_dir: PathBuf,
    pub ledger_file: String,
    pub backup_enabled: bool,
    pub max_backups: usize,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(".distributor_data"),
            ledger_file: "ledger.json".to_string(),
            backup_enabled: true,
            max_backups: 5,
        }
    }
}

impl StorageConfig {
    pub fn with_data_dir(data_dir: impl Into<PathBuf>) -> Self {
        Self {
            data_dir: data_dir.into(),
            ..Default::default()
        }
    }
}

/// Ledger storage manager
pub struct Storage {
    config: StorageConfig,
}

impl Storage {
    pub fn new(config: StorageConfig) -> Result<Self, StorageError> {
        fs::create_dir_all(&config.data_dir)?;
        Ok(Self { config })
    }

    pub fn data_dir(&self) -> &Path {
        &self.config.data_dir
    }

    fn ledger_path(&self) -> PathBuf {
        self.config.data_dir.join(&self.config.ledger_file)
    }

    fn backup_path(&self, index: usize) -> PathBuf {
        self.config
            .data_dir
            .join(format!("{}.backup.{}", self.config.ledger_file, index))
    }

    /// Write the ledger, keeping the previous file as backup 0
    pub fn save(&self, ledger: &Ledger) -> Result<(), StorageError> {
        let path = self.ledger_path();

        if self.config.backup_enabled && self.config.max_backups > 0 && path.exists() {
            self.rotate_backups()?;
            fs::copy(&path, self.backup_path(0))?;
        }

        let temp_path = self
            .config
            .data_dir
            .join(format!("{}.tmp", self.config.ledger_file));
        let writer = BufWriter::new(fs::File::create(&temp_path)?);
        serde_json::to_writer_pretty(writer, ledger)?;

        fs::rename(&temp_path, &path)?;
        log::debug!("Saved ledger at slot {} to {}", ledger.slot(), path.display());
        Ok(())
    }

    pub fn load(&self) -> Result<Ledger, StorageError> {
        let path = self.ledger_path();
        if !path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Ledger file not found: {}",
                path.display()
            )));
        }
        read_ledger(&path)
    }

    /// Load the saved ledger, or start a fresh one for `program_id`
    pub fn load_or_create(&self, program_id: Identity) -> Result<Ledger, StorageError> {
        if !self.exists() {
            log::info!("Starting new ledger for program {}", program_id);
            return Ok(Ledger::new(program_id));
        }

        let ledger = self.load()?;
        if ledger.program_id() != &program_id {
            return Err(StorageError::InvalidData(format!(
                "Ledger belongs to program {}, not {}",
                ledger.program_id(),
                program_id
            )));
        }
        Ok(ledger)
    }

    pub fn exists(&self) -> bool {
        self.ledger_path().exists()
    }

    fn rotate_backups(&self) -> Result<(), StorageError> {
        let oldest = self.backup_path(self.config.max_backups - 1);
        if oldest.exists() {
            fs::remove_file(&oldest)?;
        }

        for i in (0..self.config.max_backups - 1).rev() {
            let current = self.backup_path(i);
            if current.exists() {
                fs::rename(&current, self.backup_path(i + 1))?;
            }
        }
        Ok(())
    }

    /// Indices of backups present on disk, newest first
    pub fn list_backups(&self) -> Vec<usize> {
        (0..self.config.max_backups)
            .filter(|i| self.backup_path(*i).exists())
            .collect()
    }

    pub fn restore_backup(&self, index: usize) -> Result<Ledger, StorageError> {
        let path = self.backup_path(index);
        if !path.exists() {
            return Err(StorageError::InvalidData(format!(
                "Backup {} not found",
                index
            )));
        }
        read_ledger(&path)
    }
}

fn read_ledger(path: &Path) -> Result<Ledger, StorageError> {
    let reader = BufReader::new(fs::File::open(path)?);
    Ok(serde_json::from_reader(reader)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::ledger::SignedTransaction;
    use crate::program::{InitializeArgs, Instruction};

    fn program_id() -> Identity {
        Identity::derive(&[&b"storage-test"[..]])
    }

    fn initialized_ledger() -> Ledger {
        let mut ledger = Ledger::new(program_id());
        let payer = KeyPair::generate();
        let tx = SignedTransaction::sign(&payer, Instruction::Initialize(InitializeArgs::default()))
            .unwrap();
        ledger.process(&tx).unwrap();
        ledger
    }

    #[test]
    fn test_save_load_ledger() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(StorageConfig::with_data_dir(temp_dir.path())).unwrap();
        let ledger = initialized_ledger();

        storage.save(&ledger).unwrap();
        assert!(storage.exists());

        let loaded = storage.load().unwrap();
        assert_eq!(loaded.slot(), 1);
        assert!(loaded.state().is_initialized());
        assert_eq!(loaded.receipts(), ledger.receipts());
    }

    #[test]
    fn test_load_or_create() {
        let temp_dir = tempfile::tempdir().unwrap();
        let storage = Storage::new(StorageConfig::with_data_dir(temp_dir.path())).unwrap();

        let fresh = storage.load_or_create(program_id()).unwrap();
        assert_eq!(fresh.slot(), 0);

        storage.save(&initialized_ledger()).unwrap();
        assert_eq!(storage.load_or_create(program_id()).unwrap().slot(), 1);

        let other = Identity::derive(&[&b"other"[..]]);
        assert!(matches!(
            storage.load_or_create(other),
            Err(StorageError::InvalidData(_))
        ));
    }

    #[test]
    fn test_backup_rotation() {
        let temp_dir = tempfile::tempdir().unwrap();
        let config = StorageConfig {
            data_dir: temp_dir.path().to_path_buf(),
            max_backups: 3,
            ..Default::default()
        };
        let storage = Storage::new(config).unwrap();
        let ledger = initialized_ledger();

        for _ in 0..5 {
            storage.save(&ledger).unwrap();
        }

        assert_eq!(storage.list_backups(), vec![0, 1, 2]);
        assert_eq!(storage.restore_backup(2).unwrap().slot(), 1);
        assert!(storage.restore_backup(7).is_err());
    }
}
