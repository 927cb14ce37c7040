//! Keystore for the key pairs that sign ledger transactions

pub mod keystore;

pub use keystore::{KeyInfo, Keystore, KeystoreError};
