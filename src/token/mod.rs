//! Fungible tokens backing disbursements
//!
//! Provides:
//! - Fixed-supply mints with per-holder balances
//! - A vault routing transfers by asset address

pub mod token;
pub mod vault;

pub use token::{Mint, TokenError, TransferEvent};
pub use vault::TokenVault;
