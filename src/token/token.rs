//! Fungible token mint
//!
//! One mint per asset: fixed supply, per-holder balances, transfers.

use crate::crypto::Identity;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use thiserror::Error;

/// Token-related errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum TokenError {
    #[error("Insufficient balance: have {have}, need {need}")]
    InsufficientBalance { have: u64, need: u64 },
    #[error("Invalid amount: amount must be greater than 0")]
    InvalidAmount,
    #[error("Asset not found: {0}")]
    AssetNotFound(Identity),
    #[error("Invalid address: cannot transfer to self")]
    SelfTransfer,
    #[error("Invalid symbol: must be 1-10 characters")]
    InvalidSymbol,
    #[error("Invalid decimals: must be 0-18")]
    InvalidDecimals,
    #[error("Invalid supply: must be greater than 0")]
    InvalidSupply,
}

/// Transfer event (emitted when tokens move)
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TransferEvent {
    pub asset: Identity,
    pub from: Identity,
    pub to: Identity,
    pub amount: u64,
}

/// A fixed-supply mint and its balances
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Mint {
    /// Asset address
    pub asset: Identity,
    pub symbol: String,
    pub decimals: u8,
    /// Total supply (fixed at creation)
    pub supply: u64,
    /// Creator, initially holding the whole supply
    pub authority: Identity,
    pub created_at: DateTime<Utc>,
    balances: BTreeMap<Identity, u64>,
}

impl Mint {
    /// Create a mint with the whole supply credited to `authority`
    pub fn new(
        asset: Identity,
        symbol: String,
        decimals: u8,
        supply: u64,
        authority: Identity,
    ) -> Result<Self, TokenError> {
        if symbol.is_empty() || symbol.len() > 10 {
            return Err(TokenError::InvalidSymbol);
        }

        if decimals > 18 {
            return Err(TokenError::InvalidDecimals);
        }

        if supply == 0 {
            return Err(TokenError::InvalidSupply);
        }

        let mut balances = BTreeMap::new();
        balances.insert(authority.clone(), supply);

        Ok(Self {
            asset,
            symbol,
            decimals,
            supply,
            authority,
            created_at: Utc::now(),
            balances,
        })
    }

    /// Get balance of a holder
    pub fn balance_of(&self, holder: &Identity) -> u64 {
        self.balances.get(holder).copied().unwrap_or(0)
    }

    /// Get all holders with balances
    pub fn holders(&self) -> Vec<(&Identity, u64)> {
        self.balances
            .iter()
            .filter(|(_, &b)| b > 0)
            .map(|(h, &b)| (h, b))
            .collect()
    }

    /// Move `amount` from one holder to another
    pub fn transfer(
        &mut self,
        from: &Identity,
        to: &Identity,
        amount: u64,
    ) -> Result<TransferEvent, TokenError> {
        if amount == 0 {
            return Err(TokenError::InvalidAmount);
        }

        if from == to {
            return Err(TokenError::SelfTransfer);
        }

        let from_balance = self.balance_of(from);
        if from_balance < amount {
            return Err(TokenError::InsufficientBalance {
                have: from_balance,
                need: amount,
            });
        }

        // Supply is fixed, so the recipient balance cannot overflow
        self.balances.insert(from.clone(), from_balance - amount);
        *self.balances.entry(to.clone()).or_insert(0) += amount;

        Ok(TransferEvent {
            asset: self.asset.clone(),
            from: from.clone(),
            to: to.clone(),
            amount,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Identity {
        Identity::from(name)
    }

    fn create_test_mint() -> Mint {
        Mint::new(id("mint"), "DROP".to_string(), 6, 1_000_000, id("creator")).unwrap()
    }

    #[test]
    fn test_mint_creation() {
        let mint = create_test_mint();

        assert_eq!(mint.supply, 1_000_000);
        assert_eq!(mint.balance_of(&id("creator")), 1_000_000);
        assert_eq!(mint.holders().len(), 1);
    }

    #[test]
    fn test_mint_validation() {
        let make = |symbol: &str, decimals, supply| {
            Mint::new(id("m"), symbol.to_string(), decimals, supply, id("c"))
        };

        assert!(matches!(make("", 6, 10), Err(TokenError::InvalidSymbol)));
        assert!(matches!(
            make("TOOLONGSYMBOL", 6, 10),
            Err(TokenError::InvalidSymbol)
        ));
        assert!(matches!(make("OK", 19, 10), Err(TokenError::InvalidDecimals)));
        assert!(matches!(make("OK", 6, 0), Err(TokenError::InvalidSupply)));
    }

    #[test]
    fn test_transfer() {
        let mut mint = create_test_mint();

        let event = mint.transfer(&id("creator"), &id("recipient"), 1000).unwrap();

        assert_eq!(event.amount, 1000);
        assert_eq!(mint.balance_of(&id("creator")), 999_000);
        assert_eq!(mint.balance_of(&id("recipient")), 1000);
        assert_eq!(mint.holders().len(), 2);
    }

    #[test]
    fn test_transfer_rejections() {
        let mut mint = create_test_mint();

        assert_eq!(
            mint.transfer(&id("creator"), &id("r"), 2_000_000),
            Err(TokenError::InsufficientBalance {
                have: 1_000_000,
                need: 2_000_000
            })
        );
        assert_eq!(
            mint.transfer(&id("creator"), &id("r"), 0),
            Err(TokenError::InvalidAmount)
        );
        assert_eq!(
            mint.transfer(&id("creator"), &id("creator"), 5),
            Err(TokenError::SelfTransfer)
        );
        assert_eq!(mint.balance_of(&id("creator")), 1_000_000);
    }
}
