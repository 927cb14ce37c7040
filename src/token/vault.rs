//! Token vault
//!
//! Holds every mint known to the program and routes transfers to them.

use crate::crypto::Identity;
use crate::token::token::{Mint, TokenError, TransferEvent};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// All mints by asset address
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenVault {
    mints: BTreeMap<Identity, Mint>,
    /// Creation counter for address derivation
    nonce: u64,
}

impl TokenVault {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mint; the whole supply goes to `authority`
    pub fn create_mint(
        &mut self,
        authority: &Identity,
        symbol: String,
        decimals: u8,
        supply: u64,
    ) -> Result<Identity, TokenError> {
        let asset = Identity::derive(&[
            &b"mint"[..],
            authority.as_bytes(),
            symbol.as_bytes(),
            &self.nonce.to_le_bytes()[..],
        ]);

        let mint = Mint::new(asset.clone(), symbol, decimals, supply, authority.clone())?;
        self.nonce += 1;

        log::info!(
            "Mint created: {} ({} units) at {}",
            mint.symbol,
            mint.supply,
            asset
        );

        self.mints.insert(asset.clone(), mint);
        Ok(asset)
    }

    /// Get a mint by asset address
    pub fn get(&self, asset: &Identity) -> Option<&Mint> {
        self.mints.get(asset)
    }

    /// List all mints
    pub fn list(&self) -> Vec<&Mint> {
        self.mints.values().collect()
    }

    /// Transfer tokens
    pub fn transfer(
        &mut self,
        asset: &Identity,
        from: &Identity,
        to: &Identity,
        amount: u64,
    ) -> Result<TransferEvent, TokenError> {
        let mint = self
            .mints
            .get_mut(asset)
            .ok_or_else(|| TokenError::AssetNotFound(asset.clone()))?;

        let event = mint.transfer(from, to, amount)?;
        log::debug!("Transferred {} of {} from {} to {}", amount, asset, from, to);
        Ok(event)
    }

    /// Get a holder's balance of an asset
    pub fn balance_of(&self, asset: &Identity, holder: &Identity) -> Result<u64, TokenError> {
        let mint = self
            .mints
            .get(asset)
            .ok_or_else(|| TokenError::AssetNotFound(asset.clone()))?;

        Ok(mint.balance_of(holder))
    }

    /// Get all assets held by an address
    pub fn holdings(&self, holder: &Identity) -> Vec<(&Mint, u64)> {
        self.mints
            .values()
            .filter_map(|mint| {
                let balance = mint.balance_of(holder);
                if balance > 0 {
                    Some((mint, balance))
                } else {
                    None
                }
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(name: &str) -> Identity {
        Identity::from(name)
    }

    #[test]
    fn test_vault_creation() {
        let vault = TokenVault::new();
        assert!(vault.list().is_empty());
    }

    #[test]
    fn test_create_mint_and_transfer() {
        let mut vault = TokenVault::new();
        let asset = vault
            .create_mint(&id("alice"), "DROP".to_string(), 6, 1_000)
            .unwrap();

        assert_eq!(vault.balance_of(&asset, &id("alice")).unwrap(), 1_000);

        vault.transfer(&asset, &id("alice"), &id("bob"), 400).unwrap();
        assert_eq!(vault.balance_of(&asset, &id("alice")).unwrap(), 600);
        assert_eq!(vault.balance_of(&asset, &id("bob")).unwrap(), 400);
        assert_eq!(vault.holdings(&id("bob")).len(), 1);
    }

    #[test]
    fn test_same_symbol_gets_distinct_assets() {
        let mut vault = TokenVault::new();
        let first = vault
            .create_mint(&id("alice"), "DROP".to_string(), 6, 10)
            .unwrap();
        let second = vault
            .create_mint(&id("alice"), "DROP".to_string(), 6, 10)
            .unwrap();

        assert_ne!(first, second);
        assert_eq!(vault.list().len(), 2);
    }

    #[test]
    fn test_unknown_asset() {
        let mut vault = TokenVault::new();
        assert!(matches!(
            vault.transfer(&id("nope"), &id("a"), &id("b"), 1),
            Err(TokenError::AssetNotFound(_))
        ));
        assert!(matches!(
            vault.balance_of(&id("nope"), &id("a")),
            Err(TokenError::AssetNotFound(_))
        ));
        assert!(matches!(
            vault.create_mint(&id("a"), String::new(), 6, 10),
            Err(TokenError::InvalidSymbol)
        ));
    }
}
