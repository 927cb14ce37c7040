//! Merkle distributors
//!
//! A distributor holds a funded vault and a merkle root over
//! `(index, claimant, amount)` leaves. Each leaf can be claimed once.

use crate::crypto::{claim_leaf, verify_proof, Hash32, Identity};
use crate::token::{TokenError, TokenVault};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;

/// Distributor errors
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum DistributorError {
    #[error("Distributor not found: {0}")]
    NotFound(DistributorId),
    #[error("Drop {index} of distributor {distributor} already claimed")]
    DropAlreadyClaimed {
        distributor: DistributorId,
        index: u64,
    },
    #[error("Invalid merkle proof")]
    InvalidProof,
    #[error("Claim exceeds max total claim: claimed {claimed}, amount {amount}, max {max}")]
    ExceededMaxClaim { claimed: u64, amount: u64, max: u64 },
    #[error("Exceeded max number of claims: {max}")]
    ExceededNumNodes { max: u64 },
    #[error("Invalid distributor parameters: {0}")]
    InvalidParameters(String),
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
}

/// Distributor identifier
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DistributorId(pub u64);

impl fmt::Display for DistributorId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// A funded merkle distributor
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Distributor {
    pub id: DistributorId,
    /// Asset being distributed
    pub asset: Identity,
    /// Merkle root of all claims
    pub root: Hash32,
    /// Program-owned account holding the undistributed tokens
    pub vault: Identity,
    pub max_total_claim: u64,
    pub max_num_nodes: u64,
    pub total_claimed: u64,
    pub num_nodes_claimed: u64,
    pub created_at: DateTime<Utc>,
}

impl Distributor {
    pub fn remaining(&self) -> u64 {
        self.max_total_claim - self.total_claimed
    }
}

/// Record of a claimed leaf
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct ClaimStatus {
    pub distributor: DistributorId,
    pub index: u64,
    pub claimant: Identity,
    pub amount: u64,
    pub claimed_at: DateTime<Utc>,
}

/// All distributors and their claim records
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct DistributorBook {
    distributors: BTreeMap<DistributorId, Distributor>,
    claims: BTreeMap<DistributorId, BTreeMap<u64, ClaimStatus>>,
    last_id: u64,
}

impl DistributorBook {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a distributor and move `max_total_claim` from `funder` into its vault
    pub fn fund(
        &mut self,
        tokens: &mut TokenVault,
        funder: &Identity,
        asset: &Identity,
        root: Hash32,
        max_total_claim: u64,
        max_num_nodes: u64,
    ) -> Result<DistributorId, DistributorError> {
        if max_total_claim == 0 || max_num_nodes == 0 {
            return Err(DistributorError::InvalidParameters(
                "max total claim and max num nodes must be positive".to_string(),
            ));
        }

        let id = DistributorId(self.last_id + 1);
        let vault = Identity::derive(&[&b"distributor"[..], &id.0.to_le_bytes()[..], &root[..]]);

        tokens.transfer(asset, funder, &vault, max_total_claim)?;
        self.last_id = id.0;

        log::info!(
            "Distributor {} funded with {} of {} for up to {} claims",
            id,
            max_total_claim,
            asset,
            max_num_nodes
        );

        self.distributors.insert(
            id,
            Distributor {
                id,
                asset: asset.clone(),
                root,
                vault,
                max_total_claim,
                max_num_nodes,
                total_claimed: 0,
                num_nodes_claimed: 0,
                created_at: Utc::now(),
            },
        );
        Ok(id)
    }

    pub fn get(&self, id: DistributorId) -> Result<&Distributor, DistributorError> {
        self.distributors
            .get(&id)
            .ok_or(DistributorError::NotFound(id))
    }

    pub fn list(&self) -> Vec<&Distributor> {
        self.distributors.values().collect()
    }

    pub fn claim_status(&self, id: DistributorId, index: u64) -> Option<&ClaimStatus> {
        self.claims.get(&id).and_then(|claims| claims.get(&index))
    }

    /// Claim leaf `index` for `claimant`, paying out of the distributor vault
    pub fn claim(
        &mut self,
        tokens: &mut TokenVault,
        id: DistributorId,
        index: u64,
        claimant: &Identity,
        amount: u64,
        proof: &[Hash32],
    ) -> Result<ClaimStatus, DistributorError> {
        if self.claim_status(id, index).is_some() {
            // Report an unknown distributor before a claim on it
            self.get(id)?;
            return Err(DistributorError::DropAlreadyClaimed {
                distributor: id,
                index,
            });
        }

        let distributor = self
            .distributors
            .get_mut(&id)
            .ok_or(DistributorError::NotFound(id))?;

        let leaf = claim_leaf(index, claimant, amount);
        if !verify_proof(proof, &distributor.root, leaf) {
            return Err(DistributorError::InvalidProof);
        }

        let claimed = distributor.total_claimed;
        if amount > distributor.remaining() {
            return Err(DistributorError::ExceededMaxClaim {
                claimed,
                amount,
                max: distributor.max_total_claim,
            });
        }

        if distributor.num_nodes_claimed >= distributor.max_num_nodes {
            return Err(DistributorError::ExceededNumNodes {
                max: distributor.max_num_nodes,
            });
        }

        tokens.transfer(&distributor.asset, &distributor.vault, claimant, amount)?;
        distributor.total_claimed += amount;
        distributor.num_nodes_claimed += 1;

        let status = ClaimStatus {
            distributor: id,
            index,
            claimant: claimant.clone(),
            amount,
            claimed_at: Utc::now(),
        };
        self.claims
            .entry(id)
            .or_default()
            .insert(index, status.clone());

        log::info!(
            "Drop {} of distributor {} claimed by {}: {}",
            index,
            id,
            claimant,
            amount
        );
        Ok(status)
    }
}
