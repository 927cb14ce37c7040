//! Program state and events

use crate::crypto::{Hash32, Identity};
use crate::distributor::{DistributorBook, DistributorId};
use crate::multisig::{DisbursementAction, ProposalId, ProposalStore, SignerRegistry};
use crate::token::TokenVault;
use serde::{Deserialize, Serialize};

/// Everything the program owns
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProgramState {
    pub program_id: Identity,
    /// Set once by `initialize`
    pub registry: Option<SignerRegistry>,
    pub proposals: ProposalStore,
    pub tokens: TokenVault,
    pub distributors: DistributorBook,
}

impl ProgramState {
    pub fn new(program_id: Identity) -> Self {
        Self {
            program_id,
            registry: None,
            proposals: ProposalStore::new(),
            tokens: TokenVault::new(),
            distributors: DistributorBook::new(),
        }
    }

    /// Program-owned account that executed proposals pay out of
    pub fn treasury(&self) -> Identity {
        Identity::derive(&[&b"treasury"[..], self.program_id.as_bytes()])
    }

    pub fn is_initialized(&self) -> bool {
        self.registry.is_some()
    }
}

/// Emitted by instructions and kept in transaction receipts
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProgramEvent {
    Initialized {
        signers: Vec<Identity>,
        threshold: u8,
        treasury: Identity,
    },
    ProposalCreated {
        proposal: ProposalId,
        proposer: Identity,
        action: DisbursementAction,
    },
    ProposalApproved {
        proposal: ProposalId,
        signer: Identity,
        approvals: usize,
        threshold_met: bool,
    },
    ProposalExecuted {
        proposal: ProposalId,
        approvals: usize,
    },
    ProposalCancelled {
        proposal: ProposalId,
        canceller: Identity,
    },
    MintCreated {
        asset: Identity,
        authority: Identity,
        supply: u64,
    },
    Transferred {
        asset: Identity,
        from: Identity,
        to: Identity,
        amount: u64,
    },
    DistributorFunded {
        distributor: DistributorId,
        asset: Identity,
        root: Hash32,
        amount: u64,
    },
    Claimed {
        distributor: DistributorId,
        index: u64,
        claimant: Identity,
        amount: u64,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_treasury_is_per_program() {
        let a = ProgramState::new(Identity::from("program-a"));
        let b = ProgramState::new(Identity::from("program-b"));

        assert_eq!(a.treasury(), a.treasury());
        assert_ne!(a.treasury(), b.treasury());
        assert!(!a.is_initialized());
    }
}
