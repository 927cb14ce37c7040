//! Program instructions
//!
//! The complete set of entry points. Transactions carry one of these and the
//! processor dispatches on the variant.

use crate::crypto::{Hash32, Identity};
use crate::distributor::DistributorId;
use crate::multisig::{DisbursementAction, ProposalId};
use serde::{Deserialize, Serialize};

/// Arguments to `initialize`; every field is optional
#[derive(Clone, Debug, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct InitializeArgs {
    /// Signer set; defaults to the caller alone
    pub signers: Option<Vec<Identity>>,
    /// Approval threshold; defaults to 1
    pub threshold: Option<u8>,
}

impl InitializeArgs {
    pub fn new(signers: Vec<Identity>, threshold: u8) -> Self {
        Self {
            signers: Some(signers),
            threshold: Some(threshold),
        }
    }
}

#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum Instruction {
    /// Set up the signer registry
    Initialize(InitializeArgs),
    /// Propose a disbursement (caller must be a signer)
    CreateProposal { action: DisbursementAction },
    /// Approve a pending proposal
    Approve { proposal: ProposalId },
    /// Execute an approved proposal
    Execute { proposal: ProposalId },
    /// Cancel a pending proposal
    Cancel { proposal: ProposalId },
    /// Create a fixed-supply mint owned by the caller
    CreateMint {
        symbol: String,
        decimals: u8,
        supply: u64,
    },
    /// Move the caller's own tokens, e.g. to fund the treasury
    Transfer {
        asset: Identity,
        to: Identity,
        amount: u64,
    },
    /// Claim a distributor leaf for the caller
    Claim {
        distributor: DistributorId,
        index: u64,
        amount: u64,
        proof: Vec<Hash32>,
    },
}

impl Instruction {
    /// Stable wire tag
    pub fn tag(&self) -> u8 {
        match self {
            Self::Initialize(_) => 0,
            Self::CreateProposal { .. } => 1,
            Self::Approve { .. } => 2,
            Self::Execute { .. } => 3,
            Self::Cancel { .. } => 4,
            Self::CreateMint { .. } => 5,
            Self::Transfer { .. } => 6,
            Self::Claim { .. } => 7,
        }
    }

    pub fn name(&self) -> &'static str {
        match self {
            Self::Initialize(_) => "initialize",
            Self::CreateProposal { .. } => "create_proposal",
            Self::Approve { .. } => "approve",
            Self::Execute { .. } => "execute",
            Self::Cancel { .. } => "cancel",
            Self::CreateMint { .. } => "create_mint",
            Self::Transfer { .. } => "transfer",
            Self::Claim { .. } => "claim",
        }
    }
}
