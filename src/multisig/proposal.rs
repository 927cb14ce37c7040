//! Distribution proposals
//!
//! A proposal carries one disbursement action and the approvals collected
//! for it. Status only ever moves from `Pending` to a terminal state.

use crate::crypto::{Hash32, Identity};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Unique proposal identifier, assigned by the store
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ProposalId(pub u64);

impl fmt::Display for ProposalId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// The effect performed once a proposal is authorized
///
/// The multisig core never looks inside; it only hands the action to a
/// [`Disburse`](crate::multisig::Disburse) implementation.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum DisbursementAction {
    /// Pay `amount` of `asset` from the treasury to `recipient`
    Transfer {
        asset: Identity,
        recipient: Identity,
        amount: u64,
    },
    /// Create a merkle distributor funded with `max_total_claim` of `asset`
    FundDistributor {
        asset: Identity,
        root: Hash32,
        max_total_claim: u64,
        max_num_nodes: u64,
    },
}

impl DisbursementAction {
    pub fn asset(&self) -> &Identity {
        match self {
            Self::Transfer { asset, .. } | Self::FundDistributor { asset, .. } => asset,
        }
    }

    pub fn amount(&self) -> u64 {
        match self {
            Self::Transfer { amount, .. } => *amount,
            Self::FundDistributor {
                max_total_claim, ..
            } => *max_total_claim,
        }
    }
}

impl fmt::Display for DisbursementAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Transfer {
                asset,
                recipient,
                amount,
            } => write!(f, "transfer {} of {} to {}", amount, asset, recipient),
            Self::FundDistributor {
                asset,
                root,
                max_total_claim,
                max_num_nodes,
            } => write!(
                f,
                "fund distributor {}.. with {} of {} for up to {} claims",
                &hex::encode(root)[..16],
                max_total_claim,
                asset,
                max_num_nodes
            ),
        }
    }
}

/// Status of a proposal
#[derive(Clone, Copy, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub enum ProposalStatus {
    /// Collecting approvals
    Pending,
    /// Disbursement performed (terminal)
    Executed,
    /// Withdrawn by a signer (terminal)
    Cancelled,
}

impl ProposalStatus {
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Pending)
    }
}

impl fmt::Display for ProposalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Pending => "pending",
            Self::Executed => "executed",
            Self::Cancelled => "cancelled",
        };
        f.write_str(name)
    }
}

/// A disbursement awaiting or past authorization
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Proposal {
    pub id: ProposalId,
    pub action: DisbursementAction,
    pub proposer: Identity,
    /// Approving signers in approval order, never duplicated
    approvals: Vec<Identity>,
    status: ProposalStatus,
    pub created_at: DateTime<Utc>,
    /// When approvals or status last changed
    pub updated_at: DateTime<Utc>,
}

impl Proposal {
    /// Create a pending proposal; proposing counts as the first approval
    pub fn new(id: ProposalId, action: DisbursementAction, proposer: Identity) -> Self {
        let now = Utc::now();
        Self {
            id,
            action,
            approvals: vec![proposer.clone()],
            proposer,
            status: ProposalStatus::Pending,
            created_at: now,
            updated_at: now,
        }
    }

    pub fn status(&self) -> ProposalStatus {
        self.status
    }

    pub fn is_pending(&self) -> bool {
        self.status == ProposalStatus::Pending
    }

    pub fn approvals(&self) -> &[Identity] {
        &self.approvals
    }

    pub fn approval_count(&self) -> usize {
        self.approvals.len()
    }

    pub fn has_approved(&self, signer: &Identity) -> bool {
        self.approvals.contains(signer)
    }

    /// Record an approval. Callers check status and duplicates first.
    pub(crate) fn push_approval(&mut self, signer: Identity) {
        self.approvals.push(signer);
        self.updated_at = Utc::now();
    }

    pub(crate) fn mark_executed(&mut self) {
        self.status = ProposalStatus::Executed;
        self.updated_at = Utc::now();
    }

    pub(crate) fn mark_cancelled(&mut self) {
        self.status = ProposalStatus::Cancelled;
        self.updated_at = Utc::now();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn transfer() -> DisbursementAction {
        DisbursementAction::Transfer {
            asset: Identity::from("mint"),
            recipient: Identity::from("bob"),
            amount: 50,
        }
    }

    #[test]
    fn test_proposer_counts_as_first_approval() {
        let proposal = Proposal::new(ProposalId(1), transfer(), Identity::from("alice"));

        assert!(proposal.is_pending());
        assert_eq!(proposal.approval_count(), 1);
        assert!(proposal.has_approved(&Identity::from("alice")));
        assert!(!proposal.has_approved(&Identity::from("bob")));
    }

    #[test]
    fn test_terminal_statuses() {
        assert!(!ProposalStatus::Pending.is_terminal());
        assert!(ProposalStatus::Executed.is_terminal());
        assert!(ProposalStatus::Cancelled.is_terminal());
    }

    #[test]
    fn test_action_accessors() {
        let action = transfer();
        assert_eq!(action.amount(), 50);
        assert_eq!(action.asset(), &Identity::from("mint"));
        assert_eq!(action.to_string(), "transfer 50 of mint to bob");
    }
}
