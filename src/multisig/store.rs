//! Proposal store
//!
//! Owns every proposal for the lifetime of the program state.

use crate::crypto::Identity;
use crate::multisig::proposal::{DisbursementAction, Proposal, ProposalId};
use crate::multisig::registry::{MultisigError, SignerRegistry};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Proposals keyed by id
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProposalStore {
    proposals: BTreeMap<ProposalId, Proposal>,
    /// Last id handed out; ids are never reused
    last_id: u64,
}

impl ProposalStore {
    /// Create a new empty store
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a pending proposal on behalf of a signer
    ///
    /// The proposer's approval is recorded immediately.
    pub fn create_proposal(
        &mut self,
        registry: &SignerRegistry,
        action: DisbursementAction,
        proposer: &Identity,
    ) -> Result<ProposalId, MultisigError> {
        registry.ensure_signer(proposer)?;

        self.last_id += 1;
        let id = ProposalId(self.last_id);
        let proposal = Proposal::new(id, action, proposer.clone());

        log::info!(
            "Proposal {} created by {}: {}",
            id,
            proposer,
            proposal.action
        );

        self.proposals.insert(id, proposal);
        Ok(id)
    }

    /// Get a proposal by id
    pub fn get_proposal(&self, id: ProposalId) -> Result<&Proposal, MultisigError> {
        self.proposals.get(&id).ok_or(MultisigError::NotFound(id))
    }

    pub(crate) fn get_proposal_mut(
        &mut self,
        id: ProposalId,
    ) -> Result<&mut Proposal, MultisigError> {
        self.proposals.get_mut(&id).ok_or(MultisigError::NotFound(id))
    }

    /// All proposals in id order
    pub fn list(&self) -> Vec<&Proposal> {
        self.proposals.values().collect()
    }

    /// Proposals still collecting approvals
    pub fn pending(&self) -> Vec<&Proposal> {
        self.proposals.values().filter(|p| p.is_pending()).collect()
    }

    pub fn len(&self) -> usize {
        self.proposals.len()
    }

    pub fn is_empty(&self) -> bool {
        self.proposals.is_empty()
    }
}
