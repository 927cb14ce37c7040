//! Approval engine
//!
//! Records signer approvals against pending proposals. Approving only
//! reports whether the threshold is met; execution is a separate call.

use crate::crypto::Identity;
use crate::multisig::proposal::ProposalId;
use crate::multisig::registry::{MultisigError, SignerRegistry};
use crate::multisig::store::ProposalStore;
use serde::{Deserialize, Serialize};

/// Outcome of a successful approval
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApprovalResult {
    pub proposal_id: ProposalId,
    pub approvals: usize,
    pub threshold: u8,
    pub threshold_met: bool,
}

/// Validates signers against a borrowed registry and records approvals
pub struct ApprovalEngine<'a> {
    registry: &'a SignerRegistry,
}

impl<'a> ApprovalEngine<'a> {
    pub fn new(registry: &'a SignerRegistry) -> Self {
        Self { registry }
    }

    /// Approve proposal `id` as `signer`
    ///
    /// Checks, in order: signer membership, existence, pending status and
    /// duplicate approval. Nothing is written unless all pass.
    pub fn approve(
        &self,
        store: &mut ProposalStore,
        id: ProposalId,
        signer: &Identity,
    ) -> Result<ApprovalResult, MultisigError> {
        self.registry.ensure_signer(signer)?;

        let proposal = store.get_proposal_mut(id)?;
        if !proposal.is_pending() {
            return Err(MultisigError::InvalidState {
                id,
                status: proposal.status(),
            });
        }

        if proposal.has_approved(signer) {
            return Err(MultisigError::DuplicateApproval {
                id,
                signer: signer.clone(),
            });
        }

        proposal.push_approval(signer.clone());

        let approvals = proposal.approval_count();
        let threshold = self.registry.threshold();
        let threshold_met = approvals >= threshold as usize;

        log::info!(
            "Proposal {} approved by {} ({}/{})",
            id,
            signer,
            approvals,
            threshold
        );

        Ok(ApprovalResult {
            proposal_id: id,
            approvals,
            threshold,
            threshold_met,
        })
    }
}
