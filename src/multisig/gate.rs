//! Execution gate
//!
//! Fires the disbursement for an authorized proposal exactly once and seals
//! it. Also hosts cancellation, the other way out of `Pending`.

use crate::crypto::Identity;
use crate::multisig::proposal::{DisbursementAction, ProposalId};
use crate::multisig::registry::{MultisigError, SignerRegistry};
use crate::multisig::store::ProposalStore;
use serde::{Deserialize, Serialize};

/// The external effect behind a proposal
///
/// An `Err` means nothing was disbursed; the proposal stays pending and the
/// execution may be retried.
pub trait Disburse {
    type Error: std::error::Error;

    fn disburse(&mut self, action: &DisbursementAction) -> Result<(), Self::Error>;
}

/// Outcome of a successful execution
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct ExecutionResult {
    pub proposal_id: ProposalId,
    pub approvals: usize,
    pub action: DisbursementAction,
}

pub struct ExecutionGate<'a> {
    registry: &'a SignerRegistry,
}

impl<'a> ExecutionGate<'a> {
    pub fn new(registry: &'a SignerRegistry) -> Self {
        Self { registry }
    }

    /// Execute proposal `id` through `disburser`
    ///
    /// Approvals are recounted against the registry on every call. The
    /// proposal is marked executed only after the disbursement succeeds.
    pub fn try_execute<D: Disburse>(
        &self,
        store: &mut ProposalStore,
        id: ProposalId,
        disburser: &mut D,
    ) -> Result<ExecutionResult, MultisigError> {
        let proposal = store.get_proposal_mut(id)?;
        if !proposal.is_pending() {
            return Err(MultisigError::InvalidState {
                id,
                status: proposal.status(),
            });
        }

        let approvals = proposal
            .approvals()
            .iter()
            .filter(|signer| self.registry.is_signer(signer))
            .count();
        let need = self.registry.threshold();
        if approvals < need as usize {
            return Err(MultisigError::ThresholdNotMet {
                have: approvals,
                need,
            });
        }

        if let Err(e) = disburser.disburse(&proposal.action) {
            log::warn!("Proposal {} disbursement failed: {}", id, e);
            return Err(MultisigError::ActionFailed(e.to_string()));
        }

        proposal.mark_executed();
        log::info!("Proposal {} executed: {}", id, proposal.action);

        Ok(ExecutionResult {
            proposal_id: id,
            approvals,
            action: proposal.action.clone(),
        })
    }

    /// Cancel a pending proposal. Any signer may cancel.
    pub fn cancel(
        &self,
        store: &mut ProposalStore,
        id: ProposalId,
        canceller: &Identity,
    ) -> Result<(), MultisigError> {
        self.registry.ensure_signer(canceller)?;

        let proposal = store.get_proposal_mut(id)?;
        if !proposal.is_pending() {
            return Err(MultisigError::InvalidState {
                id,
                status: proposal.status(),
            });
        }

        proposal.mark_cancelled();
        log::info!("Proposal {} cancelled by {}", id, canceller);
        Ok(())
    }
}
