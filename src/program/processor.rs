//! Instruction processor
//!
//! Dispatches each instruction to the multisig core, the token vault or the
//! distributor book. The caller identity arrives already verified.

use crate::crypto::Identity;
use crate::distributor::{DistributorBook, DistributorError, DistributorId};
use crate::multisig::{
    ApprovalEngine, DisbursementAction, Disburse, ExecutionGate, MultisigError, ProposalId,
    SignerRegistry,
};
use crate::program::instruction::{InitializeArgs, Instruction};
use crate::program::state::{ProgramEvent, ProgramState};
use crate::token::{TokenError, TokenVault};
use thiserror::Error;

/// Errors surfaced by the program
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ProgramError {
    #[error("Program not initialized")]
    NotInitialized,
    #[error("Program already initialized")]
    AlreadyInitialized,
    #[error("Multisig error: {0}")]
    Multisig(#[from] MultisigError),
    #[error("Token error: {0}")]
    Token(#[from] TokenError),
    #[error("Distributor error: {0}")]
    Distributor(#[from] DistributorError),
}

/// Pays executed proposals out of the program treasury
struct TreasuryDisburser<'a> {
    tokens: &'a mut TokenVault,
    distributors: &'a mut DistributorBook,
    treasury: Identity,
    events: Vec<ProgramEvent>,
}

impl Disburse for TreasuryDisburser<'_> {
    type Error = DistributorError;

    fn disburse(&mut self, action: &DisbursementAction) -> Result<(), DistributorError> {
        match action {
            DisbursementAction::Transfer {
                asset,
                recipient,
                amount,
            } => {
                let event = self
                    .tokens
                    .transfer(asset, &self.treasury, recipient, *amount)?;
                self.events.push(ProgramEvent::Transferred {
                    asset: event.asset,
                    from: event.from,
                    to: event.to,
                    amount: event.amount,
                });
            }
            DisbursementAction::FundDistributor {
                asset,
                root,
                max_total_claim,
                max_num_nodes,
            } => {
                let distributor: DistributorId = self.distributors.fund(
                    self.tokens,
                    &self.treasury,
                    asset,
                    *root,
                    *max_total_claim,
                    *max_num_nodes,
                )?;
                self.events.push(ProgramEvent::DistributorFunded {
                    distributor,
                    asset: asset.clone(),
                    root: *root,
                    amount: *max_total_claim,
                });
            }
        }
        Ok(())
    }
}

/// Apply one instruction on behalf of `caller`
///
/// On error the state may be partially written; the ledger discards it.
pub fn process_instruction(
    state: &mut ProgramState,
    caller: &Identity,
    instruction: &Instruction,
) -> Result<Vec<ProgramEvent>, ProgramError> {
    log::debug!("Processing {} from {}", instruction.name(), caller);

    match instruction {
        Instruction::Initialize(args) => initialize(state, caller, args),
        Instruction::CreateProposal { action } => {
            let registry = require_registry(&state.registry)?;
            let proposal = state
                .proposals
                .create_proposal(registry, action.clone(), caller)?;
            Ok(vec![ProgramEvent::ProposalCreated {
                proposal,
                proposer: caller.clone(),
                action: action.clone(),
            }])
        }
        Instruction::Approve { proposal } => {
            let registry = require_registry(&state.registry)?;
            let result = ApprovalEngine::new(registry).approve(
                &mut state.proposals,
                *proposal,
                caller,
            )?;
            Ok(vec![ProgramEvent::ProposalApproved {
                proposal: *proposal,
                signer: caller.clone(),
                approvals: result.approvals,
                threshold_met: result.threshold_met,
            }])
        }
        Instruction::Execute { proposal } => execute(state, *proposal),
        Instruction::Cancel { proposal } => {
            let registry = require_registry(&state.registry)?;
            ExecutionGate::new(registry).cancel(&mut state.proposals, *proposal, caller)?;
            Ok(vec![ProgramEvent::ProposalCancelled {
                proposal: *proposal,
                canceller: caller.clone(),
            }])
        }
        Instruction::CreateMint {
            symbol,
            decimals,
            supply,
        } => {
            let asset = state
                .tokens
                .create_mint(caller, symbol.clone(), *decimals, *supply)?;
            Ok(vec![ProgramEvent::MintCreated {
                asset,
                authority: caller.clone(),
                supply: *supply,
            }])
        }
        Instruction::Transfer { asset, to, amount } => {
            let event = state.tokens.transfer(asset, caller, to, *amount)?;
            Ok(vec![ProgramEvent::Transferred {
                asset: event.asset,
                from: event.from,
                to: event.to,
                amount: event.amount,
            }])
        }
        Instruction::Claim {
            distributor,
            index,
            amount,
            proof,
        } => {
            let status = state.distributors.claim(
                &mut state.tokens,
                *distributor,
                *index,
                caller,
                *amount,
                proof,
            )?;
            Ok(vec![ProgramEvent::Claimed {
                distributor: status.distributor,
                index: status.index,
                claimant: status.claimant,
                amount: status.amount,
            }])
        }
    }
}

fn require_registry(
    registry: &Option<SignerRegistry>,
) -> Result<&SignerRegistry, ProgramError> {
    registry.as_ref().ok_or(ProgramError::NotInitialized)
}

fn initialize(
    state: &mut ProgramState,
    caller: &Identity,
    args: &InitializeArgs,
) -> Result<Vec<ProgramEvent>, ProgramError> {
    if state.is_initialized() {
        return Err(ProgramError::AlreadyInitialized);
    }

    let signers = args
        .signers
        .clone()
        .unwrap_or_else(|| vec![caller.clone()]);
    let threshold = args.threshold.unwrap_or(1);
    let registry = SignerRegistry::initialize(signers, threshold)?;

    log::info!(
        "Initialized {} multisig for program {}",
        registry.description(),
        state.program_id
    );

    let event = ProgramEvent::Initialized {
        signers: registry.signers().to_vec(),
        threshold: registry.threshold(),
        treasury: state.treasury(),
    };
    state.registry = Some(registry);
    Ok(vec![event])
}

fn execute(state: &mut ProgramState, id: ProposalId) -> Result<Vec<ProgramEvent>, ProgramError> {
    let treasury = state.treasury();
    let registry = require_registry(&state.registry)?;

    let mut disburser = TreasuryDisburser {
        tokens: &mut state.tokens,
        distributors: &mut state.distributors,
        treasury,
        events: Vec::new(),
    };
    let result =
        ExecutionGate::new(registry).try_execute(&mut state.proposals, id, &mut disburser)?;

    let mut events = disburser.events;
    events.push(ProgramEvent::ProposalExecuted {
        proposal: id,
        approvals: result.approvals,
    });
    Ok(events)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::{claim_leaf, MerkleTree};
    use crate::multisig::ProposalStatus;

    fn id(name: &str) -> Identity {
        Identity::from(name)
    }

    /// 2-of-3 program with 1_000 DROP in the treasury
    fn funded_program() -> (ProgramState, Identity) {
        let mut state = ProgramState::new(id("program"));
        process_instruction(
            &mut state,
            &id("A"),
            &Instruction::Initialize(InitializeArgs::new(vec![id("A"), id("B"), id("C")], 2)),
        )
        .unwrap();

        let events = process_instruction(
            &mut state,
            &id("funder"),
            &Instruction::CreateMint {
                symbol: "DROP".to_string(),
                decimals: 0,
                supply: 5_000,
            },
        )
        .unwrap();
        let asset = match &events[0] {
            ProgramEvent::MintCreated { asset, .. } => asset.clone(),
            other => panic!("unexpected event {:?}", other),
        };

        let treasury = state.treasury();
        process_instruction(
            &mut state,
            &id("funder"),
            &Instruction::Transfer {
                asset: asset.clone(),
                to: treasury,
                amount: 1_000,
            },
        )
        .unwrap();

        (state, asset)
    }

    fn propose(state: &mut ProgramState, action: DisbursementAction) -> ProposalId {
        match &process_instruction(state, &id("A"), &Instruction::CreateProposal { action })
            .unwrap()[0]
        {
            ProgramEvent::ProposalCreated { proposal, .. } => *proposal,
            other => panic!("unexpected event {:?}", other),
        }
    }

    #[test]
    fn test_initialize_defaults_to_caller() {
        let mut state = ProgramState::new(id("program"));
        let events = process_instruction(
            &mut state,
            &id("payer"),
            &Instruction::Initialize(InitializeArgs::default()),
        )
        .unwrap();

        let registry = state.registry.as_ref().unwrap();
        assert_eq!(registry.signers(), &[id("payer")]);
        assert_eq!(registry.threshold(), 1);
        assert!(matches!(events[0], ProgramEvent::Initialized { threshold: 1, .. }));

        let again = process_instruction(
            &mut state,
            &id("payer"),
            &Instruction::Initialize(InitializeArgs::default()),
        );
        assert_eq!(again, Err(ProgramError::AlreadyInitialized));
    }

    #[test]
    fn test_invalid_initialize() {
        let mut state = ProgramState::new(id("program"));
        let result = process_instruction(
            &mut state,
            &id("payer"),
            &Instruction::Initialize(InitializeArgs::new(vec![id("A")], 2)),
        );
        assert!(matches!(
            result,
            Err(ProgramError::Multisig(MultisigError::InvalidConfig(_)))
        ));
        assert!(!state.is_initialized());
    }

    #[test]
    fn test_requires_initialization() {
        let mut state = ProgramState::new(id("program"));
        let result = process_instruction(
            &mut state,
            &id("A"),
            &Instruction::Approve {
                proposal: ProposalId(1),
            },
        );
        assert_eq!(result, Err(ProgramError::NotInitialized));
    }

    #[test]
    fn test_transfer_proposal_pays_recipient() {
        let (mut state, asset) = funded_program();
        let p = propose(
            &mut state,
            DisbursementAction::Transfer {
                asset: asset.clone(),
                recipient: id("R"),
                amount: 300,
            },
        );

        process_instruction(&mut state, &id("B"), &Instruction::Approve { proposal: p }).unwrap();
        let events =
            process_instruction(&mut state, &id("C"), &Instruction::Execute { proposal: p })
                .unwrap();

        assert!(matches!(events[0], ProgramEvent::Transferred { amount: 300, .. }));
        assert!(matches!(events[1], ProgramEvent::ProposalExecuted { .. }));
        assert_eq!(state.tokens.balance_of(&asset, &id("R")).unwrap(), 300);
        assert_eq!(
            state.tokens.balance_of(&asset, &state.treasury()).unwrap(),
            700
        );
    }

    #[test]
    fn test_underfunded_transfer_stays_pending() {
        let (mut state, asset) = funded_program();
        let p = propose(
            &mut state,
            DisbursementAction::Transfer {
                asset,
                recipient: id("R"),
                amount: 10_000,
            },
        );
        process_instruction(&mut state, &id("B"), &Instruction::Approve { proposal: p }).unwrap();

        let result = process_instruction(&mut state, &id("A"), &Instruction::Execute { proposal: p });
        assert!(matches!(
            result,
            Err(ProgramError::Multisig(MultisigError::ActionFailed(_)))
        ));
        assert_eq!(
            state.proposals.get_proposal(p).unwrap().status(),
            ProposalStatus::Pending
        );
    }

    #[test]
    fn test_distributor_proposal_and_claim() {
        let (mut state, asset) = funded_program();
        let tree = MerkleTree::new(vec![
            claim_leaf(0, &id("alice"), 40),
            claim_leaf(1, &id("bob"), 60),
        ])
        .unwrap();

        let p = propose(
            &mut state,
            DisbursementAction::FundDistributor {
                asset: asset.clone(),
                root: tree.root(),
                max_total_claim: 100,
                max_num_nodes: 2,
            },
        );
        process_instruction(&mut state, &id("B"), &Instruction::Approve { proposal: p }).unwrap();
        let events =
            process_instruction(&mut state, &id("A"), &Instruction::Execute { proposal: p })
                .unwrap();
        let distributor = match &events[0] {
            ProgramEvent::DistributorFunded { distributor, .. } => *distributor,
            other => panic!("unexpected event {:?}", other),
        };

        let claim = Instruction::Claim {
            distributor,
            index: 1,
            amount: 60,
            proof: tree.proof(1).unwrap(),
        };
        let events = process_instruction(&mut state, &id("bob"), &claim).unwrap();
        assert_eq!(
            events,
            vec![ProgramEvent::Claimed {
                distributor,
                index: 1,
                claimant: id("bob"),
                amount: 60,
            }]
        );
        assert_eq!(state.tokens.balance_of(&asset, &id("bob")).unwrap(), 60);

        // Someone else submitting bob's leaf does not match the proof
        let stolen = process_instruction(
            &mut state,
            &id("mallory"),
            &Instruction::Claim {
                distributor,
                index: 0,
                amount: 40,
                proof: tree.proof(0).unwrap(),
            },
        );
        assert_eq!(
            stolen,
            Err(ProgramError::Distributor(DistributorError::InvalidProof))
        );
    }
}
