//! Transaction ledger
//!
//! Hosts one [`ProgramState`] and runs signed transactions against it one at a
//! time. Each instruction runs on a scratch copy that replaces the live state
//! only when the instruction succeeds.

use crate::crypto::{Identity, KeyError};
use crate::ledger::transaction::SignedTransaction;
use crate::program::{process_instruction, ProgramError, ProgramEvent, ProgramState};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use thiserror::Error;

/// Ledger errors
#[derive(Error, Debug)]
pub enum LedgerError {
    #[error("Invalid transaction signature")]
    InvalidSignature,
    #[error("Transaction already processed: {0}")]
    AlreadyProcessed(String),
    #[error("Program error: {0}")]
    Program(#[from] ProgramError),
    #[error("Key error: {0}")]
    Key(#[from] KeyError),
    #[error("Transaction {0} produced no {1} event")]
    MissingEvent(String, &'static str),
}

/// Outcome of a committed transaction
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct TxReceipt {
    pub signature: String,
    pub slot: u64,
    pub payer: Identity,
    pub instruction: String,
    pub events: Vec<ProgramEvent>,
    pub processed_at: DateTime<Utc>,
}

#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Ledger {
    state: ProgramState,
    slot: u64,
    receipts: Vec<TxReceipt>,
    seen: HashSet<String>,
}

impl Ledger {
    pub fn new(program_id: Identity) -> Self {
        Self {
            state: ProgramState::new(program_id),
            slot: 0,
            receipts: Vec::new(),
            seen: HashSet::new(),
        }
    }

    pub fn state(&self) -> &ProgramState {
        &self.state
    }

    pub fn program_id(&self) -> &Identity {
        &self.state.program_id
    }

    /// Number of committed transactions
    pub fn slot(&self) -> u64 {
        self.slot
    }

    pub fn receipts(&self) -> &[TxReceipt] {
        &self.receipts
    }

    pub fn receipt(&self, signature: &str) -> Option<&TxReceipt> {
        self.receipts.iter().find(|r| r.signature == signature)
    }

    /// Verify, run and commit one transaction, returning its signature
    pub fn process(&mut self, tx: &SignedTransaction) -> Result<String, LedgerError> {
        let payer = tx.verify().map_err(|e| match e {
            KeyError::InvalidSignature => LedgerError::InvalidSignature,
            other => LedgerError::Key(other),
        })?;

        let signature = tx.id();
        if self.seen.contains(&signature) {
            return Err(LedgerError::AlreadyProcessed(signature));
        }

        let mut scratch = self.state.clone();
        let events = match process_instruction(&mut scratch, &payer, &tx.instruction) {
            Ok(events) => events,
            Err(e) => {
                log::warn!(
                    "Transaction {} ({}) rolled back: {}",
                    signature,
                    tx.instruction.name(),
                    e
                );
                return Err(e.into());
            }
        };

        self.state = scratch;
        self.slot += 1;
        self.seen.insert(signature.clone());
        self.receipts.push(TxReceipt {
            signature: signature.clone(),
            slot: self.slot,
            payer,
            instruction: tx.instruction.name().to_string(),
            events,
            processed_at: Utc::now(),
        });

        log::info!(
            "Committed {} at slot {}: {}",
            tx.instruction.name(),
            self.slot,
            signature
        );
        Ok(signature)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::crypto::KeyPair;
    use crate::multisig::{DisbursementAction, MultisigError, ProposalId};
    use crate::program::{InitializeArgs, Instruction};

    fn ledger() -> Ledger {
        Ledger::new(Identity::derive(&[&b"test-program"[..]]))
    }

    fn send(ledger: &mut Ledger, key: &KeyPair, instruction: Instruction) -> Result<String, LedgerError> {
        let tx = SignedTransaction::sign(key, instruction).unwrap();
        ledger.process(&tx)
    }

    #[test]
    fn test_initialize_returns_signature() {
        let mut ledger = ledger();
        let payer = KeyPair::generate();

        let signature = send(
            &mut ledger,
            &payer,
            Instruction::Initialize(InitializeArgs::default()),
        )
        .unwrap();

        assert!(!signature.is_empty());
        assert_eq!(ledger.slot(), 1);
        let receipt = ledger.receipt(&signature).unwrap();
        assert_eq!(receipt.payer, payer.identity());
        assert_eq!(receipt.instruction, "initialize");
        assert!(ledger.state().is_initialized());
    }

    #[test]
    fn test_replay_rejected() {
        let mut ledger = ledger();
        let payer = KeyPair::generate();
        let tx = SignedTransaction::sign(&payer, Instruction::Initialize(InitializeArgs::default()))
            .unwrap();

        ledger.process(&tx).unwrap();
        assert!(matches!(
            ledger.process(&tx),
            Err(LedgerError::AlreadyProcessed(_))
        ));
        assert_eq!(ledger.slot(), 1);
    }

    #[test]
    fn test_forged_signature_rejected() {
        let mut ledger = ledger();
        let payer = KeyPair::generate();
        let other = KeyPair::generate();
        let mut tx = SignedTransaction::sign(&payer, Instruction::Initialize(InitializeArgs::default()))
            .unwrap();
        tx.payer_key = other.public_key_hex();

        assert!(matches!(
            ledger.process(&tx),
            Err(LedgerError::InvalidSignature)
        ));
        assert!(!ledger.state().is_initialized());
    }

    #[test]
    fn test_failed_transaction_rolls_back() {
        let mut ledger = ledger();
        let signer = KeyPair::generate();
        let outsider = KeyPair::generate();

        send(
            &mut ledger,
            &signer,
            Instruction::Initialize(InitializeArgs::default()),
        )
        .unwrap();
        let asset = {
            send(
                &mut ledger,
                &signer,
                Instruction::CreateMint {
                    symbol: "GOV".to_string(),
                    decimals: 0,
                    supply: 100,
                },
            )
            .unwrap();
            ledger.state().tokens.list()[0].asset.clone()
        };
        let treasury = ledger.state().treasury();
        send(
            &mut ledger,
            &signer,
            Instruction::Transfer {
                asset: asset.clone(),
                to: treasury.clone(),
                amount: 40,
            },
        )
        .unwrap();

        // Proposal asks for more than the treasury holds
        send(
            &mut ledger,
            &signer,
            Instruction::CreateProposal {
                action: DisbursementAction::Transfer {
                    asset: asset.clone(),
                    recipient: outsider.identity(),
                    amount: 90,
                },
            },
        )
        .unwrap();
        let slot = ledger.slot();

        let result = send(
            &mut ledger,
            &signer,
            Instruction::Execute {
                proposal: ProposalId(1),
            },
        );
        assert!(matches!(
            result,
            Err(LedgerError::Program(ProgramError::Multisig(
                MultisigError::ActionFailed(_)
            )))
        ));

        assert_eq!(ledger.slot(), slot);
        let state = ledger.state();
        assert!(state.proposals.get_proposal(ProposalId(1)).unwrap().is_pending());
        assert_eq!(state.tokens.balance_of(&asset, &treasury).unwrap(), 40);
        assert_eq!(
            state.tokens.balance_of(&asset, &outsider.identity()).unwrap(),
            0
        );

        // Outsiders cannot approve
        let result = send(
            &mut ledger,
            &outsider,
            Instruction::Approve {
                proposal: ProposalId(1),
            },
        );
        assert!(matches!(
            result,
            Err(LedgerError::Program(ProgramError::Multisig(
                MultisigError::Unauthorized(_)
            )))
        ));
    }
}
