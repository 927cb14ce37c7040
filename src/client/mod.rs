//! Transaction-building client
//!
//! Wraps a ledger and a payer key. Every call signs one instruction, submits
//! it and returns the transaction signature.
//!
//! ```rust
//! use multisig_distributor::client::Client;
//! use multisig_distributor::crypto::{Identity, KeyPair};
//! use multisig_distributor::ledger::Ledger;
//! use multisig_distributor::program::InitializeArgs;
//!
//! let mut ledger = Ledger::new(Identity::derive(&[&b"doc-program"[..]]));
//! let payer = KeyPair::generate();
//!
//! let signature = Client::new(&mut ledger, &payer)
//!     .initialize(InitializeArgs::default())
//!     .unwrap();
//! println!("Your transaction signature {}", signature);
//! ```

use crate::crypto::{Hash32, Identity, KeyPair};
use crate::distributor::DistributorId;
use crate::ledger::{Ledger, LedgerError, SignedTransaction};
use crate::multisig::{DisbursementAction, ProposalId};
use crate::program::{InitializeArgs, Instruction, ProgramEvent};

pub struct Client<'a> {
    ledger: &'a mut Ledger,
    payer: &'a KeyPair,
}

impl<'a> Client<'a> {
    pub fn new(ledger: &'a mut Ledger, payer: &'a KeyPair) -> Self {
        Self { ledger, payer }
    }

    pub fn payer(&self) -> Identity {
        self.payer.identity()
    }

    pub fn ledger(&self) -> &Ledger {
        self.ledger
    }

    /// Sign and submit one instruction
    pub fn send(&mut self, instruction: Instruction) -> Result<String, LedgerError> {
        let tx = SignedTransaction::sign(self.payer, instruction)?;
        self.ledger.process(&tx)
    }

    pub fn initialize(&mut self, args: InitializeArgs) -> Result<String, LedgerError> {
        self.send(Instruction::Initialize(args))
    }

    /// Submit a proposal and return it with the id it was assigned
    pub fn create_proposal(
        &mut self,
        action: DisbursementAction,
    ) -> Result<(String, ProposalId), LedgerError> {
        let signature = self.send(Instruction::CreateProposal { action })?;
        let proposal = self
            .events(&signature)
            .iter()
            .find_map(|event| match event {
                ProgramEvent::ProposalCreated { proposal, .. } => Some(*proposal),
                _ => None,
            })
            .ok_or_else(|| LedgerError::MissingEvent(signature.clone(), "ProposalCreated"))?;
        Ok((signature, proposal))
    }

    pub fn approve(&mut self, proposal: ProposalId) -> Result<String, LedgerError> {
        self.send(Instruction::Approve { proposal })
    }

    pub fn execute(&mut self, proposal: ProposalId) -> Result<String, LedgerError> {
        self.send(Instruction::Execute { proposal })
    }

    pub fn cancel(&mut self, proposal: ProposalId) -> Result<String, LedgerError> {
        self.send(Instruction::Cancel { proposal })
    }

    /// Create a mint owned by the payer and return its asset identity
    pub fn create_mint(
        &mut self,
        symbol: &str,
        decimals: u8,
        supply: u64,
    ) -> Result<(String, Identity), LedgerError> {
        let signature = self.send(Instruction::CreateMint {
            symbol: symbol.to_string(),
            decimals,
            supply,
        })?;
        let asset = self
            .events(&signature)
            .iter()
            .find_map(|event| match event {
                ProgramEvent::MintCreated { asset, .. } => Some(asset.clone()),
                _ => None,
            })
            .ok_or_else(|| LedgerError::MissingEvent(signature.clone(), "MintCreated"))?;
        Ok((signature, asset))
    }

    pub fn transfer(
        &mut self,
        asset: &Identity,
        to: &Identity,
        amount: u64,
    ) -> Result<String, LedgerError> {
        self.send(Instruction::Transfer {
            asset: asset.clone(),
            to: to.clone(),
            amount,
        })
    }

    pub fn claim(
        &mut self,
        distributor: DistributorId,
        index: u64,
        amount: u64,
        proof: Vec<Hash32>,
    ) -> Result<String, LedgerError> {
        self.send(Instruction::Claim {
            distributor,
            index,
            amount,
            proof,
        })
    }

    fn events(&self, signature: &str) -> &[ProgramEvent] {
        self.ledger
            .receipt(signature)
            .map(|receipt| receipt.events.as_slice())
            .unwrap_or(&[])
    }
}
