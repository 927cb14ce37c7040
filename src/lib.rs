//! Multisig distributor: treasury disbursements gated by M-of-N approval
//!
//! This crate provides:
//! - A fixed signer registry with an approval threshold
//! - Proposals that collect approvals and execute exactly once
//! - A program-owned treasury paying out token transfers
//! - Merkle airdrop distributors funded by executed proposals
//! - A ledger running ECDSA (secp256k1) signed transactions atomically
//! - JSON persistence and a named keystore for the CLI
//!
//! # Example
//!
//! ```rust
//! use multisig_distributor::client::Client;
//! use multisig_distributor::crypto::{Identity, KeyPair};
//! use multisig_distributor::ledger::Ledger;
//! use multisig_distributor::multisig::DisbursementAction;
//! use multisig_distributor::program::InitializeArgs;
//!
//! let (a, b) = (KeyPair::generate(), KeyPair::generate());
//! let mut ledger = Ledger::new(Identity::derive(&[&b"example"[..]]));
//!
//! // 2-of-2 multisig with a funded treasury
//! let mut client = Client::new(&mut ledger, &a);
//! client
//!     .initialize(InitializeArgs::new(vec![a.identity(), b.identity()], 2))
//!     .unwrap();
//! let (_, asset) = client.create_mint("GOV", 0, 1_000).unwrap();
//! let treasury = client.ledger().state().treasury();
//! client.transfer(&asset, &treasury, 500).unwrap();
//!
//! // Propose, approve and execute a payout
//! let (_, id) = client
//!     .create_proposal(DisbursementAction::Transfer {
//!         asset: asset.clone(),
//!         recipient: b.identity(),
//!         amount: 100,
//!     })
//!     .unwrap();
//! Client::new(&mut ledger, &b).approve(id).unwrap();
//! Client::new(&mut ledger, &b).execute(id).unwrap();
//!
//! let balance = ledger.state().tokens.balance_of(&asset, &b.identity()).unwrap();
//! assert_eq!(balance, 100);
//! ```

pub mod cli;
pub mod client;
pub mod crypto;
pub mod distributor;
pub mod ledger;
pub mod multisig;
pub mod program;
pub mod storage;
pub mod token;
pub mod wallet;

// Re-export commonly used types
pub use client::Client;
pub use crypto::{Identity, KeyPair, MerkleTree};
pub use distributor::{DistributorBook, DistributorId};
pub use ledger::{Ledger, SignedTransaction, TxReceipt};
pub use multisig::{
    ApprovalEngine, DisbursementAction, Disburse, ExecutionGate, MultisigError, Proposal,
    ProposalId, ProposalStore, SignerRegistry,
};
pub use program::{process_instruction, Instruction, ProgramEvent, ProgramState};
pub use storage::{Storage, StorageConfig};
pub use token::TokenVault;
pub use wallet::Keystore;
