//! Multisig authorization core
//!
//! M-of-N signers gate distribution proposals. A signer proposes a
//! disbursement (counting as the first approval), other signers approve it,
//! and once the threshold is met the execution gate performs it exactly once.
//!
//! # Example
//!
//! ```ignore
//! use multisig_distributor::multisig::{ApprovalEngine, ExecutionGate, ProposalStore, SignerRegistry};
//!
//! // 2-of-3 signer set
//! let registry = SignerRegistry::initialize(vec![a, b, c], 2)?;
//! let mut store = ProposalStore::new();
//!
//! let id = store.create_proposal(&registry, action, &a)?;
//! let approval = ApprovalEngine::new(&registry).approve(&mut store, id, &b)?;
//! assert!(approval.threshold_met);
//!
//! ExecutionGate::new(&registry).try_execute(&mut store, id, &mut treasury)?;
//! ```

pub mod approval;
pub mod gate;
pub mod proposal;
pub mod registry;
pub mod store;

pub use approval::{ApprovalEngine, ApprovalResult};
pub use gate::{Disburse, ExecutionGate, ExecutionResult};
pub use proposal::{DisbursementAction, Proposal, ProposalId, ProposalStatus};
pub use registry::{MultisigError, SignerRegistry};
pub use store::ProposalStore;
