//! Signer registry
//!
//! The fixed M-of-N signer set that gates every proposal.

use crate::crypto::Identity;
use crate::multisig::proposal::{ProposalId, ProposalStatus};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors related to multisig operations
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum MultisigError {
    #[error("Invalid config: {0}")]
    InvalidConfig(String),
    #[error("Not an authorized signer: {0}")]
    Unauthorized(Identity),
    #[error("Proposal not found: {0}")]
    NotFound(ProposalId),
    #[error("Proposal {id} is {status}, expected pending")]
    InvalidState { id: ProposalId, status: ProposalStatus },
    #[error("Signer {signer} already approved proposal {id}")]
    DuplicateApproval { id: ProposalId, signer: Identity },
    #[error("Threshold not met: have {have}, need {need}")]
    ThresholdNotMet { have: usize, need: u8 },
    #[error("Disbursement failed: {0}")]
    ActionFailed(String),
}

/// The authorized signers and the approval threshold
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct SignerRegistry {
    /// Signers in registration order
    signers: Vec<Identity>,
    /// Minimum distinct approvals required (M in M-of-N)
    threshold: u8,
}

impl SignerRegistry {
    /// Create a registry from a signer list and threshold
    ///
    /// # Errors
    /// `InvalidConfig` if the list is empty or has duplicates, or the
    /// threshold is outside `1..=signers.len()`.
    pub fn initialize(signers: Vec<Identity>, threshold: u8) -> Result<Self, MultisigError> {
        if signers.is_empty() {
            return Err(MultisigError::InvalidConfig(
                "signer set must not be empty".to_string(),
            ));
        }

        for (i, signer) in signers.iter().enumerate() {
            if signers[i + 1..].contains(signer) {
                return Err(MultisigError::InvalidConfig(format!(
                    "duplicate signer {}",
                    signer
                )));
            }
        }

        if threshold == 0 || threshold as usize > signers.len() {
            return Err(MultisigError::InvalidConfig(format!(
                "threshold {} outside 1..={}",
                threshold,
                signers.len()
            )));
        }

        Ok(Self { signers, threshold })
    }

    /// Get the threshold (M)
    pub fn threshold(&self) -> u8 {
        self.threshold
    }

    /// Get the total signer count (N)
    pub fn signer_count(&self) -> usize {
        self.signers.len()
    }

    pub fn signers(&self) -> &[Identity] {
        &self.signers
    }

    /// Check if an identity is an authorized signer
    pub fn is_signer(&self, id: &Identity) -> bool {
        self.signers.contains(id)
    }

    /// Fails with `Unauthorized` unless `id` is a signer
    pub fn ensure_signer(&self, id: &Identity) -> Result<(), MultisigError> {
        if self.is_signer(id) {
            Ok(())
        } else {
            Err(MultisigError::Unauthorized(id.clone()))
        }
    }

    /// Get description like "2-of-3"
    pub fn description(&self) -> String {
        format!("{}-of-{}", self.threshold, self.signers.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn ids(names: &[&str]) -> Vec<Identity> {
        names.iter().map(|n| Identity::from(*n)).collect()
    }

    #[test]
    fn test_registry_creation() {
        let registry = SignerRegistry::initialize(ids(&["a", "b", "c"]), 2).unwrap();

        assert_eq!(registry.threshold(), 2);
        assert_eq!(registry.signer_count(), 3);
        assert_eq!(registry.description(), "2-of-3");
        assert!(registry.is_signer(&Identity::from("b")));
        assert!(!registry.is_signer(&Identity::from("d")));
    }

    #[test]
    fn test_single_signer_allowed() {
        let registry = SignerRegistry::initialize(ids(&["solo"]), 1).unwrap();
        assert_eq!(registry.description(), "1-of-1");
    }

    #[test]
    fn test_config_validation() {
        let invalid = |result: Result<SignerRegistry, MultisigError>| {
            matches!(result, Err(MultisigError::InvalidConfig(_)))
        };

        // Zero threshold
        assert!(invalid(SignerRegistry::initialize(ids(&["a", "b"]), 0)));

        // Threshold > signers
        assert!(invalid(SignerRegistry::initialize(ids(&["a", "b"]), 3)));

        // Empty signer set
        assert!(invalid(SignerRegistry::initialize(vec![], 1)));

        // Duplicate signers
        assert!(invalid(SignerRegistry::initialize(ids(&["a", "b", "a"]), 2)));
    }

    #[test]
    fn test_ensure_signer() {
        let registry = SignerRegistry::initialize(ids(&["a", "b"]), 1).unwrap();
        assert!(registry.ensure_signer(&Identity::from("a")).is_ok());
        assert_eq!(
            registry.ensure_signer(&Identity::from("z")),
            Err(MultisigError::Unauthorized(Identity::from("z")))
        );
    }

    #[test]
    fn test_large_signer_set_accepted() {
        let signers: Vec<Identity> = (0..300).map(|i| Identity::new(format!("s{}", i))).collect();
        let registry = SignerRegistry::initialize(signers, 2).unwrap();

        assert_eq!(registry.signer_count(), 300);
        assert_eq!(registry.description(), "2-of-300");
        assert!(registry.is_signer(&Identity::from("s299")));
    }
}
