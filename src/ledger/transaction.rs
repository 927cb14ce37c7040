//! Signed transactions
//!
//! A transaction carries exactly one instruction. The payer signs the SHA-256
//! of the JSON payload and the ledger binds the payer identity from the key.

use crate::crypto::{public_key_from_hex, public_key_to_identity, sha256, verify_signature};
use crate::crypto::{Identity, KeyError, KeyPair};
use crate::program::Instruction;
use serde::{Deserialize, Serialize};

/// One signed instruction
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
pub struct SignedTransaction {
    /// Hex encoded public key of the payer
    pub payer_key: String,
    pub instruction: Instruction,
    /// Random nonce so identical instructions get distinct signatures
    pub nonce: u64,
    /// Hex encoded compact ECDSA signature
    pub signature: String,
}

#[derive(Serialize)]
struct Payload<'a> {
    payer_key: &'a str,
    instruction: &'a Instruction,
    nonce: u64,
}

impl SignedTransaction {
    /// Build and sign a transaction with a random nonce
    pub fn sign(key_pair: &KeyPair, instruction: Instruction) -> Result<Self, KeyError> {
        Self::sign_with_nonce(key_pair, instruction, rand::random())
    }

    pub fn sign_with_nonce(
        key_pair: &KeyPair,
        instruction: Instruction,
        nonce: u64,
    ) -> Result<Self, KeyError> {
        let mut tx = Self {
            payer_key: key_pair.public_key_hex(),
            instruction,
            nonce,
            signature: String::new(),
        };
        let signature = key_pair.sign(&tx.signing_data())?;
        tx.signature = hex::encode(signature);
        Ok(tx)
    }

    /// SHA-256 of the canonical payload
    pub fn signing_data(&self) -> Vec<u8> {
        let payload = Payload {
            payer_key: &self.payer_key,
            instruction: &self.instruction,
            nonce: self.nonce,
        };
        // Serializing plain data with string keys cannot fail
        let bytes = serde_json::to_vec(&payload).unwrap_or_default();
        sha256(&bytes)
    }

    /// Check the signature and return the payer identity
    pub fn verify(&self) -> Result<Identity, KeyError> {
        let public_key = public_key_from_hex(&self.payer_key)?;
        let signature = hex::decode(&self.signature).map_err(|_| KeyError::InvalidSignature)?;

        if !verify_signature(&public_key, &self.signing_data(), &signature)? {
            return Err(KeyError::InvalidSignature);
        }
        Ok(public_key_to_identity(&public_key))
    }

    /// Base58 transaction signature, as returned to callers
    pub fn id(&self) -> String {
        match hex::decode(&self.signature) {
            Ok(bytes) => bs58::encode(bytes).into_string(),
            Err(_) => String::new(),
        }
    }
}
