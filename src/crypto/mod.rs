//! Cryptographic utilities
//!
//! This module provides:
//! - SHA-256 hashing
//! - ECDSA signer keys (secp256k1) and identities
//! - Merkle proofs for distributor claims

pub mod hash;
pub mod keys;
pub mod merkle;

pub use hash::{double_sha256, hashv, sha256, sha256_hex};
pub use keys::{
    public_key_from_hex, public_key_to_identity, sign_message, verify_signature, Identity,
    KeyError, KeyPair,
};
pub use merkle::{claim_leaf, hash_pair, verify_proof, Hash32, MerkleTree};
