//! Merkle airdrop distributors funded by executed proposals

pub mod distributor;

pub use distributor::{ClaimStatus, Distributor, DistributorBook, DistributorError, DistributorId};
