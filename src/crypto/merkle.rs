//! Merkle proofs for distributor claims
//!
//! Interior nodes hash the two children in sorted order, so a proof is just
//! the list of sibling hashes from leaf to root with no left/right flags.

use super::hash::hashv;
use super::keys::Identity;

/// A 32 byte node hash
pub type Hash32 = [u8; 32];

/// Leaf for a claim: SHA256(index_le || claimant || amount_le)
pub fn claim_leaf(index: u64, claimant: &Identity, amount: u64) -> Hash32 {
    hashv(&[
        &index.to_le_bytes()[..],
        claimant.as_bytes(),
        &amount.to_le_bytes()[..],
    ])
}

/// Hash two sibling nodes, smaller first
pub fn hash_pair(a: &Hash32, b: &Hash32) -> Hash32 {
    if a <= b {
        hashv(&[&a[..], &b[..]])
    } else {
        hashv(&[&b[..], &a[..]])
    }
}

/// Check that `leaf` is included under `root`
pub fn verify_proof(proof: &[Hash32], root: &Hash32, leaf: Hash32) -> bool {
    let computed = proof
        .iter()
        .fold(leaf, |current, sibling| hash_pair(&current, sibling));
    &computed == root
}

/// A complete tree, kept layer by layer so proofs can be read off directly
#[derive(Debug, Clone)]
pub struct MerkleTree {
    /// layers[0] are the leaves, the last layer holds the root
    layers: Vec<Vec<Hash32>>,
}

impl MerkleTree {
    /// Build a tree from leaves. Returns None for an empty leaf set.
    ///
    /// An odd node at the end of a layer is promoted unchanged.
    pub fn new(leaves: Vec<Hash32>) -> Option<Self> {
        if leaves.is_empty() {
            return None;
        }

        let mut layers = vec![leaves];
        while let Some(level) = layers.last().filter(|level| level.len() > 1) {
            let next: Vec<Hash32> = level
                .chunks(2)
                .map(|chunk| match chunk.get(1) {
                    Some(right) => hash_pair(&chunk[0], right),
                    None => chunk[0],
                })
                .collect();
            layers.push(next);
        }

        Some(Self { layers })
    }

    pub fn root(&self) -> Hash32 {
        // new() guarantees a non-empty top layer
        self.layers[self.layers.len() - 1][0]
    }

    pub fn leaf_count(&self) -> usize {
        self.layers[0].len()
    }

    /// Sibling path for the leaf at `index`
    pub fn proof(&self, index: usize) -> Option<Vec<Hash32>> {
        if index >= self.leaf_count() {
            return None;
        }

        let mut proof = Vec::new();
        let mut position = index;
        for level in &self.layers[..self.layers.len() - 1] {
            let sibling = position ^ 1;
            if let Some(hash) = level.get(sibling) {
                proof.push(*hash);
            }
            position /= 2;
        }
        Some(proof)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn leaves(count: u64) -> Vec<Hash32> {
        (0..count)
            .map(|i| claim_leaf(i, &Identity::new(format!("claimant-{}", i)), 100 + i))
            .collect()
    }

    #[test]
    fn test_single_leaf_is_root() {
        let leaf = leaves(1);
        let tree = MerkleTree::new(leaf.clone()).unwrap();
        assert_eq!(tree.root(), leaf[0]);
        assert!(tree.proof(0).unwrap().is_empty());
        assert!(verify_proof(&[], &tree.root(), leaf[0]));
    }

    #[test]
    fn test_every_leaf_verifies() {
        for count in [2, 3, 4, 5, 7, 8] {
            let leaves = leaves(count);
            let tree = MerkleTree::new(leaves.clone()).unwrap();
            for (i, leaf) in leaves.iter().enumerate() {
                let proof = tree.proof(i).unwrap();
                assert!(verify_proof(&proof, &tree.root(), *leaf), "leaf {} of {}", i, count);
            }
        }
    }

    #[test]
    fn test_wrong_amount_fails() {
        let leaves = leaves(4);
        let tree = MerkleTree::new(leaves).unwrap();
        let proof = tree.proof(2).unwrap();

        let forged = claim_leaf(2, &Identity::from("claimant-2"), 10_000);
        assert!(!verify_proof(&proof, &tree.root(), forged));
    }

    #[test]
    fn test_hash_pair_is_order_independent() {
        let a = claim_leaf(0, &Identity::from("a"), 1);
        let b = claim_leaf(1, &Identity::from("b"), 1);
        assert_eq!(hash_pair(&a, &b), hash_pair(&b, &a));
    }

    #[test]
    fn test_empty_and_out_of_range() {
        assert!(MerkleTree::new(vec![]).is_none());
        let tree = MerkleTree::new(leaves(3)).unwrap();
        assert!(tree.proof(3).is_none());
    }
}
