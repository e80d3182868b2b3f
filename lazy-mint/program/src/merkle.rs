//! Issuer allowlist commitments.
//!
//! The allowlist is committed to as the root of a binary keccak Merkle tree
//! whose leaves are `keccak256(address)`. Siblings are always hashed in sorted
//! order, so a proof is just the list of siblings from leaf to root and never
//! needs to carry left/right positions.

use {
    crate::address::EthAddress,
    solana_program::keccak::hashv,
    std::collections::BTreeSet,
};

/// Abstract type for 32 byte tree nodes
pub type Node = [u8; 32];

/// Root of the empty allowlist; no address verifies against it
pub const EMPTY_ROOT: Node = [0u8; 32];

/// Hashes an issuer address into its leaf
pub fn leaf_hash(address: &EthAddress) -> Node {
    hashv(&[address.as_ref()]).to_bytes()
}

/// Computes the parent of two nodes independent of their position
#[inline(always)]
pub fn hash_pair(a: &Node, b: &Node) -> Node {
    if a <= b {
        hashv(&[a.as_ref(), b.as_ref()]).to_bytes()
    } else {
        hashv(&[b.as_ref(), a.as_ref()]).to_bytes()
    }
}

/// Recomputes the root committed to by `leaf` and `proof`
pub fn recompute(leaf: Node, proof: &[Node]) -> Node {
    proof
        .iter()
        .fold(leaf, |node, sibling| hash_pair(&node, sibling))
}

/// Checks that `address` is a member of the allowlist committed to by `root`
pub fn verify(root: &Node, address: &EthAddress, proof: &[Node]) -> bool {
    recompute(leaf_hash(address), proof) == *root
}

/// Off-chain allowlist tree used to publish roots and hand out proofs.
///
/// Addresses are de-duplicated and leaves sorted before the tree is built, so
/// the root depends only on the set of addresses. An unpaired node at the end
/// of a level is carried up unchanged.
#[derive(Clone, Debug, PartialEq)]
pub struct MembershipTree {
    levels: Vec<Vec<Node>>,
}

impl MembershipTree {
    /// Builds the tree for a set of addresses
    pub fn new<'a, I>(addresses: I) -> Self
    where
        I: IntoIterator<Item = &'a EthAddress>,
    {
        let leaves: BTreeSet<Node> = addresses.into_iter().map(leaf_hash).collect();
        let mut level: Vec<Node> = leaves.into_iter().collect();
        let mut levels = Vec::new();
        while level.len() > 1 {
            let parents = level
                .chunks(2)
                .map(|pair| match pair {
                    [left, right] => hash_pair(left, right),
                    _ => pair[0],
                })
                .collect();
            levels.push(std::mem::replace(&mut level, parents));
        }
        levels.push(level);
        Self { levels }
    }

    /// Number of distinct members
    pub fn len(&self) -> usize {
        self.levels.first().map_or(0, Vec::len)
    }

    /// True if the allowlist has no members
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Root of the tree, [`EMPTY_ROOT`] when there are no members
    pub fn root(&self) -> Node {
        self.levels
            .last()
            .and_then(|level| level.first())
            .copied()
            .unwrap_or(EMPTY_ROOT)
    }

    /// Sibling path for `address`, or `None` if it is not a member
    pub fn proof(&self, address: &EthAddress) -> Option<Vec<Node>> {
        let leaves = self.levels.first()?;
        let mut index = leaves.binary_search(&leaf_hash(address)).ok()?;
        let mut proof = Vec::with_capacity(self.levels.len());
        for level in &self.levels[..self.levels.len() - 1] {
            let sibling = index ^ 1;
            if let Some(node) = level.get(sibling) {
                proof.push(*node);
            }
            index /= 2;
        }
        Some(proof)
    }
}

/// Computes the allowlist root for a set of addresses
pub fn compute_root(addresses: &[EthAddress]) -> Node {
    MembershipTree::new(addresses).root()
}

/// Generates the membership proof of `target` within `addresses`
pub fn generate_proof(addresses: &[EthAddress], target: &EthAddress) -> Option<Vec<Node>> {
    MembershipTree::new(addresses).proof(target)
}
