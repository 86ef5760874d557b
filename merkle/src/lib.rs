#![deny(missing_docs)]

//! Binary Merkle trees over ordered lists and compact inclusion paths.
//!
//! A list is split at `round(n/2)` (the left half gets the extra item),
//! leaves are hashed with [MerkleItem::merkle_hash] and inner nodes are
//! `blake2b(left ‖ right)`. The split rule is part of the wire format:
//! roots must match those computed by other implementations.
use primitives::{Hash, PrimitiveError, PublicKey};
use readerwriter::*;
use serde::{Deserialize, Serialize};
use subtle::ConstantTimeEq;
use thiserror::Error;

/// Maximum number of nodes in a path (the count is a single byte on the wire).
pub const MAX_PATH_LENGTH: usize = 255;

/// Errors in constructing or decoding a Merkle path.
#[derive(Error, Clone, Debug, Eq, PartialEq)]
pub enum MerkleError {
    /// The path would not fit the one-byte length prefix.
    #[error("Merkle path has {0} nodes, at most 255 are allowed")]
    TooManyNodes(usize),

    /// Bits past the last node are set in the side bitmap.
    #[error("Merkle path side bitmap has non-zero padding")]
    NonZeroPadding,

    /// A node hash could not be decoded.
    #[error(transparent)]
    Primitive(#[from] PrimitiveError),
}

impl From<ReadError> for MerkleError {
    fn from(e: ReadError) -> Self {
        MerkleError::Primitive(e.into())
    }
}

/// MerkleItem defines an item in the Merkle tree.
pub trait MerkleItem {
    /// Hash of the item as a leaf.
    fn merkle_hash(&self) -> Hash;
}

impl MerkleItem for Hash {
    fn merkle_hash(&self) -> Hash {
        *self
    }
}

impl MerkleItem for PublicKey {
    fn merkle_hash(&self) -> Hash {
        self.hash()
    }
}

impl MerkleItem for [u8] {
    fn merkle_hash(&self) -> Hash {
        Hash::blake2b(self)
    }
}

impl MerkleItem for Vec<u8> {
    fn merkle_hash(&self) -> Hash {
        Hash::blake2b(self)
    }
}

impl<T> MerkleItem for &T
where
    T: MerkleItem + ?Sized,
{
    fn merkle_hash(&self) -> Hash {
        T::merkle_hash(*self)
    }
}

/// Merkle tree over an ordered list.
pub struct MerkleTree;

impl MerkleTree {
    /// Builds and returns the root hash of a Merkle tree constructed from
    /// the supplied list.
    pub fn compute_root<M: MerkleItem>(list: &[M]) -> Hash {
        Self::compute_root_with(list, M::merkle_hash)
    }

    /// Same as `compute_root` with a custom leaf hash function.
    pub fn compute_root_with<T, F>(list: &[T], leaf_hash: F) -> Hash
    where
        F: Fn(&T) -> Hash + Copy,
    {
        match list.len() {
            0 => Hash::blake2b(&[]),
            1 => leaf_hash(&list[0]),
            n => {
                let (left, right) = list.split_at(split_point(n));
                node_hash(
                    &Self::compute_root_with(left, leaf_hash),
                    &Self::compute_root_with(right, leaf_hash),
                )
            }
        }
    }
}

/// `round(n / 2)` for n ≥ 2.
fn split_point(n: usize) -> usize {
    (n + 1) / 2
}

fn node_hash(left: &Hash, right: &Hash) -> Hash {
    let mut buf = Vec::with_capacity(left.as_bytes().len() + right.as_bytes().len());
    buf.extend_from_slice(left.as_bytes());
    buf.extend_from_slice(right.as_bytes());
    Hash::blake2b(&buf)
}

/// Position of the path's running hash relative to a neighbor.
#[derive(Copy, Clone, PartialEq, Eq, Debug, Serialize, Deserialize)]
pub enum Side {
    /// Indicates that the item is to the left of its neighbor.
    Left,
    /// Indicates that the item is to the right of its neighbor.
    Right,
}

impl Side {
    /// Orders (current, neighbor) pair of nodes as (left, right)
    pub fn order<T>(self, a: T, b: T) -> (T, T) {
        match self {
            Side::Left => (a, b),
            Side::Right => (b, a),
        }
    }
}

/// One step of a path: the neighbor's hash and which side of it the item is on.
#[derive(Copy, Clone, PartialEq, Eq, Debug)]
pub struct MerklePathNode {
    /// Root hash of the neighboring subtree.
    pub hash: Hash,
    /// Side of the running hash relative to `hash`.
    pub side: Side,
}

impl MerklePathNode {
    /// True if the neighbor sits on the left.
    pub fn is_neighbor_left(&self) -> bool {
        self.side == Side::Right
    }
}

/// Merkle proof of inclusion of an item in a list, innermost node first.
#[derive(Clone, PartialEq, Eq, Debug, Default)]
pub struct MerklePath {
    nodes: Vec<MerklePathNode>,
}

impl MerklePath {
    /// Creates a path from nodes, innermost first.
    pub fn new(nodes: Vec<MerklePathNode>) -> Result<Self, MerkleError> {
        if nodes.len() > MAX_PATH_LENGTH {
            return Err(MerkleError::TooManyNodes(nodes.len()));
        }
        Ok(MerklePath { nodes })
    }

    /// The empty path, used for single-key proofs.
    pub fn empty() -> Self {
        MerklePath { nodes: Vec::new() }
    }

    /// Nodes of the path, innermost first.
    pub fn nodes(&self) -> &[MerklePathNode] {
        &self.nodes
    }

    /// Number of nodes.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    /// True for the single-key path.
    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Computes the path of `item` within `list`.
    /// Returns `None` if the item is not in the list.
    pub fn compute<M: MerkleItem>(list: &[M], item: &M) -> Option<Self> {
        Self::compute_with(list, item, M::merkle_hash)
    }

    /// Same as `compute` with a custom leaf hash function.
    pub fn compute_with<T, F>(list: &[T], item: &T, leaf_hash: F) -> Option<Self>
    where
        F: Fn(&T) -> Hash + Copy,
    {
        // Returns (subtree contains the leaf, subtree root).
        fn fill_nodes<T, F>(
            list: &[T],
            leaf: &Hash,
            nodes: &mut Vec<MerklePathNode>,
            leaf_hash: F,
        ) -> (bool, Hash)
        where
            F: Fn(&T) -> Hash + Copy,
        {
            match list.len() {
                0 => (false, Hash::blake2b(&[])),
                1 => {
                    let hash = leaf_hash(&list[0]);
                    (hash == *leaf, hash)
                }
                n => {
                    let (left, right) = list.split_at(split_point(n));
                    let (in_left, left_hash) = fill_nodes(left, leaf, nodes, leaf_hash);
                    let (in_right, right_hash) = fill_nodes(right, leaf, nodes, leaf_hash);
                    let hash = node_hash(&left_hash, &right_hash);
                    if in_left {
                        nodes.push(MerklePathNode {
                            hash: right_hash,
                            side: Side::Left,
                        });
                        (true, hash)
                    } else if in_right {
                        nodes.push(MerklePathNode {
                            hash: left_hash,
                            side: Side::Right,
                        });
                        (true, hash)
                    } else {
                        (false, hash)
                    }
                }
            }
        }

        let leaf = leaf_hash(item);
        let mut nodes = Vec::new();
        let (found, _) = fill_nodes(list, &leaf, &mut nodes, leaf_hash);
        if !found {
            return None;
        }
        Self::new(nodes).ok()
    }

    /// Computes the root hash for the item with this path.
    pub fn compute_root<M: MerkleItem + ?Sized>(&self, item: &M) -> Hash {
        self.compute_root_from_leaf(item.merkle_hash())
    }

    /// Replays the path from an already hashed leaf.
    pub fn compute_root_from_leaf(&self, leaf: Hash) -> Hash {
        self.nodes.iter().fold(leaf, |curr, node| {
            let (l, r) = node.side.order(&curr, &node.hash);
            node_hash(l, r)
        })
    }

    /// Verifies that this path matches a given merkle root.
    pub fn verify_root<M: MerkleItem + ?Sized>(&self, root: &Hash, item: &M) -> bool {
        let computed = self.compute_root(item);
        computed.algorithm() == root.algorithm()
            && computed.as_bytes().ct_eq(root.as_bytes()).unwrap_u8() == 1
    }

    fn left_bits(&self) -> Vec<u8> {
        let mut bits = vec![0u8; (self.nodes.len() + 7) / 8];
        for (i, node) in self.nodes.iter().enumerate() {
            if node.is_neighbor_left() {
                bits[i / 8] |= 0x80 >> (i % 8);
            }
        }
        bits
    }
}

impl Encodable for MerklePath {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        w.write_u8(b"n", self.nodes.len() as u8)?;
        w.write(b"left_bits", &self.left_bits())?;
        for node in self.nodes.iter() {
            w.write(b"hash", node.hash.as_bytes())?;
        }
        Ok(())
    }
}

impl ExactSizeEncodable for MerklePath {
    fn encoded_length(&self) -> usize {
        1 + (self.nodes.len() + 7) / 8
            + self
                .nodes
                .iter()
                .map(|n| n.hash.as_bytes().len())
                .sum::<usize>()
    }
}

impl Decodable for MerklePath {
    type Error = MerkleError;

    fn decode(r: &mut impl Reader) -> Result<Self, MerkleError> {
        let count = r.read_u8()? as usize;
        let left_bits = r.read_vec((count + 7) / 8)?;
        // One encoding per path: padding bits must be zero.
        if count % 8 != 0 && left_bits[count / 8] & (0xff >> (count % 8)) != 0 {
            return Err(MerkleError::NonZeroPadding);
        }
        let mut nodes = Vec::with_capacity(count);
        for i in 0..count {
            let neighbor_left = left_bits[i / 8] & (0x80 >> (i % 8)) != 0;
            nodes.push(MerklePathNode {
                hash: Hash::decode(r)?,
                side: if neighbor_left { Side::Right } else { Side::Left },
            });
        }
        Ok(MerklePath { nodes })
    }
}
