use core::fmt;
use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use rand_core::{CryptoRng, RngCore};
use subtle::ConstantTimeEq;
use zeroize::Zeroize;

use super::{Address, Hash, PrimitiveError};

/// Signing key (aka "privkey"): 32 bytes interpreted as a Ristretto255 scalar.
/// The bytes are wiped when the key is dropped.
#[derive(Clone)]
pub struct PrivateKey([u8; 32]);

impl PrivateKey {
    /// Serialized size in bytes.
    pub const SIZE: usize = 32;

    /// Generates a fresh random key.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut scalar = Scalar::random(rng);
        let key = PrivateKey(scalar.to_bytes());
        scalar.zeroize();
        key
    }

    /// Wraps a byte slice, failing if it is not exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() != Self::SIZE {
            return Err(PrimitiveError::InvalidLength {
                kind: "PrivateKey",
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(bytes);
        Ok(PrivateKey(buf))
    }

    /// Parses 64 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitiveError> {
        let mut bytes = hex::decode(hex_str).map_err(|_| PrimitiveError::InvalidHex)?;
        let key = Self::from_bytes(&bytes);
        bytes.zeroize();
        key
    }

    /// Returns the view into byte representation of the key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The key as a scalar, reduced modulo the group order.
    pub fn to_scalar(&self) -> Scalar {
        Scalar::from_bytes_mod_order(self.0)
    }
}

impl Zeroize for PrivateKey {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for PrivateKey {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl PartialEq for PrivateKey {
    fn eq(&self, other: &Self) -> bool {
        self.0[..].ct_eq(&other.0[..]).into()
    }
}

impl Eq for PrivateKey {}

impl fmt::Debug for PrivateKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("PrivateKey(<redacted>)")
    }
}

/// Verification key (aka "pubkey"): a compressed Ristretto point.
/// Ordering is lexicographic over the encoded bytes, which is the order
/// participants agree on when aggregating keys.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PublicKey([u8; 32]);

impl PublicKey {
    /// Serialized size in bytes.
    pub const SIZE: usize = 32;

    /// Derives the public key `x·G` for a private key `x`.
    pub fn from_private(private_key: &PrivateKey) -> Self {
        let mut x = private_key.to_scalar();
        let key = Self::from_point(&(x * RISTRETTO_BASEPOINT_POINT));
        x.zeroize();
        key
    }

    /// Compresses a curve point into a public key.
    pub fn from_point(point: &RistrettoPoint) -> Self {
        PublicKey(point.compress().to_bytes())
    }

    /// Wraps a byte slice, failing if it is not exactly 32 bytes long.
    /// The point itself is only decoded when used.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        if bytes.len() != Self::SIZE {
            return Err(PrimitiveError::InvalidLength {
                kind: "PublicKey",
                expected: Self::SIZE,
                actual: bytes.len(),
            });
        }
        let mut buf = [0u8; 32];
        buf.copy_from_slice(bytes);
        Ok(PublicKey(buf))
    }

    /// Parses 64 hex characters.
    pub fn from_hex(hex_str: &str) -> Result<Self, PrimitiveError> {
        let bytes = hex::decode(hex_str).map_err(|_| PrimitiveError::InvalidHex)?;
        Self::from_bytes(&bytes)
    }

    /// Returns the view into byte representation of the key.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Hex encoding of the key.
    pub fn to_hex(&self) -> String {
        hex::encode(&self.0)
    }

    /// Returns the compressed Ristretto point.
    pub fn as_compressed(&self) -> CompressedRistretto {
        CompressedRistretto(self.0)
    }

    /// Decodes the point.
    pub fn decompress(&self) -> Result<RistrettoPoint, PrimitiveError> {
        self.as_compressed()
            .decompress()
            .ok_or(PrimitiveError::InvalidPoint)
    }

    /// Light hash of the key; the leaf value of the signer Merkle tree.
    pub fn hash(&self) -> Hash {
        Hash::blake2b(&self.0)
    }

    /// The single-key account address.
    pub fn to_address(&self) -> Address {
        Address::from_hash(&self.hash())
    }
}

impl fmt::Debug for PublicKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PublicKey({})", self.to_hex())
    }
}

impl AsRef<[u8]> for PublicKey {
    fn as_ref(&self) -> &[u8] {
        &self.0
    }
}

impl From<&PrivateKey> for PublicKey {
    fn from(private_key: &PrivateKey) -> Self {
        PublicKey::from_private(private_key)
    }
}
