use core::fmt;
use curve25519_dalek::ristretto::{CompressedRistretto, RistrettoPoint};
use curve25519_dalek::scalar::Scalar;
use zeroize::Zeroize;

use super::PrimitiveError;

fn exact_32(kind: &'static str, bytes: &[u8]) -> Result<[u8; 32], PrimitiveError> {
    if bytes.len() != 32 {
        return Err(PrimitiveError::InvalidLength {
            kind,
            expected: 32,
            actual: bytes.len(),
        });
    }
    let mut buf = [0u8; 32];
    buf.copy_from_slice(bytes);
    Ok(buf)
}

/// Public nonce commitment `R = r·G` of one signer, or the sum of all
/// signers' commitments.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct Commitment([u8; 32]);

impl Commitment {
    /// Serialized size in bytes.
    pub const SIZE: usize = 32;

    /// Wraps 32 raw bytes.
    pub fn new(bytes: [u8; 32]) -> Self {
        Commitment(bytes)
    }

    /// Compresses a curve point.
    pub fn from_point(point: &RistrettoPoint) -> Self {
        Commitment(point.compress().to_bytes())
    }

    /// Wraps a byte slice, failing if it is not exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        exact_32("Commitment", bytes).map(Commitment)
    }

    /// Returns the view into byte representation of the commitment.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
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
}

impl fmt::Debug for Commitment {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "Commitment({})", hex::encode(&self.0))
    }
}

/// Secret single-use nonce `r` matching a [Commitment].
/// The bytes are wiped when the secret is dropped.
#[derive(Clone)]
pub struct RandomSecret([u8; 32]);

impl RandomSecret {
    /// Serialized size in bytes.
    pub const SIZE: usize = 32;

    /// Wraps a scalar.
    pub fn from_scalar(scalar: &Scalar) -> Self {
        RandomSecret(scalar.to_bytes())
    }

    /// Wraps a byte slice, failing if it is not exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        exact_32("RandomSecret", bytes).map(RandomSecret)
    }

    /// Returns the view into byte representation of the secret.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// The nonce as a scalar, reduced modulo the group order.
    pub fn to_scalar(&self) -> Scalar {
        Scalar::from_bytes_mod_order(self.0)
    }
}

impl Zeroize for RandomSecret {
    fn zeroize(&mut self) {
        self.0.zeroize();
    }
}

impl Drop for RandomSecret {
    fn drop(&mut self) {
        self.zeroize();
    }
}

impl fmt::Debug for RandomSecret {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("RandomSecret(<redacted>)")
    }
}

/// One co-signer's share `s_i` of a combined signature.
#[derive(Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct PartialSignature([u8; 32]);

impl PartialSignature {
    /// Serialized size in bytes.
    pub const SIZE: usize = 32;

    /// Wraps a scalar.
    pub fn from_scalar(scalar: &Scalar) -> Self {
        PartialSignature(scalar.to_bytes())
    }

    /// Wraps a byte slice, failing if it is not exactly 32 bytes long.
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, PrimitiveError> {
        exact_32("PartialSignature", bytes).map(PartialSignature)
    }

    /// Returns the view into byte representation of the share.
    pub fn as_bytes(&self) -> &[u8; 32] {
        &self.0
    }

    /// Decodes the share, rejecting non-canonical scalars.
    pub fn to_scalar(&self) -> Result<Scalar, PrimitiveError> {
        Scalar::from_canonical_bytes(self.0).ok_or(PrimitiveError::InvalidScalar)
    }
}

impl fmt::Debug for PartialSignature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "PartialSignature({})", hex::encode(&self.0))
    }
}
