use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::scalar::Scalar;
use primitives::{Commitment, RandomSecret};
use rand_core::{CryptoRng, RngCore};
use readerwriter::{Decodable, Encodable, ExactSizeEncodable, Reader, WriteError, Writer};
use zeroize::Zeroize;

use super::MusigError;

/// Single-use nonce of one signer: the secret `r` and its public commitment `R = r·G`.
///
/// The pair is consumed when a partial signature is produced through
/// [crate::Party], so the same nonce cannot sign two messages.
#[derive(Clone, Debug)]
pub struct CommitmentPair {
    secret: RandomSecret,
    commitment: Commitment,
}

impl CommitmentPair {
    /// Serialized size in bytes.
    pub const SIZE: usize = RandomSecret::SIZE + Commitment::SIZE;

    /// Draws a fresh non-zero nonce.
    pub fn generate<R: RngCore + CryptoRng>(rng: &mut R) -> Self {
        let mut r = Scalar::random(rng);
        while r == Scalar::zero() {
            r = Scalar::random(rng);
        }
        let pair = CommitmentPair {
            secret: RandomSecret::from_scalar(&r),
            commitment: Commitment::from_point(&(r * RISTRETTO_BASEPOINT_POINT)),
        };
        r.zeroize();
        pair
    }

    /// Reassembles a pair from its halves. The halves are not checked against each other.
    pub fn from_parts(secret: RandomSecret, commitment: Commitment) -> Self {
        CommitmentPair { secret, commitment }
    }

    /// The secret nonce.
    pub fn secret(&self) -> &RandomSecret {
        &self.secret
    }

    /// The public commitment to share with co-signers.
    pub fn commitment(&self) -> Commitment {
        self.commitment
    }

    pub(crate) fn into_secret(self) -> RandomSecret {
        self.secret
    }
}

impl Encodable for CommitmentPair {
    fn encode(&self, w: &mut impl Writer) -> Result<(), WriteError> {
        self.secret.encode(w)?;
        self.commitment.encode(w)
    }
}

impl ExactSizeEncodable for CommitmentPair {
    fn encoded_length(&self) -> usize {
        Self::SIZE
    }
}

impl Decodable for CommitmentPair {
    type Error = MusigError;

    fn decode(r: &mut impl Reader) -> Result<Self, MusigError> {
        let secret = RandomSecret::decode(r)?;
        let commitment = Commitment::decode(r)?;
        Ok(CommitmentPair { secret, commitment })
    }
}
