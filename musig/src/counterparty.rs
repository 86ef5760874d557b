use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::scalar::Scalar;
use primitives::{Commitment, PartialSignature, PublicKey};

use super::context::Multikey;
use super::errors::MusigError;

pub(crate) struct Counterparty {
    pubkey: PublicKey,
}

pub(crate) struct CounterpartyCommitted {
    commitment: Commitment,
    pubkey: PublicKey,
}

impl Counterparty {
    pub(crate) fn new(pubkey: PublicKey) -> Self {
        Counterparty { pubkey }
    }

    pub(crate) fn commit_nonce(self, commitment: Commitment) -> CounterpartyCommitted {
        CounterpartyCommitted {
            commitment,
            pubkey: self.pubkey,
        }
    }
}

impl CounterpartyCommitted {
    pub(crate) fn check_share(
        self,
        share: PartialSignature,
        multikey: &Multikey,
        challenge: &Scalar,
    ) -> Result<Scalar, MusigError> {
        let share_error = || MusigError::ShareError {
            pubkey: *self.pubkey.as_bytes(),
        };

        // Check if s_i * G == R_i + c * a_i * X_i.
        //   s_i = share
        //   G = RISTRETTO_BASEPOINT_POINT
        //   R_i = self.commitment
        //   c = challenge
        //   a_i = multikey.factor(self.pubkey)
        //   X_i = self.pubkey
        let s_i = share.to_scalar().map_err(|_| share_error())?;
        let a_i = multikey
            .factor(&self.pubkey)
            .ok_or(MusigError::SignerNotInSet)?;
        let X_i = self.pubkey.decompress()?;
        let R_i = self.commitment.decompress()?;

        if s_i * RISTRETTO_BASEPOINT_POINT != R_i + challenge * a_i * X_i {
            return Err(share_error());
        }

        Ok(s_i)
    }
}
