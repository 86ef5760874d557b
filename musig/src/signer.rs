use curve25519_dalek::scalar::Scalar;
use log::warn;
use primitives::{Commitment, PartialSignature, PrivateKey, PublicKey, Signature};
use rand_core::{CryptoRng, RngCore};

use super::aggregation::{aggregate_commitments, combine_partial_signatures, create_partial_signature};
use super::commitment::CommitmentPair;
use super::context::Multikey;
use super::counterparty::*;
use super::errors::MusigError;

/// Entry point to multi-party signing protocol.
pub struct Party {}

/// State of the party when awaiting nonce commitments from other parties.
pub struct PartyAwaitingCommitments {
    multikey: Multikey,
    message: Vec<u8>,
    private_key: PrivateKey,
    public_key: PublicKey,
    position: usize,
    nonce: CommitmentPair,
    counterparties: Vec<Counterparty>,
}

/// State of the party when awaiting signature shares from other parties.
pub struct PartyAwaitingShares {
    multikey: Multikey,
    R: Commitment,
    c: Scalar,
    counterparties: Vec<CounterpartyCommitted>,
}

impl Party {
    /// Create new signing party for a message and a signer set that includes `private_key`'s key.
    /// Returns the next state and this party's nonce commitment to broadcast.
    pub fn new<R: RngCore + CryptoRng>(
        private_key: PrivateKey,
        multikey: Multikey,
        message: Vec<u8>,
        rng: &mut R,
    ) -> Result<(PartyAwaitingCommitments, Commitment), MusigError> {
        let public_key = PublicKey::from_private(&private_key);
        let position = multikey
            .position(&public_key)
            .ok_or(MusigError::SignerNotInSet)?;

        let nonce = CommitmentPair::generate(rng);
        let commitment = nonce.commitment();

        let counterparties = multikey
            .public_keys()
            .iter()
            .map(|pubkey| Counterparty::new(*pubkey))
            .collect();

        Ok((
            PartyAwaitingCommitments {
                multikey,
                message,
                private_key,
                public_key,
                position,
                nonce,
                counterparties,
            },
            commitment,
        ))
    }
}

impl PartyAwaitingCommitments {
    /// Provide nonce commitments of all parties, ordered as `multikey.public_keys()`,
    /// and transition to the next round. Consumes this party's nonce.
    pub fn receive_commitments(
        self,
        nonce_commitments: Vec<Commitment>,
    ) -> Result<(PartyAwaitingShares, PartialSignature), MusigError> {
        if nonce_commitments.len() != self.counterparties.len()
            || nonce_commitments[self.position] != self.nonce.commitment()
        {
            return Err(MusigError::BadArguments);
        }

        // Make R = sum_i(R_i). nonce_commitments = R_i from all the parties.
        let R = aggregate_commitments(&nonce_commitments)?;

        // Generate share: s_i = r_i + c * a_i * x_i
        let secret = self.nonce.into_secret();
        let s_i = create_partial_signature(
            &self.private_key,
            &self.public_key,
            self.multikey.public_keys(),
            &secret,
            &R,
            &self.message,
        )?;
        let c = Signature::challenge(&self.multikey.aggregated_key(), &R, &self.message);

        let counterparties = self
            .counterparties
            .into_iter()
            .zip(nonce_commitments)
            .map(|(counterparty, commitment)| counterparty.commit_nonce(commitment))
            .collect();

        Ok((
            PartyAwaitingShares {
                multikey: self.multikey,
                R,
                c,
                counterparties,
            },
            s_i,
        ))
    }
}

impl PartyAwaitingShares {
    /// Assemble trusted signature shares (e.g. when all keys owned by one signer)
    pub fn receive_trusted_shares(
        self,
        shares: Vec<PartialSignature>,
    ) -> Result<Signature, MusigError> {
        self.check_count(&shares)?;
        combine_partial_signatures(&self.R, &shares)
    }

    /// Verify and assemble signature shares, ordered as `multikey.public_keys()`.
    pub fn receive_shares(self, shares: Vec<PartialSignature>) -> Result<Signature, MusigError> {
        self.check_count(&shares)?;

        let multikey = &self.multikey;
        let c = &self.c;

        // Check that all shares are valid. If so, create s from them.
        // s = sum(s_i), s_i = shares[i]
        let s = self
            .counterparties
            .into_iter()
            .zip(shares)
            .map(|(counterparty, share)| {
                counterparty
                    .check_share(share, multikey, c)
                    .map_err(|e| {
                        warn!("rejected signature share: {}", e);
                        e
                    })
            })
            .sum::<Result<Scalar, _>>()?;

        Ok(Signature::from_parts(&self.R, &s))
    }

    fn check_count(&self, shares: &[PartialSignature]) -> Result<(), MusigError> {
        if shares.len() != self.counterparties.len() {
            return Err(MusigError::WrongNumberOfPartialSignatures {
                expected: self.counterparties.len(),
                actual: shares.len(),
            });
        }
        Ok(())
    }
}
