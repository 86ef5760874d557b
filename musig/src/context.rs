use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use merlin::Transcript;
use primitives::{Hash, PublicKey, TranscriptProtocol};

use super::MusigError;

/// MuSig aggregated key context: the sorted signer set, the delinearization
/// factors and the aggregated key.
#[derive(Clone)]
pub struct Multikey {
    prf: Transcript,
    aggregated_key: PublicKey,
    public_keys: Vec<PublicKey>,
}

impl Multikey {
    /// Constructs a new MuSig multikey aggregating the pubkeys.
    /// Keys are sorted by their byte encoding first, so every participant
    /// derives the same key regardless of input order. A single key is
    /// delinearized too, which keeps every subset's key uniform.
    pub fn new(mut pubkeys: Vec<PublicKey>) -> Result<Self, MusigError> {
        if pubkeys.is_empty() {
            return Err(MusigError::BadArguments);
        }
        pubkeys.sort();

        // <L> = H(X_1 || X_2 || ... || X_n)
        let concatenated: Vec<u8> = pubkeys
            .iter()
            .flat_map(|X| X.as_bytes().iter().copied())
            .collect();
        let L = Hash::sha512(&concatenated);

        let mut prf = Transcript::new(b"Musig.aggregated-key");
        prf.append_message(b"L", L.as_bytes());

        // aggregated_key = sum_i ( a_i * X_i )
        let mut aggregated_key = RistrettoPoint::default();
        for X in pubkeys.iter() {
            let a = Multikey::compute_factor(&prf, X);
            let X = X.decompress().map_err(|_| MusigError::InvalidPoint)?;
            aggregated_key += a * X;
        }

        Ok(Multikey {
            prf,
            aggregated_key: PublicKey::from_point(&aggregated_key),
            public_keys: pubkeys,
        })
    }

    /// Returns `a_i` factor for component key in aggregated key.
    /// a_i = H(<L>, X_i). The list of pubkeys, <L>, has already been committed to the transcript.
    fn compute_factor(prf: &Transcript, X_i: &PublicKey) -> Scalar {
        let mut a_i_prf = prf.clone();
        a_i_prf.append_point(b"X_i", &X_i.as_compressed());
        a_i_prf.challenge_scalar(b"a_i")
    }

    /// Returns the delinearization factor of a member key,
    /// or `None` if the key is not in the set.
    pub fn factor(&self, pubkey: &PublicKey) -> Option<Scalar> {
        self.position(pubkey)
            .map(|_| Multikey::compute_factor(&self.prf, pubkey))
    }

    /// Index of a member key in the sorted set.
    pub fn position(&self, pubkey: &PublicKey) -> Option<usize> {
        self.public_keys.binary_search(pubkey).ok()
    }

    /// Returns the aggregated key.
    pub fn aggregated_key(&self) -> PublicKey {
        self.aggregated_key
    }

    /// Member keys in sorted order.
    pub fn public_keys(&self) -> &[PublicKey] {
        &self.public_keys
    }

    /// Number of member keys.
    pub fn len(&self) -> usize {
        self.public_keys.len()
    }

    /// Always false: a multikey has at least one member.
    pub fn is_empty(&self) -> bool {
        self.public_keys.is_empty()
    }
}
