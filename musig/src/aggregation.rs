use curve25519_dalek::ristretto::RistrettoPoint;
use curve25519_dalek::scalar::Scalar;
use primitives::{Commitment, PartialSignature, PrivateKey, PublicKey, RandomSecret, Signature};
use zeroize::Zeroize;

use super::{Multikey, MusigError};

/// Aggregates the keys into a single delinearized key `Σ a_i·X_i`.
/// Input order does not matter.
pub fn aggregate_public_keys(public_keys: &[PublicKey]) -> Result<PublicKey, MusigError> {
    Ok(Multikey::new(public_keys.to_vec())?.aggregated_key())
}

/// Sums the co-signers' nonce commitments into the aggregate commitment `R`.
pub fn aggregate_commitments(commitments: &[Commitment]) -> Result<Commitment, MusigError> {
    if commitments.is_empty() {
        return Err(MusigError::BadArguments);
    }
    let R = commitments
        .iter()
        .map(|R_i| R_i.decompress())
        .sum::<Result<RistrettoPoint, _>>()?;
    Ok(Commitment::from_point(&R))
}

/// Creates this signer's share `s_i = r_i + c·a_i·x_i` of the combined signature,
/// where `c` is the challenge over the message, the aggregate key of `public_keys`
/// and the aggregate commitment.
pub fn create_partial_signature(
    private_key: &PrivateKey,
    public_key: &PublicKey,
    public_keys: &[PublicKey],
    secret: &RandomSecret,
    aggregate_commitment: &Commitment,
    message: &[u8],
) -> Result<PartialSignature, MusigError> {
    if PublicKey::from_private(private_key) != *public_key {
        return Err(MusigError::BadArguments);
    }
    let multikey = Multikey::new(public_keys.to_vec())?;
    let a_i = multikey
        .factor(public_key)
        .ok_or(MusigError::SignerNotInSet)?;
    let c = Signature::challenge(&multikey.aggregated_key(), aggregate_commitment, message);

    let mut x_i = private_key.to_scalar();
    let mut r_i = secret.to_scalar();
    let s_i = r_i + c * a_i * x_i;
    x_i.zeroize();
    r_i.zeroize();

    Ok(PartialSignature::from_scalar(&s_i))
}

/// Sums the partial signatures into the final signature `R ‖ Σ s_i`.
/// Counting the shares against a threshold is up to the caller.
pub fn combine_partial_signatures(
    aggregate_commitment: &Commitment,
    partial_signatures: &[PartialSignature],
) -> Result<Signature, MusigError> {
    if partial_signatures.is_empty() {
        return Err(MusigError::WrongNumberOfPartialSignatures {
            expected: 1,
            actual: 0,
        });
    }
    let s = partial_signatures
        .iter()
        .map(|s_i| s_i.to_scalar())
        .sum::<Result<Scalar, _>>()?;
    Ok(Signature::from_parts(aggregate_commitment, &s))
}
