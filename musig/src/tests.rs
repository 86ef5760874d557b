use curve25519_dalek::constants::RISTRETTO_BASEPOINT_POINT;
use curve25519_dalek::scalar::Scalar;
use rand::SeedableRng;
use rand_chacha::ChaChaRng;

use primitives::{Commitment, PartialSignature, PrivateKey, PublicKey, Signature};
use readerwriter::{Decodable, ExactSizeEncodable};

use crate::{
    aggregate_commitments, aggregate_public_keys, combine_partial_signatures,
    create_partial_signature, CommitmentPair, Multikey, MusigError, Party,
};

fn privkey(n: u64) -> PrivateKey {
    PrivateKey::from_bytes(Scalar::from(n).as_bytes()).unwrap()
}

/// Private keys ordered like the multikey's sorted public keys.
fn sorted_privkeys(ns: &[u64]) -> Vec<PrivateKey> {
    let mut keys: Vec<_> = ns.iter().map(|n| privkey(*n)).collect();
    keys.sort_by_key(|k| PublicKey::from_private(k));
    keys
}

fn multikey_helper(priv_keys: &[PrivateKey]) -> Multikey {
    Multikey::new(priv_keys.iter().map(PublicKey::from_private).collect()).unwrap()
}

fn sign_with_mpc(
    privkeys: Vec<PrivateKey>,
    multikey: Multikey,
    message: &[u8],
) -> Result<Signature, MusigError> {
    let mut rng = ChaChaRng::from_seed([7u8; 32]);

    let (parties, comms): (Vec<_>, Vec<_>) = privkeys
        .into_iter()
        .map(|x_i| Party::new(x_i, multikey.clone(), message.to_vec(), &mut rng).unwrap())
        .unzip();

    let (parties, shares): (Vec<_>, Vec<_>) = parties
        .into_iter()
        .map(|p| p.receive_commitments(comms.clone()).unwrap())
        .unzip();

    let signatures = parties
        .into_iter()
        .map(|p| p.receive_shares(shares.clone()))
        .collect::<Result<Vec<_>, _>>()?;

    // Check that signatures from all parties are the same
    let cmp = &signatures[0];
    for sig in &signatures {
        assert_eq!(cmp, sig);
    }

    Ok(signatures[0])
}

#[test]
fn sign_verify_single_multikey() {
    let privkeys = sorted_privkeys(&[1]);
    let multikey = multikey_helper(&privkeys);
    let sig = sign_with_mpc(privkeys, multikey.clone(), b"message").unwrap();

    assert!(sig.verify(&multikey.aggregated_key(), b"message"));
}

#[test]
fn single_key_is_still_delinearized() {
    let x = privkey(1);
    let X = PublicKey::from_private(&x);
    let multikey = Multikey::new(vec![X]).unwrap();

    assert_ne!(multikey.aggregated_key(), X);
    let a = multikey.factor(&X).unwrap();
    assert_eq!(
        multikey.aggregated_key(),
        PublicKey::from_point(&(a * X.decompress().unwrap()))
    );
}

#[test]
fn make_multikey_order_independent() {
    let keys: Vec<_> = (1..=4u64)
        .map(|n| PublicKey::from_private(&privkey(n)))
        .collect();
    let mut reversed = keys.clone();
    reversed.reverse();

    let a = Multikey::new(keys.clone()).unwrap();
    let b = Multikey::new(reversed).unwrap();
    assert_eq!(a.aggregated_key(), b.aggregated_key());
    assert_eq!(a.public_keys(), b.public_keys());
    assert_eq!(aggregate_public_keys(&keys).unwrap(), a.aggregated_key());

    // Plain summation would not match the delinearized key.
    let naive: curve25519_dalek::ristretto::RistrettoPoint =
        keys.iter().map(|k| k.decompress().unwrap()).sum();
    assert_ne!(PublicKey::from_point(&naive), a.aggregated_key());
}

#[test]
fn empty_or_invalid_multikey() {
    assert_eq!(Multikey::new(vec![]).err(), Some(MusigError::BadArguments));

    let garbage = PublicKey::from_bytes(&[0xffu8; 32]).unwrap();
    assert_eq!(
        aggregate_public_keys(&[garbage]).err(),
        Some(MusigError::InvalidPoint)
    );
}

#[test]
fn sign_multikey() {
    let privkeys = sorted_privkeys(&[1, 2, 3, 4]);
    let multikey = multikey_helper(&privkeys);
    let sig = sign_with_mpc(privkeys, multikey.clone(), b"transfer").unwrap();

    assert!(sig.verify(&multikey.aggregated_key(), b"transfer"));
    assert!(!sig.verify(&multikey.aggregated_key(), b"another message"));
}

#[test]
fn two_of_three_every_pair() {
    let mut rng = ChaChaRng::from_seed([1u8; 32]);
    let keys: Vec<_> = (0..3).map(|_| PrivateKey::generate(&mut rng)).collect();
    let message = b"two of three";

    for (i, j) in [(0usize, 1usize), (0, 2), (1, 2)].iter() {
        let signers = [&keys[*i], &keys[*j]];
        let pubkeys: Vec<_> = signers.iter().map(|k| PublicKey::from_private(k)).collect();
        let aggregate_key = aggregate_public_keys(&pubkeys).unwrap();

        let pairs: Vec<_> = signers
            .iter()
            .map(|_| CommitmentPair::generate(&mut rng))
            .collect();
        let commitments: Vec<_> = pairs.iter().map(|p| p.commitment()).collect();
        let R = aggregate_commitments(&commitments).unwrap();

        let partials: Vec<_> = signers
            .iter()
            .zip(pairs.iter())
            .map(|(k, pair)| {
                create_partial_signature(
                    k,
                    &PublicKey::from_private(k),
                    &pubkeys,
                    pair.secret(),
                    &R,
                    message,
                )
                .unwrap()
            })
            .collect();

        let sig = combine_partial_signatures(&R, &partials).unwrap();
        assert!(sig.verify(&aggregate_key, message));

        // A lone share yields a signature that does not verify.
        let lone = combine_partial_signatures(&R, &partials[..1]).unwrap();
        assert!(!lone.verify(&aggregate_key, message));
    }
}

#[test]
fn combine_without_shares_fails() {
    assert_eq!(
        combine_partial_signatures(&Commitment::default(), &[]).err(),
        Some(MusigError::WrongNumberOfPartialSignatures {
            expected: 1,
            actual: 0
        })
    );
}

#[test]
fn partial_signature_requires_membership() {
    let mut rng = ChaChaRng::from_seed([2u8; 32]);
    let outsider = privkey(9);
    let pubkeys: Vec<_> = (1..=2u64)
        .map(|n| PublicKey::from_private(&privkey(n)))
        .collect();
    let pair = CommitmentPair::generate(&mut rng);

    let result = create_partial_signature(
        &outsider,
        &PublicKey::from_private(&outsider),
        &pubkeys,
        pair.secret(),
        &pair.commitment(),
        b"m",
    );
    assert_eq!(result.err(), Some(MusigError::SignerNotInSet));

    // Mismatched key pair.
    let result = create_partial_signature(
        &privkey(1),
        &pubkeys[1],
        &pubkeys,
        pair.secret(),
        &pair.commitment(),
        b"m",
    );
    assert_eq!(result.err(), Some(MusigError::BadArguments));
}

#[test]
fn party_rejects_bad_share() {
    let mut rng = ChaChaRng::from_seed([3u8; 32]);
    let privkeys = sorted_privkeys(&[1, 2, 3]);
    let multikey = multikey_helper(&privkeys);
    let bad_signer = multikey.public_keys()[1];

    let (parties, comms): (Vec<_>, Vec<_>) = privkeys
        .into_iter()
        .map(|x_i| Party::new(x_i, multikey.clone(), b"m".to_vec(), &mut rng).unwrap())
        .unzip();
    let (mut parties, mut shares): (Vec<_>, Vec<_>) = parties
        .into_iter()
        .map(|p| p.receive_commitments(comms.clone()).unwrap())
        .unzip();

    let tampered = shares[1].to_scalar().unwrap() + Scalar::one();
    shares[1] = PartialSignature::from_scalar(&tampered);

    let party = parties.remove(0);
    assert_eq!(
        party.receive_shares(shares).err(),
        Some(MusigError::ShareError {
            pubkey: *bad_signer.as_bytes()
        })
    );
}

#[test]
fn party_requires_all_shares() {
    let mut rng = ChaChaRng::from_seed([4u8; 32]);
    let privkeys = sorted_privkeys(&[1, 2]);
    let multikey = multikey_helper(&privkeys);

    let (parties, comms): (Vec<_>, Vec<_>) = privkeys
        .into_iter()
        .map(|x_i| Party::new(x_i, multikey.clone(), b"m".to_vec(), &mut rng).unwrap())
        .unzip();
    let (mut parties, shares): (Vec<_>, Vec<_>) = parties
        .into_iter()
        .map(|p| p.receive_commitments(comms.clone()).unwrap())
        .unzip();

    let party = parties.remove(0);
    assert_eq!(
        party.receive_shares(shares[..1].to_vec()).err(),
        Some(MusigError::WrongNumberOfPartialSignatures {
            expected: 2,
            actual: 1
        })
    );
}

#[test]
fn party_rejects_outsider_and_foreign_commitments() {
    let mut rng = ChaChaRng::from_seed([5u8; 32]);
    let privkeys = sorted_privkeys(&[1, 2]);
    let multikey = multikey_helper(&privkeys);

    assert!(Party::new(privkey(9), multikey.clone(), b"m".to_vec(), &mut rng).is_err());

    let mut privkeys = privkeys;
    let (party, _) = Party::new(privkeys.remove(0), multikey, b"m".to_vec(), &mut rng).unwrap();
    let foreign = vec![Commitment::default(), Commitment::default()];
    assert_eq!(
        party.receive_commitments(foreign).err(),
        Some(MusigError::BadArguments)
    );
}

#[test]
fn commitment_pair_matches_and_encodes() {
    let mut rng = ChaChaRng::from_seed([6u8; 32]);
    let pair = CommitmentPair::generate(&mut rng);
    let r = pair.secret().to_scalar();
    assert_ne!(r, Scalar::zero());
    assert_eq!(
        pair.commitment(),
        Commitment::from_point(&(r * RISTRETTO_BASEPOINT_POINT))
    );

    let bytes = pair.encode_to_vec();
    assert_eq!(bytes.len(), CommitmentPair::SIZE);
    let decoded = CommitmentPair::decode_exact(&bytes).unwrap();
    assert_eq!(decoded.commitment(), pair.commitment());
    assert_eq!(decoded.secret().as_bytes(), pair.secret().as_bytes());

    assert!(CommitmentPair::decode_exact(&bytes[..40]).is_err());
}
